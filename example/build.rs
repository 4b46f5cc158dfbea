// Generates the codecs for the demo schema into `$OUT_DIR/codecs.rs`.

use std::{env, fs, io, path::PathBuf};

use brine_sbe_compiler::{
    builder::{self, encoding},
    generate_to_string,
    types::{Encoding, Ir, Presence, PrimitiveType, PrimitiveValue, Signal, Token},
    GeneratorConfig, GeneratorError,
};

const SCHEMA_ID: i32 = 1;
const SCHEMA_VERSION: u32 = 1;

fn boolean_type(offset: usize) -> Vec<Token> {
    builder::enumeration(
        "BooleanType",
        offset,
        Encoding::new(PrimitiveType::Uint8),
        &[("F", PrimitiveValue::Int(0)), ("T", PrimitiveValue::Int(1))],
    )
}

fn model(offset: usize) -> Vec<Token> {
    builder::enumeration(
        "Model",
        offset,
        Encoding::new(PrimitiveType::Char),
        &[
            ("A", PrimitiveValue::Text("A".into())),
            ("B", PrimitiveValue::Text("B".into())),
            ("C", PrimitiveValue::Text("C".into())),
        ],
    )
}

fn optional_extras(offset: usize) -> Vec<Token> {
    builder::bit_set(
        "OptionalExtras",
        offset,
        Encoding::new(PrimitiveType::Uint8),
        &[("sunRoof", 0), ("sportsPack", 1), ("cruiseControl", 2)],
    )
}

fn engine(offset: usize) -> Vec<Token> {
    builder::composite(
        "Engine",
        offset,
        6,
        vec![
            vec![encoding("capacity", 0, Encoding::new(PrimitiveType::Uint16))],
            vec![encoding("numCylinders", 2, Encoding::new(PrimitiveType::Uint8))],
            vec![builder::constant("maxRpm", PrimitiveType::Uint16, PrimitiveValue::Int(9000))],
            vec![builder::array("manufacturerCode", 3, 3, Encoding::new(PrimitiveType::Char))],
            vec![builder::constant("fuel", PrimitiveType::Char, PrimitiveValue::Text("Petrol".into()))],
        ],
    )
}

/// `groupSizeEncoding` with an explicit upper bound on `numInGroup`.
fn bounded_group_size(max: i64) -> Vec<Token> {
    builder::composite(
        "groupSizeEncoding",
        0,
        4,
        vec![
            vec![encoding("blockLength", 0, Encoding::new(PrimitiveType::Uint16))],
            vec![encoding(
                "numInGroup",
                2,
                Encoding::new(PrimitiveType::Uint16).with_max_value(PrimitiveValue::Int(max)),
            )],
        ],
    )
}

/// `varDataEncoding` whose length may not exceed `max`.
fn bounded_var_data(max: i64) -> Vec<Token> {
    builder::composite(
        "varDataEncoding",
        0,
        0,
        vec![
            vec![encoding(
                "length",
                0,
                Encoding::new(PrimitiveType::Uint32).with_max_value(PrimitiveValue::Int(max)),
            )],
            vec![Token::new(Signal::Encoding, "varData")
                .with_offset(4)
                .with_encoding(Encoding::new(PrimitiveType::Uint8))],
        ],
    )
}

fn scalar(name: &str, id: i32, version: u32, offset: usize, encoding_: Encoding) -> Vec<Token> {
    builder::field(name, id, version, vec![encoding(name, offset, encoding_)])
}

fn car() -> Vec<Token> {
    let mut discounted_model = builder::field("discountedModel", 8, 0, model(0));
    discounted_model[0].encoded_length = 0;
    discounted_model[0].encoding = Encoding::new(PrimitiveType::Char)
        .with_const_value(PrimitiveValue::Text("Model.C".into()));

    let fuel_figures = builder::group(
        "fuelFigures",
        10,
        0,
        6,
        builder::group_size_encoding(),
        vec![
            scalar("speed", 11, 0, 0, Encoding::new(PrimitiveType::Uint16)),
            scalar("mpg", 12, 0, 2, Encoding::new(PrimitiveType::Float)),
            builder::var_data("usageDescription", 13, 0, builder::var_data_encoding(Some("US-ASCII"))),
        ],
    );

    let acceleration = builder::group(
        "acceleration",
        16,
        0,
        6,
        builder::group_size_encoding(),
        vec![
            scalar("mph", 17, 0, 0, Encoding::new(PrimitiveType::Uint16)),
            scalar("seconds", 18, 0, 2, Encoding::new(PrimitiveType::Float)),
        ],
    );
    let performance_figures = builder::group(
        "performanceFigures",
        14,
        0,
        1,
        builder::group_size_encoding(),
        vec![scalar("octaneRating", 15, 0, 0, Encoding::new(PrimitiveType::Uint8)), acceleration],
    );

    builder::message(
        "Car",
        1,
        42,
        vec![
            scalar(
                "serialNumber",
                1,
                0,
                0,
                Encoding::new(PrimitiveType::Uint64).with_semantic_type("SerialNumber"),
            ),
            scalar("modelYear", 2, 0, 8, Encoding::new(PrimitiveType::Uint16)),
            builder::field("available", 3, 0, boolean_type(10)),
            builder::field("code", 4, 0, model(11)),
            builder::field("someNumbers", 5, 0, vec![builder::array("someNumbers", 12, 4, Encoding::new(PrimitiveType::Uint32))]),
            builder::field("vehicleCode", 6, 0, vec![builder::array("vehicleCode", 28, 6, Encoding::new(PrimitiveType::Char))]),
            builder::field("extras", 7, 0, optional_extras(34)),
            discounted_model,
            builder::field("engine", 9, 0, engine(35)),
            scalar(
                "cupHolderCount",
                20,
                1,
                41,
                Encoding::new(PrimitiveType::Uint8).with_presence(Presence::Optional),
            ),
            fuel_figures,
            performance_figures,
            builder::var_data("manufacturer", 21, 0, builder::var_data_encoding(Some("UTF-8"))),
            builder::var_data("model", 22, 0, builder::var_data_encoding(Some("UTF-8"))),
            builder::var_data("activationCode", 23, 1, builder::var_data_encoding(None)),
        ],
    )
}

fn order() -> Vec<Token> {
    let fills = builder::group(
        "fills",
        2,
        0,
        2,
        bounded_group_size(10),
        vec![scalar("price", 3, 0, 0, Encoding::new(PrimitiveType::Int16))],
    );
    builder::message(
        "Order",
        2,
        4,
        vec![
            scalar("quantity", 1, 0, 0, Encoding::new(PrimitiveType::Uint32)),
            fills,
            builder::var_data("note", 4, 0, builder::var_data_encoding(Some("UTF-8"))),
        ],
    )
}

/// Everything added in version 1 sits behind a version guard on the decoder.
fn service() -> Vec<Token> {
    let stops = builder::group(
        "stops",
        5,
        1,
        2,
        builder::group_size_encoding(),
        vec![scalar("odometer", 6, 0, 0, Encoding::new(PrimitiveType::Uint16))],
    );
    builder::message(
        "Service",
        3,
        10,
        vec![
            scalar("mileage", 1, 0, 0, Encoding::new(PrimitiveType::Uint16)),
            scalar("grade", 2, 0, 2, Encoding::new(PrimitiveType::Char)),
            builder::field("extras", 3, 1, optional_extras(3)),
            builder::field("engine", 4, 1, engine(4)),
            stops,
            builder::var_data("remark", 7, 0, bounded_var_data(8)),
        ],
    )
}

fn demo_schema() -> Ir {
    Ir::new("demo", SCHEMA_ID, SCHEMA_VERSION, builder::message_header())
        .with_type(boolean_type(0))
        .with_type(model(0))
        .with_type(optional_extras(0))
        .with_type(engine(0))
        .with_message(car())
        .with_message(order())
        .with_message(service())
}

fn main() -> Result<(), GeneratorError> {
    println!("cargo:rerun-if-changed=build.rs");

    let config = GeneratorConfig { generate_interfaces: true, ..GeneratorConfig::default() };
    let code = generate_to_string(&demo_schema(), &config)?;

    let out_dir = env::var_os("OUT_DIR")
        .map(PathBuf::from)
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "OUT_DIR is not set"))?;
    fs::write(out_dir.join("codecs.rs"), code)?;
    Ok(())
}
