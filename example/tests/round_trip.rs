use brine_sbe::{CodecError, MessageDecoderFlyweight, MessageFlyweight, MetaAttribute, ReadBuf};
use example_app::codecs::*;
use example_app::{decode_car, encode_car, ACCELERATION};

fn encoded_car() -> ([u8; 512], usize) {
    let mut bytes = [0u8; 512];
    let length = encode_car(&mut bytes).unwrap();
    (bytes, length)
}

#[test]
fn fixed_block_fields() {
    let (bytes, _) = encoded_car();
    let car = decode_car(&bytes);

    assert_eq!(car.serial_number(), 1234);
    assert_eq!(car.model_year(), 2013);
    assert_eq!(car.available(), Ok(BooleanType::T));
    assert_eq!(car.code(), Ok(Model::A));
    assert_eq!(car.discounted_model(), Model::C);
    assert_eq!(car.cup_holder_count(), 2);
    assert_eq!(car.vehicle_code(), "abcdef");
    for (index, expected) in [1u32, 2, 3, 4].into_iter().enumerate() {
        assert_eq!(car.some_numbers_at(index), Ok(expected));
    }
}

#[test]
fn array_index_is_checked() {
    let (bytes, _) = encoded_car();
    let car = decode_car(&bytes);
    assert_eq!(
        car.some_numbers_at(4),
        Err(CodecError::IndexOutOfRange { field: "someNumbers", index: 4, length: 4 })
    );

    let mut out = [0u8; 512];
    let mut encoder = CarEncoder::wrap_and_apply_header(brine_sbe::WriteBuf::new(&mut out), 0);
    assert!(encoder.set_some_numbers_at(CarEncoder::SOME_NUMBERS_LENGTH, 1).is_err());
}

#[test]
fn char_array_copies_into_destination() {
    let (bytes, _) = encoded_car();
    let car = decode_car(&bytes);

    let mut dst = [0u8; 8];
    assert_eq!(car.get_vehicle_code(&mut dst), Ok(6));
    assert_eq!(&dst[..6], b"abcdef");

    let mut small = [0u8; 3];
    assert!(matches!(
        car.get_vehicle_code(&mut small),
        Err(CodecError::DestinationTooSmall { required: 6, available: 3, .. })
    ));
}

#[test]
fn composite_and_constants() {
    let (bytes, _) = encoded_car();
    let car = decode_car(&bytes);
    let engine = car.engine();

    assert_eq!(engine.capacity(), 2000);
    assert_eq!(engine.num_cylinders(), 4);
    assert_eq!(engine.max_rpm(), 9000);
    assert_eq!(engine.manufacturer_code(), "123");
    assert_eq!(engine.fuel(), "Petrol");
    assert_eq!(engine.fuel_at(0), Ok(b'P'));
    assert!(engine.fuel_at(EngineDecoder::FUEL_LENGTH).is_err());
    assert_eq!(EngineDecoder::FUEL_VALUE, b"Petrol");
}

#[test]
fn groups_and_var_data_in_order() {
    let (bytes, length) = encoded_car();
    let mut car = decode_car(&bytes);

    let mut fuel = car.fuel_figures();
    assert_eq!(fuel.count(), 3);
    let mut seen = Vec::new();
    while fuel.has_next() {
        let figure = fuel.next().unwrap();
        seen.push((figure.speed(), figure.usage_description()));
    }
    assert_eq!(
        seen,
        vec![
            (30, "Urban Cycle".to_string()),
            (55, "Combined Cycle".to_string()),
            (75, "Highway Cycle".to_string()),
        ]
    );

    let mut performance = car.performance_figures();
    let mut octanes = Vec::new();
    performance
        .try_for_each(|figure| {
            octanes.push(figure.octane_rating());
            let mut samples = Vec::new();
            figure.acceleration().try_for_each(|sample| {
                samples.push((sample.mph(), sample.seconds()));
                Ok(())
            })?;
            assert_eq!(samples, ACCELERATION.to_vec());
            Ok(())
        })
        .unwrap();
    assert_eq!(octanes, vec![95, 99]);

    assert_eq!(car.manufacturer(), "Honda");
    assert_eq!(car.model(), "Civic VTi");
    assert_eq!(car.activation_code_bytes(), b"abcdef");
    assert_eq!(car.limit(), length);
    assert_eq!(car.encoded_length(), length - MessageHeaderDecoder::ENCODED_LENGTH);
}

#[test]
fn enum_values_outside_the_schema_fail() {
    let (mut bytes, _) = encoded_car();
    bytes[MessageHeaderDecoder::ENCODED_LENGTH + CarDecoder::AVAILABLE_ENCODING_OFFSET] = 7;
    let car = decode_car(&bytes);
    assert_eq!(car.available_raw(), 7);
    assert_eq!(car.available(), Err(CodecError::UnknownEnumValue { type_name: "BooleanType", value: 7 }));

    bytes[MessageHeaderDecoder::ENCODED_LENGTH + CarDecoder::AVAILABLE_ENCODING_OFFSET] = BooleanType::NULL_VALUE;
    assert_eq!(decode_car(&bytes).available(), Ok(BooleanType::NullVal));
}

#[test]
fn enums_map_both_ways() {
    for model in [Model::A, Model::B, Model::C, Model::NullVal] {
        assert_eq!(Model::get(model.value()), Ok(model));
    }
    assert_eq!(Model::B.value(), b'B');
    assert_eq!(Model::B.to_string(), "B");
    assert_eq!(BooleanType::NullVal.value(), u8::MAX);
}

#[test]
fn metadata_accessors() {
    assert_eq!(CarDecoder::SERIAL_NUMBER_ID, 1);
    assert_eq!(CarDecoder::CUP_HOLDER_COUNT_SINCE_VERSION, 1);
    assert_eq!(CarDecoder::serial_number_meta_attribute(MetaAttribute::SemanticType), "SerialNumber");
    assert_eq!(CarDecoder::serial_number_meta_attribute(MetaAttribute::Presence), "required");
    assert_eq!(CarDecoder::cup_holder_count_meta_attribute(MetaAttribute::Presence), "optional");
    assert_eq!(CarDecoder::serial_number_meta_attribute(MetaAttribute::Epoch), "");
    assert_eq!(CarDecoder::MANUFACTURER_CHARACTER_ENCODING, brine_sbe::CharacterEncoding::Utf8);
    assert_eq!(CarDecoder::FUEL_FIGURES_ID, 10);
    assert_eq!(CarPerformanceFiguresDecoder::ACCELERATION_ID, 16);
}

fn wrap_generic<'a, D: MessageDecoderFlyweight<ReadBuf<'a>>>(bytes: &'a [u8]) -> D {
    D::wrap(ReadBuf::new(bytes), MessageHeaderDecoder::ENCODED_LENGTH, 42, 1)
}

#[test]
fn flyweight_traits_are_implemented() {
    let (bytes, _) = encoded_car();
    let car: CarDecoder<'_> = wrap_generic(&bytes);
    assert_eq!(car.sbe_template_id(), 1);
    assert_eq!(car.sbe_schema_id(), 1);
    assert_eq!(car.sbe_block_length(), 42);
    assert_eq!(MessageFlyweight::limit(&car), MessageHeaderDecoder::ENCODED_LENGTH + 42);
    assert_eq!(car.serial_number(), 1234);
}
