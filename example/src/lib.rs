//! Codecs generated at build time for a small car/order schema, plus the
//! helpers the demo binary and the integration tests share.

pub mod codecs {
    include!(concat!(env!("OUT_DIR"), "/codecs.rs"));
}

use brine_sbe::{CodecError, ReadBuf, WriteBuf};
use codecs::*;

/// Acceleration samples written for every performance figure.
pub const ACCELERATION: [(u16, f32); 3] = [(30, 4.0), (60, 7.5), (100, 12.2)];

/// Encodes a fully populated `Car` behind a message header.
/// Returns the number of bytes written, header included.
pub fn encode_car(bytes: &mut [u8]) -> Result<usize, CodecError> {
    let mut car = CarEncoder::wrap_and_apply_header(WriteBuf::new(bytes), 0);
    car.set_serial_number(1234)
        .set_model_year(2013)
        .set_available(BooleanType::T)
        .set_code(Model::A)
        .set_cup_holder_count(2);
    for (index, value) in [1u32, 2, 3, 4].into_iter().enumerate() {
        car.set_some_numbers_at(index, value)?;
    }
    car.set_vehicle_code("abcdef")?;
    car.extras().clear().set_cruise_control(true).set_sports_pack(true);
    car.engine().set_capacity(2000).set_num_cylinders(4).set_manufacturer_code("123")?;

    {
        let mut fuel = car.fuel_figures_count(3)?;
        fuel.next()?.set_speed(30).set_mpg(35.9).set_usage_description("Urban Cycle")?;
        fuel.next()?.set_speed(55).set_mpg(49.0).set_usage_description("Combined Cycle")?;
        fuel.next()?.set_speed(75).set_mpg(40.0).set_usage_description("Highway Cycle")?;
    }

    {
        let mut performance = car.performance_figures_count(2)?;
        for octane in [95u8, 99] {
            performance.next()?.set_octane_rating(octane);
            let mut acceleration = performance.acceleration_count(ACCELERATION.len() as u16)?;
            for (mph, seconds) in ACCELERATION {
                acceleration.next()?.set_mph(mph).set_seconds(seconds);
            }
        }
    }

    car.set_manufacturer("Honda")?;
    car.set_model("Civic VTi")?;
    car.put_activation_code(b"abcdef")?;
    Ok(MessageHeaderEncoder::ENCODED_LENGTH + car.encoded_length())
}

/// Encodes an `Order` behind a message header.
pub fn encode_order(bytes: &mut [u8], quantity: u32, prices: &[i16], note: &str) -> Result<usize, CodecError> {
    let mut order = OrderEncoder::wrap_and_apply_header(WriteBuf::new(bytes), 0);
    order.set_quantity(quantity);
    {
        let count = u16::try_from(prices.len()).unwrap_or(u16::MAX);
        let mut fills = order.fills_count(count)?;
        for price in prices {
            fills.next()?.set_price(*price);
        }
    }
    order.set_note(note)?;
    Ok(MessageHeaderEncoder::ENCODED_LENGTH + order.encoded_length())
}

/// Encodes a `Service` visit with one stop per odometer reading.
pub fn encode_service(bytes: &mut [u8], odometers: &[u16], remark: &[u8]) -> Result<usize, CodecError> {
    let mut service = ServiceEncoder::wrap_and_apply_header(WriteBuf::new(bytes), 0);
    service.set_mileage(120).set_grade(b'B');
    service.extras().clear().set_sun_roof(true);
    service.engine().set_capacity(1600).set_num_cylinders(4).set_manufacturer_code("VTC")?;
    {
        let count = u16::try_from(odometers.len()).unwrap_or(u16::MAX);
        let mut stops = service.stops_count(count)?;
        for odometer in odometers {
            stops.next()?.set_odometer(*odometer);
        }
    }
    service.put_remark(remark)?;
    Ok(MessageHeaderEncoder::ENCODED_LENGTH + service.encoded_length())
}

/// Reads the message header at the start of `bytes`.
pub fn header(bytes: &[u8]) -> MessageHeaderDecoder<'_> {
    MessageHeaderDecoder::wrap(ReadBuf::new(bytes), 0)
}

/// Wraps a `Car` decoder using the block length and version from the header.
pub fn decode_car(bytes: &[u8]) -> CarDecoder<'_> {
    let header = header(bytes);
    CarDecoder::wrap(
        ReadBuf::new(bytes),
        MessageHeaderDecoder::ENCODED_LENGTH,
        header.block_length(),
        header.version(),
    )
}

pub fn decode_order(bytes: &[u8]) -> OrderDecoder<'_> {
    let header = header(bytes);
    OrderDecoder::wrap(
        ReadBuf::new(bytes),
        MessageHeaderDecoder::ENCODED_LENGTH,
        header.block_length(),
        header.version(),
    )
}

/// Wraps a `Service` decoder as if the message had been encoded at `version`.
pub fn decode_service_at(bytes: &[u8], version: u16) -> ServiceDecoder<'_> {
    ServiceDecoder::wrap(
        ReadBuf::new(bytes),
        MessageHeaderDecoder::ENCODED_LENGTH,
        ServiceDecoder::BLOCK_LENGTH,
        version,
    )
}
