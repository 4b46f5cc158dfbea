use brine_sbe::{CodecError, ReadBuf};
use example_app::codecs::*;
use example_app::{decode_service_at, encode_car, encode_service};

fn car_at_version(bytes: &[u8], version: u16) -> CarDecoder<'_> {
    CarDecoder::wrap(
        ReadBuf::new(bytes),
        MessageHeaderDecoder::ENCODED_LENGTH,
        CarDecoder::BLOCK_LENGTH,
        version,
    )
}

#[test]
fn newer_fields_read_as_null_for_older_versions() {
    let mut bytes = [0u8; 512];
    encode_car(&mut bytes).unwrap();

    let current = car_at_version(&bytes, 1);
    assert_eq!(current.cup_holder_count(), 2);

    let older = car_at_version(&bytes, 0);
    assert_eq!(older.acting_version(), 0);
    assert_eq!(older.cup_holder_count(), CarDecoder::CUP_HOLDER_COUNT_NULL_VALUE);
    // Fields present since version 0 are unaffected.
    assert_eq!(older.serial_number(), 1234);
}

#[test]
fn newer_var_data_is_empty_for_older_versions() {
    let mut bytes = [0u8; 512];
    encode_car(&mut bytes).unwrap();

    let mut older = car_at_version(&bytes, 0);
    older.fuel_figures().try_for_each(|figure| {
        figure.skip_usage_description();
        Ok(())
    }).unwrap();
    older.performance_figures().try_for_each(|figure| {
        figure.acceleration().try_for_each(|_| Ok(()))
    }).unwrap();
    assert_eq!(older.manufacturer(), "Honda");
    assert_eq!(older.model(), "Civic VTi");

    let limit = older.limit();
    assert_eq!(older.activation_code_length(), 0);
    assert_eq!(older.activation_code_bytes(), b"");
    assert_eq!(older.skip_activation_code(), 0);
    assert_eq!(older.limit(), limit);
}

#[test]
fn acting_block_length_positions_the_groups() {
    let mut bytes = [0u8; 512];
    encode_car(&mut bytes).unwrap();

    let car = car_at_version(&bytes, 1);
    assert_eq!(car.acting_block_length(), 42);
    assert_eq!(car.limit(), MessageHeaderDecoder::ENCODED_LENGTH + 42);
}

#[test]
fn display_marks_a_differing_acting_version() {
    let mut bytes = [0u8; 512];
    encode_car(&mut bytes).unwrap();

    let rendered = car_at_version(&bytes, 0).to_string();
    assert!(rendered.starts_with("[Car](sbeTemplateId=1|sbeSchemaId=1|sbeSchemaVersion=0/1|sbeBlockLength=42):"));
    assert!(rendered.contains("|cupHolderCount=255|"));
    assert!(rendered.ends_with("|activationCode=0 raw bytes"));
}

#[test]
fn newer_groups_are_empty_for_older_versions() {
    let mut bytes = [0u8; 128];
    encode_service(&mut bytes, &[10, 20], b"ok").unwrap();

    let mut older = decode_service_at(&bytes, 0);
    let limit = older.limit();
    {
        let mut stops = older.stops();
        assert_eq!(stops.count(), 0);
        assert!(!stops.has_next());
        assert!(matches!(stops.next(), Err(CodecError::GroupExhausted { group: "stops", count: 0 })));
    }
    assert_eq!(older.limit(), limit);

    let mut current = decode_service_at(&bytes, 1);
    let mut odometers = Vec::new();
    current.stops().try_for_each(|stop| {
        odometers.push(stop.odometer());
        Ok(())
    }).unwrap();
    assert_eq!(odometers, vec![10, 20]);
    assert_eq!(current.remark_bytes(), b"ok");
}

#[test]
fn newer_sets_and_composites_are_absent_for_older_versions() {
    let mut bytes = [0u8; 128];
    encode_service(&mut bytes, &[], b"").unwrap();

    let older = decode_service_at(&bytes, 0);
    assert_eq!(older.mileage(), 120);
    assert!(older.extras().is_none());
    assert!(older.engine().is_none());

    let current = decode_service_at(&bytes, 1);
    let extras = current.extras().unwrap();
    assert!(extras.sun_roof());
    assert!(!extras.sports_pack());
    let engine = current.engine().unwrap();
    assert_eq!(engine.capacity(), 1600);
    assert_eq!(engine.manufacturer_code(), "VTC");
}
