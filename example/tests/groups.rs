use brine_sbe::{CodecError, WriteBuf};
use example_app::codecs::*;
use example_app::{decode_order, encode_order};
use test_case::test_case;

#[test_case(0 ; "empty group")]
#[test_case(1 ; "single repetition")]
#[test_case(10 ; "declared maximum")]
fn counts_within_bounds_are_accepted(count: u16) {
    let prices: Vec<i16> = (0..count as i16).collect();
    let mut bytes = [0u8; 128];
    encode_order(&mut bytes, 1, &prices, "").unwrap();

    let mut order = decode_order(&bytes);
    let mut fills = order.fills();
    assert_eq!(fills.count(), count as usize);
    let mut decoded = Vec::new();
    while fills.has_next() {
        decoded.push(fills.next().unwrap().price());
    }
    assert_eq!(decoded, prices);
}

#[test]
fn count_above_maximum_writes_nothing() {
    let mut bytes = [0u8; 128];
    let limit_before;
    {
        let mut order = OrderEncoder::wrap_and_apply_header(WriteBuf::new(&mut bytes), 0);
        order.set_quantity(5);
        limit_before = order.limit();
        let err = order.fills_count(OrderFillsEncoder::SBE_MAX_COUNT + 1).unwrap_err();
        assert_eq!(err, CodecError::CountOutOfRange { group: "fills", count: 11, min: 0, max: 10 });
        assert_eq!(order.limit(), limit_before);
    }
    // The dimension header position is still untouched.
    assert!(bytes[limit_before..limit_before + OrderFillsEncoder::SBE_HEADER_SIZE].iter().all(|b| *b == 0));
}

#[test]
fn next_past_the_count_fails() {
    let mut bytes = [0u8; 128];
    encode_order(&mut bytes, 1, &[7, 8], "").unwrap();

    let mut order = decode_order(&bytes);
    let mut fills = order.fills();
    assert_eq!(fills.index(), -1);
    fills.next().unwrap();
    fills.next().unwrap();
    assert_eq!(fills.index(), 1);
    assert!(!fills.has_next());
    assert_eq!(fills.next().unwrap_err(), CodecError::GroupExhausted { group: "fills", count: 2 });
}

#[test]
fn encoder_stops_at_declared_count() {
    let mut bytes = [0u8; 128];
    let mut order = OrderEncoder::wrap_and_apply_header(WriteBuf::new(&mut bytes), 0);
    let mut fills = order.fills_count(1).unwrap();
    fills.next().unwrap().set_price(3);
    assert!(matches!(fills.next(), Err(CodecError::GroupExhausted { .. })));
}

#[test]
fn each_repetition_advances_the_shared_limit() {
    let mut bytes = [0u8; 128];
    encode_order(&mut bytes, 1, &[1, 2, 3], "xyz").unwrap();

    let mut order = decode_order(&bytes);
    let block_end = MessageHeaderDecoder::ENCODED_LENGTH + OrderDecoder::BLOCK_LENGTH as usize;
    assert_eq!(order.limit(), block_end);
    {
        let mut fills = order.fills();
        assert_eq!(fills.limit(), block_end + OrderFillsDecoder::SBE_HEADER_SIZE);
        fills.next().unwrap();
        assert_eq!(fills.offset(), block_end + OrderFillsDecoder::SBE_HEADER_SIZE);
        fills.try_for_each(|_| Ok(())).unwrap();
    }
    assert_eq!(order.limit(), block_end + 4 + 3 * 2);
    assert_eq!(order.note(), "xyz");
}

#[test]
fn nested_groups_share_the_message_cursor() {
    let mut bytes = [0u8; 512];
    example_app::encode_car(&mut bytes).unwrap();
    let mut car = example_app::decode_car(&bytes);

    car.fuel_figures()
        .try_for_each(|figure| {
            figure.skip_usage_description();
            Ok(())
        })
        .unwrap();

    let mut performance = car.performance_figures();
    let mut repetitions = 0;
    while performance.has_next() {
        let figure = performance.next().unwrap();
        let mut acceleration = figure.acceleration();
        assert_eq!(acceleration.count(), 3);
        while acceleration.has_next() {
            acceleration.next().unwrap();
        }
        repetitions += 1;
    }
    assert_eq!(repetitions, 2);
    assert_eq!(car.manufacturer(), "Honda");
}
