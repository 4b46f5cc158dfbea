use std::fmt;

use byteorder::{BigEndian, ByteOrder as _, LittleEndian};

/// Byte order of a multi-byte primitive on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ByteOrder {
    #[default]
    LittleEndian,
    BigEndian,
}

macro_rules! read_multi_byte {
    ($($name:ident => $ty:ty, $read:ident, $size:expr;)*) => {
        $(
            #[inline]
            pub fn $name(&self, index: usize, order: ByteOrder) -> $ty {
                let bytes = &self.data[index..index + $size];
                match order {
                    ByteOrder::LittleEndian => LittleEndian::$read(bytes),
                    ByteOrder::BigEndian    => BigEndian::$read(bytes),
                }
            }
        )*
    };
}

macro_rules! write_multi_byte {
    ($($name:ident => $ty:ty, $write:ident, $size:expr;)*) => {
        $(
            #[inline]
            pub fn $name(&mut self, index: usize, value: $ty, order: ByteOrder) {
                let bytes = &mut self.data[index..index + $size];
                match order {
                    ByteOrder::LittleEndian => LittleEndian::$write(bytes, value),
                    ByteOrder::BigEndian    => BigEndian::$write(bytes, value),
                }
            }
        )*
    };
}

/// A read-only, offset-addressed view over an encoded message.
///
/// Decoders hold a `ReadBuf` by value; it is `Copy` so nested flyweights can
/// bind to the same bytes without borrowing the parent. Every accessor panics
/// when the requested range falls outside the underlying slice, the same way
/// slice indexing does.
///
/// ```
/// use brine_sbe_schema::{ByteOrder, ReadBuf};
///
/// let bytes = [0x2a, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x2a];
/// let buffer = ReadBuf::new(&bytes);
/// assert_eq!(buffer.get_u32(0, ByteOrder::LittleEndian), 42);
/// assert_eq!(buffer.get_u32(4, ByteOrder::BigEndian), 42);
/// ```
#[derive(Clone, Copy)]
pub struct ReadBuf<'a> {
    data: &'a [u8],
}

impl<'a> ReadBuf<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        ReadBuf { data }
    }

    /// Retrieves the underlying byte slice.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn get_u8(&self, index: usize) -> u8 {
        self.data[index]
    }

    #[inline]
    pub fn get_i8(&self, index: usize) -> i8 {
        self.data[index] as i8
    }

    read_multi_byte! {
        get_u16 => u16, read_u16, 2;
        get_i16 => i16, read_i16, 2;
        get_u32 => u32, read_u32, 4;
        get_i32 => i32, read_i32, 4;
        get_u64 => u64, read_u64, 8;
        get_i64 => i64, read_i64, 8;
        get_f32 => f32, read_f32, 4;
        get_f64 => f64, read_f64, 8;
    }

    /// Copies `dst.len()` bytes starting at `index` into `dst`.
    pub fn get_bytes(&self, index: usize, dst: &mut [u8]) {
        dst.copy_from_slice(&self.data[index..index + dst.len()]);
    }

    /// Borrows `length` bytes starting at `index` without copying.
    pub fn slice(&self, index: usize, length: usize) -> &'a [u8] {
        &self.data[index..index + length]
    }
}

impl fmt::Debug for ReadBuf<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadBuf").field("capacity", &self.data.len()).finish()
    }
}

impl<'a> From<&'a [u8]> for ReadBuf<'a> {
    fn from(data: &'a [u8]) -> Self {
        ReadBuf::new(data)
    }
}

/// An exclusive, offset-addressed view over a buffer being encoded.
///
/// Encoders own a `WriteBuf`; nested flyweights (composites, sets, groups)
/// receive a [`WriteBuf::reborrow`] of their parent's view, so the borrow
/// checker keeps only one writer active at a time.
///
/// ```
/// use brine_sbe_schema::{ByteOrder, WriteBuf};
///
/// let mut bytes = [0u8; 4];
/// let mut buffer = WriteBuf::new(&mut bytes);
/// buffer.put_i16(0, -2, ByteOrder::BigEndian);
/// buffer.put_u8(2, 7);
/// assert_eq!(bytes, [0xff, 0xfe, 7, 0]);
/// ```
pub struct WriteBuf<'a> {
    data: &'a mut [u8],
}

impl<'a> WriteBuf<'a> {
    pub fn new(data: &'a mut [u8]) -> Self {
        WriteBuf { data }
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// A shorter-lived view over the same bytes, used to bind nested flyweights.
    pub fn reborrow(&mut self) -> WriteBuf<'_> {
        WriteBuf { data: &mut *self.data }
    }

    /// A read-only view over the same bytes.
    pub fn as_read(&self) -> ReadBuf<'_> {
        ReadBuf { data: &*self.data }
    }

    #[inline]
    pub fn get_u8(&self, index: usize) -> u8 {
        self.data[index]
    }

    #[inline]
    pub fn get_i8(&self, index: usize) -> i8 {
        self.data[index] as i8
    }

    read_multi_byte! {
        get_u16 => u16, read_u16, 2;
        get_i16 => i16, read_i16, 2;
        get_u32 => u32, read_u32, 4;
        get_i32 => i32, read_i32, 4;
        get_u64 => u64, read_u64, 8;
        get_i64 => i64, read_i64, 8;
        get_f32 => f32, read_f32, 4;
        get_f64 => f64, read_f64, 8;
    }

    #[inline]
    pub fn put_u8(&mut self, index: usize, value: u8) {
        self.data[index] = value;
    }

    #[inline]
    pub fn put_i8(&mut self, index: usize, value: i8) {
        self.data[index] = value as u8;
    }

    write_multi_byte! {
        put_u16 => u16, write_u16, 2;
        put_i16 => i16, write_i16, 2;
        put_u32 => u32, write_u32, 4;
        put_i32 => i32, write_i32, 4;
        put_u64 => u64, write_u64, 8;
        put_i64 => i64, write_i64, 8;
        put_f32 => f32, write_f32, 4;
        put_f64 => f64, write_f64, 8;
    }

    pub fn get_bytes(&self, index: usize, dst: &mut [u8]) {
        dst.copy_from_slice(&self.data[index..index + dst.len()]);
    }

    /// Copies all of `src` into the buffer starting at `index`.
    pub fn put_bytes(&mut self, index: usize, src: &[u8]) {
        self.data[index..index + src.len()].copy_from_slice(src);
    }

    /// Writes `length` copies of `value` starting at `index`.
    pub fn set_memory(&mut self, index: usize, length: usize, value: u8) {
        self.data[index..index + length].fill(value);
    }
}

impl fmt::Debug for WriteBuf<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteBuf").field("capacity", &self.data.len()).finish()
    }
}

impl<'a> From<&'a mut [u8]> for WriteBuf<'a> {
    fn from(data: &'a mut [u8]) -> Self {
        WriteBuf::new(data)
    }
}

#[test]
fn read_single_bytes() {
    let buffer = ReadBuf::new(&[0, 1, 254, 255]);
    assert_eq!(buffer.get_u8(0), 0);
    assert_eq!(buffer.get_u8(2), 254);
    assert_eq!(buffer.get_i8(3), -1);
    assert_eq!(buffer.capacity(), 4);
}

#[test]
fn read_respects_byte_order() {
    let bytes = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
    let buffer = ReadBuf::new(&bytes);
    assert_eq!(buffer.get_u16(0, ByteOrder::LittleEndian), 0x0201);
    assert_eq!(buffer.get_u16(0, ByteOrder::BigEndian), 0x0102);
    assert_eq!(buffer.get_u32(4, ByteOrder::LittleEndian), 0x0807_0605);
    assert_eq!(buffer.get_u64(0, ByteOrder::BigEndian), 0x0102_0304_0506_0708);
}

#[test]
fn read_slices_alias_memory() {
    let bytes = [9, 8, 7, 6];
    let buffer = ReadBuf::new(&bytes);
    assert_eq!(buffer.slice(1, 2), &[8, 7]);
    assert_eq!(buffer.slice(4, 0), &[] as &[u8]);

    let mut dst = [0u8; 3];
    buffer.get_bytes(1, &mut dst);
    assert_eq!(dst, [8, 7, 6]);
}

#[test]
#[should_panic]
fn read_out_of_bounds_panics() {
    let buffer = ReadBuf::new(&[1, 2, 3]);
    buffer.get_u32(0, ByteOrder::LittleEndian);
}

#[cfg(test)]
fn write_once(size: usize, cb: fn(&mut WriteBuf)) -> Vec<u8> {
    let mut bytes = vec![0u8; size];
    cb(&mut WriteBuf::new(&mut bytes));
    bytes
}

#[test]
fn write_signed_values() {
    assert_eq!(write_once(1, |bb| bb.put_i8(0, -128)), [0x80]);
    assert_eq!(write_once(2, |bb| bb.put_i16(0, -2, ByteOrder::LittleEndian)), [0xfe, 0xff]);
    assert_eq!(write_once(4, |bb| bb.put_i32(0, -1, ByteOrder::BigEndian)), [0xff; 4]);
    assert_eq!(
        write_once(8, |bb| bb.put_i64(0, 1, ByteOrder::BigEndian)),
        [0, 0, 0, 0, 0, 0, 0, 1]
    );
}

#[test]
fn write_floats() {
    assert_eq!(
        write_once(4, |bb| bb.put_f32(0, 1.0, ByteOrder::LittleEndian)),
        [0x00, 0x00, 0x80, 0x3f]
    );
    assert_eq!(
        write_once(8, |bb| bb.put_f64(0, -2.0, ByteOrder::BigEndian)),
        [0xc0, 0, 0, 0, 0, 0, 0, 0]
    );
}

#[test]
fn write_bytes_and_fill() {
    let mut bytes = [0u8; 6];
    let mut buffer = WriteBuf::new(&mut bytes);
    buffer.put_bytes(1, &[1, 2, 3]);
    buffer.set_memory(4, 2, 0xaa);
    buffer.put_bytes(0, &[]);
    assert_eq!(bytes, [0, 1, 2, 3, 0xaa, 0xaa]);
}

#[test]
fn reborrowed_views_share_bytes() {
    let mut bytes = [0u8; 4];
    let mut buffer = WriteBuf::new(&mut bytes);
    {
        let mut nested = buffer.reborrow();
        nested.put_u16(2, 0xbeef, ByteOrder::LittleEndian);
    }
    assert_eq!(buffer.as_read().get_u16(2, ByteOrder::LittleEndian), 0xbeef);
    assert_eq!(buffer.get_u8(2), 0xef);
}

#[cfg(test)]
use proptest::prelude::*;

#[cfg(test)]
fn byte_order() -> impl Strategy<Value = ByteOrder> {
    prop_oneof![Just(ByteOrder::LittleEndian), Just(ByteOrder::BigEndian)]
}

#[cfg(test)]
proptest! {
    #[test]
    fn integers_round_trip_at_any_offset(
        offset in 0usize..8,
        order in byte_order(),
        a in any::<u16>(),
        b in any::<i32>(),
        c in any::<u64>(),
    ) {
        let mut bytes = [0u8; 24];
        let mut buffer = WriteBuf::new(&mut bytes);
        buffer.put_u16(offset, a, order);
        buffer.put_i32(offset + 2, b, order);
        buffer.put_u64(offset + 6, c, order);

        let read = ReadBuf::new(&bytes);
        prop_assert_eq!(read.get_u16(offset, order), a);
        prop_assert_eq!(read.get_i32(offset + 2, order), b);
        prop_assert_eq!(read.get_u64(offset + 6, order), c);
        // Nothing outside the written range moves.
        prop_assert!(bytes[..offset].iter().all(|&byte| byte == 0));
        prop_assert!(bytes[offset + 14..].iter().all(|&byte| byte == 0));
    }

    #[test]
    fn floats_round_trip_bit_for_bit(order in byte_order(), single in any::<f32>(), double in any::<f64>()) {
        let mut bytes = [0u8; 12];
        let mut buffer = WriteBuf::new(&mut bytes);
        buffer.put_f32(0, single, order);
        buffer.put_f64(4, double, order);

        let read = ReadBuf::new(&bytes);
        prop_assert_eq!(read.get_f32(0, order).to_bits(), single.to_bits());
        prop_assert_eq!(read.get_f64(4, order).to_bits(), double.to_bits());
    }

    #[test]
    fn byte_orders_mirror_each_other(value in any::<u32>()) {
        let mut little = [0u8; 4];
        let mut big = [0u8; 4];
        WriteBuf::new(&mut little).put_u32(0, value, ByteOrder::LittleEndian);
        WriteBuf::new(&mut big).put_u32(0, value, ByteOrder::BigEndian);
        big.reverse();
        prop_assert_eq!(little, big);
    }
}
