//! Runtime support for codecs generated by `brine-sbe-compiler`.
//!
//! Generated flyweights never own bytes. Decoders read through a [`ReadBuf`],
//! encoders write through a [`WriteBuf`], and both track how far they have
//! consumed the message with a shared [`Cursor`].
//!
//! ```
//! use brine_sbe_schema::*;
//!
//! let mut bytes = [0u8; 8];
//! let mut buffer = WriteBuf::new(&mut bytes);
//! buffer.put_u32(0, 42, ByteOrder::LittleEndian);
//! buffer.put_bytes(4, b"abc");
//!
//! let read = ReadBuf::new(&bytes);
//! assert_eq!(read.get_u32(0, ByteOrder::LittleEndian), 42);
//! assert_eq!(text::decode(read.slice(4, 3), CharacterEncoding::Utf8), "abc");
//! ```

pub mod bb;
pub mod cursor;
pub mod error;
pub mod flyweight;
pub mod text;

pub use bb::*;
pub use cursor::Cursor;
pub use error::CodecError;
pub use flyweight::*;
pub use text::CharacterEncoding;
