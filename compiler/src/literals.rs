//! Rust source text for primitive values and buffer accesses.

use crate::{
    error::GeneratorError,
    types::{ByteOrder, PrimitiveType, PrimitiveValue},
};

fn out_of_range(name: &str, value: &PrimitiveValue, primitive_type: PrimitiveType) -> GeneratorError {
    GeneratorError::ValueOutOfRange {
        name: name.to_string(),
        value: value.to_string(),
        primitive_type,
    }
}

/// A literal of `primitive_type` holding `value`, e.g. `u16::MAX`, `-5` or `f32::NAN`.
///
/// Bounds of the Rust type are spelled through its associated constants so the
/// literal never overflows when used as a pattern or a negated expression.
pub fn literal(primitive_type: PrimitiveType, value: &PrimitiveValue, name: &str) -> Result<String, GeneratorError> {
    let ty = primitive_type.rust_type();
    match primitive_type.integer_range() {
        Some((min, max)) => {
            let v = value.as_i128().ok_or_else(|| out_of_range(name, value, primitive_type))?;
            if v < min || v > max {
                return Err(out_of_range(name, value, primitive_type));
            }
            Ok(if v == max && max > 0 && primitive_type != PrimitiveType::Char {
                format!("{}::MAX", ty)
            } else if v == min && min < 0 {
                format!("{}::MIN", ty)
            } else {
                v.to_string()
            })
        }
        None => {
            let v = value.as_f64().ok_or_else(|| out_of_range(name, value, primitive_type))?;
            let type_max = if primitive_type == PrimitiveType::Float { f32::MAX as f64 } else { f64::MAX };
            Ok(if v.is_nan() {
                format!("{}::NAN", ty)
            } else if v == f64::INFINITY {
                format!("{}::INFINITY", ty)
            } else if v == f64::NEG_INFINITY {
                format!("{}::NEG_INFINITY", ty)
            } else if v == type_max {
                format!("{}::MAX", ty)
            } else if v == -type_max {
                format!("{}::MIN", ty)
            } else if v.abs() > type_max {
                return Err(out_of_range(name, value, primitive_type));
            } else {
                format!("{:?}", v)
            })
        }
    }
}

/// `base + offset`, or just `base` for a zero offset.
pub fn offset_expr(base: &str, offset: usize) -> String {
    if offset == 0 {
        base.to_string()
    } else {
        format!("{} + {}", base, offset)
    }
}

/// A read of `primitive_type` at `index` through `buffer`.
pub fn get_expr(primitive_type: PrimitiveType, buffer: &str, index: &str, order: ByteOrder) -> String {
    let ty = primitive_type.rust_type();
    if primitive_type.size() == 1 {
        format!("{}.get_{}({})", buffer, ty, index)
    } else {
        format!("{}.get_{}({}, {})", buffer, ty, index, order.runtime_path())
    }
}

/// A write of `value` as `primitive_type` at `index` through `buffer`.
pub fn put_stmt(primitive_type: PrimitiveType, buffer: &str, index: &str, value: &str, order: ByteOrder) -> String {
    let ty = primitive_type.rust_type();
    if primitive_type.size() == 1 {
        format!("{}.put_{}({}, {});", buffer, ty, index, value)
    } else {
        format!("{}.put_{}({}, {}, {});", buffer, ty, index, value, order.runtime_path())
    }
}
