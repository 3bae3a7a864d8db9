use std::cmp::Ordering;
use std::fmt;

use uuid::Uuid;

use crate::error::{Error, Result};
use crate::key_bytes::KeyBytes;
use crate::types::AllowSpecial;
use crate::util::{debug_hex, format_bytes_as_str};
use crate::value::ValueType;

/// Flips the sign bit so negative numbers sort before positive ones.
const SIGN_FLIP_I64: u64 = 0x8000_0000_0000_0000;
const SIGN_FLIP_I32: u32 = 0x8000_0000;

/// Inside strings, 0x00 is written as 0x00 0x01.
const ESCAPE_BYTE: u8 = 0x01;
/// Strings end with 0x00 0x00.
const TERMINATOR: u8 = 0x00;

/// A single typed key component.
///
/// The variant determines the value-type tag; the order defined by `Ord`
/// is exactly the byte order of the key encoding produced by
/// [`PrimitiveValue::append_to_key`].
#[derive(Debug, Clone, Default)]
pub enum PrimitiveValue {
    #[default]
    Null,
    Bool(bool),
    Int32(i32),
    Int64(i64),
    UInt32(u32),
    Double(f64),
    /// Arbitrary bytes, usually UTF-8 text.
    String(Vec<u8>),
    /// Microseconds since the Unix epoch.
    Timestamp(i64),
    Uuid(Uuid),
    ColumnId(u32),
    SystemColumnId(u32),
    ArrayIndex(i64),
    Lowest,
    Highest,
    MaxByte,
}

impl PrimitiveValue {
    pub fn string(bytes: impl Into<Vec<u8>>) -> Self {
        PrimitiveValue::String(bytes.into())
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            PrimitiveValue::Null => ValueType::Null,
            PrimitiveValue::Bool(false) => ValueType::False,
            PrimitiveValue::Bool(true) => ValueType::True,
            PrimitiveValue::Int32(_) => ValueType::Int32,
            PrimitiveValue::Int64(_) => ValueType::Int64,
            PrimitiveValue::UInt32(_) => ValueType::UInt32,
            PrimitiveValue::Double(_) => ValueType::Double,
            PrimitiveValue::String(_) => ValueType::String,
            PrimitiveValue::Timestamp(_) => ValueType::Timestamp,
            PrimitiveValue::Uuid(_) => ValueType::Uuid,
            PrimitiveValue::ColumnId(_) => ValueType::ColumnId,
            PrimitiveValue::SystemColumnId(_) => ValueType::SystemColumnId,
            PrimitiveValue::ArrayIndex(_) => ValueType::ArrayIndex,
            PrimitiveValue::Lowest => ValueType::Lowest,
            PrimitiveValue::Highest => ValueType::Highest,
            PrimitiveValue::MaxByte => ValueType::MaxByte,
        }
    }

    pub fn is_special(&self) -> bool {
        self.value_type().is_special()
    }

    /// Append the tag and the order-preserving payload to `out`.
    pub fn append_to_key(&self, out: &mut KeyBytes) {
        out.append_value_type(self.value_type());
        match self {
            PrimitiveValue::Null
            | PrimitiveValue::Bool(_)
            | PrimitiveValue::Lowest
            | PrimitiveValue::Highest
            | PrimitiveValue::MaxByte => {}
            PrimitiveValue::Int32(v) => out.append_u32((*v as u32) ^ SIGN_FLIP_I32),
            PrimitiveValue::Int64(v)
            | PrimitiveValue::Timestamp(v)
            | PrimitiveValue::ArrayIndex(v) => out.append_u64((*v as u64) ^ SIGN_FLIP_I64),
            PrimitiveValue::UInt32(v)
            | PrimitiveValue::ColumnId(v)
            | PrimitiveValue::SystemColumnId(v) => out.append_u32(*v),
            PrimitiveValue::Double(v) => out.append_u64(sortable_f64(*v)),
            PrimitiveValue::String(bytes) => out.append_string(bytes),
            PrimitiveValue::Uuid(uuid) => out.append_raw_bytes(uuid.as_bytes()),
        }
    }

    /// Encode this single value as a standalone key.
    pub fn to_key_bytes(&self) -> KeyBytes {
        let mut out = KeyBytes::new();
        self.append_to_key(&mut out);
        out
    }

    /// Consume one value from the front of `input`.
    ///
    /// With `out == None` the value is only skipped, which is how encoded
    /// lengths are measured without allocating. `input` is advanced only on
    /// success.
    pub fn decode_key(
        input: &mut &[u8],
        out: Option<&mut PrimitiveValue>,
        allow_special: AllowSpecial,
    ) -> Result<()> {
        let original = *input;
        let Some((&tag, mut rest)) = original.split_first() else {
            return Err(Error::Corruption(
                "cannot decode a primitive value in a key from an empty slice".into(),
            ));
        };
        let value_type = ValueType::from_u8(tag)
            .filter(|vt| vt.is_primitive() || (allow_special.allowed() && vt.is_special()))
            .ok_or_else(|| {
                Error::Corruption(format!(
                    "cannot decode value type 0x{tag:02x} from the key encoding format: {}",
                    debug_hex(original)
                ))
            })?;

        let value = match value_type {
            ValueType::Null => PrimitiveValue::Null,
            ValueType::False => PrimitiveValue::Bool(false),
            ValueType::True => PrimitiveValue::Bool(true),
            ValueType::Lowest => PrimitiveValue::Lowest,
            ValueType::Highest => PrimitiveValue::Highest,
            ValueType::MaxByte => PrimitiveValue::MaxByte,
            ValueType::Int32 => {
                let raw = u32::from_be_bytes(take::<4>(&mut rest, "int32", original)?);
                PrimitiveValue::Int32((raw ^ SIGN_FLIP_I32) as i32)
            }
            ValueType::Int64 => PrimitiveValue::Int64(take_i64(&mut rest, "int64", original)?),
            ValueType::Timestamp => {
                PrimitiveValue::Timestamp(take_i64(&mut rest, "timestamp", original)?)
            }
            ValueType::ArrayIndex => {
                PrimitiveValue::ArrayIndex(take_i64(&mut rest, "array index", original)?)
            }
            ValueType::UInt32 => {
                PrimitiveValue::UInt32(u32::from_be_bytes(take::<4>(&mut rest, "uint32", original)?))
            }
            ValueType::ColumnId => PrimitiveValue::ColumnId(u32::from_be_bytes(take::<4>(
                &mut rest,
                "column id",
                original,
            )?)),
            ValueType::SystemColumnId => PrimitiveValue::SystemColumnId(u32::from_be_bytes(
                take::<4>(&mut rest, "system column id", original)?,
            )),
            ValueType::Double => {
                let raw = u64::from_be_bytes(take::<8>(&mut rest, "double", original)?);
                PrimitiveValue::Double(f64_from_sortable(raw))
            }
            ValueType::Uuid => {
                PrimitiveValue::Uuid(Uuid::from_bytes(take::<16>(&mut rest, "uuid", original)?))
            }
            ValueType::String => {
                if out.is_none() {
                    let consumed = decode_escaped(rest, None)?;
                    rest = &rest[consumed..];
                    *input = rest;
                    return Ok(());
                }
                let mut bytes = Vec::new();
                let consumed = decode_escaped(rest, Some(&mut bytes))?;
                rest = &rest[consumed..];
                PrimitiveValue::String(bytes)
            }
            other => {
                return Err(Error::Corruption(format!(
                    "value type {other} is not a primitive value: {}",
                    debug_hex(original)
                )));
            }
        };

        if let Some(out) = out {
            *out = value;
        }
        *input = rest;
        Ok(())
    }

    /// Decode one value into `self`, advancing `input`.
    pub fn decode_from_key(&mut self, input: &mut &[u8]) -> Result<()> {
        Self::decode_key(input, Some(self), AllowSpecial::No)
    }

    /// Decode one value from the front of `input`.
    pub fn decode(input: &mut &[u8]) -> Result<PrimitiveValue> {
        let mut value = PrimitiveValue::Null;
        value.decode_from_key(input)?;
        Ok(value)
    }
}

fn take<const N: usize>(rest: &mut &[u8], what: &str, original: &[u8]) -> Result<[u8; N]> {
    if rest.len() < N {
        return Err(Error::Corruption(format!(
            "not enough bytes to decode {what}: need {N}, have {} in {}",
            rest.len(),
            debug_hex(original)
        )));
    }
    let (head, tail) = rest.split_at(N);
    *rest = tail;
    let mut buf = [0u8; N];
    buf.copy_from_slice(head);
    Ok(buf)
}

fn take_i64(rest: &mut &[u8], what: &str, original: &[u8]) -> Result<i64> {
    let raw = u64::from_be_bytes(take::<8>(rest, what, original)?);
    Ok((raw ^ SIGN_FLIP_I64) as i64)
}

/// Walk a zero-escaped string payload. Returns the number of bytes consumed
/// including the terminator.
fn decode_escaped(data: &[u8], mut out: Option<&mut Vec<u8>>) -> Result<usize> {
    let mut i = 0;
    while i < data.len() {
        if data[i] != 0x00 {
            if let Some(out) = out.as_deref_mut() {
                out.push(data[i]);
            }
            i += 1;
            continue;
        }
        match data.get(i + 1) {
            Some(&TERMINATOR) => return Ok(i + 2),
            Some(&ESCAPE_BYTE) => {
                if let Some(out) = out.as_deref_mut() {
                    out.push(0x00);
                }
                i += 2;
            }
            Some(other) => {
                return Err(Error::Corruption(format!(
                    "invalid escape sequence 0x00 0x{other:02x} in string: {}",
                    debug_hex(data)
                )));
            }
            None => break,
        }
    }
    Err(Error::Corruption(format!(
        "missing terminator in encoded string: {}",
        debug_hex(data)
    )))
}

/// Order-preserving bit pattern of a double. NaN sorts last.
fn sortable_f64(f: f64) -> u64 {
    if f.is_nan() {
        return u64::MAX;
    }
    let bits = f.to_bits();
    if bits & SIGN_FLIP_I64 == 0 {
        bits ^ SIGN_FLIP_I64
    } else {
        !bits
    }
}

fn f64_from_sortable(encoded: u64) -> f64 {
    if encoded == u64::MAX {
        f64::NAN
    } else if encoded & SIGN_FLIP_I64 != 0 {
        f64::from_bits(encoded ^ SIGN_FLIP_I64)
    } else {
        f64::from_bits(!encoded)
    }
}

impl Ord for PrimitiveValue {
    fn cmp(&self, other: &Self) -> Ordering {
        use PrimitiveValue::*;
        self.value_type()
            .cmp(&other.value_type())
            .then_with(|| match (self, other) {
                (Int32(a), Int32(b)) => a.cmp(b),
                (Int64(a), Int64(b)) | (Timestamp(a), Timestamp(b)) | (ArrayIndex(a), ArrayIndex(b)) => {
                    a.cmp(b)
                }
                (UInt32(a), UInt32(b))
                | (ColumnId(a), ColumnId(b))
                | (SystemColumnId(a), SystemColumnId(b)) => a.cmp(b),
                (Double(a), Double(b)) => sortable_f64(*a).cmp(&sortable_f64(*b)),
                // The escaping keeps raw byte order.
                (String(a), String(b)) => a.cmp(b),
                (Uuid(a), Uuid(b)) => a.as_bytes().cmp(b.as_bytes()),
                _ => Ordering::Equal,
            })
    }
}

impl PartialOrd for PrimitiveValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for PrimitiveValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PrimitiveValue {}

impl fmt::Display for PrimitiveValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimitiveValue::Null => f.write_str("null"),
            PrimitiveValue::Bool(b) => write!(f, "{b}"),
            PrimitiveValue::Int32(v) => write!(f, "{v}"),
            PrimitiveValue::Int64(v) => write!(f, "{v}"),
            PrimitiveValue::UInt32(v) => write!(f, "{v}"),
            PrimitiveValue::Double(v) => write!(f, "{v:?}"),
            PrimitiveValue::String(bytes) => f.write_str(&format_bytes_as_str(bytes)),
            PrimitiveValue::Timestamp(micros) => write!(f, "Timestamp({micros})"),
            PrimitiveValue::Uuid(uuid) => write!(f, "{uuid}"),
            PrimitiveValue::ColumnId(id) => write!(f, "ColumnId({id})"),
            PrimitiveValue::SystemColumnId(id) => write!(f, "SystemColumnId({id})"),
            PrimitiveValue::ArrayIndex(idx) => write!(f, "ArrayIndex({idx})"),
            PrimitiveValue::Lowest => f.write_str("-Inf"),
            PrimitiveValue::Highest => f.write_str("+Inf"),
            PrimitiveValue::MaxByte => f.write_str("0xff"),
        }
    }
}

impl From<&str> for PrimitiveValue {
    fn from(s: &str) -> Self {
        PrimitiveValue::String(s.as_bytes().to_vec())
    }
}

impl From<String> for PrimitiveValue {
    fn from(s: String) -> Self {
        PrimitiveValue::String(s.into_bytes())
    }
}

impl From<&[u8]> for PrimitiveValue {
    fn from(bytes: &[u8]) -> Self {
        PrimitiveValue::String(bytes.to_vec())
    }
}

impl From<bool> for PrimitiveValue {
    fn from(b: bool) -> Self {
        PrimitiveValue::Bool(b)
    }
}

impl From<i32> for PrimitiveValue {
    fn from(v: i32) -> Self {
        PrimitiveValue::Int32(v)
    }
}

impl From<i64> for PrimitiveValue {
    fn from(v: i64) -> Self {
        PrimitiveValue::Int64(v)
    }
}

impl From<u32> for PrimitiveValue {
    fn from(v: u32) -> Self {
        PrimitiveValue::UInt32(v)
    }
}

impl From<f64> for PrimitiveValue {
    fn from(v: f64) -> Self {
        PrimitiveValue::Double(v)
    }
}

impl From<Uuid> for PrimitiveValue {
    fn from(uuid: Uuid) -> Self {
        PrimitiveValue::Uuid(uuid)
    }
}
