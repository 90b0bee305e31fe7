//! Stored value variants and their byte encodings

use crate::domain::DomainError;

/// A scalar or binary payload as written to the store
#[derive(Debug, Clone, PartialEq)]
pub enum StoredValue {
    Str(String),
    Bytes(Vec<u8>),
    Int(i64),
    Float(f64),
}

impl StoredValue {
    /// Encodes the value the way the store keeps it
    ///
    /// Strings are UTF-8, integers decimal, floats their shortest
    /// round-trip form (`3.0`, `1.5`), bytes verbatim.
    pub fn encode(&self) -> Vec<u8> {
        match self {
            StoredValue::Str(s) => s.as_bytes().to_vec(),
            StoredValue::Bytes(b) => b.clone(),
            StoredValue::Int(i) => i.to_string().into_bytes(),
            StoredValue::Float(f) => format_float(*f).into_bytes(),
        }
    }

    /// Returns the variant name
    pub fn kind(&self) -> &'static str {
        match self {
            StoredValue::Str(_) => "str",
            StoredValue::Bytes(_) => "bytes",
            StoredValue::Int(_) => "int",
            StoredValue::Float(_) => "float",
        }
    }
}

/// Formats a float the way Python's `repr` does: shortest round-trip
/// digits, a trailing `.0` for integral values, and a signed exponent of
/// at least two digits (`1e+20`, `1.5e-07`)
pub fn format_float(f: f64) -> String {
    if f.is_nan() {
        "nan".to_string()
    } else if f == f64::INFINITY {
        "inf".to_string()
    } else if f == f64::NEG_INFINITY {
        "-inf".to_string()
    } else {
        signed_exponent(format!("{:?}", f))
    }
}

// `{:?}` switches to scientific notation at the same magnitudes as Python
// but writes the exponent bare (`1e20`, `1.5e-7`)
fn signed_exponent(text: String) -> String {
    match text.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => text,
    }
}

impl From<String> for StoredValue {
    fn from(value: String) -> Self {
        StoredValue::Str(value)
    }
}

impl From<&str> for StoredValue {
    fn from(value: &str) -> Self {
        StoredValue::Str(value.to_string())
    }
}

impl From<Vec<u8>> for StoredValue {
    fn from(value: Vec<u8>) -> Self {
        StoredValue::Bytes(value)
    }
}

impl From<&[u8]> for StoredValue {
    fn from(value: &[u8]) -> Self {
        StoredValue::Bytes(value.to_vec())
    }
}

impl<const N: usize> From<&[u8; N]> for StoredValue {
    fn from(value: &[u8; N]) -> Self {
        StoredValue::Bytes(value.to_vec())
    }
}

impl From<i64> for StoredValue {
    fn from(value: i64) -> Self {
        StoredValue::Int(value)
    }
}

impl From<i32> for StoredValue {
    fn from(value: i32) -> Self {
        StoredValue::Int(i64::from(value))
    }
}

impl From<u32> for StoredValue {
    fn from(value: u32) -> Self {
        StoredValue::Int(i64::from(value))
    }
}

impl From<f64> for StoredValue {
    fn from(value: f64) -> Self {
        StoredValue::Float(value)
    }
}

/// Identity decode
pub fn decode_bytes(raw: Vec<u8>) -> Result<Vec<u8>, DomainError> {
    Ok(raw)
}

/// UTF-8 decode
pub fn decode_string(raw: Vec<u8>) -> Result<String, DomainError> {
    String::from_utf8(raw)
        .map_err(|e| DomainError::decode(format!("Value is not valid UTF-8: {}", e)))
}

/// Integer-parse decode
pub fn decode_int(raw: Vec<u8>) -> Result<i64, DomainError> {
    let text = decode_string(raw)?;

    text.trim()
        .parse()
        .map_err(|e| DomainError::decode(format!("Value '{}' is not an integer: {}", text, e)))
}

/// Float-parse decode
pub fn decode_float(raw: Vec<u8>) -> Result<f64, DomainError> {
    let text = decode_string(raw)?;

    text.trim()
        .parse()
        .map_err(|e| DomainError::decode(format!("Value '{}' is not a float: {}", text, e)))
}
