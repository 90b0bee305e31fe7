//! Cache domain - Typed storage of scalar and binary values

mod key;
mod typed;
mod value;

pub use key::{KeyGenerator, SequentialKeyGenerator, UuidKeyGenerator};
pub use typed::TypedCache;
pub use value::{
    decode_bytes, decode_float, decode_int, decode_string, format_float, StoredValue,
};
