//! Canonical text forms for recorded arguments and results

use crate::domain::cache::{format_float, StoredValue};

/// Deterministic, human-readable text form of a value
///
/// `normalize` is the form recorded for a bare value (a returned key is
/// recorded as its plain text). `normalize_element` is the form used inside
/// an argument tuple, where strings are quoted so `('1',)` and `(1,)` stay
/// distinct.
pub trait Normalize {
    fn normalize(&self) -> String;

    fn normalize_element(&self) -> String {
        self.normalize()
    }
}

fn quote_str(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);

    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }

    out.push(quote);
    out
}

fn quote_bytes(bytes: &[u8]) -> String {
    let quote = if bytes.contains(&b'\'') && !bytes.contains(&b'"') {
        b'"'
    } else {
        b'\''
    };

    let mut out = String::with_capacity(bytes.len() + 3);
    out.push('b');
    out.push(quote as char);

    for &b in bytes {
        match b {
            b'\\' => out.push_str("\\\\"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            b if b == quote => {
                out.push('\\');
                out.push(b as char);
            }
            0x20..=0x7e => out.push(b as char),
            b => out.push_str(&format!("\\x{:02x}", b)),
        }
    }

    out.push(quote as char);
    out
}

impl Normalize for str {
    fn normalize(&self) -> String {
        self.to_string()
    }

    fn normalize_element(&self) -> String {
        quote_str(self)
    }
}

impl Normalize for String {
    fn normalize(&self) -> String {
        self.clone()
    }

    fn normalize_element(&self) -> String {
        quote_str(self)
    }
}

impl Normalize for [u8] {
    fn normalize(&self) -> String {
        quote_bytes(self)
    }
}

impl Normalize for Vec<u8> {
    fn normalize(&self) -> String {
        quote_bytes(self)
    }
}

impl Normalize for f64 {
    fn normalize(&self) -> String {
        format_float(*self)
    }
}

impl Normalize for bool {
    fn normalize(&self) -> String {
        let text = if *self { "True" } else { "False" };
        text.to_string()
    }
}

macro_rules! normalize_integer {
    ($($t:ty),*) => {
        $(
            impl Normalize for $t {
                fn normalize(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

normalize_integer!(i32, i64, u32, u64, usize);

impl<T: Normalize + ?Sized> Normalize for &T {
    fn normalize(&self) -> String {
        (**self).normalize()
    }

    fn normalize_element(&self) -> String {
        (**self).normalize_element()
    }
}

impl<T: Normalize> Normalize for Option<T> {
    fn normalize(&self) -> String {
        match self {
            Some(value) => value.normalize(),
            None => "None".to_string(),
        }
    }

    fn normalize_element(&self) -> String {
        match self {
            Some(value) => value.normalize_element(),
            None => "None".to_string(),
        }
    }
}

impl Normalize for Vec<String> {
    fn normalize(&self) -> String {
        let items: Vec<String> = self.iter().map(|item| item.normalize_element()).collect();
        format!("[{}]", items.join(", "))
    }
}

impl Normalize for StoredValue {
    fn normalize(&self) -> String {
        match self {
            StoredValue::Str(s) => s.normalize(),
            StoredValue::Bytes(b) => b.normalize(),
            StoredValue::Int(i) => i.normalize(),
            StoredValue::Float(f) => f.normalize(),
        }
    }

    fn normalize_element(&self) -> String {
        match self {
            StoredValue::Str(s) => s.normalize_element(),
            _ => self.normalize(),
        }
    }
}

impl Normalize for () {
    fn normalize(&self) -> String {
        "()".to_string()
    }
}

impl<A: Normalize> Normalize for (A,) {
    fn normalize(&self) -> String {
        format!("({},)", self.0.normalize_element())
    }
}

macro_rules! normalize_tuple {
    ($($name:ident . $idx:tt),+) => {
        impl<$($name: Normalize),+> Normalize for ($($name,)+) {
            fn normalize(&self) -> String {
                let items = [$(self.$idx.normalize_element()),+];
                format!("({})", items.join(", "))
            }
        }
    };
}

normalize_tuple!(A.0, B.1);
normalize_tuple!(A.0, B.1, C.2);
normalize_tuple!(A.0, B.1, C.2, D.3);
