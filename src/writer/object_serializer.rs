//! PDF object serialization.
//!
//! Output is compact: no whitespace inside dictionaries beyond the single
//! space between a key and its value (ISO 32000-1, 7.3).

use crate::object::{Dict, Object};
use std::io::{self, Write};

/// Writes [`Object`]s in PDF syntax.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectSerializer;

impl ObjectSerializer {
    /// Create a serializer.
    pub fn new() -> Self {
        Self
    }

    /// Write `obj` as a direct object.
    pub fn write<W: Write>(&self, w: &mut W, obj: &Object) -> io::Result<()> {
        match obj {
            Object::Integer(i) => write!(w, "{}", i),
            Object::Real(r) => w.write_all(format_real(*r).as_bytes()),
            Object::String(s) => write_string(w, s),
            Object::Name(n) => write_name(w, n),
            Object::Array(items) => {
                w.write_all(b"[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        w.write_all(b" ")?;
                    }
                    self.write(w, item)?;
                }
                w.write_all(b"]")
            },
            Object::Dictionary(dict) => self.write_dict(w, dict),
            Object::Stream { dict, data } => {
                self.write_dict(w, dict)?;
                w.write_all(b"\nstream\n")?;
                w.write_all(data)?;
                w.write_all(b"\nendstream")
            },
            Object::Reference(r) => write!(w, "{}", r),
        }
    }

    /// Write `obj` as indirect object `id`, generation 0.
    pub fn write_indirect<W: Write>(&self, w: &mut W, id: u32, obj: &Object) -> io::Result<()> {
        writeln!(w, "{} 0 obj", id)?;
        self.write(w, obj)?;
        w.write_all(b"\nendobj\n")
    }

    /// Serialize to a byte vector.
    pub fn to_bytes(&self, obj: &Object) -> Vec<u8> {
        let mut buf = Vec::new();
        // io::Write for Vec never fails
        let _ = self.write(&mut buf, obj);
        buf
    }

    fn write_dict<W: Write>(&self, w: &mut W, dict: &Dict) -> io::Result<()> {
        w.write_all(b"<<")?;
        for (key, value) in dict {
            write_name(w, key)?;
            w.write_all(b" ")?;
            self.write(w, value)?;
        }
        w.write_all(b">>")
    }
}

/// At most five decimals, trailing zeros dropped; integral values print bare.
fn format_real(value: f64) -> String {
    if value.fract() == 0.0 {
        return format!("{}", value as i64);
    }
    let mut text = format!("{:.5}", value);
    while text.ends_with('0') {
        text.pop();
    }
    if text.ends_with('.') {
        text.pop();
    }
    text
}

/// Printable ASCII goes out as a literal string, anything else as hex.
fn write_string<W: Write>(w: &mut W, data: &[u8]) -> io::Result<()> {
    if !data.iter().all(|b| (0x20..=0x7E).contains(b)) {
        w.write_all(b"<")?;
        for b in data {
            write!(w, "{:02X}", b)?;
        }
        return w.write_all(b">");
    }

    w.write_all(b"(")?;
    for &b in data {
        if matches!(b, b'(' | b')' | b'\\') {
            w.write_all(b"\\")?;
        }
        w.write_all(&[b])?;
    }
    w.write_all(b")")
}

/// Regular characters pass; delimiters, `#` and bytes outside `!`..`~` become `#XX`.
fn write_name<W: Write>(w: &mut W, name: &str) -> io::Result<()> {
    w.write_all(b"/")?;
    for b in name.bytes() {
        let delimiter = matches!(b, b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%' | b'#');
        if (b'!'..=b'~').contains(&b) && !delimiter {
            w.write_all(&[b])?;
        } else {
            write!(w, "#{:02X}", b)?;
        }
    }
    Ok(())
}
