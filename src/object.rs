//! PDF object model used by the writer.
//!
//! Only the object kinds the table writer emits are modelled; values are built
//! once, serialized by [`crate::writer::ObjectSerializer`] and dropped.

use bytes::Bytes;
use std::collections::BTreeMap;

/// Dictionary entries, kept sorted by key so output is deterministic.
pub type Dict = BTreeMap<String, Object>;

/// A PDF object.
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    /// Object counts, lengths, `/Differences` start codes
    Integer(i64),
    /// Page box coordinates in points
    Real(f64),
    /// Info dictionary text, already in its final byte form
    String(Vec<u8>),
    /// Name, stored without the leading `/`
    Name(String),
    /// Array of objects
    Array(Vec<Object>),
    /// Dictionary
    Dictionary(Dict),
    /// Content stream; `dict` must carry `/Length`
    Stream { dict: Dict, data: Bytes },
    /// Indirect object reference
    Reference(ObjectRef),
}

impl Object {
    /// Name object.
    pub fn name(name: &str) -> Self {
        Object::Name(name.to_string())
    }

    /// Dictionary from `(key, value)` pairs.
    pub fn dict<'k>(entries: impl IntoIterator<Item = (&'k str, Object)>) -> Self {
        Object::Dictionary(
            entries
                .into_iter()
                .map(|(key, value)| (key.to_string(), value))
                .collect(),
        )
    }

    /// Reference to generation 0 of object `id`.
    pub fn reference(id: u32) -> Self {
        Object::Reference(ObjectRef::new(id, 0))
    }

    /// `[llx lly urx ury]` for a box at the origin.
    pub fn media_box(width: f32, height: f32) -> Self {
        Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(width as f64),
            Object::Real(height as f64),
        ])
    }
}

/// Reference to an indirect object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectRef {
    /// Object number
    pub id: u32,
    /// Generation number
    pub gen: u16,
}

impl ObjectRef {
    /// Create a new object reference.
    pub fn new(id: u32, gen: u16) -> Self {
        Self { id, gen }
    }
}

impl std::fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} R", self.id, self.gen)
    }
}
