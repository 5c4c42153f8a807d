//! Lookup keys.
//!
//! The two lookup shapes store keys differently. Per-key tables store an
//! owned key that is already normalised, so every query builds (and for
//! case-insensitive strings, folds into) a fresh `String`. Alternate tables
//! store the key as declared and hash it character by character with
//! folding applied on the fly, so a borrowed [`KeyRef`] can probe them
//! through [`Equivalent`] without allocating.

use std::hash::{Hash, Hasher};

use indexmap::Equivalent;
use optreg_symbols::ConstantValue;

/// A borrowed lookup key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyRef<'a> {
    /// Never matches; null keys are not indexed.
    Null,
    /// Boolean key.
    Bool(bool),
    /// Integral key.
    Int(i64),
    /// String key.
    Str(&'a str),
}

impl<'a> KeyRef<'a> {
    /// Borrows a constant as a key.
    pub fn from_constant(value: &'a ConstantValue) -> Self {
        match value {
            ConstantValue::Null => KeyRef::Null,
            ConstantValue::Bool(b) => KeyRef::Bool(*b),
            ConstantValue::Int(v) => KeyRef::Int(*v),
            ConstantValue::String(s) => KeyRef::Str(s),
        }
    }
}

impl From<i64> for KeyRef<'_> {
    fn from(value: i64) -> Self {
        KeyRef::Int(value)
    }
}

impl From<bool> for KeyRef<'_> {
    fn from(value: bool) -> Self {
        KeyRef::Bool(value)
    }
}

impl<'a> From<&'a str> for KeyRef<'a> {
    fn from(value: &'a str) -> Self {
        KeyRef::Str(value)
    }
}

/// An owned, non-null key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum OwnedKey {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl OwnedKey {
    /// Copies `key` as declared. `None` for null.
    pub(crate) fn verbatim(key: KeyRef<'_>) -> Option<Self> {
        Self::normalize(key, false)
    }

    /// Copies `key`, folding case when `ignore_case` is set. `None` for null.
    pub(crate) fn normalize(key: KeyRef<'_>, ignore_case: bool) -> Option<Self> {
        match key {
            KeyRef::Null => None,
            KeyRef::Bool(b) => Some(OwnedKey::Bool(b)),
            KeyRef::Int(v) => Some(OwnedKey::Int(v)),
            KeyRef::Str(s) if ignore_case => Some(OwnedKey::Str(fold(s).collect())),
            KeyRef::Str(s) => Some(OwnedKey::Str(s.to_string())),
        }
    }

    pub(crate) fn as_key_ref(&self) -> KeyRef<'_> {
        match self {
            OwnedKey::Bool(b) => KeyRef::Bool(*b),
            OwnedKey::Int(v) => KeyRef::Int(*v),
            OwnedKey::Str(s) => KeyRef::Str(s),
        }
    }
}

/// Upper-cases each character on its own, the way ordinal case-insensitive
/// comparison does. A character is kept as is when its uppercase form is
/// more than one character (`ß`), and the dotless `ı` and long `ſ` are not
/// mapped onto ASCII.
fn fold(s: &str) -> impl Iterator<Item = char> + '_ {
    s.chars().map(fold_char)
}

fn fold_char(c: char) -> char {
    if matches!(c, '\u{0131}' | '\u{017f}') {
        return c;
    }
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(u), None) => u,
        _ => c,
    }
}

fn hash_key<H: Hasher>(key: KeyRef<'_>, ignore_case: bool, state: &mut H) {
    match key {
        KeyRef::Null => state.write_u8(0),
        KeyRef::Bool(b) => {
            state.write_u8(1);
            state.write_u8(u8::from(b));
        }
        KeyRef::Int(v) => {
            state.write_u8(2);
            state.write_i64(v);
        }
        KeyRef::Str(s) => {
            state.write_u8(3);
            if ignore_case {
                fold(s).for_each(|c| state.write_u32(c as u32));
            } else {
                s.chars().for_each(|c| state.write_u32(c as u32));
            }
            state.write_u8(0xff);
        }
    }
}

fn keys_equal(a: KeyRef<'_>, b: KeyRef<'_>, ignore_case: bool) -> bool {
    match (a, b) {
        (KeyRef::Str(x), KeyRef::Str(y)) if ignore_case => fold(x).eq(fold(y)),
        _ => a == b,
    }
}

/// A key stored in an alternate-lookup table.
#[derive(Debug, Clone)]
pub(crate) struct StoredKey {
    key: OwnedKey,
    ignore_case: bool,
}

impl StoredKey {
    pub(crate) fn new(key: OwnedKey, ignore_case: bool) -> Self {
        Self { key, ignore_case }
    }
}

impl Hash for StoredKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_key(self.key.as_key_ref(), self.ignore_case, state);
    }
}

impl PartialEq for StoredKey {
    fn eq(&self, other: &Self) -> bool {
        keys_equal(self.key.as_key_ref(), other.key.as_key_ref(), self.ignore_case)
    }
}

impl Eq for StoredKey {}

/// A borrowed probe into an alternate-lookup table.
pub(crate) struct Probe<'a> {
    key: KeyRef<'a>,
    ignore_case: bool,
}

impl<'a> Probe<'a> {
    pub(crate) fn new(key: KeyRef<'a>, ignore_case: bool) -> Self {
        Self { key, ignore_case }
    }
}

impl Hash for Probe<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_key(self.key, self.ignore_case, state);
    }
}

impl Equivalent<StoredKey> for Probe<'_> {
    fn equivalent(&self, stored: &StoredKey) -> bool {
        keys_equal(self.key, stored.key.as_key_ref(), self.ignore_case)
    }
}
