//! FITS-style header cards used as observation metadata.
use std::fmt::Display;

use indexmap::IndexMap;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HeaderError {
    #[error("Header keyword {0} not found")]
    Missing(String),
    #[error("Header keyword {key} has value {actual}, expected a {expected}")]
    WrongType { key: String, expected: &'static str, actual: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum HeaderValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Display for HeaderValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HeaderValue::Str(s) => write!(f, "'{s}'"),
            HeaderValue::Int(i) => write!(f, "{i}"),
            HeaderValue::Float(v) => write!(f, "{v}"),
            HeaderValue::Bool(true) => write!(f, "T"),
            HeaderValue::Bool(false) => write!(f, "F"),
        }
    }
}

impl From<&str> for HeaderValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for HeaderValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for HeaderValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for HeaderValue {
    fn from(value: i32) -> Self {
        Self::Int(value as i64)
    }
}

impl From<f64> for HeaderValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for HeaderValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub value: HeaderValue,
    pub comment: String,
}

/// An ordered set of keyword cards. Keywords are stored upper case.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Header {
    cards: IndexMap<String, Card>,
}

impl Header {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a card. Replacing keeps the card's original position.
    pub fn insert<V: Into<HeaderValue>>(&mut self, key: &str, value: V, comment: &str) {
        self.cards.insert(
            key.to_ascii_uppercase(),
            Card { value: value.into(), comment: comment.to_string() }
        );
    }

    /// Builder-style version of [`Header::insert`].
    pub fn with<V: Into<HeaderValue>>(mut self, key: &str, value: V, comment: &str) -> Self {
        self.insert(key, value, comment);
        self
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.cards.contains_key(&key.to_ascii_uppercase())
    }

    pub fn card(&self, key: &str) -> Option<&Card> {
        self.cards.get(&key.to_ascii_uppercase())
    }

    pub fn get(&self, key: &str) -> Option<&HeaderValue> {
        self.card(key).map(|c| &c.value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Card)> {
        self.cards.iter().map(|(k, c)| (k.as_str(), c))
    }

    fn require(&self, key: &str) -> Result<&HeaderValue, HeaderError> {
        self.get(key).ok_or_else(|| HeaderError::Missing(key.to_string()))
    }

    pub fn get_str(&self, key: &str) -> Result<&str, HeaderError> {
        match self.require(key)? {
            HeaderValue::Str(s) => Ok(s.as_str()),
            other => Err(wrong_type(key, "string", other)),
        }
    }

    pub fn get_i64(&self, key: &str) -> Result<i64, HeaderError> {
        match self.require(key)? {
            HeaderValue::Int(i) => Ok(*i),
            other => Err(wrong_type(key, "integer", other)),
        }
    }

    /// Get a float; integer cards are accepted and converted.
    pub fn get_f64(&self, key: &str) -> Result<f64, HeaderError> {
        match self.require(key)? {
            HeaderValue::Float(v) => Ok(*v),
            HeaderValue::Int(i) => Ok(*i as f64),
            other => Err(wrong_type(key, "float", other)),
        }
    }

    /// Get a boolean; integer flags (0 = false, anything else = true) are accepted.
    pub fn get_bool(&self, key: &str) -> Result<bool, HeaderError> {
        match self.require(key)? {
            HeaderValue::Bool(b) => Ok(*b),
            HeaderValue::Int(i) => Ok(*i != 0),
            other => Err(wrong_type(key, "boolean", other)),
        }
    }

    pub fn get_f64_or(&self, key: &str, default: f64) -> Result<f64, HeaderError> {
        if self.contains_key(key) {
            self.get_f64(key)
        } else {
            Ok(default)
        }
    }
}

fn wrong_type(key: &str, expected: &'static str, actual: &HeaderValue) -> HeaderError {
    HeaderError::WrongType { key: key.to_string(), expected, actual: actual.to_string() }
}

impl Display for Header {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (key, card) in self.cards.iter() {
            if card.comment.is_empty() {
                writeln!(f, "{key:<8}= {}", card.value)?;
            } else {
                writeln!(f, "{key:<8}= {} / {}", card.value, card.comment)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_access() {
        let hdr = Header::new()
            .with("instrume", "SPICE", "Instrument name")
            .with("SLIT_ID", 2, "Slit ID (0-3)")
            .with("DSUN_OBS", 81342963151.0, "[m]  S/C distance from Sun")
            .with("DARKMAP", 0, "If set, a dark map was subtracted on-board");

        assert_eq!(hdr.get_str("INSTRUME").unwrap(), "SPICE");
        assert_eq!(hdr.get_i64("slit_id").unwrap(), 2);
        assert_eq!(hdr.get_f64("SLIT_ID").unwrap(), 2.0);
        assert_eq!(hdr.get_f64("DSUN_OBS").unwrap(), 81342963151.0);
        assert!(!hdr.get_bool("DARKMAP").unwrap());
        assert_eq!(hdr.card("INSTRUME").unwrap().comment, "Instrument name");
        assert_eq!(hdr.get_f64_or("CRPIX1", 0.0).unwrap(), 0.0);
    }

    #[test]
    fn test_errors() {
        let hdr = Header::new().with("INSTRUME", "SPICE", "");
        assert_eq!(hdr.get_str("DETECTOR").unwrap_err(), HeaderError::Missing("DETECTOR".to_string()));
        assert!(matches!(hdr.get_f64("INSTRUME").unwrap_err(), HeaderError::WrongType { expected: "float", .. }));
    }

    #[test]
    fn test_insert_keeps_order() {
        let mut hdr = Header::new().with("A", 1, "").with("B", 2, "");
        hdr.insert("a", 3, "");
        let keys: Vec<_> = hdr.iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(keys, vec!["A", "B"]);
        assert_eq!(hdr.get_i64("A").unwrap(), 3);
    }
}
