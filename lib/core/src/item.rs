use crate::{Error, Result};
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Catalog item identifier.
///
/// Upstream tables carry ids as 64-bit floats (`1234.0`), so every entry point
/// normalises them to an unsigned integer before lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(u64);

impl ItemId {
    #[inline]
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[inline]
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Normalise a float id. Rejects negative, fractional and non-finite values.
    pub fn from_f64(value: f64) -> Result<Self> {
        // 2^64: the first float that no longer fits in a u64
        const U64_LIMIT: f64 = 18_446_744_073_709_551_616.0;
        if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value >= U64_LIMIT {
            return Err(Error::InvalidItemId(value.to_string()));
        }
        Ok(Self(value as u64))
    }

    /// Normalise an id carried in a JSON value (number or numeric string).
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::Number(n) => {
                if let Some(u) = n.as_u64() {
                    Ok(Self(u))
                } else if let Some(f) = n.as_f64() {
                    Self::from_f64(f)
                } else {
                    Err(Error::InvalidItemId(n.to_string()))
                }
            }
            serde_json::Value::String(s) => s.parse(),
            other => Err(Error::InvalidItemId(other.to_string())),
        }
    }
}

impl FromStr for ItemId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if let Ok(u) = trimmed.parse::<u64>() {
            return Ok(Self(u));
        }
        match trimmed.parse::<f64>() {
            Ok(f) => Self::from_f64(f),
            Err(_) => Err(Error::InvalidItemId(s.to_string())),
        }
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ItemId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl Serialize for ItemId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.0)
    }
}

struct ItemIdVisitor;

impl<'de> Visitor<'de> for ItemIdVisitor {
    type Value = ItemId;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a non-negative integral item id as a number or string")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<ItemId, E> {
        Ok(ItemId(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<ItemId, E> {
        u64::try_from(v)
            .map(ItemId)
            .map_err(|_| E::custom(format!("negative item id: {}", v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<ItemId, E> {
        ItemId::from_f64(v).map_err(E::custom)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<ItemId, E> {
        v.parse().map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for ItemId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(ItemIdVisitor)
    }
}

/// Category label. Integral float labels lose their zero fraction (`1338.0` -> `"1338"`);
/// `null` reads as a blank label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Category(String);

impl Category {
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// An empty label carries no category information.
    #[inline]
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Strip a zero fraction from an integer label (`"1338.0"` -> `"1338"`).
    /// Any other text, including `"01"` or `"1e0"`, is kept verbatim.
    fn from_label(label: &str) -> Self {
        if let Some((int, frac)) = label.split_once('.') {
            let digits = int.strip_prefix('-').unwrap_or(int);
            if !digits.is_empty()
                && digits.bytes().all(|b| b.is_ascii_digit())
                && !frac.is_empty()
                && frac.bytes().all(|b| b == b'0')
            {
                return Self(int.to_string());
            }
        }
        Self(label.to_string())
    }

    fn from_number(value: f64) -> Self {
        if value.is_finite() && value.fract() == 0.0 && value.abs() < 9.0e15 {
            Self((value as i64).to_string())
        } else {
            Self(value.to_string())
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Category {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Category {
    fn from(s: String) -> Self {
        Self(s)
    }
}

struct CategoryVisitor;

impl<'de> Visitor<'de> for CategoryVisitor {
    type Value = Category;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a category label as a string or number")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Category, E> {
        Ok(Category(v.to_string()))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Category, E> {
        Ok(Category(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Category, E> {
        Ok(Category::from_number(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Category, E> {
        Ok(Category::from_label(v))
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<Category, E> {
        Ok(Category(String::new()))
    }

    fn visit_none<E: de::Error>(self) -> std::result::Result<Category, E> {
        Ok(Category(String::new()))
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(CategoryVisitor)
    }
}
