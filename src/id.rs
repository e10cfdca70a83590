use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize};

/// Server-assigned record identifier.
///
/// The backend decides the shape (numeric primary key or uuid), so the client
/// keeps it as text and never looks inside.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl From<String> for RecordId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TextOrNumber {
    Text(String),
    Int(i64),
    Uint(u64),
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match TextOrNumber::deserialize(deserializer)? {
            TextOrNumber::Text(s) => Self(s),
            TextOrNumber::Int(n) => Self(n.to_string()),
            TextOrNumber::Uint(n) => Self(n.to_string()),
        })
    }
}

/// Accepts `23` as well as `"23"` for numeric columns; form-driven backends
/// tend to echo whatever the client posted.
pub(crate) fn number_or_text<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<i64> + std::str::FromStr,
{
    let n = match TextOrNumber::deserialize(deserializer)? {
        TextOrNumber::Text(s) => {
            return s
                .trim()
                .parse::<T>()
                .map_err(|_| de::Error::custom(format!("not a number: {s:?}")))
        }
        TextOrNumber::Int(n) => n,
        TextOrNumber::Uint(n) => {
            i64::try_from(n).map_err(|_| de::Error::custom("number out of range"))?
        }
    };
    T::try_from(n).map_err(|_| de::Error::custom(format!("number out of range: {n}")))
}
