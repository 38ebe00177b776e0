use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Identity of one addressable instance within its kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    StringKey(String),
    Int32Key(i32),
    Int64Key(i64),
    NoKey,
}

impl Key {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Key::StringKey(key) => Some(key),
            _ => None,
        }
    }
}

impl Display for Key {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Key::StringKey(key) => write!(f, "{}", key),
            Key::Int32Key(key) => write!(f, "{}", key),
            Key::Int64Key(key) => write!(f, "{}", key),
            Key::NoKey => write!(f, "no_key"),
        }
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Key::StringKey(value)
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::StringKey(value.to_string())
    }
}

impl From<&String> for Key {
    fn from(value: &String) -> Self {
        Key::StringKey(value.clone())
    }
}

impl From<i32> for Key {
    fn from(value: i32) -> Self {
        Key::Int32Key(value)
    }
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Key::Int64Key(value)
    }
}
