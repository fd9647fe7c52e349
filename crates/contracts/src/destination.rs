//! Destination - broker routing key
//!
//! Exchange and queue names travel as AMQP short strings: at most 255 bytes,
//! and in practice never empty or containing whitespace. `parse` enforces
//! that for keys arriving from outside (dispatch files, CLI flags, serde);
//! the `From` conversions are for keys written in code.

use std::fmt;
use std::sync::Arc;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::ContractError;

/// Longest routing key a broker accepts (AMQP shortstr)
pub const MAX_DESTINATION_LEN: usize = 255;

/// Broker routing key, shared between clones of a dispatch
///
/// # Examples
/// ```
/// use contracts::Destination;
///
/// let dest = Destination::parse("orders.created").unwrap();
/// assert_eq!(dest.as_str(), "orders.created");
/// assert!(Destination::parse("").is_err());
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Destination(Arc<str>);

impl Destination {
    /// Validate and wrap an externally supplied routing key
    ///
    /// # Errors
    /// `InvalidDestination` when the key is empty, longer than
    /// [`MAX_DESTINATION_LEN`] bytes, or contains whitespace or control
    /// characters.
    pub fn parse(value: &str) -> Result<Self, ContractError> {
        let reason = if value.is_empty() {
            Some("must not be empty")
        } else if value.len() > MAX_DESTINATION_LEN {
            Some("longer than 255 bytes")
        } else if value.chars().any(|c| c.is_whitespace() || c.is_control()) {
            Some("contains whitespace or control characters")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(ContractError::InvalidDestination {
                value: value.to_string(),
                reason,
            }),
            None => Ok(Self(Arc::from(value))),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Destination {
    fn from(s: &str) -> Self {
        Self(Arc::from(s))
    }
}

impl From<String> for Destination {
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Destination({:?})", self.0)
    }
}

impl Serialize for Destination {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Destination {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(de::Error::custom)
    }
}
