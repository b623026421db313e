use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            pub const fn from_raw(raw: u64) -> Self {
                Self(raw)
            }

            pub const fn as_u64(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for u64 {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

// Both kinds draw from the same per-episode counter
define_id!(EntityId);
define_id!(RoomId);

/// Human-readable identifier assigned once at registration (`"{name}_{id}"`).
///
/// This is the identifier agents use to refer to objects; the numeric ids
/// stay internal to the registry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReadableId(String);

impl ReadableId {
    pub(crate) fn compose(name: &str, raw: u64) -> Self {
        Self(format!("{}_{}", name, raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReadableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ReadableId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readable_id_joins_name_and_counter() {
        let id = ReadableId::compose("chest", 7);
        assert_eq!(id.as_str(), "chest_7");
        assert_eq!(id.to_string(), "chest_7");
    }

    #[test]
    fn ids_order_by_issue_counter() {
        assert!(EntityId::from_raw(2) < EntityId::from_raw(10));
        assert_eq!(u64::from(RoomId::from(4)), 4);
    }

    #[test]
    fn ids_serialize_as_plain_numbers() {
        let json = serde_json::to_string(&EntityId::from_raw(3)).unwrap();
        assert_eq!(json, "3");
    }
}
