//! Core type aliases and newtypes

use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::error::{Error, Result};
use crate::{MIN_PASSWORD_LENGTH, PIN_LENGTH};

/// User ID as issued by the authenticated-session provider
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    /// Create a new UserId
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the underlying string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// One-way digest of a lock credential (32 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialHash(#[serde(with = "hex_bytes_32")] pub [u8; 32]);

impl CredentialHash {
    /// Create a new CredentialHash from bytes
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the bytes of the hash
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Create from hex string
    pub fn from_hex(s: &str) -> Result<Self> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes)
            .map_err(|e| Error::Storage(format!("Invalid credential hash: {}", e)))?;
        Ok(Self(bytes))
    }
}

impl AsRef<[u8]> for CredentialHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Zeroize for CredentialHash {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

/// Application section that can carry an independent page lock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    Dashboard,
    Documents,
    Reminders,
    Family,
    Profile,
    Settings,
}

impl Page {
    /// All lockable sections
    pub const ALL: [Page; 6] = [
        Page::Dashboard,
        Page::Documents,
        Page::Reminders,
        Page::Family,
        Page::Profile,
        Page::Settings,
    ];

    /// Stable identifier as persisted in page_locks records
    pub fn as_str(&self) -> &'static str {
        match self {
            Page::Dashboard => "dashboard",
            Page::Documents => "documents",
            Page::Reminders => "reminders",
            Page::Family => "family",
            Page::Profile => "profile",
            Page::Settings => "settings",
        }
    }
}

impl std::fmt::Display for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of secret protecting a page lock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockType {
    Pin,
    Password,
}

impl LockType {
    /// Validate the shape of a candidate secret before it is hashed or stored
    pub fn validate(&self, value: &str) -> Result<()> {
        match self {
            LockType::Pin => {
                if value.len() != PIN_LENGTH || !value.chars().all(|c| c.is_ascii_digit()) {
                    return Err(Error::InvalidPin(PIN_LENGTH));
                }
            }
            LockType::Password => {
                if value.len() < MIN_PASSWORD_LENGTH {
                    return Err(Error::PasswordTooShort(MIN_PASSWORD_LENGTH));
                }
            }
        }
        Ok(())
    }
}

/// Serde helper for 32-byte arrays as hex strings
pub mod hex_bytes_32 {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<[u8; 32], D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(&s, &mut bytes).map_err(serde::de::Error::custom)?;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_pin_validation() {
        assert!(LockType::Pin.validate("123456").is_ok());
        assert!(LockType::Pin.validate("12345").is_err());
        assert!(LockType::Pin.validate("1234567").is_err());
        assert!(LockType::Pin.validate("12345a").is_err());
        assert!(LockType::Pin.validate("").is_err());
    }

    #[test]
    fn test_password_validation() {
        assert!(LockType::Password.validate("longenough").is_ok());
        assert!(LockType::Password.validate("short").is_err());
        // Exactly at the minimum
        assert!(LockType::Password.validate("12345678").is_ok());
    }

    #[test]
    fn test_credential_hash_hex_roundtrip() {
        let hash = CredentialHash::new([7u8; 32]);
        let recovered = CredentialHash::from_hex(&hash.to_hex()).unwrap();
        assert_eq!(hash, recovered);
    }

    #[test]
    fn test_page_serde_identifier() {
        let json = serde_json::to_string(&Page::Documents).unwrap();
        assert_eq!(json, "\"documents\"");
        for page in Page::ALL {
            let json = serde_json::to_string(&page).unwrap();
            assert_eq!(json, format!("\"{}\"", page.as_str()));
        }
    }

    proptest! {
        #[test]
        fn prop_pin_rejects_non_six_digit(value in "[0-9]{0,5}|[0-9]{7,12}") {
            prop_assert!(LockType::Pin.validate(&value).is_err());
        }

        #[test]
        fn prop_pin_accepts_six_digits(value in "[0-9]{6}") {
            prop_assert!(LockType::Pin.validate(&value).is_ok());
        }

        #[test]
        fn prop_password_rejects_short(value in ".{0,7}") {
            if value.len() < 8 {
                prop_assert!(LockType::Password.validate(&value).is_err());
            }
        }
    }
}
