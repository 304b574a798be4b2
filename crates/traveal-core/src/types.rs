use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TravealError;

/// Key derivation function recorded alongside every ciphertext it produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KdfMethod {
    /// PBKDF2-HMAC-SHA-512
    #[default]
    Pbkdf2,
    /// scrypt (memory-hard)
    Scrypt,
}

impl KdfMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            KdfMethod::Pbkdf2 => "pbkdf2",
            KdfMethod::Scrypt => "scrypt",
        }
    }
}

impl fmt::Display for KdfMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KdfMethod {
    type Err = TravealError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pbkdf2" => Ok(KdfMethod::Pbkdf2),
            "scrypt" => Ok(KdfMethod::Scrypt),
            other => Err(TravealError::Format(format!("unknown KDF method '{other}'"))),
        }
    }
}

/// How aggressively identity fields are pseudonymized
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnonymizationLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl AnonymizationLevel {
    /// Number of chained hash rounds applied to an identifier
    pub fn hash_rounds(&self) -> usize {
        match self {
            AnonymizationLevel::Low => 1,
            AnonymizationLevel::Medium => 3,
            AnonymizationLevel::High => 5,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AnonymizationLevel::Low => "low",
            AnonymizationLevel::Medium => "medium",
            AnonymizationLevel::High => "high",
        }
    }
}

impl fmt::Display for AnonymizationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnonymizationLevel {
    type Err = TravealError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(AnonymizationLevel::Low),
            "medium" => Ok(AnonymizationLevel::Medium),
            "high" => Ok(AnonymizationLevel::High),
            other => Err(TravealError::Format(format!(
                "unknown anonymization level '{other}'"
            ))),
        }
    }
}

/// Construction used for an envelope's authentication tag
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagScheme {
    /// PBKDF2-HMAC-SHA-256 over `ciphertext || salt || iv`, envelope version "1.0"
    #[default]
    Legacy,
    /// HMAC-SHA-256 with an HKDF-separated MAC key, envelope version "2.0"
    Hmac,
}

impl TagScheme {
    /// Envelope `version` string emitted for this scheme
    pub fn version(&self) -> &'static str {
        match self {
            TagScheme::Legacy => "1.0",
            TagScheme::Hmac => "2.0",
        }
    }

    pub fn from_version(version: &str) -> Result<Self, TravealError> {
        match version {
            "1.0" => Ok(TagScheme::Legacy),
            "2.0" => Ok(TagScheme::Hmac),
            other => Err(TravealError::Format(format!(
                "unsupported envelope version '{other}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_rounds_per_level() {
        assert_eq!(AnonymizationLevel::Low.hash_rounds(), 1);
        assert_eq!(AnonymizationLevel::Medium.hash_rounds(), 3);
        assert_eq!(AnonymizationLevel::High.hash_rounds(), 5);
    }

    #[test]
    fn test_method_parse() {
        assert_eq!("scrypt".parse::<KdfMethod>().unwrap(), KdfMethod::Scrypt);
        assert_eq!("pbkdf2".parse::<KdfMethod>().unwrap(), KdfMethod::Pbkdf2);
        assert!("argon2".parse::<KdfMethod>().is_err());
    }

    #[test]
    fn test_tag_scheme_versions() {
        assert_eq!(TagScheme::from_version("1.0").unwrap(), TagScheme::Legacy);
        assert_eq!(TagScheme::from_version("2.0").unwrap(), TagScheme::Hmac);
        assert_eq!(TagScheme::Hmac.version(), "2.0");
        assert!(TagScheme::from_version("3.1").is_err());
    }

    #[test]
    fn test_level_parse_rejects_unknown() {
        assert_eq!(
            "high".parse::<AnonymizationLevel>().unwrap(),
            AnonymizationLevel::High
        );
        assert!("extreme".parse::<AnonymizationLevel>().is_err());
    }
}
