//! Stock Keeping Unit code.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_object::ValueObject;

/// Product identifier string used to look up stock and to reference products
/// from order lines.
///
/// Always non-empty and trimmed. Deserialization goes through the same
/// validation as [`SkuCode::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SkuCode(String);

impl SkuCode {
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, DomainError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("sku code cannot be empty"));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for SkuCode {}

impl core::fmt::Display for SkuCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SkuCode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SkuCode {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<SkuCode> for String {
    fn from(value: SkuCode) -> Self {
        value.0
    }
}

impl AsRef<str> for SkuCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn surrounding_whitespace_is_not_part_of_the_code() {
        let sku = SkuCode::parse("  iphone_15\t").unwrap();
        assert_eq!(sku.as_str(), "iphone_15");
        assert_eq!(sku, SkuCode::parse("iphone_15").unwrap());
    }

    #[test]
    fn blank_codes_are_rejected() {
        assert!(matches!(SkuCode::parse(""), Err(DomainError::Validation(_))));
        assert!(matches!(SkuCode::parse("   "), Err(DomainError::Validation(_))));
    }

    #[test]
    fn deserialization_validates() {
        let ok: SkuCode = serde_json::from_str("\"iphone_15_pro\"").unwrap();
        assert_eq!(ok.as_str(), "iphone_15_pro");

        let err = serde_json::from_str::<SkuCode>("\"  \"");
        assert!(err.is_err());
    }

    proptest! {
        #[test]
        fn parse_is_idempotent(raw in "[ ]{0,3}[a-z0-9_]{1,24}[ ]{0,3}") {
            let once = SkuCode::parse(&raw).unwrap();
            let twice = SkuCode::parse(once.as_str()).unwrap();
            prop_assert_eq!(once, twice);
        }
    }
}
