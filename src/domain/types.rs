//! Strongly-typed value objects used by domain entities.
//!
//! Domain structs carry these wrappers instead of raw primitives so that
//! identifiers, text values and numeric bounds are enforced at the boundary
//! between the form and the backend payload.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use thiserror::Error;
use validator::ValidateUrl;

/// Errors produced when attempting to construct constrained domain types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeConstraintError {
    /// A string was empty or whitespace-only after trimming.
    #[error("{0} cannot be empty")]
    EmptyString(&'static str),
    /// URL validation failed.
    #[error("{0} must be a valid URL")]
    InvalidUrl(&'static str),
    /// A numeric value exceeded its upper bound.
    #[error("{field} must not exceed {max}")]
    OutOfRange { field: &'static str, max: u32 },
    /// Catch-all for custom validation failures.
    #[error("invalid value: {0}")]
    InvalidValue(String),
}

fn trim_and_require_non_empty<S: Into<String>>(
    value: S,
    field: &'static str,
) -> Result<String, TypeConstraintError> {
    let trimmed = value.into().trim().to_string();
    if trimmed.is_empty() {
        Err(TypeConstraintError::EmptyString(field))
    } else {
        Ok(trimmed)
    }
}

macro_rules! non_empty_string_newtype {
    ($name:ident, $doc:expr, $field:expr) => {
        #[doc = $doc]
        #[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Constructs a trimmed, non-empty value.
            pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
                trim_and_require_non_empty(value, $field).map(Self)
            }

            /// Borrow the value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper and return the owned string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::ops::Deref for $name {
            type Target = str;

            fn deref(&self) -> &Self::Target {
                self.as_str()
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl TryFrom<String> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.as_str() == *other
            }
        }

        impl PartialEq<$name> for &str {
            fn eq(&self, other: &$name) -> bool {
                *self == other.as_str()
            }
        }
    };
}

macro_rules! url_string_newtype {
    ($name:ident, $doc:expr, $field:expr) => {
        #[doc = $doc]
        #[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Constructs a trimmed URL and validates its format.
            pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
                let trimmed = trim_and_require_non_empty(value, $field)?;
                if !trimmed.as_str().validate_url() {
                    return Err(TypeConstraintError::InvalidUrl($field));
                }
                Ok(Self(trimmed))
            }

            /// Borrow the URL as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper and return the owned URL.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl TryFrom<&str> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.as_str() == *other
            }
        }
    };
}

macro_rules! bounded_u32_newtype {
    ($name:ident, $doc:expr, $field:expr, $max:expr) => {
        #[doc = $doc]
        #[derive(
            Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
        )]
        #[serde(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Upper bound accepted by [`Self::new`].
            pub const MAX: u32 = $max;

            /// Constructs a value no greater than [`Self::MAX`].
            pub fn new(value: u32) -> Result<Self, TypeConstraintError> {
                if value <= Self::MAX {
                    Ok(Self(value))
                } else {
                    Err(TypeConstraintError::OutOfRange {
                        field: $field,
                        max: Self::MAX,
                    })
                }
            }

            /// Returns the raw `u32` value.
            pub const fn get(self) -> u32 {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<u32> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: u32) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for u32 {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl PartialEq<u32> for $name {
            fn eq(&self, other: &u32) -> bool {
                self.0 == *other
            }
        }
    };
}

non_empty_string_newtype!(
    ProductId,
    "Backend identifier of a product.",
    "product id"
);
non_empty_string_newtype!(
    CategoryId,
    "Backend identifier of a category.",
    "category id"
);
non_empty_string_newtype!(
    CategoryName,
    "Category name enforcing non-empty values.",
    "category"
);
non_empty_string_newtype!(
    ProductName,
    "Product name enforcing non-empty values.",
    "name"
);
non_empty_string_newtype!(
    ProductDescription,
    "Product description enforcing non-empty values.",
    "description"
);
non_empty_string_newtype!(ProductSku, "Product SKU enforcing non-empty values.", "sku");
non_empty_string_newtype!(
    ProductUnits,
    "Product unit of measure enforcing non-empty values.",
    "unit"
);

url_string_newtype!(ImageUrl, "Remote URL of an uploaded product image.", "image url");

bounded_u32_newtype!(
    ProductPrice,
    "Price in whole currency units. Six digits at most.",
    "price",
    999_999
);
bounded_u32_newtype!(
    DiscountPercent,
    "Discount in percent of the price.",
    "discount",
    100
);
bounded_u32_newtype!(
    SalePrice,
    "Price after discount, derived from price and discount.",
    "sale price",
    999_999
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_non_empty_strings() {
        let value = ProductName::new("  Apples  ").unwrap();
        assert_eq!(value.as_str(), "Apples");
    }

    #[test]
    fn rejects_blank_sku() {
        let err = ProductSku::new("   ").unwrap_err();
        assert_eq!(err, TypeConstraintError::EmptyString("sku"));
    }

    #[test]
    fn validates_image_urls() {
        assert!(ImageUrl::new("https://res.example.com/image/upload/v1/a.jpg").is_ok());
        let err = ImageUrl::new("a.jpg").unwrap_err();
        assert_eq!(err, TypeConstraintError::InvalidUrl("image url"));
    }

    #[test]
    fn discount_is_bounded_by_one_hundred() {
        assert_eq!(DiscountPercent::new(100).unwrap(), 100);
        assert_eq!(
            DiscountPercent::new(101).unwrap_err(),
            TypeConstraintError::OutOfRange {
                field: "discount",
                max: 100
            }
        );
    }

    #[test]
    fn price_allows_zero_and_six_digits() {
        assert_eq!(ProductPrice::new(0).unwrap().get(), 0);
        assert!(ProductPrice::new(999_999).is_ok());
        assert!(ProductPrice::new(1_000_000).is_err());
    }
}
