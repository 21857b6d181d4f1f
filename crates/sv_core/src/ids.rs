//! crates/sv_core/src/ids.rs
//! Image IDs and the CUI token shape.
//! Image IDs are opaque (any non-empty text); CUIs have a strict shape: `C` + ASCII digits.

use core::borrow::Borrow;
use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// `C` followed by one or more ASCII digits.
#[inline]
pub fn is_valid_cui(s: &str) -> bool {
    match s.as_bytes().split_first() {
        Some((b'C', digits)) => !digits.is_empty() && digits.iter().all(u8::is_ascii_digit),
        _ => false,
    }
}

macro_rules! simple_string_newtype {
    ($(#[$m:meta])* $name:ident) => {
        $(#[$m])*
        #[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        pub struct $name(String);

        impl $name {
            #[inline] pub fn as_str(&self) -> &str { &self.0 }
        }

        impl fmt::Display for $name {
            #[inline]
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
        }

        impl AsRef<str> for $name {
            #[inline]
            fn as_ref(&self) -> &str { &self.0 }
        }

        // Hash/Eq of the newtype agree with `str`, so maps keyed by it can be queried by `&str`.
        impl Borrow<str> for $name {
            #[inline]
            fn borrow(&self) -> &str { &self.0 }
        }

        impl TryFrom<&str> for $name {
            type Error = CoreError;
            #[inline]
            fn try_from(value: &str) -> Result<Self, Self::Error> { value.parse() }
        }
    }
}

simple_string_newtype!(
    /// Ground-truth image identifier (column 0 of every table).
    ImageId
);

impl FromStr for ImageId {
    type Err = CoreError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() { return Err(CoreError::EmptyId); }
        Ok(ImageId(s.to_owned()))
    }
}
