use std::convert::Infallible;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::macros::{impl_display, impl_from};

/// Opaque reference to private key material held by a key vault.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct KeyHandle(String);

impl KeyHandle {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for KeyHandle {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_owned()))
    }
}

impl From<&str> for KeyHandle {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl_from!(KeyHandle; String);
impl_display!(KeyHandle);

#[cfg(feature = "sea-orm")]
use crate::macros::impls_for_seaorm_newtype;

#[cfg(feature = "sea-orm")]
impls_for_seaorm_newtype!(KeyHandle);
