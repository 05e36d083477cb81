//! External wallet reference.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An external wallet address, as supplied by the client (`0x` + 40 hex
/// characters).
///
/// The service treats it as an opaque reference to the disbursement side of
/// the system; it is validated for shape only, never interpreted.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WalletAddress(String);

impl WalletAddress {
    /// The standard prefix for wallet addresses.
    pub const PREFIX: &'static str = "0x";

    /// Create a wallet address from a raw string, preserving its case.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Return the raw address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Validate that this address is well-formed: `0x` followed by 40 hex
    /// characters.
    pub fn is_valid(&self) -> bool {
        let Some(body) = self.0.strip_prefix(Self::PREFIX) else {
            return false;
        };
        body.len() == 40 && body.chars().all(|c| c.is_ascii_hexdigit())
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for WalletAddress {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_address_is_valid() {
        let addr = WalletAddress::new("0x3c44cdddb6a900fa2b585dd299e03d12fa4293bc");
        assert!(addr.is_valid());
    }

    #[test]
    fn malformed_addresses_are_invalid() {
        assert!(!WalletAddress::new("3c44cdddb6a900fa2b585dd299e03d12fa4293bc").is_valid());
        assert!(!WalletAddress::new("0x123").is_valid());
        assert!(!WalletAddress::new("0xzz44cdddb6a900fa2b585dd299e03d12fa4293bc").is_valid());
    }
}
