// Copyright 2019-2022 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::fmt;

use serde::{Deserialize, Serialize};

/// Length of a raw account address in bytes.
pub const ADDRESS_LENGTH: usize = 20;

/// Account address. A fixed-width byte value; equality is byte-wise, which
/// is what the tier engine relies on when comparing an asset issuer against
/// a sender.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address([u8; ADDRESS_LENGTH]);

impl Address {
    pub const fn new(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Builds an address from a small numeric id. Test fixtures and genesis
    /// tables use this; real addresses come from key derivation elsewhere.
    pub fn new_id(id: u64) -> Self {
        let mut bytes = [0u8; ADDRESS_LENGTH];
        bytes[ADDRESS_LENGTH - 8..].copy_from_slice(&id.to_be_bytes());
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; ADDRESS_LENGTH]> for Address {
    fn from(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_addresses_are_distinct_and_stable() {
        assert_eq!(Address::new_id(101), Address::new_id(101));
        assert_ne!(Address::new_id(101), Address::new_id(102));
        assert_ne!(Address::new_id(1), Address::default());
    }

    #[test]
    fn display_is_lowercase_hex() {
        let addr = Address::new_id(0xff);
        assert_eq!(addr.to_string().len(), ADDRESS_LENGTH * 2);
        assert!(addr.to_string().ends_with("ff"));
    }
}
