//! Token flags carried in the first two bytes of a token identity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Bit set of token flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenFlags(u16);

impl TokenFlags {
    pub const NONE: Self = Self(0);
    /// The issuer may burn the token regardless of who holds it.
    pub const BURNABLE: Self = Self(0x0001);
    /// Transfer fees, if any, are paid in the ledger's native asset only.
    pub const ONLY_NATIVE: Self = Self(0x0002);
    /// Holders other than the issuer may transfer the token onward.
    pub const TRANSFERABLE: Self = Self(0x0008);

    pub fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    pub fn bits(&self) -> u16 {
        self.0
    }

    pub fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn with(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub fn is_transferable(&self) -> bool {
        self.contains(Self::TRANSFERABLE)
    }
}

impl std::ops::BitOr for TokenFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.with(rhs)
    }
}

impl fmt::Display for TokenFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = Vec::new();
        if self.contains(Self::BURNABLE) {
            names.push("burnable");
        }
        if self.contains(Self::ONLY_NATIVE) {
            names.push("only-native");
        }
        if self.contains(Self::TRANSFERABLE) {
            names.push("transferable");
        }
        if names.is_empty() {
            write!(f, "none")
        } else {
            write!(f, "{}", names.join("|"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combine_and_test() {
        let flags = TokenFlags::BURNABLE | TokenFlags::TRANSFERABLE;
        assert_eq!(flags.bits(), 0x0009);
        assert!(flags.is_transferable());
        assert!(!flags.contains(TokenFlags::ONLY_NATIVE));
        assert_eq!(flags.to_string(), "burnable|transferable");
    }

    #[test]
    fn none_displays() {
        assert_eq!(TokenFlags::NONE.to_string(), "none");
    }
}
