use crate::error::DeployError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A Maya release year such as `2025`.
///
/// Exactly four ASCII digits. Anything else is rejected rather than coerced,
/// so `"25"`, `"2025.1"` and `"２０２５"` never become tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VersionToken(u16);

impl VersionToken {
    pub const WIDTH: usize = 4;

    /// Parse a product folder name like `Maya2025` or `maya2025`.
    ///
    /// The product prefix is matched case-insensitively and the remainder
    /// must be a valid token.
    pub fn from_product_folder(folder: &str, product: &str) -> Option<Self> {
        let prefix_len = product.len();
        if folder.len() != prefix_len + Self::WIDTH || !folder.is_char_boundary(prefix_len) {
            return None;
        }
        let (prefix, rest) = folder.split_at(prefix_len);
        if !prefix.eq_ignore_ascii_case(product) {
            return None;
        }
        rest.parse().ok()
    }
}

impl FromStr for VersionToken {
    type Err = DeployError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != Self::WIDTH || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DeployError::InvalidVersionToken(s.to_string()));
        }
        s.parse::<u16>()
            .map(VersionToken)
            .map_err(|_| DeployError::InvalidVersionToken(s.to_string()))
    }
}

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.0)
    }
}
