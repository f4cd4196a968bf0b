//! Account names.
//!
//! An account name is a 64-bit integer with a 13-character base-32 text form.
//! The first twelve characters carry five bits each, most significant first;
//! the optional thirteenth character carries the remaining four bits and is
//! therefore limited to `.12345abcdefghij`.

use std::fmt;
use std::str::FromStr;

use serde_with::{DeserializeFromStr, SerializeDisplay};

const CHARMAP: &[u8; 32] = b".12345abcdefghijklmnopqrstuvwxyz";

/// Maximum length of the text form.
pub const MAX_NAME_LEN: usize = 13;

/// Errors from parsing an account name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    #[error("account name is empty")]
    Empty,

    #[error("account name too long: {0} characters (max 13)")]
    TooLong(usize),

    #[error("invalid character {ch:?} at position {position}")]
    InvalidChar {
        /// The offending character.
        ch: char,
        /// Zero-based position in the input.
        position: usize,
    },

    #[error("13th character {0:?} must be one of .12345abcdefghij")]
    InvalidLastChar(char),
}

/// A 64-bit account identity.
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, SerializeDisplay, DeserializeFromStr,
)]
pub struct AccountName(u64);

impl AccountName {
    /// Wrap a raw name value.
    pub const fn from_u64(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw name value.
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

fn symbol(ch: u8) -> Option<u64> {
    match ch {
        b'a'..=b'z' => Some(u64::from(ch - b'a') + 6),
        b'1'..=b'5' => Some(u64::from(ch - b'1') + 1),
        b'.' => Some(0),
        _ => None,
    }
}

impl FromStr for AccountName {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(NameError::Empty);
        }
        let len = s.chars().count();
        if len > MAX_NAME_LEN {
            return Err(NameError::TooLong(len));
        }

        let mut value = 0u64;
        for (position, ch) in s.chars().enumerate() {
            let sym = u8::try_from(ch)
                .ok()
                .and_then(symbol)
                .ok_or(NameError::InvalidChar { ch, position })?;
            if position < 12 {
                value |= sym << (64 - 5 * (position + 1));
            } else {
                if sym > 0x0f {
                    return Err(NameError::InvalidLastChar(ch));
                }
                value |= sym;
            }
        }
        Ok(Self(value))
    }
}

impl fmt::Display for AccountName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = [b'.'; MAX_NAME_LEN];
        let mut tmp = self.0;
        for i in 0..MAX_NAME_LEN {
            let (mask, shift) = if i == 0 { (0x0f, 4) } else { (0x1f, 5) };
            out[MAX_NAME_LEN - 1 - i] = CHARMAP[(tmp & mask) as usize];
            tmp >>= shift;
        }
        let end = out.iter().rposition(|&c| c != b'.').map_or(0, |p| p + 1);
        // CHARMAP is pure ASCII
        f.write_str(std::str::from_utf8(&out[..end]).map_err(|_| fmt::Error)?)
    }
}

impl fmt::Debug for AccountName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountName({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> AccountName {
        s.parse().expect("valid name")
    }

    #[test]
    fn test_known_encodings() {
        assert_eq!(name("eosio").as_u64(), 6138663577826885632);
        assert_eq!(name("a").as_u64(), 3458764513820540928);
        assert_eq!(name("zzzzzzzzzzzzj").as_u64(), u64::MAX);
    }

    #[test]
    fn test_display_trims_trailing_dots() {
        assert_eq!(name("eostitanprod").to_string(), "eostitanprod");
        assert_eq!(name("abc..").to_string(), "abc");
        assert_eq!(AccountName::default().to_string(), "");
    }

    #[test]
    fn test_inner_dots_survive() {
        assert_eq!(name("a.b.c").to_string(), "a.b.c");
    }

    #[test]
    fn test_thirteen_characters() {
        assert_eq!(name("abcdefghijkl5").to_string(), "abcdefghijkl5");
        let err = "abcdefghijklz".parse::<AccountName>().unwrap_err();
        assert_eq!(err, NameError::InvalidLastChar('z'));
    }

    #[test]
    fn test_rejects_bad_input() {
        assert_eq!("".parse::<AccountName>().unwrap_err(), NameError::Empty);
        assert_eq!(
            "abcdefghijklmn".parse::<AccountName>().unwrap_err(),
            NameError::TooLong(14)
        );
        assert!(matches!(
            "Alice".parse::<AccountName>().unwrap_err(),
            NameError::InvalidChar { ch: 'A', position: 0 }
        ));
        assert!(matches!(
            "bob6".parse::<AccountName>().unwrap_err(),
            NameError::InvalidChar { ch: '6', position: 3 }
        ));
    }

    #[test]
    fn test_ordering_follows_raw_value() {
        assert!(name("a") < name("b"));
        assert!(name("a") < name("aa"));
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&name("feeder1")).expect("serialize");
        assert_eq!(json, "\"feeder1\"");
        let back: AccountName = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, name("feeder1"));
        assert!(serde_json::from_str::<AccountName>("\"UPPER\"").is_err());
    }
}
