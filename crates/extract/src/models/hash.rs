use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use crate::error::{Error, ErrorKind};
use exn::ResultExt;

/// A 128-bit MD5 digest of a release's file bytes.
///
/// This is the identity used to match local files against known releases.
/// Internally the digest is raw bytes; the site and all presentation
/// surfaces use the lowercase hexadecimal form.
///
/// MD5 is what the site publishes. It is not a security boundary here,
/// only an identity, and switching hash functions would orphan every
/// digest already persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 16]);

impl ContentHash {
    /// Decode a digest from its hexadecimal form.
    pub fn from_hex(s: impl AsRef<str>) -> Result<Self, Error> {
        let s = s.as_ref().trim();
        let mut bytes = [0u8; 16];
        hex::decode_to_slice(s, &mut bytes).or_raise(|| ErrorKind::Decode(s.to_string()))?;
        Ok(Self(bytes))
    }

    /// Encode the digest as a lowercase hexadecimal string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl From<[u8; 16]> for ContentHash {
    fn from(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for ContentHash {
    type Error = Error;
    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let bytes: [u8; 16] = TryInto::<[u8; 16]>::try_into(bytes).or_raise(|| ErrorKind::Decode(hex::encode(bytes)))?;
        Ok(Self(bytes))
    }
}

impl FromStr for ContentHash {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Display for ContentHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_round_trip() {
        let hash = ContentHash::from_hex("900150983cd24fb0d6963f7d28e17f72").unwrap();
        assert_eq!(hash.to_hex(), "900150983cd24fb0d6963f7d28e17f72");
        assert_eq!(hash, ContentHash::from(*hash.as_bytes()));
    }

    #[test]
    fn test_rejects_wrong_length() {
        assert!(ContentHash::from_hex("900150983cd24fb0").is_err());
        assert!(ContentHash::try_from(&[0u8; 20][..]).is_err());
    }

    #[test]
    fn test_rejects_non_hex() {
        assert!(ContentHash::from_hex("zz0150983cd24fb0d6963f7d28e17f72").is_err());
    }
}
