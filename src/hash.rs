use super::Error;
use std::fmt;
use std::str::FromStr;

pub const SHA1_HASH_SIZE: usize = 20;
pub const SHA1_HEX_SIZE: usize = SHA1_HASH_SIZE * 2;

/// A git object id, shown on the wire as 40 lowercase hex characters.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ObjectId([u8; SHA1_HASH_SIZE]);

impl ObjectId {
    pub fn hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn starts_with(&self, prefix: &str) -> bool {
        self.hex().starts_with(prefix)
    }
}

impl FromStr for ObjectId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != SHA1_HEX_SIZE {
            return Err(Error::Protocol(format!(
                "object id must be {SHA1_HEX_SIZE} hex characters, got {}",
                s.len()
            )));
        }
        let mut bytes = [0u8; SHA1_HASH_SIZE];
        hex::decode_to_slice(s, &mut bytes)
            .map_err(|err| Error::Protocol(format!("invalid object id {s:?}: {err}")))?;
        Ok(Self(bytes))
    }
}

impl From<[u8; SHA1_HASH_SIZE]> for ObjectId {
    fn from(value: [u8; SHA1_HASH_SIZE]) -> Self {
        Self(value)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_parses_and_prints_lowercase_hex() {
        let id: ObjectId = "48DA4910B78E24D8D3A831839CC751700DDC6E10".parse().unwrap();
        assert_eq!(id.to_string(), "48da4910b78e24d8d3a831839cc751700ddc6e10");
    }

    #[test]
    fn it_rejects_wrong_length() {
        assert!("48da4910".parse::<ObjectId>().is_err());
    }

    #[test]
    fn it_rejects_non_hex() {
        let result = "zzda4910b78e24d8d3a831839cc751700ddc6e10".parse::<ObjectId>();
        assert!(matches!(result, Err(Error::Protocol(_))));
    }

    #[test]
    fn it_matches_prefixes() {
        let id: ObjectId = "9b36b682ebbd7bd224b621fb90864821726b11b3".parse().unwrap();
        assert!(id.starts_with("9b36b682"));
        assert!(!id.starts_with("9b36b683"));
    }
}
