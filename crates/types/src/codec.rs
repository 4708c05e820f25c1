//! The canonical, deterministic binary codec for consensus-critical data.
//!
//! Mirrors `ioi_types::codec`: a pair of thin helpers over a fixed-config
//! `bincode` instance so that every crate encodes the same bytes for the
//! same value, which is the property content-addressed hashing and
//! signature preimages depend on.

use crate::error::CodecError;
use serde::{de::DeserializeOwned, Serialize};

/// Encodes `value` into its canonical byte representation.
///
/// `decode(encode(x)) == x` for every type in this crate (§2, C2).
pub fn to_bytes_canonical<T: Serialize>(value: &T) -> Result<Vec<u8>, CodecError> {
    bincode::serialize(value).map_err(|e| CodecError::Encode(e.to_string()))
}

/// Decodes a value previously produced by [`to_bytes_canonical`].
pub fn from_bytes_canonical<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CodecError> {
    bincode::deserialize(bytes).map_err(|e| CodecError::Decode(e.to_string()))
}

/// Computes the content-addressed hash of a value's canonical encoding.
pub fn hash_canonical<T: Serialize>(value: &T) -> Result<[u8; 32], CodecError> {
    let bytes = to_bytes_canonical(value)?;
    corechain_crypto::sha256(&bytes).map_err(|e| CodecError::Hash(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Sample {
        a: u64,
        b: Vec<u8>,
    }

    #[test]
    fn round_trips() {
        let s = Sample {
            a: 42,
            b: vec![1, 2, 3],
        };
        let bytes = to_bytes_canonical(&s).expect("encode");
        let back: Sample = from_bytes_canonical(&bytes).expect("decode");
        assert_eq!(s, back);
    }

    #[test]
    fn hash_is_stable() {
        let s = Sample { a: 1, b: vec![] };
        assert_eq!(hash_canonical(&s).unwrap(), hash_canonical(&s).unwrap());
    }
}
