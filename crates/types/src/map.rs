//! The tokenization sub-value (§4.3): a small associative container that
//! lives inside a single contract-variable slot, serialized as that slot's
//! raw bytes.

use crate::codec::{from_bytes_canonical, to_bytes_canonical};
use crate::error::MapError;
use serde::{Deserialize, Serialize};

/// An ordered key/value associative container, stored inside a contract
/// variable slot. Lookup is linear (maps are expected to be small: balances
/// per holder of a single token), matching the simplicity of the original
/// `vm.Map` this is modeled on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Map {
    entries: Vec<(Vec<u8>, Vec<u8>)>,
}

impl Map {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `key -> value`, replacing any existing entry for `key`.
    ///
    /// Named `append` to match the vocabulary of §4.3 ("Append(key, value)");
    /// behaviorally it is an upsert, same as `set_val`.
    pub fn append(&mut self, key: Vec<u8>, value: Vec<u8>) {
        self.set_val(key, value);
    }

    /// Inserts or replaces `key -> value`.
    pub fn set_val(&mut self, key: Vec<u8>, value: Vec<u8>) {
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    /// Looks up `key`, returning its value or [`MapError::NotFound`].
    pub fn get_val(&self, key: &[u8]) -> Result<Vec<u8>, MapError> {
        self.entries
            .iter()
            .find(|(k, _)| k.as_slice() == key)
            .map(|(_, v)| v.clone())
            .ok_or(MapError::NotFound)
    }

    /// Serializes the map to its canonical byte form, suitable for storage
    /// in a contract-variable slot.
    pub fn serialize(&self) -> Vec<u8> {
        // A Map's own encoding never fails: it contains no types that can
        // fail canonical serialization.
        to_bytes_canonical(self).unwrap_or_default()
    }

    /// Parses a map previously produced by [`Map::serialize`], or by reading
    /// a contract-variable slot that holds one.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, MapError> {
        if bytes.is_empty() {
            return Ok(Self::default());
        }
        from_bytes_canonical(bytes).map_err(|e| MapError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_then_append_then_get_roundtrips_through_bytes() {
        let mut m = Map::new();
        m.append(vec![0x00, 0x2b], vec![0x00, 0x01]);
        let bytes = m.serialize();
        let restored = Map::deserialize(&bytes).expect("deserialize");
        assert_eq!(restored.get_val(&[0x00, 0x2b]).expect("value"), vec![0, 1]);
    }

    #[test]
    fn missing_key_is_not_found() {
        let m = Map::new();
        assert!(matches!(m.get_val(&[1]), Err(MapError::NotFound)));
    }

    #[test]
    fn set_val_replaces_existing_entry() {
        let mut m = Map::new();
        m.set_val(vec![1], vec![1]);
        m.set_val(vec![1], vec![2]);
        assert_eq!(m.get_val(&[1]).unwrap(), vec![2]);
        assert_eq!(m.serialize().len(), Map::deserialize(&m.serialize()).unwrap().serialize().len());
    }

    #[test]
    fn empty_slot_bytes_deserialize_to_empty_map() {
        let m = Map::deserialize(&[]).expect("empty deserialize");
        assert!(m.get_val(&[1]).is_err());
    }
}
