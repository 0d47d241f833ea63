use crate::*;
use digest::Digest;
use sha2::Sha256;
use std::collections::BTreeMap;

/// Namespace tag for confidential ballot keys
pub const VOTE_KEY_NAMESPACE: &str = "vote";

/// Name of an organization's confidential partition
pub fn collection_name(org: &OrgId) -> String {
    format!("_implicit_org_{}", org)
}

/// Composite key of a confidential ballot: ("vote", election, token)
pub fn vote_key(election: &str, token: &VoteToken) -> String {
    format!(
        "\u{0}{}\u{0}{}\u{0}{}\u{0}",
        VOTE_KEY_NAMESPACE, election, token
    )
}

/// A key-value ledger with one public partition and one confidential
/// partition per organization
pub trait LedgerStore {
    fn get_public(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    fn put_public(&mut self, key: &str, value: Vec<u8>) -> Result<(), StoreError>;

    fn get_confidential(&self, org: &OrgId, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Confidential keys are write-once
    fn put_confidential(&mut self, org: &OrgId, key: &str, value: Vec<u8>)
        -> Result<(), StoreError>;

    /// Hash of a confidential value, without revealing it
    fn commitment_of(&self, org: &OrgId, key: &str) -> Result<Option<Commitment>, StoreError> {
        Ok(self
            .get_confidential(org, key)?
            .map(|value| self.digest(&value)))
    }

    /// The hash primitive behind `commitment_of`
    fn digest(&self, value: &[u8]) -> Commitment {
        Commitment(hex::encode(Sha256::digest(value)))
    }

    /// Apply all writes of one transaction.
    ///
    /// Implementations that can fail part-way must override this so that
    /// either every write lands or none does.
    fn apply(&mut self, writes: WriteSet) -> Result<(), StoreError> {
        for write in writes.into_iter() {
            match write {
                Write::Public { key, value } => self.put_public(&key, value)?,
                Write::Confidential { org, key, value } => {
                    self.put_confidential(&org, &key, value)?
                }
            }
        }
        Ok(())
    }
}

/// A single staged write
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Write {
    Public {
        key: String,
        value: Vec<u8>,
    },
    Confidential {
        org: OrgId,
        key: String,
        value: Vec<u8>,
    },
}

/// The writes of one transaction, in the order they were staged
#[derive(Clone, Debug, Default)]
pub struct WriteSet {
    writes: Vec<Write>,
}

impl WriteSet {
    pub fn push(&mut self, write: Write) {
        self.writes.push(write);
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Write> {
        self.writes.iter()
    }
}

impl IntoIterator for WriteSet {
    type Item = Write;
    type IntoIter = std::vec::IntoIter<Write>;

    fn into_iter(self) -> Self::IntoIter {
        self.writes.into_iter()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
struct Value(#[serde(with = "hex_serde")] Vec<u8>);

/// A simple store that uses in-memory BTreeMaps
#[derive(Serialize, Deserialize, Default, Clone, Debug)]
pub struct MemStore {
    public: BTreeMap<String, Value>,

    /// Collection name -> key -> value
    confidential: BTreeMap<String, BTreeMap<String, Value>>,
}

impl MemStore {
    /// Keys of the public partition
    pub fn public_keys(&self) -> impl Iterator<Item = &str> {
        self.public.keys().map(|k| k.as_str())
    }

    fn has_confidential(&self, collection: &str, key: &str) -> bool {
        self.confidential
            .get(collection)
            .map(|c| c.contains_key(key))
            .unwrap_or(false)
    }
}

impl LedgerStore for MemStore {
    fn get_public(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.public.get(key).map(|v| v.0.clone()))
    }

    fn put_public(&mut self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        log::debug!("put public state {}", key);
        self.public.insert(key.to_owned(), Value(value));
        Ok(())
    }

    fn get_confidential(&self, org: &OrgId, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self
            .confidential
            .get(&collection_name(org))
            .and_then(|c| c.get(key))
            .map(|v| v.0.clone()))
    }

    fn put_confidential(
        &mut self,
        org: &OrgId,
        key: &str,
        value: Vec<u8>,
    ) -> Result<(), StoreError> {
        let collection = collection_name(org);
        if self.has_confidential(&collection, key) {
            return Err(StoreError::DuplicateKey {
                collection,
                key: key.escape_default().to_string(),
            });
        }
        log::debug!("put private data in {}", collection);
        self.confidential
            .entry(collection)
            .or_default()
            .insert(key.to_owned(), Value(value));
        Ok(())
    }

    fn apply(&mut self, writes: WriteSet) -> Result<(), StoreError> {
        // Check every write-once key before touching anything
        let mut staged: Vec<(String, &str)> = Vec::new();
        for write in writes.iter() {
            if let Write::Confidential { org, key, .. } = write {
                let collection = collection_name(org);
                if self.has_confidential(&collection, key)
                    || staged.iter().any(|(c, k)| *c == collection && *k == key.as_str())
                {
                    return Err(StoreError::DuplicateKey {
                        collection,
                        key: key.escape_default().to_string(),
                    });
                }
                staged.push((collection, key.as_str()));
            }
        }

        for write in writes.into_iter() {
            match write {
                Write::Public { key, value } => self.put_public(&key, value)?,
                Write::Confidential { org, key, value } => {
                    self.put_confidential(&org, &key, value)?
                }
            }
        }
        Ok(())
    }
}
