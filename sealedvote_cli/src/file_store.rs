use sealedvote::{Commitment, LedgerStore, MemStore, OrgId, StoreError, WriteSet};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// A ledger kept as a JSON document on disk.
///
/// The whole ledger is loaded on open and rewritten after every committed
/// transaction.
pub struct FileStore {
    path: PathBuf,
    inner: MemStore,
}

impl FileStore {
    /// Open a ledger file, starting empty if it does not exist yet
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref().to_owned();
        let inner = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| StoreError::Corrupt(format!("{}: {}", path.display(), e)))?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::info!("starting new ledger at {}", path.display());
                MemStore::default()
            }
            Err(e) => return Err(e.into()),
        };
        Ok(FileStore { path, inner })
    }

    /// Write the ledger back to disk, replacing the previous file whole
    fn save(&self) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(&self.inner)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        log::debug!("ledger written to {}", self.path.display());
        Ok(())
    }
}

impl LedgerStore for FileStore {
    fn get_public(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        self.inner.get_public(key)
    }

    fn put_public(&mut self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        self.inner.put_public(key, value)?;
        self.save()
    }

    fn get_confidential(&self, org: &OrgId, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        self.inner.get_confidential(org, key)
    }

    fn put_confidential(
        &mut self,
        org: &OrgId,
        key: &str,
        value: Vec<u8>,
    ) -> Result<(), StoreError> {
        self.inner.put_confidential(org, key, value)?;
        self.save()
    }

    fn commitment_of(&self, org: &OrgId, key: &str) -> Result<Option<Commitment>, StoreError> {
        self.inner.commitment_of(org, key)
    }

    fn apply(&mut self, writes: WriteSet) -> Result<(), StoreError> {
        // Stage on a copy so a failed write leaves both memory and disk as they were
        let mut next = self.inner.clone();
        next.apply(writes)?;
        let previous = std::mem::replace(&mut self.inner, next);
        if let Err(e) = self.save() {
            self.inner = previous;
            return Err(e);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sealedvote::{
        ElectionHandler, Invocation, StaticIdentity, TransactionType, TxId, Write,
    };

    fn temp_path() -> PathBuf {
        std::env::temp_dir().join(format!("sealedvote-{}.json", TxId::generate()))
    }

    #[test]
    fn persists_across_opens() {
        let path = temp_path();
        let org = OrgId::new("Org1MSP");

        {
            let mut store = FileStore::open(&path).unwrap();
            let mut writes = WriteSet::default();
            writes.push(Write::Public {
                key: "k".to_owned(),
                value: b"v".to_vec(),
            });
            writes.push(Write::Confidential {
                org: org.clone(),
                key: "secret".to_owned(),
                value: b"s".to_vec(),
            });
            store.apply(writes).unwrap();
        }

        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.get_public("k").unwrap(), Some(b"v".to_vec()));
        assert_eq!(
            store.commitment_of(&org, "secret").unwrap(),
            Some(store.digest(b"s"))
        );

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn failed_batch_leaves_file_alone() {
        let path = temp_path();
        let org = OrgId::new("Org1MSP");
        let mut store = FileStore::open(&path).unwrap();
        store.put_confidential(&org, "taken", b"x".to_vec()).unwrap();
        let before = fs::read(&path).unwrap();

        let mut writes = WriteSet::default();
        writes.push(Write::Public {
            key: "k".to_owned(),
            value: b"v".to_vec(),
        });
        writes.push(Write::Confidential {
            org,
            key: "taken".to_owned(),
            value: b"y".to_vec(),
        });
        assert!(store.apply(writes).is_err());
        assert_eq!(store.get_public("k").unwrap(), None);
        assert_eq!(fs::read(&path).unwrap(), before);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn runs_an_election() {
        let path = temp_path();
        let handler = ElectionHandler::default();
        let organizer = StaticIdentity::new("organizer", "Org1MSP");

        {
            let mut store = FileStore::open(&path).unwrap();
            let inv = Invocation::new(
                TransactionType::CreateElection,
                &["electionPrime", "ben", "simon", "jim"],
            );
            handler.apply(&inv, &mut store, &organizer).unwrap();
        }

        let mut store = FileStore::open(&path).unwrap();
        let inv = Invocation::new(TransactionType::CloseElection, &["electionPrime"]);
        handler.apply(&inv, &mut store, &organizer).unwrap();

        let store = FileStore::open(&path).unwrap();
        let inv = Invocation::new(TransactionType::QueryElection, &["electionPrime"]);
        let mut store = store;
        let election = handler.apply(&inv, &mut store, &organizer).unwrap();
        assert!(election.contains("\"status\":\"closed\""));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn corrupt_file() {
        let path = temp_path();
        fs::write(&path, b"not json").unwrap();
        assert!(matches!(
            FileStore::open(&path),
            Err(StoreError::Corrupt(_))
        ));
        fs::remove_file(&path).unwrap();
    }
}
