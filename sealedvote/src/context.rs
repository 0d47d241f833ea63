use crate::*;
use std::collections::BTreeMap;

/// The view of the ledger held by one executing transaction.
///
/// Reads fall through to the backing store; writes stay staged until the
/// handler takes them with [`TxContext::into_writes`] and applies them in one
/// batch. Dropping the context discards everything it staged.
pub struct TxContext<'a, S: LedgerStore + ?Sized> {
    id: TxId,
    caller: Caller,
    store: &'a S,
    public: BTreeMap<String, Vec<u8>>,
    confidential: BTreeMap<(OrgId, String), Vec<u8>>,
}

impl<'a, S: LedgerStore + ?Sized> TxContext<'a, S> {
    pub fn new(id: TxId, caller: Caller, store: &'a S) -> Self {
        TxContext {
            id,
            caller,
            store,
            public: BTreeMap::new(),
            confidential: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> TxId {
        self.id
    }

    pub fn caller(&self) -> &Caller {
        &self.caller
    }

    /// Staged writes, confidential first
    pub fn into_writes(self) -> WriteSet {
        let mut writes = WriteSet::default();
        for ((org, key), value) in self.confidential {
            writes.push(Write::Confidential { org, key, value });
        }
        for (key, value) in self.public {
            writes.push(Write::Public { key, value });
        }
        writes
    }

    fn check_partition(&self, org: &OrgId) -> Result<(), StoreError> {
        if *org != self.caller.node_org {
            return Err(StoreError::AccessDenied {
                collection: collection_name(org),
                node: self.caller.node_org.clone(),
            });
        }
        Ok(())
    }
}

impl<'a, S: LedgerStore + ?Sized> LedgerStore for TxContext<'a, S> {
    fn get_public(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        match self.public.get(key) {
            Some(value) => Ok(Some(value.clone())),
            None => self.store.get_public(key),
        }
    }

    fn put_public(&mut self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        self.public.insert(key.to_owned(), value);
        Ok(())
    }

    fn get_confidential(&self, org: &OrgId, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        self.check_partition(org)?;
        match self.confidential.get(&(org.clone(), key.to_owned())) {
            Some(value) => Ok(Some(value.clone())),
            None => self.store.get_confidential(org, key),
        }
    }

    fn put_confidential(
        &mut self,
        org: &OrgId,
        key: &str,
        value: Vec<u8>,
    ) -> Result<(), StoreError> {
        self.check_partition(org)?;
        let staged_key = (org.clone(), key.to_owned());
        if self.confidential.contains_key(&staged_key)
            || self.store.commitment_of(org, key)?.is_some()
        {
            return Err(StoreError::DuplicateKey {
                collection: collection_name(org),
                key: key.escape_default().to_string(),
            });
        }
        self.confidential.insert(staged_key, value);
        Ok(())
    }

    /// Hashes are visible to every peer, whatever the partition
    fn commitment_of(&self, org: &OrgId, key: &str) -> Result<Option<Commitment>, StoreError> {
        match self.confidential.get(&(org.clone(), key.to_owned())) {
            Some(value) => Ok(Some(self.digest(value))),
            None => self.store.commitment_of(org, key),
        }
    }

    fn digest(&self, value: &[u8]) -> Commitment {
        self.store.digest(value)
    }
}
