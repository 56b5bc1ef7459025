//! In-memory fakes for the sync engine tests.
#![allow(dead_code)] // not every test binary uses every helper

use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicI64;
use std::sync::atomic::Ordering;
use std::sync::Mutex;

use async_trait::async_trait;
use chainmirror::ChainSource;
use chainmirror::CheckpointStore;
use chainmirror::DiffEntry;
use chainmirror::DocumentSink;
use chainmirror::MirrorError;
use chainmirror::Result;
use chainmirror::StateDocument;

/// Scripted chain: a settable tip and a map of windows to diff entries.
#[derive(Default)]
pub struct FakeChain {
    tip: AtomicI64,
    diffs: Mutex<HashMap<(i64, i64), Vec<DiffEntry>>>,
    fail_fetch: AtomicBool,
    pub fetched_windows: Mutex<Vec<(i64, i64)>>,
}

impl FakeChain {
    pub fn new(tip: i64) -> Self {
        let chain = Self::default();
        chain.tip.store(tip, Ordering::SeqCst);
        chain
    }

    pub fn set_tip(&self, tip: i64) {
        self.tip.store(tip, Ordering::SeqCst);
    }

    pub fn put_diffs(&self, base: i64, target: i64, entries: Vec<DiffEntry>) {
        self.diffs.lock().unwrap().insert((base, target), entries);
    }

    pub fn set_fail_fetch(&self, fail: bool) {
        self.fail_fetch.store(fail, Ordering::SeqCst);
    }

    pub fn fetched_windows(&self) -> Vec<(i64, i64)> {
        self.fetched_windows.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChainSource for FakeChain {
    async fn get_account_diffs(
        &self,
        _account_address: &str,
        base_index: i64,
        target_index: i64,
    ) -> Result<Vec<DiffEntry>> {
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(MirrorError::ChainQuery("diff source unavailable".into()));
        }

        self.fetched_windows
            .lock()
            .unwrap()
            .push((base_index, target_index));

        Ok(self
            .diffs
            .lock()
            .unwrap()
            .get(&(base_index, target_index))
            .cloned()
            .unwrap_or_default())
    }

    async fn get_tip_index(&self, _account_address: &str) -> Result<i64> {
        Ok(self.tip.load(Ordering::SeqCst))
    }
}

/// In-memory checkpoint store + document sink with failure injection.
#[derive(Default)]
pub struct FakeStore {
    checkpoints: Mutex<HashMap<(String, String), i64>>,
    documents: Mutex<HashMap<(String, String), StateDocument>>,
    fail_persist: AtomicBool,
    pub checkpoint_history: Mutex<Vec<i64>>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_checkpoint(&self, poller_id: &str, collection: &str, index: i64) {
        self.checkpoints
            .lock()
            .unwrap()
            .insert((poller_id.to_string(), collection.to_string()), index);
    }

    pub fn checkpoint(&self, poller_id: &str, collection: &str) -> Option<i64> {
        self.checkpoints
            .lock()
            .unwrap()
            .get(&(poller_id.to_string(), collection.to_string()))
            .copied()
    }

    pub fn set_fail_persist(&self, fail: bool) {
        self.fail_persist.store(fail, Ordering::SeqCst);
    }

    pub fn document(&self, collection: &str, key: &str) -> Option<StateDocument> {
        self.documents
            .lock()
            .unwrap()
            .get(&(collection.to_string(), key.to_string()))
            .cloned()
    }

    pub fn documents_in(&self, collection: &str) -> Vec<StateDocument> {
        let mut documents: Vec<StateDocument> = self
            .documents
            .lock()
            .unwrap()
            .iter()
            .filter(|((c, _), _)| c == collection)
            .map(|(_, d)| d.clone())
            .collect();
        documents.sort_by(|a, b| a.key.cmp(&b.key));
        documents
    }

    pub fn checkpoint_history(&self) -> Vec<i64> {
        self.checkpoint_history.lock().unwrap().clone()
    }
}

#[async_trait]
impl CheckpointStore for FakeStore {
    async fn get_synced_block_index(&self, poller_id: &str, collection: &str) -> Result<i64> {
        self.checkpoint(poller_id, collection)
            .ok_or_else(|| MirrorError::CheckpointNotFound {
                poller_id: poller_id.to_string(),
                collection: collection.to_string(),
            })
    }

    async fn update_checkpoint(
        &self,
        poller_id: &str,
        collection: &str,
        block_index: i64,
    ) -> Result<()> {
        self.set_checkpoint(poller_id, collection, block_index);
        self.checkpoint_history.lock().unwrap().push(block_index);
        Ok(())
    }
}

#[async_trait]
impl DocumentSink for FakeStore {
    async fn upsert_many(&self, collection: &str, documents: &[StateDocument]) -> Result<()> {
        if self.fail_persist.load(Ordering::SeqCst) {
            return Err(MirrorError::ChainQuery("sink unavailable".into()));
        }

        let mut stored = self.documents.lock().unwrap();
        for document in documents {
            stored.insert(
                (collection.to_string(), document.key.clone()),
                document.clone(),
            );
        }
        Ok(())
    }

    async fn tip_index(&self) -> Result<i64> {
        self.checkpoints
            .lock()
            .unwrap()
            .values()
            .min()
            .copied()
            .ok_or_else(|| MirrorError::CheckpointNotFound {
                poller_id: "*".to_string(),
                collection: "*".to_string(),
            })
    }
}

/// Diff entry with a hex-encoded payload, as the chain source returns them.
pub fn hex_entry(path: &str, payload: &[u8]) -> DiffEntry {
    DiffEntry {
        path: path.to_string(),
        changed_state: Some(hex::encode(payload)),
    }
}

/// Removed slot: filtered out before conversion.
pub fn removed_entry(path: &str) -> DiffEntry {
    DiffEntry {
        path: path.to_string(),
        changed_state: None,
    }
}
