//! Diff-to-document processing for one partition.

use std::sync::Arc;

use tracing::debug;

use crate::chain::DiffEntry;
use crate::convert::StateConverter;
use crate::models::StateDocument;
use crate::store::DocumentSink;
use crate::MirrorError;
use crate::Result;

/// Converts raw diff entries into documents and batches the write.
///
/// Pure with respect to its inputs apart from the injected converter;
/// the poller owns the sequencing of `convert` → `persist` → checkpoint.
pub struct DiffProcessor {
    collection: String,
    converter: Arc<dyn StateConverter>,
    sink: Arc<dyn DocumentSink>,
}

impl DiffProcessor {
    #[must_use]
    pub fn new(
        collection: impl Into<String>,
        converter: Arc<dyn StateConverter>,
        sink: Arc<dyn DocumentSink>,
    ) -> Self {
        Self {
            collection: collection.into(),
            converter,
            sink,
        }
    }

    #[must_use]
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Convert the non-removed entries of a window into documents.
    ///
    /// Removals (`changed_state == None`) are filtered out. Every produced
    /// document is stamped with the window's target block index.
    ///
    /// # Errors
    /// A payload that fails hex decoding or conversion aborts the whole
    /// window; the error carries the collection, block index, and offending
    /// path for diagnosis.
    pub fn convert(&self, entries: &[DiffEntry], block_index: i64) -> Result<Vec<StateDocument>> {
        let mut documents = Vec::new();

        for entry in entries {
            let Some(changed_state) = &entry.changed_state else {
                continue;
            };

            let raw_state = hex::decode(changed_state).map_err(|e| MirrorError::Convert {
                collection: self.collection.clone(),
                block_index,
                path: entry.path.clone(),
                reason: format!("invalid hex payload: {e}"),
            })?;

            let document = self
                .converter
                .convert(&raw_state, block_index, &entry.path)
                .map_err(|e| MirrorError::Convert {
                    collection: self.collection.clone(),
                    block_index,
                    path: entry.path.clone(),
                    reason: e.to_string(),
                })?;

            documents.push(document);
        }

        debug!(
            collection = %self.collection,
            entries = entries.len(),
            converted = documents.len(),
            "Converted diff entries"
        );

        Ok(documents)
    }

    /// Persist a converted batch through the sink.
    ///
    /// # Errors
    /// A failed batch leaves the checkpoint untouched; the caller retries
    /// the same window on its next iteration, which is safe because upserts
    /// are keyed by entity key.
    pub async fn persist(&self, documents: &[StateDocument]) -> Result<()> {
        self.sink.upsert_many(&self.collection, documents).await
    }
}
