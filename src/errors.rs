use thiserror::Error;

#[derive(Error, Debug)]
pub enum MirrorError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Chain query error: {0}")]
    ChainQuery(String),

    #[error("Checkpoint not found: poller {poller_id}, collection {collection}")]
    CheckpointNotFound {
        poller_id: String,
        collection: String,
    },

    #[error("Conversion failed in {collection} at block {block_index}, path {path}: {reason}")]
    Convert {
        collection: String,
        block_index: i64,
        path: String,
        reason: String,
    },

    #[error("Snapshot error: {0}")]
    Snapshot(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl MirrorError {
    /// True for the missing-checkpoint case, which is a first-run signal
    /// rather than a failure.
    #[must_use]
    pub const fn is_checkpoint_not_found(&self) -> bool {
        matches!(self, Self::CheckpointNotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, MirrorError>;
