use lumen_chain::ClientError;
use lumen_db::DbError;
use lumen_primitives::buf::Hash256;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexerError {
    #[error("db: {0}")]
    Db(#[from] DbError),

    #[error("chain: {0}")]
    Chain(#[from] ClientError),

    #[error("encode: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("no committee {committee_index} at slot {slot}")]
    MissingCommittee { slot: u64, committee_index: u64 },

    #[error("aggregation bit {bit} out of range for committee {committee_index} at slot {slot}")]
    BitOutOfRange {
        slot: u64,
        committee_index: u64,
        bit: u64,
    },

    #[error("tx {tx_hash} is missing its {expected} payload")]
    MissingPayload {
        tx_hash: Hash256,
        expected: &'static str,
    },

    #[error("stored cursor hash is not valid hex: {0}")]
    CorruptCursor(String),

    #[error("parent mismatch at the zero hash, cannot roll back past genesis")]
    RollbackPastGenesis,
}

// The diesel transaction combinator needs to surface its own commit/abort
// errors through ours.
impl From<diesel::result::Error> for IndexerError {
    fn from(e: diesel::result::Error) -> Self {
        IndexerError::Db(DbError::from(e))
    }
}
