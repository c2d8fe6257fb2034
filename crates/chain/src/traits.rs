use async_trait::async_trait;
use lumen_primitives::buf::Hash256;

use crate::error::ClientError;
use crate::types::{
    AccountResp, AuditorResp, AuditorsResp, BlockResp, ChainStatusResp, CommitteeResp,
    StorageContractResp, ValidatorResp, ValidatorsResp,
};

/// Read interface onto the consensus node.  The indexer core is generic over
/// this so tests can drive it with a mock instead of a live node.
#[cfg_attr(feature = "test-utils", mockall::automock)]
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Best and finalized checkpoints of the canonical chain.
    async fn chain_status(&self) -> Result<ChainStatusResp, ClientError>;

    async fn block_by_slot(&self, slot: u64) -> Result<BlockResp, ClientError>;

    async fn block_by_hash(&self, hash: &Hash256) -> Result<BlockResp, ClientError>;

    /// Account state for a BLS public key (hex).  The key is validated
    /// before the request goes out.
    async fn account(&self, public_key: &str) -> Result<AccountResp, ClientError>;

    async fn validator(&self, public_key: &str) -> Result<ValidatorResp, ClientError>;

    async fn validators(
        &self,
        page_token: &str,
        page_size: u64,
    ) -> Result<ValidatorsResp, ClientError>;

    async fn auditor(&self, public_key: &str) -> Result<AuditorResp, ClientError>;

    async fn auditors(
        &self,
        page_token: &str,
        page_size: u64,
    ) -> Result<AuditorsResp, ClientError>;

    /// Object-commit projection for the given commit tx within a block.
    async fn storage_contract(
        &self,
        tx_hash: &Hash256,
        block_hash: &Hash256,
    ) -> Result<StorageContractResp, ClientError>;

    /// Committee assignments for a slot, used to map aggregation bits back
    /// to validator indices.
    async fn committees(&self, slot: u64) -> Result<Vec<CommitteeResp>, ClientError>;
}
