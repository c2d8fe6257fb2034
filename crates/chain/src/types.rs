//! Wire types for the node gateway.  Field names match the node's JSON;
//! hashes travel as 64-char hex strings and decode into [`Hash256`].

use lumen_primitives::buf::Hash256;
use lumen_primitives::tx::{ContractStatus, ParticipantStatus, TxType};
use serde::{Deserialize, Serialize};

/// A `(slot, hash)` pair as reported by `chain-status`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CheckpointResp {
    pub slot: u64,
    pub hash: Hash256,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChainStatusResp {
    pub best: CheckpointResp,
    pub finalized: CheckpointResp,
}

/// A full block as returned by the `block` endpoint.  Empty slots come back
/// with `block_hash` equal to the zero-hash and no attestations or txs.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BlockResp {
    pub slot: u64,
    pub block_hash: Hash256,
    pub parent_hash: Hash256,
    #[serde(default)]
    pub state_hash: Hash256,
    #[serde(default)]
    pub proposer_index: u64,
    #[serde(default)]
    pub proposer_signature: String,
    #[serde(default)]
    pub randao_reveal: String,
    #[serde(default)]
    pub graffiti: String,
    #[serde(default)]
    pub timestamp: u64,
    #[serde(default)]
    pub attestations: Vec<AttestationResp>,
    #[serde(default)]
    pub txs: Vec<TxResp>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CheckpointRefResp {
    pub epoch: u64,
    pub hash: Hash256,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AttestationResp {
    pub committee_index: u64,
    /// Indices into the committee's validator list, one per set bit.
    pub aggregation_bits: Vec<u64>,
    pub source: CheckpointRefResp,
    pub target: CheckpointRefResp,
    pub signature: String,
}

/// A transaction with its type-specific payload.  Exactly one payload field
/// is populated, matching `tx_type`; the struct is round-tripped through
/// serde_json to fill the opaque `raw` column.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TxResp {
    pub tx_hash: Hash256,
    pub from: String,
    pub gas_price: u64,
    #[serde(rename = "type")]
    pub tx_type: TxType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance_transfer: Option<BalanceTransferTx>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validator_deposit: Option<DepositTx>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auditor_deposit: Option<DepositTx>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_audit: Option<ObjectAuditTx>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BalanceTransferTx {
    pub to: String,
    pub amount: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DepositTx {
    pub amount: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ObjectAuditTx {
    pub hash: Hash256,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AccountResp {
    pub nonce: u64,
    pub balance: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ValidatorResp {
    pub index: u64,
    pub balance: u64,
    pub status: ParticipantStatus,
    pub activation_epoch: u64,
    pub exit_epoch: u64,
}

/// One entry of the paged validator listing; unlike [`ValidatorResp`] it
/// carries the public key the entry belongs to.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ValidatorEntryResp {
    pub public_key: String,
    pub index: u64,
    pub balance: u64,
    pub status: ParticipantStatus,
    pub activation_epoch: u64,
    pub exit_epoch: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ValidatorsResp {
    #[serde(default)]
    pub validators: Vec<ValidatorEntryResp>,
    #[serde(default)]
    pub next_page_token: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuditorResp {
    pub balance: u64,
    pub status: ParticipantStatus,
    pub activation_epoch: u64,
    pub exit_epoch: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuditorEntryResp {
    pub public_key: String,
    pub balance: u64,
    pub status: ParticipantStatus,
    pub activation_epoch: u64,
    pub exit_epoch: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuditorsResp {
    #[serde(default)]
    pub auditors: Vec<AuditorEntryResp>,
    #[serde(default)]
    pub next_page_token: String,
}

/// Projection of an object-commit as materialised by the node.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StorageContractResp {
    pub owner: String,
    pub depot: String,
    /// Empty when the commit names no auditor.
    #[serde(default)]
    pub auditor: String,
    pub object_hash: Hash256,
    pub status: ContractStatus,
    pub size: u64,
    pub fee: u64,
    pub pledge: u64,
    pub start_slot: u64,
    pub end_slot: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CommitteeResp {
    pub committee_index: u64,
    pub validator_indexes: Vec<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_primitives::tx::TxType;

    #[test]
    fn test_decode_chain_status() {
        let raw = format!(
            r#"{{
                "best": {{"slot": 120, "hash": "{h1}"}},
                "finalized": {{"slot": 96, "hash": "{h2}"}}
            }}"#,
            h1 = "11".repeat(32),
            h2 = "22".repeat(32),
        );
        let status: ChainStatusResp = serde_json::from_str(&raw).unwrap();
        assert_eq!(status.best.slot, 120);
        assert_eq!(status.finalized.slot, 96);
        assert_eq!(status.finalized.hash.to_hex(), "22".repeat(32));
    }

    #[test]
    fn test_decode_empty_slot_block() {
        let raw = format!(
            r#"{{"slot": 7, "block_hash": "{z}", "parent_hash": "{z}"}}"#,
            z = "0".repeat(64),
        );
        let block: BlockResp = serde_json::from_str(&raw).unwrap();
        assert_eq!(block.slot, 7);
        assert!(block.block_hash.is_zero());
        assert!(block.attestations.is_empty());
        assert!(block.txs.is_empty());
    }

    #[test]
    fn test_decode_transfer_tx() {
        let raw = format!(
            r#"{{
                "tx_hash": "{h}",
                "from": "{from}",
                "gas_price": 2,
                "type": "BALANCE_TRANSFER",
                "balance_transfer": {{"to": "{to}", "amount": 10}}
            }}"#,
            h = "ab".repeat(32),
            from = "0a".repeat(48),
            to = "0b".repeat(48),
        );
        let tx: TxResp = serde_json::from_str(&raw).unwrap();
        assert_eq!(tx.tx_type, TxType::BalanceTransfer);
        let transfer = tx.balance_transfer.as_ref().unwrap();
        assert_eq!(transfer.amount, 10);
        assert!(tx.validator_deposit.is_none());

        // The raw column round-trips through serde_json.
        let bytes = serde_json::to_vec(&tx).unwrap();
        let back: TxResp = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(back.tx_hash, tx.tx_hash);
        assert_eq!(back.balance_transfer.unwrap().to, transfer.to);
    }

    #[test]
    fn test_decode_contract_without_auditor() {
        let raw = format!(
            r#"{{
                "owner": "{o}",
                "depot": "{d}",
                "object_hash": "{h}",
                "status": "ACTIVE",
                "size": 4096,
                "fee": 7,
                "pledge": 3,
                "start_slot": 10,
                "end_slot": 100
            }}"#,
            o = "0a".repeat(48),
            d = "0b".repeat(48),
            h = "cd".repeat(32),
        );
        let sc: StorageContractResp = serde_json::from_str(&raw).unwrap();
        assert!(sc.auditor.is_empty());
        assert_eq!(sc.status, ContractStatus::Active);
        assert_eq!(sc.fee, 7);
        assert_eq!(sc.pledge, 3);
    }

    #[test]
    fn test_decode_validator_listing_page() {
        let raw = format!(
            r#"{{
                "validators": [
                    {{"public_key": "{pk}", "index": 0, "balance": 40,
                      "status": "ACTIVE", "activation_epoch": 0, "exit_epoch": 0}}
                ],
                "next_page_token": "abc"
            }}"#,
            pk = "0c".repeat(48),
        );
        let page: ValidatorsResp = serde_json::from_str(&raw).unwrap();
        assert_eq!(page.validators.len(), 1);
        assert_eq!(page.validators[0].status, ParticipantStatus::Active);
        assert_eq!(page.next_page_token, "abc");

        let done: ValidatorsResp = serde_json::from_str(r#"{"validators": []}"#).unwrap();
        assert!(done.next_page_token.is_empty());
    }
}
