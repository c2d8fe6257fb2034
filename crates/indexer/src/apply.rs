//! Forward application of one block, run inside a single database
//! transaction.  If anything here fails the transaction aborts, the cursor
//! stays put, and the next tick retries the same slot.

use diesel_async::AsyncPgConnection;
use lumen_chain::types::{AttestationResp, BlockResp, CommitteeResp, TxResp};
use lumen_chain::ChainReader;
use lumen_db::models::{
    NewAttestation, NewAuditor, NewBlock, NewStorageContract, NewTransaction, NewValidator,
};
use lumen_db::repo::{
    accounts, attestations, auditors, blocks, contracts, cursor, transactions, validators,
};
use lumen_primitives::buf::Hash256;
use lumen_primitives::params::Params;
use lumen_primitives::tx::TxType;
use tracing::*;

use crate::error::IndexerError;
use crate::CursorPos;

/// Applies `block` and advances the cursor, returning the new cursor
/// position.  The caller must have checked `block.parent_hash` against the
/// current hash; empty slots (zero block hash) are accepted unconditionally.
pub async fn apply_block<C: ChainReader + ?Sized>(
    conn: &mut AsyncPgConnection,
    node: &C,
    params: &Params,
    block: &BlockResp,
    current_hash: &Hash256,
) -> Result<CursorPos, IndexerError> {
    // Empty slot: a placeholder row, slot moves on, the hash does not.
    if block.block_hash.is_zero() {
        blocks::insert_empty(conn, block.slot).await?;
        cursor::bump_slot(conn, block.slot + 1).await?;
        return Ok(CursorPos {
            next_slot: block.slot + 1,
            current_hash: *current_hash,
        });
    }

    let block_id = blocks::insert(conn, &block_row(block)).await?;

    apply_attestations(conn, node, block, block_id).await?;
    apply_transactions(conn, node, params, block, block_id).await?;

    cursor::advance(conn, block.slot + 1, &block.block_hash).await?;

    debug!(slot = block.slot, hash = %block.block_hash, txs = block.txs.len(), "applied block");

    Ok(CursorPos {
        next_slot: block.slot + 1,
        current_hash: block.block_hash,
    })
}

fn block_row(block: &BlockResp) -> NewBlock {
    NewBlock {
        slot: block.slot as i64,
        hash: block.block_hash.to_hex(),
        parent_hash: block.parent_hash.to_hex(),
        state_hash: block.state_hash.to_hex(),
        proposer_index: block.proposer_index as i64,
        proposer_signature: block.proposer_signature.clone(),
        randao_reveal: block.randao_reveal.clone(),
        graffiti: block.graffiti.clone(),
        timestamp: block.timestamp as i64,
    }
}

/// Serialises aggregation bits into the stored `"i1,i2,…"` form.
pub(crate) fn aggregation_bits_csv(bits: &[u64]) -> String {
    bits.iter()
        .map(|b| b.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

async fn apply_attestations<C: ChainReader + ?Sized>(
    conn: &mut AsyncPgConnection,
    node: &C,
    block: &BlockResp,
    block_id: i64,
) -> Result<(), IndexerError> {
    if block.attestations.is_empty() {
        return Ok(());
    }

    // One committee lookup serves every attestation in the block.
    let committees = node.committees(block.slot).await?;

    for attestation in &block.attestations {
        attestations::insert(conn, &attestation_row(attestation, block_id)).await?;
        mark_attesters(conn, &committees, attestation, block.slot, block_id).await?;
    }

    Ok(())
}

fn attestation_row(attestation: &AttestationResp, block_id: i64) -> NewAttestation {
    NewAttestation {
        block_id,
        committee_index: attestation.committee_index as i64,
        aggregation_bits: aggregation_bits_csv(&attestation.aggregation_bits),
        source_epoch: attestation.source.epoch as i64,
        source_hash: attestation.source.hash.to_hex(),
        target_epoch: attestation.target.epoch as i64,
        target_hash: attestation.target.hash.to_hex(),
        signature: attestation.signature.clone(),
    }
}

/// Resolves each aggregation bit through the slot's committee to a validator
/// index and points that validator's `attest_block_id` at this block.
async fn mark_attesters(
    conn: &mut AsyncPgConnection,
    committees: &[CommitteeResp],
    attestation: &AttestationResp,
    slot: u64,
    block_id: i64,
) -> Result<(), IndexerError> {
    let committee = committees
        .iter()
        .find(|c| c.committee_index == attestation.committee_index)
        .ok_or(IndexerError::MissingCommittee {
            slot,
            committee_index: attestation.committee_index,
        })?;

    for &bit in &attestation.aggregation_bits {
        let validator_index = *committee.validator_indexes.get(bit as usize).ok_or(
            IndexerError::BitOutOfRange {
                slot,
                committee_index: attestation.committee_index,
                bit,
            },
        )?;

        validators::set_attest_block(conn, validator_index, block_id).await?;
    }

    Ok(())
}

async fn apply_transactions<C: ChainReader + ?Sized>(
    conn: &mut AsyncPgConnection,
    node: &C,
    params: &Params,
    block: &BlockResp,
    block_id: i64,
) -> Result<(), IndexerError> {
    for (position, tx) in block.txs.iter().enumerate() {
        let from_id = ensure_sender_account(conn, node, &tx.from).await?;

        let raw = serde_json::to_vec(tx)?;
        let tx_id = transactions::insert(
            conn,
            &NewTransaction {
                block_id,
                hash: tx.tx_hash.to_hex(),
                from_account_id: from_id,
                position: position as i64,
                gas_price: tx.gas_price as i64,
                tx_type: tx.tx_type.code(),
                raw,
            },
        )
        .await?;

        match tx.tx_type {
            TxType::BalanceTransfer => apply_balance_transfer(conn, tx).await?,
            TxType::ObjectCommit => apply_object_commit(conn, node, tx, block, tx_id).await?,
            TxType::ObjectAudit => apply_object_audit(conn, tx, tx_id).await?,
            TxType::ValidatorDeposit => apply_validator_deposit(conn, node, tx, from_id).await?,
            TxType::AuditorDeposit => apply_auditor_deposit(conn, node, tx, from_id).await?,
            // Exits and PoR submissions only leave the transaction record.
            TxType::ValidatorExit | TxType::AuditorExit | TxType::ObjectPor => {}
        }

        // Uniform sender accounting, applied last: nonce bump plus gas.
        let gas_usage = params.gas().for_tx(tx.tx_type);
        accounts::apply_gas(conn, from_id, tx.gas_price * gas_usage).await?;
    }

    Ok(())
}

/// Resolves the sender's account id, pulling a previously unseen account
/// from the node so its nonce and balance start from the reported state.
async fn ensure_sender_account<C: ChainReader + ?Sized>(
    conn: &mut AsyncPgConnection,
    node: &C,
    public_key: &str,
) -> Result<i64, IndexerError> {
    if let Some(id) = accounts::try_id_by_public_key(conn, public_key).await? {
        return Ok(id);
    }

    let account = node.account(public_key).await?;
    debug!(%public_key, balance = account.balance, "creating account from node state");
    Ok(accounts::insert(conn, public_key, account.nonce, account.balance).await?)
}

async fn apply_balance_transfer(
    conn: &mut AsyncPgConnection,
    tx: &TxResp,
) -> Result<(), IndexerError> {
    let transfer = tx
        .balance_transfer
        .as_ref()
        .ok_or(IndexerError::MissingPayload {
            tx_hash: tx.tx_hash,
            expected: "balance_transfer",
        })?;

    accounts::debit(conn, &tx.from, transfer.amount).await?;

    let to_id = accounts::find_or_create(conn, &transfer.to).await?;
    accounts::credit_by_id(conn, to_id, transfer.amount).await?;

    Ok(())
}

async fn apply_object_commit<C: ChainReader + ?Sized>(
    conn: &mut AsyncPgConnection,
    node: &C,
    tx: &TxResp,
    block: &BlockResp,
    tx_id: i64,
) -> Result<(), IndexerError> {
    let sc = node.storage_contract(&tx.tx_hash, &block.block_hash).await?;

    let owner_id = accounts::id_by_public_key(conn, &sc.owner).await?;
    let depot_id = accounts::id_by_public_key(conn, &sc.depot).await?;
    let auditor_id = if sc.auditor.is_empty() {
        None
    } else {
        Some(accounts::id_by_public_key(conn, &sc.auditor).await?)
    };

    // The owner pays the storage fee, the depot locks its pledge.
    accounts::debit(conn, &sc.owner, sc.fee).await?;
    accounts::debit(conn, &sc.depot, sc.pledge).await?;

    let contract_id = contracts::insert(
        conn,
        &NewStorageContract {
            commit_transaction_id: tx_id,
            owner_id,
            depot_id,
            auditor_id,
            object_hash: sc.object_hash.to_hex(),
            status: sc.status.code(),
            size: sc.size as i64,
            fee: sc.fee as i64,
            pledge: sc.pledge as i64,
            start_slot: sc.start_slot as i64,
            end_slot: sc.end_slot as i64,
        },
    )
    .await?;

    contracts::link_tx(conn, tx_id, contract_id).await?;
    Ok(())
}

async fn apply_object_audit(
    conn: &mut AsyncPgConnection,
    tx: &TxResp,
    tx_id: i64,
) -> Result<(), IndexerError> {
    let audit = tx.object_audit.as_ref().ok_or(IndexerError::MissingPayload {
        tx_hash: tx.tx_hash,
        expected: "object_audit",
    })?;

    let contract_id = contracts::id_by_object_hash(conn, &audit.hash).await?;
    contracts::link_tx(conn, tx_id, contract_id).await?;
    Ok(())
}

async fn apply_validator_deposit<C: ChainReader + ?Sized>(
    conn: &mut AsyncPgConnection,
    node: &C,
    tx: &TxResp,
    from_id: i64,
) -> Result<(), IndexerError> {
    let deposit = tx
        .validator_deposit
        .as_ref()
        .ok_or(IndexerError::MissingPayload {
            tx_hash: tx.tx_hash,
            expected: "validator_deposit",
        })?;

    // Sender is debited first; the participant row follows.
    accounts::debit(conn, &tx.from, deposit.amount).await?;

    if validators::find_by_account(conn, from_id).await?.is_some() {
        validators::add_deposit(conn, from_id, deposit.amount).await?;
        return Ok(());
    }

    let validator = node.validator(&tx.from).await?;
    validators::insert(
        conn,
        &NewValidator {
            account_id: from_id,
            idx: validator.index as i64,
            deposit: deposit.amount as i64,
            status: validator.status.code(),
            activation_epoch: validator.activation_epoch as i64,
            exit_epoch: validator.exit_epoch as i64,
            attest_block_id: None,
        },
    )
    .await?;

    Ok(())
}

async fn apply_auditor_deposit<C: ChainReader + ?Sized>(
    conn: &mut AsyncPgConnection,
    node: &C,
    tx: &TxResp,
    from_id: i64,
) -> Result<(), IndexerError> {
    let deposit = tx
        .auditor_deposit
        .as_ref()
        .ok_or(IndexerError::MissingPayload {
            tx_hash: tx.tx_hash,
            expected: "auditor_deposit",
        })?;

    accounts::debit(conn, &tx.from, deposit.amount).await?;

    if auditors::find_by_account(conn, from_id).await?.is_some() {
        auditors::add_deposit(conn, from_id, deposit.amount).await?;
        return Ok(());
    }

    let auditor = node.auditor(&tx.from).await?;
    auditors::insert(
        conn,
        &NewAuditor {
            account_id: from_id,
            deposit: deposit.amount as i64,
            status: auditor.status.code(),
            activation_epoch: auditor.activation_epoch as i64,
            exit_epoch: auditor.exit_epoch as i64,
        },
    )
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use lumen_chain::types::CheckpointRefResp;

    use super::*;

    #[test]
    fn test_aggregation_bits_csv() {
        assert_eq!(aggregation_bits_csv(&[]), "");
        assert_eq!(aggregation_bits_csv(&[4]), "4");
        assert_eq!(aggregation_bits_csv(&[0, 2, 5]), "0,2,5");
    }

    #[test]
    fn test_block_row_conversion() {
        let block = BlockResp {
            slot: 42,
            block_hash: Hash256([0xab; 32]),
            parent_hash: Hash256([0xcd; 32]),
            state_hash: Hash256([0xef; 32]),
            proposer_index: 7,
            proposer_signature: "sig".to_owned(),
            randao_reveal: "randao".to_owned(),
            graffiti: "hello".to_owned(),
            timestamp: 1234,
            attestations: Vec::new(),
            txs: Vec::new(),
        };

        let row = block_row(&block);
        assert_eq!(row.slot, 42);
        assert_eq!(row.hash, "ab".repeat(32));
        assert_eq!(row.parent_hash, "cd".repeat(32));
        assert_eq!(row.proposer_index, 7);
        assert_eq!(row.timestamp, 1234);
    }

    #[test]
    fn test_attestation_row_serialises_bits() {
        let attestation = AttestationResp {
            committee_index: 3,
            aggregation_bits: vec![1, 4, 6],
            source: CheckpointRefResp {
                epoch: 8,
                hash: Hash256([0x11; 32]),
            },
            target: CheckpointRefResp {
                epoch: 9,
                hash: Hash256([0x22; 32]),
            },
            signature: "sig".to_owned(),
        };

        let row = attestation_row(&attestation, 99);
        assert_eq!(row.block_id, 99);
        assert_eq!(row.committee_index, 3);
        assert_eq!(row.aggregation_bits, "1,4,6");
        assert_eq!(row.source_epoch, 8);
        assert_eq!(row.target_epoch, 9);
        assert_eq!(row.target_hash, "22".repeat(32));
    }
}
