//! Inverse application of the block the cursor currently points at, run
//! inside a single database transaction.  Undoes every transaction's side
//! effects, removes the block rows back to the fork parent, and rewinds the
//! cursor.

use diesel_async::AsyncPgConnection;
use lumen_chain::types::{BlockResp, TxResp};
use lumen_chain::ChainReader;
use lumen_db::repo::{
    accounts, attestations, auditors, blocks, contracts, cursor, transactions, validators,
};
use lumen_primitives::buf::Hash256;
use lumen_primitives::params::Params;
use lumen_primitives::tx::TxType;
use tracing::*;

use crate::error::IndexerError;
use crate::CursorPos;

/// Rolls back `block` (the one whose hash equals the cursor's current hash)
/// and returns the rewound cursor position.
pub async fn rollback_block<C: ChainReader + ?Sized>(
    conn: &mut AsyncPgConnection,
    node: &C,
    params: &Params,
    block: &BlockResp,
) -> Result<CursorPos, IndexerError> {
    rollback_transactions(conn, node, params, block).await?;

    // Attestations go before their block row; the store does not cascade.
    let block_id = blocks::id_by_hash(conn, &block.block_hash).await?;
    attestations::delete_by_block(conn, block_id).await?;

    // Walk the block rows back to the fork parent.  A zero parent hash means
    // the fork point is the pre-genesis state, which sits at slot 0.
    let (parent_slot, parent_hash) = if block.parent_hash.is_zero() {
        (0, Hash256::zero())
    } else {
        let parent = node.block_by_hash(&block.parent_hash).await?;
        (parent.slot, parent.block_hash)
    };

    // Every slot between the parent and the rolled-back block holds exactly
    // one row: the block itself plus any empty-slot placeholders.
    for slot in ((parent_slot + 1)..=block.slot).rev() {
        blocks::delete_at_slot(conn, slot).await?;
    }

    cursor::advance(conn, parent_slot + 1, &parent_hash).await?;

    info!(
        slot = block.slot,
        hash = %block.block_hash,
        rewound_to = parent_slot,
        "rolled back block"
    );

    Ok(CursorPos {
        next_slot: parent_slot + 1,
        current_hash: parent_hash,
    })
}

async fn rollback_transactions<C: ChainReader + ?Sized>(
    conn: &mut AsyncPgConnection,
    node: &C,
    params: &Params,
    block: &BlockResp,
) -> Result<(), IndexerError> {
    for tx in &block.txs {
        let tx_id = transactions::id_by_hash(conn, &tx.tx_hash).await?;

        match tx.tx_type {
            TxType::BalanceTransfer => rollback_balance_transfer(conn, tx).await?,
            TxType::ObjectCommit => rollback_object_commit(conn, node, tx, block, tx_id).await?,
            TxType::ValidatorDeposit => rollback_validator_deposit(conn, node, tx).await?,
            TxType::AuditorDeposit => rollback_auditor_deposit(conn, node, tx).await?,
            // OBJECT_AUDIT has no balance inverse; its join row goes away
            // with the tx below.  Exits and PoR left no side effects.
            TxType::ObjectAudit
            | TxType::ValidatorExit
            | TxType::AuditorExit
            | TxType::ObjectPor => {}
        }

        // Unconditional per-tx inverse of the sender accounting.
        let gas_usage = params.gas().for_tx(tx.tx_type);
        accounts::refund_gas(conn, &tx.from, tx.gas_price * gas_usage).await?;

        // Any join rows this tx still owns must not outlive it.
        contracts::unlink_all_for_tx(conn, tx_id).await?;
        transactions::delete_by_hash(conn, &tx.tx_hash).await?;
    }

    Ok(())
}

async fn rollback_balance_transfer(
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

    accounts::debit(conn, &transfer.to, transfer.amount).await?;
    accounts::credit(conn, &tx.from, transfer.amount).await?;
    Ok(())
}

/// Re-fetches the contract projection to recover the fee and pledge, then
/// refunds both parties and removes the contract with its join row.
async fn rollback_object_commit<C: ChainReader + ?Sized>(
    conn: &mut AsyncPgConnection,
    node: &C,
    tx: &TxResp,
    block: &BlockResp,
    tx_id: i64,
) -> Result<(), IndexerError> {
    let sc = node.storage_contract(&tx.tx_hash, &block.block_hash).await?;

    accounts::credit(conn, &sc.owner, sc.fee).await?;
    accounts::credit(conn, &sc.depot, sc.pledge).await?;

    let contract_id = contracts::id_by_commit_tx(conn, tx_id).await?;
    contracts::unlink_tx(conn, tx_id, contract_id).await?;
    contracts::delete(conn, contract_id).await?;
    Ok(())
}

/// The deposit increment cannot be reconstructed locally once follow-up
/// deposits may have landed, so the node's view overwrites the row.
async fn rollback_validator_deposit<C: ChainReader + ?Sized>(
    conn: &mut AsyncPgConnection,
    node: &C,
    tx: &TxResp,
) -> Result<(), IndexerError> {
    let validator = node.validator(&tx.from).await?;
    let account_id = accounts::id_by_public_key(conn, &tx.from).await?;

    validators::overwrite_from_node(
        conn,
        account_id,
        validator.balance,
        validator.status.code(),
        validator.activation_epoch,
        validator.exit_epoch,
    )
    .await?;
    Ok(())
}

async fn rollback_auditor_deposit<C: ChainReader + ?Sized>(
    conn: &mut AsyncPgConnection,
    node: &C,
    tx: &TxResp,
) -> Result<(), IndexerError> {
    let auditor = node.auditor(&tx.from).await?;
    let account_id = accounts::id_by_public_key(conn, &tx.from).await?;

    auditors::overwrite_from_node(
        conn,
        account_id,
        auditor.balance,
        auditor.status.code(),
        auditor.activation_epoch,
        auditor.exit_epoch,
    )
    .await?;
    Ok(())
}
