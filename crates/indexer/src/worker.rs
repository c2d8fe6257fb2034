//! The event processor: owns the chain cursor, ticks on an interval, and
//! drives apply / rollback / epoch-refresh / genesis.
//!
//! Failure policy is tick-level: any remote or database error aborts the
//! current tick (the per-slot transaction rolls back, so the persisted
//! cursor still matches the stored blocks) and the next tick retries from
//! the cursor.  There are no per-call retries.

use std::sync::Arc;
use std::time::Duration;

use diesel_async::pooled_connection::bb8::PooledConnection;
use diesel_async::{AsyncConnection, AsyncPgConnection};
use lumen_chain::types::{BlockResp, ChainStatusResp};
use lumen_chain::ChainReader;
use lumen_common::ShutdownGuard;
use lumen_db::repo::cursor;
use lumen_db::{DbError, DbPool};
use lumen_primitives::buf::Hash256;
use lumen_primitives::params::Params;
use scoped_futures::ScopedFutureExt;
use tokio::time::MissedTickBehavior;
use tracing::*;

use crate::error::IndexerError;
use crate::{apply, epoch, genesis, rollback, CursorPos};

/// What to do with the block fetched for the next slot.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum SlotAction {
    /// Parent matches (or the slot is empty): apply forward.
    Apply,
    /// Parent mismatch: undo the block the cursor points at.
    Rollback,
}

/// Decides between apply and rollback.  An empty slot is applied
/// unconditionally; a parent mismatch while the cursor still holds the
/// zero-hash has nothing to undo and is an error.
pub(crate) fn decide_slot(
    block: &BlockResp,
    current_hash: &Hash256,
) -> Result<SlotAction, IndexerError> {
    if block.block_hash.is_zero() || block.parent_hash == *current_hash {
        return Ok(SlotAction::Apply);
    }

    if current_hash.is_zero() {
        return Err(IndexerError::RollbackPastGenesis);
    }

    Ok(SlotAction::Rollback)
}

/// Whether moving the cursor from `prev_next_slot` to `new_next_slot`
/// crossed an epoch boundary, in either direction.
pub(crate) fn crossed_epoch_boundary(
    prev_next_slot: u64,
    new_next_slot: u64,
    slots_per_epoch: u64,
) -> bool {
    let (lo, hi) = if prev_next_slot <= new_next_slot {
        (prev_next_slot, new_next_slot)
    } else {
        (new_next_slot, prev_next_slot)
    };

    hi / slots_per_epoch > lo / slots_per_epoch
}

pub struct EventProcessor<C> {
    node: Arc<C>,
    pool: DbPool,
    params: Arc<Params>,
    refresh_interval: Duration,

    /// Mirror of the persisted cursor; `None` until bootstrap succeeds.
    cursor: Option<CursorPos>,
}

impl<C: ChainReader> EventProcessor<C> {
    pub fn new(
        node: Arc<C>,
        pool: DbPool,
        params: Arc<Params>,
        refresh_interval: Duration,
    ) -> Self {
        Self {
            node,
            pool,
            params,
            refresh_interval,
            cursor: None,
        }
    }

    /// Runs until shutdown is signalled.  Errors never escape a tick; they
    /// are logged and the tick is retried on the next interval.
    pub async fn run(mut self, shutdown: ShutdownGuard) {
        info!(interval = ?self.refresh_interval, "event processor starting");

        let mut ticker = tokio::time::interval(self.refresh_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut wait_guard = shutdown.clone();
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.tick(&shutdown).await {
                        error!(err = %e, "tick failed, retrying on next tick");
                    }
                }
                _ = wait_guard.wait_for_shutdown() => {
                    break;
                }
            }

            if shutdown.should_shutdown() {
                break;
            }
        }

        info!("event processor exiting");
    }

    async fn tick(&mut self, shutdown: &ShutdownGuard) -> Result<(), IndexerError> {
        if self.cursor.is_none() {
            // Bootstrap phase; steady state starts on the next tick.
            return self.bootstrap().await;
        }

        self.sync(shutdown).await
    }

    /// Loads the persisted cursor, seeding genesis first if it is absent.
    async fn bootstrap(&mut self) -> Result<(), IndexerError> {
        let mut conn = self.conn().await?;

        if let Some(row) = cursor::get(&mut conn).await? {
            let current_hash = row
                .current_hash
                .parse()
                .map_err(|_| IndexerError::CorruptCursor(row.current_hash.clone()))?;

            self.cursor = Some(CursorPos {
                next_slot: row.next_slot as u64,
                current_hash,
            });
            info!(next_slot = row.next_slot, "resuming from persisted cursor");
            return Ok(());
        }

        info!("chain cursor missing, seeding genesis");
        let params = self.params.clone();
        conn.transaction::<(), IndexerError, _>(move |conn| {
            async move { genesis::bootstrap(conn, &params).await }.scope_boxed()
        })
        .await?;

        self.cursor = Some(CursorPos {
            next_slot: 0,
            current_hash: Hash256::zero(),
        });
        Ok(())
    }

    /// Steady state: catch the store up to the node's best slot, one
    /// transaction per slot, checking for cancellation between slots.
    async fn sync(&mut self, shutdown: &ShutdownGuard) -> Result<(), IndexerError> {
        let status = self.node.chain_status().await?;
        let head_slot = status.best.slot;

        if let Some(pos) = self.cursor {
            if pos.next_slot > head_slot {
                trace!(next_slot = pos.next_slot, %head_slot, "local slot is best slot");
                return Ok(());
            }
        }

        while self.cursor.is_some_and(|pos| pos.next_slot <= head_slot) {
            if shutdown.should_shutdown() {
                debug!("shutdown requested during catch-up");
                break;
            }

            self.advance_one_slot(&status).await?;
        }

        Ok(())
    }

    /// One slot advance: fetch, decide, and run the apply or rollback inside
    /// a single database transaction, then handle epoch boundaries.
    async fn advance_one_slot(&mut self, status: &ChainStatusResp) -> Result<(), IndexerError> {
        let pos = self.cursor.expect("worker: cursor set in steady state");

        let block = self.node.block_by_slot(pos.next_slot).await?;
        let action = decide_slot(&block, &pos.current_hash)?;

        let mut conn = self.conn().await?;
        let node = self.node.clone();
        let params = self.params.clone();

        let new_pos = match action {
            SlotAction::Apply => {
                let node = node.clone();
                let params = params.clone();
                conn.transaction::<CursorPos, IndexerError, _>(move |conn| {
                    async move {
                        apply::apply_block(conn, node.as_ref(), &params, &block, &pos.current_hash)
                            .await
                    }
                    .scope_boxed()
                })
                .await?
            }
            SlotAction::Rollback => {
                warn!(
                    slot = block.slot,
                    remote_parent = %block.parent_hash,
                    local_hash = %pos.current_hash,
                    "parent hash mismatch, rolling back"
                );

                let undo = self.node.block_by_hash(&pos.current_hash).await?;
                let node = node.clone();
                let params = params.clone();
                conn.transaction::<CursorPos, IndexerError, _>(move |conn| {
                    async move { rollback::rollback_block(conn, node.as_ref(), &params, &undo).await }
                        .scope_boxed()
                })
                .await?
            }
        };

        // The in-memory mirror only moves once the transaction committed.
        self.cursor = Some(new_pos);

        if crossed_epoch_boundary(
            pos.next_slot,
            new_pos.next_slot,
            self.params.chain().slots_per_epoch(),
        ) {
            info!(next_slot = new_pos.next_slot, "epoch boundary, refreshing participants");
            epoch::refresh_epoch(&mut conn, node.as_ref()).await?;
            cursor::set_finalized(&mut conn, status.finalized.slot, &status.finalized.hash)
                .await?;
        }

        Ok(())
    }

    async fn conn(&self) -> Result<PooledConnection<'static, AsyncPgConnection>, IndexerError> {
        self.pool
            .get_owned()
            .await
            .map_err(|e| IndexerError::Db(DbError::Pool(e.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(slot: u64, hash: Hash256, parent: Hash256) -> BlockResp {
        BlockResp {
            slot,
            block_hash: hash,
            parent_hash: parent,
            state_hash: Hash256::zero(),
            proposer_index: 0,
            proposer_signature: String::new(),
            randao_reveal: String::new(),
            graffiti: String::new(),
            timestamp: 0,
            attestations: Vec::new(),
            txs: Vec::new(),
        }
    }

    fn hash(byte: u8) -> Hash256 {
        Hash256([byte; 32])
    }

    #[test]
    fn test_decide_empty_slot_applies() {
        let b = block(5, Hash256::zero(), Hash256::zero());
        let action = decide_slot(&b, &hash(0xaa)).unwrap();
        assert_eq!(action, SlotAction::Apply);
    }

    #[test]
    fn test_decide_matching_parent_applies() {
        let b = block(5, hash(0xbb), hash(0xaa));
        let action = decide_slot(&b, &hash(0xaa)).unwrap();
        assert_eq!(action, SlotAction::Apply);
    }

    #[test]
    fn test_decide_mismatch_rolls_back() {
        let b = block(5, hash(0xbb), hash(0xcc));
        let action = decide_slot(&b, &hash(0xaa)).unwrap();
        assert_eq!(action, SlotAction::Rollback);
    }

    #[test]
    fn test_decide_mismatch_at_genesis_errors() {
        let b = block(0, hash(0xbb), hash(0xcc));
        let err = decide_slot(&b, &Hash256::zero()).unwrap_err();
        assert!(matches!(err, IndexerError::RollbackPastGenesis));
    }

    #[test]
    fn test_genesis_parented_block_applies_on_fresh_cursor() {
        // Right after genesis the cursor holds the zero hash and the first
        // real block's parent is the zero hash too.
        let b = block(2, hash(0xbb), Hash256::zero());
        let action = decide_slot(&b, &Hash256::zero()).unwrap();
        assert_eq!(action, SlotAction::Apply);
    }

    #[test]
    fn test_epoch_boundary_after_last_slot_of_epoch() {
        // Applying slot 31 moves next_slot 31 -> 32.
        assert!(crossed_epoch_boundary(31, 32, 32));
        // Applying slot 32 (first of an epoch) does not trigger a refresh.
        assert!(!crossed_epoch_boundary(32, 33, 32));
        assert!(!crossed_epoch_boundary(5, 6, 32));
        // Applying slot 63 crosses into the third epoch.
        assert!(crossed_epoch_boundary(63, 64, 32));
    }

    #[test]
    fn test_epoch_boundary_crossed_by_rollback() {
        // Rewinding from next=33 to next=31 re-crosses the boundary at 32.
        assert!(crossed_epoch_boundary(33, 31, 32));
        // Rewinding within an epoch does not.
        assert!(!crossed_epoch_boundary(40, 36, 32));
        // Landing exactly on the boundary slot leaves epoch state as-is;
        // the refresh after re-applying slot 31 will reconcile.
        assert!(!crossed_epoch_boundary(35, 32, 32));
    }
}
