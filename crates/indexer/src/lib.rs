//! The indexer core: the slot-advance state machine that keeps the explorer
//! schema consistent with the canonical chain.
//!
//! One [`worker::EventProcessor`] owns the persisted chain cursor and ticks
//! on an interval.  Each tick catches the store up to the node's best slot,
//! one database transaction per slot: a block whose parent matches the
//! cursor is applied ([`apply`]), a mismatch walks the chain back
//! ([`rollback`]), epoch boundaries refresh participant state ([`epoch`]),
//! and an absent cursor row seeds genesis exactly once ([`genesis`]).

pub mod apply;
pub mod epoch;
pub mod error;
pub mod genesis;
pub mod rollback;
pub mod worker;

pub use error::IndexerError;
pub use worker::EventProcessor;

use lumen_primitives::buf::Hash256;

/// In-memory mirror of the persisted cursor.  Only ever assigned from
/// values committed in the same database transaction, so it cannot diverge
/// from the row.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct CursorPos {
    /// Slot the processor will fetch next.
    pub next_slot: u64,
    /// Hash of the newest applied block, or the zero-hash right after
    /// genesis.
    pub current_hash: Hash256,
}
