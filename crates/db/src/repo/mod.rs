//! Per-table repositories.  Every function takes `&mut AsyncPgConnection`
//! so callers decide the transaction boundary; the indexer wraps one slot
//! advance per transaction.

pub mod accounts;
pub mod attestations;
pub mod auditors;
pub mod blocks;
pub mod contracts;
pub mod cursor;
pub mod transactions;
pub mod validators;
