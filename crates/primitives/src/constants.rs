//! Network-independent protocol constants.

/// Byte length of a BLS public key in its decoded form.
pub const BLS_PUBKEY_BYTES: usize = 48;

/// Sentinel epoch meaning "not scheduled".  Kept within `i64` range so it
/// survives a round trip through a signed bigint column.
pub const FAR_FUTURE_EPOCH: u64 = i64::MAX as u64;

/// Gas consumed by a balance transfer.
pub const BALANCE_TRANSFER_GAS: u64 = 1_000;

/// Gas consumed by an object commit.
pub const OBJECT_COMMIT_GAS: u64 = 10_000;

/// Gas consumed by an object audit.
pub const OBJECT_AUDIT_GAS: u64 = 5_000;

/// Gas consumed by a validator deposit.
pub const VALIDATOR_DEPOSIT_GAS: u64 = 2_000;

/// Gas consumed by an auditor deposit.
pub const AUDITOR_DEPOSIT_GAS: u64 = 2_000;

/// Page size used when walking the node's validator/auditor listings.
pub const PARTICIPANT_PAGE_SIZE: u64 = 100;
