//! Row models.  Integer columns are signed bigints in Postgres; domain code
//! deals in `u64` and converts at the repository boundary.

use diesel::prelude::*;

use crate::schema::{
    accounts, attestations, auditors, blocks, chain_status, storage_contracts,
    transaction_contracts, transactions, validators,
};

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = accounts)]
pub struct NewAccount {
    pub public_key: String,
    pub nonce: i64,
    pub balance: i64,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = blocks)]
pub struct NewBlock {
    pub slot: i64,
    pub hash: String,
    pub parent_hash: String,
    pub state_hash: String,
    pub proposer_index: i64,
    pub proposer_signature: String,
    pub randao_reveal: String,
    pub graffiti: String,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = attestations)]
pub struct NewAttestation {
    pub block_id: i64,
    pub committee_index: i64,
    pub aggregation_bits: String,
    pub source_epoch: i64,
    pub source_hash: String,
    pub target_epoch: i64,
    pub target_hash: String,
    pub signature: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = transactions)]
pub struct NewTransaction {
    pub block_id: i64,
    pub hash: String,
    pub from_account_id: i64,
    pub position: i64,
    pub gas_price: i64,
    pub tx_type: i32,
    pub raw: Vec<u8>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = storage_contracts)]
pub struct NewStorageContract {
    pub commit_transaction_id: i64,
    pub owner_id: i64,
    pub depot_id: i64,
    pub auditor_id: Option<i64>,
    pub object_hash: String,
    pub status: i32,
    pub size: i64,
    pub fee: i64,
    pub pledge: i64,
    pub start_slot: i64,
    pub end_slot: i64,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = transaction_contracts)]
pub struct NewTransactionContract {
    pub transaction_id: i64,
    pub contract_id: i64,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = validators)]
pub struct NewValidator {
    pub account_id: i64,
    pub idx: i64,
    pub deposit: i64,
    pub status: i32,
    pub activation_epoch: i64,
    pub exit_epoch: i64,
    pub attest_block_id: Option<i64>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = auditors)]
pub struct NewAuditor {
    pub account_id: i64,
    pub deposit: i64,
    pub status: i32,
    pub activation_epoch: i64,
    pub exit_epoch: i64,
}

/// The singleton cursor row (`id` fixed to 1).
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = chain_status)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ChainCursor {
    pub id: i64,
    pub next_slot: i64,
    pub current_hash: String,
    pub finalized_slot: i64,
    pub finalized_hash: String,
}
