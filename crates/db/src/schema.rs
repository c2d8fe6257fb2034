//! Diesel table definitions for the explorer schema.  Kept in sync with the
//! embedded migrations by hand.

diesel::table! {
    accounts (id) {
        id -> Int8,
        public_key -> Text,
        nonce -> Int8,
        balance -> Int8,
    }
}

diesel::table! {
    blocks (id) {
        id -> Int8,
        slot -> Int8,
        hash -> Text,
        parent_hash -> Text,
        state_hash -> Text,
        proposer_index -> Int8,
        proposer_signature -> Text,
        randao_reveal -> Text,
        graffiti -> Text,
        timestamp -> Int8,
    }
}

diesel::table! {
    attestations (id) {
        id -> Int8,
        block_id -> Int8,
        committee_index -> Int8,
        aggregation_bits -> Text,
        source_epoch -> Int8,
        source_hash -> Text,
        target_epoch -> Int8,
        target_hash -> Text,
        signature -> Text,
    }
}

diesel::table! {
    transactions (id) {
        id -> Int8,
        block_id -> Int8,
        hash -> Text,
        from_account_id -> Int8,
        position -> Int8,
        gas_price -> Int8,
        tx_type -> Int4,
        raw -> Bytea,
    }
}

diesel::table! {
    storage_contracts (id) {
        id -> Int8,
        commit_transaction_id -> Int8,
        owner_id -> Int8,
        depot_id -> Int8,
        auditor_id -> Nullable<Int8>,
        object_hash -> Text,
        status -> Int4,
        size -> Int8,
        fee -> Int8,
        pledge -> Int8,
        start_slot -> Int8,
        end_slot -> Int8,
    }
}

diesel::table! {
    transaction_contracts (id) {
        id -> Int8,
        transaction_id -> Int8,
        contract_id -> Int8,
    }
}

diesel::table! {
    validators (id) {
        id -> Int8,
        account_id -> Int8,
        idx -> Int8,
        deposit -> Int8,
        status -> Int4,
        activation_epoch -> Int8,
        exit_epoch -> Int8,
        attest_block_id -> Nullable<Int8>,
    }
}

diesel::table! {
    auditors (id) {
        id -> Int8,
        account_id -> Int8,
        deposit -> Int8,
        status -> Int4,
        activation_epoch -> Int8,
        exit_epoch -> Int8,
    }
}

diesel::table! {
    chain_status (id) {
        id -> Int8,
        next_slot -> Int8,
        current_hash -> Text,
        finalized_slot -> Int8,
        finalized_hash -> Text,
    }
}

diesel::joinable!(attestations -> blocks (block_id));
diesel::joinable!(transactions -> blocks (block_id));
diesel::joinable!(transactions -> accounts (from_account_id));
diesel::joinable!(transaction_contracts -> transactions (transaction_id));
diesel::joinable!(transaction_contracts -> storage_contracts (contract_id));
diesel::joinable!(validators -> accounts (account_id));
diesel::joinable!(auditors -> accounts (account_id));

diesel::allow_tables_to_appear_in_same_query!(
    accounts,
    blocks,
    attestations,
    transactions,
    storage_contracts,
    transaction_contracts,
    validators,
    auditors,
    chain_status,
);
