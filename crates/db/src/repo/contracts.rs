//! Storage contracts and their transaction join rows.

use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use lumen_primitives::buf::Hash256;

use crate::error::{expect_one, DbError};
use crate::models::{NewStorageContract, NewTransactionContract};
use crate::schema::{storage_contracts, transaction_contracts};

pub async fn insert(
    conn: &mut AsyncPgConnection,
    contract: &NewStorageContract,
) -> Result<i64, DbError> {
    Ok(diesel::insert_into(storage_contracts::table)
        .values(contract)
        .returning(storage_contracts::id)
        .get_result(conn)
        .await?)
}

pub async fn id_by_object_hash(
    conn: &mut AsyncPgConnection,
    object_hash: &Hash256,
) -> Result<i64, DbError> {
    storage_contracts::table
        .filter(storage_contracts::object_hash.eq(object_hash.to_hex()))
        .select(storage_contracts::id)
        .first(conn)
        .await
        .optional()?
        .ok_or_else(|| DbError::NotFound {
            table: "storage_contracts",
            key: object_hash.to_hex(),
        })
}

pub async fn id_by_commit_tx(
    conn: &mut AsyncPgConnection,
    transaction_id: i64,
) -> Result<i64, DbError> {
    storage_contracts::table
        .filter(storage_contracts::commit_transaction_id.eq(transaction_id))
        .select(storage_contracts::id)
        .first(conn)
        .await
        .optional()?
        .ok_or_else(|| DbError::NotFound {
            table: "storage_contracts",
            key: format!("commit_transaction_id={transaction_id}"),
        })
}

pub async fn delete(conn: &mut AsyncPgConnection, contract_id: i64) -> Result<(), DbError> {
    let n = diesel::delete(storage_contracts::table.find(contract_id))
        .execute(conn)
        .await?;
    expect_one("storage_contracts", n)
}

pub async fn link_tx(
    conn: &mut AsyncPgConnection,
    transaction_id: i64,
    contract_id: i64,
) -> Result<(), DbError> {
    let row = NewTransactionContract {
        transaction_id,
        contract_id,
    };
    diesel::insert_into(transaction_contracts::table)
        .values(&row)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn unlink_tx(
    conn: &mut AsyncPgConnection,
    transaction_id: i64,
    contract_id: i64,
) -> Result<(), DbError> {
    let n = diesel::delete(
        transaction_contracts::table
            .filter(transaction_contracts::transaction_id.eq(transaction_id))
            .filter(transaction_contracts::contract_id.eq(contract_id)),
    )
    .execute(conn)
    .await?;
    expect_one("transaction_contracts", n)
}

/// Removes whatever join rows a transaction still owns.  Used by the
/// rollback path right before the transaction row itself goes away, so that
/// audit joins disappear with their tx.
pub async fn unlink_all_for_tx(
    conn: &mut AsyncPgConnection,
    transaction_id: i64,
) -> Result<usize, DbError> {
    Ok(diesel::delete(
        transaction_contracts::table
            .filter(transaction_contracts::transaction_id.eq(transaction_id)),
    )
    .execute(conn)
    .await?)
}
