use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::error::{expect_one, DbError};
use crate::models::NewValidator;
use crate::schema::validators;

pub async fn insert(conn: &mut AsyncPgConnection, validator: &NewValidator) -> Result<i64, DbError> {
    Ok(diesel::insert_into(validators::table)
        .values(validator)
        .returning(validators::id)
        .get_result(conn)
        .await?)
}

/// Id of the validator row owned by `account_id`, if any.
pub async fn find_by_account(
    conn: &mut AsyncPgConnection,
    account_id: i64,
) -> Result<Option<i64>, DbError> {
    Ok(validators::table
        .filter(validators::account_id.eq(account_id))
        .select(validators::id)
        .first(conn)
        .await
        .optional()?)
}

pub async fn add_deposit(
    conn: &mut AsyncPgConnection,
    account_id: i64,
    amount: u64,
) -> Result<(), DbError> {
    let n = diesel::update(validators::table.filter(validators::account_id.eq(account_id)))
        .set(validators::deposit.eq(validators::deposit + amount as i64))
        .execute(conn)
        .await?;
    expect_one("validators", n)
}

/// Overwrites the node-owned fields wholesale; the rollback path uses this
/// to restore a deposit it cannot reconstruct locally.
pub async fn overwrite_from_node(
    conn: &mut AsyncPgConnection,
    account_id: i64,
    deposit: u64,
    status: i32,
    activation_epoch: u64,
    exit_epoch: u64,
) -> Result<(), DbError> {
    let n = diesel::update(validators::table.filter(validators::account_id.eq(account_id)))
        .set((
            validators::deposit.eq(deposit as i64),
            validators::status.eq(status),
            validators::activation_epoch.eq(activation_epoch as i64),
            validators::exit_epoch.eq(exit_epoch as i64),
        ))
        .execute(conn)
        .await?;
    expect_one("validators", n)
}

/// Epoch-refresh variant: status and epochs only, deposit untouched.
pub async fn update_status(
    conn: &mut AsyncPgConnection,
    account_id: i64,
    status: i32,
    activation_epoch: u64,
    exit_epoch: u64,
) -> Result<(), DbError> {
    let n = diesel::update(validators::table.filter(validators::account_id.eq(account_id)))
        .set((
            validators::status.eq(status),
            validators::activation_epoch.eq(activation_epoch as i64),
            validators::exit_epoch.eq(exit_epoch as i64),
        ))
        .execute(conn)
        .await?;
    expect_one("validators", n)
}

/// Records the last block a validator's committee index attested in.  A
/// stale index hits zero rows, which is fine; the reference is a weak one.
pub async fn set_attest_block(
    conn: &mut AsyncPgConnection,
    validator_index: u64,
    block_id: i64,
) -> Result<(), DbError> {
    diesel::update(validators::table.filter(validators::idx.eq(validator_index as i64)))
        .set(validators::attest_block_id.eq(Some(block_id)))
        .execute(conn)
        .await?;
    Ok(())
}
