use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::error::{expect_one, DbError};
use crate::models::NewAuditor;
use crate::schema::auditors;

pub async fn insert(conn: &mut AsyncPgConnection, auditor: &NewAuditor) -> Result<i64, DbError> {
    Ok(diesel::insert_into(auditors::table)
        .values(auditor)
        .returning(auditors::id)
        .get_result(conn)
        .await?)
}

pub async fn find_by_account(
    conn: &mut AsyncPgConnection,
    account_id: i64,
) -> Result<Option<i64>, DbError> {
    Ok(auditors::table
        .filter(auditors::account_id.eq(account_id))
        .select(auditors::id)
        .first(conn)
        .await
        .optional()?)
}

pub async fn add_deposit(
    conn: &mut AsyncPgConnection,
    account_id: i64,
    amount: u64,
) -> Result<(), DbError> {
    let n = diesel::update(auditors::table.filter(auditors::account_id.eq(account_id)))
        .set(auditors::deposit.eq(auditors::deposit + amount as i64))
        .execute(conn)
        .await?;
    expect_one("auditors", n)
}

pub async fn overwrite_from_node(
    conn: &mut AsyncPgConnection,
    account_id: i64,
    deposit: u64,
    status: i32,
    activation_epoch: u64,
    exit_epoch: u64,
) -> Result<(), DbError> {
    let n = diesel::update(auditors::table.filter(auditors::account_id.eq(account_id)))
        .set((
            auditors::deposit.eq(deposit as i64),
            auditors::status.eq(status),
            auditors::activation_epoch.eq(activation_epoch as i64),
            auditors::exit_epoch.eq(exit_epoch as i64),
        ))
        .execute(conn)
        .await?;
    expect_one("auditors", n)
}

pub async fn update_status(
    conn: &mut AsyncPgConnection,
    account_id: i64,
    status: i32,
    activation_epoch: u64,
    exit_epoch: u64,
) -> Result<(), DbError> {
    let n = diesel::update(auditors::table.filter(auditors::account_id.eq(account_id)))
        .set((
            auditors::status.eq(status),
            auditors::activation_epoch.eq(activation_epoch as i64),
            auditors::exit_epoch.eq(exit_epoch as i64),
        ))
        .execute(conn)
        .await?;
    expect_one("auditors", n)
}
