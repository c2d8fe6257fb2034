use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::error::{expect_one, DbError};
use crate::models::NewAccount;
use crate::schema::accounts;

pub async fn id_by_public_key(
    conn: &mut AsyncPgConnection,
    public_key: &str,
) -> Result<i64, DbError> {
    accounts::table
        .filter(accounts::public_key.eq(public_key))
        .select(accounts::id)
        .first(conn)
        .await
        .optional()?
        .ok_or_else(|| DbError::NotFound {
            table: "accounts",
            key: public_key.to_owned(),
        })
}

pub async fn try_id_by_public_key(
    conn: &mut AsyncPgConnection,
    public_key: &str,
) -> Result<Option<i64>, DbError> {
    Ok(accounts::table
        .filter(accounts::public_key.eq(public_key))
        .select(accounts::id)
        .first(conn)
        .await
        .optional()?)
}

/// Inserts an account with explicit starting state, returning its id.
pub async fn insert(
    conn: &mut AsyncPgConnection,
    public_key: &str,
    nonce: u64,
    balance: u64,
) -> Result<i64, DbError> {
    let row = NewAccount {
        public_key: public_key.to_owned(),
        nonce: nonce as i64,
        balance: balance as i64,
    };

    Ok(diesel::insert_into(accounts::table)
        .values(&row)
        .returning(accounts::id)
        .get_result(conn)
        .await?)
}

/// Returns the id for `public_key`, creating a zeroed row on first
/// reference.  Single-writer discipline makes the lookup-then-insert safe.
pub async fn find_or_create(
    conn: &mut AsyncPgConnection,
    public_key: &str,
) -> Result<i64, DbError> {
    if let Some(id) = try_id_by_public_key(conn, public_key).await? {
        return Ok(id);
    }
    insert(conn, public_key, 0, 0).await
}

pub async fn credit(
    conn: &mut AsyncPgConnection,
    public_key: &str,
    amount: u64,
) -> Result<(), DbError> {
    let n = diesel::update(accounts::table.filter(accounts::public_key.eq(public_key)))
        .set(accounts::balance.eq(accounts::balance + amount as i64))
        .execute(conn)
        .await?;
    expect_one("accounts", n)
}

pub async fn debit(
    conn: &mut AsyncPgConnection,
    public_key: &str,
    amount: u64,
) -> Result<(), DbError> {
    let n = diesel::update(accounts::table.filter(accounts::public_key.eq(public_key)))
        .set(accounts::balance.eq(accounts::balance - amount as i64))
        .execute(conn)
        .await?;
    expect_one("accounts", n)
}

pub async fn credit_by_id(
    conn: &mut AsyncPgConnection,
    account_id: i64,
    amount: u64,
) -> Result<(), DbError> {
    let n = diesel::update(accounts::table.find(account_id))
        .set(accounts::balance.eq(accounts::balance + amount as i64))
        .execute(conn)
        .await?;
    expect_one("accounts", n)
}

/// Uniform per-tx sender accounting: bump the nonce and charge gas.
pub async fn apply_gas(
    conn: &mut AsyncPgConnection,
    account_id: i64,
    fee: u64,
) -> Result<(), DbError> {
    let n = diesel::update(accounts::table.find(account_id))
        .set((
            accounts::nonce.eq(accounts::nonce + 1),
            accounts::balance.eq(accounts::balance - fee as i64),
        ))
        .execute(conn)
        .await?;
    expect_one("accounts", n)
}

/// Inverse of [`apply_gas`], keyed by public key as the rollback path sees
/// the sender.
pub async fn refund_gas(
    conn: &mut AsyncPgConnection,
    public_key: &str,
    fee: u64,
) -> Result<(), DbError> {
    let n = diesel::update(accounts::table.filter(accounts::public_key.eq(public_key)))
        .set((
            accounts::nonce.eq(accounts::nonce - 1),
            accounts::balance.eq(accounts::balance + fee as i64),
        ))
        .execute(conn)
        .await?;
    expect_one("accounts", n)
}

/// Overwrites the balance with the node-reported authoritative value.
pub async fn set_balance(
    conn: &mut AsyncPgConnection,
    public_key: &str,
    balance: u64,
) -> Result<(), DbError> {
    let n = diesel::update(accounts::table.filter(accounts::public_key.eq(public_key)))
        .set(accounts::balance.eq(balance as i64))
        .execute(conn)
        .await?;
    expect_one("accounts", n)
}
