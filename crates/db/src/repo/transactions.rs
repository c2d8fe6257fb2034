use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use lumen_primitives::buf::Hash256;

use crate::error::{expect_one, DbError};
use crate::models::NewTransaction;
use crate::schema::transactions;

pub async fn insert(conn: &mut AsyncPgConnection, tx: &NewTransaction) -> Result<i64, DbError> {
    Ok(diesel::insert_into(transactions::table)
        .values(tx)
        .returning(transactions::id)
        .get_result(conn)
        .await?)
}

pub async fn id_by_hash(conn: &mut AsyncPgConnection, hash: &Hash256) -> Result<i64, DbError> {
    transactions::table
        .filter(transactions::hash.eq(hash.to_hex()))
        .select(transactions::id)
        .first(conn)
        .await
        .optional()?
        .ok_or_else(|| DbError::NotFound {
            table: "transactions",
            key: hash.to_hex(),
        })
}

pub async fn delete_by_hash(conn: &mut AsyncPgConnection, hash: &Hash256) -> Result<(), DbError> {
    let n = diesel::delete(transactions::table.filter(transactions::hash.eq(hash.to_hex())))
        .execute(conn)
        .await?;
    expect_one("transactions", n)
}
