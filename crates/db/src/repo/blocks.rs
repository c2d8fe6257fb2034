use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use lumen_primitives::buf::Hash256;

use crate::error::{expect_one, DbError};
use crate::models::NewBlock;
use crate::schema::blocks;

pub async fn insert(conn: &mut AsyncPgConnection, block: &NewBlock) -> Result<i64, DbError> {
    Ok(diesel::insert_into(blocks::table)
        .values(block)
        .returning(blocks::id)
        .get_result(conn)
        .await?)
}

/// Inserts the placeholder row for a slot that produced no block.  Only the
/// slot carries information; hashes are the zero-hash and the header fields
/// are zeroed.
pub async fn insert_empty(conn: &mut AsyncPgConnection, slot: u64) -> Result<i64, DbError> {
    let zero = Hash256::zero().to_hex();
    let row = NewBlock {
        slot: slot as i64,
        hash: zero.clone(),
        parent_hash: zero.clone(),
        state_hash: zero,
        proposer_index: 0,
        proposer_signature: String::new(),
        randao_reveal: String::new(),
        graffiti: String::new(),
        timestamp: 0,
    };
    insert(conn, &row).await
}

pub async fn id_by_hash(conn: &mut AsyncPgConnection, hash: &Hash256) -> Result<i64, DbError> {
    blocks::table
        .filter(blocks::hash.eq(hash.to_hex()))
        .select(blocks::id)
        .first(conn)
        .await
        .optional()?
        .ok_or_else(|| DbError::NotFound {
            table: "blocks",
            key: hash.to_hex(),
        })
}

/// Deletes the block row at `slot`.  Exactly one row must go; anything else
/// means the walk-back is out of step with the stored chain.
pub async fn delete_at_slot(conn: &mut AsyncPgConnection, slot: u64) -> Result<(), DbError> {
    let n = diesel::delete(blocks::table.filter(blocks::slot.eq(slot as i64)))
        .execute(conn)
        .await?;
    expect_one("blocks", n)
}
