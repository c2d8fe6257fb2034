//! The chain cursor singleton.  One row, `id = 1`, written in the same
//! transaction as the block data it describes.

use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use lumen_primitives::buf::Hash256;

use crate::error::{expect_one, DbError};
use crate::models::ChainCursor;
use crate::schema::chain_status;

pub const CURSOR_ID: i64 = 1;

pub async fn get(conn: &mut AsyncPgConnection) -> Result<Option<ChainCursor>, DbError> {
    Ok(chain_status::table
        .find(CURSOR_ID)
        .select(ChainCursor::as_select())
        .first(conn)
        .await
        .optional()?)
}

/// Seeds the cursor at genesis: next slot 0, zero current hash, nothing
/// finalized.  Fails if the row already exists.
pub async fn init(conn: &mut AsyncPgConnection) -> Result<(), DbError> {
    let zero = Hash256::zero().to_hex();
    diesel::insert_into(chain_status::table)
        .values((
            chain_status::id.eq(CURSOR_ID),
            chain_status::next_slot.eq(0),
            chain_status::current_hash.eq(&zero),
            chain_status::finalized_slot.eq(0),
            chain_status::finalized_hash.eq(&zero),
        ))
        .execute(conn)
        .await?;
    Ok(())
}

/// Moves the cursor, forward on apply or backward on rollback.
pub async fn advance(
    conn: &mut AsyncPgConnection,
    next_slot: u64,
    current_hash: &Hash256,
) -> Result<(), DbError> {
    let n = diesel::update(chain_status::table.find(CURSOR_ID))
        .set((
            chain_status::next_slot.eq(next_slot as i64),
            chain_status::current_hash.eq(current_hash.to_hex()),
        ))
        .execute(conn)
        .await?;
    expect_one("chain_status", n)
}

/// Empty-slot variant: the slot advances but the current hash stays on the
/// last real block.
pub async fn bump_slot(conn: &mut AsyncPgConnection, next_slot: u64) -> Result<(), DbError> {
    let n = diesel::update(chain_status::table.find(CURSOR_ID))
        .set(chain_status::next_slot.eq(next_slot as i64))
        .execute(conn)
        .await?;
    expect_one("chain_status", n)
}

pub async fn set_finalized(
    conn: &mut AsyncPgConnection,
    finalized_slot: u64,
    finalized_hash: &Hash256,
) -> Result<(), DbError> {
    let n = diesel::update(chain_status::table.find(CURSOR_ID))
        .set((
            chain_status::finalized_slot.eq(finalized_slot as i64),
            chain_status::finalized_hash.eq(finalized_hash.to_hex()),
        ))
        .execute(conn)
        .await?;
    expect_one("chain_status", n)
}
