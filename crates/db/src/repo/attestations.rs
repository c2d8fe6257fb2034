use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::error::DbError;
use crate::models::NewAttestation;
use crate::schema::attestations;

pub async fn insert(
    conn: &mut AsyncPgConnection,
    attestation: &NewAttestation,
) -> Result<i64, DbError> {
    Ok(diesel::insert_into(attestations::table)
        .values(attestation)
        .returning(attestations::id)
        .get_result(conn)
        .await?)
}

/// Removes all attestations owned by a block ahead of the block row itself;
/// the store does not cascade.
pub async fn delete_by_block(
    conn: &mut AsyncPgConnection,
    block_id: i64,
) -> Result<usize, DbError> {
    Ok(
        diesel::delete(attestations::table.filter(attestations::block_id.eq(block_id)))
            .execute(conn)
            .await?,
    )
}
