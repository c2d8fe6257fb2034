//! One-shot genesis seeding.  Runs iff the chain cursor row is absent, in a
//! single transaction owned by the event processor, so a failed bootstrap
//! leaves nothing behind and the next tick retries cleanly.

use diesel_async::AsyncPgConnection;
use lumen_db::models::NewValidator;
use lumen_db::repo::{accounts, cursor, validators};
use lumen_primitives::constants::FAR_FUTURE_EPOCH;
use lumen_primitives::params::Params;
use lumen_primitives::tx::ParticipantStatus;
use tracing::*;

use crate::error::IndexerError;

/// Seeds the cursor, the genesis accounts and the genesis validator set.
/// Accounts and validators are inserted in lexicographic key order, which
/// pins validator indices; the genesis config's BTreeMaps iterate that way
/// by construction.
pub async fn bootstrap(conn: &mut AsyncPgConnection, params: &Params) -> Result<(), IndexerError> {
    cursor::init(conn).await?;

    let genesis = params.genesis();

    for (public_key, balance) in &genesis.balances {
        accounts::insert(conn, public_key, 0, *balance).await?;
    }

    for (index, (public_key, deposit)) in genesis.validators.iter().enumerate() {
        let account_id = accounts::id_by_public_key(conn, public_key).await?;
        validators::insert(
            conn,
            &NewValidator {
                account_id,
                idx: index as i64,
                deposit: *deposit as i64,
                status: ParticipantStatus::Active.code(),
                activation_epoch: 0,
                exit_epoch: FAR_FUTURE_EPOCH as i64,
                attest_block_id: None,
            },
        )
        .await?;
    }

    info!(
        accounts = genesis.balances.len(),
        validators = genesis.validators.len(),
        "seeded genesis state"
    );

    Ok(())
}
