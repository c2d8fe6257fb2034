//! Epoch-boundary refresh of participant state.  The node's listings are
//! authoritative: balances, statuses and epochs are overwritten wholesale,
//! reconciling any drift the incremental bookkeeping accumulated.

use diesel_async::{AsyncConnection, AsyncPgConnection};
use lumen_chain::types::{AuditorEntryResp, ValidatorEntryResp};
use lumen_chain::ChainReader;
use lumen_db::repo::{accounts, auditors, validators};
use lumen_primitives::constants::PARTICIPANT_PAGE_SIZE;
use scoped_futures::ScopedFutureExt;
use tracing::*;

use crate::error::IndexerError;

/// Refreshes every validator and then every auditor.  Each participant is
/// updated in its own short transaction; the listing itself is never held
/// open across pages.
pub async fn refresh_epoch<C: ChainReader + ?Sized>(
    conn: &mut AsyncPgConnection,
    node: &C,
) -> Result<(), IndexerError> {
    let validator_entries = collect_validators(node).await?;
    for entry in &validator_entries {
        refresh_validator(conn, node, entry).await?;
    }
    debug!(count = validator_entries.len(), "refreshed validators at epoch boundary");

    let auditor_entries = collect_auditors(node).await?;
    for entry in &auditor_entries {
        refresh_auditor(conn, node, entry).await?;
    }
    debug!(count = auditor_entries.len(), "refreshed auditors at epoch boundary");

    Ok(())
}

/// Pages through the validator listing until the node hands back an empty
/// page token.
async fn collect_validators<C: ChainReader + ?Sized>(
    node: &C,
) -> Result<Vec<ValidatorEntryResp>, IndexerError> {
    let mut entries = Vec::new();
    let mut page_token = String::new();

    loop {
        let page = node.validators(&page_token, PARTICIPANT_PAGE_SIZE).await?;
        entries.extend(page.validators);

        if page.next_page_token.is_empty() {
            break;
        }
        page_token = page.next_page_token;
    }

    Ok(entries)
}

/// Same as [`collect_validators`], except "no auditors exist" is a
/// well-known terminal condition, not a failure.
async fn collect_auditors<C: ChainReader + ?Sized>(
    node: &C,
) -> Result<Vec<AuditorEntryResp>, IndexerError> {
    let mut entries = Vec::new();
    let mut page_token = String::new();

    loop {
        let page = match node.auditors(&page_token, PARTICIPANT_PAGE_SIZE).await {
            Ok(page) => page,
            Err(e) if e.is_null_auditors() => break,
            Err(e) => return Err(e.into()),
        };
        entries.extend(page.auditors);

        if page.next_page_token.is_empty() {
            break;
        }
        page_token = page.next_page_token;
    }

    Ok(entries)
}

async fn refresh_validator<C: ChainReader + ?Sized>(
    conn: &mut AsyncPgConnection,
    node: &C,
    entry: &ValidatorEntryResp,
) -> Result<(), IndexerError> {
    conn.transaction::<(), IndexerError, _>(|conn| {
        async move {
            refresh_account_balance(conn, node, &entry.public_key).await?;
            let account_id = accounts::id_by_public_key(conn, &entry.public_key).await?;
            validators::update_status(
                conn,
                account_id,
                entry.status.code(),
                entry.activation_epoch,
                entry.exit_epoch,
            )
            .await?;
            Ok(())
        }
        .scope_boxed()
    })
    .await
}

async fn refresh_auditor<C: ChainReader + ?Sized>(
    conn: &mut AsyncPgConnection,
    node: &C,
    entry: &AuditorEntryResp,
) -> Result<(), IndexerError> {
    conn.transaction::<(), IndexerError, _>(|conn| {
        async move {
            refresh_account_balance(conn, node, &entry.public_key).await?;
            let account_id = accounts::id_by_public_key(conn, &entry.public_key).await?;
            auditors::update_status(
                conn,
                account_id,
                entry.status.code(),
                entry.activation_epoch,
                entry.exit_epoch,
            )
            .await?;
            Ok(())
        }
        .scope_boxed()
    })
    .await
}

/// Overwrites the stored balance with the node-reported value for one key.
async fn refresh_account_balance<C: ChainReader + ?Sized>(
    conn: &mut AsyncPgConnection,
    node: &C,
    public_key: &str,
) -> Result<(), IndexerError> {
    let account = node.account(public_key).await?;
    accounts::set_balance(conn, public_key, account.balance).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_chain::error::{ClientError, NULL_AUDITORS_MSG};
    use lumen_chain::types::{AuditorsResp, ValidatorsResp};
    use lumen_chain::MockChainReader;
    use lumen_primitives::tx::ParticipantStatus;

    fn validator_entry(pk: &str, index: u64) -> ValidatorEntryResp {
        ValidatorEntryResp {
            public_key: pk.to_owned(),
            index,
            balance: 100,
            status: ParticipantStatus::Active,
            activation_epoch: 0,
            exit_epoch: 0,
        }
    }

    #[tokio::test]
    async fn test_validator_paging_follows_tokens() {
        let mut node = MockChainReader::new();

        node.expect_validators()
            .withf(|token, size| token.is_empty() && *size == PARTICIPANT_PAGE_SIZE)
            .times(1)
            .returning(|_, _| {
                Ok(ValidatorsResp {
                    validators: vec![validator_entry("aa", 0), validator_entry("bb", 1)],
                    next_page_token: "p2".to_owned(),
                })
            });
        node.expect_validators()
            .withf(|token, size| token == "p2" && *size == PARTICIPANT_PAGE_SIZE)
            .times(1)
            .returning(|_, _| {
                Ok(ValidatorsResp {
                    validators: vec![validator_entry("cc", 2)],
                    next_page_token: String::new(),
                })
            });

        let entries = collect_validators(&node).await.unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[2].public_key, "cc");
    }

    #[tokio::test]
    async fn test_auditor_paging_tolerates_null_auditors() {
        let mut node = MockChainReader::new();

        node.expect_auditors().times(1).returning(|_, _| {
            Err(ClientError::Node {
                code: 404,
                msg: NULL_AUDITORS_MSG.to_owned(),
            })
        });

        let entries = collect_auditors(&node).await.unwrap();
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn test_auditor_paging_stops_on_empty_token() {
        let mut node = MockChainReader::new();

        node.expect_auditors().times(1).returning(|_, _| {
            Ok(AuditorsResp {
                auditors: Vec::new(),
                next_page_token: String::new(),
            })
        });

        let entries = collect_auditors(&node).await.unwrap();
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn test_auditor_paging_propagates_real_errors() {
        let mut node = MockChainReader::new();

        node.expect_auditors().times(1).returning(|_, _| {
            Err(ClientError::Node {
                code: 500,
                msg: "internal".to_owned(),
            })
        });

        assert!(collect_auditors(&node).await.is_err());
    }
}
