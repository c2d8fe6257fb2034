use std::time::Duration;

use async_trait::async_trait;
use lumen_primitives::buf::{is_valid_pubkey_hex, Hash256};
use lumen_primitives::constants::BLS_PUBKEY_BYTES;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::*;

use crate::error::ClientError;
use crate::traits::ChainReader;
use crate::types::{
    AccountResp, AuditorResp, AuditorsResp, BlockResp, ChainStatusResp, CommitteeResp,
    StorageContractResp, ValidatorResp, ValidatorsResp,
};

const CHAIN_STATUS_PATH: &str = "chain-status";
const BLOCK_PATH: &str = "block";
const ACCOUNT_PATH: &str = "account";
const VALIDATOR_PATH: &str = "validator";
const VALIDATORS_PATH: &str = "validators";
const AUDITOR_PATH: &str = "auditor";
const AUDITORS_PATH: &str = "auditors";
const STORAGE_CONTRACT_PATH: &str = "storage-contract";
const COMMITTEES_PATH: &str = "committees";

/// Per-request deadline.  The event processor relies on this to bound every
/// suspension point; there are no retries at this layer.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Wire envelope every endpoint responds with.  `code` is an HTTP-ish status
/// carried in-band; anything but 200 is an error regardless of the transport
/// status.
#[derive(Debug, Deserialize)]
struct Envelope {
    code: i64,
    #[serde(default)]
    msg: String,
    #[serde(default)]
    data: serde_json::Value,
}

/// HTTP client for the consensus node gateway.
#[derive(Debug, Clone)]
pub struct NodeClient {
    endpoint: String,
    http: reqwest::Client,
}

impl NodeClient {
    pub fn new(endpoint: &str) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_owned(),
            http,
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ClientError> {
        let url = format!("{}/{}", self.endpoint, path);
        let resp = self.http.get(&url).query(query).send().await?;

        let envelope: Envelope = resp.json().await?;
        if envelope.code != 200 {
            trace!(%url, code = envelope.code, msg = %envelope.msg, "node returned error envelope");
            return Err(ClientError::Node {
                code: envelope.code,
                msg: envelope.msg,
            });
        }

        Ok(serde_json::from_value(envelope.data)?)
    }

    fn check_pubkey(public_key: &str) -> Result<(), ClientError> {
        if !is_valid_pubkey_hex(public_key, BLS_PUBKEY_BYTES) {
            return Err(ClientError::InvalidPublicKey(public_key.to_owned()));
        }
        Ok(())
    }
}

#[async_trait]
impl ChainReader for NodeClient {
    async fn chain_status(&self) -> Result<ChainStatusResp, ClientError> {
        self.get(CHAIN_STATUS_PATH, &[]).await
    }

    async fn block_by_slot(&self, slot: u64) -> Result<BlockResp, ClientError> {
        self.get(BLOCK_PATH, &[("slot", slot.to_string())]).await
    }

    async fn block_by_hash(&self, hash: &Hash256) -> Result<BlockResp, ClientError> {
        self.get(BLOCK_PATH, &[("hash", hash.to_hex())]).await
    }

    async fn account(&self, public_key: &str) -> Result<AccountResp, ClientError> {
        Self::check_pubkey(public_key)?;
        self.get(ACCOUNT_PATH, &[("public_key", public_key.to_owned())])
            .await
    }

    async fn validator(&self, public_key: &str) -> Result<ValidatorResp, ClientError> {
        Self::check_pubkey(public_key)?;
        self.get(VALIDATOR_PATH, &[("public_key", public_key.to_owned())])
            .await
    }

    async fn validators(
        &self,
        page_token: &str,
        page_size: u64,
    ) -> Result<ValidatorsResp, ClientError> {
        self.get(
            VALIDATORS_PATH,
            &[
                ("page_token", page_token.to_owned()),
                ("page_size", page_size.to_string()),
            ],
        )
        .await
    }

    async fn auditor(&self, public_key: &str) -> Result<AuditorResp, ClientError> {
        Self::check_pubkey(public_key)?;
        self.get(AUDITOR_PATH, &[("public_key", public_key.to_owned())])
            .await
    }

    async fn auditors(
        &self,
        page_token: &str,
        page_size: u64,
    ) -> Result<AuditorsResp, ClientError> {
        self.get(
            AUDITORS_PATH,
            &[
                ("page_token", page_token.to_owned()),
                ("page_size", page_size.to_string()),
            ],
        )
        .await
    }

    async fn storage_contract(
        &self,
        tx_hash: &Hash256,
        block_hash: &Hash256,
    ) -> Result<StorageContractResp, ClientError> {
        self.get(
            STORAGE_CONTRACT_PATH,
            &[
                ("storage_hash", tx_hash.to_hex()),
                ("block_hash", block_hash.to_hex()),
            ],
        )
        .await
    }

    async fn committees(&self, slot: u64) -> Result<Vec<CommitteeResp>, ClientError> {
        self.get(COMMITTEES_PATH, &[("slot", slot.to_string())])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_decode() {
        let raw = r#"{"code": 200, "msg": "ok", "data": {"nonce": 3, "balance": 99}}"#;
        let envelope: Envelope = serde_json::from_str(raw).unwrap();
        assert_eq!(envelope.code, 200);
        let account: AccountResp = serde_json::from_value(envelope.data).unwrap();
        assert_eq!(account.nonce, 3);
        assert_eq!(account.balance, 99);
    }

    #[test]
    fn test_envelope_error_without_data() {
        let raw = r#"{"code": 500, "msg": "internal"}"#;
        let envelope: Envelope = serde_json::from_str(raw).unwrap();
        assert_eq!(envelope.code, 500);
        assert_eq!(envelope.msg, "internal");
        assert!(envelope.data.is_null());
    }

    #[tokio::test]
    async fn test_account_rejects_bad_pubkey() {
        let client = NodeClient::new("http://localhost:1").unwrap();
        let err = client.account("not-a-key").await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidPublicKey(_)));
    }

    #[test]
    fn test_endpoint_trailing_slash_trimmed() {
        let client = NodeClient::new("http://localhost:8545/").unwrap();
        assert_eq!(client.endpoint, "http://localhost:8545");
    }
}
