use thiserror::Error;

/// Envelope message the node uses when an auditor listing is requested but
/// no auditors exist yet.  Callers paging auditors treat this as a normal
/// end-of-listing, not a failure.
pub const NULL_AUDITORS_MSG: &str = "null auditors";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),

    #[error("decode: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("node responded {code}: {msg}")]
    Node { code: i64, msg: String },

    #[error("invalid public key {0:?}")]
    InvalidPublicKey(String),
}

impl ClientError {
    /// Whether this is the expected-terminal "no auditors exist" condition.
    pub fn is_null_auditors(&self) -> bool {
        matches!(self, ClientError::Node { msg, .. } if msg == NULL_AUDITORS_MSG)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_auditors_detection() {
        let err = ClientError::Node {
            code: 404,
            msg: NULL_AUDITORS_MSG.to_owned(),
        };
        assert!(err.is_null_auditors());

        let err = ClientError::Node {
            code: 500,
            msg: "boom".to_owned(),
        };
        assert!(!err.is_null_auditors());

        let err = ClientError::InvalidPublicKey("xx".to_owned());
        assert!(!err.is_null_auditors());
    }
}
