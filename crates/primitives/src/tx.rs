//! Transaction and participant enums as they appear on the wire and in the
//! database.  Wire form is the SCREAMING_SNAKE_CASE name; database form is
//! the stable numeric code, which must never be reordered.

use serde::{Deserialize, Serialize};

/// The kind of a chain transaction.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TxType {
    BalanceTransfer,
    ValidatorDeposit,
    ValidatorExit,
    AuditorDeposit,
    AuditorExit,
    ObjectCommit,
    ObjectAudit,
    ObjectPor,
}

impl TxType {
    /// Stable storage code for the `transactions.tx_type` column.
    pub fn code(&self) -> i32 {
        match self {
            TxType::BalanceTransfer => 0,
            TxType::ValidatorDeposit => 1,
            TxType::ValidatorExit => 2,
            TxType::AuditorDeposit => 3,
            TxType::AuditorExit => 4,
            TxType::ObjectCommit => 5,
            TxType::ObjectAudit => 6,
            TxType::ObjectPor => 7,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        Some(match code {
            0 => TxType::BalanceTransfer,
            1 => TxType::ValidatorDeposit,
            2 => TxType::ValidatorExit,
            3 => TxType::AuditorDeposit,
            4 => TxType::AuditorExit,
            5 => TxType::ObjectCommit,
            6 => TxType::ObjectAudit,
            7 => TxType::ObjectPor,
            _ => return None,
        })
    }
}

/// Lifecycle status of a validator or auditor.  Both participant kinds share
/// the same state set on this chain.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParticipantStatus {
    Pending,
    Active,
    Exiting,
    Exited,
}

impl ParticipantStatus {
    pub fn code(&self) -> i32 {
        match self {
            ParticipantStatus::Pending => 0,
            ParticipantStatus::Active => 1,
            ParticipantStatus::Exiting => 2,
            ParticipantStatus::Exited => 3,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        Some(match code {
            0 => ParticipantStatus::Pending,
            1 => ParticipantStatus::Active,
            2 => ParticipantStatus::Exiting,
            3 => ParticipantStatus::Exited,
            _ => return None,
        })
    }
}

/// Lifecycle status of a storage contract.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContractStatus {
    Pending,
    Active,
    Completed,
    Aborted,
}

impl ContractStatus {
    pub fn code(&self) -> i32 {
        match self {
            ContractStatus::Pending => 0,
            ContractStatus::Active => 1,
            ContractStatus::Completed => 2,
            ContractStatus::Aborted => 3,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        Some(match code {
            0 => ContractStatus::Pending,
            1 => ContractStatus::Active,
            2 => ContractStatus::Completed,
            3 => ContractStatus::Aborted,
            _ => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tx_type_wire_names() {
        let ty: TxType = serde_json::from_str("\"BALANCE_TRANSFER\"").unwrap();
        assert_eq!(ty, TxType::BalanceTransfer);
        let ty: TxType = serde_json::from_str("\"OBJECT_POR\"").unwrap();
        assert_eq!(ty, TxType::ObjectPor);
        assert_eq!(
            serde_json::to_string(&TxType::ValidatorDeposit).unwrap(),
            "\"VALIDATOR_DEPOSIT\""
        );
    }

    #[test]
    fn test_codes_roundtrip() {
        for code in 0..8 {
            let ty = TxType::from_code(code).unwrap();
            assert_eq!(ty.code(), code);
        }
        assert!(TxType::from_code(8).is_none());

        for code in 0..4 {
            assert_eq!(ParticipantStatus::from_code(code).unwrap().code(), code);
            assert_eq!(ContractStatus::from_code(code).unwrap().code(), code);
        }
    }
}
