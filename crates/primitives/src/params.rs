//! Per-network chain parameters consumed by the indexer.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

use crate::constants;
use crate::tx::TxType;

/// Consensus parameters that don't change for the lifetime of the network.
#[derive(Clone, Debug)]
pub struct ChainParams {
    /// Number of slots in an epoch; `slot % slots_per_epoch == 0` marks an
    /// epoch start.
    slots_per_epoch: u64,
}

impl ChainParams {
    pub fn slots_per_epoch(&self) -> u64 {
        self.slots_per_epoch
    }
}

/// Gas consumed per transaction type.  Types without an entry are free.
#[derive(Clone, Debug)]
pub struct GasSchedule {
    balance_transfer: u64,
    object_commit: u64,
    object_audit: u64,
    validator_deposit: u64,
    auditor_deposit: u64,
}

impl GasSchedule {
    pub fn for_tx(&self, ty: TxType) -> u64 {
        match ty {
            TxType::BalanceTransfer => self.balance_transfer,
            TxType::ObjectCommit => self.object_commit,
            TxType::ObjectAudit => self.object_audit,
            TxType::ValidatorDeposit => self.validator_deposit,
            TxType::AuditorDeposit => self.auditor_deposit,
            _ => 0,
        }
    }
}

/// Initial chain state: balances and validator deposits keyed by public key.
/// A `BTreeMap` keeps iteration in lexicographic key order, which is what
/// pins down genesis validator indices.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct GenesisConfig {
    #[serde(default)]
    pub balances: BTreeMap<String, u64>,

    #[serde(default)]
    pub validators: BTreeMap<String, u64>,
}

/// Combined parameter set handed to the indexer.
#[derive(Clone, Debug)]
pub struct Params {
    chain: ChainParams,
    gas: GasSchedule,
    genesis: GenesisConfig,
}

impl Params {
    pub fn chain(&self) -> &ChainParams {
        &self.chain
    }

    pub fn gas(&self) -> &GasSchedule {
        &self.gas
    }

    pub fn genesis(&self) -> &GenesisConfig {
        &self.genesis
    }

    /// Replaces the preset genesis config, typically with one loaded from a
    /// file named in the process config.
    pub fn with_genesis(mut self, genesis: GenesisConfig) -> Self {
        self.genesis = genesis;
        self
    }

    /// Whether `slot` is the first slot of an epoch.
    pub fn is_epoch_start(&self, slot: u64) -> bool {
        slot % self.chain.slots_per_epoch == 0
    }

    pub fn for_network(network: Network) -> Self {
        let gas = GasSchedule {
            balance_transfer: constants::BALANCE_TRANSFER_GAS,
            object_commit: constants::OBJECT_COMMIT_GAS,
            object_audit: constants::OBJECT_AUDIT_GAS,
            validator_deposit: constants::VALIDATOR_DEPOSIT_GAS,
            auditor_deposit: constants::AUDITOR_DEPOSIT_GAS,
        };

        let slots_per_epoch = match network {
            Network::Mainnet | Network::Testnet => 32,
            Network::Devnet => 8,
        };

        Self {
            chain: ChainParams { slots_per_epoch },
            gas,
            genesis: GenesisConfig::default(),
        }
    }
}

/// Which chain parameter preset the process runs against.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Network {
    Mainnet,
    Testnet,
    Devnet,
}

#[derive(Debug, Error)]
#[error("unknown network {0:?}, expected mainnet, testnet or devnet")]
pub struct UnknownNetwork(String);

impl FromStr for Network {
    type Err = UnknownNetwork;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mainnet" => Ok(Network::Mainnet),
            "testnet" => Ok(Network::Testnet),
            "devnet" => Ok(Network::Devnet),
            other => Err(UnknownNetwork(other.to_owned())),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
            Network::Devnet => "devnet",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_parse() {
        assert_eq!("mainnet".parse::<Network>().unwrap(), Network::Mainnet);
        assert_eq!("devnet".parse::<Network>().unwrap(), Network::Devnet);
        assert!("regtest".parse::<Network>().is_err());
    }

    #[test]
    fn test_epoch_start() {
        let params = Params::for_network(Network::Mainnet);
        assert!(params.is_epoch_start(0));
        assert!(params.is_epoch_start(32));
        assert!(params.is_epoch_start(64));
        assert!(!params.is_epoch_start(31));
        assert!(!params.is_epoch_start(33));
    }

    #[test]
    fn test_gas_schedule_defaults() {
        let params = Params::for_network(Network::Testnet);
        assert_eq!(
            params.gas().for_tx(TxType::BalanceTransfer),
            constants::BALANCE_TRANSFER_GAS
        );
        assert_eq!(params.gas().for_tx(TxType::ValidatorExit), 0);
        assert_eq!(params.gas().for_tx(TxType::ObjectPor), 0);
    }

    #[test]
    fn test_genesis_config_sorted_iteration() {
        let genesis: GenesisConfig = serde_json::from_str(
            r#"{"balances": {"bb": 2, "aa": 1, "cc": 3}, "validators": {"bb": 20, "aa": 10}}"#,
        )
        .unwrap();

        let keys: Vec<_> = genesis.balances.keys().cloned().collect();
        assert_eq!(keys, vec!["aa", "bb", "cc"]);
        let vkeys: Vec<_> = genesis.validators.keys().cloned().collect();
        assert_eq!(vkeys, vec!["aa", "bb"]);
    }
}
