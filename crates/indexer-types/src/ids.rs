//! Identifiers shared across the pipeline: networks, addresses, asset contracts.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the Substrate-based chains this platform indexes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkId {
    Torus,
    Bittensor,
    Polkadot,
}

impl NetworkId {
    /// Chain-native decimal scale used to normalize raw on-chain amounts.
    pub fn native_decimals(self) -> u32 {
        match self {
            NetworkId::Torus => 18,
            NetworkId::Bittensor => 9,
            NetworkId::Polkadot => 10,
        }
    }

    pub fn native_symbol(self) -> &'static str {
        match self {
            NetworkId::Torus => "TOR",
            NetworkId::Bittensor => "TAO",
            NetworkId::Polkadot => "DOT",
        }
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NetworkId::Torus => "torus",
            NetworkId::Bittensor => "bittensor",
            NetworkId::Polkadot => "polkadot",
        };
        write!(f, "{s}")
    }
}

impl FromStr for NetworkId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "torus" => Ok(NetworkId::Torus),
            "bittensor" => Ok(NetworkId::Bittensor),
            "polkadot" => Ok(NetworkId::Polkadot),
            other => Err(format!("unknown network identifier: {other}")),
        }
    }
}

/// An on-chain address, kept as its chain-native encoded string (SS58 or
/// equivalent). Opaque to the pipeline beyond equality/hashing.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address(pub String);

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Address(s.to_string())
    }
}

/// Sentinel contract identifier for chain-native assets.
pub const NATIVE_ASSET_CONTRACT: &str = "native";

/// Identifies an asset within a network: `"native"` for the chain currency,
/// otherwise the token's contract address.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AssetContract(pub String);

impl AssetContract {
    pub fn native() -> Self {
        AssetContract(NATIVE_ASSET_CONTRACT.to_string())
    }

    pub fn is_native(&self) -> bool {
        self.0 == NATIVE_ASSET_CONTRACT
    }
}

impl fmt::Display for AssetContract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
