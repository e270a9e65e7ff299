//! Asset Dictionary: the single source of truth for per-network asset
//! identity and verification status. Invoked synchronously by the Balance
//! Transfers, Balance Series, and Money Flow indexers — it has no
//! independent checkpoint or consumer loop of its own.

use indexer_types::{AssetContract, IndexerError, NetworkId, Height, NATIVE_ASSET_CONTRACT};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerificationStatus {
    Verified,
    Unknown,
    Malicious,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetRecord {
    pub network: NetworkId,
    pub contract: AssetContract,
    pub symbol: String,
    pub status: VerificationStatus,
    pub display_name: String,
    pub decimals: u32,
    pub first_seen_height: Height,
    pub first_seen_timestamp: u64,
    pub last_updated_timestamp: u64,
    pub updater: String,
    pub notes: Option<String>,
    pub version: u64,
}

#[derive(Debug, Clone, Default)]
pub struct AssetListFilter {
    pub status: Option<VerificationStatus>,
}

/// Port for an asset dictionary backing store.
pub trait AssetDictionary: Send + Sync {
    fn ensure_exists(
        &self,
        network: NetworkId,
        contract: AssetContract,
        symbol: &str,
        decimals: u32,
        first_seen_height: Height,
        first_seen_timestamp: u64,
    ) -> Result<AssetRecord, IndexerError>;

    fn update_verification(
        &self,
        network: NetworkId,
        contract: &AssetContract,
        status: VerificationStatus,
        updater: &str,
        notes: Option<String>,
        now: u64,
    ) -> Result<AssetRecord, IndexerError>;

    fn lookup(
        &self,
        network: NetworkId,
        contract: &AssetContract,
    ) -> Result<Option<AssetRecord>, IndexerError>;

    fn list(&self, network: NetworkId, filter: &AssetListFilter) -> Result<Vec<AssetRecord>, IndexerError>;
}

/// In-memory, thread-safe dictionary. `ensure_exists` is an atomic
/// insert-if-absent; concurrent callers racing on the same key never
/// produce two rows, and the earliest `first_seen_*` wins while the latest
/// `status` wins under `update_verification`.
#[derive(Default)]
pub struct InMemoryAssetDictionary {
    records: RwLock<HashMap<(NetworkId, String), AssetRecord>>,
}

impl InMemoryAssetDictionary {
    pub fn new() -> Self {
        InMemoryAssetDictionary::default()
    }

    /// Pre-seeds `(network, "native")` as verified, per the invariant that
    /// every configured network's native asset exists and is verified.
    pub fn seed_native(&self, network: NetworkId, symbol: &str, decimals: u32, now: u64) {
        let key = (network, NATIVE_ASSET_CONTRACT.to_string());
        let mut records = self.records.write();
        records.entry(key).or_insert(AssetRecord {
            network,
            contract: AssetContract::native(),
            symbol: symbol.to_string(),
            status: VerificationStatus::Verified,
            display_name: symbol.to_string(),
            decimals,
            first_seen_height: 0,
            first_seen_timestamp: now,
            last_updated_timestamp: now,
            updater: "system".to_string(),
            notes: None,
            version: 0,
        });
    }
}

impl AssetDictionary for InMemoryAssetDictionary {
    fn ensure_exists(
        &self,
        network: NetworkId,
        contract: AssetContract,
        symbol: &str,
        decimals: u32,
        first_seen_height: Height,
        first_seen_timestamp: u64,
    ) -> Result<AssetRecord, IndexerError> {
        let key = (network, contract.0.clone());
        let mut records = self.records.write();
        let record = records.entry(key).or_insert_with(|| AssetRecord {
            network,
            contract: contract.clone(),
            symbol: symbol.to_string(),
            status: if contract.is_native() {
                VerificationStatus::Verified
            } else {
                VerificationStatus::Unknown
            },
            display_name: symbol.to_string(),
            decimals,
            first_seen_height,
            first_seen_timestamp,
            last_updated_timestamp: first_seen_timestamp,
            updater: "system".to_string(),
            notes: None,
            version: 0,
        });
        Ok(record.clone())
    }

    fn update_verification(
        &self,
        network: NetworkId,
        contract: &AssetContract,
        status: VerificationStatus,
        updater: &str,
        notes: Option<String>,
        now: u64,
    ) -> Result<AssetRecord, IndexerError> {
        let key = (network, contract.0.clone());
        let mut records = self.records.write();
        let record = records.get_mut(&key).ok_or_else(|| {
            IndexerError::InvariantViolation(format!(
                "update_verification on unknown asset {network}/{contract}"
            ))
        })?;
        record.status = status;
        record.updater = updater.to_string();
        record.notes = notes;
        record.last_updated_timestamp = now;
        record.version += 1;
        Ok(record.clone())
    }

    fn lookup(
        &self,
        network: NetworkId,
        contract: &AssetContract,
    ) -> Result<Option<AssetRecord>, IndexerError> {
        let key = (network, contract.0.clone());
        Ok(self.records.read().get(&key).cloned())
    }

    fn list(&self, network: NetworkId, filter: &AssetListFilter) -> Result<Vec<AssetRecord>, IndexerError> {
        Ok(self
            .records
            .read()
            .values()
            .filter(|r| r.network == network)
            .filter(|r| filter.status.map_or(true, |s| s == r.status))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_exists_is_idempotent_under_concurrent_calls() {
        let dict = InMemoryAssetDictionary::new();
        let contract = AssetContract("0xabc".to_string());
        for _ in 0..5 {
            dict.ensure_exists(NetworkId::Torus, contract.clone(), "TOK", 18, 10, 1_000)
                .unwrap();
        }
        let all = dict.list(NetworkId::Torus, &AssetListFilter::default()).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].first_seen_height, 10);
    }

    #[test]
    fn native_asset_is_pre_seeded_verified() {
        let dict = InMemoryAssetDictionary::new();
        dict.seed_native(NetworkId::Torus, "TOR", 18, 0);
        let record = dict
            .lookup(NetworkId::Torus, &AssetContract::native())
            .unwrap()
            .unwrap();
        assert_eq!(record.status, VerificationStatus::Verified);
    }

    #[test]
    fn update_verification_is_latest_wins() {
        let dict = InMemoryAssetDictionary::new();
        let contract = AssetContract("0xabc".to_string());
        dict.ensure_exists(NetworkId::Torus, contract.clone(), "TOK", 18, 10, 1_000)
            .unwrap();
        dict.update_verification(
            NetworkId::Torus,
            &contract,
            VerificationStatus::Malicious,
            "moderator",
            Some("reported".to_string()),
            2_000,
        )
        .unwrap();
        let record = dict.lookup(NetworkId::Torus, &contract).unwrap().unwrap();
        assert_eq!(record.status, VerificationStatus::Malicious);
        // Earliest-wins on first-seen fields: unaffected by the later update.
        assert_eq!(record.first_seen_height, 10);
    }

    #[test]
    fn unknown_contract_records_an_empty_contract_as_unknown() {
        let dict = InMemoryAssetDictionary::new();
        let contract = AssetContract(String::new());
        let record = dict
            .ensure_exists(NetworkId::Bittensor, contract, "UNK", 0, 5, 500)
            .unwrap();
        assert_eq!(record.status, VerificationStatus::Unknown);
    }
}
