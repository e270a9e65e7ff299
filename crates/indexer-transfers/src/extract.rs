//! Turns a block's raw events into transfer rows: the generic
//! `Balances.Transfer` plus the per-network synthetic transfers
//! (staking, treasury) [`NetworkProfile`] recognizes.

use crate::ports::TransferRecord;
use indexer_chain_client::{NetworkProfile, SyntheticTransferKind};
use indexer_types::{Address, Amount, AssetContract, Block, Event};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferKind {
    Native,
    Stake,
    Reward,
    TreasuryPayout,
}

#[derive(Debug, Clone)]
pub struct ExtractedTransfer {
    pub extrinsic_id: String,
    pub event_idx: u32,
    pub from: Address,
    pub to: Address,
    pub asset_symbol: String,
    pub asset_contract: AssetContract,
    pub amount: Amount,
    pub fee: Amount,
    pub kind: TransferKind,
}

impl From<SyntheticTransferKind> for TransferKind {
    fn from(kind: SyntheticTransferKind) -> Self {
        match kind {
            SyntheticTransferKind::Stake => TransferKind::Stake,
            SyntheticTransferKind::Reward => TransferKind::Reward,
            SyntheticTransferKind::TreasuryPayout => TransferKind::TreasuryPayout,
        }
    }
}

impl ExtractedTransfer {
    pub fn into_record(self, block: &Block) -> TransferRecord {
        TransferRecord {
            extrinsic_id: self.extrinsic_id,
            event_idx: self.event_idx,
            block_height: block.height,
            block_timestamp: block.timestamp,
            from: self.from,
            to: self.to,
            asset_symbol: self.asset_symbol,
            asset_contract: self.asset_contract,
            amount: self.amount,
            fee: self.fee,
            version: 0,
        }
    }
}

fn field(attributes: &Value, name: &str) -> Option<String> {
    attributes.get(name).and_then(|v| v.as_str()).map(str::to_string)
}

fn raw_amount(attributes: &Value, name: &str) -> u128 {
    attributes
        .get(name)
        .and_then(|v| v.as_str().and_then(|s| s.parse().ok()).or_else(|| v.as_u64().map(u128::from)))
        .unwrap_or(0)
}

fn event_idx(event: &Event) -> u32 {
    event
        .id
        .rsplit('-')
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(0)
}

pub fn extract_transfers(block: &Block, profile: &NetworkProfile) -> Vec<ExtractedTransfer> {
    let mut transfers = Vec::new();

    for event in &block.events {
        let kind = if event.module_id == "Balances" && event.event_id == "Transfer" {
            Some(TransferKind::Native)
        } else {
            profile
                .synthetic_transfer_kind(&event.module_id, &event.event_id)
                .map(TransferKind::from)
        };
        let Some(kind) = kind else { continue };

        let (from, to) = match kind {
            TransferKind::Native => (
                field(&event.attributes, "from").unwrap_or_default(),
                field(&event.attributes, "to").unwrap_or_default(),
            ),
            TransferKind::Stake => match event.event_id.as_str() {
                "Bonded" => (
                    field(&event.attributes, "stash").unwrap_or_default(),
                    "system".to_string(),
                ),
                _ => (
                    "system".to_string(),
                    field(&event.attributes, "stash").unwrap_or_default(),
                ),
            },
            TransferKind::Reward => (
                "staking".to_string(),
                field(&event.attributes, "stash").unwrap_or_default(),
            ),
            TransferKind::TreasuryPayout => (
                "treasury".to_string(),
                field(&event.attributes, "recipient").or_else(|| field(&event.attributes, "to")).unwrap_or_default(),
            ),
        };

        let amount = Amount::normalize(raw_amount(&event.attributes, "amount"), profile.native_decimals);
        let fee = Amount::normalize(raw_amount(&event.attributes, "fee"), profile.native_decimals);

        let asset_contract = match field(&event.attributes, "asset_contract") {
            Some(contract) if !contract.is_empty() => AssetContract(contract),
            Some(_) | None if kind == TransferKind::Native => AssetContract::native(),
            _ => AssetContract(String::new()),
        };
        let asset_symbol = field(&event.attributes, "asset_symbol")
            .unwrap_or_else(|| profile.network.native_symbol().to_string());

        transfers.push(ExtractedTransfer {
            extrinsic_id: event.extrinsic_id.clone(),
            event_idx: event_idx(event),
            from: Address(from),
            to: Address(to),
            asset_symbol,
            asset_contract,
            amount,
            fee,
            kind,
        });
    }

    transfers
}
