//! Per-network facts the chain client needs beyond the generic RPC surface:
//! decimal scale, balance-series epoch alignment, and the synthetic
//! transfer events each chain's staking/treasury pallets emit.

use indexer_types::NetworkId;

/// A synthetic transfer kind the Balance Transfers Indexer recognizes in
/// addition to the generic `Balances.Transfer` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntheticTransferKind {
    /// Stake add/remove, modeled as counterparty <-> system transfers.
    Stake,
    /// Staking rewards, modeled as `"staking"` -> stash.
    Reward,
    /// Treasury payouts, modeled as `"treasury"` -> recipient.
    TreasuryPayout,
}

#[derive(Debug, Clone, Copy)]
pub struct NetworkProfile {
    pub network: NetworkId,
    /// Chain-native decimal count, used to normalize raw amounts.
    pub native_decimals: u32,
    /// Unix millisecond epoch that balance-series periods align to.
    pub period_epoch_ms: u64,
}

impl NetworkProfile {
    pub fn for_network(network: NetworkId) -> Self {
        NetworkProfile {
            network,
            native_decimals: network.native_decimals(),
            period_epoch_ms: 0,
        }
    }

    /// Maps a `(module, event)` pair to a recognized synthetic transfer kind,
    /// if any. `Balances.Transfer` itself is handled generically by callers
    /// and is not represented here.
    pub fn synthetic_transfer_kind(
        &self,
        module: &str,
        event: &str,
    ) -> Option<SyntheticTransferKind> {
        match (module, event) {
            ("Staking", "Bonded") | ("Staking", "Unbonded") => Some(SyntheticTransferKind::Stake),
            ("Staking", "Rewarded") | ("Staking", "Reward") => {
                Some(SyntheticTransferKind::Reward)
            }
            ("Treasury", "Awarded") | ("Treasury", "Spending") => {
                Some(SyntheticTransferKind::TreasuryPayout)
            }
            _ => None,
        }
    }
}
