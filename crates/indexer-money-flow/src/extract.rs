//! Recognizes the events the Money Flow Indexer mutates the graph on: the
//! generic transfer/endowment events for edge aggregation, plus
//! network-specific events that attach additive labels.

use indexer_types::{Address, Amount, AssetContract, Event};
use serde_json::Value;

pub struct GraphTransfer {
    pub from: Address,
    pub to: Address,
    pub asset: AssetContract,
    pub amount: Amount,
}

pub struct GraphLabel {
    pub address: Address,
    pub label: &'static str,
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

/// Returns the transfer-shaped mutation for `event`, if it is one of
/// `Balances.Transfer` / `Balances.Endowed` or a chain-specific equivalent,
/// with the amount already normalized by the caller's network decimals.
pub fn graph_transfer(event: &Event, native_decimals: u32) -> Option<GraphTransfer> {
    let (from_key, to_key) = match (event.module_id.as_str(), event.event_id.as_str()) {
        ("Balances", "Transfer") => ("from", "to"),
        ("Balances", "Endowed") => return endowment(event, native_decimals),
        _ => return None,
    };

    let from = field(&event.attributes, from_key)?;
    let to = field(&event.attributes, to_key)?;
    let asset_contract = field(&event.attributes, "asset_contract")
        .filter(|s| !s.is_empty())
        .map(AssetContract)
        .unwrap_or_else(AssetContract::native);
    let amount = Amount::normalize(raw_amount(&event.attributes, "amount"), native_decimals);

    Some(GraphTransfer {
        from: Address(from),
        to: Address(to),
        asset: asset_contract,
        amount,
    })
}

/// `Balances.Endowed` creates a balance out of nothing (e.g. genesis or a
/// reward mint): modeled as a transfer from the chain's system sentinel so
/// the endowed account still gets a graph edge and activity record.
fn endowment(event: &Event, native_decimals: u32) -> Option<GraphTransfer> {
    let to = field(&event.attributes, "account")?;
    let amount = Amount::normalize(raw_amount(&event.attributes, "free_balance"), native_decimals);
    Some(GraphTransfer {
        from: Address("system".to_string()),
        to: Address(to),
        asset: AssetContract::native(),
        amount,
    })
}

/// Additive, network-specific labels: agent/neuron/subnet registration
/// events attach a label without affecting transfer aggregation.
pub fn graph_label(event: &Event) -> Option<GraphLabel> {
    let (field_name, label): (&str, &'static str) = match (event.module_id.as_str(), event.event_id.as_str()) {
        ("SubtensorModule", "NeuronRegistered") => ("hotkey", "agent"),
        ("SubtensorModule", "SubnetCreated") => ("owner", "subnet-owner"),
        ("Staking", "ValidatorPrefsSet") | ("Session", "NewValidators") => ("account", "validator"),
        _ => return None,
    };
    let address = field(&event.attributes, field_name)?;
    Some(GraphLabel {
        address: Address(address),
        label,
    })
}
