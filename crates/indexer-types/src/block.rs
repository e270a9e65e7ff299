//! The canonical block record and its constituents.

use crate::ids::Address;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Block height. Contiguous from 0, immutable once stored.
pub type Height = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtrinsicStatus {
    Success,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extrinsic {
    /// `{height}-{index}`.
    pub id: String,
    pub hash: String,
    pub signer: Option<Address>,
    pub module: String,
    pub function: String,
    pub status: ExtrinsicStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// `{height}-{index}`.
    pub id: String,
    pub extrinsic_id: String,
    pub module_id: String,
    pub event_id: String,
    /// Chain-neutral JSON attributes; consumers tolerate unknown fields.
    pub attributes: serde_json::Value,
}

/// One entry of the canonical, append-only block stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub height: Height,
    pub hash: String,
    /// Unix milliseconds.
    pub timestamp: u64,
    pub extrinsics: Vec<Extrinsic>,
    pub events: Vec<Event>,
    /// Exactly the union of addresses named in any extrinsic or event.
    pub addresses: BTreeSet<Address>,
}

impl Block {
    /// Builds `addresses` as the union of signer addresses and any address
    /// literal present in an event's JSON attributes under the conventional
    /// `from`/`to`/`address` keys. Chain clients should call this after
    /// populating `extrinsics`/`events` so the invariant in the data model
    /// holds without every call site tracking it by hand.
    pub fn with_derived_addresses(mut self) -> Self {
        let mut addresses = BTreeSet::new();
        for ext in &self.extrinsics {
            if let Some(signer) = &ext.signer {
                addresses.insert(signer.clone());
            }
        }
        for event in &self.events {
            for key in ["from", "to", "address", "stash", "recipient"] {
                if let Some(value) = event.attributes.get(key).and_then(|v| v.as_str()) {
                    addresses.insert(Address(value.to_string()));
                }
            }
        }
        self.addresses = addresses;
        self
    }
}
