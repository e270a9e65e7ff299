//! End-to-end scenario suite pinning the indexing pipeline's testable
//! properties.
//!
//! Each scenario wires the real in-memory adapters for the block stream,
//! checkpoint store, asset dictionary, transfer store, and graph store
//! together exactly as `indexer-node`'s `main.rs` does for a live network,
//! then drives them through a fixed sequence of blocks and asserts on the
//! resulting projections.

pub mod fixtures;

#[cfg(test)]
mod invariants;
#[cfg(test)]
mod scenario_a_cold_start;
#[cfg(test)]
mod scenario_b_resume_after_crash;
#[cfg(test)]
mod scenario_c_balance_series_periods;
#[cfg(test)]
mod scenario_d_verification_propagates_live;
#[cfg(test)]
mod scenario_e_analytics_idempotence;
#[cfg(test)]
mod scenario_f_self_transfer;
