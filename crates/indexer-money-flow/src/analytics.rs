//! Periodic, best-effort graph analytics: community assignment (weakly
//! connected components via union-find), per-community PageRank, and
//! 6-float network embeddings. Pure functions of the snapshotted
//! node/edge set, so re-running with no new data is idempotent — the
//! property Scenario E pins.

use crate::ports::{AddressNode, Embedding, TransferEdge};
use indexer_types::Address;
use petgraph::unionfind::UnionFind;
use std::collections::HashMap;

/// A community larger than this is skipped for PageRank on a given cadence
/// run (logged, retried next cadence) rather than blocking the whole batch
/// of communities behind one pathologically large one.
pub const MAX_PAGE_RANK_COMMUNITY_NODES: usize = 50_000;

const DAMPING_FACTOR: f64 = 0.85;
const PAGE_RANK_ITERATIONS: usize = 20;

/// Assigns a dense `community_id` (0, 1, 2, ...) to every address that
/// participates in at least one edge, via weakly connected components over
/// the full directed transfer graph treated as undirected.
pub fn assign_communities(nodes: &[AddressNode], edges: &[TransferEdge]) -> HashMap<Address, u64> {
    let participating: Vec<Address> = nodes
        .iter()
        .map(|n| n.address.clone())
        .filter(|a| edges.iter().any(|e| &e.from == a || &e.to == a))
        .collect();

    let mut index_of: HashMap<Address, usize> = HashMap::new();
    for (i, addr) in participating.iter().enumerate() {
        index_of.insert(addr.clone(), i);
    }

    let mut uf = UnionFind::new(participating.len());
    for edge in edges {
        if let (Some(&a), Some(&b)) = (index_of.get(&edge.from), index_of.get(&edge.to)) {
            uf.union(a, b);
        }
    }

    let mut root_to_id: HashMap<usize, u64> = HashMap::new();
    let mut next_id = 0u64;
    let mut assignment = HashMap::new();
    for addr in &participating {
        let idx = index_of[addr];
        let root = uf.find(idx);
        let id = *root_to_id.entry(root).or_insert_with(|| {
            let id = next_id;
            next_id += 1;
            id
        });
        assignment.insert(addr.clone(), id);
    }
    assignment
}

/// Computes PageRank independently within each community's induced
/// subgraph (edges where both endpoints share a community), by unweighted
/// directed power iteration.
pub fn page_rank_per_community(
    communities: &HashMap<Address, u64>,
    edges: &[TransferEdge],
) -> HashMap<Address, f64> {
    let mut by_community: HashMap<u64, Vec<Address>> = HashMap::new();
    for (addr, community) in communities {
        by_community.entry(*community).or_default().push(addr.clone());
    }

    let mut ranks = HashMap::new();
    for (community_id, members) in &by_community {
        if members.len() > MAX_PAGE_RANK_COMMUNITY_NODES {
            tracing::warn!(
                community_id,
                size = members.len(),
                "skipping page rank for oversized community this cadence"
            );
            continue;
        }

        let induced_edges: Vec<(Address, Address)> = edges
            .iter()
            .filter(|e| communities.get(&e.from) == Some(community_id) && communities.get(&e.to) == Some(community_id))
            .map(|e| (e.from.clone(), e.to.clone()))
            .collect();

        ranks.extend(power_iteration_page_rank(members, &induced_edges));
    }
    ranks
}

fn power_iteration_page_rank(nodes: &[Address], edges: &[(Address, Address)]) -> HashMap<Address, f64> {
    let n = nodes.len();
    if n == 0 {
        return HashMap::new();
    }

    let index: HashMap<&Address, usize> = nodes.iter().enumerate().map(|(i, a)| (a, i)).collect();
    let mut out_edges: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut out_degree = vec![0usize; n];
    for (from, to) in edges {
        if let (Some(&fi), Some(&ti)) = (index.get(from), index.get(to)) {
            out_edges[fi].push(ti);
            out_degree[fi] += 1;
        }
    }

    let mut rank = vec![1.0 / n as f64; n];
    for _ in 0..PAGE_RANK_ITERATIONS {
        let dangling_mass: f64 = (0..n).filter(|&i| out_degree[i] == 0).map(|i| rank[i]).sum();
        let base = (1.0 - DAMPING_FACTOR) / n as f64 + DAMPING_FACTOR * dangling_mass / n as f64;
        let mut next = vec![base; n];
        for i in 0..n {
            if out_degree[i] == 0 {
                continue;
            }
            let share = DAMPING_FACTOR * rank[i] / out_degree[i] as f64;
            for &j in &out_edges[i] {
                next[j] += share;
            }
        }
        rank = next;
    }

    nodes.iter().enumerate().map(|(i, a)| (a.clone(), rank[i])).collect()
}

/// Builds the 6-float embedding for one node, null-coalescing unset
/// community fields to `0.0`.
pub fn embedding_for(node: &AddressNode) -> Embedding {
    [
        node.transfer_count as f64,
        node.unique_senders as f64,
        node.unique_receivers as f64,
        node.neighbor_count as f64,
        node.community_id.unwrap_or(0) as f64,
        node.community_page_rank.unwrap_or(0.0),
    ]
}
