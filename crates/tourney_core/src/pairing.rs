//! Swiss pairing: ranking groups, weighted edges, two-stage matching.
//!
//! Pairing runs twice per round over the maximum-weight matching solver.
//! The opponent pass matches single teams into 1v1 units; the alliance pass
//! matches units into full 2v2 matchups. Both passes share the same graph
//! construction: ranking-point groups, Fold/Slide cost matrices inside each
//! group, expensive fallback edges between neighboring groups, and penalty
//! costs for repeat opponents and partners.

use crate::config::{PairingMethod, SwissOptions};
use crate::error::{Error, Result};
use crate::types::Roster;

/// Divisor that converts costs into solver weights. Also the upper bound on
/// a legal cost; anything above it would underflow to weight zero.
const WEIGHT_SCALE: i64 = 1_000_000;

/// A red/blue matchup produced by the solver.
pub type Matchup = ([u32; 2], [u32; 2]);

/// One side of the pairing graph: a single team in the opponent pass, a
/// (top, bottom) unit in the alliance pass. Rank and RP are snapshots of
/// the node's top team.
#[derive(Debug, Clone)]
struct PairNode {
    top: u32,
    bottom: Option<u32>,
    rank: u32,
    rp: f64,
}

#[derive(Debug, Clone)]
struct PairEdge {
    a: usize,
    b: usize,
    cost: i64,
}

impl PairEdge {
    fn new(a: usize, b: usize, cost: i64) -> Result<PairEdge> {
        check_cost(cost)?;
        Ok(PairEdge { a, b, cost })
    }

    fn add_cost(&mut self, amount: i64) -> Result<()> {
        check_cost(self.cost + amount)?;
        self.cost += amount;
        Ok(())
    }

    fn weight(&self) -> i64 {
        WEIGHT_SCALE / self.cost
    }
}

fn check_cost(cost: i64) -> Result<()> {
    if cost < 1 || cost > WEIGHT_SCALE {
        return Err(Error::Scheduling(format!(
            "edge cost {} outside 1..={}",
            cost, WEIGHT_SCALE
        )));
    }
    Ok(())
}

/// Produce the matchups for one Swiss round from the current standings.
pub fn swiss_matchups(
    teams: &Roster,
    opponent_method: PairingMethod,
    swiss: &SwissOptions,
) -> Result<Vec<Matchup>> {
    // Opponent pass: single-team nodes in rank order.
    let mut ranked: Vec<&crate::types::Team> = teams.values().collect();
    ranked.sort_by_key(|t| t.rank);
    let nodes: Vec<PairNode> = ranked
        .iter()
        .map(|t| PairNode {
            top: t.number,
            bottom: None,
            rank: t.rank,
            rp: t.rp,
        })
        .collect();

    let pairs = solve_stage(teams, &nodes, opponent_method, swiss)?;

    // The better-ranked team of each pair becomes the unit's top.
    let mut units: Vec<(u32, u32)> = pairs
        .into_iter()
        .map(|(i, j)| {
            if nodes[i].rank < nodes[j].rank {
                (nodes[i].top, nodes[j].top)
            } else {
                (nodes[j].top, nodes[i].top)
            }
        })
        .collect();
    units.sort_by_key(|&(top, _)| teams[&top].rank);

    // Alliance pass: unit nodes grouped by their top team's standing.
    let unit_nodes: Vec<PairNode> = units
        .iter()
        .map(|&(top, bottom)| PairNode {
            top,
            bottom: Some(bottom),
            rank: teams[&top].rank,
            rp: teams[&top].rp,
        })
        .collect();

    let unit_pairs = solve_stage(teams, &unit_nodes, swiss.alliance_pairing, swiss)?;

    Ok(unit_pairs
        .into_iter()
        .map(|(i, j)| {
            let (n1, n2) = (&unit_nodes[i], &unit_nodes[j]);
            (
                [n1.top, n2.top],
                [n1.bottom.expect("alliance node"), n2.bottom.expect("alliance node")],
            )
        })
        .collect())
}

/// Build the stage graph, run the matching solver, and read the result
/// back as deduplicated node index pairs.
fn solve_stage(
    teams: &Roster,
    nodes: &[PairNode],
    method: PairingMethod,
    swiss: &SwissOptions,
) -> Result<Vec<(usize, usize)>> {
    let edges = build_edges(teams, nodes, method, swiss)?;
    let edge_list: Vec<matching::Edge> = edges.iter().map(|e| (e.a, e.b, e.weight())).collect();
    let mate = matching::max_weight_matching(&edge_list, true);

    let mut pairs = Vec::with_capacity(nodes.len() / 2);
    for i in 0..nodes.len() {
        let partner = mate.get(i).copied().unwrap_or(-1);
        if partner < 0 {
            return Err(Error::Scheduling(format!(
                "matching left node {} (team {}) unpaired",
                i, nodes[i].top
            )));
        }
        let partner = partner as usize;
        if partner > i {
            pairs.push((i, partner));
        }
    }
    Ok(pairs)
}

fn build_edges(
    teams: &Roster,
    nodes: &[PairNode],
    method: PairingMethod,
    swiss: &SwissOptions,
) -> Result<Vec<PairEdge>> {
    let groups = partition_groups(nodes)?;
    let mut edges = Vec::new();

    for group in &groups {
        group_edges(group, method, &mut edges)?;
    }
    cross_group_edges(&groups, teams.len() as i64 + swiss.cross_group_cost, &mut edges)?;
    add_history_penalties(teams, nodes, swiss, &mut edges)?;

    Ok(edges)
}

/// Partition rank-sorted nodes into even-sized ranking-point groups.
///
/// A group boundary is cut only while the current group has even size;
/// otherwise the next node is folded in despite its different RP (the
/// group's reference RP is kept, so exactly one node folds in before a cut
/// becomes possible again). The trailing group can only end up odd when the
/// node count itself is odd, which cannot be matched perfectly.
fn partition_groups(nodes: &[PairNode]) -> Result<Vec<Vec<usize>>> {
    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut group: Vec<usize> = Vec::new();
    let mut group_rp = f64::NAN;

    for (idx, node) in nodes.iter().enumerate() {
        if !group.is_empty() && node.rp == group_rp {
            group.push(idx);
        } else if group.len() % 2 == 0 {
            if !group.is_empty() {
                groups.push(std::mem::take(&mut group));
            }
            group_rp = node.rp;
            group.push(idx);
        } else {
            group.push(idx);
        }
    }
    if !group.is_empty() {
        groups.push(group);
    }

    for group in &groups {
        if group.len() % 2 != 0 {
            return Err(Error::Scheduling(format!(
                "ranking group of odd size {} cannot be paired",
                group.len()
            )));
        }
    }
    Ok(groups)
}

/// Connect every position pair inside a group, costed by the distance from
/// the method's ideal partner position:
///
/// ```text
/// Fold, 8 nodes          Slide, 8 nodes
///     0 1 2 3 4 5 6 7  ideal       0 1 2 3 4 5 6 7  ideal
///  0|   7 6 5 4 3 2 1   7       0|   4 3 2 1 2 3 4   4
///  1|     5 4 3 2 1 2   6       1|     4 3 2 1 2 3   5
///  2|       3 2 1 2 3   5       2|       4 3 2 1 2   6
/// ```
fn group_edges(group: &[usize], method: PairingMethod, edges: &mut Vec<PairEdge>) -> Result<()> {
    let size = group.len() as i64;
    for i in 0..group.len() {
        let ideal = match method {
            PairingMethod::Fold => size - i as i64 - 1,
            PairingMethod::Slide => size / 2 + i as i64,
        };
        for j in i + 1..group.len() {
            let cost = (j as i64 - ideal).abs() + 1;
            edges.push(PairEdge::new(group[i], group[j], cost)?);
        }
    }
    Ok(())
}

/// Fallback edges between neighboring groups only. The base cost exceeds
/// every within-group cost, and each successive edge from the same source
/// costs one more, so cross-group picks stay ordered among themselves.
fn cross_group_edges(
    groups: &[Vec<usize>],
    base_cost: i64,
    edges: &mut Vec<PairEdge>,
) -> Result<()> {
    for pair in groups.windows(2) {
        for &source in &pair[0] {
            let mut cost = base_cost;
            for &target in &pair[1] {
                cost += 1;
                edges.push(PairEdge::new(source, target, cost)?);
            }
        }
    }
    Ok(())
}

/// Penalize edges whose teams have already met.
///
/// In the opponent pass the two nodes are single teams that would oppose
/// each other. In the alliance pass the cross combinations (one node's top
/// against the other's bottom) become opponents, while top/top and
/// bottom/bottom become partners.
fn add_history_penalties(
    teams: &Roster,
    nodes: &[PairNode],
    swiss: &SwissOptions,
    edges: &mut Vec<PairEdge>,
) -> Result<()> {
    let opponent_adder = teams.len() as i64 * swiss.previous_opponent_cost;
    let partner_adder = teams.len() as i64 * swiss.previous_partner_cost;

    for edge in edges.iter_mut() {
        let n1 = &nodes[edge.a];
        let n2 = &nodes[edge.b];
        match (n1.bottom, n2.bottom) {
            (None, None) => {
                if teams[&n1.top].has_opposed(n2.top) {
                    edge.add_cost(opponent_adder)?;
                }
            }
            (Some(b1), Some(b2)) => {
                if teams[&n1.top].has_opposed(b2) {
                    edge.add_cost(opponent_adder)?;
                }
                if teams[&n2.top].has_opposed(b1) {
                    edge.add_cost(opponent_adder)?;
                }
                if teams[&n1.top].has_partnered(n2.top) {
                    edge.add_cost(partner_adder)?;
                }
                if teams[&b1].has_partnered(b2) {
                    edge.add_cost(partner_adder)?;
                }
            }
            _ => {
                return Err(Error::Scheduling(
                    "pairing stage mixes team and unit nodes".to_string(),
                ))
            }
        }
    }
    Ok(())
}
