//! Routing trait and default A* implementation.
//!
//! # Pluggability
//!
//! The engine and dispatcher call routing through the [`Pathfinder`] trait,
//! so applications can swap in another search without touching the core.
//!
//! # Collision awareness
//!
//! Every query takes a `blocked` set: waypoints currently reserved by other
//! bots.  The search never expands a blocked waypoint, except that the start
//! and the goal are always allowed.  The start is where the asking bot
//! stands; the goal may be a station or slot another bot is about to leave,
//! and the mover simply waits in front of it.
//!
//! # Through traffic
//!
//! Only [`Transit`](crate::WaypointRole::Transit) waypoints are crossed on
//! the way to somewhere else.  A storage slot or station is entered only as
//! the goal, so a loaded bot never drives under a stored pod and no route
//! cuts through a station another bot is docked at.
//!
//! # Determinism
//!
//! Open-set entries are ordered by f-score and then by insertion sequence,
//! so among equal f-scores the node pushed first is expanded first.
//! Neighbours are pushed in the network's fixed link order.  Identical input
//! therefore always yields the identical path.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use rmfs_core::WaypointId;

use crate::network::WaypointNetwork;
use crate::{SpatialError, SpatialResult};

// ── Path ──────────────────────────────────────────────────────────────────────

/// The result of a routing query: the waypoints to visit in order, start and
/// goal included, and the summed link length.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    pub waypoints: Vec<WaypointId>,
    pub cost: f32,
}

impl Path {
    /// `true` if start and goal are the same waypoint.
    pub fn is_trivial(&self) -> bool {
        self.waypoints.len() <= 1
    }

    /// Number of moves needed to follow the path.
    pub fn hops(&self) -> usize {
        self.waypoints.len().saturating_sub(1)
    }

    pub fn start(&self) -> Option<WaypointId> {
        self.waypoints.first().copied()
    }

    pub fn goal(&self) -> Option<WaypointId> {
        self.waypoints.last().copied()
    }

    /// The waypoints still to be entered, i.e. everything after the start.
    pub fn steps(&self) -> &[WaypointId] {
        self.waypoints.get(1..).unwrap_or(&[])
    }
}

// ── Pathfinder trait ──────────────────────────────────────────────────────────

/// Pluggable routing engine.
pub trait Pathfinder: Send + Sync {
    /// Compute a path from `start` to `goal` avoiding `blocked`.  Every
    /// intermediate waypoint must allow through traffic.
    ///
    /// `start == goal` yields the single-element path `[start]`.
    ///
    /// # Errors
    ///
    /// [`SpatialError::NoPathFound`] if the goal cannot be reached around the
    /// blocked waypoints; [`SpatialError::WaypointNotFound`] for ids outside
    /// the network.
    fn find_path(
        &self,
        network: &WaypointNetwork,
        start:   WaypointId,
        goal:    WaypointId,
        blocked: &HashSet<WaypointId>,
    ) -> SpatialResult<Path>;
}

// ── AStarRouter ───────────────────────────────────────────────────────────────

/// Remaining-distance estimate used by [`AStarRouter`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Heuristic {
    /// Straight-line distance.  Admissible on any network whose link cost is
    /// the Euclidean link length, diagonals included.
    #[default]
    Euclidean,
    /// L1 distance.  Admissible only on 4-connected grids.
    Manhattan,
    /// Always zero; turns the search into Dijkstra.
    Zero,
}

/// A* over the waypoint network with Euclidean link costs.
#[derive(Copy, Clone, Debug, Default)]
pub struct AStarRouter {
    pub heuristic: Heuristic,
}

impl AStarRouter {
    pub fn new(heuristic: Heuristic) -> Self {
        Self { heuristic }
    }

    #[inline]
    fn estimate(&self, network: &WaypointNetwork, from: WaypointId, goal: WaypointId) -> f32 {
        let (a, b) = (network.coord(from), network.coord(goal));
        match self.heuristic {
            Heuristic::Euclidean => a.distance(b),
            Heuristic::Manhattan => a.manhattan(b),
            Heuristic::Zero      => 0.0,
        }
    }
}

impl Pathfinder for AStarRouter {
    fn find_path(
        &self,
        network: &WaypointNetwork,
        start:   WaypointId,
        goal:    WaypointId,
        blocked: &HashSet<WaypointId>,
    ) -> SpatialResult<Path> {
        astar(self, network, start, goal, blocked)
    }
}

// ── A* internals ──────────────────────────────────────────────────────────────

/// Open-set entry.  `BinaryHeap` is a max-heap, so the ordering is inverted:
/// lower f wins, then lower insertion sequence.
struct OpenEntry {
    f:    f32,
    seq:  u64,
    node: WaypointId,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

fn astar(
    router:  &AStarRouter,
    network: &WaypointNetwork,
    start:   WaypointId,
    goal:    WaypointId,
    blocked: &HashSet<WaypointId>,
) -> SpatialResult<Path> {
    for id in [start, goal] {
        if !network.contains(id) {
            return Err(SpatialError::WaypointNotFound(id));
        }
    }
    if start == goal {
        return Ok(Path { waypoints: vec![start], cost: 0.0 });
    }

    let n = network.node_count();
    let mut g       = vec![f32::INFINITY; n];
    let mut prev    = vec![WaypointId::INVALID; n];
    let mut closed  = vec![false; n];
    let mut heap    = BinaryHeap::new();
    let mut seq     = 0u64;

    g[start.index()] = 0.0;
    heap.push(OpenEntry { f: router.estimate(network, start, goal), seq, node: start });

    while let Some(OpenEntry { node, .. }) = heap.pop() {
        if node == goal {
            return Ok(reconstruct(&prev, start, goal, g[goal.index()]));
        }
        // Skip stale heap entries.
        if closed[node.index()] {
            continue;
        }
        closed[node.index()] = true;

        for (next, length) in network.out_links(node) {
            if closed[next.index()] {
                continue;
            }
            if next != goal
                && (blocked.contains(&next) || !network.role(next).allows_through_traffic())
            {
                continue;
            }
            let tentative = g[node.index()] + length;
            if tentative < g[next.index()] {
                g[next.index()] = tentative;
                prev[next.index()] = node;
                seq += 1;
                heap.push(OpenEntry {
                    f: tentative + router.estimate(network, next, goal),
                    seq,
                    node: next,
                });
            }
        }
    }

    Err(SpatialError::NoPathFound { start, goal })
}

fn reconstruct(prev: &[WaypointId], start: WaypointId, goal: WaypointId, cost: f32) -> Path {
    let mut waypoints = vec![goal];
    let mut cur = goal;
    while cur != start {
        cur = prev[cur.index()];
        waypoints.push(cur);
    }
    waypoints.reverse();
    Path { waypoints, cost }
}
