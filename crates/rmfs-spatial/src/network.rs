//! Waypoint network representation, reservations, and builder.
//!
//! # Data layout
//!
//! The graph uses **Compressed Sparse Row (CSR)** format for outgoing links.
//! Given a `WaypointId n`, its outgoing links occupy the slice:
//!
//! ```text
//! link_to[ node_out_start[n] .. node_out_start[n+1] ]
//! ```
//!
//! Links are sorted by source node and, within a node, kept in insertion
//! order, so neighbour iteration is a contiguous scan in a fixed order.  A*
//! relies on that fixed order for reproducible tie-breaking.
//!
//! # Reservations
//!
//! Topology is immutable after [`WaypointNetworkBuilder::build`]; the only
//! mutable state is the per-waypoint occupant.  A bot holds a reservation on
//! the waypoint it stands on and takes one on the next waypoint of its route
//! before moving.  At most one bot holds a waypoint at any time.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) maps `(x, y)` to the nearest `WaypointId`, used to
//! snap coordinates from configuration or front-ends onto the graph.

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use rmfs_core::{BotId, Coord, WaypointId};

use crate::{SpatialError, SpatialResult};

/// Coordinates closer than this are treated as the same grid cell.
const SNAP_EPSILON: f32 = 1e-3;

// ── Roles ─────────────────────────────────────────────────────────────────────

/// What a waypoint is used for.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WaypointRole {
    /// Plain floor cell; bots drive over it.
    #[default]
    Transit,
    /// Pod storage slot.
    Storage,
    /// Where bundles are loaded into pods.
    InputStation,
    /// Where order items are picked from pods.
    OutputStation,
}

impl WaypointRole {
    #[inline]
    pub fn is_station(self) -> bool {
        matches!(self, WaypointRole::InputStation | WaypointRole::OutputStation)
    }

    /// `true` if routes may pass over this waypoint on the way somewhere
    /// else.  Storage slots and stations are only ever a route's start or
    /// goal.
    #[inline]
    pub fn allows_through_traffic(self) -> bool {
        self == WaypointRole::Transit
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WaypointRole::Transit       => "transit",
            WaypointRole::Storage       => "storage",
            WaypointRole::InputStation  => "input",
            WaypointRole::OutputStation => "output",
        }
    }
}

// ── R-tree node entry ─────────────────────────────────────────────────────────

#[derive(Clone)]
struct NodeEntry {
    point: [f32; 2], // [x, y]
    id: WaypointId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f32; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

// ── WaypointNetwork ───────────────────────────────────────────────────────────

/// Directed waypoint graph in CSR format, plus the occupancy table and a
/// spatial index for snapping.
///
/// Topology fields are `pub` for direct indexed access on hot paths.  Do not
/// construct directly; use [`WaypointNetworkBuilder`].
#[derive(Clone)]
pub struct WaypointNetwork {
    // ── Node data ─────────────────────────────────────────────────────────
    /// Floor position of each waypoint.  Indexed by `WaypointId`.
    pub node_pos: Vec<Coord>,

    /// Role of each waypoint.  Indexed by `WaypointId`.
    pub node_role: Vec<WaypointRole>,

    // ── CSR adjacency ─────────────────────────────────────────────────────
    /// Outgoing links of node `n` are at `node_out_start[n] .. node_out_start[n+1]`.
    /// Length = `node_count + 1`.
    pub node_out_start: Vec<u32>,

    /// Destination of each link.
    pub link_to: Vec<WaypointId>,

    /// Euclidean length of each link; the A* step cost.
    pub link_length: Vec<f32>,

    // ── Mutable occupancy ─────────────────────────────────────────────────
    occupant: Vec<Option<BotId>>,

    // ── Spatial index ─────────────────────────────────────────────────────
    spatial_idx: RTree<NodeEntry>,
}

impl std::fmt::Debug for WaypointNetwork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WaypointNetwork")
            .field("nodes", &self.node_count())
            .field("links", &self.link_count())
            .field("reserved", &self.reserved_count())
            .finish()
    }
}

impl WaypointNetwork {
    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    pub fn link_count(&self) -> usize {
        self.link_to.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_pos.is_empty()
    }

    #[inline]
    pub fn contains(&self, id: WaypointId) -> bool {
        id.index() < self.node_pos.len()
    }

    /// Position of `id`.
    ///
    /// # Panics
    /// Panics if `id` is not part of the network.
    #[inline]
    pub fn coord(&self, id: WaypointId) -> Coord {
        self.node_pos[id.index()]
    }

    #[inline]
    pub fn role(&self, id: WaypointId) -> WaypointRole {
        self.node_role[id.index()]
    }

    /// Ascending ids of all waypoints with `role`.
    pub fn waypoints_with_role(&self, role: WaypointRole) -> Vec<WaypointId> {
        self.node_role
            .iter()
            .enumerate()
            .filter(|&(_, &r)| r == role)
            .map(|(i, _)| WaypointId::from_index(i))
            .collect()
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    /// Outgoing `(neighbour, link length)` pairs of `id`, in insertion order.
    #[inline]
    pub fn out_links(&self, id: WaypointId) -> impl Iterator<Item = (WaypointId, f32)> + '_ {
        let start = self.node_out_start[id.index()] as usize;
        let end   = self.node_out_start[id.index() + 1] as usize;
        (start..end).map(move |i| (self.link_to[i], self.link_length[i]))
    }

    /// Waypoints directly reachable from `id`.
    #[inline]
    pub fn neighbors(&self, id: WaypointId) -> impl Iterator<Item = WaypointId> + '_ {
        self.out_links(id).map(|(to, _)| to)
    }

    /// `true` if there is a link `from → to`.
    pub fn is_adjacent(&self, from: WaypointId, to: WaypointId) -> bool {
        self.contains(from) && self.neighbors(from).any(|n| n == to)
    }

    /// Length of the link `from → to`, if it exists.
    pub fn link_length_between(&self, from: WaypointId, to: WaypointId) -> Option<f32> {
        if !self.contains(from) {
            return None;
        }
        self.out_links(from).find(|&(n, _)| n == to).map(|(_, len)| len)
    }

    /// Forward reachability from `start` (ignores reservations).
    /// Indexed by `WaypointId`.
    pub fn reachable_from(&self, start: WaypointId) -> Vec<bool> {
        let mut seen = vec![false; self.node_count()];
        if !self.contains(start) {
            return seen;
        }
        let mut stack = vec![start];
        seen[start.index()] = true;
        while let Some(n) = stack.pop() {
            for next in self.neighbors(n) {
                if !seen[next.index()] {
                    seen[next.index()] = true;
                    stack.push(next);
                }
            }
        }
        seen
    }

    /// Backward reachability: every waypoint from which `goal` can be
    /// reached.  Indexed by `WaypointId`.
    pub fn reaching(&self, goal: WaypointId) -> Vec<bool> {
        let n = self.node_count();
        let mut reverse: Vec<Vec<WaypointId>> = vec![Vec::new(); n];
        for from in 0..n {
            let from = WaypointId::from_index(from);
            for to in self.neighbors(from) {
                reverse[to.index()].push(from);
            }
        }
        let mut seen = vec![false; n];
        if !self.contains(goal) {
            return seen;
        }
        let mut stack = vec![goal];
        seen[goal.index()] = true;
        while let Some(node) = stack.pop() {
            for &prev in &reverse[node.index()] {
                if !seen[prev.index()] {
                    seen[prev.index()] = true;
                    stack.push(prev);
                }
            }
        }
        seen
    }

    // ── Reservations ──────────────────────────────────────────────────────

    /// `true` if no bot holds `id`.
    #[inline]
    pub fn is_free(&self, id: WaypointId) -> bool {
        self.occupant.get(id.index()).is_some_and(|o| o.is_none())
    }

    /// The bot holding `id`, if any.
    #[inline]
    pub fn occupant(&self, id: WaypointId) -> Option<BotId> {
        self.occupant.get(id.index()).copied().flatten()
    }

    /// Claim `id` for `bot`.  Re-reserving a waypoint the bot already holds
    /// succeeds.
    pub fn reserve(&mut self, id: WaypointId, bot: BotId) -> SpatialResult<()> {
        let slot = self
            .occupant
            .get_mut(id.index())
            .ok_or(SpatialError::WaypointNotFound(id))?;
        match *slot {
            Some(holder) if holder != bot => {
                Err(SpatialError::AlreadyReserved { waypoint: id, holder })
            }
            _ => {
                *slot = Some(bot);
                Ok(())
            }
        }
    }

    /// Drop `bot`'s claim on `id`.  Returns `false` (and changes nothing) if
    /// `bot` did not hold it.
    pub fn release(&mut self, id: WaypointId, bot: BotId) -> bool {
        match self.occupant.get_mut(id.index()) {
            Some(slot) if *slot == Some(bot) => {
                *slot = None;
                true
            }
            _ => false,
        }
    }

    /// All `(waypoint, holder)` pairs in ascending waypoint order.
    pub fn reservations(&self) -> impl Iterator<Item = (WaypointId, BotId)> + '_ {
        self.occupant
            .iter()
            .enumerate()
            .filter_map(|(i, o)| o.map(|bot| (WaypointId::from_index(i), bot)))
    }

    pub fn reserved_count(&self) -> usize {
        self.occupant.iter().filter(|o| o.is_some()).count()
    }

    /// Drop every reservation (used when the world is rebuilt).
    pub fn clear_reservations(&mut self) {
        self.occupant.iter_mut().for_each(|o| *o = None);
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// The waypoint nearest to `pos`.  `None` only for an empty network.
    pub fn nearest_waypoint(&self, pos: Coord) -> Option<WaypointId> {
        self.spatial_idx.nearest_neighbor(&[pos.x, pos.y]).map(|e| e.id)
    }

    /// The waypoint located exactly at `(x, y)`, if there is one.
    pub fn waypoint_at(&self, x: f32, y: f32) -> Option<WaypointId> {
        let pos = Coord::new(x, y);
        self.nearest_waypoint(pos)
            .filter(|&id| self.coord(id).distance(pos) < SNAP_EPSILON)
    }
}

// ── WaypointNetworkBuilder ────────────────────────────────────────────────────

/// Construct a [`WaypointNetwork`] incrementally, then call [`build`](Self::build).
///
/// # Example
///
/// ```
/// use rmfs_core::Coord;
/// use rmfs_spatial::{WaypointNetworkBuilder, WaypointRole};
///
/// let mut b = WaypointNetworkBuilder::new();
/// let a = b.add_waypoint(Coord::new(0.0, 0.0), WaypointRole::Transit);
/// let c = b.add_waypoint(Coord::new(1.0, 0.0), WaypointRole::Storage);
/// b.add_link(a, c);
/// let net = b.build();
/// assert_eq!(net.node_count(), 2);
/// assert_eq!(net.link_count(), 2); // bidirectional
/// ```
pub struct WaypointNetworkBuilder {
    nodes:     Vec<Coord>,
    roles:     Vec<WaypointRole>,
    raw_links: Vec<RawLink>,
}

struct RawLink {
    from:   WaypointId,
    to:     WaypointId,
    length: f32,
}

impl WaypointNetworkBuilder {
    pub fn new() -> Self {
        Self { nodes: Vec::new(), roles: Vec::new(), raw_links: Vec::new() }
    }

    /// A `width × height` grid of transit waypoints with unit spacing.
    ///
    /// Waypoint `(x, y)` gets id `y * width + x`.  Orthogonal neighbours are
    /// linked in both directions (right, down, left, up order); with
    /// `diagonal` the four diagonal neighbours are linked as well.
    pub fn grid(width: u32, height: u32, diagonal: bool) -> Self {
        let mut b = Self::new();
        for y in 0..height {
            for x in 0..width {
                b.add_waypoint(Coord::new(x as f32, y as f32), WaypointRole::Transit);
            }
        }
        let id = |x: i64, y: i64| WaypointId((y * width as i64 + x) as u32);
        let mut offsets: Vec<(i64, i64)> = vec![(1, 0), (0, 1), (-1, 0), (0, -1)];
        if diagonal {
            offsets.extend([(1, 1), (-1, 1), (-1, -1), (1, -1)]);
        }
        for y in 0..height as i64 {
            for x in 0..width as i64 {
                for &(dx, dy) in &offsets {
                    let (nx, ny) = (x + dx, y + dy);
                    if nx >= 0 && ny >= 0 && nx < width as i64 && ny < height as i64 {
                        b.add_directed_link(id(x, y), id(nx, ny));
                    }
                }
            }
        }
        b
    }

    /// Add a waypoint and return its `WaypointId` (sequential from 0).
    pub fn add_waypoint(&mut self, pos: Coord, role: WaypointRole) -> WaypointId {
        let id = WaypointId(self.nodes.len() as u32);
        self.nodes.push(pos);
        self.roles.push(role);
        id
    }

    /// Change the role of a waypoint added earlier.
    pub fn set_role(&mut self, id: WaypointId, role: WaypointRole) {
        self.roles[id.index()] = role;
    }

    /// Add a **directed** link whose cost is the Euclidean distance between
    /// the endpoints.
    pub fn add_directed_link(&mut self, from: WaypointId, to: WaypointId) {
        let length = self.nodes[from.index()].distance(self.nodes[to.index()]);
        self.raw_links.push(RawLink { from, to, length });
    }

    /// Add links in **both directions** (the common case on a warehouse floor).
    pub fn add_link(&mut self, a: WaypointId, b: WaypointId) {
        self.add_directed_link(a, b);
        self.add_directed_link(b, a);
    }

    /// Remove every link touching `id`, turning it into an obstacle.
    pub fn isolate(&mut self, id: WaypointId) {
        self.raw_links.retain(|l| l.from != id && l.to != id);
    }

    pub fn node_pos(&self, id: WaypointId) -> Coord {
        self.nodes[id.index()]
    }

    pub fn node_count(&self) -> usize { self.nodes.len() }
    pub fn link_count(&self) -> usize { self.raw_links.len() }

    /// Consume the builder and produce a [`WaypointNetwork`] with no
    /// reservations.
    pub fn build(self) -> WaypointNetwork {
        let node_count = self.nodes.len();
        let link_count = self.raw_links.len();

        // Stable sort keeps per-node insertion order for deterministic A*.
        let mut raw = self.raw_links;
        raw.sort_by_key(|l| l.from.0);

        let link_to:     Vec<WaypointId> = raw.iter().map(|l| l.to).collect();
        let link_length: Vec<f32>        = raw.iter().map(|l| l.length).collect();

        let mut node_out_start = vec![0u32; node_count + 1];
        for l in &raw {
            node_out_start[l.from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[node_count] as usize, link_count);

        let entries: Vec<NodeEntry> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, &pos)| NodeEntry { point: [pos.x, pos.y], id: WaypointId(i as u32) })
            .collect();
        let spatial_idx = RTree::bulk_load(entries);

        WaypointNetwork {
            node_pos: self.nodes,
            node_role: self.roles,
            node_out_start,
            link_to,
            link_length,
            occupant: vec![None; node_count],
            spatial_idx,
        }
    }
}

impl Default for WaypointNetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}
