//! The `DispatchPolicy` trait: the extension point for task assignment.

use std::collections::{BTreeSet, HashSet};

use rmfs_core::{BotId, OrderId, PodId, StationId, WaypointId};
use rmfs_entities::{Bot, Bundle};
use rmfs_spatial::Path;

use crate::DispatchView;

/// Unmatched work handed to a policy, oldest first.
pub struct PendingWork<'w> {
    pub orders:    &'w [OrderId],
    pub bundles:   &'w [Bundle],
    pub idle_bots: &'w BTreeSet<BotId>,
}

/// Which piece of pending work an assignment serves.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Work {
    Order(OrderId),
    /// Index into [`PendingWork::bundles`].
    Bundle(usize),
}

/// One bot matched to one pod and station.
///
/// `path` runs from the bot's position to the pod's slot.  An assignment is
/// only ever produced together with a path, so a matched-but-unbotted order
/// cannot exist.
#[derive(Clone, Debug, PartialEq)]
pub struct Assignment {
    pub bot:     BotId,
    pub work:    Work,
    pub pod:     PodId,
    pub station: StationId,
    pub path:    Path,
}

/// Pluggable matching of idle bots, pending work, and pods.
///
/// # Required methods
///
/// Only [`assign`][Self::assign] is required.  Return-slot selection has a
/// default (nearest free reachable slot) that most policies keep.
///
/// # Contract
///
/// Within one call a bot and a pod may appear in at most one assignment.
/// The dispatcher drops assignments that break this or that name a bot
/// outside `work.idle_bots`.
pub trait DispatchPolicy: Send + Sync {
    fn assign(&self, work: &PendingWork<'_>, view: &DispatchView<'_>) -> Vec<Assignment>;

    /// Storage slot for the pod `bot` carries.
    ///
    /// Default: the free slot nearest to the bot in a straight line (ties to
    /// the lowest id) that can be reached at all, ignoring reservations.
    /// Slots under a parked bot are skipped.
    fn choose_return_slot(&self, bot: &Bot, view: &DispatchView<'_>) -> Option<WaypointId> {
        let from = view.network.coord(bot.position);
        let mut slots: Vec<(WaypointId, f32)> = view
            .store
            .free_slots()
            .filter(|&s| !view.held_by_parked_bot(s))
            .map(|s| (s, view.network.coord(s).distance(from)))
            .collect();
        slots.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));

        let open = HashSet::new();
        slots
            .into_iter()
            .map(|(s, _)| s)
            .find(|&s| view.route(bot.position, s, &open).is_some())
    }
}
