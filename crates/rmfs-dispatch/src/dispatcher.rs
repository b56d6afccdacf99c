//! The `Dispatcher`: pending queues and task issue.

use std::collections::{BTreeSet, VecDeque};

use tracing::{debug, warn};

use rmfs_core::{BotId, OrderId, PodId, TaskId};
use rmfs_entities::{Bot, Bundle, Task, TaskKind};
use rmfs_spatial::Path;

use crate::{Assignment, DispatchPolicy, DispatchView, GreedyPolicy, PendingWork, Work};

/// A task ready to hand to its bot, with the route to its first target.
#[derive(Clone, Debug, PartialEq)]
pub struct Dispatch {
    pub task: Task,
    pub path: Path,
}

/// Holds unmatched work and the idle-bot pool, and turns policy matches into
/// tasks.
///
/// The engine reports events (`on_order_created`, `on_bot_idle`,
/// `on_bundle_received`) as they happen and calls [`tick`](Self::tick) once
/// per engine tick.  Work that cannot be matched stays queued and is retried
/// on the next tick; nothing is ever dropped.
pub struct Dispatcher<P: DispatchPolicy = GreedyPolicy> {
    policy:          P,
    pending_orders:  VecDeque<OrderId>,
    pending_bundles: VecDeque<Bundle>,
    idle_bots:       BTreeSet<BotId>,
    next_task:       u32,
}

impl<P: DispatchPolicy> Dispatcher<P> {
    pub fn new(policy: P) -> Self {
        Self {
            policy,
            pending_orders:  VecDeque::new(),
            pending_bundles: VecDeque::new(),
            idle_bots:       BTreeSet::new(),
            next_task:       0,
        }
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    // ── Event intake ──────────────────────────────────────────────────────

    pub fn on_order_created(&mut self, order: OrderId) {
        self.pending_orders.push_back(order);
    }

    pub fn on_bundle_received(&mut self, bundle: Bundle) {
        self.pending_bundles.push_back(bundle);
    }

    /// Put a bundle whose delivery failed back at the head of the queue.
    pub fn requeue_bundle(&mut self, bundle: Bundle) {
        self.pending_bundles.push_front(bundle);
    }

    pub fn on_bot_idle(&mut self, bot: BotId) {
        self.idle_bots.insert(bot);
    }

    /// Take `bot` out of the idle pool.  Returns `false` if it was not idle.
    pub fn withdraw_bot(&mut self, bot: BotId) -> bool {
        self.idle_bots.remove(&bot)
    }

    /// Forget all queued work and idle bots (world rebuild).
    pub fn clear(&mut self) {
        self.pending_orders.clear();
        self.pending_bundles.clear();
        self.idle_bots.clear();
        self.next_task = 0;
    }

    // ── Queries ───────────────────────────────────────────────────────────

    pub fn is_idle(&self, bot: BotId) -> bool {
        self.idle_bots.contains(&bot)
    }

    pub fn idle_bots(&self) -> impl Iterator<Item = BotId> + '_ {
        self.idle_bots.iter().copied()
    }

    /// Unmatched orders, oldest first.
    pub fn pending_orders(&self) -> impl Iterator<Item = OrderId> + '_ {
        self.pending_orders.iter().copied()
    }

    pub fn pending_bundles(&self) -> impl Iterator<Item = &Bundle> + '_ {
        self.pending_bundles.iter()
    }

    pub fn pending_order_count(&self) -> usize {
        self.pending_orders.len()
    }

    pub fn pending_bundle_count(&self) -> usize {
        self.pending_bundles.len()
    }

    // ── Matching ──────────────────────────────────────────────────────────

    /// Run the policy once and turn its matches into tasks.
    ///
    /// Matched orders, bundles and bots leave their queues.  Matches that
    /// reuse a bot or pod, or name work that is not pending, are dropped.
    pub fn tick(&mut self, view: &DispatchView<'_>) -> Vec<Dispatch> {
        if self.idle_bots.is_empty()
            || (self.pending_orders.is_empty() && self.pending_bundles.is_empty())
        {
            return Vec::new();
        }

        let orders: Vec<OrderId> = self.pending_orders.iter().copied().collect();
        let bundles: Vec<Bundle> = self.pending_bundles.iter().cloned().collect();
        let assignments = self.policy.assign(
            &PendingWork { orders: &orders, bundles: &bundles, idle_bots: &self.idle_bots },
            view,
        );

        let mut used_pods: BTreeSet<PodId> = BTreeSet::new();
        let mut taken_orders: BTreeSet<OrderId> = BTreeSet::new();
        let mut taken_bundles: BTreeSet<usize> = BTreeSet::new();
        let mut out = Vec::with_capacity(assignments.len());

        for a in assignments {
            let Assignment { bot, work, pod, station, path } = a;
            let work_free = match work {
                Work::Order(o)  => orders.contains(&o) && !taken_orders.contains(&o),
                Work::Bundle(i) => i < bundles.len() && !taken_bundles.contains(&i),
            };
            if !work_free || !self.idle_bots.contains(&bot) || used_pods.contains(&pod) {
                warn!(%bot, %pod, ?work, "policy returned a conflicting assignment; dropped");
                continue;
            }
            let Some(target) = path.goal() else { continue };

            let kind = match work {
                Work::Order(order) => {
                    taken_orders.insert(order);
                    debug!(%bot, %order, %pod, %station, cost = path.cost, "fetch assigned");
                    TaskKind::FetchPod { order, pod, station }
                }
                Work::Bundle(i) => {
                    taken_bundles.insert(i);
                    let bundle = bundles[i].clone();
                    debug!(%bot, %pod, %station, item = %bundle.item, qty = bundle.qty, "replenish assigned");
                    TaskKind::Replenish { bundle, pod, station }
                }
            };
            self.idle_bots.remove(&bot);
            used_pods.insert(pod);
            let task = Task { id: self.issue_id(), kind, bot, target, assigned_at: view.tick };
            out.push(Dispatch { task, path });
        }

        if !taken_orders.is_empty() {
            self.pending_orders.retain(|o| !taken_orders.contains(o));
        }
        if !taken_bundles.is_empty() {
            self.pending_bundles = std::mem::take(&mut self.pending_bundles)
                .into_iter()
                .enumerate()
                .filter(|(i, _)| !taken_bundles.contains(i))
                .map(|(_, b)| b)
                .collect();
        }
        out
    }

    /// Issue a `ReturnPod` task for the pod `bot` carries, to the slot the
    /// policy picks.  The caller must claim the slot in the pod store.
    ///
    /// Returns `None` if the bot carries nothing or no slot is free and
    /// reachable; the caller retries later.
    pub fn issue_return(&mut self, bot: &Bot, view: &DispatchView<'_>) -> Option<Task> {
        let pod = bot.carried_pod?;
        let slot = self.policy.choose_return_slot(bot, view)?;
        debug!(bot = %bot.id, %pod, %slot, "return issued");
        Some(Task {
            id: self.issue_id(),
            kind: TaskKind::ReturnPod { pod, slot },
            bot: bot.id,
            target: slot,
            assigned_at: view.tick,
        })
    }

    fn issue_id(&mut self) -> TaskId {
        let id = TaskId(self.next_task);
        self.next_task += 1;
        id
    }
}

impl Default for Dispatcher<GreedyPolicy> {
    fn default() -> Self {
        Self::new(GreedyPolicy)
    }
}
