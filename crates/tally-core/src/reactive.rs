//! Dependency graph and write batching.
//!
//! Signal reads made while an observer is running are recorded as edges
//! `signal -> observer`. When a signal changes, every observer that read it is
//! re-run under tracking (its old edges are dropped first).
//!
//! Writes made inside [`batch`] are not applied immediately: they are queued
//! in order and applied at commit, when the outermost batch returns. Reads
//! during a batch therefore observe the last committed value, while queued
//! read-modify-write updates each see the result of the one before them.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet, VecDeque};
use std::rc::Rc;

use slotmap::{SlotMap, new_key_type};
use smallvec::SmallVec;

pub type SignalId = usize;

new_key_type! {
    pub struct ObserverId;
}

type PendingWrite = (SignalId, Box<dyn FnOnce()>);

thread_local! {
    static CURRENT_OBSERVER: Cell<Option<ObserverId>> = const { Cell::new(None) };
    static GRAPH: RefCell<DepGraph> = RefCell::new(DepGraph::default());
    static NEXT_SIGNAL: Cell<SignalId> = const { Cell::new(0) };
    static BATCH: RefCell<BatchQueue> = RefCell::new(BatchQueue::default());
}

#[derive(Default)]
struct DepGraph {
    // signal_id -> observers that depend on it
    edges: HashMap<SignalId, HashSet<ObserverId>>,
    // observer_id -> signals it depends on
    back: HashMap<ObserverId, HashSet<SignalId>>,
    observers: SlotMap<ObserverId, Rc<dyn Fn()>>,
    running: HashSet<ObserverId>,
}

impl DepGraph {
    fn remove_all_edges_for(&mut self, obs: ObserverId) {
        if let Some(signals) = self.back.remove(&obs) {
            for s in signals {
                if let Some(set) = self.edges.get_mut(&s) {
                    set.remove(&obs);
                }
            }
        }
    }

    fn remove_observer(&mut self, obs: ObserverId) {
        self.observers.remove(obs);
        self.remove_all_edges_for(obs);
        self.running.remove(&obs);
    }
}

#[derive(Default)]
struct BatchQueue {
    depth: usize,
    queue: VecDeque<PendingWrite>,
}

pub(crate) fn next_signal_id() -> SignalId {
    NEXT_SIGNAL.with(|n| {
        let id = n.get();
        n.set(id + 1);
        id
    })
}

pub fn register_signal_read(sig: SignalId) {
    if let Some(obs) = CURRENT_OBSERVER.get() {
        GRAPH.with_borrow_mut(|g| {
            if g.observers.contains_key(obs) {
                g.edges.entry(sig).or_default().insert(obs);
                g.back.entry(obs).or_default().insert(sig);
            }
        });
    }
}

/// Re-runs every observer that read `sig` during its last run.
pub fn signal_changed(sig: SignalId) {
    let queue: Vec<ObserverId> = GRAPH.with_borrow(|g| {
        g.edges
            .get(&sig)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    });

    for obs in queue {
        // an observer that writes a signal it reads must not re-enter itself
        let started = GRAPH.with_borrow_mut(|g| g.running.insert(obs));
        if !started {
            continue;
        }
        run_observer_now(obs);
        GRAPH.with_borrow_mut(|g| {
            g.running.remove(&obs);
        });
    }
}

pub fn new_observer(f: impl Fn() + 'static) -> ObserverId {
    GRAPH.with_borrow_mut(|g| g.observers.insert(Rc::new(f)))
}

/// Remove an observer and all of its dependency edges.
pub fn remove_observer(id: ObserverId) {
    GRAPH.with_borrow_mut(|g| g.remove_observer(id));
}

pub fn observer_dependencies(id: ObserverId) -> usize {
    GRAPH.with_borrow(|g| g.back.get(&id).map_or(0, HashSet::len))
}

struct RestoreObserver(Option<ObserverId>);

impl Drop for RestoreObserver {
    fn drop(&mut self) {
        CURRENT_OBSERVER.set(self.0);
    }
}

/// Runs `f` with `obs` as the current observer. Edges recorded by the
/// observer's previous run are dropped first.
pub fn track<R>(obs: ObserverId, f: impl FnOnce() -> R) -> R {
    GRAPH.with_borrow_mut(|g| g.remove_all_edges_for(obs));
    let _restore = RestoreObserver(CURRENT_OBSERVER.replace(Some(obs)));
    f()
}

/// Runs `f` with dependency tracking suspended.
pub fn untracked<R>(f: impl FnOnce() -> R) -> R {
    let _restore = RestoreObserver(CURRENT_OBSERVER.replace(None));
    f()
}

pub fn run_observer_now(id: ObserverId) {
    let f = GRAPH.with_borrow(|g| g.observers.get(id).cloned());
    if let Some(f) = f {
        track(id, || f());
    }
}

struct BatchGuard;

impl Drop for BatchGuard {
    fn drop(&mut self) {
        let dropped = BATCH.with_borrow_mut(|b| {
            b.depth -= 1;
            if b.depth == 0 && std::thread::panicking() {
                let n = b.queue.len();
                b.queue.clear();
                n
            } else {
                0
            }
        });
        if dropped > 0 {
            log::warn!("batch unwound by a panic; discarded {dropped} queued writes");
        }
    }
}

/// Runs `f` with writes deferred. The outermost batch commits on return.
pub fn batch<R>(f: impl FnOnce() -> R) -> R {
    BATCH.with_borrow_mut(|b| b.depth += 1);
    let out = {
        let _guard = BatchGuard;
        f()
    };
    if !is_batching() {
        commit();
    }
    out
}

pub fn is_batching() -> bool {
    BATCH.with_borrow(|b| b.depth > 0)
}

pub fn pending_writes() -> usize {
    BATCH.with_borrow(|b| b.queue.len())
}

/// Queues `apply` when batching, otherwise applies it and notifies observers.
pub fn write(sig: SignalId, apply: impl FnOnce() + 'static) {
    let immediate = BATCH.with_borrow_mut(|b| {
        if b.depth > 0 {
            let boxed: Box<dyn FnOnce()> = Box::new(apply);
            b.queue.push_back((sig, boxed));
            None
        } else {
            Some(apply)
        }
    });
    if let Some(apply) = immediate {
        apply();
        signal_changed(sig);
    }
}

/// Applies queued writes in order, then notifies each changed signal once.
///
/// Observers run after the whole queue has been applied, so they see the
/// final committed values. Their own writes are committed in a further round.
fn commit() {
    let pending: Vec<PendingWrite> = BATCH.with_borrow_mut(|b| b.queue.drain(..).collect());
    if pending.is_empty() {
        return;
    }

    let mut changed: SmallVec<[SignalId; 8]> = SmallVec::new();
    for (sig, apply) in pending {
        apply();
        if !changed.contains(&sig) {
            changed.push(sig);
        }
    }
    log::trace!("commit: {} signal(s) changed", changed.len());

    batch(|| {
        for sig in changed {
            signal_changed(sig);
        }
    });
}
