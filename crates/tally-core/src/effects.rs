//! Effects: side work tied to composition.
//!
//! `effect` runs immediately. The keyed variants (`launched_effect!`,
//! `disposable_effect`) compare their key against the previous composition
//! pass and, when it differs, queue the work until the pass has committed.
//! The scheduler drains that queue with [`flush_effects`] inside a batch.

use std::cell::RefCell;
use std::rc::Rc;

use crate::{reactive, remember, remember_with_key, scoped_effect};

thread_local! {
    static PENDING_EFFECTS: RefCell<Vec<Box<dyn FnOnce()>>> = const { RefCell::new(Vec::new()) };
}

#[derive(Clone)]
pub struct Dispose(Rc<RefCell<Option<Box<dyn FnOnce()>>>>);

impl Dispose {
    pub fn new(f: impl FnOnce() + 'static) -> Self {
        Self(Rc::new(RefCell::new(Some(Box::new(f)))))
    }

    pub fn noop() -> Self {
        Self(Rc::new(RefCell::new(None)))
    }

    /// Runs at most once (safe to call multiple times).
    pub fn run(&self) {
        let f = self.0.borrow_mut().take();
        if let Some(f) = f {
            f()
        }
    }

    pub fn is_spent(&self) -> bool {
        self.0.borrow().is_none()
    }
}

/// Runs `f()` immediately and returns its `Dispose`, also registered with the
/// current scope when there is one.
pub fn effect<F>(f: F) -> Dispose
where
    F: FnOnce() -> Dispose + 'static,
{
    let d = f();
    if let Some(scope) = crate::scope::current_scope() {
        let d2 = d.clone();
        scope.add_disposer(move || d2.run());
    }
    d
}

/// Helper to register cleanup inside effect.
pub fn on_unmount(f: impl FnOnce() + 'static) -> Dispose {
    Dispose::new(f)
}

fn defer(f: impl FnOnce() + 'static) {
    PENDING_EFFECTS.with_borrow_mut(|q| q.push(Box::new(f)));
}

pub fn pending_effects() -> usize {
    PENDING_EFFECTS.with_borrow(|q| q.len())
}

pub(crate) fn discard_pending_effects() -> usize {
    PENDING_EFFECTS.with_borrow_mut(|q| {
        let n = q.len();
        q.clear();
        n
    })
}

/// Runs queued effects in registration order inside one batch. Effects queued
/// while flushing run in the same flush. Returns how many ran.
pub fn flush_effects() -> usize {
    let mut ran = 0;
    reactive::batch(|| {
        loop {
            let queued = PENDING_EFFECTS.with_borrow_mut(std::mem::take);
            if queued.is_empty() {
                break;
            }
            for effect in queued {
                reactive::untracked(effect);
                ran += 1;
            }
        }
    });
    ran
}

/// Cleanup on key change or unmount. Slot-based: call it unconditionally.
pub fn disposable_effect<K: PartialEq + Clone + 'static>(
    key: K,
    effect: impl FnOnce() -> Dispose + 'static,
) {
    let last_key = remember(|| RefCell::new(None::<K>));
    let cleanup_slot = remember(|| RefCell::new(None::<Dispose>));
    let installed = remember(|| RefCell::new(false));

    // a single unmount disposer per callsite
    if !installed.replace(true) {
        let cleanup_slot = cleanup_slot.clone();
        scoped_effect(move || {
            on_unmount(move || {
                if let Some(d) = cleanup_slot.borrow_mut().take() {
                    d.run();
                }
            })
        });
    }

    let changed = last_key.borrow().as_ref() != Some(&key);
    if changed {
        *last_key.borrow_mut() = Some(key);
        defer(move || {
            let previous = cleanup_slot.borrow_mut().take();
            if let Some(d) = previous {
                d.run();
            }
            let d = effect();
            *cleanup_slot.borrow_mut() = Some(d);
        });
    }
}

/// Internal implementation: keyed by a per-callsite id string.
pub fn launched_effect_internal<K: PartialEq + Clone + 'static>(
    callsite: &'static str,
    key: K,
    effect: impl FnOnce() + 'static,
) {
    let last_key = remember_with_key(format!("launched:{callsite}"), || RefCell::new(None::<K>));

    let mut last = last_key.borrow_mut();
    if last.as_ref() != Some(&key) {
        *last = Some(key);
        defer(effect);
    }
}

/// Runs `$effect` after the current composition pass commits, on first
/// composition and whenever `$key` (the watched values) changes.
#[macro_export]
macro_rules! launched_effect {
    ($key:expr, $effect:expr) => {
        $crate::effects::launched_effect_internal(
            concat!(module_path!(), ":", line!(), ":", column!()),
            $key,
            $effect,
        )
    };
}
