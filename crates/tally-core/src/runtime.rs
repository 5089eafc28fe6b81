use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::reactive::{self, ObserverId};
use crate::scope::Scope;
use crate::semantics::{Role, SemanticsFlags};
use crate::{CoreError, Scene, View, ViewId, chrome, effects};

/// Upper bound on composition passes per frame. Effects that keep changing
/// state they also read would otherwise never settle.
pub const MAX_COMPOSE_PASSES: usize = 8;

thread_local! {
    pub static COMPOSER: RefCell<Composer> = RefCell::new(Composer::default());
}

#[derive(Default)]
pub struct Composer {
    pub slots: Vec<Box<dyn Any>>,
    pub cursor: usize,
    pub keyed_slots: HashMap<String, Box<dyn Any>>,
}

pub struct ComposeGuard {
    _private: (),
}

impl ComposeGuard {
    pub fn begin() -> Self {
        COMPOSER.with_borrow_mut(|c| c.cursor = 0);
        ComposeGuard { _private: () }
    }
}

/// Slot-based remember (sequential composition only)
pub fn remember<T: 'static>(init: impl FnOnce() -> T) -> Rc<T> {
    COMPOSER.with_borrow_mut(|c| {
        let cursor = c.cursor;
        c.cursor += 1;

        if cursor >= c.slots.len() {
            let rc: Rc<T> = Rc::new(init());
            c.slots.push(Box::new(rc.clone()));
            return rc;
        }

        if let Some(rc) = c.slots[cursor].downcast_ref::<Rc<T>>() {
            rc.clone()
        } else {
            log::warn!(
                "remember: slot {cursor} type changed; replacing. \
                 If this is due to conditional composition, prefer remember_with_key."
            );
            let rc: Rc<T> = Rc::new(init());
            c.slots[cursor] = Box::new(rc.clone());
            rc
        }
    })
}

/// Key-based remember
pub fn remember_with_key<T: 'static>(key: impl Into<String>, init: impl FnOnce() -> T) -> Rc<T> {
    COMPOSER.with_borrow_mut(|c| {
        let key = key.into();

        if let Some(existing) = c.keyed_slots.get(&key) {
            if let Some(rc) = existing.downcast_ref::<Rc<T>>() {
                return rc.clone();
            }
            log::warn!("remember_with_key: key '{key}' reused with a different type; replacing.");
        }

        let rc: Rc<T> = Rc::new(init());
        c.keyed_slots.insert(key, Box::new(rc.clone()));
        rc
    })
}

/// Drops every remembered slot. Values are released outside the composer
/// borrow so their destructors may touch the runtime.
fn forget_all() -> usize {
    let (slots, keyed) = COMPOSER.with_borrow_mut(|c| {
        c.cursor = 0;
        (
            std::mem::take(&mut c.slots),
            std::mem::take(&mut c.keyed_slots),
        )
    });
    let n = slots.len() + keyed.len();
    drop(slots);
    drop(keyed);
    n
}

/// Frame: output of composition for a tick (scene + input/semantics).
pub struct Frame {
    pub scene: Scene,
    pub hit_regions: Vec<HitRegion>,
    pub semantics_nodes: Vec<SemNode>,
    pub focus_chain: Vec<ViewId>,
    /// Title requested by views or effects while producing this frame.
    pub title: Option<String>,
    /// Composition passes it took to settle.
    pub passes: usize,
}

impl Frame {
    pub fn hit(&self, id: ViewId) -> Option<&HitRegion> {
        self.hit_regions.iter().find(|h| h.id == id)
    }

    pub fn semantics(&self, id: ViewId) -> Option<&SemNode> {
        self.semantics_nodes.iter().find(|n| n.id == id)
    }

    pub fn find_by_tag(&self, tag: &str) -> Option<&SemNode> {
        self.semantics_nodes
            .iter()
            .find(|n| n.test_tag.as_deref() == Some(tag))
    }

    pub fn find_by_role(&self, role: Role) -> impl Iterator<Item = &SemNode> {
        self.semantics_nodes.iter().filter(move |n| n.role == role)
    }
}

#[derive(Clone)]
pub struct HitRegion {
    pub id: ViewId,
    pub on_click: Option<Rc<dyn Fn()>>,
    pub on_text_change: Option<Rc<dyn Fn(String)>>,
    pub focusable: bool,
    /// If this hit region belongs to a TextField, this persistent key is used
    /// for looking up platform-managed TextFieldState. Falls back to `id` if None.
    pub tf_state_key: Option<u64>,
}

/// Flattened semantics node produced by `layout_and_paint`.
#[derive(Clone, Debug)]
pub struct SemNode {
    pub id: ViewId,
    pub role: Role,
    pub label: Option<String>,
    /// Current content for value-bearing nodes (text fields, text areas).
    pub value: Option<String>,
    pub test_tag: Option<String>,
    /// Sibling identity from `Modifier::key`.
    pub key: Option<String>,
    pub flags: SemanticsFlags,
}

impl SemNode {
    pub fn focused(&self) -> bool {
        self.flags.contains(SemanticsFlags::FOCUSED)
    }

    pub fn enabled(&self) -> bool {
        self.flags.contains(SemanticsFlags::ENABLED)
    }
}

/// Drives composition: owns the root scope and the observer that tracks
/// which signals the last composition read.
///
/// Remembered state lives in thread-local slots, so one scheduler is mounted
/// per thread.
pub struct Scheduler {
    next_id: u64,
    pub focused: Option<ViewId>,
    scope: Scope,
    observer: ObserverId,
    invalidated: Rc<Cell<bool>>,
    mounted: bool,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        let invalidated = Rc::new(Cell::new(true));
        let observer = reactive::new_observer({
            let invalidated = invalidated.clone();
            move || invalidated.set(true)
        });
        Self {
            next_id: 1,
            focused: None,
            scope: Scope::new(),
            observer,
            invalidated,
            mounted: false,
        }
    }

    pub fn id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// True when state read by the last composition has since been committed.
    pub fn is_invalidated(&self) -> bool {
        self.invalidated.get()
    }

    pub fn invalidate(&self) {
        self.invalidated.set(true);
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Builds the root, flushes effects, and repeats until no committed write
    /// touches state the composition read. Then paints the settled tree.
    pub fn compose<F, P>(&mut self, mut build_root: F, layout_paint: P) -> Result<Frame, CoreError>
    where
        F: FnMut(&mut Scheduler) -> View,
        P: FnOnce(&View, Option<ViewId>) -> (Scene, Vec<HitRegion>, Vec<SemNode>),
    {
        let observer = self.observer;
        let scope = self.scope.clone();

        for pass in 1..=MAX_COMPOSE_PASSES {
            self.invalidated.set(false);
            let root = {
                let _guard = ComposeGuard::begin();
                reactive::batch(|| reactive::track(observer, || scope.run(|| build_root(self))))
            };
            self.mounted = true;

            let ran = effects::flush_effects();
            if ran > 0 {
                log::debug!("composition pass {pass}: ran {ran} effect(s)");
            }
            if self.invalidated.get() {
                log::debug!("composition pass {pass} invalidated; recomposing");
                continue;
            }

            let (scene, hit_regions, semantics_nodes) = layout_paint(&root, self.focused);
            let focus_chain = hit_regions
                .iter()
                .filter(|h| h.focusable)
                .map(|h| h.id)
                .collect();

            return Ok(Frame {
                scene,
                hit_regions,
                semantics_nodes,
                focus_chain,
                title: chrome::take_window_title(),
                passes: pass,
            });
        }

        Err(CoreError::RecompositionLimit(MAX_COMPOSE_PASSES))
    }

    /// Runs an event handler as one batch; its writes commit when it returns.
    pub fn dispatch<R>(&mut self, handler: impl FnOnce() -> R) -> R {
        reactive::batch(handler)
    }

    /// Tears down everything composition created: scope disposers first, then
    /// remembered state. The next `compose` mounts from scratch.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        let scope = std::mem::take(&mut self.scope);
        scope.dispose();
        let dropped_effects = effects::discard_pending_effects();
        let slots = forget_all();
        self.mounted = false;
        self.focused = None;
        self.invalidated.set(true);
        log::info!("unmounted: released {slots} slot(s), dropped {dropped_effects} pending effect(s)");
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.unmount();
        reactive::remove_observer(self.observer);
    }
}
