use std::cell::RefCell;
use std::rc::Rc;

use crate::reactive::{self, SignalId};

pub type SubId = usize;

/// Cloneable handle to a piece of observable state.
///
/// Writes go through [`reactive::write`]: inside a batch they are queued and
/// applied at commit, outside a batch they apply immediately.
pub struct Signal<T: 'static>(Rc<Shared<T>>);

struct Shared<T> {
    id: SignalId,
    inner: RefCell<Inner<T>>,
}

struct Inner<T> {
    value: T,
    subs: Vec<Box<dyn Fn(&T)>>,
}

impl<T: 'static> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: 'static> Signal<T> {
    pub fn new(value: T) -> Self {
        Self(Rc::new(Shared {
            id: reactive::next_signal_id(),
            inner: RefCell::new(Inner {
                value,
                subs: Vec::new(),
            }),
        }))
    }

    pub fn id(&self) -> SignalId {
        self.0.id
    }

    /// Last committed value. Registers a dependency on the current observer.
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        reactive::register_signal_read(self.0.id);
        self.0.inner.borrow().value.clone()
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        reactive::register_signal_read(self.0.id);
        f(&self.0.inner.borrow().value)
    }

    pub fn set(&self, v: T) {
        self.update(move |slot| *slot = v);
    }

    /// Read-modify-write against the latest value at the time it is applied,
    /// including writes queued earlier in the same batch.
    pub fn update(&self, f: impl FnOnce(&mut T) + 'static) {
        let this = self.clone();
        reactive::write(self.0.id, move || this.apply(f));
    }

    /// Subscribers run right after each applied write. They must not write
    /// back into this signal outside a batch.
    pub fn subscribe(&self, f: impl Fn(&T) + 'static) -> SubId {
        let mut inner = self.0.inner.borrow_mut();
        inner.subs.push(Box::new(f));
        inner.subs.len() - 1
    }

    fn apply(&self, f: impl FnOnce(&mut T)) {
        f(&mut self.0.inner.borrow_mut().value);
        let inner = self.0.inner.borrow();
        for s in &inner.subs {
            s(&inner.value);
        }
    }
}

impl<T: std::fmt::Debug + 'static> std::fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("id", &self.0.id)
            .field("value", &self.0.inner.borrow().value)
            .finish()
    }
}

pub fn signal<T: 'static>(t: T) -> Signal<T> {
    Signal::new(t)
}
