//! Single-threaded broadcast drivers: the per-frame ticker and the scroll
//! driver.
//!
//! A listener stays attached for as long as its [`Subscription`] is alive.
//! Dropping the handle detaches it, so teardown follows scope exit.

use crate::transform::Viewport;

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::trace;

type Listener<T> = Rc<RefCell<dyn FnMut(&T)>>;

struct Registry<T> {
    next_id: u64,
    listeners: Vec<(u64, Listener<T>)>,
}

pub struct Driver<T> {
    registry: Rc<RefCell<Registry<T>>>,
}

impl<T> Default for Driver<T> {
    fn default() -> Self {
        Self {
            registry: Rc::new(RefCell::new(Registry {
                next_id: 0,
                listeners: Vec::new(),
            })),
        }
    }
}

impl<T: 'static> fmt::Debug for Driver<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Driver")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl<T: 'static> Driver<T> {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "the listener is detached as soon as the subscription is dropped"]
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: FnMut(&T) + 'static,
    {
        let mut registry = self.registry.borrow_mut();
        let id = registry.next_id;
        registry.next_id += 1;
        let listener: Listener<T> = Rc::new(RefCell::new(listener));
        registry.listeners.push((id, listener));
        trace!(id, "listener attached");

        let weak: Weak<RefCell<Registry<T>>> = Rc::downgrade(&self.registry);
        Subscription {
            detach: Some(Box::new(move || {
                if let Some(registry) = weak.upgrade() {
                    registry.borrow_mut().listeners.retain(|(l, _)| *l != id);
                    trace!(id, "listener detached");
                }
            })),
        }
    }

    /// Delivers one sample to every attached listener. Listeners attached or
    /// detached while this runs take effect from the next emit.
    pub fn emit(&self, sample: &T) {
        let listeners: Vec<Listener<T>> = self
            .registry
            .borrow()
            .listeners
            .iter()
            .map(|(_, l)| Rc::clone(l))
            .collect();
        for listener in listeners {
            // A listener that re-enters emit from its own callback is skipped.
            if let Ok(mut callback) = listener.try_borrow_mut() {
                (&mut *callback)(sample);
            }
        }
    }

    pub fn listener_count(&self) -> usize {
        self.registry.borrow().listeners.len()
    }
}

/// Detach handle returned by [`Driver::subscribe`].
pub struct Subscription {
    detach: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Detaches now. Equivalent to dropping the handle.
    pub fn detach(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("attached", &self.detach.is_some())
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

/// One rendered frame; `time` is the ticker's clock in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub time: f64,
    pub delta: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollSample {
    /// Progress through the pinned region, in `[0, 1]`.
    pub progress: f64,
    pub viewport: Viewport,
}

pub type FrameTicker = Driver<Frame>;
pub type ScrollDriver = Driver<ScrollSample>;
