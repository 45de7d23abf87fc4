//! Lazy hydration state machine.
//!
//! Server-rendered elements arrive inert. Each element's [`LazyController`]
//! walks it forward through the hydration states - never backward - and a
//! single shared [`VisibilityObserver`] defers the expensive steps until the
//! element scrolls near the viewport:
//!
//! ```text
//! Uninitialized -> NeedsShadowRoot   first child is a shadow transport template
//! Uninitialized -> NeedsHydration    a real shadow root already exists
//! Uninitialized -> Ready             no server-rendered content to reconcile
//! NeedsShadowRoot -> NeedsHydration  template content moved into a shadow root
//! NeedsHydration -> Ready            live output reconciled against the DOM
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

/// Observer margin: elements start hydrating this many pixels before they
/// enter the viewport.
pub const ROOT_MARGIN_PX: u32 = 50;

/// Observer threshold: any intersection counts.
pub const THRESHOLD: f64 = 0.0;

/// Lifecycle states between server-rendered-but-inert and interactive.
/// State only advances; re-entering an earlier state is never valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HydrationState {
    Uninitialized,
    NeedsShadowRoot,
    NeedsHydration,
    Ready,
}

/// The element a controller drives. DOM access lives behind this seam; the
/// controller owns ordering and state.
pub trait HostElement: Send + Sync {
    /// First child is a `<template shadowroot>` transport - the server
    /// flattened a shadow tree into light DOM.
    fn has_shadow_template(&self) -> bool;

    /// A real shadow root is already attached (declarative shadow DOM
    /// supported natively).
    fn has_shadow_root(&self) -> bool;

    /// Attach a real shadow root, move the transport template's content into
    /// it, and remove the template. Returns `false` when no template exists.
    fn attach_shadow_from_template(&self) -> bool;

    /// Reconcile live render output against the existing DOM under the
    /// shadow root, preserving event listeners.
    fn hydrate(&self);

    /// Render through the normal update path.
    fn render(&self);

    /// Element opts out of lazy hydration and hydrates eagerly.
    fn eager(&self) -> bool {
        false
    }
}

/// Anything the visibility observer can wake. One-shot.
pub trait Observed: Send + Sync {
    fn on_visible(&self);
}

// =============================================================================
// Shared visibility observer
// =============================================================================

/// A single observer shared across all lazy elements, constructed by the
/// application and passed down.
///
/// The platform's intersection primitive drives it: glue code calls
/// [`element_visible`](Self::element_visible) when a registered element
/// intersects the viewport. Registration is one-shot - a visible element is
/// deregistered before it is woken.
#[derive(Default)]
pub struct VisibilityObserver {
    observed: Mutex<FxHashMap<u64, Weak<dyn Observed>>>,
}

impl VisibilityObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&self, id: u64, target: Weak<dyn Observed>) {
        self.observed.lock().insert(id, target);
    }

    pub fn unobserve(&self, id: u64) {
        self.observed.lock().remove(&id);
    }

    /// Platform callback: the element registered under `id` became visible.
    pub fn element_visible(&self, id: u64) {
        // Deregister first - the wake is one-shot.
        let target = self.observed.lock().remove(&id);
        if let Some(target) = target.and_then(|weak| weak.upgrade()) {
            target.on_visible();
        }
    }

    pub fn observed_len(&self) -> usize {
        self.observed.lock().len()
    }
}

// =============================================================================
// Controller
// =============================================================================

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

struct Inner {
    state: HydrationState,
    first_update: bool,
}

/// Per-element hydration controller.
pub struct LazyController<H: HostElement> {
    id: u64,
    host: H,
    /// Single lock: every check-then-set transition is one atomic step, so
    /// racing trigger paths (eager opt-in vs visibility) cannot interleave.
    inner: Mutex<Inner>,
}

impl<H: HostElement> LazyController<H> {
    /// Create a controller, choosing the initial state from the host's
    /// server-rendered content.
    pub fn new(host: H) -> Self {
        let state = if host.has_shadow_template() {
            HydrationState::NeedsShadowRoot
        } else if host.has_shadow_root() {
            HydrationState::NeedsHydration
        } else {
            // Client-only mount: nothing to reconcile.
            HydrationState::Ready
        };

        Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            host,
            inner: Mutex::new(Inner {
                state,
                first_update: true,
            }),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn state(&self) -> HydrationState {
        self.inner.lock().state
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Move the shadow transport template into a real shadow root.
    ///
    /// No-op outside `NeedsShadowRoot`. When the template is unexpectedly
    /// missing, skip straight to `Ready` rather than hydrating against a
    /// root that does not exist.
    pub fn convert_shadow_root(&self) {
        let mut inner = self.inner.lock();
        if inner.state != HydrationState::NeedsShadowRoot {
            return;
        }
        if !self.host.attach_shadow_from_template() {
            inner.state = HydrationState::Ready;
            return;
        }
        inner.state = HydrationState::NeedsHydration;
    }

    /// Reconcile live output against the server-rendered shadow DOM.
    ///
    /// No-op outside `NeedsHydration`; a second invocation after `Ready`
    /// performs no DOM work.
    pub fn hydrate(&self) {
        let mut inner = self.inner.lock();
        if inner.state != HydrationState::NeedsHydration {
            return;
        }
        self.host.hydrate();
        inner.state = HydrationState::Ready;
    }

    /// The visibility wake: convert the shadow root, then hydrate.
    pub fn on_visible(&self) {
        self.convert_shadow_root();
        self.hydrate();
    }

    /// Reactive update from the host's component system.
    ///
    /// The very first update below `Ready` is suppressed (unless eager) so a
    /// redundant from-scratch render cannot race the visibility-triggered
    /// hydration. Later updates walk the remaining states, then render
    /// through the normal path.
    pub fn update(&self) {
        {
            let mut inner = self.inner.lock();
            let first = inner.first_update;
            inner.first_update = false;
            if first && inner.state < HydrationState::Ready && !self.host.eager() {
                return;
            }
        }

        self.convert_shadow_root();
        self.hydrate();
        if self.state() == HydrationState::Ready {
            self.host.render();
        }
    }

    /// Deregister from the shared observer on disconnect.
    pub fn disconnect(&self, observer: Option<&VisibilityObserver>) {
        if let Some(observer) = observer {
            observer.unobserve(self.id);
        }
    }
}

impl<H: HostElement + 'static> LazyController<H> {
    /// Connect the element: register with the shared observer, or hydrate
    /// immediately when no visibility primitive exists or the host opted
    /// out of laziness.
    pub fn connect(self: &Arc<Self>, observer: Option<&VisibilityObserver>) {
        if self.state() == HydrationState::Ready {
            return;
        }

        match observer {
            Some(observer) if !self.host.eager() => {
                let this: Arc<dyn Observed> = self.clone();
                let weak: Weak<dyn Observed> = Arc::downgrade(&this);
                observer.observe(self.id, weak);
            }
            _ => self.on_visible(),
        }
    }
}

impl<H: HostElement + 'static> Observed for LazyController<H> {
    fn on_visible(&self) {
        LazyController::on_visible(self);
    }
}
