//! Client-side subsystems: lazy hydration, navigation, and the binding
//! registry that decouples them from consuming controllers.
//!
//! Everything here is DOM-agnostic. Ordering, state machines, and decision
//! rules live in Rust behind the [`dom`] trait seams; platform glue supplies
//! the actual document operations and the intersection primitive.

pub mod dom;
pub mod hydrate;
pub mod registry;
pub mod router;

pub use dom::{AnchorTarget, ClickEvent, DomDocument, FetchFragments};
pub use hydrate::{HostElement, HydrationState, LazyController, VisibilityObserver};
pub use registry::Registry;
pub use router::{LOCATION_KEY, LocationAware, LocationHub, Router, bind_location};
