//! Client router: fetch-and-patch navigation without full reloads.
//!
//! A document-level click listener feeds [`Router::handle_click`]; history
//! back/forward feeds [`Router::handle_popstate`]. Qualifying navigations
//! fetch the JSON fragment pair for the target path and surgically patch the
//! managed head region and the page-root subtree. The current path is
//! broadcast through a [`LocationHub`] registered in the binding registry,
//! so location-aware controllers can subscribe before or after the router
//! exists.

use std::sync::Arc;

use parking_lot::Mutex;

use super::dom::{ClickEvent, DomDocument, FetchFragments};
use super::registry::Registry;
use crate::core::{FRAGMENT_SUFFIX, UrlPath};
use crate::debug;

/// Registry key under which the router provides its [`LocationHub`].
pub const LOCATION_KEY: &str = "location";

/// A controller interested in the current location.
pub trait LocationAware: Send + Sync {
    fn location_changed(&self, path: &str);
}

/// Holds the single current path and pushes every change synchronously to
/// all attached controllers.
pub struct LocationHub {
    current: Mutex<String>,
    subscribers: Mutex<Vec<Arc<dyn LocationAware>>>,
}

impl LocationHub {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            current: Mutex::new(initial.into()),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    pub fn current(&self) -> String {
        self.current.lock().clone()
    }

    /// Attach a controller. It receives the current path immediately and
    /// every subsequent change.
    pub fn attach(&self, controller: Arc<dyn LocationAware>) {
        controller.location_changed(&self.current());
        self.subscribers.lock().push(controller);
    }

    /// Record a new path and notify all attached controllers.
    pub fn broadcast(&self, path: &str) {
        *self.current.lock() = path.to_string();
        let subscribers = self.subscribers.lock().clone();
        for subscriber in &subscribers {
            subscriber.location_changed(path);
        }
    }
}

/// Subscribe a controller to the location hub, before or after the router
/// registers it. Early subscriptions queue in the registry and resolve the
/// moment the router provides the hub.
pub fn bind_location(registry: &Registry, controller: Arc<dyn LocationAware>) {
    registry.inject::<LocationHub>(LOCATION_KEY, move |hub| hub.attach(controller));
}

// =============================================================================
// Router
// =============================================================================

pub struct Router<D: DomDocument, F: FetchFragments> {
    dom: D,
    fetch: F,
    hub: Arc<LocationHub>,
}

impl<D: DomDocument, F: FetchFragments> Router<D, F> {
    /// Create the router and provide its location hub through the registry,
    /// resolving any queued subscriptions.
    pub fn new(dom: D, fetch: F, registry: &Registry) -> Self {
        let initial = current_path(&dom).route_path();
        let hub = Arc::new(LocationHub::new(initial));
        registry.provide(LOCATION_KEY, Arc::clone(&hub));
        Self { dom, fetch, hub }
    }

    pub fn hub(&self) -> &Arc<LocationHub> {
        &self.hub
    }

    /// Document-level click handler.
    ///
    /// Only an unmodified primary-button click on a qualifying same-origin
    /// anchor whose URL differs from the current location is intercepted;
    /// everything else is left to default browser navigation.
    pub fn handle_click(&self, event: &ClickEvent) {
        let origin = self.dom.origin();
        let Some(href) = intercept_target(event, &origin) else {
            return;
        };
        if href == self.dom.location_href() {
            return;
        }

        self.dom.push_state(&href);
        let path = href.strip_prefix(origin.as_str()).unwrap_or("/");
        self.navigate(&UrlPath::from_browser(path));
    }

    /// History back/forward: same procedure, no history push.
    pub fn handle_popstate(&self) {
        self.navigate(&current_path(&self.dom));
    }

    /// The navigation procedure.
    ///
    /// Fetches the fragment pair and patches head, page, scripts, and shadow
    /// roots in order, then broadcasts the path and resets scroll. Any
    /// failing step aborts silently; the page root is located before the
    /// head is touched so an abort never leaves a half-patched document.
    pub fn navigate(&self, url: &UrlPath) {
        let path = url.route_path();
        let endpoint = fragment_endpoint(&path);

        let fragment = match self.fetch.fetch(&endpoint) {
            Ok(fragment) => fragment,
            Err(e) => {
                debug!("router"; "fetch failed for `{endpoint}`: {e:#}");
                return;
            }
        };

        if !self.dom.has_page_root() {
            debug!("router"; "page root missing, navigation aborted");
            return;
        }
        if !self.dom.replace_head_region(&fragment.head) {
            return;
        }
        if !self.dom.replace_page(&fragment.page) {
            return;
        }
        self.dom.activate_scripts();
        self.dom.reattach_shadow_roots();

        self.hub.broadcast(&path);
        self.dom.scroll_to_top();
    }
}

/// The current location as a path, origin stripped.
fn current_path<D: DomDocument>(dom: &D) -> UrlPath {
    let href = dom.location_href();
    let origin = dom.origin();
    let path = href.strip_prefix(origin.as_str()).unwrap_or("/");
    UrlPath::from_browser(path)
}

/// Apply the interception rule to a click, returning the href to navigate
/// to when the click qualifies.
fn intercept_target(event: &ClickEvent, origin: &str) -> Option<String> {
    if event.default_prevented || event.button != 0 || event.meta || event.ctrl || event.shift {
        return None;
    }

    let anchor = event.anchor.as_ref()?;
    if anchor.target.as_deref().is_some_and(|t| !t.is_empty())
        || anchor.download
        || anchor.rel.as_deref() == Some("external")
    {
        return None;
    }

    let href = &anchor.href;
    if href.is_empty() || href.contains("mailto:") {
        return None;
    }
    if !href.starts_with(origin) {
        return None;
    }

    Some(href.clone())
}

/// The JSON endpoint for a normalized route path.
fn fragment_endpoint(path: &str) -> String {
    if path == "/" {
        format!("/{FRAGMENT_SUFFIX}")
    } else {
        format!("{path}/{FRAGMENT_SUFFIX}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::dom::AnchorTarget;
    use crate::document::Fragment;
    use anyhow::Result;
    use std::sync::atomic::{AtomicBool, Ordering};

    const ORIGIN: &str = "http://localhost:8000";

    #[derive(Default)]
    struct FakeDom {
        href: Mutex<String>,
        page_root_missing: bool,
        head: Mutex<String>,
        page: Mutex<String>,
        ops: Mutex<Vec<String>>,
    }

    impl FakeDom {
        fn at(path: &str) -> Self {
            Self {
                href: Mutex::new(format!("{ORIGIN}{path}")),
                ..Self::default()
            }
        }

        fn ops(&self) -> Vec<String> {
            self.ops.lock().clone()
        }
    }

    impl DomDocument for FakeDom {
        fn location_href(&self) -> String {
            self.href.lock().clone()
        }
        fn origin(&self) -> String {
            ORIGIN.to_string()
        }
        fn push_state(&self, href: &str) {
            *self.href.lock() = href.to_string();
            self.ops.lock().push(format!("push:{href}"));
        }
        fn has_page_root(&self) -> bool {
            !self.page_root_missing
        }
        fn replace_head_region(&self, head_html: &str) -> bool {
            *self.head.lock() = head_html.to_string();
            self.ops.lock().push("head".to_string());
            true
        }
        fn replace_page(&self, page_html: &str) -> bool {
            *self.page.lock() = page_html.to_string();
            self.ops.lock().push("page".to_string());
            true
        }
        fn activate_scripts(&self) {
            self.ops.lock().push("scripts".to_string());
        }
        fn reattach_shadow_roots(&self) {
            self.ops.lock().push("shadow".to_string());
        }
        fn scroll_to_top(&self) {
            self.ops.lock().push("scroll".to_string());
        }
    }

    struct FakeFetch {
        fail: bool,
        requested: Mutex<Vec<String>>,
    }

    impl FakeFetch {
        fn ok() -> Self {
            Self {
                fail: false,
                requested: Mutex::new(Vec::new()),
            }
        }
        fn failing() -> Self {
            Self {
                fail: true,
                requested: Mutex::new(Vec::new()),
            }
        }
    }

    impl FetchFragments for FakeFetch {
        fn fetch(&self, endpoint: &str) -> Result<Fragment> {
            self.requested.lock().push(endpoint.to_string());
            if self.fail {
                anyhow::bail!("network down");
            }
            Ok(Fragment {
                head: format!("<head><title>{endpoint}</title></head>"),
                page: format!("<body><p>{endpoint}</p></body>"),
            })
        }
    }

    struct Recorder(Mutex<Vec<String>>);

    impl LocationAware for Recorder {
        fn location_changed(&self, path: &str) {
            self.0.lock().push(path.to_string());
        }
    }

    fn click(path: &str) -> ClickEvent {
        ClickEvent::primary(AnchorTarget::href(format!("{ORIGIN}{path}")))
    }

    #[test]
    fn test_interception_rules() {
        let qualifying = click("/about");
        assert!(intercept_target(&qualifying, ORIGIN).is_some());

        let mut modified = click("/about");
        modified.ctrl = true;
        assert!(intercept_target(&modified, ORIGIN).is_none());

        let mut secondary = click("/about");
        secondary.button = 1;
        assert!(intercept_target(&secondary, ORIGIN).is_none());

        let mut prevented = click("/about");
        prevented.default_prevented = true;
        assert!(intercept_target(&prevented, ORIGIN).is_none());

        let no_anchor = ClickEvent {
            anchor: None,
            ..click("/about")
        };
        assert!(intercept_target(&no_anchor, ORIGIN).is_none());

        let mut targeted = click("/about");
        targeted.anchor.as_mut().unwrap().target = Some("_blank".to_string());
        assert!(intercept_target(&targeted, ORIGIN).is_none());

        let mut download = click("/about");
        download.anchor.as_mut().unwrap().download = true;
        assert!(intercept_target(&download, ORIGIN).is_none());

        let mut external = click("/about");
        external.anchor.as_mut().unwrap().rel = Some("external".to_string());
        assert!(intercept_target(&external, ORIGIN).is_none());

        let mailto = ClickEvent::primary(AnchorTarget::href("mailto:x@example.com"));
        assert!(intercept_target(&mailto, ORIGIN).is_none());

        let cross_origin = ClickEvent::primary(AnchorTarget::href("https://other.example/x"));
        assert!(intercept_target(&cross_origin, ORIGIN).is_none());
    }

    #[test]
    fn test_fragment_endpoint() {
        assert_eq!(fragment_endpoint("/"), "/index.json");
        assert_eq!(fragment_endpoint("/about"), "/about/index.json");
    }

    #[test]
    fn test_click_navigation_patches_in_order() {
        let registry = Registry::new();
        let router = Router::new(FakeDom::at("/"), FakeFetch::ok(), &registry);

        router.handle_click(&click("/about"));

        assert_eq!(
            router.dom.ops(),
            [
                format!("push:{ORIGIN}/about"),
                "head".to_string(),
                "page".to_string(),
                "scripts".to_string(),
                "shadow".to_string(),
                "scroll".to_string(),
            ]
        );
        assert_eq!(router.hub().current(), "/about");
        assert_eq!(
            router.fetch.requested.lock().as_slice(),
            ["/about/index.json"]
        );
    }

    #[test]
    fn test_click_on_current_location_is_ignored() {
        let registry = Registry::new();
        let router = Router::new(FakeDom::at("/about"), FakeFetch::ok(), &registry);

        router.handle_click(&click("/about"));
        assert!(router.dom.ops().is_empty());
    }

    #[test]
    fn test_popstate_navigates_without_push() {
        let registry = Registry::new();
        let router = Router::new(FakeDom::at("/about"), FakeFetch::ok(), &registry);

        router.handle_popstate();

        let ops = router.dom.ops();
        assert!(!ops.iter().any(|op| op.starts_with("push:")));
        assert!(ops.contains(&"page".to_string()));
        assert_eq!(router.hub().current(), "/about");
    }

    #[test]
    fn test_fetch_failure_aborts_silently() {
        let registry = Registry::new();
        let router = Router::new(FakeDom::at("/"), FakeFetch::failing(), &registry);

        router.navigate(&UrlPath::from_page("/about"));

        assert!(router.dom.ops().is_empty(), "no DOM mutation on abort");
        assert_eq!(router.hub().current(), "/", "no broadcast on abort");
    }

    #[test]
    fn test_missing_page_root_aborts_before_head_patch() {
        let registry = Registry::new();
        let dom = FakeDom {
            page_root_missing: true,
            ..FakeDom::at("/")
        };
        let router = Router::new(dom, FakeFetch::ok(), &registry);

        router.navigate(&UrlPath::from_page("/about"));

        assert!(router.dom.ops().is_empty(), "head untouched when root missing");
        assert_eq!(router.hub().current(), "/");
    }

    #[test]
    fn test_navigation_normalizes_path() {
        let registry = Registry::new();
        let router = Router::new(FakeDom::at("/"), FakeFetch::ok(), &registry);

        router.navigate(&UrlPath::from_page("/about/index.html"));

        assert_eq!(
            router.fetch.requested.lock().as_slice(),
            ["/about/index.json"]
        );
        assert_eq!(router.hub().current(), "/about");
    }

    #[test]
    fn test_subscriber_before_router_receives_broadcasts() {
        let registry = Registry::new();

        // Subscribe before the router exists: queued in the registry.
        let recorder = Arc::new(Recorder(Mutex::new(Vec::new())));
        bind_location(&registry, recorder.clone());
        assert!(recorder.0.lock().is_empty());

        let router = Router::new(FakeDom::at("/"), FakeFetch::ok(), &registry);
        // Resolved at provide time with the current path.
        assert_eq!(recorder.0.lock().as_slice(), ["/"]);

        router.navigate(&UrlPath::from_page("/about"));
        assert_eq!(recorder.0.lock().as_slice(), ["/", "/about"]);
    }

    #[test]
    fn test_subscriber_after_router() {
        let registry = Registry::new();
        let router = Router::new(FakeDom::at("/items/1"), FakeFetch::ok(), &registry);

        let recorder = Arc::new(Recorder(Mutex::new(Vec::new())));
        bind_location(&registry, recorder.clone());
        assert_eq!(recorder.0.lock().as_slice(), ["/items/1"]);

        router.navigate(&UrlPath::from_page("/items/2"));
        assert_eq!(recorder.0.lock().as_slice(), ["/items/1", "/items/2"]);
    }

    #[test]
    fn test_broadcast_is_synchronous_and_ordered() {
        let hub = LocationHub::new("/");
        let flag = Arc::new(AtomicBool::new(false));

        struct SetFlag(Arc<AtomicBool>);
        impl LocationAware for SetFlag {
            fn location_changed(&self, path: &str) {
                if path == "/done" {
                    self.0.store(true, Ordering::SeqCst);
                }
            }
        }

        hub.attach(Arc::new(SetFlag(flag.clone())));
        hub.broadcast("/done");
        assert!(flag.load(Ordering::SeqCst));
        assert_eq!(hub.current(), "/done");
    }
}
