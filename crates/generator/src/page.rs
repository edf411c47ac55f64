use site_kit_core::types::{Metadata, Script, Translations};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// A statically linked page definition.
///
/// This is the component-renderer seam: anything that turns one locale's
/// translations into a static HTML fragment satisfies the contract. A panic
/// in `render` or `metadata` is a rendering failure surfaced to the caller,
/// not recovered here.
pub trait Page: Send + Sync {
    /// Render the page body for one locale's translations.
    fn render(&self, translations: &Translations) -> String;

    /// Page metadata derived from the translations, if the page declares any.
    fn metadata(&self, _translations: &Translations) -> Option<Metadata> {
        None
    }

    /// Script tags emitted around the page content, if the page declares any.
    fn scripts(&self) -> Option<Script> {
        None
    }
}

/// Routes are relative paths without extension: "index" for the root page,
/// "about", "blog/index", "blog/post". Leading and trailing slashes are
/// stripped, an empty route means "index".
fn normalize_route(route: &str) -> String {
    let trimmed = route.trim_matches('/');
    if trimmed.is_empty() {
        "index".to_string()
    } else {
        trimmed.to_string()
    }
}

/// One immutable set of pages, keyed by route.
#[derive(Clone, Default)]
pub struct PageRegistry {
    version: u64,
    pages: HashMap<String, Arc<dyn Page>>,
}

impl PageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, route: &str, page: impl Page + 'static) {
        self.pages.insert(normalize_route(route), Arc::new(page));
    }

    pub fn get(&self, route: &str) -> Option<Arc<dyn Page>> {
        self.pages.get(&normalize_route(route)).cloned()
    }

    /// All registered routes in deterministic order.
    pub fn routes(&self) -> Vec<String> {
        let mut routes: Vec<String> = self.pages.keys().cloned().collect();
        routes.sort();
        routes
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn version(&self) -> u64 {
        self.version
    }
}

/// Factory reconstructing the page set, called once at startup and again on
/// every watched file change.
pub type RegistryBuilder = Arc<dyn Fn() -> PageRegistry + Send + Sync>;

/// Versioned registry with atomic swap.
///
/// Dev serving reads a snapshot per request, so every render sees one
/// consistent page set while the watcher replaces the registry underneath.
pub struct SharedRegistry {
    builder: RegistryBuilder,
    current: RwLock<Arc<PageRegistry>>,
}

impl SharedRegistry {
    pub fn new(builder: RegistryBuilder) -> Self {
        let mut first = (builder)();
        first.version = 1;
        Self {
            builder,
            current: RwLock::new(Arc::new(first)),
        }
    }

    /// The current page set. Holders keep rendering against it even after a
    /// swap replaces the registry.
    pub fn snapshot(&self) -> Arc<PageRegistry> {
        self.current.read().expect("registry lock poisoned").clone()
    }

    /// Rebuild the page set and publish it with a bumped version.
    pub fn swap(&self) {
        let next_version = self.snapshot().version + 1;
        let mut next = (self.builder)();
        next.version = next_version;
        *self.current.write().expect("registry lock poisoned") = Arc::new(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticPage(&'static str);

    impl Page for StaticPage {
        fn render(&self, _translations: &Translations) -> String {
            self.0.to_string()
        }
    }

    #[test]
    fn test_normalize_route() {
        assert_eq!(normalize_route("about"), "about");
        assert_eq!(normalize_route("/about/"), "about");
        assert_eq!(normalize_route("blog/post"), "blog/post");
        assert_eq!(normalize_route(""), "index");
        assert_eq!(normalize_route("/"), "index");
    }

    #[test]
    fn test_registry_lookup_normalizes() {
        let mut registry = PageRegistry::new();
        registry.insert("/about/", StaticPage("a"));
        assert!(registry.get("about").is_some());
        assert!(registry.get("/about").is_some());
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_routes_are_sorted() {
        let mut registry = PageRegistry::new();
        registry.insert("b", StaticPage("b"));
        registry.insert("a", StaticPage("a"));
        registry.insert("index", StaticPage("i"));
        assert_eq!(registry.routes(), vec!["a", "b", "index"]);
    }

    #[test]
    fn test_shared_registry_swap_bumps_version() {
        let shared = SharedRegistry::new(Arc::new(|| {
            let mut registry = PageRegistry::new();
            registry.insert("index", StaticPage("x"));
            registry
        }));
        assert_eq!(shared.snapshot().version(), 1);

        let before = shared.snapshot();
        shared.swap();
        assert_eq!(shared.snapshot().version(), 2);
        // The old snapshot is unaffected by the swap
        assert_eq!(before.version(), 1);
        assert!(shared.snapshot().get("index").is_some());
    }
}
