use std::collections::BTreeMap;
use std::sync::Arc;

use crate::{
    dispatch::TopicRenderer,
    error::{SceneError, SceneResult},
    topics,
};

pub(crate) type LoaderFn = fn() -> SceneResult<Box<dyn TopicRenderer>>;

/// Static registry of topic renderers. Loaders run lazily on first resolve,
/// so a topic's tables are only built when a script asks for it.
static REGISTRY: &[(&str, LoaderFn)] = &[
    ("basic-arithmetic", topics::basic_arithmetic::renderer),
    ("bezier", topics::bezier::renderer),
    ("monte-carlo", topics::monte_carlo::renderer),
    ("random-walk", topics::random_walk::renderer),
    ("trigonometry", topics::trigonometry::renderer),
];

/// Lazily resolves topic keys to their renderers and memoizes the result.
///
/// `Ok(None)` means "no such topic" (caller shows the no-scene placeholder).
/// `Err(..)` is the explicit load-failure state; it is reported once and the
/// caller degrades to an error placeholder.
pub struct RendererFactory {
    registry: &'static [(&'static str, LoaderFn)],
    loaded: BTreeMap<String, Arc<dyn TopicRenderer>>,
}

impl Default for RendererFactory {
    fn default() -> Self {
        Self {
            registry: REGISTRY,
            loaded: BTreeMap::new(),
        }
    }
}

impl RendererFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory over an arbitrary loader table, for exercising load failures.
    #[cfg(test)]
    pub(crate) fn with_registry(registry: &'static [(&'static str, LoaderFn)]) -> Self {
        Self {
            registry,
            loaded: BTreeMap::new(),
        }
    }

    pub fn is_registered(key: &str) -> bool {
        REGISTRY.iter().any(|(k, _)| *k == key)
    }

    /// All registered topic keys, in registry order.
    pub fn topics() -> Vec<&'static str> {
        REGISTRY.iter().map(|(k, _)| *k).collect()
    }

    #[tracing::instrument(skip(self))]
    pub fn resolve(&mut self, key: &str) -> SceneResult<Option<Arc<dyn TopicRenderer>>> {
        if let Some(renderer) = self.loaded.get(key) {
            return Ok(Some(renderer.clone()));
        }
        let Some((_, loader)) = self.registry.iter().find(|(k, _)| *k == key) else {
            tracing::debug!(topic = key, "unknown topic key");
            return Ok(None);
        };
        let renderer: Arc<dyn TopicRenderer> = match loader() {
            Ok(r) => Arc::from(r),
            Err(e) => {
                tracing::warn!(topic = key, error = %e, "topic renderer failed to load");
                return Err(SceneError::registry(format!(
                    "topic '{key}' failed to load: {e}"
                )));
            }
        };
        self.loaded.insert(key.to_string(), renderer.clone());
        Ok(Some(renderer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failing_loader() -> SceneResult<Box<dyn TopicRenderer>> {
        Err(SceneError::registry("renderer table corrupt"))
    }

    static FAILING_REGISTRY: &[(&str, LoaderFn)] = &[("glitch", failing_loader)];

    #[test]
    fn loader_failure_surfaces_as_registry_error() {
        let mut f = RendererFactory::with_registry(FAILING_REGISTRY);
        let err = f.resolve("glitch").err().expect("loader must fail");
        assert!(err.to_string().contains("registry error"));
        assert!(err.to_string().contains("glitch"));
        // A failed loader is never memoized as loaded.
        assert!(f.resolve("glitch").is_err());
    }

    #[test]
    fn unknown_topic_resolves_to_none() {
        let mut f = RendererFactory::new();
        assert!(f.resolve("unknown-topic").unwrap().is_none());
    }

    #[test]
    fn registered_topic_resolves_to_a_renderer() {
        let mut f = RendererFactory::new();
        let r = f.resolve("bezier").unwrap().expect("bezier is registered");
        assert_eq!(r.topic(), "bezier");
    }

    #[test]
    fn resolve_memoizes_the_renderer() {
        let mut f = RendererFactory::new();
        let a = f.resolve("trigonometry").unwrap().unwrap();
        let b = f.resolve("trigonometry").unwrap().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn registry_keys_are_unique_and_sorted_queryable() {
        let topics = RendererFactory::topics();
        assert!(topics.contains(&"basic-arithmetic"));
        assert!(topics.contains(&"bezier"));
        let mut dedup = topics.clone();
        dedup.dedup();
        assert_eq!(dedup.len(), topics.len());
        assert!(RendererFactory::is_registered("monte-carlo"));
        assert!(!RendererFactory::is_registered("fourier"));
    }
}
