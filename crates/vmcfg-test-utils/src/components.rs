//! Config components with predictable behaviour for tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use vmcfg_core::{ConfigComponent, Error, Result, Tree, Value};

/// Keys from the overlay replace keys from the base; finalize is identity.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreferOverlay;

impl ConfigComponent for PreferOverlay {
    fn merge(&self, base: &Tree, overlay: &Tree) -> Result<Tree> {
        let mut merged = base.clone();
        for (key, value) in overlay.iter() {
            merged.insert(key, value.clone());
        }
        Ok(merged)
    }

    fn finalize(&self, tree: &Tree) -> Result<Tree> {
        Ok(tree.clone())
    }
}

/// Lists present on both sides are joined base first; anything else
/// prefers the overlay.
#[derive(Debug, Clone, Copy, Default)]
pub struct Concatenate;

impl ConfigComponent for Concatenate {
    fn merge(&self, base: &Tree, overlay: &Tree) -> Result<Tree> {
        let mut merged = base.clone();
        for (key, value) in overlay.iter() {
            let joined = match (base.get(key), value) {
                (Some(Value::List(left)), Value::List(right)) => {
                    Value::List(left.iter().chain(right).cloned().collect())
                }
                _ => value.clone(),
            };
            merged.insert(key, joined);
        }
        Ok(merged)
    }

    fn finalize(&self, tree: &Tree) -> Result<Tree> {
        Ok(tree.clone())
    }
}

/// Prefers the overlay and marks finalized trees with `finalized = true`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Finalizing;

impl ConfigComponent for Finalizing {
    fn merge(&self, base: &Tree, overlay: &Tree) -> Result<Tree> {
        PreferOverlay.merge(base, overlay)
    }

    fn finalize(&self, tree: &Tree) -> Result<Tree> {
        Ok(tree.clone().with("finalized", true))
    }
}

/// Which call a [`Failing`] component rejects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Merge,
    Finalize,
}

/// Fails at the given stage and behaves like [`PreferOverlay`] otherwise.
#[derive(Debug, Clone)]
pub struct Failing {
    namespace: String,
    stage: Stage,
}

impl Failing {
    pub fn new(namespace: &str, stage: Stage) -> Self {
        Self {
            namespace: namespace.to_string(),
            stage,
        }
    }
}

impl ConfigComponent for Failing {
    fn merge(&self, base: &Tree, overlay: &Tree) -> Result<Tree> {
        if self.stage == Stage::Merge {
            return Err(Error::component(&self.namespace, "merge rejected"));
        }
        PreferOverlay.merge(base, overlay)
    }

    fn finalize(&self, tree: &Tree) -> Result<Tree> {
        if self.stage == Stage::Finalize {
            return Err(Error::component(&self.namespace, "finalize rejected"));
        }
        Ok(tree.clone())
    }
}

#[derive(Debug, Default)]
struct Counters {
    merges: AtomicUsize,
    finalizes: AtomicUsize,
}

/// Counts calls made to the wrapped component.
///
/// Clones share their counters, so a test can keep one handle and register
/// another.
#[derive(Clone)]
pub struct Recording<C> {
    inner: C,
    counters: Arc<Counters>,
}

impl<C: ConfigComponent> Recording<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            counters: Arc::new(Counters::default()),
        }
    }

    pub fn merges(&self) -> usize {
        self.counters.merges.load(Ordering::SeqCst)
    }

    pub fn finalizes(&self) -> usize {
        self.counters.finalizes.load(Ordering::SeqCst)
    }
}

impl<C: ConfigComponent> ConfigComponent for Recording<C> {
    fn merge(&self, base: &Tree, overlay: &Tree) -> Result<Tree> {
        self.counters.merges.fetch_add(1, Ordering::SeqCst);
        self.inner.merge(base, overlay)
    }

    fn finalize(&self, tree: &Tree) -> Result<Tree> {
        self.counters.finalizes.fetch_add(1, Ordering::SeqCst);
        self.inner.finalize(tree)
    }
}
