//! Plugin-supplied configuration components

use crate::value::Tree;
use crate::Result;
use std::fmt;
use std::sync::Arc;

/// Merge and finalize logic for one configuration namespace
///
/// Components own the meaning of their namespace: the resolver only decides
/// *when* they run, never how values combine.
pub trait ConfigComponent: Send + Sync {
    /// Combine two unfinalized trees; `overlay` comes from the higher
    /// precedence location
    fn merge(&self, base: &Tree, overlay: &Tree) -> Result<Tree>;

    /// Validate and apply defaults, producing the authoritative value
    fn finalize(&self, tree: &Tree) -> Result<Tree>;
}

/// A feature plugin that provides a configuration component
#[derive(Clone)]
pub struct Plugin {
    name: String,
    component: Arc<dyn ConfigComponent>,
}

impl Plugin {
    pub fn new(name: impl Into<String>, component: impl ConfigComponent + 'static) -> Self {
        Self {
            name: name.into(),
            component: Arc::new(component),
        }
    }

    /// Create a plugin from an already shared component
    pub fn from_shared(name: impl Into<String>, component: Arc<dyn ConfigComponent>) -> Self {
        Self {
            name: name.into(),
            component,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn component(&self) -> Arc<dyn ConfigComponent> {
        Arc::clone(&self.component)
    }
}

impl fmt::Debug for Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plugin").field("name", &self.name).finish()
    }
}

impl fmt::Display for Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
