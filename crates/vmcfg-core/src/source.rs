//! Loaded configuration sources

use crate::interfaces::Mapper;
use crate::value::Tree;
use crate::wire::{Fragment, WireHash};
use crate::Result;
use parking_lot::RwLock;
use std::fmt;

/// A fragment loaded at one location
///
/// The unfinalized tree is decoded once on load. The finalized tree is
/// memoized: once set it is reused verbatim, and the backing fragment is
/// updated so the value can be persisted for later phases.
pub struct Source {
    base: RwLock<Fragment>,
    unfinalized: Tree,
    finalized: RwLock<Option<Tree>>,
}

impl Source {
    /// Decode a fragment into a source
    pub fn load(fragment: Fragment, mapper: &dyn Mapper) -> Result<Self> {
        let unfinalized = mapper.decode(&fragment.unfinalized)?;
        let finalized = match &fragment.finalized {
            Some(hash) => Some(mapper.decode(hash)?),
            None => None,
        };

        Ok(Self {
            base: RwLock::new(fragment),
            unfinalized,
            finalized: RwLock::new(finalized),
        })
    }

    /// The persisted form, including any finalized payload
    pub fn base(&self) -> Fragment {
        self.base.read().clone()
    }

    pub fn unfinalized(&self) -> &Tree {
        &self.unfinalized
    }

    pub fn finalized(&self) -> Option<Tree> {
        self.finalized.read().clone()
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized.read().is_some()
    }

    /// Record the finalized tree and its encoded form
    pub(crate) fn set_finalized(&self, tree: Tree, encoded: WireHash) {
        *self.finalized.write() = Some(tree);
        self.base.write().finalized = Some(encoded);
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Source")
            .field("namespaces", &self.unfinalized.keys().collect::<Vec<_>>())
            .field("finalized", &self.is_finalized())
            .finish()
    }
}
