//! Merge and finalize passes
//!
//! The engine never interprets namespace contents. For every namespace it
//! finds the registered component and lets it decide how values combine or
//! what the final value is.

use crate::registry::Registrations;
use crate::value::{Tree, Value};
use crate::{Error, Result};
use std::collections::BTreeSet;

/// Runs component merge and finalize for a set of registrations
pub struct Engine<'a> {
    registrations: &'a Registrations,
}

impl<'a> Engine<'a> {
    pub fn new(registrations: &'a Registrations) -> Self {
        Self { registrations }
    }

    /// Fold trees in precedence order into one unfinalized tree
    pub fn generate<'t>(&self, layers: impl IntoIterator<Item = &'t Tree>) -> Result<Tree> {
        let mut layers = layers.into_iter();
        let Some(first) = layers.next() else {
            return Ok(Tree::new());
        };

        let mut combined = first.clone();
        for layer in layers {
            combined = self.merge(&combined, layer)?;
        }
        Ok(combined)
    }

    /// Merge two trees namespace by namespace
    ///
    /// A namespace present on one side only is passed through without
    /// calling its component. Every namespace must still be registered.
    pub fn merge(&self, base: &Tree, overlay: &Tree) -> Result<Tree> {
        let namespaces: BTreeSet<&str> = base.keys().chain(overlay.keys()).collect();
        let mut result = Tree::new();

        for namespace in namespaces {
            let component = self.registrations.component(namespace)?;

            match (base.get(namespace), overlay.get(namespace)) {
                (Some(value), None) => {
                    tracing::debug!(namespace, "Only base value available, no merge performed");
                    result.insert(namespace, value.clone());
                }
                (None, Some(value)) => {
                    tracing::debug!(namespace, "Only overlay value available, no merge performed");
                    result.insert(namespace, value.clone());
                }
                (Some(base_value), Some(overlay_value)) => {
                    let base_tree = expect_tree(namespace, base_value)?;
                    let overlay_tree = expect_tree(namespace, overlay_value)?;
                    tracing::debug!(namespace, "Merging values");
                    result.insert(namespace, component.merge(base_tree, overlay_tree)?);
                }
                (None, None) => unreachable!("namespace collected from one of the trees"),
            }
        }

        Ok(result)
    }

    /// Finalize every namespace of a merged tree
    pub fn finalize(&self, combined: &Tree) -> Result<Tree> {
        let mut result = Tree::new();

        for (namespace, value) in combined.iter() {
            tracing::trace!(namespace, "Starting configuration finalization");
            let component = self.registrations.component(namespace)?;
            let data = expect_tree(namespace, value).inspect_err(|_| {
                tracing::error!(namespace, found = value.type_name(), "Invalid config type");
            })?;
            result.insert(namespace, component.finalize(data)?);
        }

        tracing::trace!("Configuration data finalization is now complete");
        Ok(result)
    }
}

fn expect_tree<'v>(namespace: &str, value: &'v Value) -> Result<&'v Tree> {
    value
        .as_tree()
        .ok_or_else(|| Error::type_mismatch(namespace, "tree", value.type_name()))
}
