//! Configuration component registrations
//!
//! Each top-level namespace is owned by at most one plugin. Plugins may also
//! register under a sub-scope of a namespace (providers, provisioners, ...);
//! sub-scopes accumulate plugins and are created lazily, so a sub-scope can
//! be registered before the namespace itself is claimed.
//!
//! [`Registrations`] is a shallow map of shared entries: cloning it gives an
//! independent map whose entries alias the original ones.

use crate::component::{ConfigComponent, Plugin};
use crate::{Error, Result};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Registration entry for one namespace
pub struct Registration {
    identifier: String,
    plugin: OnceLock<Plugin>,
    subregistrations: RwLock<BTreeMap<String, Vec<Plugin>>>,
}

impl Registration {
    fn unclaimed(identifier: &str) -> Self {
        Self {
            identifier: identifier.to_string(),
            plugin: OnceLock::new(),
            subregistrations: RwLock::new(BTreeMap::new()),
        }
    }

    /// Unclaimed copy with the same sub-registrations
    fn detached(&self) -> Self {
        Self {
            identifier: self.identifier.clone(),
            plugin: OnceLock::new(),
            subregistrations: RwLock::new(self.subregistrations.read().clone()),
        }
    }

    /// The namespace this entry covers
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// The owning plugin, if the namespace has been claimed
    pub fn plugin(&self) -> Option<&Plugin> {
        self.plugin.get()
    }

    /// Plugins registered under `scope`
    pub fn scoped(&self, scope: &str) -> Vec<Plugin> {
        self.subregistrations
            .read()
            .get(scope)
            .cloned()
            .unwrap_or_default()
    }

    /// Sub-scopes with at least one plugin (sorted)
    pub fn scopes(&self) -> Vec<String> {
        self.subregistrations.read().keys().cloned().collect()
    }

    fn claim(&self, plugin: Plugin) -> Result<()> {
        self.plugin.set(plugin).map_err(|rejected| Error::RegistrationConflict {
            namespace: self.identifier.clone(),
            owner: self
                .plugin
                .get()
                .map(|p| p.name().to_string())
                .unwrap_or_default(),
            plugin: rejected.name().to_string(),
        })
    }

    fn push_scoped(&self, scope: &str, plugin: Plugin) {
        self.subregistrations
            .write()
            .entry(scope.to_string())
            .or_default()
            .push(plugin);
    }
}

impl fmt::Display for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Registration[identifier: {}, plugin: {}, scopes: {:?}]",
            self.identifier,
            self.plugin().map(Plugin::name).unwrap_or("<unset>"),
            self.scopes()
        )
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("identifier", &self.identifier)
            .field("plugin", &self.plugin())
            .field("subregistrations", &*self.subregistrations.read())
            .finish()
    }
}

/// Collection of namespace registrations
#[derive(Debug, Clone, Default)]
pub struct Registrations {
    entries: HashMap<String, Arc<Registration>>,
}

impl Registrations {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim a top-level namespace for `plugin`
    ///
    /// Fails if the namespace already has an owner; the existing owner is
    /// left in place. Claiming an entry created by a sub-registration swaps
    /// in a private copy, so collections sharing that entry stay unclaimed.
    pub fn register(&mut self, namespace: &str, plugin: Plugin) -> Result<()> {
        let entry = match self.entries.get(namespace) {
            Some(existing) if existing.plugin().is_some() => return existing.claim(plugin),
            Some(existing) => existing.detached(),
            None => Registration::unclaimed(namespace),
        };
        entry.claim(plugin)?;
        self.entries.insert(namespace.to_string(), Arc::new(entry));
        Ok(())
    }

    /// Add `plugin` to the `scope` sub-registration of `namespace`
    pub fn register_scoped(&mut self, namespace: &str, scope: &str, plugin: Plugin) {
        self.entries
            .entry(namespace.to_string())
            .or_insert_with(|| Arc::new(Registration::unclaimed(namespace)))
            .push_scoped(scope, plugin);
    }

    /// Get the registration entry for a namespace
    pub fn get(&self, namespace: &str) -> Option<&Registration> {
        self.entries.get(namespace).map(|r| r.as_ref())
    }

    /// The component that owns `namespace`
    pub fn component(&self, namespace: &str) -> Result<Arc<dyn ConfigComponent>> {
        self.get(namespace)
            .and_then(Registration::plugin)
            .map(Plugin::component)
            .ok_or_else(|| Error::MissingRegistration {
                namespace: namespace.to_string(),
            })
    }

    /// Plugins registered under `scope` of `namespace`
    pub fn scoped(&self, namespace: &str, scope: &str) -> Vec<Plugin> {
        self.get(namespace)
            .map(|r| r.scoped(scope))
            .unwrap_or_default()
    }

    /// All namespaces with an entry (sorted)
    pub fn namespaces(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.entries.keys().map(String::as_str).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Tree;

    struct Noop;

    impl ConfigComponent for Noop {
        fn merge(&self, _base: &Tree, overlay: &Tree) -> Result<Tree> {
            Ok(overlay.clone())
        }

        fn finalize(&self, tree: &Tree) -> Result<Tree> {
            Ok(tree.clone())
        }
    }

    fn plugin(name: &str) -> Plugin {
        Plugin::new(name, Noop)
    }

    #[test]
    fn test_register_and_lookup() {
        let mut regs = Registrations::new();
        regs.register("vm", plugin("core")).unwrap();

        assert_eq!(regs.len(), 1);
        assert!(regs.component("vm").is_ok());
        assert_eq!(regs.get("vm").unwrap().plugin().unwrap().name(), "core");
    }

    #[test]
    fn test_conflict_keeps_first_owner() {
        let mut regs = Registrations::new();
        regs.register("vm", plugin("core")).unwrap();

        let err = regs.register("vm", plugin("intruder")).unwrap_err();
        match err {
            Error::RegistrationConflict {
                namespace,
                owner,
                plugin,
            } => {
                assert_eq!(namespace, "vm");
                assert_eq!(owner, "core");
                assert_eq!(plugin, "intruder");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(regs.get("vm").unwrap().plugin().unwrap().name(), "core");
    }

    #[test]
    fn test_scoped_registration_is_lazy_and_accumulates() {
        let mut regs = Registrations::new();
        regs.register_scoped("vm", "provider", plugin("virtualbox"));
        regs.register_scoped("vm", "provider", plugin("docker"));

        let entry = regs.get("vm").unwrap();
        assert!(entry.plugin().is_none());
        let names: Vec<_> = entry
            .scoped("provider")
            .iter()
            .map(|p| p.name().to_string())
            .collect();
        assert_eq!(names, vec!["virtualbox", "docker"]);

        // A lazily created entry has no owner yet
        assert!(matches!(
            regs.component("vm"),
            Err(Error::MissingRegistration { .. })
        ));

        regs.register("vm", plugin("core")).unwrap();
        assert!(regs.component("vm").is_ok());
        assert_eq!(regs.scoped("vm", "provider").len(), 2);
    }

    #[test]
    fn test_missing_namespace() {
        let regs = Registrations::new();
        let err = regs.component("ssh").err().unwrap();
        assert!(err.to_string().contains("ssh"));
        assert!(regs.scoped("ssh", "anything").is_empty());
    }

    #[test]
    fn test_clone_is_shallow() {
        let mut parent = Registrations::new();
        parent.register("vm", plugin("core")).unwrap();

        let mut child = parent.clone();
        child.register("ssh", plugin("ssh")).unwrap();
        child.register_scoped("vm", "provider", plugin("docker"));

        // New namespaces stay local to the clone
        assert!(parent.get("ssh").is_none());
        // Shared entries alias
        assert_eq!(parent.scoped("vm", "provider").len(), 1);
    }

    #[test]
    fn test_claiming_shared_lazy_entry_stays_local() {
        let mut parent = Registrations::new();
        parent.register_scoped("vm", "provider", plugin("docker"));

        let mut child = parent.clone();
        child.register("vm", plugin("child")).unwrap();

        assert!(parent.get("vm").unwrap().plugin().is_none());
        assert_eq!(child.scoped("vm", "provider").len(), 1);

        parent.register("vm", plugin("parent")).unwrap();
        assert_eq!(parent.get("vm").unwrap().plugin().unwrap().name(), "parent");
        assert_eq!(child.get("vm").unwrap().plugin().unwrap().name(), "child");
        assert_eq!(parent.scoped("vm", "provider").len(), 1);
    }

    #[test]
    fn test_namespaces_sorted() {
        let mut regs = Registrations::new();
        regs.register("vm", plugin("a")).unwrap();
        regs.register("ssh", plugin("b")).unwrap();
        regs.register_scoped("winrm", "transport", plugin("c"));
        assert_eq!(regs.namespaces(), vec!["ssh", "vm", "winrm"]);
    }
}
