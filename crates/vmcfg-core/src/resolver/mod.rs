//! Configuration resolution with precedence-aware merge
//!
//! A [`ConfigResolver`] holds one [`Source`] per [`LoadLocation`] and the
//! component registrations contributed by plugins. [`ConfigResolver::init`]
//! merges the sources in precedence order and finalizes the result into the
//! root tree that every accessor reads.
//!
//! # Example
//!
//! ```ignore
//! use vmcfg_core::{CodecMapper, ConfigResolver, LoadLocation};
//!
//! let resolver = ConfigResolver::new(Arc::new(CodecMapper::default()), parser);
//! resolver.register("vm", None, vm_plugin)?;
//! resolver.add_source(Some(project_fragment), LoadLocation::Project)?;
//! resolver.init()?;
//!
//! let box_name = resolver.get_value(&["vm", "box"])?;
//! ```

mod target;

use crate::cache::TargetCache;
use crate::cleanup::{Cleanup, CleanupFn};
use crate::component::Plugin;
use crate::engine::Engine;
use crate::interfaces::{Mapper, OriginScope, TargetParser};
use crate::location::LoadLocation;
use crate::lookup;
use crate::registry::Registrations;
use crate::settings::ResolverSettings;
use crate::source::Source;
use crate::value::{Tree, Value};
use crate::wire::{Fragment, WireHash};
use crate::{Error, Result};
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// State guarded by the instance lock
struct Inner {
    registrations: Registrations,
    sources: BTreeMap<LoadLocation, Arc<Source>>,
}

/// Resolves configuration from layered sources through plugin components
///
/// Mutating operations serialize on one instance lock. Reads only take a
/// short lock on the root slot and never observe a partially built root.
pub struct ConfigResolver {
    name: String,
    inner: Mutex<Inner>,
    root: RwLock<Option<Arc<Tree>>>,
    cache: TargetCache,
    cleanup: Mutex<Cleanup>,
    mapper: Arc<dyn Mapper>,
    parser: Arc<dyn TargetParser>,
    origin: Option<Arc<dyn OriginScope>>,
    settings: Arc<ResolverSettings>,
}

impl ConfigResolver {
    /// Create a resolver with no sources, registrations or origin
    pub fn new(mapper: Arc<dyn Mapper>, parser: Arc<dyn TargetParser>) -> Self {
        Self {
            name: "config".to_string(),
            inner: Mutex::new(Inner {
                registrations: Registrations::new(),
                sources: BTreeMap::new(),
            }),
            root: RwLock::new(None),
            cache: TargetCache::default(),
            cleanup: Mutex::new(Cleanup::new()),
            mapper,
            parser,
            origin: None,
            settings: Arc::new(ResolverSettings::default()),
        }
    }

    /// Attach the scope this configuration was loaded for
    pub fn with_origin(mut self, origin: Arc<dyn OriginScope>) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn with_settings(mut self, settings: ResolverSettings) -> Self {
        self.settings = Arc::new(settings);
        self
    }

    /// Name used in diagnostics; clones append the name they are scoped to
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    pub fn origin(&self) -> Option<&Arc<dyn OriginScope>> {
        self.origin.as_ref()
    }

    /// Add a source at `location`, replacing any existing one
    ///
    /// `None` is ignored. Decoding failures abort without changing state.
    pub fn add_source(&self, fragment: Option<Fragment>, location: LoadLocation) -> Result<()> {
        let mut inner = self.inner.lock();

        let Some(fragment) = fragment else {
            tracing::debug!(resolver = %self.name, %location, "Fragment is unset, not adding");
            return Ok(());
        };

        let source = Source::load(fragment, self.mapper.as_ref()).inspect_err(|e| {
            tracing::debug!(resolver = %self.name, %location, error = %e, "Failed to load source");
        })?;
        inner.sources.insert(location, Arc::new(source));

        tracing::info!(resolver = %self.name, %location, "Added new source");
        Ok(())
    }

    /// The persisted fragment for `location`
    ///
    /// After a full `init`, the terminal source carries the finalized payload.
    pub fn source(&self, location: LoadLocation) -> Result<Fragment> {
        self.inner
            .lock()
            .sources
            .get(&location)
            .map(|s| s.base())
            .ok_or(Error::NoSource { location })
    }

    /// Locations with a source, in precedence order
    pub fn locations(&self) -> Vec<LoadLocation> {
        self.inner.lock().sources.keys().copied().collect()
    }

    /// Register a plugin's config component
    ///
    /// Without a scope the plugin claims `namespace`; with a scope it is added
    /// to that sub-registration.
    pub fn register(&self, namespace: &str, scope: Option<&str>, plugin: Plugin) -> Result<()> {
        let mut inner = self.inner.lock();
        tracing::debug!(resolver = %self.name, namespace, ?scope, plugin = plugin.name(), "Registering config component");

        match scope {
            None | Some("") => inner.registrations.register(namespace, plugin),
            Some(scope) => {
                inner.registrations.register_scoped(namespace, scope, plugin);
                Ok(())
            }
        }
    }

    /// Plugins registered under `scope` of `namespace`
    pub fn scoped_plugins(&self, namespace: &str, scope: &str) -> Vec<Plugin> {
        self.inner.lock().registrations.scoped(namespace, scope)
    }

    /// Resolve the sources into the root configuration
    ///
    /// If the highest precedence source is a root location and already holds
    /// a finalized value, that value becomes the root unchanged. Otherwise all
    /// sources are merged and finalized, and the result is stored back on
    /// that terminal source for later reuse. On failure the root is left
    /// unset.
    pub fn init(&self) -> Result<()> {
        let inner = self.inner.lock();
        tracing::debug!(
            resolver = %self.name,
            locations = ?inner.sources.keys().collect::<Vec<_>>(),
            "Starting configuration initialization"
        );

        let mut terminal = None;
        if let Some((&location, source)) = inner.sources.last_key_value() {
            if location.is_root() {
                if let Some(finalized) = source.finalized() {
                    tracing::info!(resolver = %self.name, %location, "Setting root to finalized data and exiting");
                    *self.root.write() = Some(Arc::new(finalized));
                    return Ok(());
                }
                terminal = Some(Arc::clone(source));
            }
        }

        match self.resolve(&inner, terminal.as_deref()) {
            Ok(root) => {
                *self.root.write() = Some(Arc::new(root));
                tracing::debug!(resolver = %self.name, "Configuration initialization complete");
                Ok(())
            }
            Err(e) => {
                *self.root.write() = None;
                tracing::error!(resolver = %self.name, error = %e, "Failed to initialize configuration");
                Err(e)
            }
        }
    }

    fn resolve(&self, inner: &Inner, terminal: Option<&Source>) -> Result<Tree> {
        let engine = Engine::new(&inner.registrations);
        let combined = engine.generate(inner.sources.values().map(|s| s.unfinalized()))?;
        let root = engine.finalize(&combined)?;

        if let Some(source) = terminal {
            let encoded = self.mapper.encode(&root)?;
            source.set_finalized(root.clone(), encoded);
        }
        Ok(root)
    }

    /// Whether `init` has completed successfully
    pub fn is_initialized(&self) -> bool {
        self.root.read().is_some()
    }

    /// The resolved root
    pub fn root(&self) -> Result<Arc<Tree>> {
        self.root.read().clone().ok_or(Error::NotInitialized)
    }

    /// Encode the resolved root for storage
    pub fn encode_root(&self) -> Result<WireHash> {
        self.mapper.encode(&*self.root()?)
    }

    /// Configuration of one namespace
    pub fn get_config(&self, namespace: &str) -> Result<Tree> {
        let root = self.root()?;
        match root.get(namespace) {
            Some(Value::Tree(tree)) => Ok(tree.clone()),
            Some(other) => {
                tracing::trace!(namespace, found = other.type_name(), "Requested namespace is not a tree");
                Err(Error::type_mismatch(namespace, "tree", other.type_name()))
            }
            None => {
                tracing::trace!(namespace, "Requested namespace does not exist");
                Err(Error::NamespaceNotFound {
                    namespace: namespace.to_string(),
                })
            }
        }
    }

    /// Value at `path`; the first segment names the namespace
    pub fn get_value(&self, path: &[&str]) -> Result<Value> {
        let root = self.root()?;
        lookup::walk(&root, path).cloned()
    }

    /// Configuration of one namespace, or `None` when missing or mistyped
    pub fn get_namespace(&self, namespace: &str) -> Option<Tree> {
        let root = self.root.read().clone()?;
        let tree = root.get_tree(namespace).cloned();
        if tree.is_none() {
            tracing::trace!(namespace, "Requested namespace is unavailable");
        }
        tree
    }

    /// Names of the targets defined in the configuration
    ///
    /// Advisory only: when no names are defined the configured default name
    /// is returned on its own.
    pub fn target_names(&self) -> Result<Vec<String>> {
        let root = self.root()?;
        let targets = &self.settings.targets;
        let mut names = Vec::new();

        match root.get_tree(&targets.namespace) {
            None => {
                tracing::trace!(namespace = %targets.namespace, "Failed to get target namespace from config");
            }
            Some(namespace) => match namespace.get(&targets.defined_keys) {
                Some(Value::List(items)) => {
                    for item in items {
                        match item {
                            Value::Symbol(sym) => names.push(sym.as_str().to_string()),
                            other => {
                                tracing::trace!(found = other.type_name(), "Target name is invalid type");
                            }
                        }
                    }
                }
                Some(other) => {
                    tracing::trace!(found = other.type_name(), "Defined target list is not a valid list type");
                }
                None => {
                    tracing::trace!(
                        keys = ?namespace.keys().collect::<Vec<_>>(),
                        "Failed to locate defined target keys"
                    );
                }
            },
        }

        if names.is_empty() {
            names.push(targets.default_name.clone());
        }
        tracing::trace!(targets = ?names, "Full list of target names found");
        Ok(names)
    }

    /// The first defined target name
    pub fn primary_target_name(&self) -> Result<String> {
        let mut names = self.target_names()?;
        Ok(names.swap_remove(0))
    }

    /// Create an instance sharing this one's registrations and sources
    ///
    /// The clone gets its own source map, root, cache and cleanup chain.
    /// With an origin, closing the origin also closes the clone.
    pub fn clone_scoped(
        &self,
        name: &str,
        origin: Option<Arc<dyn OriginScope>>,
    ) -> Arc<ConfigResolver> {
        let child = self.fork(name, origin);
        child.chain_to_origin();
        child
    }

    /// Clone without chaining close to the origin yet
    fn fork(&self, name: &str, origin: Option<Arc<dyn OriginScope>>) -> Arc<ConfigResolver> {
        let inner = self.inner.lock();
        Arc::new(ConfigResolver {
            name: format!("{}.{}", self.name, name),
            inner: Mutex::new(Inner {
                registrations: inner.registrations.clone(),
                sources: inner.sources.clone(),
            }),
            root: RwLock::new(None),
            cache: TargetCache::default(),
            cleanup: Mutex::new(Cleanup::new()),
            mapper: Arc::clone(&self.mapper),
            parser: Arc::clone(&self.parser),
            origin,
            settings: Arc::clone(&self.settings),
        })
    }

    /// Close this instance when its origin closes
    fn chain_to_origin(self: &Arc<Self>) {
        let Some(origin) = &self.origin else {
            return;
        };
        tracing::trace!(resolver = %self.name, origin = origin.name(), "Chaining close to origin");
        let weak = Arc::downgrade(self);
        origin.closer(Box::new(move || match weak.upgrade() {
            Some(child) => child.close(),
            None => Ok(()),
        }));
    }

    /// Register a task to run on close
    pub fn closer(&self, task: impl FnOnce() -> Result<()> + Send + 'static) {
        self.cleanup.lock().push(Box::new(task) as CleanupFn);
    }

    /// Run registered cleanup tasks
    pub fn close(&self) -> Result<()> {
        let _inner = self.inner.lock();
        tracing::trace!(resolver = %self.name, "Closing configuration");
        self.cleanup.lock().close()
    }
}

impl fmt::Display for ConfigResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        write!(
            f,
            "ConfigResolver[name: {}, origin: {}, namespaces: {:?}, sources: {:?}]",
            self.name,
            self.origin.as_ref().map(|o| o.name()).unwrap_or("<none>"),
            inner.registrations.namespaces(),
            inner.sources.keys().collect::<Vec<_>>()
        )
    }
}

impl fmt::Debug for ConfigResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigResolver")
            .field("name", &self.name)
            .field("initialized", &self.is_initialized())
            .field("cached_targets", &self.cache.len())
            .field("deriving_targets", &self.cache.in_flight())
            .finish_non_exhaustive()
    }
}
