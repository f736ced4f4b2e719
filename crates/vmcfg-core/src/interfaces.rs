//! Contracts for the collaborators the resolver consumes
//!
//! The resolver never talks to the legacy runtime, the plugin transport or
//! the target lifecycle directly. It depends on these traits, and callers
//! wire concrete implementations in at construction time.

use crate::cleanup::CleanupFn;
use crate::resolver::ConfigResolver;
use crate::value::{RawValue, Tree};
use crate::wire::WireHash;
use crate::Result;
use std::fmt;
use std::sync::Arc;

/// Converts between persisted wire payloads and configuration trees
pub trait Mapper: Send + Sync {
    fn decode(&self, hash: &WireHash) -> Result<Tree>;

    fn encode(&self, tree: &Tree) -> Result<WireHash>;
}

/// Client for the legacy runtime that expands raw target definitions
///
/// Calls block for a full round-trip; timeouts belong to the implementation.
pub trait TargetParser: Send + Sync {
    /// Expand a raw target definition into a target-scoped fragment
    fn parse_target(&self, raw: &RawValue) -> Result<WireHash>;

    /// Expand the provider-specific portion of a raw target definition
    fn parse_provider(&self, provider: &str, raw: &RawValue) -> Result<WireHash>;
}

/// Scope a configuration was loaded for (a basis, project or target)
pub trait OriginScope: Send + Sync {
    /// Name used in diagnostics
    fn name(&self) -> &str;

    /// Register a task to run when the scope is closed
    fn closer(&self, task: CleanupFn);

    /// Materialize a runtime target for the given options
    fn load_target(&self, options: TargetOptions) -> Result<Arc<dyn RuntimeTarget>>;
}

/// Concrete runtime target produced by an origin
pub trait RuntimeTarget: Send + Sync {
    fn name(&self) -> &str;

    /// Hand the target its own configuration instance
    fn attach_config(&self, config: Arc<ConfigResolver>);

    /// The target viewed as an origin scope for configuration it owns
    fn scope(self: Arc<Self>) -> Arc<dyn OriginScope>;
}

/// Options passed to [`OriginScope::load_target`]
#[derive(Clone)]
pub struct TargetOptions {
    /// Name of the target to load
    pub name: String,
    /// Resolved configuration for the target
    pub config: Arc<ConfigResolver>,
}

impl fmt::Debug for TargetOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetOptions")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
