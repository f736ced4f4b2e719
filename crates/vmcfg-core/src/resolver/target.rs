//! Target derivation
//!
//! A target configuration is a clone of the resolver with the target's
//! parsed definition added at [`LoadLocation::Target`] (and the provider's at
//! [`LoadLocation::Provider`]). Derived configurations are cached per target
//! and provider for the life of the resolver.

use super::ConfigResolver;
use crate::cache::CacheKey;
use crate::interfaces::{RuntimeTarget, TargetOptions};
use crate::location::LoadLocation;
use crate::value::{RawValue, Value};
use crate::wire::Fragment;
use crate::{Error, Result};
use std::sync::Arc;

impl ConfigResolver {
    /// Configuration for a named target, optionally specialized for a provider
    ///
    /// Concurrent calls for the same target and provider derive once and
    /// share the result. Failures are not cached.
    pub fn target_config(
        &self,
        name: &str,
        provider: &str,
        validate_provider: bool,
    ) -> Result<Arc<ConfigResolver>> {
        let key = CacheKey::new(name, provider);
        if let Some(cached) = self.cache.get(&key) {
            tracing::trace!(resolver = %self.name, %key, "Returning cached target configuration");
            return Ok(cached);
        }

        let flight = self.cache.flight(&key);
        let derived = {
            let _flight = flight.lock();
            match self.cache.get(&key) {
                Some(cached) => {
                    tracing::trace!(resolver = %self.name, %key, "Target configuration derived by another caller");
                    Ok(cached)
                }
                None => self.derive(&key, name, provider, validate_provider),
            }
        };
        self.cache.release(&key, flight);
        derived
    }

    /// Derive and cache the configuration for `key`
    ///
    /// The derived instance is only chained to the origin once it has
    /// initialized, so a failed derivation leaves nothing behind.
    fn derive(
        &self,
        key: &CacheKey,
        name: &str,
        provider: &str,
        validate_provider: bool,
    ) -> Result<Arc<ConfigResolver>> {
        if validate_provider {
            // TODO: check the provider against the target's allowed providers once
            // the runtime exposes that list
            tracing::debug!(provider, "Provider validation requested, skipping");
        }

        let raw = self.target_definition(name)?;
        let target_fragment = self.parser.parse_target(&raw).inspect_err(|e| {
            tracing::error!(target_name = name, error = %e, "Failed to parse target configuration");
        })?;
        tracing::info!(target_name = name, "Target configuration generated");

        let derived = self.fork(name, self.origin.clone());
        derived.add_source(Some(Fragment::new(target_fragment)), LoadLocation::Target)?;

        if !provider.is_empty() {
            let provider_fragment = self.parser.parse_provider(provider, &raw).inspect_err(|e| {
                tracing::error!(target_name = name, provider, error = %e, "Failed to parse provider configuration");
            })?;
            derived.add_source(Some(Fragment::new(provider_fragment)), LoadLocation::Provider)?;
        }

        derived.init()?;
        derived.chain_to_origin();
        self.cache.insert(key.clone(), Arc::clone(&derived));
        Ok(derived)
    }

    /// Raw definition of `name` from the target definitions namespace
    fn target_definition(&self, name: &str) -> Result<RawValue> {
        let targets = &self.settings.targets;
        let value = self
            .get_value(&[targets.namespace.as_str(), targets.definitions.as_str(), name])
            .inspect_err(|e| {
                tracing::error!(target_name = name, error = %e, "Failed to get raw target configuration");
            })?;

        match value {
            Value::Raw(raw) if !raw.is_empty() => Ok(raw),
            Value::Null | Value::Raw(_) => Err(Error::EmptyTargetDefinition {
                target: name.to_string(),
            }),
            other => Err(Error::type_mismatch(
                format!("target definition '{name}'"),
                "raw",
                other.type_name(),
            )),
        }
    }

    /// Materialize a runtime target through the origin
    ///
    /// The target receives its own clone of the derived configuration, scoped
    /// to the target so closing the target closes its configuration.
    pub fn target(&self, name: &str, provider: &str) -> Result<Arc<dyn RuntimeTarget>> {
        let origin = self.origin.as_ref().ok_or_else(|| Error::NoOrigin {
            target: name.to_string(),
        })?;

        let config = self.target_config(name, provider, false)?;
        let target = origin.load_target(TargetOptions {
            name: name.to_string(),
            config: Arc::clone(&config),
        })?;

        let owned = config.fork(name, Some(Arc::clone(&target).scope()));
        owned.init()?;
        owned.chain_to_origin();
        target.attach_config(owned);
        config.close()?;

        tracing::debug!(resolver = %self.name, target_name = name, origin = origin.name(), "Runtime target loaded");
        Ok(target)
    }
}
