//! Shared test utilities for the vmcfg workspace.
//!
//! Standard fixtures for resolver tests. It is a dev-dependency only and is
//! never published.
//!
//! # Modules
//!
//! - [`components`]: config components with known merge behaviour
//! - [`parser`]: [`ScriptedParser`] answering parse requests from a table
//! - [`origin`]: [`TestOrigin`] and [`TestTarget`] scopes
//! - [`fixtures`]: wire fragment builders

pub mod components;
pub mod fixtures;
pub mod origin;
pub mod parser;

pub use components::{Concatenate, Failing, Finalizing, PreferOverlay, Recording, Stage};
pub use fixtures::{
    config, fragment, raw_definition, resolver, resolver_with_origin, vm_definitions,
};
pub use origin::{TestOrigin, TestTarget};
pub use parser::ScriptedParser;
