//! Configuration resolution core for layered VM definitions
//!
//! This crate resolves configuration contributed at several load locations
//! (box, basis, project, target, provider) into one finalized tree. Plugins
//! register a [`ConfigComponent`] per top-level namespace; the resolver merges
//! every source in precedence order through those components and then
//! finalizes each namespace.
//!
//! - **Sources**: wire fragments decoded through a [`Mapper`], one per
//!   [`LoadLocation`]
//! - **Registrations**: namespace ownership and scoped sub-registrations
//! - **Resolution**: merge then finalize, with the finalized result persisted
//!   on the terminal source for reuse
//! - **Targets**: per-target configurations derived through a
//!   [`TargetParser`] and cached per target and provider
//!
//! # Architecture
//!
//! ```text
//!                 ConfigResolver
//!                       |
//!        +--------+-----+------+---------+
//!        |        |            |         |
//!    Registrations Source    Engine   TargetCache
//!                   |          |
//!                 Mapper   ConfigComponent
//!                   |
//!              CodecRegistry
//! ```
//!
//! # Example
//!
//! ```ignore
//! use vmcfg_core::{CodecMapper, ConfigResolver, Fragment, LoadLocation, Plugin};
//!
//! let resolver = ConfigResolver::new(Arc::new(CodecMapper::default()), parser);
//! resolver.register("vm", None, Plugin::new("core", VmComponent))?;
//! resolver.add_source(Some(Fragment::load(&path)?), LoadLocation::Project)?;
//! resolver.init()?;
//!
//! for name in resolver.target_names()? {
//!     let target = resolver.target_config(&name, "", false)?;
//!     println!("{:?}", target.get_value(&["vm", "box"])?);
//! }
//! ```

pub mod cache;
pub mod cleanup;
pub mod codec;
pub mod component;
pub mod engine;
pub mod error;
pub mod interfaces;
pub mod location;
pub mod logging;
pub mod lookup;
pub mod registry;
pub mod resolver;
pub mod settings;
pub mod source;
pub mod value;
pub mod wire;

pub use cache::CacheKey;
pub use cleanup::{Cleanup, CleanupFn};
pub use codec::{CodecError, CodecMapper, CodecRegistry, ValueCodec, ValueKind};
pub use component::{ConfigComponent, Plugin};
pub use engine::Engine;
pub use error::{Error, Result};
pub use interfaces::{Mapper, OriginScope, RuntimeTarget, TargetOptions, TargetParser};
pub use location::LoadLocation;
pub use registry::{Registration, Registrations};
pub use resolver::ConfigResolver;
pub use settings::{ResolverSettings, TargetSettings};
pub use source::Source;
pub use value::{Key, RawValue, Symbol, Tree, Value};
pub use wire::{Fragment, WireEntry, WireHash, WireValue};
