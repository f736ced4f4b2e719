//! Builders for wire fragments and resolvers.

use std::sync::Arc;
use vmcfg_core::{
    CodecMapper, ConfigResolver, Fragment, OriginScope, TargetParser, WireHash, WireValue,
};

/// A nested configuration value from string-keyed entries.
pub fn config(entries: &[(&str, WireValue)]) -> WireValue {
    let hash = entries
        .iter()
        .fold(WireHash::new(), |hash, (key, value)| hash.with(*key, value.clone()));
    WireValue::Config(hash)
}

/// An unfinalized fragment with one entry per namespace.
pub fn fragment(namespaces: &[(&str, WireValue)]) -> Fragment {
    let hash = namespaces
        .iter()
        .fold(WireHash::new(), |hash, (ns, value)| hash.with(*ns, value.clone()));
    Fragment::new(hash)
}

/// Raw definition text used for the target called `name`.
pub fn raw_definition(name: &str) -> String {
    format!("config.vm.define :{name}")
}

/// A `vm` namespace value defining the named targets.
///
/// Target names are listed as symbols and each definition is keyed by its
/// symbol, the way the legacy runtime reports them.
pub fn vm_definitions(names: &[&str]) -> WireValue {
    let keys = names.iter().map(|n| WireValue::symbol(*n)).collect();
    let mut definitions = WireHash::new();
    for name in names {
        definitions.insert(WireValue::symbol(*name), WireValue::Raw(raw_definition(name)));
    }

    config(&[
        ("__defined_vm_keys", WireValue::Array(keys)),
        ("__defined_vms", WireValue::Hash(definitions)),
    ])
}

/// A resolver using the standard codecs and no origin.
pub fn resolver(parser: Arc<dyn TargetParser>) -> ConfigResolver {
    ConfigResolver::new(Arc::new(CodecMapper::default()), parser)
}

/// A resolver using the standard codecs, loaded for `origin`.
pub fn resolver_with_origin(
    parser: Arc<dyn TargetParser>,
    origin: Arc<dyn OriginScope>,
) -> ConfigResolver {
    resolver(parser).with_origin(origin)
}
