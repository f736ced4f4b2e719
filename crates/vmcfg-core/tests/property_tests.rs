use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use vmcfg_core::{
    CodecMapper, CodecRegistry, Fragment, Key, LoadLocation, Mapper, Plugin, RawValue, Symbol,
    Tree, Value, WireValue,
};
use vmcfg_test_utils::{PreferOverlay, ScriptedParser, config, fragment, resolver};

const NAMESPACES: [&str; 4] = ["net", "ssh", "vm", "winrm"];

fn leaf(floats: bool) -> BoxedStrategy<Value> {
    let float = if floats {
        (-1.0e12f64..1.0e12).prop_map(Value::Float).boxed()
    } else {
        Just(Value::Null).boxed()
    };
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Integer),
        float,
        "[a-z ]{0,8}".prop_map(Value::String),
        "[a-z_]{1,8}".prop_map(|s| Value::Symbol(Symbol::new(s))),
        "[ -~]{0,16}".prop_map(|s| Value::Raw(RawValue::new(s))),
    ]
    .boxed()
}

fn key() -> impl Strategy<Value = Key> {
    prop_oneof![
        "[a-z]{1,6}".prop_map(Key::String),
        "[a-z]{1,6}".prop_map(|s| Key::Symbol(Symbol::new(s))),
        any::<i64>().prop_map(Key::Integer),
    ]
}

fn value(floats: bool) -> impl Strategy<Value = Value> {
    leaf(floats).prop_recursive(3, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::List),
            prop::collection::btree_map("[a-z]{1,6}", inner.clone(), 0..4).prop_map(Value::Map),
            prop::collection::btree_map("[a-z]{1,6}", inner.clone(), 0..4)
                .prop_map(|map| Value::Tree(Tree::from(map))),
            prop::collection::vec((key(), inner), 0..4).prop_map(Value::Hash),
        ]
    })
}

fn tree(floats: bool) -> impl Strategy<Value = Tree> {
    prop::collection::btree_map("[a-z]{1,6}", value(floats), 0..4).prop_map(Tree::from)
}

fn layers() -> impl Strategy<Value = Vec<Vec<&'static str>>> {
    prop::collection::vec(prop::sample::subsequence(NAMESPACES.to_vec(), 0..=4), 5)
}

proptest! {
    #[test]
    fn test_codec_round_trip(value in value(true)) {
        let codecs = CodecRegistry::standard();
        let wire = codecs.encode_value(&value).unwrap();
        prop_assert_eq!(codecs.decode_value(&wire).unwrap(), value);
    }

    #[test]
    fn test_fragment_json_round_trip(tree in tree(false)) {
        let mapper = CodecMapper::default();
        let encoded = mapper.encode(&tree).unwrap();
        let fragment = Fragment { unfinalized: encoded.clone(), finalized: Some(encoded) };

        let restored = Fragment::from_json(&fragment.to_json().unwrap()).unwrap();
        prop_assert_eq!(&restored, &fragment);
        prop_assert_eq!(mapper.decode(&restored.unfinalized).unwrap(), tree);
    }

    #[test]
    fn test_precedence_union(layers in layers()) {
        let resolver = resolver(Arc::new(ScriptedParser::new()));
        for ns in NAMESPACES {
            resolver.register(ns, None, Plugin::new(ns, PreferOverlay)).unwrap();
        }

        let mut expected = BTreeMap::new();
        for (location, namespaces) in LoadLocation::ALL.into_iter().zip(&layers) {
            let entries: Vec<(&str, WireValue)> = namespaces
                .iter()
                .map(|ns| (*ns, config(&[("src", WireValue::string(location.as_str()))])))
                .collect();
            resolver.add_source(Some(fragment(&entries)), location).unwrap();
            for ns in namespaces {
                expected.insert(*ns, location.as_str());
            }
        }
        resolver.init().unwrap();

        let root = resolver.root().unwrap();
        let present: BTreeSet<&str> = root.keys().collect();
        prop_assert_eq!(present, expected.keys().copied().collect::<BTreeSet<_>>());
        for (ns, location) in expected {
            prop_assert_eq!(resolver.get_value(&[ns, "src"]).unwrap(), Value::from(location));
        }
    }
}
