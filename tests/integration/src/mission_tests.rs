//! Mission-based Integration Tests
//!
//! These tests drive the resolver the way an orchestrator does across its
//! phases: resolve a project, persist the result, reload it in a later
//! phase, derive targets concurrently and tear everything down.

use std::path::Path;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;
use tempfile::TempDir;
use vmcfg_core::{
    ConfigResolver, Fragment, LoadLocation, OriginScope, Plugin, ResolverSettings, Value,
    WireHash, WireValue,
};
use vmcfg_test_utils::{
    Finalizing, PreferOverlay, Recording, ScriptedParser, TestOrigin, config, fragment,
    raw_definition, resolver, resolver_with_origin, vm_definitions,
};

// =============================================================================
// Test Infrastructure
// =============================================================================

fn vm_fragment(key: &str, value: &str) -> WireHash {
    WireHash::new().with("vm", config(&[(key, WireValue::string(value))]))
}

fn parser() -> ScriptedParser {
    ScriptedParser::new()
        .with_target(&raw_definition("web"), vm_fragment("box", "ubuntu"))
        .with_target(&raw_definition("db"), vm_fragment("box", "postgres"))
}

/// Write the box and project fragments a loader would hand over
fn write_sources(dir: &Path) {
    fragment(&[(
        "ssh",
        config(&[("port", WireValue::Integer(22)), ("user", WireValue::string("vagrant"))]),
    )])
    .save(&dir.join("box.json"))
    .unwrap();

    fragment(&[
        ("vm", vm_definitions(&["web", "db"])),
        ("ssh", config(&[("user", WireValue::string("deploy"))])),
    ])
    .save(&dir.join("project.json"))
    .unwrap();
}

fn load(resolver: &ConfigResolver, dir: &Path) {
    resolver
        .add_source(Some(Fragment::load(&dir.join("box.json")).unwrap()), LoadLocation::Box)
        .unwrap();
    resolver
        .add_source(
            Some(Fragment::load(&dir.join("project.json")).unwrap()),
            LoadLocation::Project,
        )
        .unwrap();
}

// =============================================================================
// Mission 1: Cross-phase reuse of finalized configuration
// =============================================================================

mod m1_persisted_reuse {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn finalized_project_is_reused_by_later_phase() {
        let _ = vmcfg_core::logging::init("vmcfg_core=debug");
        let temp = TempDir::new().unwrap();
        write_sources(temp.path());

        // Phase one resolves everything and persists the project source
        let first_vm = Recording::new(Finalizing);
        let first_ssh = Recording::new(PreferOverlay);
        let first = resolver(Arc::new(parser()));
        first.register("vm", None, Plugin::new("core", first_vm.clone())).unwrap();
        first.register("ssh", None, Plugin::new("ssh", first_ssh.clone())).unwrap();
        load(&first, temp.path());
        first.init().unwrap();

        assert_eq!(first_ssh.merges(), 1);
        assert_eq!(first.get_value(&["ssh", "user"]).unwrap(), Value::from("deploy"));
        assert_eq!(first.get_value(&["ssh", "port"]).unwrap(), Value::Integer(22));

        let persisted = first.source(LoadLocation::Project).unwrap();
        assert!(persisted.is_finalized());
        persisted.save(&temp.path().join("project.json")).unwrap();

        // Phase two starts from disk and never calls a component
        let second_vm = Recording::new(Finalizing);
        let second_ssh = Recording::new(PreferOverlay);
        let second = resolver(Arc::new(parser()));
        second.register("vm", None, Plugin::new("core", second_vm.clone())).unwrap();
        second.register("ssh", None, Plugin::new("ssh", second_ssh.clone())).unwrap();
        load(&second, temp.path());
        second.init().unwrap();

        assert_eq!(second_vm.merges() + second_vm.finalizes(), 0);
        assert_eq!(second_ssh.merges() + second_ssh.finalizes(), 0);
        assert_eq!(*second.root().unwrap(), *first.root().unwrap());
        assert_eq!(second.target_names().unwrap(), vec!["web", "db"]);
    }

    #[test]
    fn settings_file_redirects_target_lookup() {
        let temp = TempDir::new().unwrap();
        let settings_path = temp.path().join("resolver.toml");
        std::fs::write(
            &settings_path,
            "[targets]\nnamespace = \"machines\"\ndefault_name = \"primary\"\n",
        )
        .unwrap();
        let settings = ResolverSettings::load(&settings_path).unwrap();

        let resolver = resolver(Arc::new(parser())).with_settings(settings);
        resolver.register("machines", None, Plugin::new("machines", PreferOverlay)).unwrap();
        resolver.register("vm", None, Plugin::new("core", PreferOverlay)).unwrap();
        resolver
            .add_source(
                Some(fragment(&[("machines", vm_definitions(&["web"]))])),
                LoadLocation::Project,
            )
            .unwrap();
        resolver.init().unwrap();

        assert_eq!(resolver.primary_target_name().unwrap(), "web");
        let web = resolver.target_config("web", "", false).unwrap();
        assert_eq!(web.get_value(&["vm", "box"]).unwrap(), Value::from("ubuntu"));
        assert_eq!(resolver.target_names().unwrap(), vec!["web"]);
    }
}

// =============================================================================
// Mission 2: Concurrent target derivation
// =============================================================================

mod m2_concurrent_targets {
    use super::*;
    use pretty_assertions::assert_eq;

    fn initialized(parser: Arc<ScriptedParser>) -> Arc<ConfigResolver> {
        let resolver = resolver(parser);
        resolver.register("vm", None, Plugin::new("core", PreferOverlay)).unwrap();
        resolver
            .add_source(
                Some(fragment(&[("vm", vm_definitions(&["web", "db"]))])),
                LoadLocation::Project,
            )
            .unwrap();
        resolver.init().unwrap();
        Arc::new(resolver)
    }

    #[test]
    fn same_target_is_derived_once() {
        const THREADS: usize = 8;
        let parser = Arc::new(parser().with_delay(Duration::from_millis(50)));
        let resolver = initialized(parser.clone());
        let barrier = Arc::new(Barrier::new(THREADS));

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let resolver = Arc::clone(&resolver);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    resolver.target_config("web", "", false)
                })
            })
            .collect();

        let results: Vec<_> = handles
            .into_iter()
            .map(|h| h.join().unwrap().unwrap())
            .collect();

        assert_eq!(parser.target_calls(), 1);
        assert!(results.iter().all(|r| Arc::ptr_eq(r, &results[0])));
        assert_eq!(results[0].get_value(&["vm", "box"]).unwrap(), Value::from("ubuntu"));
    }

    #[test]
    fn distinct_targets_derive_independently() {
        let parser = Arc::new(parser().with_delay(Duration::from_millis(20)));
        let resolver = initialized(parser.clone());
        let barrier = Arc::new(Barrier::new(2));

        let handles: Vec<_> = ["web", "db"]
            .into_iter()
            .map(|name| {
                let resolver = Arc::clone(&resolver);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    resolver
                        .target_config(name, "", false)
                        .and_then(|config| config.get_value(&["vm", "box"]))
                })
            })
            .collect();

        let boxes: Vec<_> = handles
            .into_iter()
            .map(|h| h.join().unwrap().unwrap())
            .collect();

        assert_eq!(boxes, vec![Value::from("ubuntu"), Value::from("postgres")]);
        assert_eq!(parser.target_calls(), 2);
    }

    #[test]
    fn readers_see_complete_roots_during_reinit() {
        let resolver = initialized(Arc::new(parser()));
        let writer = {
            let resolver = Arc::clone(&resolver);
            thread::spawn(move || {
                for _ in 0..50 {
                    resolver.init().unwrap();
                }
            })
        };

        for _ in 0..50 {
            let names = resolver.target_names().unwrap();
            assert_eq!(names, vec!["web", "db"]);
        }
        writer.join().unwrap();
    }
}

// =============================================================================
// Mission 3: Runtime targets and teardown
// =============================================================================

mod m3_teardown {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn closing_project_closes_everything_derived() {
        let origin = TestOrigin::new("project");
        let resolver = resolver_with_origin(
            Arc::new(parser()),
            origin.clone() as Arc<dyn OriginScope>,
        );
        resolver.register("vm", None, Plugin::new("core", PreferOverlay)).unwrap();
        resolver
            .add_source(
                Some(fragment(&[("vm", vm_definitions(&["web", "db"]))])),
                LoadLocation::Project,
            )
            .unwrap();
        resolver.init().unwrap();

        let closed = Arc::new(std::sync::Mutex::new(Vec::new()));
        for name in resolver.target_names().unwrap() {
            resolver.target(&name, "").unwrap();
            let config = resolver.target_config(&name, "", false).unwrap();
            let closed = Arc::clone(&closed);
            config.closer(move || {
                closed.lock().unwrap().push(name);
                Ok(())
            });
        }
        assert_eq!(origin.targets().len(), 2);
        assert_eq!(origin.pending_closers(), 2);

        for target in origin.targets() {
            let attached = target.config().unwrap();
            assert_eq!(attached.locations(), vec![LoadLocation::Project, LoadLocation::Target]);
            target.close().unwrap();
            assert_eq!(target.pending_closers(), 0);
        }

        origin.close().unwrap();
        assert_eq!(*closed.lock().unwrap(), vec!["db", "web"]);
    }
}
