//! Origin scopes and runtime targets for tests.

use parking_lot::Mutex;
use std::sync::Arc;
use vmcfg_core::{
    Cleanup, CleanupFn, ConfigResolver, Error, OriginScope, Result, RuntimeTarget, TargetOptions,
};

/// A basis or project scope that records loaded targets.
pub struct TestOrigin {
    name: String,
    cleanup: Mutex<Cleanup>,
    targets: Mutex<Vec<Arc<TestTarget>>>,
}

impl TestOrigin {
    pub fn new(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            cleanup: Mutex::new(Cleanup::new()),
            targets: Mutex::new(Vec::new()),
        })
    }

    /// Run the scope's cleanup tasks.
    pub fn close(&self) -> Result<()> {
        self.cleanup.lock().close()
    }

    /// Number of cleanup tasks still queued.
    pub fn pending_closers(&self) -> usize {
        self.cleanup.lock().len()
    }

    /// Targets loaded through this scope, in load order.
    pub fn targets(&self) -> Vec<Arc<TestTarget>> {
        self.targets.lock().clone()
    }
}

impl OriginScope for TestOrigin {
    fn name(&self) -> &str {
        &self.name
    }

    fn closer(&self, task: CleanupFn) {
        self.cleanup.lock().push(task);
    }

    fn load_target(&self, options: TargetOptions) -> Result<Arc<dyn RuntimeTarget>> {
        let target = Arc::new(TestTarget {
            name: options.name,
            loaded_with: options.config,
            config: Mutex::new(None),
            cleanup: Mutex::new(Cleanup::new()),
        });
        self.targets.lock().push(Arc::clone(&target));
        Ok(target)
    }
}

/// A runtime target that keeps the configuration handed to it.
pub struct TestTarget {
    name: String,
    loaded_with: Arc<ConfigResolver>,
    config: Mutex<Option<Arc<ConfigResolver>>>,
    cleanup: Mutex<Cleanup>,
}

impl TestTarget {
    /// Configuration passed to `load_target`.
    pub fn loaded_with(&self) -> Arc<ConfigResolver> {
        Arc::clone(&self.loaded_with)
    }

    /// Configuration attached after loading.
    pub fn config(&self) -> Option<Arc<ConfigResolver>> {
        self.config.lock().clone()
    }

    pub fn close(&self) -> Result<()> {
        self.cleanup.lock().close()
    }

    pub fn pending_closers(&self) -> usize {
        self.cleanup.lock().len()
    }
}

impl RuntimeTarget for TestTarget {
    fn name(&self) -> &str {
        &self.name
    }

    fn attach_config(&self, config: Arc<ConfigResolver>) {
        *self.config.lock() = Some(config);
    }

    fn scope(self: Arc<Self>) -> Arc<dyn OriginScope> {
        self
    }
}

impl OriginScope for TestTarget {
    fn name(&self) -> &str {
        &self.name
    }

    fn closer(&self, task: CleanupFn) {
        self.cleanup.lock().push(task);
    }

    fn load_target(&self, options: TargetOptions) -> Result<Arc<dyn RuntimeTarget>> {
        Err(Error::Origin {
            origin: self.name.clone(),
            target: options.name,
            reason: "targets cannot load nested targets".to_string(),
        })
    }
}
