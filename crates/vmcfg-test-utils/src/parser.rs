//! [`ScriptedParser`]: a [`TargetParser`] backed by a lookup table.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;
use vmcfg_core::{Error, RawValue, Result, TargetParser, WireHash};

/// Answers parse requests by matching the raw definition text.
///
/// Unknown definitions fail with [`Error::Parser`]. Calls are counted so tests
/// can assert how often the legacy runtime would have been contacted.
///
/// # Example
///
/// ```rust,no_run
/// use vmcfg_core::WireHash;
/// use vmcfg_test_utils::ScriptedParser;
///
/// let parser = ScriptedParser::new()
///     .with_target("config.vm.define :web", WireHash::new());
/// assert_eq!(parser.target_calls(), 0);
/// ```
#[derive(Default)]
pub struct ScriptedParser {
    targets: HashMap<String, WireHash>,
    providers: HashMap<(String, String), WireHash>,
    delay: Option<Duration>,
    target_calls: AtomicUsize,
    provider_calls: AtomicUsize,
    requests: Mutex<Vec<String>>,
}

impl ScriptedParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `raw` with `fragment` for target parse requests.
    pub fn with_target(mut self, raw: &str, fragment: WireHash) -> Self {
        self.targets.insert(raw.to_string(), fragment);
        self
    }

    /// Answer `raw` with `fragment` for requests for `provider`.
    pub fn with_provider(mut self, provider: &str, raw: &str, fragment: WireHash) -> Self {
        self.providers
            .insert((provider.to_string(), raw.to_string()), fragment);
        self
    }

    /// Sleep before answering, to widen race windows.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn target_calls(&self) -> usize {
        self.target_calls.load(Ordering::SeqCst)
    }

    pub fn provider_calls(&self) -> usize {
        self.provider_calls.load(Ordering::SeqCst)
    }

    /// Raw definitions received, in call order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }

    fn pause(&self, raw: &RawValue) {
        self.requests.lock().push(raw.source().to_string());
        if let Some(delay) = self.delay {
            thread::sleep(delay);
        }
    }
}

impl TargetParser for ScriptedParser {
    fn parse_target(&self, raw: &RawValue) -> Result<WireHash> {
        self.target_calls.fetch_add(1, Ordering::SeqCst);
        self.pause(raw);
        self.targets
            .get(raw.source())
            .cloned()
            .ok_or_else(|| Error::parser(raw.source(), "no scripted target response"))
    }

    fn parse_provider(&self, provider: &str, raw: &RawValue) -> Result<WireHash> {
        self.provider_calls.fetch_add(1, Ordering::SeqCst);
        self.pause(raw);
        self.providers
            .get(&(provider.to_string(), raw.source().to_string()))
            .cloned()
            .ok_or_else(|| Error::parser(raw.source(), format!("no scripted response for provider '{provider}'")))
    }
}
