use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize a tracing subscriber for resolver diagnostics.
///
/// Filters come from `RUST_LOG`; when it is unset, `default_directive` is
/// used (for example `"vmcfg_core=debug"`). Resolution steps log at `debug`
/// and per-namespace work at `trace`.
pub fn init(default_directive: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_level(true)
        .compact();

    let filter_layer =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_directive))?;

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_init() {
        // Only one subscriber per process; a second init reports an error
        let _ = init("vmcfg_core=trace");
        assert!(init("vmcfg_core=trace").is_err());

        tracing::debug!(namespace = "vm", "Merging values");
    }
}
