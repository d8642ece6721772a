use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initializes the global tracing subscriber with sensible defaults.
///
/// `RUST_LOG` directives are honoured; `envelope_core=info` is added on top so
/// run summaries stay visible without configuration. Returns `true` only for
/// the call that installed the subscriber.
pub fn init_tracing() -> bool {
    let mut installed = false;
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let mut filter = EnvFilter::from_default_env();
        if let Ok(directive) = "envelope_core=info".parse() {
            filter = filter.add_directive(directive);
        }

        // A host may already own the global subscriber.
        installed = fmt().with_env_filter(filter).try_init().is_ok();
    });
    installed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_calls_never_reinstall() {
        init_tracing();
        assert!(!init_tracing());
    }
}
