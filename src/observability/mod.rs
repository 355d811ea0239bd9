//! Observability: tracing subscriber initialization.

use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;

static OBSERVABILITY_INIT: OnceLock<()> = OnceLock::new();

/// Initializes the global tracing subscriber.
///
/// Respects `RUST_LOG` when set; otherwise defaults to `info`, or `debug`
/// for this crate when verbose output was requested. Safe to call more
/// than once; only the first call installs a subscriber.
pub fn init(verbose: bool) {
    OBSERVABILITY_INIT.get_or_init(|| {
        let default_directive = if verbose {
            "eventsift=debug,info"
        } else {
            "info"
        };
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_directive));
        // try_init keeps this reentrancy-safe when an embedding process
        // installed its own subscriber first.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init(false);
        init(true);
    }
}
