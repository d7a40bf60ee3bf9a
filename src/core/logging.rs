//! Log subscriber setup for the binary

use std::sync::Once;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Install the stderr subscriber once; `RUST_LOG` overrides `default_level`
pub fn init(default_level: &str) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_level));

        let _ = tracing_subscriber::fmt()
            .compact()
            .with_target(false)
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .try_init();
    });
}

/// Level implied by the global verbosity flags
pub fn level_for(verbose: bool, quiet: bool) -> &'static str {
    match (verbose, quiet) {
        (true, _) => "debug",
        (false, true) => "error",
        (false, false) => "warn",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for() {
        assert_eq!(level_for(true, true), "debug");
        assert_eq!(level_for(false, true), "error");
        assert_eq!(level_for(false, false), "warn");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init("warn");
        init("debug");
    }
}
