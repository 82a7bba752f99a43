use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `debug` or
/// `diet_order_planner_rs::solver=trace`.
pub const LOG_ENV: &str = "DIET_PLANNER_LOG";

fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Filter from `-v` count, falling back to the environment when no flag is
/// given.
pub fn build_filter(verbosity: u8) -> EnvFilter {
    if verbosity == 0 {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level_for(0)))
    } else {
        EnvFilter::new(level_for(verbosity))
    }
}

/// Install the stderr subscriber. Safe to call more than once.
pub fn init_logging(verbosity: u8) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(build_filter(verbosity))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(level_for(0), "warn");
        assert_eq!(level_for(1), "info");
        assert_eq!(level_for(2), "debug");
        assert_eq!(level_for(9), "trace");
        assert_eq!(build_filter(2).to_string(), "debug");
    }
}
