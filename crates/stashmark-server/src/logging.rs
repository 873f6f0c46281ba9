use crate::config::Environment;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence; otherwise our crates log at the profile's
/// default level and everything else at `info`. Calling this twice is a
/// no-op.
pub fn init_logging(env: &Environment) {
    let level = env.default_log_level();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "info,stashmark={level},stashmark_server={level},stashmark_core={level}"
        ))
    });

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_ansi(!env.is_production()))
        .try_init();
}
