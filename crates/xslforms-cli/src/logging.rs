use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::Registry;
use xslforms_conf::Settings;

use crate::args::GlobalArgs;

/// Install a stderr subscriber. `RUST_LOG` takes precedence over the
/// verbosity flags and the `debug` setting.
pub fn init_tracing(global: &GlobalArgs, settings: &Settings) {
    let default_directive = if global.quiet {
        "error"
    } else if global.verbose > 1 {
        "trace"
    } else if global.verbose == 1 || settings.debug {
        "debug"
    } else {
        "warn"
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(true)
        .with_filter(env_filter);

    // A subscriber may already be installed when running under a test harness.
    let _ = Registry::default().with(stderr_layer).try_init();
}
