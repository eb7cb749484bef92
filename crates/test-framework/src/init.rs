use std::sync::Once;

use tracing_subscriber::{
    self as ts,
    filter::EnvFilter,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::types::config::TestConfig;

static INIT: Once = Once::new();

/// Set up error reporting and logging for a test process, then read the
/// per-process configuration from the environment. Safe to call from
/// every test in a binary.
pub fn init_test(test_name: &str) -> TestConfig {
    INIT.call_once(|| {
        let _ = color_eyre::install();
        install_logger();
    });

    TestConfig::from_env(test_name)
}

fn install_logger() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let module_filter_fn = ts::filter::filter_fn(|metadata| match metadata.module_path() {
        Some(path) => path.starts_with("interchain"),
        None => false,
    });

    let module_filter = ts::fmt::layer().with_filter(module_filter_fn);

    ts::registry().with(env_filter).with(module_filter).init();
}
