// src/logging.rs
//
// Logger setup. `RUST_LOG` wins; otherwise `info` for this crate and
// `warn` for dependencies, or `debug` for this crate when verbose.

use env_logger::{Builder, Env};
use log::LevelFilter;

pub fn init_logger(verbose: bool) {
    let own_level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };

    let mut builder = Builder::new();
    builder
        .filter_level(LevelFilter::Warn)
        .filter_module(env!("CARGO_CRATE_NAME"), own_level)
        .format_timestamp_millis()
        .parse_env(Env::default());

    if builder.try_init().is_err() {
        log::debug!("Logger already initialized");
    }
}
