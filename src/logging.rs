//! Logging setup for the command line binary.
//!
//! Library code only emits `tracing` events; installing a subscriber is left to the binary so
//! host build tools keep control of their own output.

use anyhow::{Result, anyhow};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install a stderr subscriber honouring `RUST_LOG`.
///
/// Without `RUST_LOG` the level is `info`, or `debug` when `verbose` is set.
pub fn init(verbose: bool) -> Result<()> {
  let default_level = if verbose { "debug" } else { "info" };
  let env_filter =
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

  tracing_subscriber::registry()
    .with(env_filter)
    .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
    .try_init()
    .map_err(|err| anyhow!("failed to initialise logging: {err}"))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn second_init_is_an_error_not_a_panic() {
    let _ = init(false);
    assert!(init(true).is_err());
  }
}
