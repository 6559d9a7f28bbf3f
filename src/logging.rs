use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "mood_log_lib=info";

/// Install the global fmt subscriber. `RUST_LOG` overrides the default filter.
///
/// Returns false if a subscriber was already installed.
pub fn init_tracing() -> bool {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
    )
    .try_init()
    .is_ok()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_second_init_is_harmless() {
    init_tracing();
    assert!(!init_tracing());
  }
}
