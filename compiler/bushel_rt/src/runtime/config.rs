//! Runtime limits and their environment overrides.

use std::time::Duration;

/// Tunables that do not change while a runtime exists.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Maximum nesting of script function calls; `None` for no limit.
    pub max_call_depth: Option<usize>,
    /// How long `delay` sleeps before checking for termination again.
    pub delay_slice: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            max_call_depth: None,
            delay_slice: Duration::from_millis(50),
        }
    }
}

impl RuntimeConfig {
    /// Defaults overridden by `BUSHEL_MAX_CALL_DEPTH` and
    /// `BUSHEL_DELAY_SLICE_MS`. Unparseable values are ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = RuntimeConfig::default();
        if let Some(depth) = lookup("BUSHEL_MAX_CALL_DEPTH").and_then(|v| v.trim().parse().ok()) {
            config.max_call_depth = Some(depth);
        }
        if let Some(ms) = lookup("BUSHEL_DELAY_SLICE_MS").and_then(|v| v.trim().parse().ok()) {
            config.delay_slice = Duration::from_millis(ms);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn overrides_come_from_the_lookup() {
        let config = RuntimeConfig::from_lookup(|key| match key {
            "BUSHEL_MAX_CALL_DEPTH" => Some("200".to_owned()),
            "BUSHEL_DELAY_SLICE_MS" => Some(" 5 ".to_owned()),
            _ => None,
        });
        assert_eq!(config.max_call_depth, Some(200));
        assert_eq!(config.delay_slice, Duration::from_millis(5));
    }

    #[test]
    fn garbage_keeps_the_defaults() {
        let config = RuntimeConfig::from_lookup(|_| Some("lots".to_owned()));
        assert_eq!(config, RuntimeConfig::default());
    }
}
