use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{EngineError, ErrorCode};

/// Longest trailing window accepted, roughly ten years.
pub const MAX_WINDOW_DAYS: u32 = 3650;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub leakage: LeakageConfig,
    #[serde(default)]
    pub sizes: SizeConfig,
    #[serde(default)]
    pub effort: EffortConfig,
    #[serde(default)]
    pub tree: TreeConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "default_window_days")]
    pub days: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            days: default_window_days(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeakageConfig {
    /// Substring of the type name that marks a type as bug-like.
    #[serde(default = "default_bug_type_pattern")]
    pub bug_type_pattern: String,
    /// States that never count towards leakage (compared case-insensitively).
    #[serde(default = "default_excluded_states")]
    pub excluded_states: Vec<String>,
}

impl Default for LeakageConfig {
    fn default() -> Self {
        Self {
            bug_type_pattern: default_bug_type_pattern(),
            excluded_states: default_excluded_states(),
        }
    }
}

impl LeakageConfig {
    #[must_use]
    pub fn is_excluded_state(&self, state: &str) -> bool {
        self.excluded_states
            .iter()
            .any(|excluded| excluded.eq_ignore_ascii_case(state))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeConfig {
    /// Inclusive upper bounds for XXS, XS, S, M, L and XL. Anything above the
    /// last bound is XXL.
    #[serde(default = "default_size_thresholds")]
    pub thresholds: [f64; 6],
}

impl Default for SizeConfig {
    fn default() -> Self {
        Self {
            thresholds: default_size_thresholds(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffortConfig {
    /// Count open work centers up to the window end in trailing effort.
    #[serde(default)]
    pub count_open_work_centers: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Nodes shallower than this start expanded.
    #[serde(default = "default_expand_depth")]
    pub expand_depth: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            expand_depth: default_expand_depth(),
        }
    }
}

impl EngineConfig {
    /// Reject settings that would make derived output meaningless.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfig`] for a window outside
    /// `1..=MAX_WINDOW_DAYS` or size thresholds that are not finite and
    /// strictly ascending.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.window.days == 0 {
            return Err(EngineError::InvalidConfig(
                "window.days must be at least 1".to_string(),
            ));
        }
        if self.window.days > MAX_WINDOW_DAYS {
            return Err(EngineError::InvalidConfig(format!(
                "window.days must be at most {MAX_WINDOW_DAYS}, got {}",
                self.window.days
            )));
        }

        let thresholds = &self.sizes.thresholds;
        if thresholds.iter().any(|t| !t.is_finite()) {
            return Err(EngineError::InvalidConfig(
                "sizes.thresholds must be finite".to_string(),
            ));
        }
        if thresholds.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(EngineError::InvalidConfig(format!(
                "sizes.thresholds must be strictly ascending, got {thresholds:?}"
            )));
        }

        Ok(())
    }
}

/// Load the engine config at `path`, falling back to defaults when absent.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read, parsed, or fails
/// [`EngineConfig::validate`].
pub fn load_engine_config(path: &Path) -> Result<EngineConfig> {
    if !path.exists() {
        return Ok(EngineConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let config = toml::from_str::<EngineConfig>(&content).with_context(|| {
        format!(
            "{}: failed to parse {}",
            ErrorCode::ConfigParseError,
            path.display()
        )
    })?;

    config
        .validate()
        .with_context(|| format!("Invalid settings in {}", path.display()))?;

    Ok(config)
}

const fn default_window_days() -> u32 {
    30
}

fn default_bug_type_pattern() -> String {
    "bug".to_string()
}

fn default_excluded_states() -> Vec<String> {
    vec!["Withdrawn".to_string()]
}

const fn default_size_thresholds() -> [f64; 6] {
    [0.5, 1.0, 3.0, 5.0, 8.0, 13.0]
}

const fn default_expand_depth() -> usize {
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_uses_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let cfg = load_engine_config(&dir.path().join("flowlens.toml")).expect("load");
        assert_eq!(cfg, EngineConfig::default());
        assert_eq!(cfg.window.days, 30);
        assert_eq!(cfg.leakage.bug_type_pattern, "bug");
        assert!(!cfg.effort.count_open_work_centers);
        assert_eq!(cfg.tree.expand_depth, 1);
    }

    #[test]
    fn partial_config_keeps_other_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("flowlens.toml");
        std::fs::write(
            &path,
            r#"
[window]
days = 14

[leakage]
excluded_states = ["Withdrawn", "Duplicate"]
"#,
        )
        .expect("write config");

        let cfg = load_engine_config(&path).expect("load");
        assert_eq!(cfg.window.days, 14);
        assert_eq!(cfg.leakage.bug_type_pattern, "bug");
        assert!(cfg.leakage.is_excluded_state("duplicate"));
        assert_eq!(cfg.sizes, SizeConfig::default());
    }

    #[test]
    fn malformed_config_reports_error_code() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("flowlens.toml");
        std::fs::write(&path, "[window\ndays = ").expect("write config");

        let err = load_engine_config(&path).expect_err("must fail");
        assert!(format!("{err:#}").contains("E1001"));
    }

    #[test]
    fn non_monotonic_thresholds_are_rejected() {
        let mut cfg = EngineConfig::default();
        cfg.sizes.thresholds = [1.0, 1.0, 3.0, 5.0, 8.0, 13.0];
        assert!(matches!(cfg.validate(), Err(EngineError::InvalidConfig(_))));
    }

    #[test]
    fn zero_window_is_rejected() {
        let mut cfg = EngineConfig::default();
        cfg.window.days = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn oversized_window_is_rejected() {
        let mut cfg = EngineConfig::default();
        cfg.window.days = MAX_WINDOW_DAYS;
        assert!(cfg.validate().is_ok());

        cfg.window.days = 200_000_000;
        let err = cfg.validate().expect_err("must fail");
        assert!(matches!(err, EngineError::InvalidConfig(ref msg) if msg.contains("3650")));
    }

    #[test]
    fn oversized_window_in_file_is_rejected() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("flowlens.toml");
        std::fs::write(&path, "[window]\ndays = 200000000\n").expect("write config");

        let err = load_engine_config(&path).expect_err("must fail");
        assert!(format!("{err:#}").contains("at most 3650"));
    }

    #[test]
    fn excluded_state_match_ignores_case() {
        let cfg = LeakageConfig::default();
        assert!(cfg.is_excluded_state("withdrawn"));
        assert!(!cfg.is_excluded_state("Closed"));
    }
}
