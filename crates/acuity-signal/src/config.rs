//! Configuration loading and signal factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use acuity_core::traits::DistanceSignal;

use crate::fixed::{FixedSignal, ScriptedSignal};
use crate::http::HttpSignal;

/// Which distance signal gates the test.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SignalConfig {
    /// Never blocks progression.
    #[default]
    Always,
    /// Constant answer.
    Fixed { acceptable: bool },
    /// Replays `readings`, then repeats the last one.
    Scripted { readings: Vec<bool> },
    /// Remote detector exposing `/check_distance`.
    Http {
        url: String,
        #[serde(default)]
        timeout_secs: Option<u64>,
    },
}

/// Top-level acuity configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcuityConfig {
    /// Chart file to use instead of the built-in Snellen chart.
    #[serde(default)]
    pub chart: Option<PathBuf>,
    /// Output directory for reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Wait for an acceptable distance before every letter.
    #[serde(default = "default_true")]
    pub require_distance: bool,
    /// Delay between distance checks while waiting, in milliseconds.
    #[serde(default = "default_poll_interval")]
    pub distance_poll_interval_ms: u64,
    #[serde(default)]
    pub signal: SignalConfig,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./acuity-results")
}
fn default_true() -> bool {
    true
}
fn default_poll_interval() -> u64 {
    500
}

impl Default for AcuityConfig {
    fn default() -> Self {
        Self {
            chart: None,
            output_dir: default_output_dir(),
            require_distance: true,
            distance_poll_interval_ms: default_poll_interval(),
            signal: SignalConfig::default(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are copied verbatim and never rescanned.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        let var_name = &rest[start + 2..start + end];
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

fn resolve_signal_config(config: &SignalConfig) -> SignalConfig {
    match config {
        SignalConfig::Http { url, timeout_secs } => SignalConfig::Http {
            url: resolve_env_vars(url),
            timeout_secs: *timeout_secs,
        },
        other => other.clone(),
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `acuity.toml` in the current directory
/// 2. `~/.config/acuity/config.toml`
///
/// Environment variable override: `ACUITY_SIGNAL_URL` selects an HTTP signal.
pub fn load_config() -> Result<AcuityConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<AcuityConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("acuity.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<AcuityConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => AcuityConfig::default(),
    };

    if let Ok(url) = std::env::var("ACUITY_SIGNAL_URL") {
        let timeout_secs = match &config.signal {
            SignalConfig::Http { timeout_secs, .. } => *timeout_secs,
            _ => None,
        };
        config.signal = SignalConfig::Http { url, timeout_secs };
    }

    config.signal = resolve_signal_config(&config.signal);

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("acuity"))
}

/// Create a signal instance from its configuration.
pub fn create_signal(config: &SignalConfig) -> Result<Arc<dyn DistanceSignal>> {
    match config {
        SignalConfig::Always => Ok(Arc::new(FixedSignal::acceptable())),
        SignalConfig::Fixed { acceptable } => Ok(Arc::new(FixedSignal::new(*acceptable))),
        SignalConfig::Scripted { readings } => {
            Ok(Arc::new(ScriptedSignal::new(readings.iter().copied())))
        }
        SignalConfig::Http { url, timeout_secs } => {
            anyhow::ensure!(!url.trim().is_empty(), "http signal requires a url");
            Ok(Arc::new(HttpSignal::new(url, *timeout_secs)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_ACUITY_TEST_VAR", "detector");
        assert_eq!(resolve_env_vars("${_ACUITY_TEST_VAR}"), "detector");
        assert_eq!(
            resolve_env_vars("http://${_ACUITY_TEST_VAR}:5000"),
            "http://detector:5000"
        );
        std::env::remove_var("_ACUITY_TEST_VAR");
    }

    #[test]
    fn resolve_env_vars_does_not_rescan_values() {
        std::env::set_var("_ACUITY_SELF_REF", "${_ACUITY_SELF_REF}");
        assert_eq!(
            resolve_env_vars("http://${_ACUITY_SELF_REF}"),
            "http://${_ACUITY_SELF_REF}"
        );
        std::env::remove_var("_ACUITY_SELF_REF");
    }

    #[test]
    fn resolve_env_vars_edge_cases() {
        assert_eq!(resolve_env_vars("no refs"), "no refs");
        assert_eq!(resolve_env_vars("open ${UNTERMINATED"), "open ${UNTERMINATED");
        assert_eq!(resolve_env_vars("${_ACUITY_UNSET_VAR}:5000"), ":5000");
    }

    #[test]
    fn default_config() {
        let config = AcuityConfig::default();
        assert_eq!(config.signal, SignalConfig::Always);
        assert!(config.require_distance);
        assert_eq!(config.distance_poll_interval_ms, 500);
        assert!(config.chart.is_none());
    }

    #[test]
    fn parse_full_config() {
        let toml_str = r#"
chart = "charts/snellen.toml"
output_dir = "./results"
require_distance = false
distance_poll_interval_ms = 250

[signal]
type = "http"
url = "http://localhost:5000"
timeout_secs = 3
"#;
        let config: AcuityConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.chart, Some(PathBuf::from("charts/snellen.toml")));
        assert!(!config.require_distance);
        assert_eq!(
            config.signal,
            SignalConfig::Http {
                url: "http://localhost:5000".into(),
                timeout_secs: Some(3)
            }
        );
    }

    #[test]
    fn parse_fixed_signal() {
        let config: AcuityConfig =
            toml::from_str("[signal]\ntype = \"fixed\"\nacceptable = false\n").unwrap();
        assert_eq!(config.signal, SignalConfig::Fixed { acceptable: false });
        assert_eq!(config.output_dir, PathBuf::from("./acuity-results"));
    }

    #[test]
    fn parse_scripted_signal() {
        let config: AcuityConfig =
            toml::from_str("[signal]\ntype = \"scripted\"\nreadings = [false, true]\n").unwrap();
        assert_eq!(
            config.signal,
            SignalConfig::Scripted {
                readings: vec![false, true]
            }
        );
    }

    #[test]
    fn load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("acuity.toml");
        std::fs::write(&path, "require_distance = false\n").unwrap();

        let config = load_config_from(Some(&path)).unwrap();
        assert!(!config.require_distance);

        assert!(load_config_from(Some(&dir.path().join("missing.toml"))).is_err());
    }

    #[tokio::test]
    async fn factory_builds_signals() {
        let always = create_signal(&SignalConfig::Always).unwrap();
        assert_eq!(always.name(), "always");
        assert!(always.distance_ok().await.unwrap());

        let fixed = create_signal(&SignalConfig::Fixed { acceptable: false }).unwrap();
        assert_eq!(fixed.name(), "fixed");
        assert!(!fixed.distance_ok().await.unwrap());

        let scripted = create_signal(&SignalConfig::Scripted {
            readings: vec![false, true],
        })
        .unwrap();
        assert_eq!(scripted.name(), "scripted");
        assert!(!scripted.distance_ok().await.unwrap());
        assert!(scripted.distance_ok().await.unwrap());
        assert!(scripted.distance_ok().await.unwrap());

        let http = create_signal(&SignalConfig::Http {
            url: "http://localhost:5000".into(),
            timeout_secs: None,
        })
        .unwrap();
        assert_eq!(http.name(), "http");

        assert!(create_signal(&SignalConfig::Http {
            url: " ".into(),
            timeout_secs: None
        })
        .is_err());
    }
}
