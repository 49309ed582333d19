use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

use crate::cli::CliArgs;

const DEFAULT_STATUS_CLEAR_SECS: u64 = 5;

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RuntimeConfig {
    pub source: Option<String>,
    pub kind_bin: String,
    pub kubectl_bin: String,
    pub status_clear_secs: u64,
    pub refresh_on_start: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            source: None,
            kind_bin: "kind".to_string(),
            kubectl_bin: "kubectl".to_string(),
            status_clear_secs: DEFAULT_STATUS_CLEAR_SECS,
            refresh_on_start: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
struct KiConfigFile {
    #[serde(default, alias = "kind")]
    kind_bin: Option<String>,
    #[serde(default, alias = "kubectl")]
    kubectl_bin: Option<String>,
    #[serde(default, alias = "status_clear", alias = "status_timeout_secs")]
    status_clear_secs: Option<u64>,
    #[serde(default)]
    refresh_on_start: Option<bool>,
}

impl RuntimeConfig {
    /// Loads the first config file found, then applies command line overrides.
    pub fn load(args: &CliArgs) -> Result<Self> {
        let mut config = match discover_config_path() {
            Some(path) => {
                let raw = fs::read_to_string(&path)
                    .with_context(|| format!("failed to read config {}", path.display()))?;
                Self::from_yaml(&raw)
                    .with_context(|| format!("failed to parse config {}", path.display()))?
                    .with_source(path.display().to_string())
            }
            None => Self::default(),
        };
        config.apply_args(args);
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        let parsed: KiConfigFile = if raw.trim().is_empty() {
            KiConfigFile::default()
        } else {
            serde_yaml::from_str(raw)?
        };
        let defaults = Self::default();
        Ok(Self {
            source: None,
            kind_bin: non_empty(parsed.kind_bin).unwrap_or(defaults.kind_bin),
            kubectl_bin: non_empty(parsed.kubectl_bin).unwrap_or(defaults.kubectl_bin),
            status_clear_secs: parsed
                .status_clear_secs
                .unwrap_or(defaults.status_clear_secs),
            refresh_on_start: parsed.refresh_on_start.unwrap_or(defaults.refresh_on_start),
        })
    }

    fn with_source(mut self, source: String) -> Self {
        self.source = Some(source);
        self
    }

    fn apply_args(&mut self, args: &CliArgs) {
        if let Some(kind_bin) = non_empty(args.kind_bin.clone()) {
            self.kind_bin = kind_bin;
        }
        if let Some(kubectl_bin) = non_empty(args.kubectl_bin.clone()) {
            self.kubectl_bin = kubectl_bin;
        }
        if let Some(secs) = args.status_clear_secs {
            self.status_clear_secs = secs;
        }
        if args.no_initial_refresh {
            self.refresh_on_start = false;
        }
        self.status_clear_secs = self.status_clear_secs.max(1);
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn discover_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("KI_CONFIG")
        && !path.trim().is_empty()
    {
        return Some(PathBuf::from(path));
    }

    let cwd_candidates = [
        PathBuf::from("ki.yaml"),
        PathBuf::from("ki.yml"),
        PathBuf::from(".ki.yaml"),
    ];
    for candidate in cwd_candidates {
        if candidate.exists() {
            return Some(candidate);
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let user_candidates = [
            PathBuf::from(&home).join(".config/ki/config.yaml"),
            PathBuf::from(&home).join(".config/ki/config.yml"),
            PathBuf::from(&home).join(".ki.yaml"),
        ];
        for candidate in user_candidates {
            if candidate.exists() {
                return Some(candidate);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::RuntimeConfig;
    use crate::cli::CliArgs;
    use clap::Parser;

    #[test]
    fn empty_file_uses_defaults() {
        let config = RuntimeConfig::from_yaml("").unwrap();
        assert_eq!(config, RuntimeConfig::default());
        assert_eq!(config.status_clear_secs, 5);
    }

    #[test]
    fn file_values_and_aliases_are_read() {
        let config = RuntimeConfig::from_yaml(
            "kind: /opt/bin/kind\nkubectl_bin: kubectl-1.31\nstatus_clear: 9\nrefresh_on_start: false\n",
        )
        .unwrap();
        assert_eq!(config.kind_bin, "/opt/bin/kind");
        assert_eq!(config.kubectl_bin, "kubectl-1.31");
        assert_eq!(config.status_clear_secs, 9);
        assert!(!config.refresh_on_start);
    }

    #[test]
    fn blank_binaries_fall_back_to_defaults() {
        let config = RuntimeConfig::from_yaml("kind_bin: '  '\n").unwrap();
        assert_eq!(config.kind_bin, "kind");
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        assert!(RuntimeConfig::from_yaml("status_clear_secs: [nope").is_err());
    }

    #[test]
    fn cli_overrides_file_and_clamps_interval() {
        let args = CliArgs::parse_from([
            "ki",
            "--kind-bin",
            "kind-dev",
            "--status-clear-secs",
            "0",
            "--no-initial-refresh",
        ]);
        let mut config = RuntimeConfig::from_yaml("kind_bin: kind-file\n").unwrap();
        config.apply_args(&args);
        assert_eq!(config.kind_bin, "kind-dev");
        assert_eq!(config.kubectl_bin, "kubectl");
        assert_eq!(config.status_clear_secs, 1);
        assert!(!config.refresh_on_start);
    }
}
