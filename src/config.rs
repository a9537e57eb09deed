use crate::cli::Args;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

/// Effective runtime settings: CLI flags override the optional config file,
/// which overrides the built-in defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub output_dir: PathBuf,
    pub interval: String,
    pub range: String,
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("analysis_outputs"),
            interval: "1d".to_string(),
            range: "1y".to_string(),
            request_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    pub output_dir: Option<PathBuf>,
    pub interval: Option<String>,
    pub range: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

pub fn load_config(path: &str) -> Result<ConfigFile, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(path)?;
    let config: ConfigFile = serde_json::from_str(&content)?;
    Ok(config)
}

impl AppConfig {
    pub fn resolve(args: &Args, file: ConfigFile) -> Self {
        let defaults = Self::default();
        Self {
            output_dir: args
                .output_dir
                .clone()
                .or(file.output_dir)
                .unwrap_or(defaults.output_dir),
            interval: args
                .interval
                .clone()
                .or(file.interval)
                .unwrap_or(defaults.interval),
            range: args.range.clone().or(file.range).unwrap_or(defaults.range),
            request_timeout_secs: file
                .request_timeout_secs
                .unwrap_or(defaults.request_timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn cli_flags_override_file_values() {
        let args = Args::try_parse_from([
            "stockscope",
            "AAPL",
            "--interval",
            "1wk",
            "--output-dir",
            "/tmp/custom",
        ])
        .unwrap();
        let file = ConfigFile {
            output_dir: Some(PathBuf::from("/tmp/from-file")),
            interval: Some("1d".into()),
            range: Some("6mo".into()),
            request_timeout_secs: Some(30),
        };
        let config = AppConfig::resolve(&args, file);
        assert_eq!(config.output_dir, PathBuf::from("/tmp/custom"));
        assert_eq!(config.interval, "1wk");
        assert_eq!(config.range, "6mo");
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn defaults_apply_without_file_or_flags() {
        let args = Args::try_parse_from(["stockscope", "AAPL"]).unwrap();
        let config = AppConfig::resolve(&args, ConfigFile::default());
        assert_eq!(config.output_dir, PathBuf::from("analysis_outputs"));
        assert_eq!(config.interval, "1d");
        assert_eq!(config.range, "1y");
        assert_eq!(config.request_timeout_secs, 10);
    }
}
