use crate::core::source::Frequency;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

fn default_metrics() -> Vec<String> {
    ["Total Revenue", "Gross Profit", "Operating Income", "Net Income"]
        .iter()
        .map(|m| m.to_string())
        .collect()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Directory holding one statement file per ticker. A relative path is
    /// resolved against the directory of the config file it was read from.
    pub data_path: Option<String>,
    #[serde(default = "default_metrics")]
    pub metrics: Vec<String>,
    #[serde(default)]
    pub frequency: Frequency,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            data_path: None,
            metrics: default_metrics(),
            frequency: Frequency::default(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("org", "stmtdelta", "stmtdelta")
            .context("Could not determine project directories")
    }

    pub fn default_config_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.yaml"))
    }

    pub fn statements_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        Ok(Self::project_dirs()?.data_dir().join("statements"))
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let mut config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;

        if let Some(data_path) = &config.data_path
            && Path::new(data_path).is_relative()
            && let Some(parent) = path.as_ref().parent()
        {
            let resolved = parent.join(data_path);
            debug!("Resolved data_path to {}", resolved.display());
            config.data_path = Some(resolved.to_string_lossy().into_owned());
        }
        debug!("Successfully loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
data_path: "/srv/statements"
metrics:
  - "Total Revenue"
  - "EBITDA"
frequency: annual
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.data_path.as_deref(), Some("/srv/statements"));
        assert_eq!(config.metrics, vec!["Total Revenue", "EBITDA"]);
        assert_eq!(config.frequency, Frequency::Annual);
        assert_eq!(
            config.statements_path().unwrap(),
            PathBuf::from("/srv/statements")
        );
    }

    #[test]
    fn test_config_defaults() {
        let config: AppConfig = serde_yaml::from_str("data_path: ~\n").unwrap();
        assert!(config.data_path.is_none());
        assert_eq!(config.metrics, default_metrics());
        assert_eq!(config.frequency, Frequency::Quarterly);
    }

    #[test]
    fn test_config_rejects_unknown_fields() {
        let result: Result<AppConfig, _> = serde_yaml::from_str("currency: USD\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_path() -> Result<()> {
        let file = tempfile::NamedTempFile::new()?;
        fs::write(file.path(), "frequency: quarterly\nmetrics: [\"Net Income\"]\n")?;

        let config = AppConfig::load_from_path(file.path())?;
        assert_eq!(config.metrics, vec!["Net Income"]);

        let missing = AppConfig::load_from_path(file.path().with_extension("missing"));
        assert!(
            missing
                .unwrap_err()
                .to_string()
                .contains("Failed to read config file")
        );
        Ok(())
    }

    #[test]
    fn test_relative_data_path_follows_config_file() -> Result<()> {
        let dir = tempfile::TempDir::new()?;
        let config_path = dir.path().join("config.yaml");

        fs::write(&config_path, "data_path: \"statements\"\n")?;
        let config = AppConfig::load_from_path(&config_path)?;
        assert_eq!(config.statements_path()?, dir.path().join("statements"));

        let absolute = dir.path().join("elsewhere");
        fs::write(
            &config_path,
            format!("data_path: \"{}\"\n", absolute.display()),
        )?;
        let config = AppConfig::load_from_path(&config_path)?;
        assert_eq!(config.statements_path()?, absolute);
        Ok(())
    }
}
