//! Config command implementations

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::output::{print_error, print_info, print_success, print_warning};
use sx_core::config::{self, ClientConfig};

fn resolve(config_path: Option<&PathBuf>) -> PathBuf {
    config_path
        .cloned()
        .unwrap_or_else(config::default_config_path)
}

/// Load the client configuration, falling back to defaults when no file exists
pub fn load_client_config(config_path: Option<&PathBuf>) -> Result<ClientConfig> {
    let path = resolve(config_path);

    let config = if path.exists() {
        config::load_config::<ClientConfig>(&path)
            .with_context(|| format!("Failed to load config file: {:?}", path))?
    } else {
        if config_path.is_some() {
            anyhow::bail!("Config file not found: {:?}", path);
        }
        tracing::debug!(path = ?path, "No config file, using defaults");
        ClientConfig::default()
    };

    config.validate()?;
    Ok(config)
}

/// Show current configuration
pub fn config_show(config_path: Option<&PathBuf>) -> Result<()> {
    let path = resolve(config_path);

    if !path.exists() {
        print_warning(&format!("No configuration file found at {:?}", path));
        print_info("Using defaults:");
        println!();
        println!("{}", render(&ClientConfig::default())?);
        return Ok(());
    }

    print_info(&format!("Configuration file: {:?}", path));
    println!();

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;
    println!("{}", content);

    Ok(())
}

/// Print the config file path
pub fn config_path(config_path: Option<&PathBuf>) -> Result<()> {
    println!("{}", resolve(config_path).display());
    Ok(())
}

/// Initialize default configuration
pub fn config_init(config_path: Option<&PathBuf>, force: bool) -> Result<()> {
    let config_file = resolve(config_path);

    if config_file.exists() && !force {
        print_error(&format!("Config file already exists: {:?}", config_file));
        print_info("Use --force to overwrite");
        return Ok(());
    }

    write_default(&config_file)?;
    print_success(&format!("Created configuration file: {:?}", config_file));
    Ok(())
}

fn write_default(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create config directory: {:?}", dir))?;
    }

    let content = format!(
        "# synapse-exec configuration\n\
         # attach_path and execute_path are joined onto service_url\n\n{}",
        render(&ClientConfig::default())?
    );
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write config file: {:?}", path))
}

fn render(config: &ClientConfig) -> Result<String> {
    toml::to_string_pretty(config).context("Failed to render configuration")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_writes_loadable_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        config_init(Some(&path), false).unwrap();

        let loaded = load_client_config(Some(&path)).unwrap();
        assert_eq!(loaded, ClientConfig::default());
    }

    #[test]
    fn test_init_keeps_existing_file_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "service_url = \"ws://10.0.0.2:24892/\"\n").unwrap();

        config_init(Some(&path), false).unwrap();
        let kept = load_client_config(Some(&path)).unwrap();
        assert_eq!(kept.service_url, "ws://10.0.0.2:24892/");

        config_init(Some(&path), true).unwrap();
        let replaced = load_client_config(Some(&path)).unwrap();
        assert_eq!(replaced, ClientConfig::default());
    }

    #[test]
    fn test_explicit_missing_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        assert!(load_client_config(Some(&path)).is_err());
    }

    #[test]
    fn test_invalid_url_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "service_url = \"http://localhost:24892/\"\n").unwrap();

        assert!(load_client_config(Some(&path)).is_err());
    }
}
