//! Config command implementation.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use crate::cli::ConfigAction;
use crate::config::{Config, default_config_path};

pub fn cmd_config(action: ConfigAction, path: Option<&Path>) -> Result<()> {
    let path: PathBuf = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);

    match action {
        ConfigAction::Show => {
            let config = load_or_default(&path)?;
            let content =
                toml::to_string_pretty(&config).context("Failed to serialize config")?;
            println!("# {}", path.display());
            print!("{}", content);
        }
        ConfigAction::Get { key } => {
            println!("{}", load_or_default(&path)?.get(key));
        }
        ConfigAction::Set { key, value } => {
            let mut config = load_or_default(&path)?;
            config.set(key, &value)?;
            config.save(&path)?;
            eprintln!("Set {:?} = {}", key, config.get(key));
        }
        ConfigAction::Unset { key } => {
            let mut config = load_or_default(&path)?;
            config.unset(key);
            config.save(&path)?;
            eprintln!("Reset {:?} to {}", key, config.get(key));
        }
        ConfigAction::Path => {
            println!("{}", path.display());
        }
        ConfigAction::Init => {
            if path.exists() {
                bail!("Config file already exists: {}", path.display());
            }
            Config::default().save(&path)?;
            eprintln!("Created {}", path.display());
        }
    }
    Ok(())
}

fn load_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        Ok(Config::load(path)?)
    } else {
        Ok(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::ConfigKey;

    #[test]
    fn test_init_then_set() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        cmd_config(ConfigAction::Init, Some(path.as_path())).unwrap();
        assert!(cmd_config(ConfigAction::Init, Some(path.as_path())).is_err());

        cmd_config(
            ConfigAction::Set {
                key: ConfigKey::BaseUrl,
                value: "https://water.example.com".to_string(),
            },
            Some(path.as_path()),
        )
        .unwrap();

        let config = Config::load_validated(&path).unwrap();
        assert_eq!(config.source.base_url, "https://water.example.com");
    }

    #[test]
    fn test_set_invalid_value_leaves_file_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        cmd_config(ConfigAction::Init, Some(path.as_path())).unwrap();

        let result = cmd_config(
            ConfigAction::Set {
                key: ConfigKey::PageSize,
                value: "0".to_string(),
            },
            Some(path.as_path()),
        );

        assert!(result.is_err());
        assert_eq!(Config::load(&path).unwrap(), Config::default());
    }

    #[test]
    fn test_unset_restores_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = Config::default();
        config.source.timeout_secs = 60;
        config.save(&path).unwrap();

        cmd_config(
            ConfigAction::Unset {
                key: ConfigKey::Timeout,
            },
            Some(path.as_path()),
        )
        .unwrap();

        assert_eq!(Config::load(&path).unwrap().source.timeout_secs, 10);
    }
}
