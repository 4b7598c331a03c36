//! Configuration file loader with multi-source merging

use super::ConfigError;
use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

/// Project-level config file names, checked in order
const PROJECT_FILES: [&str; 2] = ["duet.toml", ".duet.toml"];

/// Prefix of environment overrides, e.g. `DUET_SCHEDULER__WORKERS=4`
const ENV_PREFIX: &str = "DUET_";

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (`DUET_<SECTION>__<KEY>`)
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./duet.toml` or `./.duet.toml`
    /// 4. Global config: `$XDG_CONFIG_HOME/duet/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&PathBuf>) -> Result<FileConfig, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        // Add global config (XDG or fallback)
        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(&global_path));
        }

        if let Some(path) = Self::project_config_path() {
            figment = figment.merge(Toml::file(path));
        }

        // Add explicit config path (highest priority for files)
        if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.clone()));
            }
            figment = figment.merge(Toml::file(path));
        }

        Self::extract(figment)
    }

    /// Load defaults plus environment overrides, skipping every file (for --no-config)
    pub fn load_without_files() -> Result<FileConfig, ConfigError> {
        Self::extract(Figment::new().merge(Serialized::defaults(FileConfig::default())))
    }

    fn extract(figment: Figment) -> Result<FileConfig, ConfigError> {
        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(|e| ConfigError::Load(Box::new(e)))
    }

    /// Get the global config file path
    ///
    /// Returns XDG_CONFIG_HOME/duet/config.toml if set,
    /// otherwise falls back to ~/.config/duet/config.toml
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("duet").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Print the config file locations being used (for debugging)
    pub fn print_config_sources(config_path: Option<&Path>) {
        println!("Configuration sources (in priority order):");

        println!("  [ENV  ] Environment: {}<SECTION>__<KEY>", ENV_PREFIX);

        if let Some(path) = config_path {
            let marker = if path.exists() { "FOUND" } else { "MISSING" };
            println!("  [{:<5}] Explicit: {}", marker, path.display());
        }

        // Project config
        if let Some(path) = Self::project_config_path() {
            println!("  [FOUND] Project: {}", path.display());
        } else {
            println!("  [     ] Project: ./duet.toml or ./.duet.toml");
        }

        // Global config
        if let Some(path) = Self::global_config_path() {
            if path.exists() {
                println!("  [FOUND] Global:  {}", path.display());
            } else {
                println!("  [     ] Global:  {}", path.display());
            }
        }

        println!("  [     ] Default: built-in defaults");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_load_without_files_uses_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file("duet.toml", "[scheduler]\nworkers = 3\n")?;
            let config = ConfigLoader::load_without_files().unwrap();
            assert_eq!(config, FileConfig::default());
            Ok(())
        });
    }

    #[test]
    fn test_project_file_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file("duet.toml", "[scheduler]\nworkers = 3\n")?;
            let config = ConfigLoader::load(None).unwrap();
            assert_eq!(config.scheduler.workers, 3);
            assert_eq!(config.dialogue.max_prompt, 5);
            Ok(())
        });
    }

    #[test]
    fn test_hidden_project_file_is_found() {
        Jail::expect_with(|jail| {
            jail.create_file(".duet.toml", "[dialogue]\nmax_prompt = 9\n")?;
            let config = ConfigLoader::load(None).unwrap();
            assert_eq!(config.dialogue.max_prompt, 9);
            Ok(())
        });
    }

    #[test]
    fn test_explicit_file_overrides_project_file() {
        Jail::expect_with(|jail| {
            jail.create_file("duet.toml", "[scheduler]\nworkers = 3\nbase_port = 7000\n")?;
            jail.create_file("custom.toml", "[scheduler]\nworkers = 6\n")?;
            let config = ConfigLoader::load(Some(&PathBuf::from("custom.toml"))).unwrap();
            assert_eq!(config.scheduler.workers, 6);
            assert_eq!(config.scheduler.base_port, 7000);
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_files() {
        Jail::expect_with(|jail| {
            jail.create_file("duet.toml", "[scheduler]\nworkers = 3\n")?;
            jail.set_env("DUET_SCHEDULER__WORKERS", "12");
            jail.set_env("DUET_STORAGE__CONVERSATION_LOG", "out/pairs.jsonl");
            let config = ConfigLoader::load(None).unwrap();
            assert_eq!(config.scheduler.workers, 12);
            assert_eq!(
                config.storage.conversation_log,
                Some(PathBuf::from("out/pairs.jsonl"))
            );
            Ok(())
        });
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        Jail::expect_with(|_| {
            let result = ConfigLoader::load(Some(&PathBuf::from("nope.toml")));
            assert!(matches!(result, Err(ConfigError::NotFound(_))));
            Ok(())
        });
    }

    #[test]
    fn test_malformed_value_is_a_load_error() {
        Jail::expect_with(|jail| {
            jail.create_file("duet.toml", "[scheduler]\nworkers = \"many\"\n")?;
            assert!(matches!(
                ConfigLoader::load(None),
                Err(ConfigError::Load(_))
            ));
            Ok(())
        });
    }

    #[test]
    fn test_global_config_path_returns_some() {
        // Should return a path (even if file doesn't exist)
        let path = ConfigLoader::global_config_path();
        assert!(path.is_some());
        let path = path.unwrap();
        assert!(path.to_string_lossy().contains("duet"));
    }
}
