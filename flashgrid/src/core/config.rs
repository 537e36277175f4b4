use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use directories_next::BaseDirs;
use serde::{Deserialize, Serialize};

use crate::core::error::SessionError;
use crate::runtime::recorder::RecorderConfig;
use crate::runtime::replayer::ReplayConfig;
use crate::time::clock::Millis;
use crate::time::intervals::DelayTiers;

pub const CONFIG_PATH_ENV: &str = "FLASHGRID_CONFIG";

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct Config {
    pub grid_size: usize,
    /// Only affects how the grid is drawn.
    pub grid_columns: usize,
    pub max_flashes: usize,
    pub flash_millis: Millis,
    /// Time between the last flash and telling the sink to stop.
    pub stop_delay_millis: Millis,
    pub delays: DelayTiers,
    pub replay_initial_delay_millis: Millis,
    pub replay_flash_millis: Millis,
    /// Time the sink needs after stopping before the clip can be shown.
    pub media_settle_millis: Millis,
    pub countdown_secs: u32,
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            grid_size: 9,
            grid_columns: 3,
            max_flashes: 10,
            flash_millis: 500,
            stop_delay_millis: 3_000,
            delays: DelayTiers::default(),
            replay_initial_delay_millis: 500,
            replay_flash_millis: 250,
            media_settle_millis: 1_950,
            countdown_secs: 4,
            seed: None,
        }
    }
}

impl Config {
    pub fn recorder_config(&self) -> RecorderConfig {
        RecorderConfig {
            max_flashes: self.max_flashes,
            flash_millis: self.flash_millis,
            stop_delay_millis: self.stop_delay_millis,
        }
    }

    pub fn replay_config(&self) -> ReplayConfig {
        ReplayConfig {
            initial_delay_millis: self.replay_initial_delay_millis,
            flash_millis: self.replay_flash_millis,
        }
    }

    pub fn validate(&self) -> Result<(), SessionError> {
        if self.grid_size == 0 {
            return Err(invalid("grid_size must be at least 1"));
        }
        if self.max_flashes == 0 {
            return Err(invalid("max_flashes must be at least 1"));
        }
        let tiers = &self.delays;
        for (name, range) in [
            ("delays.first", tiers.first),
            ("delays.common", tiers.common),
            ("delays.rare", tiers.rare),
        ] {
            if range.is_empty() {
                return Err(invalid(&format!(
                    "{} is empty ({}..{})",
                    name, range.min, range.max
                )));
            }
        }
        if !(0.0..=1.0).contains(&tiers.common_probability) {
            return Err(invalid(&format!(
                "delays.common_probability must be within [0, 1], got {}",
                tiers.common_probability
            )));
        }
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, SessionError> {
        let text = fs::read_to_string(path)?;
        let config = serde_yml::from_str::<Self>(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_if_exists(path: &Path) -> Result<Option<Self>, SessionError> {
        match Self::load(path) {
            Ok(config) => Ok(Some(config)),
            Err(SessionError::Io(err)) if err.kind() == ErrorKind::NotFound => {
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// `$FLASHGRID_CONFIG` if set, otherwise
    /// `<config dir>/FlashGrid/config.yml`.
    pub fn default_path() -> Option<PathBuf> {
        if let Some(path) = env::var_os(CONFIG_PATH_ENV) {
            return Some(PathBuf::from(path));
        }
        BaseDirs::new()
            .map(|base| base.config_dir().join("FlashGrid").join("config.yml"))
    }
}

fn invalid(reason: &str) -> SessionError {
    SessionError::InvalidConfig(reason.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::intervals::DelayRange;
    use serial_test::serial;

    fn scratch_file(name: &str, contents: &str) -> PathBuf {
        let path = env::temp_dir()
            .join(format!("flashgrid-{}-{}", std::process::id(), name));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.recorder_config().max_flashes, 10);
        assert_eq!(config.replay_config().initial_delay_millis, 500);
    }

    #[test]
    fn partial_yaml_keeps_remaining_defaults() {
        let path = scratch_file(
            "partial.yml",
            "grid_size: 4\ndelays:\n  common_probability: 0.5\n",
        );
        let config = Config::load(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(config.grid_size, 4);
        assert_eq!(config.delays.common_probability, 0.5);
        assert_eq!(config.delays.common, DelayRange::new(4_000, 7_000));
        assert_eq!(config.max_flashes, 10);
        assert_eq!(config.media_settle_millis, 1_950);
    }

    #[test]
    fn rejects_empty_grid_and_bad_probability() {
        let config = Config {
            grid_size: 0,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SessionError::InvalidConfig(_))
        ));

        let mut config = Config::default();
        config.delays.common_probability = 1.5;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.delays.rare = DelayRange::new(9_000, 7_000);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("delays.rare"));
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let path = env::temp_dir().join("flashgrid-does-not-exist.yml");
        assert!(Config::load_if_exists(&path).unwrap().is_none());
    }

    #[test]
    fn malformed_yaml_is_reported() {
        let path = scratch_file("malformed.yml", "grid_size: [nope\n");
        let result = Config::load_if_exists(&path);
        fs::remove_file(&path).ok();
        assert!(matches!(result, Err(SessionError::Config(_))));
    }

    #[test]
    #[serial]
    fn env_var_overrides_default_path() {
        // SAFETY: serialized with every other test touching this variable.
        unsafe { env::set_var(CONFIG_PATH_ENV, "/tmp/custom-flashgrid.yml") };
        assert_eq!(
            Config::default_path(),
            Some(PathBuf::from("/tmp/custom-flashgrid.yml"))
        );
        unsafe { env::remove_var(CONFIG_PATH_ENV) };

        let path = Config::default_path();
        assert!(path.is_none_or(|p| p.ends_with("FlashGrid/config.yml")));
    }
}
