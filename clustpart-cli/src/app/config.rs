use std::io::{Read, Write};

use clustpart_core::{
    clustering::OptimizerParameters,
    quality::MISSING_DISTANCE,
    sweep::{SweepMode, SweepParameters},
};
use log::warn;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
#[serde(from = "ConfigPrecursor")]
pub struct Config {
    pub missing_distance: f64,
    pub optimizer_max_iters: usize,
    pub optimizer_multithreading_flag: bool,
    pub partition_seed: Option<u64>,
    pub sweep_exponent_start: i32,
    pub sweep_exponent_end: i32,
}

impl Config {
    pub const FILENAME: &'static str = "config.json";

    pub fn load(filepath: &std::path::Path) -> Self {
        match Self::from_file(filepath) {
            Ok(config) => config,
            Err(err) => {
                warn!("Failed to load configuration from file, '{err}'");
                let config = ConfigPrecursor::default();
                let Ok(downcast_error) = err.downcast::<std::io::Error>() else {
                    return config.into();
                };
                if downcast_error.kind() == std::io::ErrorKind::NotFound {
                    match config.to_file(filepath) {
                        Ok(()) => warn!("Created default configuration file, at '{}'", filepath.display()),
                        Err(error) => warn!(
                            "Failed to create default configuration file, at '{}', caused by '{}'",
                            filepath.display(),
                            error
                        ),
                    }
                }
                config.into()
            }
        }
    }

    fn from_file(filepath: &std::path::Path) -> anyhow::Result<Self> {
        let mut buffer: Vec<u8> = Vec::new();
        std::fs::OpenOptions::new().create(false).read(true).open(filepath)?.read_to_end(&mut buffer)?;
        Self::from_slice(&buffer)
    }

    fn from_slice(buffer: &[u8]) -> anyhow::Result<Self> {
        Ok(serde_json::from_slice(buffer)?)
    }

    pub fn optimizer_parameters(&self) -> OptimizerParameters {
        OptimizerParameters::new(self.optimizer_max_iters, self.missing_distance, self.optimizer_multithreading_flag)
    }

    pub fn sweep_parameters(&self) -> SweepParameters {
        SweepParameters {
            exponent_start: self.sweep_exponent_start,
            exponent_end: self.sweep_exponent_end,
            mode: SweepMode::UntilFeasible,
        }
    }
}

impl From<ConfigPrecursor> for Config {
    fn from(value: ConfigPrecursor) -> Self {
        let missing_distance = if value.missing_distance.is_finite() {
            value.missing_distance
        } else {
            warn!("Ignoring non-finite `missing_distance` of {}, using {MISSING_DISTANCE}", value.missing_distance);
            MISSING_DISTANCE
        };
        Self {
            missing_distance,
            optimizer_max_iters: value.optimizer_max_iters,
            optimizer_multithreading_flag: value.optimizer_multithreading_flag,
            partition_seed: value.partition_seed,
            sweep_exponent_start: value.sweep_exponent_start,
            sweep_exponent_end: value.sweep_exponent_end,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename = "config")]
pub struct ConfigPrecursor {
    pub missing_distance: f64,
    pub optimizer_max_iters: usize,
    pub optimizer_multithreading_flag: bool,
    pub partition_seed: Option<u64>,
    pub sweep_exponent_start: i32,
    pub sweep_exponent_end: i32,
}

impl Default for ConfigPrecursor {
    fn default() -> Self {
        let optimizer = OptimizerParameters::default();
        let sweep = SweepParameters::default();
        Self {
            missing_distance: optimizer.missing_distance,
            optimizer_max_iters: optimizer.max_iters,
            optimizer_multithreading_flag: optimizer.multithreading_flag,
            partition_seed: None,
            sweep_exponent_start: sweep.exponent_start,
            sweep_exponent_end: sweep.exponent_end,
        }
    }
}

impl ConfigPrecursor {
    fn to_file(
        &self,
        filepath: &std::path::Path,
    ) -> anyhow::Result<()> {
        let mut file = std::fs::OpenOptions::new().write(true).create_new(true).open(filepath)?;

        file.write_all(&serde_json::to_vec_pretty(self)?)?;
        file.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use indoc::indoc;

    #[test]
    fn partial_config_test() {
        let config = Config::from_slice(
            indoc! {r#"
                {
                    "optimizer_max_iters": 25,
                    "partition_seed": 7
                }
            "#}
            .as_bytes(),
        )
        .unwrap();
        assert_eq!(config.optimizer_max_iters, 25);
        assert_eq!(config.partition_seed, Some(7));
        assert_eq!(config.missing_distance, MISSING_DISTANCE);
        assert!(config.optimizer_multithreading_flag);
        assert_eq!(config.sweep_parameters(), SweepParameters::default());
    }

    #[test]
    fn malformed_config_test() {
        assert!(Config::from_slice(b"{ \"optimizer_max_iters\": \"many\" }").is_err());
        assert!(Config::from_slice(b"not json").is_err());
    }
}
