//! Lazily loaded model for the prediction service.
//!
//! The bundle is read from disk on first use. If no artifact exists yet it is
//! trained on the spot, written, and read back. Once loaded it is never
//! replaced for the lifetime of the `Predictor`.
use std::io::ErrorKind;

use once_cell::sync::OnceCell;
use serde_json::Value;

use crate::bundle::{ModelBundle, Prediction};
use crate::config::TrainConfig;
use crate::error::{IrisError, Result};
use crate::training::run_training;

pub struct Predictor {
    config: TrainConfig,
    bundle: OnceCell<ModelBundle>,
}

impl Predictor {
    pub fn new(config: TrainConfig) -> Self {
        Predictor {
            config,
            bundle: OnceCell::new(),
        }
    }

    /// Wrap an already loaded bundle; no disk access will happen.
    pub fn from_bundle(config: TrainConfig, bundle: ModelBundle) -> Self {
        Predictor {
            config,
            bundle: OnceCell::with_value(bundle),
        }
    }

    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    pub fn is_loaded(&self) -> bool {
        self.bundle.get().is_some()
    }

    /// The loaded bundle, initializing it on first call. A failed
    /// initialization leaves the cell empty so the next call tries again.
    pub fn bundle(&self) -> Result<&ModelBundle> {
        self.bundle.get_or_try_init(|| load_or_train(&self.config))
    }

    pub fn predict(&self, input: &Value) -> Result<Prediction> {
        self.bundle()?.predict(input)
    }
}

/// Load the bundle at `config.model_path`, training it first if the file does
/// not exist. Any other load failure is returned as-is.
pub fn load_or_train(config: &TrainConfig) -> Result<ModelBundle> {
    match ModelBundle::load(&config.model_path) {
        Ok(bundle) => Ok(bundle),
        Err(IrisError::Io { ref source, .. }) if source.kind() == ErrorKind::NotFound => {
            log::warn!(
                "Model not found at {}, training new model...",
                config.model_path.display()
            );
            run_training(config)?;
            ModelBundle::load(&config.model_path)
        }
        Err(e) => Err(e),
    }
}
