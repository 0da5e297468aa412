use serde::{de, Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::IrisError;

/// Kernel choice and its hyper-parameters.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "kernel", rename_all = "snake_case")]
pub enum KernelType {
    Linear,
    /// Gaussian (RBF) kernel. When `width` is `None` it is derived from the
    /// training data as `n_features * var(X)`.
    Gauss { width: Option<f64> },
    Poly { constant: f64, degree: f64 },
}

impl Default for KernelType {
    fn default() -> Self {
        KernelType::Gauss { width: None }
    }
}

impl FromStr for KernelType {
    type Err = IrisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "linear" => Ok(KernelType::Linear),
            "gauss" | "rbf" => Ok(KernelType::Gauss { width: None }),
            "poly" => Ok(KernelType::Poly {
                constant: 1.0,
                degree: 3.0,
            }),
            _ => Err(IrisError::UnknownKernel(s.to_string())),
        }
    }
}

impl KernelType {
    pub fn name(&self) -> &'static str {
        match self {
            KernelType::Linear => "linear",
            KernelType::Gauss { .. } => "gauss",
            KernelType::Poly { .. } => "poly",
        }
    }
}

/// SVM hyper-parameters. Every key is optional: `kernel` defaults to
/// `gauss`, `poly` to a constant of 1 and degree 3.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SvmConfig {
    /// Regularization weight applied to both the positive and negative class.
    pub c: f64,
    /// Solver stopping tolerance.
    pub eps: f64,
    #[serde(flatten)]
    pub kernel: KernelType,
}

impl Default for SvmConfig {
    fn default() -> Self {
        Self {
            c: 1.0,
            eps: 1e-3,
            kernel: KernelType::default(),
        }
    }
}

/// On-disk shape of [`SvmConfig`], with the kernel tag and its parameters
/// all optional.
#[derive(Deserialize)]
#[serde(default)]
struct RawSvmConfig {
    c: f64,
    eps: f64,
    kernel: Option<String>,
    width: Option<f64>,
    constant: Option<f64>,
    degree: Option<f64>,
}

impl Default for RawSvmConfig {
    fn default() -> Self {
        let svm = SvmConfig::default();
        Self {
            c: svm.c,
            eps: svm.eps,
            kernel: None,
            width: None,
            constant: None,
            degree: None,
        }
    }
}

impl<'de> Deserialize<'de> for SvmConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawSvmConfig::deserialize(deserializer)?;
        raw.into_config().map_err(de::Error::custom)
    }
}

impl RawSvmConfig {
    fn into_config(self) -> Result<SvmConfig, IrisError> {
        let kernel = match self.kernel.as_deref() {
            None => KernelType::Gauss { width: self.width },
            Some(name) => match name.parse::<KernelType>()? {
                KernelType::Linear => KernelType::Linear,
                KernelType::Gauss { .. } => KernelType::Gauss { width: self.width },
                KernelType::Poly { constant, degree } => KernelType::Poly {
                    constant: self.constant.unwrap_or(constant),
                    degree: self.degree.unwrap_or(degree),
                },
            },
        };
        Ok(SvmConfig {
            c: self.c,
            eps: self.eps,
            kernel,
        })
    }
}

/// Everything the training routine needs: where the data lives, how to split
/// it, how to fit, and where to put the resulting bundle.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct TrainConfig {
    pub data_path: PathBuf,
    pub model_path: PathBuf,
    pub label_column: String,
    pub test_size: f64,
    pub seed: u64,
    pub svm: SvmConfig,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data/IRIS.csv"),
            model_path: PathBuf::from("model/model_svm.bin"),
            label_column: "species".to_string(),
            test_size: 0.25,
            seed: 26,
            svm: SvmConfig::default(),
        }
    }
}

impl TrainConfig {
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(data_path: P, model_path: Q) -> Self {
        Self {
            data_path: data_path.as_ref().to_path_buf(),
            model_path: model_path.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    pub fn with_kernel(mut self, kernel: KernelType) -> Self {
        self.svm.kernel = kernel;
        self
    }
}
