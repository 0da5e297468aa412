use linfa::dataset::Pr;
use linfa::traits::{Fit, Predict};
use linfa::Dataset;
use linfa_svm::{Svm, SvmError, SvmParams};
use ndarray::{Array1, Array2};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{KernelType, SvmConfig};
use crate::error::{IrisError, Result};
use crate::models::classifier_trait::ClassifierModel;
use crate::stats::scaled_gaussian_width;

/// Multi-class SVM built from one binary, probability-calibrated `Svm` per
/// class (one-vs-rest). The most confident class wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SvmClassifier {
    #[serde(skip)]
    params: SvmConfig,
    classes: Vec<String>,
    n_features: usize,
    /// Resolved kernel width when a Gaussian kernel was used.
    kernel_width: Option<f64>,
    models: Vec<Svm<f64, Pr>>,
}

impl SvmClassifier {
    pub fn new(params: SvmConfig) -> Self {
        SvmClassifier {
            params,
            classes: Vec::new(),
            n_features: 0,
            kernel_width: None,
            models: Vec::new(),
        }
    }

    pub fn kernel_width(&self) -> Option<f64> {
        self.kernel_width
    }

    pub fn is_fitted(&self) -> bool {
        !self.models.is_empty()
    }

    fn svm_params(&mut self, x: &Array2<f64>) -> SvmParams<f64, Pr> {
        let c = self.params.c;
        let model: SvmParams<f64, Pr> = Svm::<f64, Pr>::params()
            .eps(self.params.eps)
            .pos_neg_weights(c, c);

        // Chain the kernel configuration based on the kernel type
        match self.params.kernel {
            KernelType::Linear => {
                self.kernel_width = None;
                model.linear_kernel()
            }
            KernelType::Gauss { width } => {
                let width = width.unwrap_or_else(|| scaled_gaussian_width(x));
                self.kernel_width = Some(width);
                model.gaussian_kernel(width)
            }
            KernelType::Poly { constant, degree } => {
                self.kernel_width = None;
                model.polynomial_kernel(constant, degree)
            }
        }
    }

    fn check_input(&self, x: &Array2<f64>) -> Result<()> {
        if !self.is_fitted() {
            return Err(IrisError::NotFitted);
        }
        if x.ncols() != self.n_features {
            return Err(IrisError::FeatureCount {
                expected: self.n_features,
                got: x.ncols(),
            });
        }
        Ok(())
    }
}

impl ClassifierModel for SvmClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<String>) -> Result<()> {
        if x.nrows() == 0 {
            return Err(IrisError::EmptyDataset);
        }

        let mut classes = y.to_vec();
        classes.sort();
        classes.dedup();
        if classes.len() < 2 {
            return Err(IrisError::SingleClass(classes.len()));
        }

        let params = self.svm_params(x);
        log::debug!(
            "Fitting {} one-vs-rest SVMs ({} kernel) on {} samples",
            classes.len(),
            self.params.kernel.name(),
            x.nrows()
        );

        let models = classes
            .par_iter()
            .map(|class| {
                let targets = y.map(|label| label == class);
                let dataset = Dataset::new(x.to_owned(), targets);
                let model: std::result::Result<Svm<f64, Pr>, SvmError> = params.fit(&dataset);
                model.map_err(IrisError::from)
            })
            .collect::<Result<Vec<Svm<f64, Pr>>>>()?;

        self.classes = classes;
        self.n_features = x.ncols();
        self.models = models;
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<String>> {
        let proba = self.predict_proba(x)?;
        let labels = proba
            .rows()
            .into_iter()
            .map(|row| {
                let best = row
                    .iter()
                    .enumerate()
                    .fold((0, f64::NEG_INFINITY), |best, (j, &p)| {
                        if p > best.1 {
                            (j, p)
                        } else {
                            best
                        }
                    })
                    .0;
                self.classes[best].clone()
            })
            .collect::<Array1<String>>();
        Ok(labels)
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.check_input(x)?;

        let mut proba = Array2::<f64>::zeros((x.nrows(), self.classes.len()));
        for (j, model) in self.models.iter().enumerate() {
            let scores: Array1<Pr> = model.predict(x);
            for (i, p) in scores.iter().enumerate() {
                proba[[i, j]] = **p as f64;
            }
        }

        for mut row in proba.rows_mut() {
            let total = row.sum();
            if total > 0.0 {
                row.mapv_inplace(|p| p / total);
            }
        }
        Ok(proba)
    }

    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn name(&self) -> &str {
        "svm"
    }
}
