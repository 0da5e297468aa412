//! Loading labeled measurement tables and splitting them for training.
//!
//! A dataset is a CSV file with a header row. One column holds the class
//! label; every other column is a numeric feature, kept in header order. The
//! recorded feature names are what the persisted bundle uses to reorder
//! incoming prediction requests.
use std::collections::BTreeSet;
use std::path::Path;

use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::{IrisError, Result};

#[derive(Debug, Clone)]
pub struct IrisDataset {
    /// Feature matrix, one row per sample.
    pub x: Array2<f64>,
    /// Class label per sample.
    pub y: Array1<String>,
    /// Feature names in column order.
    pub feature_names: Vec<String>,
}

impl IrisDataset {
    pub fn new(x: Array2<f64>, y: Array1<String>, feature_names: Vec<String>) -> Result<Self> {
        if x.nrows() == 0 {
            return Err(IrisError::EmptyDataset);
        }
        if x.nrows() != y.len() || x.ncols() != feature_names.len() {
            return Err(IrisError::FeatureCount {
                expected: feature_names.len(),
                got: x.ncols(),
            });
        }
        Ok(IrisDataset {
            x,
            y,
            feature_names,
        })
    }

    pub fn nrows(&self) -> usize {
        self.x.nrows()
    }

    /// Sorted, de-duplicated class labels.
    pub fn class_names(&self) -> Vec<String> {
        self.y
            .iter()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn log_input_data_summary(&self) {
        log::info!(
            "Loaded {} samples with {} features ({})",
            self.nrows(),
            self.feature_names.len(),
            self.feature_names.join(", ")
        );
        for class in self.class_names() {
            log::debug!(
                "  {}: {} samples",
                class,
                self.y.iter().filter(|label| **label == class).count()
            );
        }
    }

    /// Keep only the rows at `indices`, in that order.
    pub fn select(&self, indices: &[usize]) -> IrisDataset {
        IrisDataset {
            x: self.x.select(Axis(0), indices),
            y: self.y.select(Axis(0), indices),
            feature_names: self.feature_names.clone(),
        }
    }

    /// Shuffle the rows with a seeded RNG and cut off `ceil(n * test_size)`
    /// rows for the test split. The same seed always yields the same split.
    ///
    /// # Returns
    ///
    /// `(train, test)`
    pub fn train_test_split(&self, test_size: f64, seed: u64) -> Result<(IrisDataset, IrisDataset)> {
        if !(test_size > 0.0 && test_size < 1.0) {
            return Err(IrisError::InvalidTestSize(test_size));
        }

        let n_samples = self.nrows();
        let n_test = ((n_samples as f64) * test_size).ceil() as usize;
        if n_test == 0 || n_test >= n_samples {
            return Err(IrisError::InvalidTestSize(test_size));
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let mut indices: Vec<usize> = (0..n_samples).collect();
        indices.shuffle(&mut rng);

        let (test_idx, train_idx) = indices.split_at(n_test);
        Ok((self.select(train_idx), self.select(test_idx)))
    }
}

/// Read a labeled CSV file. Every non-label column must hold numbers.
pub fn load_dataset<P: AsRef<Path>>(path: P, label_column: &str) -> Result<IrisDataset> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|e| IrisError::io(path, e))?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(std::io::BufReader::new(file));

    let headers = reader
        .headers()?
        .iter()
        .map(|h| h.to_string())
        .collect::<Vec<_>>();

    let label_idx = headers
        .iter()
        .position(|h| h == label_column)
        .ok_or_else(|| IrisError::MissingLabelColumn(label_column.to_string()))?;

    // Everything else is a feature
    let feature_indices: Vec<usize> = (0..headers.len()).filter(|&i| i != label_idx).collect();
    let feature_names = feature_indices
        .iter()
        .map(|&i| headers[i].clone())
        .collect::<Vec<_>>();

    let mut labels = Vec::new();
    let mut features = Vec::new();

    for (row, result) in reader.records().enumerate() {
        let record = result?;
        labels.push(record[label_idx].to_string());

        for &i in &feature_indices {
            let cell = &record[i];
            let value = cell.parse::<f64>().map_err(|_| IrisError::InvalidCell {
                column: headers[i].clone(),
                row: row + 1,
                value: cell.to_string(),
            })?;
            features.push(value);
        }
    }

    let n_rows = labels.len();
    let x = Array2::from_shape_vec((n_rows, feature_indices.len()), features)?;
    IrisDataset::new(x, Array1::from_vec(labels), feature_names)
}
