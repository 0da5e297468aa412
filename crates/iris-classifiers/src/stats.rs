use ndarray::{Array1, Array2};

/// Fraction of predictions equal to the ground truth.
///
/// Returns `0.0` for empty input.
pub fn accuracy<L: PartialEq>(predictions: &Array1<L>, truth: &Array1<L>) -> f64 {
    assert_eq!(
        predictions.len(),
        truth.len(),
        "predictions and truth must have equal lengths"
    );
    if truth.is_empty() {
        return 0.0;
    }
    let correct = predictions
        .iter()
        .zip(truth.iter())
        .filter(|(p, t)| p == t)
        .count();
    correct as f64 / truth.len() as f64
}

/// Population variance over every element of the matrix.
pub fn total_variance(x: &Array2<f64>) -> f64 {
    let n = x.len();
    if n == 0 {
        return 0.0;
    }
    let mean = x.sum() / n as f64;
    x.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n as f64
}

/// Gaussian kernel width equivalent to `gamma = 1 / (n_features * var(X))`.
///
/// The linfa Gaussian kernel is `exp(-||a - b||^2 / width)`, so the width is
/// the reciprocal of gamma. Falls back to `n_features` for constant input.
pub fn scaled_gaussian_width(x: &Array2<f64>) -> f64 {
    let n_features = x.ncols().max(1) as f64;
    let var = total_variance(x);
    if var > 0.0 {
        n_features * var
    } else {
        n_features
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn accuracy_counts_matches() {
        let preds = array!["a", "b", "b", "a"];
        let truth = array!["a", "b", "a", "a"];
        assert!((accuracy(&preds, &truth) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn accuracy_of_nothing_is_zero() {
        let empty: Array1<i32> = Array1::from_vec(vec![]);
        assert_eq!(accuracy(&empty, &empty), 0.0);
    }

    #[test]
    #[should_panic(expected = "equal lengths")]
    fn accuracy_length_mismatch_panics() {
        let _ = accuracy(&array![1, 2], &array![1]);
    }

    #[test]
    fn variance_over_all_elements() {
        let x = array![[1.0, 3.0], [1.0, 3.0]];
        assert!((total_variance(&x) - 1.0).abs() < 1e-12);
        assert!((scaled_gaussian_width(&x) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn constant_input_width_falls_back() {
        let x = array![[2.0, 2.0, 2.0]];
        assert_eq!(scaled_gaussian_width(&x), 3.0);
    }
}
