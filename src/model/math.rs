// Dirichlet helpers shared by training and inference.

use statrs::function::gamma::digamma;

/// `exp(E[log x])` for `x ~ Dir(alphas)`, elementwise.
pub fn exp_dirichlet_expectation(alphas: &[f64]) -> Vec<f64> {
    let psi_total = digamma(alphas.iter().sum());
    alphas.iter().map(|&a| (digamma(a) - psi_total).exp()).collect()
}

/// Row-wise [`exp_dirichlet_expectation`] over a topic-term matrix.
pub fn exp_dirichlet_expectation_rows(rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
    rows.iter().map(|row| exp_dirichlet_expectation(row)).collect()
}

/// Scale a non-negative vector to sum to one. All-zero input is left alone.
pub fn normalized(values: &[f64]) -> Vec<f64> {
    let total: f64 = values.iter().sum();
    if total > 0.0 {
        values.iter().map(|v| v / total).collect()
    } else {
        values.to_vec()
    }
}

pub fn mean_abs_difference(a: &[f64], b: &[f64]) -> f64 {
    if a.is_empty() {
        return 0.0;
    }
    a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum::<f64>() / a.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expectation_preserves_ordering() {
        let e = exp_dirichlet_expectation(&[1.0, 5.0, 2.0]);
        assert!(e[1] > e[2] && e[2] > e[0]);
        assert!(e.iter().all(|v| *v > 0.0 && *v < 1.0));
    }

    #[test]
    fn test_normalized_sums_to_one() {
        let n = normalized(&[1.0, 3.0]);
        assert!((n[0] - 0.25).abs() < 1e-12);
        assert!((n.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert_eq!(normalized(&[0.0, 0.0]), vec![0.0, 0.0]);
    }

    #[test]
    fn test_mean_abs_difference() {
        assert!((mean_abs_difference(&[1.0, 2.0], &[2.0, 0.0]) - 1.5).abs() < 1e-12);
        assert_eq!(mean_abs_difference(&[], &[]), 0.0);
    }
}
