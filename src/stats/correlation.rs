use super::special::incomplete_beta;

/// Pearson correlation of two equally long samples.
///
/// `None` when fewer than two pairs exist or either side has zero variance.
pub fn pearson(a: &[f64], b: &[f64]) -> Option<f64> {
    let n = a.len().min(b.len());
    if n < 2 {
        return None;
    }
    let (a, b) = (&a[..n], &b[..n]);
    let n_f = n as f64;
    let mean_a = a.iter().sum::<f64>() / n_f;
    let mean_b = b.iter().sum::<f64>() / n_f;
    let mut cov = 0.0_f64;
    let mut var_a = 0.0_f64;
    let mut var_b = 0.0_f64;
    for (x, y) in a.iter().zip(b) {
        let da = x - mean_a;
        let db = y - mean_b;
        cov += da * db;
        var_a += da * da;
        var_b += db * db;
    }
    let denom = (var_a * var_b).sqrt();
    if denom < 1e-12 {
        return None;
    }
    Some((cov / denom).clamp(-1.0, 1.0))
}

/// Two-tailed p-value of a Pearson `r` over `n` pairs (Student t, n − 2 df).
pub fn pearson_p_value(r: f64, n: usize) -> Option<f64> {
    if n < 2 || !r.is_finite() {
        return None;
    }
    if n == 2 {
        return Some(1.0);
    }
    if r.abs() >= 1.0 {
        return Some(0.0);
    }
    let df = (n - 2) as f64;
    let t_squared = r * r * df / (1.0 - r * r);
    Some(incomplete_beta(df / 2.0, 0.5, df / (df + t_squared)))
}

/// `***` below 0.001, `**` below 0.01, `*` below 0.05.
pub fn significance_stars(p: f64) -> &'static str {
    if p < 0.001 {
        "***"
    } else if p < 0.01 {
        "**"
    } else if p < 0.05 {
        "*"
    } else {
        ""
    }
}

/// Pairwise correlations over complete columns.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    /// `r[i][j]`; `None` where a column is constant.
    pub r: Vec<Vec<Option<f64>>>,
    /// Two-tailed p-values when requested. Diagonal and failed cells are 1.
    pub p: Option<Vec<Vec<f64>>>,
}

impl CorrelationMatrix {
    pub fn size(&self) -> usize {
        self.r.len()
    }

    /// Cell text: `r` to three decimals plus significance stars off the diagonal.
    pub fn annotation(&self, i: usize, j: usize) -> String {
        let mut text = match self.r[i][j] {
            Some(r) => format!("{r:.3}"),
            None => "nan".to_string(),
        };
        if let Some(p) = &self.p {
            if i != j {
                text.push_str(significance_stars(p[i][j]));
            }
        }
        text
    }
}

/// Correlate every pair of `columns` (each the same length, no missing values).
pub fn correlation_matrix(columns: &[Vec<f64>], with_p_values: bool) -> CorrelationMatrix {
    let k = columns.len();
    let n = columns.first().map_or(0, Vec::len);
    let mut r = vec![vec![None; k]; k];
    for i in 0..k {
        for j in i..k {
            let value = if i == j {
                pearson(&columns[i], &columns[i]).map(|_| 1.0)
            } else {
                pearson(&columns[i], &columns[j])
            };
            r[i][j] = value;
            r[j][i] = value;
        }
    }

    let p = with_p_values.then(|| {
        let mut p = vec![vec![1.0; k]; k];
        for i in 0..k {
            for j in 0..k {
                if i != j {
                    p[i][j] = r[i][j]
                        .and_then(|value| pearson_p_value(value, n))
                        .unwrap_or(1.0);
                }
            }
        }
        p
    });

    CorrelationMatrix { r, p }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pearson_identical() {
        let a = vec![1.0, 2.0, 3.0, 4.0];
        assert!((pearson(&a, &a).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_opposite() {
        let a = vec![1.0, 2.0, 3.0];
        let b = vec![-1.0, -2.0, -3.0];
        assert!((pearson(&a, &b).unwrap() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_constant_column() {
        assert_eq!(pearson(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]), None);
        assert_eq!(pearson(&[1.0], &[2.0]), None);
    }

    #[test]
    fn test_p_value_known_values() {
        // r = 0.5 over 10 pairs: t = 1.633 on 8 df.
        assert!((pearson_p_value(0.5, 10).unwrap() - 0.14111).abs() < 1e-4);
        // r = 0.9 over 5 pairs: t = 3.576 on 3 df.
        assert!((pearson_p_value(0.9, 5).unwrap() - 0.03739).abs() < 1e-4);
        assert_eq!(pearson_p_value(0.3, 2), Some(1.0));
        assert_eq!(pearson_p_value(1.0, 10), Some(0.0));
        assert_eq!(pearson_p_value(0.3, 1), None);
    }

    #[test]
    fn test_stars() {
        assert_eq!(significance_stars(0.0005), "***");
        assert_eq!(significance_stars(0.005), "**");
        assert_eq!(significance_stars(0.03), "*");
        assert_eq!(significance_stars(0.05), "");
    }

    #[test]
    fn test_matrix_symmetric_unit_diagonal() {
        let columns = vec![
            vec![1.0, 2.0, 3.0, 4.0, 5.0],
            vec![2.0, 1.0, 4.0, 3.0, 6.0],
            vec![5.0, 3.0, 4.0, 1.0, 2.0],
        ];
        let m = correlation_matrix(&columns, true);
        for i in 0..3 {
            assert_eq!(m.r[i][i], Some(1.0));
            for j in 0..3 {
                assert_eq!(m.r[i][j], m.r[j][i]);
            }
        }
        let p = m.p.as_ref().unwrap();
        assert_eq!(p[1][1], 1.0);
        assert!(p[0][1] > 0.0 && p[0][1] < 1.0);
        assert!(m.annotation(0, 0).starts_with("1.000"));
    }

    #[test]
    fn test_constant_column_cells_undefined() {
        let columns = vec![vec![1.0, 2.0, 3.0], vec![7.0, 7.0, 7.0]];
        let m = correlation_matrix(&columns, true);
        assert_eq!(m.r[1][1], None);
        assert_eq!(m.r[0][1], None);
        assert_eq!(m.p.unwrap()[0][1], 1.0);
    }
}
