use std::collections::HashSet;

use num_traits::Float;

use crate::catalog::{FeatureCatalog, FeatureId};

/// Small epsilon for division-by-zero protection and for treating a
/// rare-intensity value as zero.
pub(crate) const EPSILON: f64 = 1e-9;

fn epsilon<F: Float>() -> F {
    F::from(EPSILON).unwrap()
}

/// Dataset-wide dispersion `δ = (2/(m(m−1))) · Σ_{i<j} count_j / count_i`
/// over counts sorted ascending (the rank order the catalog fixes).
/// Zero when fewer than two features exist.
pub fn dispersion<F>(counts: &[usize]) -> F
where
    F: Float,
{
    if counts.len() < 2 {
        return F::zero();
    }
    let mut sum = F::zero();
    for i in 0..counts.len() {
        for j in (i + 1)..counts.len() {
            let denominator = if counts[i] == 0 {
                epsilon()
            } else {
                F::from(counts[i]).unwrap()
            };
            sum = sum + F::from(counts[j]).unwrap() / denominator;
        }
    }
    let m = F::from(counts.len()).unwrap();
    F::from(2.).unwrap() / (m * (m - F::one())) * sum
}

/// Participation ratio of `feature` in a pattern: the number of distinct
/// objects of that feature appearing in its column of the table, over the
/// feature's global instance count.
pub fn participation_ratio<F>(
    feature: FeatureId,
    pattern: &[FeatureId],
    rows: &[Vec<usize>],
    catalog: &FeatureCatalog,
) -> F
where
    F: Float,
{
    let column = match pattern.iter().position(|&f| f == feature) {
        Some(c) => c,
        None => return F::zero(),
    };
    let total = catalog.count(feature);
    if total == 0 {
        return F::zero();
    }
    let distinct: HashSet<usize> = rows.iter().filter_map(|r| r.get(column).copied()).collect();
    F::from(distinct.len()).unwrap() / F::from(total).unwrap()
}

/// Unweighted participation index: the minimum participation ratio over
/// the pattern's features.
pub fn participation_index<F>(
    pattern: &[FeatureId],
    rows: &[Vec<usize>],
    catalog: &FeatureCatalog,
) -> F
where
    F: Float,
{
    pattern
        .iter()
        .map(|&f| participation_ratio(f, pattern, rows, catalog))
        .fold(F::one(), |a, b| a.min(b))
}

/// Rare intensity `RI(f, C) = exp(−(v−1)² / (2δ²))` with
/// `v = count(f) / min_{g∈C} count(g)`.
///
/// Zero when δ is degenerate, when `f` is not in the pattern, or when the
/// minimum count is zero.
pub fn rare_intensity<F>(
    feature: FeatureId,
    pattern: &[FeatureId],
    catalog: &FeatureCatalog,
    delta: F,
) -> F
where
    F: Float,
{
    if delta <= epsilon() {
        return F::zero();
    }
    if !pattern.contains(&feature) {
        return F::zero();
    }
    let min_count = pattern
        .iter()
        .map(|&f| catalog.count(f))
        .min()
        .unwrap_or(0);
    if min_count == 0 {
        return F::zero();
    }
    let v = F::from(catalog.count(feature)).unwrap() / F::from(min_count).unwrap();
    let exponent = (v - F::one()).powi(2) / (F::from(2.).unwrap() * delta * delta);
    (-exponent).exp()
}

/// Weight `w = 1/RI`; zero when RI is degenerate, which zeroes the
/// weighted ratio so the candidate cannot pass.
pub fn weight<F>(rare_intensity: F) -> F
where
    F: Float,
{
    if rare_intensity <= epsilon() {
        F::zero()
    } else {
        F::one() / rare_intensity
    }
}

/// Weighted participation index: `min_f PR(f, C) · w(f, C)`.
/// Zero for an empty pattern.
pub fn weighted_participation_index<F>(
    pattern: &[FeatureId],
    rows: &[Vec<usize>],
    catalog: &FeatureCatalog,
    delta: F,
) -> F
where
    F: Float,
{
    let mut wpi = F::infinity();
    for &feature in pattern {
        let pr: F = participation_ratio(feature, pattern, rows, catalog);
        let wpr = pr * weight(rare_intensity(feature, pattern, catalog, delta));
        wpi = wpi.min(wpr);
    }
    if wpi.is_infinite() {
        F::zero()
    } else {
        wpi
    }
}

#[cfg(test)]
mod test {
    use crate::catalog::FeatureCatalog;
    use crate::object::SpatialObject;
    use crate::scoring::{
        dispersion, participation_index, participation_ratio, rare_intensity, weight,
    };

    fn catalog(mix: &[(&str, usize)]) -> FeatureCatalog {
        let mut objects = Vec::new();
        for (kind, n) in mix {
            for i in 0..*n {
                objects.push(SpatialObject::<f64>::new(
                    format!("{}{}", kind, i),
                    *kind,
                    objects.len() as f64 * 10.,
                    0.,
                ));
            }
        }
        FeatureCatalog::from_objects(&objects).unwrap()
    }

    #[test]
    fn valid_dispersion_pair() {
        // counts (10, 20): single ratio 2.0, factor 1.0
        let delta: f64 = dispersion(&[10, 20]);
        assert!((delta - 2.0).abs() < 1e-12);
    }

    #[test]
    fn valid_dispersion_triple() {
        // counts (10, 20, 40): ratios 2 + 4 + 2 = 8, factor 1/3
        let delta: f64 = dispersion(&[10, 20, 40]);
        assert!((delta - 8. / 3.).abs() < 1e-12);
    }

    #[test]
    fn dispersion_single_feature() {
        assert_eq!(dispersion::<f64>(&[7]), 0.0);
    }

    #[test]
    fn valid_participation_ratio() {
        // C ranks 0, A ranks 1
        let catalog = catalog(&[("A", 2), ("C", 1)]);
        let pattern = vec![0, 1];
        // one row (C0, A0); A0 is object index 0 in ingest order
        let rows = vec![vec![2, 0]];
        let pr_c: f64 = participation_ratio(0, &pattern, &rows, &catalog);
        let pr_a: f64 = participation_ratio(1, &pattern, &rows, &catalog);
        assert!((pr_c - 1.0).abs() < 1e-12);
        assert!((pr_a - 0.5).abs() < 1e-12);
        assert_eq!(participation_ratio::<f64>(9, &pattern, &rows, &catalog), 0.);
    }

    #[test]
    fn duplicate_rows_count_once() {
        let catalog = catalog(&[("A", 2), ("C", 1)]);
        let pattern = vec![0, 1];
        let rows = vec![vec![2, 0], vec![2, 0]];
        let pi: f64 = participation_index(&pattern, &rows, &catalog);
        assert!((pi - 0.5).abs() < 1e-12);
    }

    #[test]
    fn rare_intensity_of_minimum_feature_is_one() {
        let catalog = catalog(&[("A", 2), ("B", 2), ("C", 1)]);
        // ranks: C=0, A=1, B=2
        let pattern = vec![0, 1];
        let delta: f64 = catalog.dispersion();
        let ri = rare_intensity(0, &pattern, &catalog, delta);
        assert!((ri - 1.0).abs() < 1e-12);
    }

    #[test]
    fn rare_intensity_matches_kernel() {
        let catalog = catalog(&[("A", 2), ("B", 2), ("C", 1)]);
        let pattern = vec![0, 1];
        let delta: f64 = catalog.dispersion();
        assert!((delta - 5. / 3.).abs() < 1e-12);
        // v(A) = 2, so RI = exp(-1 / (2 δ²))
        let expected = (-1. / (2. * delta * delta)).exp();
        let ri = rare_intensity(1, &pattern, &catalog, delta);
        assert!((ri - expected).abs() < 1e-12);
    }

    #[test]
    fn degenerate_delta_zeroes_intensity() {
        let catalog = catalog(&[("A", 2), ("B", 2), ("C", 1)]);
        assert_eq!(rare_intensity::<f64>(0, &[0, 1], &catalog, 0.), 0.);
    }

    #[test]
    fn degenerate_intensity_zeroes_weight() {
        assert_eq!(weight::<f64>(0.), 0.);
        assert!((weight::<f64>(0.5) - 2.0).abs() < 1e-12);
    }
}
