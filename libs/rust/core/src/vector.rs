//! Fixed-dimension arithmetic on positions and velocities.
//!
//! Elementwise helpers assume equal lengths (checked with `debug_assert!`);
//! callers validate dimensions once when particles are built.

use crate::error::{Result, SwarmError};

pub type Position = Vec<f64>;
pub type Velocity = Vec<f64>;

pub fn add(a: &[f64], b: &[f64]) -> Vec<f64> {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b).map(|(x, y)| x + y).collect()
}

pub fn sub(a: &[f64], b: &[f64]) -> Vec<f64> {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b).map(|(x, y)| x - y).collect()
}

pub fn scale(a: &[f64], k: f64) -> Vec<f64> { a.iter().map(|x| x * k).collect() }

/// Clamp every component into `[min_j, max_j]`.
pub fn clamp(a: &[f64], min: &[f64], max: &[f64]) -> Vec<f64> {
    debug_assert!(a.len() == min.len() && a.len() == max.len());
    a.iter().zip(min.iter().zip(max)).map(|(x, (lo, hi))| x.max(*lo).min(*hi)).collect()
}

pub fn distance(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum::<f64>().sqrt()
}

/// Mean of a non-empty set of equally sized points.
pub fn centroid<'a, I>(points: I) -> Result<Vec<f64>>
where
    I: IntoIterator<Item = &'a [f64]>,
{
    let mut iter = points.into_iter();
    let first = iter.next().ok_or_else(|| SwarmError::config("centroid of an empty set"))?;
    let mut acc = first.to_vec();
    let mut n = 1usize;
    for p in iter {
        SwarmError::check_dimension(acc.len(), p.len())?;
        for (a, x) in acc.iter_mut().zip(p) { *a += x; }
        n += 1;
    }
    Ok(scale(&acc, 1.0 / n as f64))
}

/// Largest pairwise Euclidean distance; 0 for fewer than two points.
pub fn diameter(points: &[&[f64]]) -> f64 {
    let mut widest = 0.0f64;
    for (i, a) in points.iter().enumerate() {
        for b in &points[i + 1..] { widest = widest.max(distance(a, b)); }
    }
    widest
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elementwise_ops() {
        assert_eq!(add(&[1.0, 2.0], &[3.0, 4.0]), vec![4.0, 6.0]);
        assert_eq!(sub(&[1.0, 2.0], &[3.0, 5.0]), vec![-2.0, -3.0]);
        assert_eq!(scale(&[1.0, -2.0], 0.5), vec![0.5, -1.0]);
        assert_eq!(clamp(&[-5.0, 0.5, 9.0], &[-1.0, 0.0, 0.0], &[1.0, 1.0, 1.0]), vec![-1.0, 0.5, 1.0]);
    }

    #[test]
    fn distance_is_euclidean() {
        assert!((distance(&[0.0, 0.0], &[3.0, 4.0]) - 5.0).abs() < 1e-12);
        assert_eq!(distance(&[1.0, 1.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn centroid_averages_and_rejects_bad_input() {
        let pts: Vec<Vec<f64>> = vec![vec![0.0, 0.0], vec![2.0, 4.0], vec![4.0, 2.0]];
        let c = centroid(pts.iter().map(|p| p.as_slice())).unwrap();
        assert_eq!(c, vec![2.0, 2.0]);
        assert!(centroid(std::iter::empty::<&[f64]>()).is_err());
        let ragged: Vec<Vec<f64>> = vec![vec![0.0, 0.0], vec![1.0]];
        assert!(matches!(centroid(ragged.iter().map(|p| p.as_slice())), Err(SwarmError::DimensionMismatch { expected: 2, actual: 1 })));
    }

    #[test]
    fn diameter_takes_widest_pair() {
        let a = [0.0, 0.0];
        let b = [1.0, 0.0];
        let c = [0.0, 3.0];
        assert!((diameter(&[&a, &b, &c]) - 10f64.sqrt()).abs() < 1e-12);
        assert_eq!(diameter(&[&a]), 0.0);
    }
}
