//! Benchmark landscapes, negated so the optimum is a maximum of 0.

use std::f64::consts::PI;

pub type Benchmark = fn(&[f64]) -> anyhow::Result<f64>;

pub const NAMES: [&str; 4] = ["parabola", "rastrigin", "rosenbrock", "ackley"];

pub fn lookup(name: &str) -> Option<Benchmark> {
    match name {
        "parabola" | "sphere" => Some(parabola),
        "rastrigin" => Some(rastrigin),
        "rosenbrock" => Some(rosenbrock),
        "ackley" => Some(ackley),
        _ => None,
    }
}

pub fn parabola(x: &[f64]) -> anyhow::Result<f64> { Ok(-x.iter().map(|v| v * v).sum::<f64>()) }

pub fn rastrigin(x: &[f64]) -> anyhow::Result<f64> {
    Ok(-(10.0 * x.len() as f64 + x.iter().map(|v| v * v - 10.0 * (2.0 * PI * v).cos()).sum::<f64>()))
}

pub fn rosenbrock(x: &[f64]) -> anyhow::Result<f64> {
    if x.len() < 2 { anyhow::bail!("rosenbrock needs at least two dimensions, got {}", x.len()); }
    Ok(-x.windows(2).map(|w| 100.0 * (w[1] - w[0] * w[0]).powi(2) + (1.0 - w[0]).powi(2)).sum::<f64>())
}

pub fn ackley(x: &[f64]) -> anyhow::Result<f64> {
    let n = x.len() as f64;
    let sq = x.iter().map(|v| v * v).sum::<f64>() / n;
    let cos = x.iter().map(|v| (2.0 * PI * v).cos()).sum::<f64>() / n;
    Ok(20.0 * (-0.2 * sq.sqrt()).exp() + cos.exp() - 20.0 - std::f64::consts::E)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optima_are_zero() {
        assert_eq!(parabola(&[0.0, 0.0]).unwrap(), 0.0);
        assert!(rastrigin(&[0.0, 0.0, 0.0]).unwrap().abs() < 1e-12);
        assert_eq!(rosenbrock(&[1.0, 1.0]).unwrap(), 0.0);
        assert!(ackley(&[0.0, 0.0]).unwrap().abs() < 1e-12);
        assert!(rosenbrock(&[1.0]).is_err());
    }

    #[test]
    fn every_listed_name_resolves() {
        assert!(NAMES.iter().all(|n| lookup(n).is_some()));
        assert!(lookup("himmelblau").is_none());
    }
}
