//! Caller-supplied objective functions.
//!
//! The engine maximizes. An objective that keeps mutable state (a simulator
//! handle, a counter) is `Exclusive` and never runs two calls at once. One that
//! is safe to share across threads is `Shared` and may be fanned out over the
//! evaluation pool.

use std::fmt;

type ExclusiveFn<'a> = Box<dyn FnMut(&[f64]) -> anyhow::Result<f64> + 'a>;
type SharedFn<'a> = Box<dyn Fn(&[f64]) -> anyhow::Result<f64> + Sync + 'a>;

pub enum Objective<'a> {
    Exclusive(ExclusiveFn<'a>),
    Shared(SharedFn<'a>),
}

impl<'a> Objective<'a> {
    pub fn exclusive<F>(f: F) -> Self
    where
        F: FnMut(&[f64]) -> anyhow::Result<f64> + 'a,
    {
        Self::Exclusive(Box::new(f))
    }

    pub fn shared<F>(f: F) -> Self
    where
        F: Fn(&[f64]) -> anyhow::Result<f64> + Sync + 'a,
    {
        Self::Shared(Box::new(f))
    }

    pub fn is_shared(&self) -> bool { matches!(self, Self::Shared(_)) }

    /// Evaluate one point on the calling thread.
    pub fn call(&mut self, position: &[f64]) -> anyhow::Result<f64> {
        match self {
            Self::Exclusive(f) => f(position),
            Self::Shared(f) => f(position),
        }
    }
}

impl fmt::Debug for Objective<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.is_shared() { "Objective::Shared" } else { "Objective::Exclusive" })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exclusive_objective_keeps_state() {
        let mut calls = 0;
        {
            let mut obj = Objective::exclusive(|p: &[f64]| { calls += 1; Ok(p[0]) });
            assert!(!obj.is_shared());
            assert_eq!(obj.call(&[2.0]).unwrap(), 2.0);
            obj.call(&[3.0]).unwrap();
        }
        assert_eq!(calls, 2);
    }

    #[test]
    fn shared_objective_reports_errors() {
        let mut obj = Objective::shared(|p: &[f64]| if p[0] < 0.0 { anyhow::bail!("out of domain") } else { Ok(p[0].sqrt()) });
        assert!(obj.is_shared());
        assert_eq!(obj.call(&[4.0]).unwrap(), 2.0);
        assert_eq!(obj.call(&[-1.0]).unwrap_err().to_string(), "out of domain");
    }
}
