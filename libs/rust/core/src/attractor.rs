use serde::{Deserialize, Serialize};

use crate::vector::Position;

/// Best `(height, position)` pair observed by a particle, a swarm, or a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attractor {
    pub height: f64,
    pub position: Position,
}

impl Attractor {
    pub fn new(height: f64, position: Position) -> Self { Self { height, position } }

    /// Replace `slot` only on a strictly greater height. Returns true on change.
    pub fn promote(slot: &mut Option<Attractor>, candidate: &Attractor) -> bool {
        match slot {
            Some(current) if candidate.height <= current.height => false,
            _ => { *slot = Some(candidate.clone()); true }
        }
    }

    /// Highest of the given attractors; earlier entries win ties.
    pub fn best_of<'a, I>(candidates: I) -> Option<&'a Attractor>
    where
        I: IntoIterator<Item = &'a Attractor>,
    {
        candidates.into_iter().fold(None, |best: Option<&Attractor>, a| match best {
            Some(b) if a.height <= b.height => Some(b),
            _ => Some(a),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn promote_requires_strict_improvement() {
        let mut slot = None;
        assert!(Attractor::promote(&mut slot, &Attractor::new(-5.0, vec![1.0])));
        assert!(!Attractor::promote(&mut slot, &Attractor::new(-5.0, vec![2.0])));
        assert_eq!(slot.as_ref().unwrap().position, vec![1.0]);
        assert!(Attractor::promote(&mut slot, &Attractor::new(-1.0, vec![3.0])));
        assert_eq!(slot.unwrap().height, -1.0);
    }

    #[test]
    fn best_of_keeps_first_on_tie() {
        let a = Attractor::new(1.0, vec![0.0]);
        let b = Attractor::new(1.0, vec![1.0]);
        let c = Attractor::new(0.5, vec![2.0]);
        assert_eq!(Attractor::best_of([&a, &b, &c]).unwrap().position, vec![0.0]);
        assert!(Attractor::best_of(std::iter::empty()).is_none());
    }
}
