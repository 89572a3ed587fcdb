// Imports
use std::collections::HashMap;

use nutype::nutype;

use crate::error::Error;

#[nutype(
    default = 0_f64,
    validate(finite),
    derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deref, TryFrom, Display, Default)
)]
pub struct Score(f64);

/// A single pairwise score, `(source, target, score)`, as produced by the alignment collaborator
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub source: String,
    pub target: String,
    pub score: Score,
}

impl Measurement {
    pub fn new(
        source: String,
        target: String,
        score: Score,
    ) -> Self {
        Self { source, target, score }
    }

    pub fn try_new(
        source: String,
        target: String,
        score: f64,
    ) -> Result<Self, Error> {
        match Score::try_new(score) {
            Ok(score) => Ok(Self { source, target, score }),
            Err(_) => Err(Error::NonFiniteScore { source_id: source, target_id: target, score }),
        }
    }

    /// Create a new Measurement from borrowed parameters, useful for creating tests
    pub fn try_create(
        source: &str,
        target: &str,
        score: f64,
    ) -> Result<Self, Error> {
        Self::try_new(source.to_string(), target.to_string(), score)
    }

    pub fn is_self_pair(&self) -> bool {
        self.source == self.target
    }
}

/// Lookup from ordered id pairs to scores, the first occurrence of a duplicated ordered pair wins
#[derive(Debug, Clone, Default)]
pub struct MeasurementIndex {
    inner: HashMap<String, HashMap<String, f64>>,
    len: usize,
}

impl MeasurementIndex {
    pub fn new(measurements: &[Measurement]) -> Self {
        let mut inner: HashMap<String, HashMap<String, f64>> = HashMap::new();
        let mut len: usize = 0;
        for m in measurements {
            let targets = inner.entry(m.source.clone()).or_default();
            if !targets.contains_key(&m.target) {
                targets.insert(m.target.clone(), *m.score);
                len += 1;
            }
        }
        Self { inner, len }
    }

    /// Directed lookup, only `(source, target)` is probed
    pub fn get(
        &self,
        source: &str,
        target: &str,
    ) -> Option<f64> {
        self.inner.get(source).and_then(|targets| targets.get(target)).copied()
    }

    /// Undirected lookup, `(a, b)` is probed first, then `(b, a)`
    pub fn get_either(
        &self,
        a: &str,
        b: &str,
    ) -> Option<f64> {
        self.get(a, b).or_else(|| self.get(b, a))
    }

    /// Iterates over every stored `(source, target, score)` triple, excluding self-pairs
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str, f64)> {
        self.inner.iter().flat_map(|(source, targets)| {
            targets
                .iter()
                .filter(move |(target, _)| *target != source)
                .map(move |(target, &score)| (source.as_str(), target.as_str(), score))
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl From<&[Measurement]> for MeasurementIndex {
    fn from(value: &[Measurement]) -> Self {
        Self::new(value)
    }
}
