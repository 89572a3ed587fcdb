// Imports
use std::{fmt, str::FromStr};

use crate::error::Error;

/// Whether a lower score means closer (`Distance`, e.g. BLAST e-values) or a higher one does (`Similarity`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MeasurementKind {
    #[default]
    Distance,
    Similarity,
}

impl FromStr for MeasurementKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "distance" => Ok(Self::Distance),
            "similarity" => Ok(Self::Similarity),
            _ => Err(Error::InvalidMeasurementKind(s.to_string())),
        }
    }
}

impl fmt::Display for MeasurementKind {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::Distance => write!(f, "distance"),
            Self::Similarity => write!(f, "similarity"),
        }
    }
}

/// `score ≤ threshold` for distances, `score ≥ threshold` for similarities
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdPredicate {
    pub kind: MeasurementKind,
    pub threshold: f64,
}

impl ThresholdPredicate {
    pub fn new(
        kind: MeasurementKind,
        threshold: f64,
    ) -> Self {
        Self { kind, threshold }
    }

    #[inline]
    pub fn accepts(
        &self,
        score: f64,
    ) -> bool {
        match self.kind {
            MeasurementKind::Distance => score <= self.threshold,
            MeasurementKind::Similarity => score >= self.threshold,
        }
    }

    pub fn with_threshold(
        self,
        threshold: f64,
    ) -> Self {
        Self { kind: self.kind, threshold }
    }
}
