// Imports
use thiserror::Error;

use crate::data::MeasurementKind;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("Invalid clustering method '{0}', expected one of `graph` or `hobohm1`")]
    InvalidMethod(String),
    #[error("Invalid measurement type '{0}', expected one of `distance` or `similarity`")]
    InvalidMeasurementKind(String),
    #[error("Silhouette-guided optimization needs distance scores, got {0} scores")]
    NonDistanceMeasurement(MeasurementKind),
    #[error("Invalid number of partitions ({0}), at least one partition is required")]
    InvalidPartitionCount(usize),
    #[error(
        "Cluster {cluster_id} holds {size} members which exceeds the maximum partition capacity of {max_capacity}"
    )]
    CapacityExceeded { cluster_id: usize, size: usize, max_capacity: usize },
    #[error("Cluster {cluster_id} of size {size} does not fit in any of the remaining partitions")]
    PlacementFailed { cluster_id: usize, size: usize },
    #[error(
        "Silhouette score is undefined for {nb_clusters} cluster(s) over {nb_members} member(s), 2 ≤ #clusters < #members is required"
    )]
    UndefinedSilhouette { nb_clusters: usize, nb_members: usize },
    #[error("Unknown member '{0}'")]
    UnknownMember(String),
    #[error("Member '{0}' appears in more than one cluster")]
    DuplicateMember(String),
    #[error("Expected {expected} members in total, found {found}")]
    MemberCountMismatch { expected: usize, found: usize },
    #[error("Non-finite score {score} for the pair ('{source_id}', '{target_id}')")]
    NonFiniteScore { source_id: String, target_id: String, score: f64 },
}

impl Error {
    /// Algorithmic edge cases that a caller sweeping over thresholds can step past.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::CapacityExceeded { .. }
                | Self::PlacementFailed { .. }
                | Self::UndefinedSilhouette { .. }
                | Self::UnknownMember(_)
        )
    }
}
