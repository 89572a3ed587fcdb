// Modules
mod cluster_set;
mod measurement;
mod predicate;
mod seqrecord;

// Re-exports
pub use cluster_set::ClusterSet;
pub use measurement::{Measurement, MeasurementIndex, Score, ScoreError};
pub use predicate::{MeasurementKind, ThresholdPredicate};
pub use seqrecord::SeqRecord;
