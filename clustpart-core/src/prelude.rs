pub use crate::clustering::{
    ClusterOptimizer, Clusterer, ClusteringMethod, Hobohm1Mode, Hobohm1Output, OptimizationOutput,
    OptimizerParameters, SimilarityGraph, graph_clusters, hobohm1,
};
pub use crate::data::{ClusterSet, Measurement, MeasurementIndex, MeasurementKind, SeqRecord, ThresholdPredicate};
pub use crate::error::{Error, Result};
pub use crate::partition::{BalancedPartitioner, Partition, PartitionAssignment, even_split};
pub use crate::quality::{MISSING_DISTANCE, Silhouette, SilhouetteSamples, silhouette};
pub use crate::sweep::{SweepMode, SweepParameters, SweepRow, ThresholdSweep, thresholds_from_exponents};
