//! Similarity clustering and capacity-balanced partitioning of biological sequence identifiers.
//!
//! Sequences are grouped from precomputed pairwise scores, either as connected components of a
//! thresholded graph or through Hobohm1-style representative reduction. Whole clusters are then
//! distributed across equal-capacity partitions, optionally after silhouette-guided pruning.

// Modules
pub mod clustering;
pub mod data;
pub mod error;
pub mod partition;
pub mod prelude;
pub mod quality;
pub mod sweep;
pub mod utils;

// Re-exports
pub use error::{Error, Result};

#[cfg(test)]
#[macro_export]
macro_rules! assert_float_eq {
    ($lhs: expr, $rhs: expr) => {
        let (a, b): (f64, f64) = ($lhs, $rhs);
        assert!((a - b).abs() < 1E-9, "{a} != {b}")
    };
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::data::{Measurement, MeasurementIndex, SeqRecord};

    pub fn seqs(ids: &[&str]) -> Vec<SeqRecord> {
        ids.iter().map(|id| SeqRecord::create(id, "MKV")).collect()
    }

    pub fn index(triples: &[(&str, &str, f64)]) -> MeasurementIndex {
        MeasurementIndex::new(&measurements(triples))
    }

    pub fn measurements(triples: &[(&str, &str, f64)]) -> Vec<Measurement> {
        triples.iter().map(|&(a, b, score)| Measurement::try_create(a, b, score).unwrap()).collect()
    }
}

#[cfg(test)]
mod test {
    use crate::{
        clustering::{ClusteringMethod, Clusterer},
        data::{MeasurementKind, ThresholdPredicate},
        partition::BalancedPartitioner,
        testing,
    };

    #[test]
    fn cluster_then_partition_test() {
        let seqs = testing::seqs(&["A", "B", "C", "D"]);
        let index = testing::index(&[("A", "B", 0.01), ("C", "D", 0.01)]);
        let predicate = ThresholdPredicate::new(MeasurementKind::Distance, 0.05);

        let clusters = Clusterer::new(ClusteringMethod::Graph, predicate).cluster(&seqs, &index).unwrap();
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters.get(0).unwrap(), ["A", "B"]);
        assert_eq!(clusters.get(1).unwrap(), ["C", "D"]);

        let partitioner = BalancedPartitioner::new(2, seqs.len()).unwrap();
        let assignment = partitioner.partition_seeded(&clusters, 7).unwrap();
        assert_eq!(assignment.len(), 2);
        for (_, partition) in assignment.iter() {
            assert_eq!(partition.size(), 2);
            assert_eq!(partition.nb_clusters(), 1);
        }
    }
}
