//! Graph clustering repeated over a range of thresholds, optionally followed by a partitioning attempt at
//! each threshold.

// Imports
use itertools::Itertools;
use log::{debug, info};

use crate::{
    clustering::graph_clusters,
    data::{ClusterSet, MeasurementIndex, MeasurementKind, ThresholdPredicate},
    error::Result,
    partition::{BalancedPartitioner, PartitionAssignment},
    quality::MISSING_DISTANCE,
    utils,
};

/// `10^-e` for every `e` between `|start|` and `|end|`, loosest threshold first
pub fn thresholds_from_exponents(
    start: i32,
    end: i32,
) -> Vec<f64> {
    let (a, b) = (start.unsigned_abs(), end.unsigned_abs());
    (a.min(b)..=a.max(b)).map(|exp| 10_f64.powi(-(exp as i32))).collect_vec()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SweepMode {
    /// Stop at the first threshold whose clusters could be partitioned
    #[default]
    UntilFeasible,
    Exhaustive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepParameters {
    pub exponent_start: i32,
    pub exponent_end: i32,
    pub mode: SweepMode,
}

impl SweepParameters {
    pub fn thresholds(&self) -> Vec<f64> {
        thresholds_from_exponents(self.exponent_start, self.exponent_end)
    }
}

impl Default for SweepParameters {
    fn default() -> Self {
        Self { exponent_start: 1, exponent_end: 20, mode: SweepMode::UntilFeasible }
    }
}

#[derive(Debug, Clone)]
pub struct SweepRow {
    pub threshold: f64,
    pub clusters: ClusterSet,
    pub nb_clusters: usize,
    pub max_cluster_size: usize,
    /// `None` when the silhouette is undefined for this clustering or the scores are similarities
    pub silhouette: Option<f64>,
    /// `None` when no partitioner was given
    pub partitions: Option<Result<PartitionAssignment>>,
}

impl SweepRow {
    pub fn is_partitioned(&self) -> bool {
        matches!(self.partitions, Some(Ok(_)))
    }
}

pub struct ThresholdSweep<'a> {
    index: &'a MeasurementIndex,
    kind: MeasurementKind,
    partitioner: Option<BalancedPartitioner>,
    mode: SweepMode,
    missing_distance: f64,
}

impl<'a> ThresholdSweep<'a> {
    pub fn new(
        index: &'a MeasurementIndex,
        kind: MeasurementKind,
    ) -> Self {
        Self { index, kind, partitioner: None, mode: SweepMode::Exhaustive, missing_distance: MISSING_DISTANCE }
    }

    pub fn with_partitioner(
        mut self,
        partitioner: BalancedPartitioner,
        mode: SweepMode,
    ) -> Self {
        self.partitioner = Some(partitioner);
        self.mode = mode;
        self
    }

    pub fn with_missing_distance(
        mut self,
        missing_distance: f64,
    ) -> Self {
        self.missing_distance = missing_distance;
        self
    }

    /// Recoverable partitioning failures are stored in the rows, any other error aborts the sweep.
    /// Without a partitioner every threshold is evaluated. Each partitioning is seeded with `seed`, so a
    /// row does not depend on the thresholds evaluated before it.
    pub fn run(
        &self,
        ids: &[&str],
        thresholds: &[f64],
        seed: u64,
    ) -> Result<Vec<SweepRow>> {
        let pb = utils::simple_progressbar(thresholds.len(), "thresholds", None);
        let mut rows: Vec<SweepRow> = Vec::with_capacity(thresholds.len());

        for &threshold in thresholds.iter() {
            let predicate = ThresholdPredicate::new(self.kind, threshold);
            let clusters = graph_clusters(ids.iter().copied(), self.index, &predicate)?;
            let silhouette = match self.kind {
                MeasurementKind::Distance => clusters.silhouette(self.index, self.missing_distance).mean(),
                MeasurementKind::Similarity => None,
            };

            let partitions = match &self.partitioner {
                Some(partitioner) => match partitioner.partition_seeded(&clusters, seed) {
                    Err(err) if !err.is_recoverable() => return Err(err),
                    result => Some(result),
                },
                None => None,
            };

            let row = SweepRow {
                threshold,
                nb_clusters: clusters.len(),
                max_cluster_size: clusters.max_cluster_size(),
                silhouette,
                partitions,
                clusters,
            };
            debug!(
                "threshold {threshold:e}: {} cluster(s), largest {}, silhouette {:?}, partitioned: {}",
                row.nb_clusters,
                row.max_cluster_size,
                row.silhouette,
                row.is_partitioned()
            );
            pb.inc(1);

            let stop = self.mode == SweepMode::UntilFeasible && row.is_partitioned();
            rows.push(row);
            if stop {
                info!("Stopping the sweep at the first partitionable threshold {threshold:e}");
                break;
            }
        }

        pb.finish();
        Ok(rows)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{Error, assert_float_eq, testing};

    const IDS: [&str; 4] = ["A", "B", "C", "D"];

    fn index() -> MeasurementIndex {
        testing::index(&[("A", "B", 5e-6), ("C", "D", 5e-4), ("B", "C", 5e-2)])
    }

    #[test]
    fn thresholds_from_exponents_test() {
        let thresholds = thresholds_from_exponents(3, 1);
        assert_eq!(thresholds.len(), 3);
        assert_float_eq!(thresholds[0], 1e-1);
        assert_float_eq!(thresholds[2], 1e-3);

        let thresholds = thresholds_from_exponents(-4, -2);
        assert_eq!(thresholds.len(), 3);
        assert_float_eq!(thresholds[0], 1e-2);
        assert_eq!(SweepParameters::default().thresholds().len(), 20);
    }

    #[test]
    fn until_feasible_test() {
        let index = index();
        let partitioner = BalancedPartitioner::new(2, IDS.len()).unwrap();
        let sweep = ThresholdSweep::new(&index, MeasurementKind::Distance)
            .with_partitioner(partitioner, SweepMode::UntilFeasible);

        let rows = sweep.run(&IDS, &thresholds_from_exponents(1, 4), 0).unwrap();
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].nb_clusters, 1);
        assert_eq!(rows[0].silhouette, None);
        assert!(matches!(rows[0].partitions, Some(Err(Error::CapacityExceeded { size: 4, max_capacity: 2, .. }))));

        assert_eq!(rows[1].nb_clusters, 2);
        assert!(rows[1].silhouette.is_some());
        assert!(rows[1].is_partitioned());
    }

    #[test]
    fn exhaustive_test() {
        let index = index();
        let partitioner = BalancedPartitioner::new(2, IDS.len()).unwrap();
        let sweep =
            ThresholdSweep::new(&index, MeasurementKind::Distance).with_partitioner(partitioner, SweepMode::Exhaustive);

        let rows = sweep.run(&IDS, &thresholds_from_exponents(1, 4), 0).unwrap();
        assert_eq!(rows.iter().map(|row| row.nb_clusters).collect_vec(), [1, 2, 2, 3]);
        assert_eq!(rows.iter().map(|row| row.max_cluster_size).collect_vec(), [4, 2, 2, 2]);
        assert!(rows.iter().skip(1).all(SweepRow::is_partitioned));
    }

    #[test]
    fn without_partitioner_test() {
        let index = index();
        let rows = ThresholdSweep::new(&index, MeasurementKind::Distance)
            .run(&IDS, &thresholds_from_exponents(1, 2), 0)
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|row| row.partitions.is_none()));
    }

    #[test]
    fn similarity_has_no_silhouette_test() {
        let index = testing::index(&[("A", "B", 99.0), ("C", "D", 99.0)]);
        let rows = ThresholdSweep::new(&index, MeasurementKind::Similarity).run(&IDS, &[90.0], 0).unwrap();
        assert_eq!(rows[0].nb_clusters, 2);
        assert_eq!(rows[0].silhouette, None);
    }

    #[test]
    fn rows_are_seeded_independently_test() {
        let ids = ["A", "B", "C", "D", "E", "F", "G", "H"];
        let index = testing::index(&[("A", "B", 1e-5), ("C", "D", 1e-5), ("E", "F", 1e-5), ("G", "H", 1e-3)]);
        let partitioner = BalancedPartitioner::new(4, ids.len()).unwrap();
        let sweep = ThresholdSweep::new(&index, MeasurementKind::Distance)
            .with_partitioner(partitioner.clone(), SweepMode::Exhaustive);

        for seed in 0..8 {
            let all = sweep.run(&ids, &thresholds_from_exponents(2, 4), seed).unwrap();
            let last = sweep.run(&ids, &[1e-4], seed).unwrap();
            assert_eq!(all.len(), 3);

            let expected = partitioner.partition_seeded(&all[2].clusters, seed).unwrap();
            let Some(Ok(from_all)) = &all[2].partitions else { panic!("threshold 1e-4 should be partitioned") };
            let Some(Ok(alone)) = &last[0].partitions else { panic!("threshold 1e-4 should be partitioned") };
            assert_eq!(from_all, &expected);
            assert_eq!(alone, &expected);
        }
    }
}
