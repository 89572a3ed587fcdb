//! Capacity-balanced random placement of whole clusters into a fixed number of partitions.

// Imports
use std::collections::BTreeMap;

use itertools::Itertools;
use log::{debug, warn};
use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};

use crate::{
    data::ClusterSet,
    error::{Error, Result},
};

/// `nb_members` split as evenly as possible, the first `nb_members % nb_partitions` partitions get one extra slot
pub fn even_split(
    nb_members: usize,
    nb_partitions: usize,
) -> Vec<usize> {
    if nb_partitions == 0 {
        return Vec::new();
    }
    let (base, remainder) = (nb_members / nb_partitions, nb_members % nb_partitions);
    (0..nb_partitions).map(|idx| base + usize::from(idx < remainder)).collect_vec()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalancedPartitioner {
    nb_members: usize,
    capacities: Vec<usize>,
}

impl BalancedPartitioner {
    pub fn new(
        nb_partitions: usize,
        nb_members: usize,
    ) -> Result<Self> {
        if nb_partitions == 0 {
            return Err(Error::InvalidPartitionCount(nb_partitions));
        }
        Ok(Self { nb_members, capacities: even_split(nb_members, nb_partitions) })
    }

    pub fn nb_partitions(&self) -> usize {
        self.capacities.len()
    }

    pub fn nb_members(&self) -> usize {
        self.nb_members
    }

    pub fn capacities(&self) -> &[usize] {
        &self.capacities
    }

    pub fn max_capacity(&self) -> usize {
        self.capacities.first().copied().unwrap_or_default()
    }

    /// Fails if the member totals disagree or if the largest cluster cannot fit into any partition
    pub fn check_feasible(
        &self,
        clusters: &ClusterSet,
    ) -> Result<()> {
        if clusters.nb_members() != self.nb_members {
            return Err(Error::MemberCountMismatch { expected: self.nb_members, found: clusters.nb_members() });
        }
        match clusters.sorted_by_size().first() {
            Some(&(cluster_id, members)) if members.len() > self.max_capacity() => Err(Error::CapacityExceeded {
                cluster_id,
                size: members.len(),
                max_capacity: self.max_capacity(),
            }),
            _ => Ok(()),
        }
    }

    /// Clusters are placed largest first (ties by cluster id), each into the first partition of a random
    /// permutation of the non-full partitions that still has room for it.
    pub fn partition<R: Rng + ?Sized>(
        &self,
        clusters: &ClusterSet,
        rng: &mut R,
    ) -> Result<PartitionAssignment> {
        self.check_feasible(clusters)?;

        let mut partitions = self.capacities.iter().map(|&capacity| Partition::new(capacity)).collect_vec();

        for (cluster_id, members) in clusters.sorted_by_size() {
            let mut candidates = partitions
                .iter()
                .enumerate()
                .filter(|(_, partition)| !partition.is_full())
                .map(|(part_idx, _)| part_idx)
                .collect_vec();
            candidates.shuffle(rng);

            let Some(part_idx) =
                candidates.into_iter().find(|&part_idx| partitions[part_idx].remaining() >= members.len())
            else {
                warn!("No partition has room left for cluster {cluster_id} of size {}", members.len());
                return Err(Error::PlacementFailed { cluster_id, size: members.len() });
            };
            partitions[part_idx].clusters.insert(cluster_id, members.to_vec());
        }

        debug!(
            "Placed {} cluster(s) into {} partition(s) of sizes [{}]",
            clusters.len(),
            partitions.len(),
            partitions.iter().map(Partition::size).join(", ")
        );
        Ok(PartitionAssignment { partitions })
    }

    pub fn partition_seeded(
        &self,
        clusters: &ClusterSet,
        seed: u64,
    ) -> Result<PartitionAssignment> {
        self.partition(clusters, &mut StdRng::seed_from_u64(seed))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Partition {
    pub capacity: usize,
    /// cluster id → members
    pub clusters: BTreeMap<usize, Vec<String>>,
}

impl Partition {
    fn new(capacity: usize) -> Self {
        Self { capacity, clusters: BTreeMap::new() }
    }

    pub fn size(&self) -> usize {
        self.clusters.values().map(Vec::len).sum()
    }

    pub fn nb_clusters(&self) -> usize {
        self.clusters.len()
    }

    pub fn remaining(&self) -> usize {
        self.capacity.saturating_sub(self.size())
    }

    pub fn is_full(&self) -> bool {
        self.remaining() == 0
    }

    pub fn members(&self) -> impl Iterator<Item = &str> {
        self.clusters.values().flatten().map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(transparent))]
pub struct PartitionAssignment {
    partitions: Vec<Partition>,
}

impl PartitionAssignment {
    pub fn len(&self) -> usize {
        self.partitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }

    pub fn get(
        &self,
        part_idx: usize,
    ) -> Option<&Partition> {
        self.partitions.get(part_idx)
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = (usize, &Partition)> {
        self.partitions.iter().enumerate()
    }

    /// Partition index of the cluster `cluster_id`
    pub fn partition_of(
        &self,
        cluster_id: usize,
    ) -> Option<usize> {
        self.partitions.iter().position(|partition| partition.clusters.contains_key(&cluster_id))
    }

    /// Checks that every cluster of `clusters` sits whole in exactly one partition and that no partition
    /// exceeds its capacity
    pub fn validate(
        &self,
        clusters: &ClusterSet,
    ) -> Result<()> {
        for partition in self.partitions.iter().filter(|partition| partition.size() > partition.capacity) {
            if let Some((&cluster_id, members)) = partition.clusters.iter().max_by_key(|(_, members)| members.len()) {
                return Err(Error::CapacityExceeded {
                    cluster_id,
                    size: members.len(),
                    max_capacity: partition.capacity,
                });
            }
        }

        let placed = self.partitions.iter().flat_map(|partition| partition.clusters.iter()).collect_vec();
        let found: usize = placed.iter().map(|(_, members)| members.len()).sum();
        if placed.len() != clusters.len() || found != clusters.nb_members() {
            return Err(Error::MemberCountMismatch { expected: clusters.nb_members(), found });
        }
        for (&cluster_id, members) in placed {
            if clusters.get(cluster_id) != Some(members.as_slice()) {
                return Err(Error::UnknownMember(members.first().cloned().unwrap_or_default()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn cset(sizes: &[usize]) -> ClusterSet {
        let mut counter = 0;
        ClusterSet::new(
            sizes
                .iter()
                .map(|&size| {
                    (0..size)
                        .map(|_| {
                            counter += 1;
                            format!("s{counter:03}")
                        })
                        .collect_vec()
                })
                .collect_vec(),
        )
        .unwrap()
    }

    #[test]
    fn even_split_test() {
        assert_eq!(even_split(10, 3), [4, 3, 3]);
        assert_eq!(even_split(9, 3), [3, 3, 3]);
        assert_eq!(even_split(2, 3), [1, 1, 0]);
        assert!(even_split(5, 0).is_empty());

        let partitioner = BalancedPartitioner::new(3, 10).unwrap();
        assert_eq!(partitioner.capacities(), [4, 3, 3]);
        assert_eq!(partitioner.max_capacity(), 4);
        assert_eq!(BalancedPartitioner::new(0, 10), Err(Error::InvalidPartitionCount(0)));
    }

    #[test]
    fn placement_invariants_test() {
        let clusters = cset(&[1, 3, 1, 2, 2, 1]);
        let partitioner = BalancedPartitioner::new(3, clusters.nb_members()).unwrap();

        for seed in 0..32 {
            let assignment = partitioner.partition_seeded(&clusters, seed).unwrap();
            assignment.validate(&clusters).unwrap();
            assert_eq!(assignment.len(), 3);
            assert_eq!(assignment.iter().map(|(_, partition)| partition.nb_clusters()).sum::<usize>(), 6);
            assert_eq!(assignment.iter().map(|(_, partition)| partition.size()).sum::<usize>(), 10);
            for (part_idx, partition) in assignment.iter() {
                assert!(partition.size() <= partitioner.capacities()[part_idx]);
            }
            for (cluster_id, _) in clusters.iter() {
                assert!(assignment.partition_of(cluster_id).is_some());
            }
        }
    }

    #[test]
    fn seeded_is_reproducible_test() {
        let clusters = cset(&[2, 2, 1, 1, 1, 1, 1, 1]);
        let partitioner = BalancedPartitioner::new(4, clusters.nb_members()).unwrap();
        let a = partitioner.partition_seeded(&clusters, 42).unwrap();
        let b = partitioner.partition_seeded(&clusters, 42).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn capacity_exceeded_test() {
        let clusters = cset(&[1, 5]);
        let partitioner = BalancedPartitioner::new(2, 6).unwrap();
        let err = partitioner.partition_seeded(&clusters, 0).unwrap_err();
        assert_eq!(err, Error::CapacityExceeded { cluster_id: 1, size: 5, max_capacity: 3 });
        assert!(err.is_recoverable());
    }

    #[test]
    fn placement_failed_test() {
        // every cluster fits on its own, but the third has nowhere to go
        let clusters = cset(&[2, 2, 2]);
        let partitioner = BalancedPartitioner::new(2, 6).unwrap();
        assert!(partitioner.check_feasible(&clusters).is_ok());
        for seed in 0..8 {
            assert_eq!(
                partitioner.partition_seeded(&clusters, seed),
                Err(Error::PlacementFailed { cluster_id: 2, size: 2 })
            );
        }
    }

    #[test]
    fn member_count_mismatch_test() {
        let clusters = cset(&[2, 2]);
        let partitioner = BalancedPartitioner::new(2, 5).unwrap();
        assert_eq!(
            partitioner.partition_seeded(&clusters, 0),
            Err(Error::MemberCountMismatch { expected: 5, found: 4 })
        );
    }

    #[test]
    fn more_partitions_than_members_test() {
        let clusters = cset(&[1, 1]);
        let partitioner = BalancedPartitioner::new(3, 2).unwrap();
        let assignment = partitioner.partition_seeded(&clusters, 3).unwrap();
        assert_eq!(assignment.get(2).unwrap().size(), 0);
        assert_eq!(assignment.get(0).unwrap().size(), 1);
        assert_eq!(assignment.get(1).unwrap().size(), 1);
    }
}
