// Imports
use std::collections::{HashMap, HashSet};

use itertools::Itertools;

use crate::{
    data::MeasurementIndex,
    error::{Error, Result},
    quality::{self, Silhouette},
};

/// Immutable clustering result, cluster ids are contiguous and follow the order the clusters were given in,
/// members of each cluster are sorted and unique, and no member belongs to two clusters
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(transparent))]
#[derive(Debug, Clone, Default)]
pub struct ClusterSet {
    clusters: Vec<Vec<String>>,
}

impl ClusterSet {
    /// Empty clusters are dropped, a member found in two different clusters is an error
    pub fn new(clusters: Vec<Vec<String>>) -> Result<Self> {
        let clusters = clusters
            .into_iter()
            .filter(|cluster| !cluster.is_empty())
            .map(|cluster| cluster.into_iter().sorted_unstable().dedup().collect_vec())
            .collect_vec();

        let mut seen: HashSet<&str> = HashSet::with_capacity(clusters.iter().map(Vec::len).sum());
        for member in clusters.iter().flatten() {
            if !seen.insert(member.as_str()) {
                return Err(Error::DuplicateMember(member.clone()));
            }
        }

        Ok(Self { clusters })
    }

    /// Number of clusters
    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    pub fn nb_members(&self) -> usize {
        self.clusters.iter().map(Vec::len).sum()
    }

    pub fn max_cluster_size(&self) -> usize {
        self.clusters.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn min_cluster_size(&self) -> usize {
        self.clusters.iter().map(Vec::len).min().unwrap_or(0)
    }

    pub fn cluster_size(
        &self,
        cluster_id: usize,
    ) -> Option<usize> {
        self.clusters.get(cluster_id).map(Vec::len)
    }

    pub fn get(
        &self,
        cluster_id: usize,
    ) -> Option<&[String]> {
        self.clusters.get(cluster_id).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = (usize, &[String])> {
        self.clusters.iter().map(Vec::as_slice).enumerate()
    }

    /// Every member, in cluster id order then lexicographic order
    pub fn members(&self) -> impl Iterator<Item = &str> {
        self.clusters.iter().flatten().map(String::as_str)
    }

    pub fn contains(
        &self,
        member: &str,
    ) -> bool {
        self.clusters.iter().any(|cluster| cluster.binary_search_by(|m| m.as_str().cmp(member)).is_ok())
    }

    pub fn membership(&self) -> HashMap<&str, usize> {
        self.iter().flat_map(|(cl_idx, cluster)| cluster.iter().map(move |m| (m.as_str(), cl_idx))).collect()
    }

    pub fn cluster_of(
        &self,
        member: &str,
    ) -> Result<usize> {
        self.clusters
            .iter()
            .position(|cluster| cluster.binary_search_by(|m| m.as_str().cmp(member)).is_ok())
            .ok_or_else(|| Error::UnknownMember(member.to_string()))
    }

    /// Largest clusters first, ties broken by ascending cluster id
    pub fn sorted_by_size(&self) -> Vec<(usize, &[String])> {
        self.iter().sorted_by(|(a_idx, a), (b_idx, b)| b.len().cmp(&a.len()).then(a_idx.cmp(b_idx))).collect_vec()
    }

    pub fn silhouette(
        &self,
        index: &MeasurementIndex,
        missing_distance: f64,
    ) -> Silhouette {
        quality::silhouette(self, index, missing_distance)
    }

    pub fn into_inner(self) -> Vec<Vec<String>> {
        self.clusters
    }
}

/// Two cluster sets are equal when they hold the same member sets, regardless of cluster ids
impl PartialEq for ClusterSet {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.clusters.len() == other.clusters.len()
            && self.clusters.iter().sorted_unstable().eq(other.clusters.iter().sorted_unstable())
    }
}

impl Eq for ClusterSet {}

#[cfg(test)]
mod test {
    use super::*;

    fn cset(clusters: &[&[&str]]) -> ClusterSet {
        ClusterSet::new(
            clusters.iter().map(|cluster| cluster.iter().map(|m| m.to_string()).collect_vec()).collect_vec(),
        )
        .unwrap()
    }

    #[test]
    fn equality_ignores_ids_and_order_test() {
        let a = cset(&[&["A", "B"], &["C"], &["E", "D"]]);
        let b = cset(&[&["D", "E"], &["B", "A"], &["C"]]);
        let c = cset(&[&["A", "B", "C"], &["D", "E"]]);

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn construction_invariants_test() {
        let set = cset(&[&["B", "A", "B"], &[], &["C"]]);
        assert_eq!(set.len(), 2);
        assert_eq!(set.get(0).unwrap(), ["A", "B"]);
        assert_eq!(set.nb_members(), 3);

        let err = ClusterSet::new(vec![vec!["A".to_string()], vec!["B".to_string(), "A".to_string()]]);
        assert_eq!(err.unwrap_err(), Error::DuplicateMember("A".to_string()));
    }

    #[test]
    fn lookup_test() {
        let set = cset(&[&["A", "B"], &["C"]]);
        assert_eq!(set.cluster_of("C").unwrap(), 1);
        assert_eq!(set.cluster_of("Z").unwrap_err(), Error::UnknownMember("Z".to_string()));
        assert!(set.contains("B"));
        assert_eq!(set.membership()["A"], 0);
    }

    #[test]
    fn sizes_test() {
        let set = cset(&[&["A"], &["B", "C", "D"], &["E", "F"], &["G", "H", "I"]]);
        assert_eq!(set.max_cluster_size(), 3);
        assert_eq!(set.min_cluster_size(), 1);
        let order = set.sorted_by_size().into_iter().map(|(idx, _)| idx).collect_vec();
        assert_eq!(order, vec![1, 3, 2, 0]);
    }
}
