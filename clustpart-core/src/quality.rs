//! Silhouette evaluation of a [`ClusterSet`] over precomputed pairwise distances.
//!
//! Pairs missing from the measurements are given [`MISSING_DISTANCE`], which sits above the highest
//! e-value threshold that is meaningful for BLAST-like scores. The distance from a member to itself is 0.
//! As with `sklearn.metrics.silhouette_samples`, members of singleton clusters score 0.

// Imports
use std::collections::{BTreeSet, HashMap};

use itertools::Itertools;
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::{
    data::{ClusterSet, MeasurementIndex},
    error::{Error, Result},
};

pub const MISSING_DISTANCE: f64 = 11.0;

#[derive(Debug, Clone, PartialEq)]
pub enum Silhouette {
    /// The mean is only defined for 2 ≤ #clusters < #members
    Undefined { nb_clusters: usize, nb_members: usize },
    Defined(SilhouetteSamples),
}

impl Silhouette {
    pub fn mean(&self) -> Option<f64> {
        match self {
            Self::Undefined { .. } => None,
            Self::Defined(samples) => Some(samples.mean),
        }
    }

    pub fn try_mean(&self) -> Result<f64> {
        match self {
            Self::Undefined { nb_clusters, nb_members } => {
                Err(Error::UndefinedSilhouette { nb_clusters: *nb_clusters, nb_members: *nb_members })
            }
            Self::Defined(samples) => Ok(samples.mean),
        }
    }

    pub fn samples(&self) -> Option<&SilhouetteSamples> {
        match self {
            Self::Undefined { .. } => None,
            Self::Defined(samples) => Some(samples),
        }
    }

    pub fn into_samples(self) -> Option<SilhouetteSamples> {
        match self {
            Self::Undefined { .. } => None,
            Self::Defined(samples) => Some(samples),
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, Self::Defined(_))
    }
}

/// Per-member silhouette values, ordered by cluster id then member id
#[derive(Debug, Clone, PartialEq)]
pub struct SilhouetteSamples {
    pub mean: f64,
    pub members: Vec<String>,
    pub labels: Vec<usize>,
    pub scores: Vec<f64>,
}

impl SilhouetteSamples {
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize, f64)> {
        self.members
            .iter()
            .zip(self.labels.iter())
            .zip(self.scores.iter())
            .map(|((member, &label), &score)| (member.as_str(), label, score))
    }

    /// Ids of the clusters holding at least one member with a negative silhouette
    pub fn negative_clusters(&self) -> BTreeSet<usize> {
        self.iter().filter(|&(_, _, score)| score < 0.0).map(|(_, label, _)| label).collect()
    }

    pub fn score_of(
        &self,
        member: &str,
    ) -> Option<f64> {
        self.members.iter().position(|m| m == member).map(|idx| self.scores[idx])
    }
}

pub fn silhouette(
    clusters: &ClusterSet,
    index: &MeasurementIndex,
    missing_distance: f64,
) -> Silhouette {
    let nb_clusters = clusters.len();
    let nb_members = clusters.nb_members();
    if nb_clusters < 2 || nb_clusters >= nb_members {
        return Silhouette::Undefined { nb_clusters, nb_members };
    }

    let (members, labels): (Vec<String>, Vec<usize>) = clusters
        .iter()
        .flat_map(|(cl_idx, cluster)| cluster.iter().map(move |member| (member.clone(), cl_idx)))
        .unzip();
    let sizes = clusters.iter().map(|(_, cluster)| cluster.len() as f64).collect_vec();
    let rows = distance_rows(&members, index);

    let scores: Vec<f64> = (0..nb_members)
        .into_par_iter()
        .map(|i| {
            let own = labels[i];
            if sizes[own] <= 1.0 {
                return 0.0;
            }
            // start from "everything is missing" and correct with the known distances
            let mut sums = sizes.iter().map(|size| size * missing_distance).collect_vec();
            sums[own] -= missing_distance;
            for &(j, dist) in rows[i].iter() {
                sums[labels[j]] += dist - missing_distance;
            }

            let a = sums[own] / (sizes[own] - 1.0);
            let b = sums
                .iter()
                .zip(sizes.iter())
                .enumerate()
                .filter(|&(cl_idx, _)| cl_idx != own)
                .map(|(_, (sum, size))| sum / size)
                .fold(f64::INFINITY, f64::min);

            let denom = a.max(b);
            if denom > 0.0 { (b - a) / denom } else { 0.0 }
        })
        .collect();

    let mean = scores.iter().sum::<f64>() / nb_members as f64;
    Silhouette::Defined(SilhouetteSamples { mean, members, labels, scores })
}

/// Known distances from each member to the others, `(i, j)` is used when present, `(j, i)` otherwise
fn distance_rows(
    members: &[String],
    index: &MeasurementIndex,
) -> Vec<Vec<(usize, f64)>> {
    let lookup: HashMap<&str, usize> =
        members.iter().enumerate().map(|(idx, member)| (member.as_str(), idx)).collect();

    let known = index
        .pairs()
        .filter_map(|(source, target, score)| Some((*lookup.get(source)?, *lookup.get(target)?, score)))
        .collect_vec();

    let mut rows: Vec<HashMap<usize, f64>> = vec![HashMap::new(); members.len()];
    for &(i, j, score) in known.iter() {
        rows[i].insert(j, score);
    }
    for &(i, j, score) in known.iter() {
        rows[j].entry(i).or_insert(score);
    }

    rows.into_iter().map(|row| row.into_iter().sorted_unstable_by_key(|&(j, _)| j).collect_vec()).collect_vec()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{assert_float_eq, testing};

    fn cset(clusters: &[&[&str]]) -> ClusterSet {
        ClusterSet::new(
            clusters.iter().map(|cluster| cluster.iter().map(|m| m.to_string()).collect_vec()).collect_vec(),
        )
        .unwrap()
    }

    #[test]
    fn well_separated_clusters_test() {
        let clusters = cset(&[&["A", "B"], &["C", "D"]]);
        let index = testing::index(&[("A", "B", 0.0), ("C", "D", 0.0)]);

        let silhouette = clusters.silhouette(&index, MISSING_DISTANCE);
        assert_float_eq!(silhouette.mean().unwrap(), 1.0);
        let samples = silhouette.samples().unwrap();
        assert_eq!(samples.members, ["A", "B", "C", "D"]);
        assert_eq!(samples.labels, [0, 0, 1, 1]);
        assert!(samples.negative_clusters().is_empty());
    }

    #[test]
    fn undefined_range_test() {
        let index = testing::index(&[("A", "B", 0.0)]);

        let single = cset(&[&["A", "B", "C"]]);
        let silhouette = single.silhouette(&index, MISSING_DISTANCE);
        assert_eq!(silhouette, Silhouette::Undefined { nb_clusters: 1, nb_members: 3 });
        assert_eq!(
            silhouette.try_mean().unwrap_err(),
            Error::UndefinedSilhouette { nb_clusters: 1, nb_members: 3 }
        );

        let singletons = cset(&[&["A"], &["B"], &["C"]]);
        assert_eq!(singletons.silhouette(&index, MISSING_DISTANCE).mean(), None);
    }

    #[test]
    fn hand_computed_test() {
        // A-B close, C is far from A but reported as close to B by a one-directional score
        let clusters = cset(&[&["A", "B", "C"], &["D", "E"]]);
        let index = testing::index(&[
            ("A", "B", 1.0),
            ("B", "C", 2.0),
            ("D", "E", 1.0),
            ("A", "D", 5.0),
            ("C", "D", 1.0),
            ("C", "E", 1.0),
        ]);
        let samples = clusters.silhouette(&index, 11.0).into_samples().unwrap();

        // A: a = (1 + 11) / 2 = 6, b = (5 + 11) / 2 = 8
        assert_float_eq!(samples.score_of("A").unwrap(), (8.0 - 6.0) / 8.0);
        // C: a = (11 + 2) / 2 = 6.5, b = (1 + 1) / 2 = 1
        assert_float_eq!(samples.score_of("C").unwrap(), (1.0 - 6.5) / 6.5);
        // D: a = 1, b = (5 + 11 + 1) / 3
        assert_float_eq!(samples.score_of("D").unwrap(), (17.0 / 3.0 - 1.0) / (17.0 / 3.0));
        assert_eq!(samples.negative_clusters().into_iter().collect_vec(), vec![0]);
    }

    #[test]
    fn singleton_member_scores_zero_test() {
        let clusters = cset(&[&["A", "B"], &["C"]]);
        let index = testing::index(&[("A", "B", 0.5)]);
        let samples = clusters.silhouette(&index, MISSING_DISTANCE).into_samples().unwrap();
        assert_float_eq!(samples.score_of("C").unwrap(), 0.0);
    }
}
