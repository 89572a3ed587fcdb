//! Hobohm1 greedy representative selection.
//!
//! Candidates are visited by descending length (ties keep the input order). Each candidate is compared,
//! in keep order, against the representatives kept so far, and is absorbed by the first one it is close
//! enough to, or kept as a new representative otherwise. Only the `(candidate, representative)` ordering
//! of a pair is looked up and a missing pair never absorbs. The result depends on the visiting order.

// Imports
use std::{cmp::Reverse, collections::HashSet};

use itertools::Itertools;

use crate::{
    data::{ClusterSet, MeasurementIndex, SeqRecord, ThresholdPredicate},
    error::Result,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Representative {
    pub id: String,
    /// absorbed ids, in the order they were absorbed
    pub absorbed: Vec<String>,
}

impl Representative {
    fn new(id: &str) -> Self {
        Self { id: id.to_string(), absorbed: Vec::new() }
    }

    pub fn nb_members(&self) -> usize {
        self.absorbed.len() + 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hobohm1Mode {
    /// Keep only the non-redundant representatives
    Reduce,
    /// Group every sequence under the representative that absorbed it
    Group,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Hobohm1Output {
    Reduced(Vec<SeqRecord>),
    Grouped(ClusterSet),
}

/// The representatives in keep order, each with its absorbed members
pub fn representatives(
    seqs: &[SeqRecord],
    index: &MeasurementIndex,
    predicate: &ThresholdPredicate,
) -> Vec<Representative> {
    let mut kept: Vec<Representative> = Vec::new();

    for query in seqs.iter().sorted_by_key(|seq| Reverse(seq.len())) {
        match kept.iter_mut().find(|repr| {
            index.get(&query.id, &repr.id).is_some_and(|score| predicate.accepts(score))
        }) {
            Some(repr) => repr.absorbed.push(query.id.clone()),
            None => kept.push(Representative::new(&query.id)),
        }
    }

    kept
}

/// Surviving representative records, in input order
pub fn reduce(
    seqs: &[SeqRecord],
    index: &MeasurementIndex,
    predicate: &ThresholdPredicate,
) -> Vec<SeqRecord> {
    let kept = representatives(seqs, index, predicate);
    let kept_ids: HashSet<&str> = kept.iter().map(|repr| repr.id.as_str()).collect();
    seqs.iter().filter(|seq| kept_ids.contains(seq.id.as_str())).cloned().collect_vec()
}

/// One cluster per representative, cluster ids follow the keep order
pub fn group(
    seqs: &[SeqRecord],
    index: &MeasurementIndex,
    predicate: &ThresholdPredicate,
) -> Result<ClusterSet> {
    ClusterSet::new(
        representatives(seqs, index, predicate)
            .into_iter()
            .map(|repr| std::iter::once(repr.id).chain(repr.absorbed).collect_vec())
            .collect_vec(),
    )
}

pub fn hobohm1(
    seqs: &[SeqRecord],
    index: &MeasurementIndex,
    predicate: &ThresholdPredicate,
    mode: Hobohm1Mode,
) -> Result<Hobohm1Output> {
    match mode {
        Hobohm1Mode::Reduce => Ok(Hobohm1Output::Reduced(reduce(seqs, index, predicate))),
        Hobohm1Mode::Group => group(seqs, index, predicate).map(Hobohm1Output::Grouped),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{data::MeasurementKind, testing};

    fn abc() -> Vec<SeqRecord> {
        vec![SeqRecord::create("C", "MKVLA"), SeqRecord::create("A", "MKVLAAGLLA"), SeqRecord::create("B", "MKVLAAGL")]
    }

    #[test]
    fn absorbed_into_longest_test() {
        let index = testing::index(&[("B", "A", 0.01), ("C", "A", 0.02)]);
        let predicate = ThresholdPredicate::new(MeasurementKind::Distance, 0.05);

        let kept = representatives(&abc(), &index, &predicate);
        assert_eq!(kept, vec![Representative { id: "A".to_string(), absorbed: vec!["B".to_string(), "C".to_string()] }]);

        let Hobohm1Output::Grouped(clusters) = hobohm1(&abc(), &index, &predicate, Hobohm1Mode::Group).unwrap()
        else {
            panic!("expected grouped output")
        };
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters.get(0).unwrap(), ["A", "B", "C"]);

        let reduced = reduce(&abc(), &index, &predicate);
        assert_eq!(reduced, vec![SeqRecord::create("A", "MKVLAAGLLA")]);
    }

    #[test]
    fn lookup_is_directional_test() {
        // only (representative, query) is present, so nothing gets absorbed
        let index = testing::index(&[("A", "B", 0.01), ("A", "C", 0.02)]);
        let predicate = ThresholdPredicate::new(MeasurementKind::Distance, 0.05);

        let clusters = group(&abc(), &index, &predicate).unwrap();
        assert_eq!(clusters.len(), 3);
        assert_eq!(reduce(&abc(), &index, &predicate).len(), 3);
    }

    #[test]
    fn first_representative_in_keep_order_wins_test() {
        let seqs = vec![
            SeqRecord::create("long", "AAAAAAAAAA"),
            SeqRecord::create("mid", "AAAAAAAA"),
            SeqRecord::create("mid2", "CCCCCCCC"),
            SeqRecord::create("short", "AAAA"),
        ];
        let index = testing::index(&[("mid", "long", 50.0), ("short", "mid2", 99.0), ("short", "long", 95.0)]);
        let predicate = ThresholdPredicate::new(MeasurementKind::Similarity, 90.0);

        let kept = representatives(&seqs, &index, &predicate);
        assert_eq!(kept.iter().map(|repr| repr.id.as_str()).collect_vec(), vec!["long", "mid", "mid2"]);
        assert_eq!(kept[0].absorbed, vec!["short".to_string()]);

        let clusters = group(&seqs, &index, &predicate).unwrap();
        assert_eq!(clusters.nb_members(), seqs.len());
        assert_eq!(clusters.cluster_of("short").unwrap(), clusters.cluster_of("long").unwrap());
    }

    #[test]
    fn stable_length_ties_test() {
        let seqs = testing::seqs(&["X", "Y", "Z"]);
        let index = testing::index(&[("Y", "X", 0.0), ("Z", "Y", 0.0)]);
        let predicate = ThresholdPredicate::new(MeasurementKind::Distance, 0.05);

        // equal lengths keep the input order, Z is never compared against X
        let kept = representatives(&seqs, &index, &predicate);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].absorbed, vec!["Y".to_string()]);
        assert_eq!(kept[1].id, "Z");
    }
}
