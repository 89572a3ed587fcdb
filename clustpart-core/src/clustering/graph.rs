//! Threshold-filtered similarity/distance graph over sequence ids, clustered into connected components.

// Imports
use std::collections::HashMap;

use itertools::Itertools;

use crate::{
    data::{ClusterSet, MeasurementIndex, ThresholdPredicate},
    error::Result,
};

/// Undirected graph over an arena of node indices mapped from string ids, isolated nodes are kept
#[derive(Debug, Clone)]
pub struct SimilarityGraph {
    ids: Vec<String>,
    lookup: HashMap<String, usize>,
    /// neighbor lists sorted by node index, weights are the raw scores of the accepted measurements
    adjacency: Vec<Vec<(usize, f64)>>,
}

impl SimilarityGraph {
    /// An edge `(u, v)` exists iff a measurement for `(u, v)` or `(v, u)` is accepted by the predicate. Self-pairs
    /// and pairs referencing ids outside of `ids` are ignored. If both orderings are accepted with different
    /// scores, the ordering whose source comes first in `ids` gives the edge weight.
    pub fn build<'a>(
        ids: impl IntoIterator<Item = &'a str>,
        index: &MeasurementIndex,
        predicate: &ThresholdPredicate,
    ) -> Self {
        let ids = ids.into_iter().unique().map(str::to_string).collect_vec();
        let lookup: HashMap<String, usize> = ids.iter().cloned().enumerate().map(|(idx, id)| (id, idx)).collect();

        let mut edges: HashMap<(usize, usize), f64> = HashMap::new();
        for (source, target, score) in index.pairs() {
            let (Some(&u), Some(&v)) = (lookup.get(source), lookup.get(target)) else {
                continue;
            };
            if !predicate.accepts(score) {
                continue;
            }
            if u < v {
                edges.insert((u, v), score);
            } else {
                edges.entry((v, u)).or_insert(score);
            }
        }

        let mut adjacency: Vec<Vec<(usize, f64)>> = vec![Vec::new(); ids.len()];
        for (&(u, v), &weight) in edges.iter() {
            adjacency[u].push((v, weight));
            adjacency[v].push((u, weight));
        }
        adjacency.iter_mut().for_each(|neighbors| neighbors.sort_unstable_by_key(|&(idx, _)| idx));

        Self { ids, lookup, adjacency }
    }

    pub fn nb_nodes(&self) -> usize {
        self.ids.len()
    }

    pub fn nb_edges(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum::<usize>() / 2
    }

    pub fn id(
        &self,
        node: usize,
    ) -> &str {
        &self.ids[node]
    }

    pub fn node(
        &self,
        id: &str,
    ) -> Option<usize> {
        self.lookup.get(id).copied()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    pub fn neighbors(
        &self,
        node: usize,
    ) -> &[(usize, f64)] {
        &self.adjacency[node]
    }

    /// A new graph with `id` and all of its incident edges removed
    pub fn without(
        &self,
        id: &str,
    ) -> Self {
        let Some(removed) = self.node(id) else {
            return self.clone();
        };
        let remap = |idx: usize| if idx > removed { idx - 1 } else { idx };

        let ids = self.ids.iter().enumerate().filter(|&(idx, _)| idx != removed).map(|(_, id)| id.clone()).collect_vec();
        let lookup: HashMap<String, usize> = ids.iter().cloned().enumerate().map(|(idx, id)| (id, idx)).collect();
        let adjacency = self
            .adjacency
            .iter()
            .enumerate()
            .filter(|&(idx, _)| idx != removed)
            .map(|(_, neighbors)| {
                neighbors
                    .iter()
                    .filter(|&&(nbr, _)| nbr != removed)
                    .map(|&(nbr, weight)| (remap(nbr), weight))
                    .collect_vec()
            })
            .collect_vec();

        Self { ids, lookup, adjacency }
    }

    /// Connected components as node indices, each sorted by id, components ordered by their smallest id
    pub fn components(&self) -> Vec<Vec<usize>> {
        let mut uf = UnionFind::new(self.nb_nodes());
        for (u, neighbors) in self.adjacency.iter().enumerate() {
            for &(v, _) in neighbors.iter().filter(|&&(v, _)| v > u) {
                uf.union(u, v);
            }
        }

        let mut groups: HashMap<usize, Vec<usize>> = HashMap::new();
        for node in 0..self.nb_nodes() {
            groups.entry(uf.find(node)).or_default().push(node);
        }

        groups
            .into_values()
            .map(|group| group.into_iter().sorted_by(|&a, &b| self.ids[a].cmp(&self.ids[b])).collect_vec())
            .sorted_by(|a, b| self.ids[a[0]].cmp(&self.ids[b[0]]))
            .collect_vec()
    }

    pub fn connected_components(&self) -> Result<ClusterSet> {
        ClusterSet::new(
            self.components()
                .into_iter()
                .map(|component| component.into_iter().map(|node| self.ids[node].clone()).collect_vec())
                .collect_vec(),
        )
    }
}

/// Disjoint-set forest with path compression and union by rank
struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl UnionFind {
    fn new(size: usize) -> Self {
        Self { parent: (0..size).collect(), rank: vec![0; size] }
    }

    fn find(
        &mut self,
        x: usize,
    ) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut current = x;
        while self.parent[current] != root {
            let next = self.parent[current];
            self.parent[current] = root;
            current = next;
        }
        root
    }

    fn union(
        &mut self,
        x: usize,
        y: usize,
    ) {
        let (root_x, root_y) = (self.find(x), self.find(y));
        if root_x == root_y {
            return;
        }
        match self.rank[root_x].cmp(&self.rank[root_y]) {
            std::cmp::Ordering::Greater => self.parent[root_y] = root_x,
            std::cmp::Ordering::Less => self.parent[root_x] = root_y,
            std::cmp::Ordering::Equal => {
                self.parent[root_y] = root_x;
                self.rank[root_x] += 1;
            }
        }
    }
}

/// Connected components of the thresholded graph over `ids`
pub fn graph_clusters<'a>(
    ids: impl IntoIterator<Item = &'a str>,
    index: &MeasurementIndex,
    predicate: &ThresholdPredicate,
) -> Result<ClusterSet> {
    SimilarityGraph::build(ids, index, predicate).connected_components()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{data::MeasurementKind, testing};

    const IDS: [&str; 5] = ["E", "A", "C", "B", "D"];

    #[test]
    fn components_test() {
        let index = testing::index(&[("A", "B", 0.01), ("D", "C", 0.02), ("C", "E", 0.5), ("A", "A", 0.0)]);
        let predicate = ThresholdPredicate::new(MeasurementKind::Distance, 0.05);

        let clusters = graph_clusters(IDS, &index, &predicate).unwrap();
        assert_eq!(clusters.len(), 3);
        assert_eq!(clusters.get(0).unwrap(), ["A", "B"]);
        assert_eq!(clusters.get(1).unwrap(), ["C", "D"]);
        assert_eq!(clusters.get(2).unwrap(), ["E"]);
    }

    #[test]
    fn union_and_disjointness_test() {
        let index = testing::index(&[("A", "B", 95.0), ("B", "C", 97.0), ("X", "D", 99.0), ("D", "E", 10.0)]);
        let predicate = ThresholdPredicate::new(MeasurementKind::Similarity, 90.0);

        let clusters = graph_clusters(IDS, &index, &predicate).unwrap();
        assert_eq!(clusters.members().sorted().collect_vec(), IDS.iter().copied().sorted().collect_vec());
        assert_eq!(clusters.nb_members(), IDS.len());
        assert_eq!(clusters.get(0).unwrap(), ["A", "B", "C"]);
    }

    #[test]
    fn extreme_thresholds_test() {
        let index = testing::index(&[("A", "B", 1E-5), ("B", "C", 1E-3), ("D", "E", 1E-4), ("E", "C", 1E-2)]);

        let all = ThresholdPredicate::new(MeasurementKind::Distance, 1.0);
        assert_eq!(graph_clusters(IDS, &index, &all).unwrap().len(), 1);

        let none = ThresholdPredicate::new(MeasurementKind::Distance, 1E-10);
        let clusters = graph_clusters(IDS, &index, &none).unwrap();
        assert_eq!(clusters.len(), IDS.len());
        assert_eq!(clusters.max_cluster_size(), 1);
    }

    #[test]
    fn without_test() {
        let index = testing::index(&[("A", "B", 0.01), ("B", "C", 0.01), ("C", "D", 0.01)]);
        let predicate = ThresholdPredicate::new(MeasurementKind::Distance, 0.05);
        let graph = SimilarityGraph::build(["A", "B", "C", "D"], &index, &predicate);
        assert_eq!(graph.nb_edges(), 3);

        let trimmed = graph.without("B");
        assert_eq!(trimmed.nb_nodes(), 3);
        assert_eq!(trimmed.nb_edges(), 1);
        assert_eq!(trimmed.node("B"), None);
        let clusters = trimmed.connected_components().unwrap();
        assert_eq!(clusters.get(0).unwrap(), ["A"]);
        assert_eq!(clusters.get(1).unwrap(), ["C", "D"]);

        // the source graph is left untouched
        assert_eq!(graph.connected_components().unwrap().len(), 1);
    }

    #[test]
    fn conflicting_duplicate_edge_test() {
        let index = testing::index(&[("B", "A", 0.04), ("A", "B", 0.02)]);
        let predicate = ThresholdPredicate::new(MeasurementKind::Distance, 0.05);
        let graph = SimilarityGraph::build(["A", "B"], &index, &predicate);
        assert_eq!(graph.nb_edges(), 1);
        assert_eq!(graph.neighbors(0), [(1, 0.02)]);
    }
}
