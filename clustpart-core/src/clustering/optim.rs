//! Silhouette-guided pruning of graph clusters.
//!
//! Each iteration looks at the clusters holding a member with a negative silhouette, and for each of
//! them removes the member with the highest ratio centrality (its mean edge weight divided by the mean
//! of its neighbors' own mean edge weights). Among these single-member trials, the one with the best
//! mean silhouette becomes the next step if it improves on the current one. Otherwise a local optimum
//! has been reached.

// Imports
use std::{cmp::Ordering, collections::HashSet};

use itertools::Itertools;
use log::{debug, info, warn};
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

use crate::{
    clustering::graph::SimilarityGraph,
    data::{ClusterSet, MeasurementIndex, MeasurementKind, ThresholdPredicate},
    error::{Error, Result},
    quality::{MISSING_DISTANCE, Silhouette, SilhouetteSamples},
};

#[derive(Debug, Clone, Copy)]
pub struct OptimizerParameters {
    pub max_iters: usize,
    pub missing_distance: f64,
    pub multithreading_flag: bool,
}

impl OptimizerParameters {
    pub fn new(
        max_iters: usize,
        missing_distance: f64,
        multithreading_flag: bool,
    ) -> Self {
        Self { max_iters, missing_distance, multithreading_flag }
    }
}

impl Default for OptimizerParameters {
    fn default() -> Self {
        Self { max_iters: 10_000, missing_distance: MISSING_DISTANCE, multithreading_flag: true }
    }
}

/// One immutable state of the refinement
#[derive(Debug, Clone)]
pub struct Step {
    pub graph: SimilarityGraph,
    pub clusters: ClusterSet,
    pub silhouette: SilhouetteSamples,
}

impl Step {
    pub fn score(&self) -> f64 {
        self.silhouette.mean
    }
}

#[derive(Debug, Clone)]
pub struct OptimizationOutput {
    pub clusters: ClusterSet,
    /// mean silhouette of every accepted step, starting with the initial clustering, empty when undefined
    pub scores: Vec<f64>,
    /// pruned ids, in removal order
    pub removed: Vec<String>,
}

pub struct ClusterOptimizer<'a> {
    index: &'a MeasurementIndex,
    predicate: ThresholdPredicate,
    params: OptimizerParameters,
}

impl<'a> ClusterOptimizer<'a> {
    pub fn new(
        index: &'a MeasurementIndex,
        predicate: ThresholdPredicate,
        params: OptimizerParameters,
    ) -> Self {
        Self { index, predicate, params }
    }

    pub fn optimize<'b>(
        &self,
        ids: impl IntoIterator<Item = &'b str>,
    ) -> Result<OptimizationOutput> {
        // silhouettes read the raw scores as distances
        if self.predicate.kind != MeasurementKind::Distance {
            return Err(Error::NonDistanceMeasurement(self.predicate.kind));
        }

        let graph = SimilarityGraph::build(ids, self.index, &self.predicate);
        let clusters = graph.connected_components()?;

        let mut step = match self.evaluate(graph, clusters) {
            Ok(step) => step,
            Err(clusters) => {
                debug!("Silhouette undefined for the initial {} cluster(s), nothing to optimize", clusters.len());
                return Ok(OptimizationOutput { clusters, scores: Vec::new(), removed: Vec::new() });
            }
        };

        let mut scores = vec![step.score()];
        let mut removed: Vec<String> = Vec::new();
        let mut nb_iters: usize = 0;

        loop {
            if nb_iters >= self.params.max_iters {
                warn!("Stopped optimizing after reaching the maximum of {} iterations", self.params.max_iters);
                break;
            }
            nb_iters += 1;

            let Some((next, node)) = self.next_step(&step)? else {
                break;
            };
            debug!(
                "iteration {nb_iters}: removed '{node}', silhouette {:.5} → {:.5}, {} cluster(s)",
                step.score(),
                next.score(),
                next.clusters.len()
            );
            scores.push(next.score());
            removed.push(node);
            step = next;
        }

        info!(
            "Optimization finished after {nb_iters} iteration(s), removed {} member(s), silhouette {:.5}",
            removed.len(),
            step.score()
        );
        Ok(OptimizationOutput { clusters: step.clusters, scores, removed })
    }

    /// The next step and the id it removed, or `None` if no trial improves on `step`
    pub fn next_step(
        &self,
        step: &Step,
    ) -> Result<Option<(Step, String)>> {
        let problem_clusters = step.silhouette.negative_clusters().into_iter().collect_vec();
        if problem_clusters.is_empty() {
            return Ok(None);
        }

        let trials: Vec<Option<(Step, String)>> = if self.params.multithreading_flag {
            problem_clusters.par_iter().map(|&cl_idx| self.trial(step, cl_idx)).collect::<Result<_>>()?
        } else {
            problem_clusters.iter().map(|&cl_idx| self.trial(step, cl_idx)).collect::<Result<_>>()?
        };

        // strictly greater, so ties keep the lowest problem cluster id
        let best = trials.into_iter().flatten().fold(None, |best: Option<(Step, String)>, trial| match best {
            Some(best) if best.0.score() >= trial.0.score() => Some(best),
            _ => Some(trial),
        });

        Ok(best.filter(|(next, _)| next.score() > step.score()))
    }

    /// Removes the most peripheral member of `cl_idx`. `None` when what remains of that cluster holds a
    /// cluster of fewer than two members, or when the result has no defined silhouette.
    fn trial(
        &self,
        step: &Step,
        cl_idx: usize,
    ) -> Result<Option<(Step, String)>> {
        let Some(members) = step.clusters.get(cl_idx) else {
            return Ok(None);
        };
        let Some(node) = removal_candidate(&step.graph, members) else {
            return Ok(None);
        };

        let graph = step.graph.without(&node);
        let clusters = graph.connected_components()?;

        let membership = clusters.membership();
        let leaves_singleton = members
            .iter()
            .filter(|id| **id != node)
            .map(|id| membership.get(id.as_str()).and_then(|&cl_idx| clusters.cluster_size(cl_idx)))
            .any(|size| size.is_none_or(|size| size <= 1));
        if members.len() <= 2 || leaves_singleton {
            debug!("Rejected removing '{node}' from cluster {cl_idx}, it would leave a singleton");
            return Ok(None);
        }

        Ok(self.evaluate(graph, clusters).ok().map(|next| (next, node)))
    }

    fn evaluate(
        &self,
        graph: SimilarityGraph,
        clusters: ClusterSet,
    ) -> std::result::Result<Step, ClusterSet> {
        match clusters.silhouette(self.index, self.params.missing_distance) {
            Silhouette::Defined(silhouette) => Ok(Step { graph, clusters, silhouette }),
            Silhouette::Undefined { .. } => Err(clusters),
        }
    }
}

/// Ratio centrality of every member within the subgraph induced by `members`. Members without neighbors,
/// or whose neighbors have a zero mean edge weight, get `f64::INFINITY`.
pub fn ratio_centrality(
    graph: &SimilarityGraph,
    members: &[String],
) -> Vec<(String, f64)> {
    let nodes: HashSet<usize> = members.iter().filter_map(|id| graph.node(id)).collect();
    let nodes = &nodes;
    let induced = |node: usize| graph.neighbors(node).iter().filter(move |(nbr, _)| nodes.contains(nbr));

    let mean_weight = |node: usize| -> f64 {
        let (sum, count) = induced(node).fold((0.0, 0_usize), |(sum, count), &(_, weight)| (sum + weight, count + 1));
        if count == 0 { f64::INFINITY } else { sum / count as f64 }
    };

    members
        .iter()
        .filter_map(|id| graph.node(id).map(|node| (id, node)))
        .map(|(id, node)| {
            let neighbor_means = induced(node).map(|&(nbr, _)| mean_weight(nbr)).collect_vec();
            if neighbor_means.is_empty() {
                return (id.clone(), f64::INFINITY);
            }
            let mean_of_neighbors = neighbor_means.iter().sum::<f64>() / neighbor_means.len() as f64;
            let ratio = if mean_of_neighbors == 0.0 { f64::INFINITY } else { mean_weight(node) / mean_of_neighbors };
            (id.clone(), ratio)
        })
        .collect_vec()
}

/// Highest ratio centrality, ties broken by the lexicographically smallest id
fn removal_candidate(
    graph: &SimilarityGraph,
    members: &[String],
) -> Option<String> {
    ratio_centrality(graph, members)
        .into_iter()
        .max_by(|(a_id, a), (b_id, b)| match a.total_cmp(b) {
            Ordering::Equal => b_id.cmp(a_id),
            ordering => ordering,
        })
        .map(|(id, _)| id)
}
