// Modules
pub mod graph;
pub mod optim;
pub mod reducer;

// Imports
use std::{fmt, str::FromStr};

use crate::{
    data::{ClusterSet, MeasurementIndex, SeqRecord, ThresholdPredicate},
    error::{Error, Result},
};

// Re-exports
pub use graph::{SimilarityGraph, graph_clusters};
pub use optim::{ClusterOptimizer, OptimizationOutput, OptimizerParameters, Step, ratio_centrality};
pub use reducer::{Hobohm1Mode, Hobohm1Output, Representative, hobohm1};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClusteringMethod {
    #[default]
    Graph,
    Hobohm1,
}

impl FromStr for ClusteringMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "graph" => Ok(Self::Graph),
            "hobohm1" => Ok(Self::Hobohm1),
            _ => Err(Error::InvalidMethod(s.to_string())),
        }
    }
}

impl fmt::Display for ClusteringMethod {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::Graph => write!(f, "graph"),
            Self::Hobohm1 => write!(f, "hobohm1"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Clusterer {
    pub method: ClusteringMethod,
    pub predicate: ThresholdPredicate,
}

impl Clusterer {
    pub fn new(
        method: ClusteringMethod,
        predicate: ThresholdPredicate,
    ) -> Self {
        Self { method, predicate }
    }

    pub fn cluster(
        &self,
        seqs: &[SeqRecord],
        index: &MeasurementIndex,
    ) -> Result<ClusterSet> {
        match self.method {
            ClusteringMethod::Graph => {
                graph_clusters(seqs.iter().map(|seq| seq.id.as_str()), index, &self.predicate)
            }
            ClusteringMethod::Hobohm1 => reducer::group(seqs, index, &self.predicate),
        }
    }

    /// Silhouette-guided refinement of the graph clustering, regardless of `method`
    pub fn optimize(
        &self,
        seqs: &[SeqRecord],
        index: &MeasurementIndex,
        params: OptimizerParameters,
    ) -> Result<OptimizationOutput> {
        ClusterOptimizer::new(index, self.predicate, params).optimize(seqs.iter().map(|seq| seq.id.as_str()))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{data::MeasurementKind, testing};

    #[test]
    fn method_from_str_test() {
        assert_eq!("graph".parse::<ClusteringMethod>().unwrap(), ClusteringMethod::Graph);
        assert_eq!("Hobohm1".parse::<ClusteringMethod>().unwrap(), ClusteringMethod::Hobohm1);
        assert_eq!("kmeans".parse::<ClusteringMethod>(), Err(Error::InvalidMethod("kmeans".to_string())));
        assert_eq!(ClusteringMethod::Hobohm1.to_string(), "hobohm1");
    }

    #[test]
    fn dispatch_test() {
        let seqs = testing::seqs(&["A", "B", "C"]);
        let index = testing::index(&[("B", "A", 0.5), ("C", "B", 0.5)]);
        let predicate = ThresholdPredicate::new(MeasurementKind::Distance, 1.0);

        // the graph is transitive, Hobohm1 only absorbs into a direct representative
        let graph = Clusterer::new(ClusteringMethod::Graph, predicate).cluster(&seqs, &index).unwrap();
        assert_eq!(graph.len(), 1);

        let hobohm1 = Clusterer::new(ClusteringMethod::Hobohm1, predicate).cluster(&seqs, &index).unwrap();
        assert_eq!(hobohm1.len(), 2);
        assert_eq!(hobohm1.nb_members(), 3);
    }
}
