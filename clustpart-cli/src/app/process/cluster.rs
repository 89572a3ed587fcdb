use clustpart_core::{
    clustering::{Clusterer, ClusteringMethod},
    data::{MeasurementKind, ThresholdPredicate},
    utils::colorizer_from_silhouette,
};
use log::warn;

use super::*;

pub fn process_cluster(
    mut mat: ArgMatches,
    config: &Config,
) -> anyhow::Result<()> {
    let inputs = load_inputs(&mut mat)?;
    let threshold: f64 = required(&mut mat, "threshold")?;
    let method: ClusteringMethod = required::<String>(&mut mat, "method")?.parse()?;
    let kind = measurement_kind(&mut mat)?;
    let format = output_format(&mut mat)?;
    let output: Option<PathBuf> = mat.remove_one("output");

    let optimize = mat.get_flag("optimize");
    if optimize && kind != MeasurementKind::Distance {
        bail!("`--optimize` needs distance scores, it cannot be combined with `--kind {kind}`");
    }

    let clusterer = Clusterer::new(method, ThresholdPredicate::new(kind, threshold));
    let spinner = simple_spinner(Some(format!("Clustering with {method} at {threshold}")), Some(200), None);
    let clusters = if optimize {
        if method != ClusteringMethod::Graph {
            warn!("`--optimize` refines the graph clustering, `--method {method}` is ignored");
        }
        let optimized = clusterer.optimize(&inputs.records, &inputs.index, config.optimizer_parameters())?;
        info!("Pruned {} outlier(s): [{}]", optimized.removed.len(), optimized.removed.join(", "));
        optimized.clusters
    } else {
        clusterer.cluster(&inputs.records, &inputs.index)?
    };
    spinner.finish();

    // silhouettes read the raw scores as distances
    let silhouette_text = match kind {
        MeasurementKind::Distance => match clusters.silhouette(&inputs.index, config.missing_distance).mean() {
            Some(score) => colorizer_from_silhouette(score)(style(format!("{score:.3}"))).to_string(),
            None => style("undefined").dim().to_string(),
        },
        MeasurementKind::Similarity => style("n/a for similarity scores").dim().to_string(),
    };
    eprintln!(
        "{} cluster(s) over {} sequence(s), largest {}, silhouette {silhouette_text}",
        style(clusters.len()).bold(),
        clusters.nb_members(),
        clusters.max_cluster_size(),
    );

    let provenance = io::Provenance { method: &method.to_string(), threshold };
    let residues = io::residues_by_id(&inputs.records);
    with_output(output.as_deref(), |writer| io::write_clusters(writer, &clusters, format, &provenance, &residues))
}
