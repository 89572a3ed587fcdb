use clustpart_core::{
    clustering::reducer,
    data::ThresholdPredicate,
    partition::BalancedPartitioner,
    sweep::{SweepMode, SweepRow, ThresholdSweep, thresholds_from_exponents},
    utils::{colorizer_from_silhouette, greenify},
};
use itertools::Itertools;
use log::warn;
use rand::{RngCore, SeedableRng, rngs::StdRng};

use super::*;

const SUMMARY_HEADER: [&str; 7] = [
    "Threshold",
    "# sequences",
    "# unique sequences",
    "# remaining sequences",
    "# clusters",
    "Silhouette score",
    "Output",
];

pub fn process_partition(
    mut mat: ArgMatches,
    config: &Config,
) -> anyhow::Result<()> {
    let mut inputs = load_inputs(&mut mat)?;
    let nb_unique = inputs.records.len();
    let nb_partitions = usize::try_from(required::<u64>(&mut mat, "nb-partitions")?)?;
    let format = output_format(&mut mat)?;
    let output_dir: PathBuf = required(&mut mat, "output")?;

    let thresholds: Option<Vec<f64>> = mat.remove_many("thresholds").map(|vals| vals.collect_vec());
    let exponents = mat.remove_one::<i32>("exp-start").zip(mat.remove_one::<i32>("exp-end"));
    let (thresholds, mode) = match (thresholds, exponents) {
        (Some(thresholds), _) => (thresholds, SweepMode::Exhaustive),
        (None, Some((start, end))) => (thresholds_from_exponents(start, end), SweepMode::Exhaustive),
        (None, None) => (config.sweep_parameters().thresholds(), SweepMode::UntilFeasible),
    };
    if thresholds.is_empty() {
        bail!("No clustering threshold to evaluate");
    }

    if let Some(threshold) = mat.remove_one::<f64>("reduce-threshold") {
        let predicate = ThresholdPredicate::new(MeasurementKind::Distance, threshold);
        inputs.records = reducer::reduce(&inputs.records, &inputs.index, &predicate);
        info!("Number of sequences after redundancy reduction: {}", inputs.records.len());
    }

    let seed = match mat.remove_one::<u64>("seed").or(config.partition_seed) {
        Some(seed) => seed,
        None => StdRng::try_from_os_rng()?.next_u64(),
    };
    info!("Partitioning seed: {seed}");

    let partitioner = BalancedPartitioner::new(nb_partitions, inputs.records.len())?;
    info!("Partition capacities: {:?}", partitioner.capacities());

    let rows = ThresholdSweep::new(&inputs.index, MeasurementKind::Distance)
        .with_partitioner(partitioner, mode)
        .with_missing_distance(config.missing_distance)
        .run(&inputs.ids(), &thresholds, seed)?;

    if !output_dir.exists() {
        std::fs::create_dir_all(&output_dir)
            .with_context(|| format!("Failed to create the output directory at '{}'", output_dir.display()))?;
    }

    let stem = inputs.stem();
    let residues = io::residues_by_id(&inputs.records);
    let mut summary: Vec<[String; 7]> = Vec::with_capacity(rows.len());

    for row in rows.iter() {
        let output = match &row.partitions {
            Some(Ok(assignment)) => {
                let filepath = output_dir.join(format!("{stem}_{}.{}", row.threshold, format.extension()));
                let provenance = io::Provenance { method: "graph", threshold: row.threshold };
                let mut writer = create_file(&filepath)?;
                io::write_partitions(&mut writer, assignment, format, &provenance, &residues)?;
                writer.flush()?;
                filepath.display().to_string()
            }
            Some(Err(err)) => {
                info!("No partitioning at threshold {}: {err}", row.threshold);
                "NA".to_string()
            }
            None => "NA".to_string(),
        };
        summary.push(summary_row(row, inputs.nb_read, nb_unique, inputs.records.len(), output));
    }

    if mode == SweepMode::UntilFeasible && !rows.last().is_some_and(SweepRow::is_partitioned) {
        warn!("None of the {} threshold(s) produced clusters that fit into {nb_partitions} partition(s)", rows.len());
    }

    let summary_filepath = output_dir.join(format!("{stem}_summary.tsv"));
    let mut writer = create_file(&summary_filepath)?;
    writeln!(writer, "{}", SUMMARY_HEADER.join("\t"))?;
    for row in summary.iter() {
        writeln!(writer, "{}", row.join("\t"))?;
    }
    writer.flush()?;

    print_summary(&rows, &summary);
    eprintln!("{} Wrote {}", greenify("✔"), style(summary_filepath.display()).bold());
    Ok(())
}

fn summary_row(
    row: &SweepRow,
    nb_read: usize,
    nb_unique: usize,
    nb_remaining: usize,
    output: String,
) -> [String; 7] {
    [
        row.threshold.to_string(),
        nb_read.to_string(),
        nb_unique.to_string(),
        nb_remaining.to_string(),
        row.nb_clusters.to_string(),
        row.silhouette.map_or_else(|| "NA".to_string(), |score| format!("{score:.3}")),
        output,
    ]
}

fn print_summary(
    rows: &[SweepRow],
    summary: &[[String; 7]],
) {
    let widths = (0..SUMMARY_HEADER.len())
        .map(|col| {
            summary.iter().map(|row| row[col].chars().count()).chain([SUMMARY_HEADER[col].len()]).max().unwrap_or(0)
        })
        .collect_vec();

    println!(
        "{}",
        SUMMARY_HEADER.iter().zip(widths.iter()).map(|(title, &width)| format!("{title:<width$}")).join("  ")
    );
    for (row, text) in rows.iter().zip(summary.iter()) {
        let line = text
            .iter()
            .zip(widths.iter())
            .enumerate()
            .map(|(col, (cell, &width))| {
                let cell = format!("{cell:<width$}");
                match (col, row.silhouette) {
                    (5, Some(score)) => colorizer_from_silhouette(score)(style(cell)).to_string(),
                    (6, _) if row.is_partitioned() => style(cell).green().to_string(),
                    _ => cell,
                }
            })
            .join("  ");
        println!("{line}");
    }
}
