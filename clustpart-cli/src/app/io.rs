//! Input adapters (FASTA, score tables) and writers for clusters and partitions.

// Imports
use std::{
    collections::{HashMap, HashSet},
    fmt,
    io::Write,
    path::Path,
    str::FromStr,
};

use anyhow::{Context, bail};
use clustpart_core::{
    data::{ClusterSet, Measurement, SeqRecord},
    partition::PartitionAssignment,
};
use itertools::Itertools;
use log::{debug, warn};

fn read_to_string(filepath: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(filepath).with_context(|| format!("Failed to read '{}'", filepath.display()))
}

pub fn read_fasta(filepath: &Path) -> anyhow::Result<Vec<SeqRecord>> {
    parse_fasta(&read_to_string(filepath)?)
}

/// The id is the first word of the header, records repeating an earlier id are skipped
pub fn parse_fasta(fasta: &str) -> anyhow::Result<Vec<SeqRecord>> {
    let mut records: Vec<SeqRecord> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut lines = fasta.lines().enumerate().peekable();

    while let Some((lidx, text_line)) = lines.next() {
        let text_line = text_line.trim();
        if text_line.is_empty() {
            continue;
        }
        let Some(header) = text_line.strip_prefix('>') else {
            bail!("Expected a FASTA header on line {}, found '{text_line}'", lidx + 1);
        };
        let Some(id) = header.split_whitespace().next() else {
            bail!("Empty FASTA header on line {}", lidx + 1);
        };

        let mut residues = String::new();
        while let Some((_, next_line)) = lines.peek() {
            if next_line.starts_with('>') {
                break;
            }
            residues.push_str(next_line.trim());
            lines.next();
        }

        if seen.insert(id.to_string()) {
            records.push(SeqRecord::create(id, &residues));
        } else {
            warn!("Duplicate sequence id '{id}', only the first one is used");
        }
    }
    Ok(records)
}

/// Keeps the first record of each distinct residue string
pub fn remove_duplicates(records: Vec<SeqRecord>) -> Vec<SeqRecord> {
    let nb_records = records.len();
    let unique = records.into_iter().unique_by(|record| record.residues.clone()).collect_vec();
    if unique.len() != nb_records {
        debug!("Removed {} duplicate sequence(s)", nb_records - unique.len());
    }
    unique
}

pub fn read_measurements(
    filepath: &Path,
    score_column: Option<usize>,
) -> anyhow::Result<Vec<Measurement>> {
    parse_measurements(&read_to_string(filepath)?, score_column)
}

/// Whitespace-separated rows, `id id score` or BLAST tabular where the e-value (11th column) is used.
/// `score_column` is 1-based and overrides the detection.
pub fn parse_measurements(
    table: &str,
    score_column: Option<usize>,
) -> anyhow::Result<Vec<Measurement>> {
    const BLAST_EVALUE_COLUMN: usize = 11;

    let mut measurements: Vec<Measurement> = Vec::new();
    for (lidx, text_line) in table.lines().enumerate() {
        let text_line = text_line.trim();
        if text_line.is_empty() || text_line.starts_with('#') {
            continue;
        }
        let columns = text_line.split_whitespace().collect_vec();
        let score_idx = match (score_column, columns.len()) {
            (Some(column), _) => match column.checked_sub(1) {
                Some(score_idx) => score_idx,
                None => bail!("Score columns are 1-based, column 0 does not exist"),
            },
            (None, 3) => 2,
            (None, nb) if nb >= BLAST_EVALUE_COLUMN => BLAST_EVALUE_COLUMN - 1,
            (None, nb) => bail!("Unexpected number of columns ({nb}) on line {}", lidx + 1),
        };
        let Some(score) = columns.get(score_idx) else {
            bail!("Missing score column {} on line {}", score_idx + 1, lidx + 1);
        };
        let score: f64 =
            score.parse().with_context(|| format!("Invalid score '{score}' on line {}", lidx + 1))?;
        measurements.push(
            Measurement::try_create(columns[0], columns[1], score)
                .with_context(|| format!("Invalid measurement on line {}", lidx + 1))?,
        );
    }
    Ok(measurements)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Csv,
    Txt,
    Fasta,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Txt => "txt",
            Self::Fasta => "fasta",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "txt" => Ok(Self::Txt),
            "fasta" | "fa" => Ok(Self::Fasta),
            _ => bail!("Unknown output format: '{s}'"),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// What produced the clusters, written in the `txt` header
pub struct Provenance<'a> {
    pub method: &'a str,
    pub threshold: f64,
}

/// Id → residues lookup, needed by the `fasta` writers
pub fn residues_by_id(records: &[SeqRecord]) -> HashMap<&str, &str> {
    records.iter().map(|record| (record.id.as_str(), record.residues.as_str())).collect()
}

fn residues<'a>(
    residues: &HashMap<&str, &'a str>,
    id: &str,
) -> anyhow::Result<&'a str> {
    residues.get(id).copied().ok_or_else(|| anyhow::anyhow!("No sequence found for id '{id}'"))
}

pub fn write_clusters<W: Write + ?Sized>(
    writer: &mut W,
    clusters: &ClusterSet,
    format: OutputFormat,
    provenance: &Provenance,
    residues_by_id: &HashMap<&str, &str>,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Txt => {
            writeln!(writer, "# Clustering method: {}", provenance.method)?;
            writeln!(writer, "# Threshold: {}", provenance.threshold)?;
            writeln!(writer, "# Number of clusters: {}", clusters.len())?;
            for (cl_idx, members) in clusters.iter() {
                for id in members {
                    writeln!(writer, "ClustID {cl_idx} {id}")?;
                }
            }
        }
        OutputFormat::Json => {
            let named: serde_json::Map<String, serde_json::Value> = clusters
                .iter()
                .map(|(cl_idx, members)| (format!("Cluster_{cl_idx}"), serde_json::json!(members)))
                .collect();
            serde_json::to_writer_pretty(&mut *writer, &named)?;
            writeln!(writer)?;
        }
        OutputFormat::Csv => {
            writeln!(writer, "SequenceID,ClusterID")?;
            for (cl_idx, members) in clusters.iter() {
                for id in members {
                    writeln!(writer, "{id},{cl_idx}")?;
                }
            }
        }
        OutputFormat::Fasta => {
            for (cl_idx, members) in clusters.iter() {
                for id in members {
                    writeln!(writer, ">{id} Cluster_{cl_idx}")?;
                    writeln!(writer, "{}", residues(residues_by_id, id)?)?;
                }
            }
        }
    }
    Ok(())
}

pub fn write_partitions<W: Write + ?Sized>(
    writer: &mut W,
    assignment: &PartitionAssignment,
    format: OutputFormat,
    provenance: &Provenance,
    residues_by_id: &HashMap<&str, &str>,
) -> anyhow::Result<()> {
    let rows = assignment.iter().flat_map(|(part_idx, partition)| {
        partition.clusters.iter().flat_map(move |(cl_idx, members)| members.iter().map(move |id| (part_idx, *cl_idx, id)))
    });

    match format {
        OutputFormat::Txt => {
            writeln!(writer, "# Clustering method: {}", provenance.method)?;
            writeln!(writer, "# Threshold: {}", provenance.threshold)?;
            writeln!(writer, "# Number of partitions: {}", assignment.len())?;
            for (part_idx, cl_idx, id) in rows {
                writeln!(writer, "ClustID {cl_idx} PartID {part_idx} {id}")?;
            }
        }
        OutputFormat::Json => {
            let named: serde_json::Map<String, serde_json::Value> = assignment
                .iter()
                .map(|(part_idx, partition)| {
                    let clusters: serde_json::Map<String, serde_json::Value> = partition
                        .clusters
                        .iter()
                        .map(|(cl_idx, members)| (format!("Cluster_{cl_idx}"), serde_json::json!(members)))
                        .collect();
                    (format!("Partition_{part_idx}"), serde_json::Value::Object(clusters))
                })
                .collect();
            serde_json::to_writer_pretty(&mut *writer, &named)?;
            writeln!(writer)?;
        }
        OutputFormat::Csv => {
            writeln!(writer, "SequenceID,PartitionID,ClusterID")?;
            for (part_idx, cl_idx, id) in rows {
                writeln!(writer, "{id},{part_idx},{cl_idx}")?;
            }
        }
        OutputFormat::Fasta => {
            for (part_idx, cl_idx, id) in rows {
                writeln!(writer, ">{id} Cluster_{cl_idx} Partition_{part_idx}")?;
                writeln!(writer, "{}", residues(residues_by_id, id)?)?;
            }
        }
    }
    Ok(())
}

pub fn write_fasta<W: Write + ?Sized>(
    writer: &mut W,
    records: &[SeqRecord],
) -> anyhow::Result<()> {
    for record in records {
        writeln!(writer, ">{}", record.id)?;
        writeln!(writer, "{}", record.residues)?;
    }
    Ok(())
}
