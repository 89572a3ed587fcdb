// Modules
mod cluster;
mod misc;
mod partition;
mod reduce;

// Imports
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, bail};
use clap::ArgMatches;
use clustpart_core::{
    data::{MeasurementIndex, MeasurementKind, SeqRecord},
    utils::simple_spinner,
};
use console::style;
use log::info;

pub(in crate::app) use cluster::process_cluster as cluster;
pub(in crate::app) use misc::process_misc as misc;
pub(in crate::app) use partition::process_partition as partition;
pub(in crate::app) use reduce::process_reduce as reduce;

use crate::app::{
    config::Config,
    io::{self, OutputFormat},
};

fn required<T: Clone + Send + Sync + 'static>(
    mat: &mut ArgMatches,
    arg_id: &str,
) -> anyhow::Result<T> {
    mat.remove_one::<T>(arg_id).ok_or_else(|| anyhow::anyhow!("Missing required argument `{arg_id}`"))
}

fn measurement_kind(mat: &mut ArgMatches) -> anyhow::Result<MeasurementKind> {
    Ok(required::<String>(mat, "kind")?.parse()?)
}

fn output_format(mat: &mut ArgMatches) -> anyhow::Result<OutputFormat> {
    required::<String>(mat, "format")?.parse()
}

struct Inputs {
    input: PathBuf,
    nb_read: usize,
    records: Vec<SeqRecord>,
    index: MeasurementIndex,
}

impl Inputs {
    fn ids(&self) -> Vec<&str> {
        self.records.iter().map(|record| record.id.as_str()).collect()
    }

    /// File stem of the FASTA input, used to name outputs
    fn stem(&self) -> String {
        self.input.file_stem().and_then(|s| s.to_str()).unwrap_or("clustpart").to_string()
    }
}

fn load_inputs(mat: &mut ArgMatches) -> anyhow::Result<Inputs> {
    let input: PathBuf = required(mat, "input")?;
    let measurements: PathBuf = required(mat, "measurements")?;
    let score_column = mat.remove_one::<u64>("score-column").map(usize::try_from).transpose()?;

    let spinner = simple_spinner(Some(format!("Loading '{}'", input.display())), Some(200), None);
    let records = io::read_fasta(&input)?;
    let nb_read = records.len();
    if nb_read == 0 {
        bail!("No sequences found in '{}'", input.display());
    }
    let records = io::remove_duplicates(records);

    spinner.set_message(format!("Loading '{}'", measurements.display()));
    let index = MeasurementIndex::new(&io::read_measurements(&measurements, score_column)?);
    spinner.finish();

    info!("Number of sequences: {nb_read}");
    info!("Number of unique sequences: {}", records.len());
    info!("Number of measurements: {}", index.len());

    Ok(Inputs { input, nb_read, records, index })
}

fn create_file(filepath: &Path) -> anyhow::Result<BufWriter<File>> {
    let file = File::create(filepath).with_context(|| format!("Failed to create '{}'", filepath.display()))?;
    Ok(BufWriter::new(file))
}

/// Writes to `filepath` if provided, to stdout otherwise
fn with_output(
    filepath: Option<&Path>,
    write: impl FnOnce(&mut dyn Write) -> anyhow::Result<()>,
) -> anyhow::Result<()> {
    match filepath {
        Some(filepath) => {
            let mut writer = create_file(filepath)?;
            write(&mut writer)?;
            writer.flush()?;
            eprintln!("Wrote {}", style(filepath.display()).bold());
        }
        None => {
            let mut writer = std::io::stdout().lock();
            write(&mut writer)?;
            writer.flush()?;
        }
    }
    Ok(())
}
