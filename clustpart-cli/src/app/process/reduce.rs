use clustpart_core::{clustering::reducer, data::ThresholdPredicate};

use super::*;

pub fn process_reduce(
    mut mat: ArgMatches,
    _config: &Config,
) -> anyhow::Result<()> {
    let inputs = load_inputs(&mut mat)?;
    let threshold: f64 = required(&mut mat, "threshold")?;
    let kind = measurement_kind(&mut mat)?;
    let output: PathBuf = required(&mut mat, "output")?;

    let reduced = reducer::reduce(&inputs.records, &inputs.index, &ThresholdPredicate::new(kind, threshold));
    eprintln!(
        "Kept {} of {} unique sequence(s) ({} read)",
        style(reduced.len()).bold(),
        inputs.records.len(),
        inputs.nb_read
    );

    with_output(Some(&output), |writer| io::write_fasta(writer, &reduced))
}
