use clap_complete::Shell;

use super::*;

pub fn process_misc(
    mut mat: ArgMatches,
    _config: &Config,
) -> anyhow::Result<()> {
    match mat.remove_subcommand() {
        Some((subcommand, sub_mat)) if subcommand == "generate-shell-completions" => {
            generate_shell_completions(sub_mat)
        }
        _ => Ok(()),
    }
}

fn generate_shell_completions(mut mat: ArgMatches) -> anyhow::Result<()> {
    let shell: Shell = required(&mut mat, "shell")?;
    let mut cmd = crate::app::cli::build_cli();
    let bin_name = cmd.get_name().to_string();
    with_output(None, |writer| {
        clap_complete::generate(shell, &mut cmd, bin_name, writer);
        Ok(())
    })
}
