// Imports
use std::path::PathBuf;

use clap::{Arg, ArgAction, Command, builder::Styles, value_parser as vparser};

fn input_args() -> [Arg; 3] {
    [
        Arg::new("input")
            .help("The `.fasta` file holding the sequences to cluster")
            .required(true)
            .short('i')
            .long("input")
            .value_parser(vparser!(PathBuf))
            .action(ArgAction::Set),
        Arg::new("measurements")
            .help("The pairwise score table, `id id score` or BLAST tabular (`-outfmt 6`)")
            .long_help("The pairwise score table, either three whitespace-separated columns `id id score` or BLAST tabular output (`-outfmt 6`) from which the e-value column is used")
            .required(true)
            .short('m')
            .long("measurements")
            .visible_alias("scores")
            .value_parser(vparser!(PathBuf))
            .action(ArgAction::Set),
        Arg::new("score-column")
            .help("The 1-based column holding the score, overrides the detected layout")
            .required(false)
            .long("score-column")
            .value_parser(vparser!(u64).range(3..))
            .action(ArgAction::Set),
    ]
}

fn kind_arg() -> Arg {
    Arg::new("kind")
        .help("Whether lower scores (distance) or higher scores (similarity) mean closer sequences")
        .required(false)
        .long("kind")
        .value_parser(["distance", "similarity"])
        .default_value("distance")
        .action(ArgAction::Set)
}

fn format_arg() -> Arg {
    Arg::new("format")
        .help("The output format")
        .required(false)
        .short('f')
        .long("format")
        .value_parser(["json", "csv", "txt", "fasta"])
        .default_value("json")
        .action(ArgAction::Set)
}

#[rustfmt::skip]
pub fn build_cli() -> Command {
    let cluster_subcommand = Command::new("cluster")
        .about("Cluster sequences from their pairwise scores")
        .args(input_args())
        .arg(
            Arg::new("threshold")
                .help("The score threshold for two sequences to be linked")
                .required(true)
                .short('t')
                .long("threshold")
                .value_parser(vparser!(f64))
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("method")
                .help("The clustering method")
                .required(false)
                .long("method")
                .value_parser(["graph", "hobohm1"])
                .default_value("graph")
                .action(ArgAction::Set),
        )
        .arg(kind_arg())
        .arg(
            Arg::new("optimize")
                .help("Prune outlier members to improve the silhouette of the graph clustering")
                .required(false)
                .long("optimize")
                .action(ArgAction::SetTrue),
        )
        .arg(format_arg())
        .arg(
            Arg::new("output")
                .help("The output filepath, prints to stdout if unset")
                .required(false)
                .short('o')
                .long("output")
                .value_parser(vparser!(PathBuf))
                .action(ArgAction::Set),
        );

    let reduce_subcommand = Command::new("reduce")
        .about("Remove redundant sequences with the Hobohm1 algorithm")
        .args(input_args())
        .arg(
            Arg::new("threshold")
                .help("The score threshold for a sequence to be considered redundant")
                .required(true)
                .short('t')
                .long("threshold")
                .value_parser(vparser!(f64))
                .action(ArgAction::Set),
        )
        .arg(kind_arg())
        .arg(
            Arg::new("output")
                .help("The output `.fasta` filepath")
                .required(true)
                .short('o')
                .long("output")
                .value_parser(vparser!(PathBuf))
                .action(ArgAction::Set),
        );

    let partition_subcommand = Command::new("partition")
        .about("Cluster over a range of thresholds and distribute whole clusters across balanced partitions")
        .long_about("Cluster over a range of thresholds and distribute whole clusters across balanced partitions. Without `--thresholds` or an exponent range, thresholds 1e-1 down to 1e-20 are tried until the clusters can be partitioned")
        .args(input_args())
        .arg(
            Arg::new("nb-partitions")
                .help("The number of partitions")
                .required(true)
                .short('n')
                .long("nb-partitions")
                .value_parser(vparser!(u64).range(1..))
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("thresholds")
                .help("Comma-separated clustering thresholds")
                .required(false)
                .short('t')
                .long("thresholds")
                .value_delimiter(',')
                .num_args(1..)
                .value_parser(vparser!(f64))
                .conflicts_with_all(["exp-start", "exp-end"])
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("exp-start")
                .help("The first exponent `e` of the `10^-e` threshold range")
                .required(false)
                .long("exp-start")
                .requires("exp-end")
                .allow_negative_numbers(true)
                .value_parser(vparser!(i32))
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("exp-end")
                .help("The last exponent `e` of the `10^-e` threshold range")
                .required(false)
                .long("exp-end")
                .requires("exp-start")
                .allow_negative_numbers(true)
                .value_parser(vparser!(i32))
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("reduce-threshold")
                .help("Run Hobohm1 redundancy reduction at this threshold before clustering")
                .required(false)
                .short('r')
                .long("reduce-threshold")
                .value_parser(vparser!(f64))
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("seed")
                .help("The seed of the partitioning, defaults to `partition_seed` from the config, random if unset")
                .required(false)
                .long("seed")
                .value_parser(vparser!(u64))
                .action(ArgAction::Set),
        )
        .arg(format_arg())
        .arg(
            Arg::new("output")
                .help("The output directory")
                .required(true)
                .short('o')
                .long("output")
                .visible_alias("output-dir")
                .value_parser(vparser!(PathBuf))
                .action(ArgAction::Set),
        );

    let misc_generate_shell_completions_subcommand = Command::new("generate-shell-completions")
        .about("Generate completions for your desired shell")
        .long_about("This subcommand is used to generate shell completions for the selected shell, outputs to stdout")
        .arg(
            Arg::new("shell")
                .index(1)
                .required(true)
                .help("The shell to target")
                .action(ArgAction::Set)
                .value_parser(vparser!(clap_complete::Shell)),
        );

    let misc_subcommand = Command::new("misc")
        .subcommands([
            misc_generate_shell_completions_subcommand,
        ]);

    Command::new("clustpart")
        .color(clap::ColorChoice::Auto)
        .styles(Styles::styled())
        .arg(
            Arg::new("version")
                .required(false)
                .short('V')
                .long("version")
                .action(ArgAction::SetTrue)
        )
        .arg(
            Arg::new("color")
                .required(false)
                .long("color")
                .value_parser(["always", "auto", "never"])
                .default_value("auto")
                .action(ArgAction::Set)
        )
        .arg(
            Arg::new("verbose")
                .help("Increase the log verbosity, repeatable (warn, info, debug, trace)")
                .required(false)
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::Count)
        )
        .subcommands([
            cluster_subcommand,
            reduce_subcommand,
            partition_subcommand,
            misc_subcommand,
        ])
}
