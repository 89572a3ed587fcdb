// Modules
pub mod cli;
pub mod config;
pub mod io;
mod process;

// Imports
use anyhow::Context;
use clap::ArgMatches;
use config::Config;
use directories::ProjectDirs;
use log::LevelFilter;

pub fn init_logger(verbosity: u8) {
    env_logger::Builder::new()
        .filter_level(match verbosity {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        })
        .format_timestamp(None)
        .parse_default_env()
        .init();
}

pub struct App {
    config: Config,
}

impl App {
    #[cfg(not(debug_assertions))]
    const NAME: &'static str = "clustpart";
    #[cfg(debug_assertions)]
    const NAME: &'static str = "clustpart-dev";

    const VERSION: &'static str = env!("CARGO_PKG_VERSION");

    pub fn load() -> anyhow::Result<Self> {
        let dirs = ProjectDirs::from("", "", Self::NAME)
            .ok_or_else(|| anyhow::anyhow!("Failed to get project directories"))?;

        let conf_dir = dirs.config_dir();
        if !conf_dir.exists() {
            std::fs::create_dir_all(conf_dir).with_context(|| {
                format!("Failed to create the config directory at `{}`", conf_dir.display())
            })?;
        }

        let config = Config::load(&conf_dir.join(Config::FILENAME));

        Ok(Self { config })
    }

    pub fn run(
        self,
        mut mat: ArgMatches,
    ) -> anyhow::Result<()> {
        if mat.get_flag("version") {
            println!("clustpart {}", Self::VERSION);
            return Ok(());
        }

        let color_choice = mat.remove_one::<String>("color").unwrap_or_default();
        match color_choice.as_str() {
            "always" => {
                console::set_colors_enabled(true);
                console::set_colors_enabled_stderr(true);
            }
            "never" => {
                console::set_colors_enabled(false);
                console::set_colors_enabled_stderr(false);
            }
            _ => (),
        }

        let Some((subcommand, sub_mat)) = mat.remove_subcommand() else {
            return Ok(());
        };

        match subcommand.as_str() {
            "cluster" => process::cluster(sub_mat, &self.config),
            "reduce" => process::reduce(sub_mat, &self.config),
            "partition" => process::partition(sub_mat, &self.config),
            "misc" => process::misc(sub_mat, &self.config),
            _ => Ok(()),
        }
    }
}
