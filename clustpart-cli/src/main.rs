// Modules
pub mod app;

// Imports
use crate::app::App;

fn main() -> anyhow::Result<()> {
    let mat = app::cli::build_cli().get_matches();
    app::init_logger(mat.get_count("verbose"));

    let app = App::load()?;
    app.run(mat)
}
