// Entrypoint for the cm-sync binary.
// - Keeps `main` small: parse flags, set up logging, hand off to `app::run`.
// - Returns `anyhow::Result`; an `Err` is printed and the process exits 1.

use chartmuseum_sync::app::{self, Outcome};
use chartmuseum_sync::{config::Cli, logging, ui};
use clap::{CommandFactory, Parser};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.log_level())?;

    match app::run(&cli, ui::sync_progress_bar)? {
        Outcome::Usage => {
            println!("{}", ui::usage_guidance());
            Cli::command().print_help()?;
            std::process::exit(1);
        }
        Outcome::Planned(diff) => print!("{}", ui::render_plan(&diff)),
        Outcome::Synced { report, progress } => {
            progress.finish();
            println!("{}", ui::render_summary(&report));
        }
    }
    Ok(())
}
