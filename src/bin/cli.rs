use std::path::PathBuf;
use std::process;

use clap::Parser;

use lms_spread::paths;
use lms_spread::propagate::PassReport;
use lms_spread::settings::{self, SpreadSettings};
use lms_spread::spread::{self, SpreadOptions};
use lms_spread::SpreadError;

// ── CLI argument parsing ─────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "lms-spread",
    about = "Spread the rectangle to the rest of a light show sequence",
    version
)]
struct Cli {
    /// Sequence file name, resolved against the input directory
    lms_file_name: String,

    /// Spread to basic (non-RGB, non-tree) lights (default)
    #[arg(long, overrides_with = "no_basic")]
    basic: bool,
    /// Do not spread to basic lights
    #[arg(long, overrides_with = "basic")]
    no_basic: bool,

    /// Spread to RGB fixtures (default)
    #[arg(long = "RGB", overrides_with = "no_rgb")]
    rgb: bool,
    /// Do not spread to RGB fixtures
    #[arg(long = "no-RGB", overrides_with = "rgb")]
    no_rgb: bool,

    /// Spread to 15- and 16-channel trees (default)
    #[arg(long, overrides_with = "no_trees")]
    trees: bool,
    /// Do not spread to trees
    #[arg(long, overrides_with = "trees")]
    no_trees: bool,

    /// Replace the existing effects of child channels
    #[arg(long = "override", overrides_with = "no_override")]
    overwrite: bool,
    /// Append after existing child effects (default)
    #[arg(long = "no-override", overrides_with = "overwrite")]
    no_override: bool,

    /// Apply only the reindeer assignments, ignoring the other sets
    #[arg(long, overrides_with = "no_reindeer_only")]
    reindeer_only: bool,
    #[arg(long, overrides_with = "reindeer_only", hide = true)]
    no_reindeer_only: bool,

    /// Settings file (defaults to lms-spread.json in the working directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Input sequence directory override
    #[arg(long)]
    input_dir: Option<PathBuf>,

    /// Output sequence directory override
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Assignment file directory override
    #[arg(long)]
    assign_dir: Option<PathBuf>,

    /// Print the pass reports as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn options(&self) -> SpreadOptions {
        SpreadOptions {
            basic: !self.no_basic,
            trees: !self.no_trees,
            rgb: !self.no_rgb,
            reindeer_only: self.reindeer_only,
            overwrite: self.overwrite,
        }
    }

    fn settings(&self) -> Result<SpreadSettings, SpreadError> {
        let path = self
            .config
            .clone()
            .unwrap_or_else(|| PathBuf::from(paths::SETTINGS_FILE));
        let mut settings = settings::load_settings(&path)?;
        if let Some(dir) = &self.input_dir {
            settings.input_dir.clone_from(dir);
        }
        if let Some(dir) = &self.output_dir {
            settings.output_dir.clone_from(dir);
        }
        if let Some(dir) = &self.assign_dir {
            settings.assign_dir.clone_from(dir);
        }
        Ok(settings)
    }
}

// ── Output formatting ────────────────────────────────────────────

fn print_report(report: &PassReport) {
    println!(
        "{}: {} assignments applied, {} channels updated, {} effects copied",
        report.pass, report.entries_applied, report.channels_updated, report.effects_copied
    );
    if !report.channel_errors.is_empty() {
        println!("  There were errors with the following channels:");
        for e in &report.channel_errors {
            println!("    {e}");
        }
    }
    if !report.assignment_errors.is_empty() {
        println!("  There were errors with the following assignments:");
        for e in &report.assignment_errors {
            println!("    {e}");
        }
    }
}

fn run(cli: &Cli) -> Result<(), SpreadError> {
    let settings = cli.settings()?;
    let outcome = spread::spread_file(&settings, &cli.lms_file_name, &cli.options())?;

    if cli.json {
        let json = serde_json::to_string_pretty(&outcome)
            .map_err(|e| SpreadError::Io(std::io::Error::other(e)))?;
        println!("{json}");
    } else {
        for report in &outcome.reports {
            print_report(report);
        }
        println!("Wrote {}", outcome.output.display());
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
