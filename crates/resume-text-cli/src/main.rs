use std::io::{IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use resume_text_core::{
    ConfigFile, ExtractError, ExtractionJob, Outcome, PathOverrides, TextOptions, config_file,
    paths,
};
use resume_text_mupdf::MupdfBackend;
use tracing_subscriber::EnvFilter;

mod output;

use output::ColorMode;

/// Extract the plain text of a résumé PDF into a UTF-8 text file
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Project root that relative paths are resolved against
    /// [default: nearest ancestor directory containing assets/]
    #[arg(long)]
    root: Option<PathBuf>,

    /// PDF to extract [default: assets/SHOEB-Python.pdf]
    #[arg(long)]
    source: Option<PathBuf>,

    /// Text file to write [default: assets/resume_text.txt]
    #[arg(short = 'o', long)]
    destination: Option<PathBuf>,

    /// Read settings from this TOML file instead of the usual config locations
    #[arg(long)]
    config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Exit with status 1 when extraction fails
    #[arg(long)]
    strict: bool,

    /// Log debug diagnostics to stderr
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn overrides(&self) -> PathOverrides {
        PathOverrides {
            root: self.root.clone(),
            source: self.source.clone(),
            destination: self.destination.clone(),
        }
    }
}

fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let color = ColorMode(!cli.no_color && std::io::stdout().is_terminal());
    let outcome = extract(&cli);

    let mut stdout = std::io::stdout().lock();
    output::print_outcome(&mut stdout, &outcome, color)?;
    stdout.flush()?;

    if cli.strict && !outcome.is_success() {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

/// Diagnostics go to stderr so stdout carries only the status line.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Resolve configuration and run the extraction. Never fails: every error,
/// including configuration errors, becomes [`Outcome::Failed`].
fn extract(cli: &Cli) -> Outcome {
    // Resolve configuration: CLI flags > env vars > config file > defaults
    let config = match load_config(cli.config.as_ref()) {
        Ok(config) => config,
        Err(e) => return e.into(),
    };
    tracing::debug!(?config, "effective configuration");
    let cwd = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            return ExtractError::Config(format!("cannot determine working directory: {}", e))
                .into();
        }
    };

    let layers = [
        cli.overrides(),
        env_overrides(),
        PathOverrides::from_config(&config),
    ];
    let resolved = paths::resolve(&layers, &cwd);

    let backend = MupdfBackend::new()
        .with_header_exclusion(config.header_exclusion_ratio())
        .with_footer_exclusion(config.footer_exclusion_ratio());
    let job = ExtractionJob::new(resolved.source, resolved.destination).with_options(TextOptions {
        expand_ligatures: config.expand_ligatures(),
    });

    resume_text_core::run(&job, &backend)
}

fn load_config(explicit: Option<&PathBuf>) -> Result<ConfigFile, ExtractError> {
    match explicit {
        Some(path) => config_file::load_explicit(path).map_err(ExtractError::Config),
        None => Ok(config_file::load_config()),
    }
}

fn env_overrides() -> PathOverrides {
    PathOverrides {
        root: std::env::var("RESUME_TEXT_ROOT").ok().map(PathBuf::from),
        source: std::env::var("RESUME_TEXT_SOURCE").ok().map(PathBuf::from),
        destination: std::env::var("RESUME_TEXT_DESTINATION")
            .ok()
            .map(PathBuf::from),
    }
}
