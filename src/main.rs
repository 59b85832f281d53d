use clap::{ArgAction, Parser};
use log::LevelFilter;
use mediasift::cli::{RunOptions, SiftCommand, run_cli};
use mediasift::output::OutputFormatter;
use std::path::PathBuf;
use std::process::ExitCode;

/// Select image and video files under a size budget and move them into
/// `images/` and `videos/` subdirectories.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Directory to scan (only its immediate entries are considered)
    folder_path: PathBuf,

    /// Image budget, e.g. 15G (units K, M, G; multiples of 1024)
    #[arg(requires = "video_size_limit")]
    image_size_limit: Option<String>,

    /// Video budget, e.g. 20G (units K, M, G; multiples of 1024)
    video_size_limit: Option<String>,

    /// Configuration file (defaults to .mediasiftrc.toml, then ~/.config/mediasift/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory the selection lists are written to [default: out]
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Only write the selection lists; do not move any files
    #[arg(long, conflicts_with = "dry_run")]
    select_only: bool,

    /// Write the selection lists and show which files would be moved
    #[arg(long)]
    dry_run: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = match args.verbose {
        0 => LevelFilter::Error,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let command = if args.select_only {
        SiftCommand::Select
    } else {
        SiftCommand::Organize {
            dry_run: args.dry_run,
        }
    };

    let options = RunOptions {
        folder: args.folder_path,
        size_limits: args.image_size_limit.zip(args.video_size_limit),
        config_path: args.config,
        out_dir: args.out_dir,
    };

    match run_cli(command, &options) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            OutputFormatter::error(&format!("Error: {}", e));
            ExitCode::FAILURE
        }
    }
}
