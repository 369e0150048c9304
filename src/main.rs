use clap::{Parser, Subcommand};
use retrofx::pipeline::EffectRequest;
use retrofx::{config, output, process};
use std::path::PathBuf;
use std::process::ExitCode;

fn version_string() -> &'static str {
    let hash = env!("RETROFX_GIT_HASH");
    if hash.is_empty() {
        env!("CARGO_PKG_VERSION")
    } else {
        // Leaked once at startup
        Box::leak(format!("{}@{hash}", env!("CARGO_PKG_VERSION")).into_boxed_str())
    }
}

#[derive(Parser)]
#[command(name = "retrofx")]
#[command(about = "Apply retro filters to images")]
#[command(long_about = "\
Apply retro filters to images

Effects run in the order given, each one taking the previous result as input:

  retrofx apply cat.png --effect pixelate:pixel_size=8,palette_size=4 --effect crt_scanlines

Available effects:
  pixelate       blocky mosaic with palette reduction (pixel_size, palette_size, dither)
  crt_scanlines  darkened alternate rows (opacity)
  8bit           palette reduction without dithering (palette_size)
  vhs            channel shift, warp, scanlines, noise
                 (color_shift, warp_intensity, scanline_intensity, noise_amount, seed)

Unknown effect names are skipped with a warning. Results are written as
processed_<timestamp>_<name> into the processed folder (static/processed by
default).

Run 'retrofx effects' for defaults and ranges, 'retrofx gen-config' for a
documented retrofx.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Config file
    #[arg(long, default_value = config::CONFIG_FILE_NAME, global = true)]
    config: PathBuf,

    /// More log output (-v info, -vv debug). RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply an effect list to one or more images
    Apply {
        /// Image files or directories to process
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Effect as name:key=value,... (repeatable, applied in order)
        #[arg(short, long = "effect")]
        effects: Vec<EffectRequest>,

        /// JSON file with an effect list, applied before any --effect
        #[arg(long)]
        recipe: Option<PathBuf>,

        /// Write results here instead of the configured processed folder
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Copy inputs into the upload folder first
        #[arg(long)]
        stage: bool,

        /// Print results as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// List effects with their parameters
    Effects,
    /// Print a stock retrofx.toml with all options documented
    GenConfig,
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Apply {
            inputs,
            effects,
            recipe,
            output_dir,
            stage,
            json,
        } => {
            let app_config = config::load_config(&cli.config)?;
            init_thread_pool(&app_config.processing);

            let mut requests = match &recipe {
                Some(path) => process::load_recipe(path)?,
                None => Vec::new(),
            };
            requests.extend(effects);

            let mut options = process::ProcessOptions::from_config(&app_config);
            options.stage = stage;
            if let Some(dir) = output_dir {
                options.processed_dir = dir;
            }

            let files = process::collect_inputs(&inputs, &options.allowed_extensions);
            log::info!(
                "processing {} file(s) with {} effect(s)",
                files.len(),
                requests.len()
            );

            let result = if json {
                let result = process::process_batch(&files, &requests, &options, None);
                let failed: Vec<_> = result
                    .failed
                    .iter()
                    .map(|(source, error)| serde_json::json!({"source": source, "error": error}))
                    .collect();
                let report = serde_json::json!({
                    "processed": result.processed,
                    "failed": failed,
                });
                println!("{}", serde_json::to_string_pretty(&report)?);
                result
            } else {
                let (tx, rx) = std::sync::mpsc::channel();
                let printer = std::thread::spawn(move || {
                    for event in rx {
                        for line in output::format_process_event(&event) {
                            println!("{}", line);
                        }
                    }
                });
                let result = process::process_batch(&files, &requests, &options, Some(tx));
                printer.join().map_err(|_| "output thread panicked")?;
                output::print_summary(&result);
                result
            };

            if !result.failed.is_empty() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Effects => {
            output::print_effect_catalog();
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of available cores.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
