use clap::{Parser, Subcommand};
use photo_ingest::{config, optimize, output, process};
use std::path::PathBuf;

/// Shared flags for commands that encode renditions.
#[derive(clap::Args, Clone)]
struct CacheArgs {
    /// Disable the rendition cache and force re-encoding of all images
    #[arg(long)]
    no_cache: bool,
}

fn version_string() -> &'static str {
    let on_tag = env!("PHOTO_INGEST_ON_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("PHOTO_INGEST_GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "photo-ingest")]
#[command(about = "Prepare original photographs for a static site")]
#[command(long_about = "\
Prepare original photographs for a static site

Drop originals into the source directory and run `process`. Each photo gets a
thumbnail and a display rendition, EXIF facts are extracted, and everything
is written to a JSON manifest the site build reads.

Project layout (defaults, all configurable in photos.toml):

  photos.toml                          # Optional config
  photos-source/
  ├── DSC01234.jpg                     # Originals (.jpg .jpeg .png .webp .tiff)
  ├── metadata.json                    # Captions and tags, keyed by filename
  └── _preview.html                    # Thumbnails next to filenames
  public/assets/img/photography/
  ├── thumbs/DSC01234.webp             # 800px wide
  └── display/DSC01234.webp            # 1920px wide
  src/data/photos.json                 # Manifest, newest photos first

metadata.json is never overwritten wholesale: new photos get an empty
placeholder, existing captions and tags are kept.

Run 'photo-ingest gen-config' to generate a documented photos.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Project root (holds photos.toml; configured paths are relative to it)
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build renditions, the manifest, sidecar placeholders and the preview
    Process(CacheArgs),
    /// Convert JPEG/PNG cover images to web renditions in place
    Optimize,
    /// Print a stock photos.toml with all options documented
    GenConfig,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Command::Process(cache_args) => {
            let config = config::load_config(&cli.root)?;
            init_thread_pool(&config.processing);

            let (tx, rx) = std::sync::mpsc::channel();
            let root = cli.root.clone();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    output::print_process_event(&event, &root);
                }
            });
            let result = process::process(&config, &cli.root, !cache_args.no_cache, Some(tx));
            join_printer(printer);
            output::print_process_result(&result?, &cli.root);
        }
        Command::Optimize => {
            let config = config::load_config(&cli.root)?;
            init_thread_pool(&config.processing);
            let report = optimize::optimize(&config, &cli.root)?;
            output::print_optimize_report(&report);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Wait for the progress printer. A panicked printer loses output only.
fn join_printer(printer: std::thread::JoinHandle<()>) {
    if printer.join().is_err() {
        log::warn!("Progress printer stopped early");
    }
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores. User can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
