use clap::{Parser, Subcommand};
use photo_pdf::imaging::{ImageBackend, RustBackend};
use photo_pdf::platform::{DesktopPlatform, Platform};
use photo_pdf::screen::Screen;
use photo_pdf::{config, output};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "photo-pdf")]
#[command(about = "Assemble library photos into a single PDF")]
#[command(long_about = "\
Assemble library photos into a single PDF

Each photo becomes one page, sized to the photo in pixels, in the order the
photos were selected. Photos are scaled down to at most 1600px wide and
recompressed before assembly, and every page carries a small watermark.

Generated documents are saved as 'File <N>.pdf' in the data directory and
listed newest first:

  .photo-pdf/
  ├── config.toml                  # Optional settings
  └── recent_pdfs/
      ├── File 1.pdf
      └── File 3.pdf               # Next one will be File 4.pdf

Two ways to select photos:

  create <IMAGES>...               Any JPEG or PNG files, no limit
  compose --album Camera 1 4 7     Photos of a library album by position,
                                   at most 20 (see 'albums' and 'album')

Run 'photo-pdf gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Directory holding config.toml and the generated PDFs
    #[arg(long, default_value = ".photo-pdf", global = true)]
    data_dir: PathBuf,

    /// Photo library root (overrides library.root)
    #[arg(long, global = true)]
    library: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build a PDF from the given image files
    Create {
        #[arg(required = true)]
        images: Vec<PathBuf>,
    },
    /// List library albums, camera albums first
    Albums,
    /// List the photos of an album (the first album by default)
    ///
    /// Nested albums are named by their path in the library, e.g. Trips/Lisbon.
    Album { name: Option<String> },
    /// Build a PDF from album photos chosen by position
    Compose {
        /// Album to pick from (the first album by default)
        #[arg(long)]
        album: Option<String>,
        /// 1-based positions as shown by `album`
        #[arg(required = true)]
        positions: Vec<NonZeroUsize>,
    },
    /// List generated PDFs, newest first
    List {
        #[arg(long)]
        json: bool,
    },
    /// Open a generated PDF with the system share/open command
    Share { name: String },
    /// Delete one generated PDF
    Delete { name: String },
    /// Delete every generated PDF
    Clear,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(ExitCode::SUCCESS);
    }

    let mut app_config = config::load_config(&cli.data_dir)?;
    if let Some(library) = cli.library {
        app_config.library.root = library;
    }
    init_thread_pool(&app_config.processing);

    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_screen_event(&event) {
                println!("{}", line);
            }
        }
    });

    let platform = DesktopPlatform::new(&app_config);
    let mut screen =
        Screen::new(app_config, &cli.data_dir, RustBackend::new(), platform).with_events(tx);
    let result = run(&mut screen, cli.command);
    let notice = screen.notice().cloned();
    drop(screen);
    printer.join().expect("printer thread panicked");

    match result {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            match notice {
                Some(notice) => output::print_notice(&notice),
                None => eprintln!("error: {}", e),
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

fn run<B: ImageBackend, P: Platform>(
    screen: &mut Screen<B, P>,
    command: Command,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Create { images } => {
            screen.load_recent()?;
            screen.pick_images(&images)?;
            screen.create_pdf()?;
        }
        Command::Albums => {
            screen.open_library()?;
            output::print_albums(screen.albums());
        }
        Command::Album { name } => {
            screen.open_library()?;
            if let Some(name) = name {
                screen.open_album(&name)?;
            }
            match screen.current_album() {
                Some(album) => output::print_album_assets(album, screen.assets()),
                None => output::print_albums(&[]),
            }
        }
        Command::Compose { album, positions } => {
            screen.load_recent()?;
            screen.open_library()?;
            if let Some(album) = album {
                screen.open_album(&album)?;
            }
            let mut seen = Vec::new();
            for position in positions {
                if !seen.contains(&position) {
                    seen.push(position);
                    screen.toggle_asset(position.get() - 1)?;
                }
            }
            screen.create_pdf()?;
        }
        Command::List { json } => {
            screen.load_recent()?;
            if json {
                println!("{}", serde_json::to_string_pretty(screen.registry().entries())?);
            } else {
                output::print_registry(screen.registry().entries());
            }
        }
        Command::Share { name } => {
            screen.load_recent()?;
            screen.share(&name)?;
        }
        Command::Delete { name } => {
            screen.load_recent()?;
            screen.delete(&name)?;
            output::print_registry(screen.registry().entries());
        }
        Command::Clear => {
            screen.load_recent()?;
            screen.clear_all()?;
            output::print_registry(screen.registry().entries());
        }
        Command::GenConfig => print!("{}", config::stock_config_toml()),
    }
    Ok(())
}

/// Diagnostics go to stderr; `RUST_LOG` overrides the default `warn` level.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of available CPU cores.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
