//! # Afiche CLI
//!
//! Command-line front end for the poster engine. The engine itself only
//! returns bytes plus a suggested filename; this binary is the caller that
//! persists them.
//!
//! ## Usage
//!
//! ```bash
//! # Render with inline arguments
//! afiche render --name "Ana & Juan's Wedding" --url https://example.com/e/42
//!
//! # Landscape, themed, with background and emblem
//! afiche render --name "Gala 2026" --url https://example.com/e/7 \
//!     --orientation landscape --theme midnight \
//!     --background https://example.com/hall.jpg --emblem logo.png
//!
//! # Render from a JSON request file
//! afiche render --request poster.json --out posters/
//!
//! # List known themes
//! afiche themes
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use afiche::{
    AficheError, Orientation, Palette, PosterRequest,
    assets::AssetLoader,
    render_with_loader,
};

/// Afiche - QR poster rendering utility
#[derive(Parser, Debug)]
#[command(name = "afiche")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a poster to a JPEG file
    Render {
        /// JSON file with a full PosterRequest (overrides the inline args)
        #[arg(long, value_name = "FILE")]
        request: Option<PathBuf>,

        /// Event name shown as the poster title
        #[arg(long, default_value = "")]
        name: String,

        /// Payload URL encoded into the QR code
        #[arg(long, default_value = "")]
        url: String,

        /// Poster orientation
        #[arg(long, value_enum, default_value_t = Orientation::Portrait)]
        orientation: Orientation,

        /// Theme id (unknown ids fall back to the default palette)
        #[arg(long)]
        theme: Option<String>,

        /// Background image URL or local path
        #[arg(long)]
        background: Option<String>,

        /// Emblem image URL or local path
        #[arg(long)]
        emblem: Option<String>,

        /// Asset load timeout in milliseconds
        #[arg(long, default_value_t = 5000)]
        timeout_ms: u64,

        /// Output file, or directory to place the suggested filename in
        #[arg(long, value_name = "PATH")]
        out: Option<PathBuf>,
    },

    /// List known theme ids
    Themes,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Poster rendering failed.");
        eprintln!("Detail: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), AficheError> {
    match cli.command {
        Commands::Render {
            request,
            name,
            url,
            orientation,
            theme,
            background,
            emblem,
            timeout_ms,
            out,
        } => {
            let poster = match request {
                Some(path) => {
                    let json = std::fs::read_to_string(&path)?;
                    serde_json::from_str::<PosterRequest>(&json)
                        .map_err(|e| AficheError::InvalidRequest(format!("{}: {e}", path.display())))?
                }
                None => PosterRequest {
                    event_name: name,
                    orientation,
                    payload_url: url,
                    theme_id: theme,
                    background_image_ref: background,
                    emblem_image_ref: emblem,
                },
            };

            let loader = AssetLoader::with_timeout(Duration::from_millis(timeout_ms))?;
            let result = render_with_loader(&poster, &loader).await?;

            let target = match out {
                Some(path) if path.is_dir() => path.join(&result.suggested_filename),
                Some(path) => path,
                None => PathBuf::from(&result.suggested_filename),
            };
            std::fs::write(&target, &result.image_bytes)?;
            println!("Wrote {} ({} bytes)", target.display(), result.image_bytes.len());
            Ok(())
        }

        Commands::Themes => {
            for name in Palette::known_themes() {
                println!("{name}");
            }
            Ok(())
        }
    }
}
