/// stlview terminal viewer
///
/// Displays an STL model as shaded ASCII art. Without a model argument a
/// cube is shown.
/// Controls:
///   - Mouse drag: Rotate the model
///   - Scroll / + / -: Zoom
///   - Space: Toggle auto-rotate
///   - T: Toggle theme
///   - R: Retry a failed load
///   - 0: Reset the view
///   - Q/ESC: Quit
use clap::Parser;
use std::fs::File;
use std::path::PathBuf;
use std::time::Duration;
use stlview_core::{TriangleGeometry, ViewerConfig};
use stlview_terminal::{AppError, Model, TerminalApp};

#[derive(Parser, Debug)]
#[command(name = "stlview-terminal", version, about = "Interactive STL viewer for the terminal")]
struct Args {
    /// STL file to display (path or file:// URL)
    model: Option<String>,

    /// Start with the dark background
    #[arg(long)]
    dark: bool,

    /// Start with auto-rotate switched off
    #[arg(long)]
    no_auto_rotate: bool,

    /// Target frames per second
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Write log output to this file (the terminal itself is used for drawing)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<(), AppError> {
    let args = Args::parse();
    init_logging(&args)?;

    let config = ViewerConfig {
        dark_theme: args.dark,
        auto_rotate: !args.no_auto_rotate,
        ..ViewerConfig::default()
    };
    let frame_interval = Duration::from_millis(1000 / u64::from(args.fps.max(1)));

    let model = match args.model {
        Some(url) => Model::Url(url),
        None => Model::Geometry(TriangleGeometry::cube(2.0)),
    };

    let mut app = TerminalApp::new(config, frame_interval)?;
    app.run(model)?;

    if let Some(error) = &app.viewer().state().error {
        eprintln!("{}: {error}", error.user_message());
    }
    Ok(())
}

fn init_logging(args: &Args) -> Result<(), AppError> {
    let mut builder = env_logger::Builder::from_default_env();
    match &args.log_file {
        Some(path) => {
            if std::env::var_os("RUST_LOG").is_none() {
                builder.filter_level(log::LevelFilter::Info);
            }
            builder.target(env_logger::Target::Pipe(Box::new(File::create(path)?)));
        }
        None => {
            builder.filter_level(log::LevelFilter::Off);
        }
    }
    builder.init();
    Ok(())
}
