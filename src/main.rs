use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use glam::Vec2;

use dotfield::{app, AppError, Catalog, ImageSource, Session, Settings};

const DEFAULT_IMAGE: &str =
    "https://upload.wikimedia.org/wikipedia/commons/thumb/5/51/IBM_logo.svg/1075px-IBM_logo.svg.png";

#[derive(Parser, Debug)]
#[command(about = "Logo particle field with use-case popups and relational clusters", version)]
struct Args {
    /// Image to sample, as an http(s) URL or a local path
    #[arg(long, default_value = DEFAULT_IMAGE)]
    image: String,

    /// JSON file with the use-case catalog (built-in list if omitted)
    #[arg(long)]
    usecases: Option<PathBuf>,

    /// JSON settings file; missing fields use defaults
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Show popups only: no hover connections or cluster explosions
    #[arg(long)]
    popup_only: bool,
}

fn main() -> Result<(), AppError> {
    env_logger::init();
    let args = Args::parse();

    let catalog = match &args.usecases {
        Some(path) => Catalog::from_path(path)?,
        None => Catalog::builtin()?,
    };
    let mut settings = match &args.settings {
        Some(path) => Settings::from_path(path)?,
        None => Settings::default(),
    };
    if args.popup_only {
        settings.relational = false;
    }
    log::info!("{} use cases, settings: {settings:?}", catalog.len());

    let image = match args.image.parse::<ImageSource>() {
        Ok(source) => source,
        Err(never) => match never {},
    };

    let session = Session::new(Arc::new(catalog), settings, Vec2::new(1280.0, 720.0));
    app::run(session, Some(image))
}
