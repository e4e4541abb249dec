use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use fitroom::auth::{AuthProvider, LocalUser};
use fitroom::catalog::{CatalogStore, FsCatalogStore};
use fitroom::compose::{encode_png, Placement};
use fitroom::loader;
use fitroom::segmentation;
use fitroom::session::{execute, Garment, Preview, TryOnSession};
use fitroom::store::{FsStore, HistoryStore, PhotoStore};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Data directory for the catalog, user photos and history
    #[arg(long, default_value = "fitroom-data")]
    data_dir: PathBuf,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compose a try-on preview from a photo and a catalog garment
    TryOn(TryOnArgs),

    /// Manage the clothing catalog
    #[command(subcommand)]
    Catalog(CatalogCommand),

    /// List a user's saved looks, newest first
    History {
        /// Acting user
        #[arg(long, default_value = "local")]
        user: String,
    },
}

#[derive(Args, Debug)]
struct TryOnArgs {
    /// Path to the portrait matting model (ONNX file)
    /// If not provided, runs without segmentation and previews the raw photo
    #[arg(long)]
    model: Option<PathBuf>,

    /// User photo to try clothing on
    #[arg(long)]
    photo: PathBuf,

    /// Catalog item id to overlay; omit to preview the segmented photo alone
    #[arg(long)]
    garment: Option<String>,

    /// Garment width as a fraction of canvas width
    #[arg(long, default_value_t = 0.8)]
    scale: f32,

    /// Garment top edge as a fraction of canvas height
    #[arg(long, default_value_t = 0.25)]
    offset_y: f32,

    /// Horizontal shift from center as a fraction of canvas width
    #[arg(long, default_value_t = 0.0)]
    offset_x: f32,

    /// Longest photo edge accepted before downscaling
    #[arg(long, default_value_t = loader::DEFAULT_MAX_PHOTO_EDGE)]
    max_edge: u32,

    /// Where to write the preview PNG
    #[arg(short, long, default_value = "look.png")]
    out: PathBuf,

    /// Acting user
    #[arg(long, default_value = "local")]
    user: String,

    /// Also store the photo and record the look in the user's history
    #[arg(long)]
    save: bool,
}

#[derive(Subcommand, Debug)]
enum CatalogCommand {
    /// Add a clothing item
    Add {
        #[arg(long)]
        name: String,

        #[arg(long)]
        category: String,

        /// Garment image (transparent PNG recommended)
        #[arg(long)]
        image: PathBuf,
    },
    /// List catalog items
    List,
    /// Remove a clothing item and its stored image
    Remove {
        #[arg(long)]
        id: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    match cli.command {
        Command::TryOn(args) => run_try_on(&cli.data_dir, args),
        Command::Catalog(command) => run_catalog(&cli.data_dir, command),
        Command::History { user } => run_history(&cli.data_dir, &user),
    }
}

fn run_try_on(data_dir: &Path, args: TryOnArgs) -> Result<()> {
    let auth = LocalUser::new(&args.user);
    let account = auth.current_user().context("No signed-in user")?;

    let catalog = FsCatalogStore::new(data_dir);
    let store = FsStore::new(data_dir);

    tracing::info!("Fitroom try-on starting for user {}", account.id);

    let photo = loader::load_photo(&args.photo, args.max_edge)
        .with_context(|| format!("Failed to load photo {}", args.photo.display()))?;
    tracing::info!("Photo: {}x{}", photo.width(), photo.height());

    let mut session = TryOnSession::new();

    // Resolve the garment selection up front so the composite can run as
    // soon as the mask lands
    if let Some(id) = &args.garment {
        let item = catalog
            .get(id)
            .with_context(|| format!("Clothing item {id} not in catalog"))?;
        let image = loader::load_garment(&item.image_path).with_context(|| {
            format!("Failed to load garment image {}", item.image_path.display())
        })?;
        tracing::info!("Selected {} ({})", item.name, item.category);
        session.select_garment(Some(Garment { item, image }));
    }
    session.set_placement(Placement::new(args.scale, args.offset_y, args.offset_x));

    // Submitted before the model is up; the photo pends until model_ready
    let deferred = session.submit_photo(photo);
    debug_assert!(deferred.is_none());

    let mut model = match &args.model {
        Some(path) => {
            let load_start = Instant::now();
            match segmentation::load_default_model(path) {
                Ok(model) => {
                    tracing::info!("Model loaded in {:.1?}", load_start.elapsed());
                    Some(model)
                }
                Err(e) => {
                    tracing::warn!("{e}");
                    None
                }
            }
        }
        None => {
            tracing::info!("Running without segmentation (no model given)");
            None
        }
    };

    match &mut model {
        Some(model) => {
            if let Some(request) = session.model_ready() {
                let segment_start = Instant::now();
                execute(&mut session, model.as_mut(), request);
                tracing::info!("Segmentation completed in {:.1?}", segment_start.elapsed());
            }
        }
        None => session.model_failed(),
    }

    if session.garment().is_some() && session.combined().is_none() {
        tracing::warn!("Garment overlay needs a segmented photo; preview degrades");
    }

    let preview_png = match session.preview() {
        Preview::Combined(combined) => {
            tracing::info!("Preview: combined composite");
            encode_png(combined)?
        }
        Preview::Masked(masked) => {
            tracing::info!("Preview: segmented photo (no garment overlay)");
            encode_png(masked)?
        }
        Preview::Source(source) => {
            tracing::info!("Preview: raw photo");
            encode_png(&image::DynamicImage::ImageRgb8(source.clone()).to_rgba8())?
        }
        Preview::Empty => anyhow::bail!("Nothing to preview"),
    };

    std::fs::write(&args.out, &preview_png)
        .with_context(|| format!("Failed to write {}", args.out.display()))?;
    tracing::info!("Wrote {}", args.out.display());

    if args.save {
        let photo_bytes = std::fs::read(&args.photo)
            .with_context(|| format!("Failed to re-read {}", args.photo.display()))?;
        store.store_user_photo(&account.id, &photo_bytes)?;

        if let (Some(garment), Some(_)) = (session.garment(), session.combined()) {
            let record = store.record_try_on(&account.id, &garment.item.id, &preview_png)?;
            tracing::info!("Saved look {}", record.id);
        } else {
            tracing::warn!("No composite to save; only the photo was stored");
        }
    }

    Ok(())
}

fn run_catalog(data_dir: &Path, command: CatalogCommand) -> Result<()> {
    let catalog = FsCatalogStore::new(data_dir);

    match command {
        CatalogCommand::Add {
            name,
            category,
            image,
        } => {
            let bytes = std::fs::read(&image)
                .with_context(|| format!("Failed to read {}", image.display()))?;
            // Reject assets the compositor could not decode later
            image::load_from_memory(&bytes)
                .with_context(|| format!("{} is not a decodable image", image.display()))?;

            let item = catalog.create(&name, &category, &bytes)?;
            println!("{}  {}  {}", item.id, item.name, item.category);
        }
        CatalogCommand::List => {
            let items = catalog.list()?;
            if items.is_empty() {
                println!("Catalog is empty");
            }
            for item in items {
                println!(
                    "{}  {}  {}  (added {})",
                    item.id,
                    item.name,
                    item.category,
                    item.created_at.format("%Y-%m-%d %H:%M")
                );
            }
        }
        CatalogCommand::Remove { id } => {
            catalog.delete(&id)?;
            println!("Removed {id}");
        }
    }

    Ok(())
}

fn run_history(data_dir: &Path, user: &str) -> Result<()> {
    let store = FsStore::new(data_dir);
    let records = store.list_try_on_history(user)?;

    if records.is_empty() {
        println!("No saved looks for {user}");
    }
    for record in records {
        println!(
            "{}  item {}  {}  (saved {})",
            record.id,
            record.clothing_item_id,
            record.image_path.display(),
            record.created_at.format("%Y-%m-%d %H:%M")
        );
    }

    Ok(())
}
