use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    process::ExitCode,
    time::Duration,
};

use anyhow::Context as _;
use carousel::{
    AspectRatio, AssetResolver, BatchRequest, Brand, CanvasSpec, ContentIdeas, DirAssetResolver,
    JobStatus, Rasterizer, SlideSpec, StudioConfig, TextModel,
    assets::{decode::decode_image, store::load_first},
    generate::freeform_carousel,
    model::slide::{IconPosition, ImageUsage},
    render::{IconStamp, SlideInputs, render_mockup},
};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "carousel", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one mockup slide to a PNG without calling any provider.
    Render(RenderArgs),
    /// Print the resolved canvas for an aspect tag as JSON.
    Canvas(CanvasArgs),
    /// Submit a batch and follow it until it finishes.
    Batch(BatchArgs),
    /// Print a brand's content-ideas catalog as JSON.
    Ideas(IdeasArgs),
    /// Have a text model outline a carousel and print it as a batch request.
    Freeform(FreeformArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Slide JSON (a `slideType: "mockup"` object).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Brand id.
    #[arg(long)]
    brand: Option<String>,

    /// Directory that screenshot and brand asset ids resolve against.
    #[arg(long, env = "CAROUSEL_ASSETS_DIR", default_value = "assets")]
    assets: PathBuf,

    /// Stamp the brand icon at this position.
    #[arg(long)]
    icon: Option<String>,

    /// Extra font directories.
    #[arg(long)]
    fonts: Vec<PathBuf>,
}

#[derive(Parser, Debug)]
struct CanvasArgs {
    /// `9:16`, `4:5` or `1:1`.
    #[arg(long)]
    aspect: String,
}

#[derive(Parser, Debug)]
struct BatchArgs {
    /// Batch request JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Status poll period in milliseconds.
    #[arg(long, default_value_t = 1000)]
    watch_ms: u64,
}

#[derive(Parser, Debug)]
struct IdeasArgs {
    /// Brand id.
    #[arg(long)]
    brand: Option<String>,

    /// Directory holding `brands/<id>/content-ideas.md`.
    #[arg(long, env = "CAROUSEL_ASSETS_DIR", default_value = "assets")]
    assets: PathBuf,
}

#[derive(Parser, Debug)]
struct FreeformArgs {
    /// What the carousel should be about.
    #[arg(long)]
    prompt: String,

    /// Brand id.
    #[arg(long)]
    brand: Option<String>,

    /// Number of slides, 1 to 20.
    #[arg(long)]
    count: Option<usize>,

    /// Text model id (`claude-haiku`, `gpt-4o-mini`, `gemini-2.5-flash`).
    #[arg(long)]
    text_model: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args).await,
        Command::Canvas(args) => cmd_canvas(args),
        Command::Batch(args) => cmd_batch(args).await,
        Command::Ideas(args) => cmd_ideas(args).await,
        Command::Freeform(args) => cmd_freeform(args).await,
    }
}

fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> anyhow::Result<T> {
    let f = File::open(path).with_context(|| format!("open {what} '{}'", path.display()))?;
    serde_json::from_reader(BufReader::new(f)).with_context(|| format!("parse {what} JSON"))
}

async fn cmd_render(args: RenderArgs) -> anyhow::Result<ExitCode> {
    let slide = match read_json::<SlideSpec>(&args.in_path, "slide")? {
        SlideSpec::Mockup(m) => m,
        other => anyhow::bail!(
            "only mockup slides render offline, got '{}'",
            other.kind()
        ),
    };
    SlideSpec::Mockup(slide.clone()).validate()?;

    let brand = Brand::resolve(args.brand.as_deref());
    let assets = DirAssetResolver::new(&args.assets);
    let raster = Rasterizer::new(&args.fonts);

    let image = match (slide.image_usage, slide.screenshot_image.as_deref()) {
        (ImageUsage::Phone | ImageUsage::Figure | ImageUsage::Background, Some(id))
            if !id.trim().is_empty() =>
        {
            Some(decode_image(&assets.load(id.trim()).await?)?)
        }
        _ => None,
    };
    let phone_frame = match load_first(&assets, &brand.frame_asset_ids()).await? {
        Some(bytes) => Some(decode_image(&bytes)?),
        None => None,
    };
    let icon = match args.icon.as_deref() {
        Some(tag) => match load_first(&assets, &brand.icon_asset_ids()).await? {
            Some(bytes) => Some(IconStamp {
                image: decode_image(&bytes)?,
                caption: brand.icon_caption.clone(),
                position: IconPosition::parse(tag),
            }),
            None => {
                tracing::warn!(brand = %brand.id, "no icon asset found, rendering without it");
                None
            }
        },
        None => None,
    };

    let inputs = SlideInputs {
        image,
        phone_frame,
        icon,
    };
    let surface = render_mockup(&slide, &brand, &inputs, &raster)?;

    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, surface.encode_png()?)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(ExitCode::SUCCESS)
}

fn cmd_canvas(args: CanvasArgs) -> anyhow::Result<ExitCode> {
    let canvas = CanvasSpec::for_aspect(AspectRatio::parse(&args.aspect));
    println!("{}", serde_json::to_string_pretty(&canvas)?);
    Ok(ExitCode::SUCCESS)
}

async fn cmd_batch(args: BatchArgs) -> anyhow::Result<ExitCode> {
    let request: BatchRequest = read_json(&args.in_path, "batch")?;
    let config = StudioConfig::from_env()?;
    let orchestrator = config.orchestrator(Rasterizer::default())?;

    let ticket = orchestrator.submit(request)?;
    eprintln!("job {} accepted ({} slides)", ticket.job_id, ticket.total);

    let mut last_seen = usize::MAX;
    let job = loop {
        let job = orchestrator.status(&ticket.job_id)?;
        if job.completed != last_seen {
            eprintln!(
                "job {}: {}/{} done, slide {} in progress",
                job.id, job.completed, job.total, job.current
            );
            last_seen = job.completed;
        }
        if job.is_terminal() {
            break job;
        }
        tokio::time::sleep(Duration::from_millis(args.watch_ms.max(50))).await;
    };

    for slide in &job.slides {
        match (&slide.url, &slide.error) {
            (Some(url), _) if slide.ok => println!("slide {}: {url}", slide.slide_number),
            (_, err) => println!(
                "slide {}: failed: {}",
                slide.slide_number,
                err.as_deref().unwrap_or("unknown error")
            ),
        }
    }

    if job.status == JobStatus::Error {
        eprintln!(
            "job {} failed: {}",
            job.id,
            job.error.as_deref().unwrap_or("unknown error")
        );
        return Ok(ExitCode::FAILURE);
    }
    eprintln!("job {}: {} of {} slides succeeded", job.id, job.succeeded(), job.total);
    Ok(ExitCode::SUCCESS)
}

async fn cmd_ideas(args: IdeasArgs) -> anyhow::Result<ExitCode> {
    let brand = Brand::resolve(args.brand.as_deref());
    let assets = DirAssetResolver::new(&args.assets);
    let bytes = assets.load(&ContentIdeas::asset_id(&brand)).await?;
    let markdown = String::from_utf8(bytes).context("content ideas are not UTF-8")?;
    let ideas = ContentIdeas::parse(&markdown, &brand);
    println!("{}", serde_json::to_string_pretty(&ideas)?);
    Ok(ExitCode::SUCCESS)
}

async fn cmd_freeform(args: FreeformArgs) -> anyhow::Result<ExitCode> {
    let brand = Brand::resolve(args.brand.as_deref());
    let model = TextModel::resolve(args.text_model.as_deref());
    let router = StudioConfig::from_env()?.router()?;

    let outline = freeform_carousel(&router, model, &brand, &args.prompt, args.count).await?;
    eprintln!("\"{}\" ({} slides)", outline.title, outline.slides.len());

    let mut request = BatchRequest::new(outline.to_specs(&brand));
    request.brand = Some(brand.id.clone());
    request.text_model = Some(model.id().to_string());
    println!("{}", serde_json::to_string_pretty(&request)?);
    Ok(ExitCode::SUCCESS)
}
