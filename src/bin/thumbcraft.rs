use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context as _;
use clap::Parser;
use thumbcraft::{
    BoxColorType, DEFAULT_EXPORT_NAME, ExportFormat, ExportSize, FontLibrary, HexColor,
    RenderRequest, RenderSession, TextPosition, TextStyle, export, export_file_name, find_swatch,
};
use tracing_subscriber::EnvFilter;

/// Render a square thumbnail with a title and subtitle over a photo.
#[derive(Parser, Debug)]
#[command(name = "thumbcraft", version)]
struct Cli {
    /// Settings profile JSON. Flags below override it.
    #[arg(long)]
    profile: Option<PathBuf>,

    #[arg(long)]
    title: Option<String>,

    #[arg(long)]
    subtitle: Option<String>,

    #[arg(long, value_enum)]
    position: Option<TextPosition>,

    #[arg(long, value_enum)]
    style: Option<TextStyle>,

    /// Title color as #RRGGBB or a swatch name (e.g. "Teal").
    #[arg(long)]
    color: Option<String>,

    /// Outline color as #RRGGBB or a swatch name (e.g. "Dark Gray").
    #[arg(long)]
    outline: Option<String>,

    #[arg(long, value_enum)]
    box_color: Option<BoxColorType>,

    /// White wash strength, 0.0 to 1.0.
    #[arg(long)]
    brightness: Option<f32>,

    /// Background photo.
    #[arg(long)]
    background: Option<PathBuf>,

    /// Extra font files to load alongside the system fonts.
    #[arg(long = "font")]
    fonts: Vec<PathBuf>,

    /// Seconds to wait for fonts before drawing with fallbacks.
    #[arg(long, default_value_t = 3.0)]
    font_wait: f64,

    /// Output edge length: 400, 800 or 1200.
    #[arg(long, default_value_t = 800)]
    size: u32,

    /// webp, png or jpeg.
    #[arg(long, default_value_t = ExportFormat::default())]
    format: ExportFormat,

    /// Output path. Defaults to NAME plus the format's extension.
    #[arg(long, conflicts_with = "name")]
    output: Option<PathBuf>,

    /// Base file name for the output.
    #[arg(long, default_value = DEFAULT_EXPORT_NAME)]
    name: String,

    /// Print the effective settings as JSON and exit.
    #[arg(long)]
    print_profile: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let request = build_request(&cli)?;

    if cli.print_profile {
        println!("{}", request.to_json_pretty()?);
        return Ok(());
    }

    let size = ExportSize::try_from(cli.size)?;
    let background = cli
        .background
        .as_ref()
        .map(|path| {
            std::fs::read(path).with_context(|| format!("read background '{}'", path.display()))
        })
        .transpose()?;

    let mut fonts = FontLibrary::system();
    for path in &cli.fonts {
        fonts
            .load_font_file(path)
            .with_context(|| format!("load font '{}'", path.display()))?;
    }

    let wait = Duration::try_from_secs_f64(cli.font_wait).context("invalid --font-wait")?;
    let session = RenderSession::new(fonts).with_font_wait(wait);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("start runtime")?;
    runtime.block_on(session.submit(request, background));

    let canvas = session
        .snapshot()
        .context("render produced no surface")?;
    let bytes = export(&canvas, size, cli.format)?;

    let out = cli
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(export_file_name(&cli.name, cli.format)));
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&out, &bytes).with_context(|| format!("write '{}'", out.display()))?;

    tracing::debug!(mime = cli.format.mime_type(), bytes = bytes.len(), "export written");
    eprintln!("wrote {}", out.display());
    Ok(())
}

fn build_request(cli: &Cli) -> anyhow::Result<RenderRequest> {
    let mut request = match &cli.profile {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("read profile '{}'", path.display()))?;
            RenderRequest::from_json(&json)
                .with_context(|| format!("parse profile '{}'", path.display()))?
        }
        None => RenderRequest::new(),
    };

    if let Some(title) = &cli.title {
        request.title = title.clone();
    }
    if let Some(subtitle) = &cli.subtitle {
        request.subtitle = subtitle.clone();
    }
    if let Some(position) = cli.position {
        request.text_position = position;
    }
    if let Some(style) = cli.style {
        request.text_style = style;
    }
    if let Some(color) = &cli.color {
        request.text_color = resolve_color(color)?;
    }
    if let Some(outline) = &cli.outline {
        request.outline_color = resolve_color(outline)?;
    }
    if let Some(box_color) = cli.box_color {
        request.box_color_type = box_color;
    }
    if let Some(brightness) = cli.brightness {
        request.brightness = brightness;
    }
    Ok(request)
}

/// Accepts `#RRGGBB` or a swatch name.
fn resolve_color(value: &str) -> anyhow::Result<String> {
    if let Some(swatch) = find_swatch(value) {
        return Ok(swatch.hex.to_string());
    }
    if HexColor::parse(value).is_some() {
        return Ok(value.to_string());
    }
    anyhow::bail!("unknown color {value:?}: expected #RRGGBB or a swatch name")
}
