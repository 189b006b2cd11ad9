//! CLI application for masking a face in a photo.
//!
//! Usage:
//!   face-mask <image> --landmarks faces.json            # Mask, write <image>-masked.png
//!   face-mask <image> --face-box 50,80,200,200          # Average face in a known box
//!   face-mask <image> --landmarks faces.json --json     # JSON summary
//!   face-mask <image> --landmarks faces.json --stroke "10,10 40,12" --brush-radius 6

use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use face_mask::{
    BoundingBox, Color, EraseStyle, Error, LandmarkFile, LandmarkProvider, MaskOptions,
    MaskPipeline, MaskSession, Point, Result, StaticLandmarks,
};
use log::{debug, info};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "face-mask")]
#[command(author, version, about = "Repaint a face with its own skin tone", long_about = None)]
struct Args {
    /// Input image file
    #[arg(required = true)]
    image: PathBuf,

    /// Landmark file written by a face detector
    #[arg(long, conflicts_with = "face_box", required_unless_present = "face_box")]
    landmarks: Option<PathBuf>,

    /// Known face box as x,y,width,height; places the average face inside it
    #[arg(long)]
    face_box: Option<String>,

    /// Output image (default: <image>-masked.png next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Mask options JSON file; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Pixels the eyebrows are lifted to estimate the forehead
    #[arg(long)]
    forehead_offset: Option<f32>,

    /// How features are erased
    #[arg(long, value_enum)]
    erase: Option<EraseArg>,

    /// Color for --erase fill, as #rrggbb
    #[arg(long)]
    erase_color: Option<Color>,

    /// Erase using the sampled skin tone instead of --erase-color
    #[arg(long, conflicts_with = "erase_color")]
    erase_with_skin: bool,

    /// Growth of feature regions before erasing
    #[arg(long)]
    scale: Option<f32>,

    /// Convert to grey before sampling
    #[arg(long)]
    grey: bool,

    /// Keep eyebrows out of the eye regions
    #[arg(long)]
    no_brows: bool,

    /// Freehand stroke painted with the sampled color, as "x,y x,y ..." (repeatable)
    #[arg(long)]
    stroke: Vec<String>,

    /// Brush radius for --stroke
    #[arg(long)]
    brush_radius: Option<f32>,

    /// Output as JSON
    #[arg(short, long)]
    json: bool,

    /// Show verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum EraseArg {
    Fill,
    Clear,
}

/// Output structure for JSON serialization
#[derive(Serialize)]
struct Output {
    image: String,
    output: String,
    width: u32,
    height: u32,
    /// Sampled skin tone, #rrggbb
    color: Color,
    face: BoundingBox,
    regions: Vec<RegionOutput>,
    strokes: usize,
}

#[derive(Serialize)]
struct RegionOutput {
    name: String,
    points: usize,
    /// Polygon area in square pixels, before any erase scaling
    area: f32,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(e) = run(&args).await {
        if e.is_no_face() {
            eprintln!("No face found in {}", args.image.display());
            std::process::exit(2);
        }
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: &Args) -> Result<()> {
    let options = load_options(args)?;
    debug!("options: {:?}", options);

    match (&args.landmarks, &args.face_box) {
        (Some(path), _) => {
            info!("loading landmarks from {:?}", path);
            mask(args, LandmarkFile::load(path)?, options).await
        }
        (None, Some(face_box)) => {
            let face = parse_face_box(face_box)?;
            mask(args, StaticLandmarks::mean_face(face), options).await
        }
        (None, None) => Err(Error::InvalidOptions(
            "either --landmarks or --face-box is required".to_string(),
        )),
    }
}

fn load_options(args: &Args) -> Result<MaskOptions> {
    let mut options = match &args.config {
        Some(path) => MaskOptions::from_json_file(path)?,
        None => MaskOptions::default(),
    };

    if let Some(offset) = args.forehead_offset {
        options.forehead_offset_px = offset;
    }
    if let Some(erase) = args.erase {
        options.erase_style = match erase {
            EraseArg::Fill => EraseStyle::Fill,
            EraseArg::Clear => EraseStyle::Clear,
        };
    }
    if let Some(color) = args.erase_color {
        options.erase_color = Some(color);
    }
    if args.erase_with_skin {
        options.erase_color = None;
    }
    if let Some(scale) = args.scale {
        options.region_scale_factor = scale;
    }
    if args.grey {
        options.desaturate_before_sample = true;
    }
    if args.no_brows {
        options.include_brows = false;
    }
    if let Some(radius) = args.brush_radius {
        options.brush_radius = radius;
    }

    options.validate()?;
    Ok(options)
}

async fn mask<P: LandmarkProvider>(args: &Args, provider: P, options: MaskOptions) -> Result<()> {
    let strokes = args
        .stroke
        .iter()
        .map(|s| parse_stroke(s))
        .collect::<Result<Vec<_>>>()?;

    if args.verbose {
        eprintln!("Loading image {:?}...", args.image);
    }
    let image = image::open(&args.image)?.to_rgba8();
    let (width, height) = image.dimensions();

    let session = MaskSession::new(MaskPipeline::new(provider, options)?);
    let outcome = session.submit(&image).await?;

    for stroke in &strokes {
        session.brush(stroke, None).await?;
    }

    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&args.image));
    let surface = session.take().await.ok_or(Error::NoSampledColor)?;
    surface.into_image().save(&output_path)?;
    if args.verbose {
        eprintln!("Masked image written to {:?}", output_path);
    }

    let mut regions = vec![region_output("silhouette", &outcome.regions.silhouette)];
    regions.extend(
        outcome
            .regions
            .features
            .iter()
            .map(|(feature, region)| region_output(feature.name(), region)),
    );

    let output = Output {
        image: args.image.display().to_string(),
        output: output_path.display().to_string(),
        width,
        height,
        color: outcome.color,
        face: outcome.detection.bounding_box,
        regions,
        strokes: strokes.len(),
    };

    let output_str = if args.json {
        serde_json::to_string_pretty(&output)?
    } else {
        format_human_readable(&output)
    };
    println!("{}", output_str);

    Ok(())
}

fn region_output(name: &str, region: &face_mask::Region) -> RegionOutput {
    RegionOutput {
        name: name.to_string(),
        points: region.len(),
        area: face_mask::geometry::polygon_area(&region.points),
    }
}

fn default_output_path(image: &Path) -> PathBuf {
    let stem = image
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    image.with_file_name(format!("{stem}-masked.png"))
}

fn parse_numbers(s: &str, what: &str) -> Result<Vec<f32>> {
    s.split(',')
        .map(|n| {
            n.trim().parse::<f32>().map_err(|_| {
                Error::InvalidOptions(format!("invalid number {:?} in {} {:?}", n, what, s))
            })
        })
        .collect()
}

fn parse_face_box(s: &str) -> Result<BoundingBox> {
    match parse_numbers(s, "face box")?.as_slice() {
        &[x, y, w, h] if w > 0.0 && h > 0.0 => Ok(BoundingBox::new(x, y, w, h)),
        _ => Err(Error::InvalidOptions(format!(
            "face box {:?} must be x,y,width,height with positive size",
            s
        ))),
    }
}

fn parse_stroke(s: &str) -> Result<Vec<Point>> {
    s.split_whitespace()
        .map(|pair| match parse_numbers(pair, "stroke")?.as_slice() {
            &[x, y] => Ok(Point::new(x, y)),
            _ => Err(Error::InvalidOptions(format!(
                "stroke point {:?} must be x,y",
                pair
            ))),
        })
        .collect()
}

fn format_human_readable(output: &Output) -> String {
    let mut s = String::new();

    s.push_str(&format!("Image: {} ({}x{})\n", output.image, output.width, output.height));
    s.push_str(&format!(
        "Face box: {}x{} at ({}, {})\n",
        output.face.width, output.face.height, output.face.x, output.face.y
    ));
    s.push_str(&format!("Skin tone: {}\n", output.color));

    s.push_str("\nRegions:\n");
    for region in &output.regions {
        s.push_str(&format!(
            "  {:<11} {:>3} points, {:>9.1} px²\n",
            region.name, region.points, region.area
        ));
    }

    if output.strokes > 0 {
        s.push_str(&format!("\nBrush strokes: {}\n", output.strokes));
    }
    s.push_str(&format!("\nWritten to {}", output.output));

    s
}
