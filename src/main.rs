use anyhow::{Context, Result};
use clap::{Args, ColorChoice, CommandFactory, FromArgMatches, Parser, Subcommand};
use dms_fusion::detection::InputDocument;
use dms_fusion::render::{render_labels, render_report};
use dms_fusion::{FusionConfig, FusionEngine, ImageInput, ImageReport};
use serde_json::json;
use std::io::{IsTerminal, Read, stdout};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "dms-fusion",
    about = "Fuse driver-monitoring detections from two detectors into one report",
    arg_required_else_help = true
)]
struct Cli {
    /// Disable color
    #[arg(long = "no-color", global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fuse the detections of one or more images
    Fuse(FuseArgs),
    /// Show label tables, class mapping and advisories
    Labels(LabelsArgs),
    /// Print the JSON schema of an image report
    Schema,
}

#[derive(Args, Clone)]
struct FuseArgs {
    /// Input JSON document, `-` for stdin
    #[arg(value_name = "INPUT", default_value = "-")]
    input: PathBuf,

    /// Output JSON
    #[arg(long)]
    json: bool,

    /// Include the auxiliary classifier result in the main report
    #[arg(long)]
    show_auxiliary: bool,

    /// Config file (defaults to the user config dir when present)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Override the IoU threshold used for cross-model suppression
    #[arg(long, value_name = "T")]
    iou_threshold: Option<f32>,
}

#[derive(Args, Clone)]
struct LabelsArgs {
    /// Config file (defaults to the user config dir when present)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write the effective configuration as TOML to PATH instead of listing it
    #[arg(long, value_name = "PATH")]
    write_config: Option<PathBuf>,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dms_fusion=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(path: Option<&Path>, iou_threshold: Option<f32>) -> Result<FusionConfig> {
    let config = FusionConfig::load(path)?;
    match iou_threshold {
        Some(threshold) => Ok(config.with_iou_threshold(threshold)?),
        None => Ok(config),
    }
}

fn read_input(path: &Path) -> Result<Vec<ImageInput>> {
    let content = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?
    };
    let document: InputDocument =
        serde_json::from_str(&content).context("invalid input document")?;
    Ok(document.into_images())
}

fn detect_color_choice() -> ColorChoice {
    // Scan args before clap so help/errors honor `--no-color`.
    // Mirror clap's parsing by stopping at `--` which terminates flags.
    let mut args = std::env::args_os();
    args.next();
    let mut flag = false;
    for arg in args {
        if arg == "--" {
            break;
        }
        if arg == "--no-color" {
            flag = true;
            break;
        }
    }
    if flag || std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty()) {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    }
}

fn want_color(color: ColorChoice) -> bool {
    stdout().is_terminal() && !matches!(color, ColorChoice::Never)
}

fn run_fuse(args: FuseArgs, color: ColorChoice) -> Result<(), i32> {
    let config = load_config(args.config.as_deref(), args.iou_threshold).map_err(|e| {
        eprintln!("Error: {:#}", e);
        2
    })?;
    let images = read_input(&args.input).map_err(|e| {
        eprintln!("Error: {:#}", e);
        2
    })?;

    let engine = FusionEngine::new(&config).show_auxiliary(args.show_auxiliary);
    let mut reports: Vec<ImageReport> = Vec::with_capacity(images.len());
    for (input, result) in images.iter().zip(engine.process_batch(&images)) {
        match result {
            Ok(report) => reports.push(report),
            Err(e) => {
                eprintln!("Error: {}: {}", input.image, e);
                return Err(3);
            }
        }
    }

    if args.json {
        match serde_json::to_string_pretty(&json!({ "results": reports })) {
            Ok(s) => println!("{}", s),
            Err(_) => return Err(4),
        }
    } else {
        let color = want_color(color);
        let rendered: Vec<String> = reports.iter().map(|r| render_report(r, color)).collect();
        println!("{}", rendered.join("\n\n"));
    }
    Ok(())
}

fn run_labels(args: LabelsArgs, color: ColorChoice) -> Result<(), i32> {
    let config = load_config(args.config.as_deref(), None).map_err(|e| {
        eprintln!("Error: {:#}", e);
        2
    })?;
    if let Some(path) = args.write_config {
        config.save(&path).map_err(|e| {
            eprintln!("Error: failed to write config {}: {}", path.display(), e);
            2
        })?;
        println!("Wrote {}", path.display());
        return Ok(());
    }
    println!("{}", render_labels(&config, want_color(color)));
    Ok(())
}

fn run_schema() -> Result<(), i32> {
    let schema = schemars::schema_for!(ImageReport);
    match serde_json::to_string_pretty(&schema) {
        Ok(s) => println!("{}", s),
        Err(_) => return Err(4),
    }
    Ok(())
}

fn main() {
    init_tracing();
    let color = detect_color_choice();
    let matches = Cli::command().color(color).get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());
    if cli.no_color || matches!(color, ColorChoice::Never) {
        colored::control::set_override(false);
    }
    let result = match cli.command {
        Some(Commands::Fuse(args)) => run_fuse(args, color),
        Some(Commands::Labels(args)) => run_labels(args, color),
        Some(Commands::Schema) => run_schema(),
        None => Ok(()),
    };
    if let Err(code) = result {
        std::process::exit(code);
    }
}
