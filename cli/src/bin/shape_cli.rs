use clap::{Parser, Subcommand, ValueEnum};
use cli::{load_config, ConfigFile};
use color_eyre::eyre::{eyre, Result};
use image::Rgb;
use shape_features::{
    annotate, append_csv, AnalysisCommand, Detection, FeatureRecord, PipelineConfig, ShapeAnalyzer,
    StageOutput,
};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{self, EnvFilter};

const ANNOTATION_COLOR: Rgb<u8> = Rgb([0, 255, 0]);

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the shape feature vector of the object in an image
    Features {
        /// Path to the input image
        #[arg(short, long)]
        input: PathBuf,
        /// Pipeline settings (.toml or .json)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Append the vector to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
        /// Label written in the first CSV column (defaults to the image file stem)
        #[arg(short, long)]
        label: Option<String>,
        /// Save a copy of the input with the fitted rectangle drawn on it
        #[arg(short, long)]
        annotated: Option<PathBuf>,
    },
    /// Run a single stage and save its image
    Stage {
        /// Path to the input image
        #[arg(short, long)]
        input: PathBuf,
        /// Stage to run (threshold, clean, segment, segment_color)
        #[arg(short = 'm', long)]
        command: AnalysisCommand,
        /// Where to write the stage image
        #[arg(short, long)]
        output: PathBuf,
        /// Pipeline settings (.toml or .json)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Print the default configuration or a JSON schema
    Config {
        #[arg(long, value_enum, default_value_t = ConfigView::Toml)]
        view: ConfigView,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ConfigView {
    /// Default pipeline settings as TOML
    Toml,
    /// Default pipeline settings as JSON
    Json,
    /// JSON schema of the settings file
    Schema,
    /// JSON schema of the stage commands
    Commands,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Features {
            input,
            config,
            csv,
            label,
            annotated,
        } => {
            extract_features(
                input,
                config.as_deref(),
                csv.as_deref(),
                label.as_deref(),
                annotated.as_deref(),
            )?;
        }
        Commands::Stage {
            input,
            command,
            output,
            config,
        } => {
            run_stage(input, *command, output, config.as_deref())?;
        }
        Commands::Config { view } => print_config(*view)?,
    }

    Ok(())
}

fn analyzer_for(input: &Path, config: Option<&Path>) -> Result<ShapeAnalyzer> {
    let config = load_config(config)?;
    let mut analyzer = ShapeAnalyzer::from_config(&config)?;
    analyzer.load_image(input)?;
    info!("Loaded {:?} with {}", input, analyzer.pipeline().info());
    Ok(analyzer)
}

fn extract_features(
    input: &Path,
    config: Option<&Path>,
    csv: Option<&Path>,
    label: Option<&str>,
    annotated: Option<&Path>,
) -> Result<()> {
    let analyzer = analyzer_for(input, config)?;

    let shape = match analyzer.execute(AnalysisCommand::Features)? {
        StageOutput::Detection(Detection::Detected(shape)) => shape,
        StageOutput::Detection(Detection::NotDetected(reason)) => {
            warn!("No object found in {:?}: {}", input, reason);
            return Ok(());
        }
        StageOutput::Image(_) => return Err(eyre!("features command produced an image")),
    };

    let hu = shape.features.hu_moments();
    info!("Hu moments (log10): {:?}", hu);
    info!(
        "Percent fill: {:.2}, aspect ratio: {:.3}, rectangle angle: {:.1}",
        shape.features.percent_fill(),
        shape.features.aspect_ratio(),
        shape.rect.angle
    );

    let values: Vec<String> = shape.features.as_slice().iter().map(|v| v.to_string()).collect();
    println!("{}", values.join(","));

    if let Some(csv) = csv {
        let label = label
            .map(str::to_string)
            .or_else(|| input.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .unwrap_or_else(|| "object".to_string());
        append_csv(csv, &FeatureRecord::new(label.clone(), shape.features))?;
        info!("Appended '{}' to {:?}", label, csv);
    }

    if let Some(annotated) = annotated {
        let source = analyzer
            .image()
            .ok_or_else(|| eyre!("image was not loaded"))?;
        annotate(source, &shape, ANNOTATION_COLOR).save(annotated)?;
        info!("Saved annotated image to {:?}", annotated);
    }

    Ok(())
}

fn run_stage(input: &Path, command: AnalysisCommand, output: &Path, config: Option<&Path>) -> Result<()> {
    let analyzer = analyzer_for(input, config)?;
    info!("Running '{}': {}", command, command.description());

    match analyzer.execute(command)? {
        StageOutput::Image(image) => {
            image.save(output)?;
            info!("Saved {} output to {:?}", command, output);
        }
        StageOutput::Detection(detection) => {
            println!("{}", serde_json::to_string_pretty(&detection)?);
        }
    }
    Ok(())
}

fn print_config(view: ConfigView) -> Result<()> {
    let text = match view {
        ConfigView::Toml => PipelineConfig::default().to_toml()?,
        ConfigView::Json => PipelineConfig::default().to_json()?,
        ConfigView::Schema => serde_json::to_string_pretty(&PipelineConfig::schema())?,
        ConfigView::Commands => serde_json::to_string_pretty(&AnalysisCommand::schema())?,
    };
    println!("{text}");
    Ok(())
}
