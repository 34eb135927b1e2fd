use std::path::PathBuf;

use anyhow::Context;
use clap::{ArgGroup, Parser};

use slotwise_lib::config::{self, PipelineConfig};
use slotwise_lib::models::{InputKind, ProcessInput};

#[derive(Debug, Parser)]
#[command(name = "slotwise", version)]
#[command(about = "Turn an appointment note or a photo of one into a checked department, date and time")]
#[command(group(ArgGroup::new("input").required(true).args(["text", "image"])))]
struct Args {
    /// Appointment request as typed text.
    #[arg(long)]
    text: Option<String>,
    /// Path to a photo or scan of the request (PNG, JPEG, TIFF).
    #[arg(long)]
    image: Option<PathBuf>,
    /// IANA timezone the appointment is expressed in.
    #[arg(long, env = "SLOTWISE_LOCALE", default_value = config::DEFAULT_LOCALE)]
    locale: String,
    /// Print every stage result, not just the outcome.
    #[arg(long, default_value_t = false)]
    report: bool,
}

fn main() -> anyhow::Result<()> {
    slotwise_lib::init_tracing();
    let args = Args::parse();

    tracing::info!("{} v{}", config::APP_NAME, config::APP_VERSION);

    let image_bytes = args
        .image
        .as_ref()
        .map(|path| {
            std::fs::read(path).with_context(|| format!("failed to read image {}", path.display()))
        })
        .transpose()?;
    let kind = if image_bytes.is_some() {
        InputKind::Image
    } else {
        InputKind::Text
    };
    let input = ProcessInput::from_parts(kind, args.text, image_bytes)?;

    let processor = slotwise_lib::build_processor(&PipelineConfig::from_env());

    let json = if args.report {
        serde_json::to_string_pretty(&processor.process_with_report(&input, &args.locale))
    } else {
        serde_json::to_string_pretty(&processor.process(&input, &args.locale))
    }
    .context("failed to serialize result")?;

    println!("{json}");
    Ok(())
}
