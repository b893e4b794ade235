use clap::Parser;
use log::{error, info};

use video2yolo::Args;

fn main() {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if !args.archive.exists() {
        error!(
            "The specified archive does not exist: {}",
            args.archive.display()
        );
        std::process::exit(1);
    }

    info!("Starting the conversion process...");

    match run(&args) {
        Ok(summary) => {
            summary.print_summary();
            info!("Conversion process completed successfully.");
        }
        Err(e) => {
            error!("Failed to process dataset: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(feature = "opencv")]
fn run(args: &Args) -> Result<video2yolo::RunSummary, video2yolo::ConvertError> {
    let backend = video2yolo::OpenCvBackend::new(args.jpeg_quality);
    video2yolo::process_dataset(args, &backend)
}

#[cfg(not(feature = "opencv"))]
fn run(_args: &Args) -> Result<video2yolo::RunSummary, video2yolo::ConvertError> {
    Err(video2yolo::ConvertError::Video(
        "built without the `opencv` feature, no video decoder available".to_string(),
    ))
}
