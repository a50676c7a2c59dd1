use clap::Parser;
use log::{error, info};
use std::path::Path;

use labelmap2coco::{config::Args, convert_dataset};

fn main() {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if !Path::new(&args.ann_dir).exists() {
        error!("The specified ann_dir does not exist: {}", args.ann_dir);
        std::process::exit(1);
    }

    info!(
        "Converting instance label maps in {} using catalog {}",
        args.ann_dir, args.catalog
    );

    match convert_dataset(&args) {
        Ok(summary) => {
            info!(
                "Conversion complete: {} files, {} annotations written to {}",
                summary.files_processed, summary.annotations_written, args.output_json
            );
        }
        Err(e) => {
            error!("Conversion failed: {}", e);
            std::process::exit(1);
        }
    }
}
