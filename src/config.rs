use clap::Parser;

/// Command-line arguments for converting instance label maps to a COCO JSON dataset.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Directory containing the instance label-map PNG files
    #[arg(
        short = 'a',
        long = "ann_dir",
        default_value = "./annotations_instance/validation"
    )]
    pub ann_dir: String,

    /// Path to the catalog JSON file mapping image file names to ids and categories
    #[arg(short = 'c', long = "catalog", default_value = "../imgCatIds.json")]
    pub catalog: String,

    /// Path of the output JSON dataset file
    #[arg(
        short = 'o',
        long = "output_json",
        default_value = "./instance_validation_gts.json"
    )]
    pub output_json: String,
}
