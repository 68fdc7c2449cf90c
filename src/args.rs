use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::cleaner::DEFAULT_MIN_LENGTH;

#[derive(Parser, Debug)]
#[clap(
    author,
    version,
    long_about = "Converts fine-tuning records between JSON, JSONL and Parquet, reshapes them into training templates and cleans or samples source text."
)]
pub struct Cli {
    #[clap(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Convert a JSON array of question/content/reasoning_content records to JSONL
    #[clap(name = "json2jsonl")]
    JsonToJsonl(JsonToJsonlArgs),
    /// Convert JSONL (or a JSON array) to a pretty-printed JSON array
    #[clap(name = "jsonl2json")]
    JsonlToJson(IoArgs),
    /// Convert question/content records to system/user/assistant messages with a loss weight
    Volcengine(VolcengineArgs),
    /// Convert question/content records to translation messages with reasoning
    Translation(TranslationArgs),
    /// Convert Alpaca or question/content records to the instruction/output template
    Alpaca(AlpacaArgs),
    /// Convert JSONL to Parquet
    #[clap(name = "jsonl2parquet")]
    JsonlToParquet(IoArgs),
    /// Convert a Parquet column to a JSON array of questions
    #[clap(name = "parquet2json")]
    ParquetToJson(ParquetToJsonArgs),
    /// Clean, analyze or sample the source column of a Parquet file
    CleanParquet(CleanParquetArgs),
    /// Print the first rows and column types of a Parquet file
    ViewParquet(ViewParquetArgs),
}

#[derive(Args, Debug, Clone)]
pub struct IoArgs {
    #[clap(help = "Input file path", value_hint = clap::ValueHint::FilePath)]
    pub input: PathBuf,
    #[clap(help = "Output file path", value_hint = clap::ValueHint::FilePath)]
    pub output: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct JsonToJsonlArgs {
    #[clap(flatten)]
    pub io: IoArgs,
    #[clap(long, help = "Skip validation of JSON objects and copy them unchanged")]
    pub no_validate: bool,
}

#[derive(Args, Debug, Clone)]
pub struct TemplateArgs {
    #[clap(long, help = "JSON file overriding system_prompt, user_template, reasoning_open or reasoning_close",
    value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct VolcengineArgs {
    #[clap(flatten)]
    pub io: IoArgs,
    #[clap(flatten)]
    pub template: TemplateArgs,
}

#[derive(Args, Debug, Clone)]
pub struct SplitArgs {
    #[clap(
        long,
        default_value_t = 0.0,
        help = "Fraction of data to use as validation (0.0 to 1.0)"
    )]
    pub validation_split: f64,
    #[clap(long, help = "Output JSONL file path for validation data",
    value_hint = clap::ValueHint::FilePath)]
    pub validation_output: Option<PathBuf>,
    #[clap(long, help = "Random seed for reproducible validation splits")]
    pub random_seed: Option<u64>,
}

#[derive(Args, Debug, Clone)]
pub struct TranslationArgs {
    #[clap(flatten)]
    pub io: IoArgs,
    #[clap(long, help = "Exclude reasoning content from the assistant message")]
    pub no_reasoning: bool,
    #[clap(long, help = "Custom system prompt to use")]
    pub system_prompt: Option<String>,
    #[clap(flatten)]
    pub split: SplitArgs,
    #[clap(flatten)]
    pub template: TemplateArgs,
}

#[derive(Args, Debug, Clone)]
pub struct AlpacaArgs {
    #[clap(flatten)]
    pub io: IoArgs,
    #[clap(long, help = "Exclude reasoning content from the output")]
    pub no_reasoning: bool,
    #[clap(long, help = "Custom system prompt to use")]
    pub system_prompt: Option<String>,
    #[clap(flatten)]
    pub split: SplitArgs,
    #[clap(flatten)]
    pub template: TemplateArgs,
}

#[derive(Args, Debug, Clone)]
pub struct ParquetToJsonArgs {
    #[clap(flatten)]
    pub io: IoArgs,
    #[clap(
        long,
        default_value = "source",
        help = "Column to use as question (defaults to \"source\")"
    )]
    pub question_column: String,
}

#[derive(Args, Debug, Clone)]
pub struct CleanParquetArgs {
    #[clap(help = "Input Parquet file path", value_hint = clap::ValueHint::FilePath)]
    pub input: PathBuf,
    #[clap(help = "Output cleaned Parquet file path", value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,
    #[clap(
        short = 'l',
        long,
        default_value_t = DEFAULT_MIN_LENGTH,
        help = "Minimum character length for source text"
    )]
    pub min_length: usize,
    #[clap(
        short,
        long,
        help = "Only analyze the data without performing cleaning or saving"
    )]
    pub dry_run: bool,
    #[clap(short, long, help = "Sample data from specific length ranges")]
    pub sample: bool,
    #[clap(long, default_value_t = 20000, help = "Target size for the sampled dataset")]
    pub sample_size: usize,
}

#[derive(Args, Debug, Clone)]
pub struct ViewParquetArgs {
    #[clap(help = "Path to the Parquet file", value_hint = clap::ValueHint::FilePath)]
    pub file: PathBuf,
    #[clap(short = 'n', long, default_value_t = 10, help = "Number of rows to display")]
    pub rows: usize,
}
