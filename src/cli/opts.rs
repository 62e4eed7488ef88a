use clap::{value_parser, Parser};
use std::path::PathBuf;

/// Compare two (optionally normalized, optionally base-code-subtracted)
/// token streams with Greedy String Tiling.
#[derive(Parser, Debug)]
#[command(
    name = "simkernel",
    about = "Compare tokenized source submissions for shared structure",
    version = "0.1.0"
)]
pub struct Cli {
    /// First submission's token stream, one JSON token object per line [path]
    #[clap(long, value_parser, required = true, help_heading = "Core")]
    pub first: PathBuf,

    /// Second submission's token stream [path]
    #[clap(long, value_parser, required = true, help_heading = "Core")]
    pub second: PathBuf,

    /// Minimum tile length to report, in tokens [integer]
    #[clap(
        short = 'm',
        long,
        default_value = "9",
        value_parser = value_parser!(u32).range(1..=25),
        help_heading = "Core"
    )]
    pub minimum_token_match: u32,

    /// Shared base/template code stream to subtract before comparing [path]
    #[clap(long, value_parser, help_heading = "Base code")]
    pub base_code: Option<PathBuf>,

    /// Skip the normalization pass (compare raw token order) [flag]
    #[clap(long, help_heading = "Core")]
    pub no_normalize: bool,
}
