use std::path::PathBuf;

use clap::Parser;

use crate::generators::Generator;

#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    #[arg(help = "The schema file or an http(s) URL")]
    pub input: String,

    #[arg(default_value = "generated", help = "Directory the generated files are written to")]
    pub output_dir: PathBuf,

    #[arg(
        long,
        default_value = "Generated",
        help = "Namespace wrapping the generated code; empty to disable"
    )]
    pub namespace: String,

    #[arg(long, value_enum, default_value_t = Generator::default())]
    pub generator: Generator,

    #[arg(long, help = "Allow a XML Document Type Definition (DTD) to occur")]
    pub allow_dtd: bool,

    #[arg(long, short, help = "Do not print the summary")]
    pub quiet: bool,
}
