use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "phar-stub")]
#[command(author, version, about = "Generate bootstrap stubs for self-executing PHP archives")]
pub struct Cli {
    /// Log progress to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render a stub from box.toml/box.json and command-line flags
    Generate(GenerateArgs),

    /// Strip comments and redundant whitespace from a PHP file
    Compact {
        /// PHP source file
        input: PathBuf,
    },

    /// Print the embedded self-extraction helper as it appears in stubs
    ExtractCode,
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Config file (defaults to box.toml or box.json in the current directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Alias the archive registers itself under
    #[arg(short, long)]
    pub alias: Option<String>,

    /// Banner text rendered as the leading comment block
    #[arg(long)]
    pub banner: Option<String>,

    /// Shebang line (pass an empty string to omit it)
    #[arg(long)]
    pub shebang: Option<String>,

    /// Embed the self-extraction fallback
    #[arg(long, overrides_with = "no_extract")]
    pub extract: bool,

    /// Leave out the self-extraction fallback even if the config enables it
    #[arg(long, overrides_with = "extract")]
    pub no_extract: bool,

    /// Intercept file functions so paths resolve inside the archive
    #[arg(long, overrides_with = "no_intercept")]
    pub intercept: bool,

    /// Disable file function interception even if the config enables it
    #[arg(long, overrides_with = "intercept")]
    pub no_intercept: bool,

    /// Entry point script inside the archive
    #[arg(short, long)]
    pub index: Option<String>,

    /// Script invoked for missing web resources
    #[arg(long)]
    pub not_found: Option<String>,

    /// Function used to rewrite incoming web paths
    #[arg(long)]
    pub rewrite: Option<String>,

    /// Register the archive as a web front controller
    #[arg(long, overrides_with = "no_web")]
    pub web: bool,

    /// Register with mapPhar even if the config enables web serving
    #[arg(long, overrides_with = "web")]
    pub no_web: bool,

    /// MIME mapping as EXT=TYPE, where TYPE is php, phps or a content type (repeatable)
    #[arg(long = "mimetype", value_name = "EXT=TYPE")]
    pub mimetypes: Vec<String>,

    /// $_SERVER variable to munge (repeatable)
    #[arg(long)]
    pub mung: Vec<String>,

    /// Write the stub to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
