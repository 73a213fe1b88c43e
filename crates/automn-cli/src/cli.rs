use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

/// Toolchain for the automn schema definition language.
///
/// Parses indentation-structured schema files describing models, enums and
/// functions, reports precise diagnostics, and rewrites files in canonical
/// form.
#[derive(Parser)]
#[command(
    name = "automn",
    version,
    about = "Parser and formatter for the automn schema language",
    after_help = "Use 'automn <command> --help' for more information about a command.",
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Global options available to all subcommands.
#[derive(Args, Debug)]
pub struct GlobalOpts {
    /// Configuration file path [env: AUTOMN_CONFIG]
    #[arg(short = 'c', long = "config", global = true, env = "AUTOMN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format: human (default), json, plain
    #[arg(
        long,
        global = true,
        default_value = "human",
        value_parser = ["human", "json", "plain"]
    )]
    pub format: String,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long = "verbose", global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all non-error output
    #[arg(short = 'q', long = "quiet", global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output [env: NO_COLOR]
    #[arg(long = "no-color", global = true, env = "NO_COLOR", value_parser = clap::builder::FalseyValueParser::new())]
    pub no_color: bool,

    /// Columns a tab counts for in indentation (overrides config)
    #[arg(long = "tab-width", global = true, value_parser = clap::value_parser!(u8).range(1..=16))]
    pub tab_width: Option<u8>,
}

/// Top-level subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Parse and validate schema files
    Parse(ParseArgs),

    /// Dump the token stream of a schema file
    Tokens(TokensArgs),

    /// Rewrite schema files in canonical form
    Fmt(FmtArgs),

    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}

/// Arguments for `automn parse`.
#[derive(Args)]
pub struct ParseArgs {
    /// Schema files or directories to parse (default: [cli] source_dir)
    pub paths: Vec<PathBuf>,

    /// Print the parsed files as canonical DSL
    #[arg(long = "print", conflicts_with_all = ["tree", "json_ast"])]
    pub print: bool,

    /// Print the S-expression tree of each file
    #[arg(long = "tree", conflicts_with = "json_ast")]
    pub tree: bool,

    /// Print the syntax tree of each file as JSON
    #[arg(long = "json-ast")]
    pub json_ast: bool,
}

/// Arguments for `automn tokens`.
#[derive(Args)]
pub struct TokensArgs {
    /// Schema file to tokenize
    pub file: PathBuf,
}

/// Arguments for `automn fmt`.
#[derive(Args)]
pub struct FmtArgs {
    /// Schema files or directories to format (default: [cli] source_dir)
    pub paths: Vec<PathBuf>,

    /// Report files that are not formatted instead of rewriting them
    #[arg(long = "check")]
    pub check: bool,
}

/// Arguments for `automn completions`.
#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_parser = ["bash", "zsh", "fish", "powershell", "elvish"])]
    pub shell: String,
}
