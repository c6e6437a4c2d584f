use clap::{Args, Parser, Subcommand};
use colored::*;
use std::path::PathBuf;

use snipcheck_lib::exit_codes;
use snipcheck_lib::output::OutputFormat;

mod commands;

#[derive(Parser)]
#[command(name = "snipcheck", author, version, about, long_about = None)]
struct Cli {
    /// Show debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile the snippets in Markdown files and report diagnostics
    Check(CheckArgs),
    /// Show the effective configuration as TOML
    Config {
        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Show the built-in defaults instead of the loaded configuration
        #[arg(long)]
        defaults: bool,
    },
    /// Print the JSON schema of the configuration file
    Schema,
}

#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// Files or directories to check (default: current directory)
    #[arg(required = false)]
    pub paths: Vec<PathBuf>,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Compiler binary, overriding `[compiler] command`
    #[arg(long)]
    pub compiler: Option<String>,

    /// Directory for staged snippet files, overriding `staging-dir`
    #[arg(long)]
    pub staging_dir: Option<PathBuf>,

    /// Output format: text, concise, json, github
    #[arg(short, long, default_value = "text")]
    pub output_format: OutputFormat,

    /// Walk into directories without honouring .gitignore
    #[arg(long)]
    pub no_respect_gitignore: bool,

    /// Only print diagnostics
    #[arg(short, long)]
    pub quiet: bool,
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Check(args) => commands::check::handle_check(&args),
        Commands::Config { config, defaults } => commands::config::handle_config(config.as_deref(), defaults),
        Commands::Schema => commands::schema::handle_schema(),
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{}: {e:#}", "Error".red().bold());
            exit_codes::exit::tool_error();
        }
    }
}
