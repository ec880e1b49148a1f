//! pushwatch - decide which files of a repository push deserve an alert.
//!
//! # Commands
//!
//! - `pushwatch check` - Check a push body against a rule config
//! - `pushwatch validate` - Parse a rule config and summarize it
//! - `pushwatch sign` - Compute an `X-Hub-Signature` value for a body
//! - `pushwatch completions` - Generate shell completions

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use colored::Colorize;
use pushwatch_core::{Algorithm, ParseMode};
use pushwatch_log::Level;
use std::io;
use std::path::PathBuf;

mod commands;
mod error;
mod sink;

use commands::{check, sign, validate};
use error::CliResult;

/// pushwatch - push webhook filter
#[derive(Parser)]
#[command(name = "pushwatch")]
#[command(author = "Pegasus Heavy Industries LLC")]
#[command(version)]
#[command(about = "Filter repository pushes through a rule config and report watched changes")]
#[command(long_about = None)]
#[command(propagate_version = true)]
#[command(after_help = format!(
    "{}\n  {} pushwatch check --rules rules.txt --payload push.json --signature sha1=...\n  {} pushwatch validate --rules https://example.com/rules.txt\n  {} pushwatch sign --secret s3cret --payload push.json",
    "Examples:".bright_cyan().bold(),
    "$".dimmed(),
    "$".dimmed(),
    "$".dimmed(),
))]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a push body against a rule config
    #[command(alias = "c")]
    Check(CheckArgs),

    /// Parse a rule config and summarize it
    #[command(alias = "v")]
    Validate(ValidateArgs),

    /// Sign a body with a shared secret
    Sign(SignArgs),

    /// Generate shell completions
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args)]
struct CheckArgs {
    /// Rule config location (file path, file:// or http(s):// URL)
    #[arg(short, long, env = "PUSHWATCH_RULES")]
    rules: Option<String>,

    /// Push body file; reads stdin when omitted or `-`
    #[arg(short, long)]
    payload: Option<PathBuf>,

    /// Signature header value, e.g. `sha1=<hex>`
    #[arg(short, long, env = "PUSHWATCH_SIGNATURE")]
    signature: Option<String>,

    /// Settings file (.toml or .json)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Skip bad config lines instead of failing
    #[arg(long)]
    lenient: bool,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ValidateArgs {
    /// Rule config location (file path, file:// or http(s):// URL)
    #[arg(short, long, env = "PUSHWATCH_RULES")]
    rules: Option<String>,

    /// Settings file (.toml or .json)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Skip bad config lines instead of failing
    #[arg(long)]
    lenient: bool,
}

#[derive(Args)]
struct SignArgs {
    /// Shared secret
    #[arg(long, env = "PUSHWATCH_SECRET", hide_env_values = true)]
    secret: String,

    /// Digest: sha1, sha256, sha384 or sha512
    #[arg(short, long, default_value = "sha1")]
    algorithm: Algorithm,

    /// Body file; reads stdin when omitted or `-`
    #[arg(short, long)]
    payload: Option<PathBuf>,
}

fn parse_mode(lenient: bool) -> ParseMode {
    if lenient {
        ParseMode::Lenient
    } else {
        ParseMode::Strict
    }
}

fn success(msg: &str) {
    println!("  {} {}", "✓".green().bold(), msg.green());
}

fn warn(msg: &str) {
    println!("  {} {}", "⚠".yellow().bold(), msg.yellow());
}

fn info(msg: &str) {
    println!("  {} {}", "→".cyan(), msg);
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Handle color preferences
    if cli.no_color {
        colored::control::set_override(false);
        pushwatch_log::set_color(false);
    }

    if cli.quiet {
        pushwatch_log::set_level(Level::Error);
    } else if cli.verbose {
        pushwatch_log::set_level(Level::Debug);
        pushwatch_log::set_debug(true);
    }
    pushwatch_log::tracing_compat::install();

    let result: CliResult<()> = match cli.command {
        Commands::Check(args) => {
            check::execute(check::CheckOptions {
                rules: args.rules.as_deref(),
                payload: args.payload.as_deref(),
                signature: args.signature.as_deref(),
                settings: args.settings.as_deref(),
                mode: parse_mode(args.lenient),
                json: args.json,
            })
            .await
        }

        Commands::Validate(args) => {
            validate::execute(
                args.rules.as_deref(),
                args.settings.as_deref(),
                parse_mode(args.lenient),
            )
            .await
        }

        Commands::Sign(args) => {
            sign::execute(&args.secret, args.algorithm, args.payload.as_deref())
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "pushwatch", &mut io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("\n  {} {}\n", "Error:".red().bold(), e);
        std::process::exit(1);
    };
}
