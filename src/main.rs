use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use mentions::{ConfigFile, EditorKind, MentionsConfig};

#[derive(Parser, Debug)]
#[command(version, about = "Inspect how the mentions codec reads and writes values")]
struct Cli {
    /// JSON or TOML widget configuration.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Treat the surface as a multi-line textarea.
    #[arg(long, global = true)]
    textarea: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Canonical value to surface markup.
    Render { value: Option<String> },
    /// Surface markup to canonical value.
    Encode { markup: Option<String> },
    /// Effective length of a canonical value.
    Length { value: Option<String> },
    /// Mentions referenced by a canonical value, as JSON.
    Scan { value: Option<String> },
}

/// The argument, or stdin when it is absent or `-`.
fn input(arg: Option<String>) -> anyhow::Result<String> {
    match arg {
        Some(s) if s != "-" => Ok(s),
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            Ok(buf.strip_suffix('\n').map(str::to_string).unwrap_or(buf))
        }
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<MentionsConfig> {
    let mut builder = match &cli.config {
        Some(path) => ConfigFile::load(path)?.into_builder(),
        None => MentionsConfig::builder(),
    };
    if cli.textarea {
        builder = builder.kind(EditorKind::Textarea);
    }
    Ok(builder.build()?)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    log::debug!("{config:?}");

    match cli.command {
        Command::Render { value } => {
            let surface = mentions::render(&input(value)?, &config);
            println!("{}", surface.to_markup());
        }
        Command::Encode { markup } => {
            println!("{}", mentions::encode(&input(markup)?, &config));
        }
        Command::Length { value } => {
            println!("{}", mentions::value_length(&input(value)?, &config));
        }
        Command::Scan { value } => {
            let found = mentions::scan_mentions(&input(value)?, &config);
            println!("{}", serde_json::to_string_pretty(&found)?);
        }
    }
    Ok(())
}
