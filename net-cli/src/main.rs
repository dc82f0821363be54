use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use net_arxml::{parse_file, ExtractOptions, Extraction};
use net_ir::{BusMessage, MessageKind};

#[derive(Parser)]
#[command(
    name = "arxml-net",
    about = "Extract the communication-network model from an AUTOSAR ARXML system description"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract messages to JSON
    Extract {
        /// Input ARXML file
        input: PathBuf,

        /// Output JSON file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,

        /// Fail on unresolved references instead of skipping them
        #[arg(long)]
        strict: bool,

        /// Enable verbose logging
        #[arg(short, long)]
        verbose: bool,
    },

    /// Summarize the extracted model
    Info {
        /// Input ARXML file
        input: PathBuf,
    },

    /// Extract and check structural consistency
    Validate {
        /// Input ARXML file
        input: PathBuf,

        /// Suppress individual error output
        #[arg(short, long)]
        quiet: bool,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default)).init();
}

fn extract(input: &Path, strict: bool) -> Result<Extraction> {
    let opts = ExtractOptions { strict };
    let extraction = parse_file(input, &opts)
        .with_context(|| format!("extracting from {}", input.display()))?;
    for warning in &extraction.warnings {
        log::warn!("{warning}");
    }
    Ok(extraction)
}

fn run_extract(
    input: &Path,
    output: Option<&Path>,
    pretty: bool,
    strict: bool,
) -> Result<()> {
    let extraction = extract(input, strict)?;

    if let Err(errors) = net_ir::validate_messages(&extraction.messages) {
        for e in &errors {
            log::warn!("Validation: {e}");
        }
    }
    log::info!(
        "Extracted: networks={}, messages={}, warnings={}",
        extraction.networks.len(),
        extraction.messages.len(),
        extraction.warnings.len()
    );

    let json = if pretty {
        serde_json::to_string_pretty(&extraction.messages)?
    } else {
        serde_json::to_string(&extraction.messages)?
    };

    match output {
        Some(path) => std::fs::write(path, json)
            .with_context(|| format!("writing {}", path.display()))?,
        None => println!("{json}"),
    }
    Ok(())
}

fn run_info(input: &Path) -> Result<()> {
    let extraction = extract(input, false)?;

    println!("File: {}", input.display());
    for net in &extraction.networks {
        println!(
            "Network: {} (VLAN {}), {} PDUs",
            net.name,
            net.vlan_id,
            net.pdus.len()
        );
    }

    let mut normal = 0usize;
    let mut secured = 0usize;
    let mut multiplexed = 0usize;
    for msg in &extraction.messages {
        match msg {
            BusMessage::Message(m) if m.kind == MessageKind::Secured => secured += 1,
            BusMessage::Message(_) => normal += 1,
            BusMessage::Multiplex(_) => multiplexed += 1,
        }
    }
    println!("Messages: {normal} normal, {secured} secured, {multiplexed} multiplexed");
    println!("Warnings: {}", extraction.warnings.len());
    Ok(())
}

fn run_validate(input: &Path, quiet: bool) -> Result<()> {
    let extraction = extract(input, false)?;

    match net_ir::validate_messages(&extraction.messages) {
        Ok(()) => {
            println!("OK: {} messages", extraction.messages.len());
            Ok(())
        }
        Err(errors) => {
            if !quiet {
                for e in &errors {
                    eprintln!("error: {e}");
                }
            }
            bail!("{} validation error(s)", errors.len());
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Extract {
            input,
            output,
            pretty,
            strict,
            verbose,
        } => {
            init_logging(verbose);
            run_extract(&input, output.as_deref(), pretty, strict)
        }
        Command::Info { input } => {
            init_logging(false);
            run_info(&input)
        }
        Command::Validate { input, quiet } => {
            init_logging(false);
            run_validate(&input, quiet)
        }
    }
}
