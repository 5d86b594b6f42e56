//! cmdsplice Inspect Binary
//!
//! Decodes a captured Declare Commands packet body, optionally splices
//! synthetic roots into it, and prints the resulting tree.

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use cmdsplice::merge::MergeOutput;
use cmdsplice::protocol::{NodeTable, PROTOCOL_1_19_2};
use cmdsplice::registry::{CommandHolder, RootDescriptor};
use cmdsplice::{Result, SpliceError};
use tracing_subscriber::{fmt, EnvFilter};

/// cmdsplice tree inspector
#[derive(Parser, Debug)]
#[command(name = "cmdsplice-inspect")]
#[command(about = "Decode, splice, and dump a Declare Commands packet body")]
#[command(version)]
struct Args {
    /// File holding the packet body (after the packet id)
    input: PathBuf,

    /// Input is hex text instead of raw bytes
    #[arg(long)]
    hex: bool,

    /// Root command to splice in; repeat for more. `name:child,child`
    /// declares literal children
    #[arg(short, long = "root")]
    roots: Vec<String>,

    /// Escape prefix synthetic roots must start with
    #[arg(short, long, default_value = "!!")]
    prefix: String,

    /// Protocol version to build for
    #[arg(long, default_value_t = PROTOCOL_1_19_2)]
    protocol: i32,

    /// Write the re-encoded body here
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,cmdsplice=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    tracing::info!("cmdsplice-inspect v{}", cmdsplice::VERSION);

    if let Err(e) = run(&args) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let raw = fs::read(&args.input)?;
    let body = if args.hex { decode_hex(&raw)? } else { raw };
    tracing::info!("Read {} byte body from {}", body.len(), args.input.display());

    let mut table = NodeTable::from_bytes(body)?;
    tracing::info!("Decoded {} nodes, root {}", table.len(), table.root);

    if !args.roots.is_empty() {
        let descriptors: Vec<RootDescriptor> =
            args.roots.iter().map(|root| parse_root(root)).collect();
        let output = MergeOutput::build(args.protocol, &descriptors, &args.prefix)?;
        table = output.splice(&table)?;
        tracing::info!("Spliced {} synthetic nodes", output.node_count());
    }

    print!("{}", table.render());

    if let Some(path) = &args.output {
        let bytes = table.to_bytes()?;
        fs::write(path, &bytes)?;
        tracing::info!("Wrote {} bytes to {}", bytes.len(), path.display());
    }
    Ok(())
}

/// `name` or `name:child,child`
fn parse_root(arg: &str) -> RootDescriptor {
    match arg.split_once(':') {
        Some((name, children)) => RootDescriptor::new(name, true).with_holder(CommandHolder::new(
            children.split(',').map(str::trim).filter(|c| !c.is_empty()),
        )),
        None => RootDescriptor::new(arg, true),
    }
}

/// Hex dump to bytes; whitespace and line breaks are ignored
fn decode_hex(raw: &[u8]) -> Result<Vec<u8>> {
    let digits: Vec<u8> = raw.iter().copied().filter(|b| !b.is_ascii_whitespace()).collect();
    hex::decode(digits).map_err(|e| SpliceError::format(format!("invalid hex input: {}", e)))
}
