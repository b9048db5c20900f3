// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! wirelay - encode and decode binary records against a schema document.
//!
//! ```text
//! wirelay check  telemetry.yaml
//! wirelay encode telemetry.yaml --input sample.json --hex
//! wirelay decode telemetry.yaml --input sample.bin
//! ```

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use wirelay::{Endian, Schema, Value};

#[derive(Parser)]
#[command(name = "wirelay")]
#[command(about = "Schema-driven binary codec")]
#[command(version)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    /// Override the document's byte order (BE or LE)
    #[arg(long, global = true, value_name = "ORDER")]
    endian: Option<Endian>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and validate a schema document
    Check {
        /// Schema document (YAML, or JSON with a .json extension)
        #[arg(value_name = "SCHEMA")]
        schema: PathBuf,
    },

    /// Encode a JSON value
    Encode {
        #[arg(value_name = "SCHEMA")]
        schema: PathBuf,

        /// JSON input file (stdin if omitted)
        #[arg(short, long, value_name = "FILE")]
        input: Option<PathBuf>,

        /// Output file (stdout if omitted)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Write hex text instead of raw bytes
        #[arg(long)]
        hex: bool,
    },

    /// Decode bytes and print the JSON value
    Decode {
        #[arg(value_name = "SCHEMA")]
        schema: PathBuf,

        /// Byte input file (stdin if omitted)
        #[arg(short, long, value_name = "FILE")]
        input: Option<PathBuf>,

        /// Read hex text instead of raw bytes
        #[arg(long)]
        hex: bool,

        /// Report the fields decoded before the first failing field
        #[arg(long)]
        collect_errors: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = cli.log_level.parse().unwrap_or(tracing::Level::WARN);
    tracing_subscriber::fmt()
        .with_max_level(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Commands::Check { schema } => cmd_check(&schema, cli.endian),
        Commands::Encode {
            schema,
            input,
            output,
            hex,
        } => cmd_encode(&schema, cli.endian, input.as_deref(), output.as_deref(), hex),
        Commands::Decode {
            schema,
            input,
            hex,
            collect_errors,
        } => cmd_decode(&schema, cli.endian, input.as_deref(), hex, collect_errors),
    }
}

fn load_schema(path: &Path, endian: Option<Endian>) -> anyhow::Result<Schema> {
    let mut schema =
        Schema::load(path).with_context(|| format!("loading schema {}", path.display()))?;
    if let Some(endian) = endian {
        schema.set_endian(endian);
    }
    info!(
        "Loaded {} ({} fields, {})",
        path.display(),
        schema.fields().len(),
        schema.default_endian()
    );
    Ok(schema)
}

fn read_input(input: Option<&Path>) -> anyhow::Result<Vec<u8>> {
    match input {
        Some(path) => fs::read(path).with_context(|| format!("reading {}", path.display())),
        None => {
            let mut buf = Vec::new();
            io::stdin()
                .read_to_end(&mut buf)
                .context("reading stdin")?;
            Ok(buf)
        }
    }
}

fn cmd_check(path: &Path, endian: Option<Endian>) -> anyhow::Result<()> {
    let schema = load_schema(path, endian)?;
    let registry = schema.registry();

    println!("[OK] {}", path.display());
    println!("  endian: {}", schema.default_endian());
    println!("  fields:");
    for field in schema.fields() {
        println!("    {}", field);
    }
    for name in registry.composite_names() {
        if let Some(composite) = registry.composite(name) {
            println!("  type {} ({} fields)", name, composite.fields.len());
        }
    }
    for name in registry.variant_names() {
        if let Some(variant) = registry.variant(name) {
            println!(
                "  variant {} (index {}, {} branches)",
                name,
                variant.index_type,
                variant.branches.len()
            );
        }
    }
    Ok(())
}

fn cmd_encode(
    path: &Path,
    endian: Option<Endian>,
    input: Option<&Path>,
    output: Option<&Path>,
    hex: bool,
) -> anyhow::Result<()> {
    let schema = load_schema(path, endian)?;
    let raw = read_input(input)?;
    let json: serde_json::Value = serde_json::from_slice(&raw).context("parsing JSON input")?;

    let bytes = schema.encode(&Value::from(json))?;
    debug!("Encoded {} bytes", bytes.len());

    let payload = if hex {
        let mut text = to_hex(&bytes);
        text.push('\n');
        text.into_bytes()
    } else {
        bytes
    };

    match output {
        Some(out) => {
            fs::write(out, &payload).with_context(|| format!("writing {}", out.display()))?;
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(&payload)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

fn cmd_decode(
    path: &Path,
    endian: Option<Endian>,
    input: Option<&Path>,
    hex: bool,
    collect_errors: bool,
) -> anyhow::Result<()> {
    let mut schema = load_schema(path, endian)?;
    let raw = read_input(input)?;
    let bytes = if hex {
        let text = String::from_utf8(raw).context("hex input is not text")?;
        from_hex(&text)?
    } else {
        raw
    };

    schema.set_forced_error_collection(collect_errors);
    let report = schema.decode_report(&bytes)?;
    if report.consumed < bytes.len() && report.is_complete() {
        debug!("{} trailing bytes ignored", bytes.len() - report.consumed);
    }

    let failure = report.failure.clone();
    let record = serde_json::Value::from(Value::Record(report.fields));
    println!("{}", serde_json::to_string_pretty(&record)?);

    if let Some(failure) = failure {
        eprintln!("[FAIL] field '{}': {}", failure.key, failure.error);
        bail!("decode stopped at field '{}'", failure.key);
    }
    Ok(())
}

fn to_hex(bytes: &[u8]) -> String {
    use std::fmt::Write as _;
    let mut text = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(text, "{:02x}", b);
    }
    text
}

fn from_hex(text: &str) -> anyhow::Result<Vec<u8>> {
    let digits: Vec<char> = text.chars().filter(|c| !c.is_whitespace()).collect();
    if digits.len() % 2 != 0 {
        bail!("hex input has an odd number of digits");
    }
    digits
        .chunks(2)
        .map(|pair| {
            let hi = pair[0].to_digit(16);
            let lo = pair[1].to_digit(16);
            match (hi, lo) {
                (Some(hi), Some(lo)) => Ok((hi * 16 + lo) as u8),
                _ => bail!("invalid hex digit in {:?}", pair.iter().collect::<String>()),
            }
        })
        .collect()
}
