//! `stegoforum` CLI: reads a carrier+payload JSON document and writes the
//! encoded output record as JSON.
//!
//! ```bash
//! stegoforum --input carrier.json --target-angles 3 --output out.json
//! cat carrier.json | stegoforum > out.json
//! ```
//!
//! This binary contains no codec logic of its own — it normalizes the
//! input shapes, threads an [`EncoderConfig`], and serializes whatever
//! [`stegoforum::encode`] returns.

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use clap::Parser;
use serde::Serialize;
use serde_json::Value;

use stegoforum::{
    encode, CarrierInput, CodecError, DocumentFinder, EncoderConfig, OutputRecord, PayloadInput,
};

#[cfg(feature = "http-finder")]
use stegoforum::HttpDocumentFinder;

/// Embeds a payload inside a discussion-thread carrier.
#[derive(Debug, Parser)]
#[command(name = "stegoforum", version, about)]
struct Args {
    /// Path to the input JSON document. Reads stdin when omitted.
    #[arg(long)]
    input: Option<PathBuf>,

    /// How many angles to select; 0 or omitted fills the whole pool.
    #[arg(long = "target-angles")]
    target_angles: Option<usize>,

    /// Optional external document-similarity finder endpoint.
    #[arg(long = "finder-endpoint")]
    finder_endpoint: Option<String>,

    /// Where to write the output record. Writes stdout when omitted.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct ErrorRecord {
    error: String,
    warnings: Vec<String>,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let raw = match read_input(args.input.as_deref()) {
        Ok(raw) => raw,
        Err(e) => {
            log::error!("failed to read input: {e}");
            std::process::exit(1);
        }
    };

    let value: Value = match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            emit_codec_error(&CodecError::InvalidCarrier(e.to_string()), args.output.as_deref());
            std::process::exit(1);
        }
    };

    // The payload rides alongside the carrier in the same document, under
    // its own "payload" key (§6); the carrier's own fields are parsed from
    // the same JSON value, which normalizes either documented top-level
    // shape (§9 "duck-typed optional wrappers").
    let payload_value = value.get("payload").cloned().unwrap_or(Value::Null);
    let payload: PayloadInput = match serde_json::from_value(payload_value) {
        Ok(payload) => payload,
        Err(_) => {
            emit_codec_error(&CodecError::EmptyPayload, args.output.as_deref());
            std::process::exit(1);
        }
    };
    let carrier: CarrierInput = match serde_json::from_value(value) {
        Ok(carrier) => carrier,
        Err(e) => {
            emit_codec_error(&CodecError::InvalidCarrier(e.to_string()), args.output.as_deref());
            std::process::exit(1);
        }
    };

    let mut config = EncoderConfig::default();
    config.finder_endpoint = args.finder_endpoint.clone();

    let finder: Option<Box<dyn DocumentFinder>> = build_finder(&config);
    let finder_ref: Option<&dyn DocumentFinder> = finder.as_deref();

    let carrier = carrier.into_record();
    let payload = payload.into_text();

    match encode(&carrier, &payload, args.target_angles, &config, finder_ref) {
        Ok(record) => write_output(&record, args.output.as_deref()),
        Err(e) => {
            log::error!("encoding failed: {e}");
            emit_codec_error(&e, args.output.as_deref());
            std::process::exit(1);
        }
    }
}

#[cfg(feature = "http-finder")]
fn build_finder(config: &EncoderConfig) -> Option<Box<dyn DocumentFinder>> {
    config
        .finder_endpoint
        .as_ref()
        .map(|endpoint| Box::new(HttpDocumentFinder::new(endpoint.clone())) as Box<dyn DocumentFinder>)
}

#[cfg(not(feature = "http-finder"))]
fn build_finder(_config: &EncoderConfig) -> Option<Box<dyn DocumentFinder>> {
    None
}

fn read_input(path: Option<&std::path::Path>) -> io::Result<String> {
    match path {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn write_output(record: &OutputRecord, path: Option<&std::path::Path>) {
    let json = serde_json::to_string_pretty(record).expect("output record is always serializable");
    write_text(&json, path);
}

fn emit_codec_error(error: &CodecError, path: Option<&std::path::Path>) {
    let record = ErrorRecord {
        error: error.to_string(),
        warnings: Vec::new(),
    };
    let json = serde_json::to_string_pretty(&record).expect("error record is always serializable");
    write_text(&json, path);
}

fn write_text(text: &str, path: Option<&std::path::Path>) {
    match path {
        Some(path) => {
            if let Err(e) = fs::write(path, text) {
                log::error!("failed to write output: {e}");
                std::process::exit(1);
            }
        }
        None => {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            let _ = writeln!(lock, "{text}");
        }
    }
}
