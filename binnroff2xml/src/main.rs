//! nroff2xml command-line tool for converting nroff RFC manuscripts to
//! xml2rfc XML.
//!
//! Usage: nroff2xml [OPTIONS] <FILE|DIR>
//!
//! Options:
//!   -o, --output <FILE>      Write output to the specified file
//!       --stdout             Write output to standard output
//!       --check              Check that the file converts (exit 0 if valid, 1 if not)
//!       --bibxml-url <URL>   Base URL for RFC reference entities
//!   -v, --verbose            Log more detail (repeatable)
//!   -q, --quiet              Log warnings and errors only
//!   -h, --help               Print help
//!   -V, --version            Print version

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::Context;
use clap::{ArgAction, Parser};
use libnroff2xml::{check, convert_with_options, Options, DEFAULT_BIBXML_URL};
use log::LevelFilter;

/// Extension of nroff manuscripts.
const SOURCE_EXTENSION: &str = "nroff";
/// Extension of generated documents.
const TARGET_EXTENSION: &str = "xml";

#[derive(Parser, Debug)]
#[command(name = "nroff2xml", version)]
#[command(about = "Convert nroff RFC manuscripts to xml2rfc XML", long_about = None)]
struct Args {
    /// Input file, or a directory whose .nroff files are all converted
    #[arg(value_name = "FILE|DIR")]
    input: PathBuf,

    /// Output file [default: input with .nroff replaced by .xml]
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Write output to standard output
    #[arg(long, conflicts_with = "output")]
    stdout: bool,

    /// Check that the input converts without writing anything
    #[arg(long, conflicts_with_all = ["output", "stdout"])]
    check: bool,

    /// Base URL for RFC reference entities
    #[arg(long, value_name = "URL", default_value = DEFAULT_BIBXML_URL)]
    bibxml_url: String,

    /// Log more detail (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Log warnings and errors only
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn main() {
    let args = Args::parse();
    init_logging(&args);

    let exit_code = if args.input.is_dir() {
        process_directory(&args)
    } else {
        report(
            &args.input,
            process_file(&args.input, args.output.as_deref(), &args),
        )
    };
    process::exit(exit_code);
}

fn init_logging(args: &Args) {
    let level = if args.quiet {
        LevelFilter::Warn
    } else {
        match args.verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .format_target(false)
        .init();
}

/// Log a failed conversion and map the outcome to an exit code.
fn report(path: &Path, result: anyhow::Result<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            log::error!("{}: {:#}", path.display(), e);
            1
        }
    }
}

fn process_directory(args: &Args) -> i32 {
    if args.output.is_some() {
        log::error!("--output cannot be used with directory input");
        return 1;
    }

    let entries = match fs::read_dir(&args.input) {
        Ok(entries) => entries,
        Err(e) => {
            log::error!("Error reading directory {}: {}", args.input.display(), e);
            return 1;
        }
    };

    let mut paths: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| has_source_extension(path))
        .collect();
    paths.sort();

    if paths.is_empty() {
        log::warn!("No .{} files found in {}", SOURCE_EXTENSION, args.input.display());
    }

    let mut had_errors = false;
    for path in &paths {
        if report(path, process_file(path, None, args)) != 0 {
            had_errors = true;
        }
    }
    if had_errors {
        1
    } else {
        0
    }
}

fn process_file(input: &Path, output: Option<&Path>, args: &Args) -> anyhow::Result<()> {
    let source = fs::read_to_string(input)
        .with_context(|| format!("Error reading {}", input.display()))?;

    let options = options_for(input, args);

    if args.check {
        check(&source, &options)?;
        println!("{}: ok", input.display());
        return Ok(());
    }

    let xml = convert_with_options(&source, &options)?;

    if args.stdout {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(xml.as_bytes())
            .context("Error writing to stdout")?;
        return Ok(());
    }

    let output_path = match output {
        Some(path) => path.to_path_buf(),
        None => default_output_path(input),
    };
    log::info!(
        "Writing XML output ({} bytes) to {}",
        xml.len(),
        output_path.display()
    );
    fs::write(&output_path, xml)
        .with_context(|| format!("Error writing {}", output_path.display()))?;
    Ok(())
}

fn options_for(input: &Path, args: &Args) -> Options {
    let mut options = Options::default().with_bibxml_url(args.bibxml_url.as_str());
    if let Some(name) = input.file_name() {
        options = options.with_source_name(name.to_string_lossy());
    }
    if let Some(stem) = input.file_stem() {
        options = options.with_doc_name(stem.to_string_lossy());
    }
    options
}

fn has_source_extension(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == SOURCE_EXTENSION)
}

/// Replace a `.nroff` extension with `.xml`; append `.xml` to anything else.
fn default_output_path(input: &Path) -> PathBuf {
    if has_source_extension(input) {
        return input.with_extension(TARGET_EXTENSION);
    }
    let mut name = input.as_os_str().to_owned();
    name.push(".");
    name.push(TARGET_EXTENSION);
    PathBuf::from(name)
}
