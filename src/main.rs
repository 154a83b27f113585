use anyhow::{Context, Error, Result};
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use serde::Serialize;
use std::io::{self, Write};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use ipgeo::config::{self, GeoConfig};
use ipgeo::input::FileOrStdin;
use ipgeo::udf::{Ip4ToBigInt, IpToGeo, ScalarFunction};
use ipgeo::{ip4_to_integer, GeoLookup, GeoTrait, GEO_DATABASE};

/// Check if the error chain contains a broken pipe error.
#[inline(always)]
fn is_broken_pipe(err: &Error) -> bool {
    for cause in err.chain() {
        if let Some(io_err) = cause.downcast_ref::<io::Error>() {
            if io_err.kind() == io::ErrorKind::BrokenPipe {
                return true;
            }
        }
    }
    false
}

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Log filter directive, e.g. "info" or "ipgeo=debug" (default: $RUST_LOG or "warn")
    #[clap(long, global = true, value_name = "FILTER")]
    log_level: Option<String>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Look up a geographic attribute for each address, one address per line
    Geo(GeoArgs),

    /// Convert each dotted-decimal IPv4 address to an integer (-1 if invalid)
    Ip4ToInt(RowArgs),

    /// List the available functions
    Functions {
        /// Print descriptions as JSON
        #[clap(long)]
        json: bool,
    },
}

#[derive(clap::Args, Debug)]
struct RowArgs {
    /// Emit one JSON object per row: {"input": ..., "value": ...}
    #[clap(long)]
    json: bool,

    /// Rows read and evaluated per batch
    #[clap(long, value_name = "N", default_value_t = 8192)]
    batch_size: usize,

    /// Input file(s) to process. Leave empty or use "-" to read from stdin
    #[clap(value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    input: Vec<Utf8PathBuf>,
}

#[derive(clap::Args, Debug)]
struct GeoArgs {
    /// Attribute to look up: country, subdivision, city, or location
    #[clap(short = 't', long = "trait", value_name = "TRAIT")]
    geo_trait: String,

    /// Directory containing GeoIP2-City.mmdb
    #[clap(
        short = 'I',
        long = "include",
        value_name = "DIR",
        value_hint = clap::ValueHint::DirPath,
        env = config::MMDB_DIR_ENV
    )]
    include: Option<Utf8PathBuf>,

    /// Language used for place names
    #[clap(long, env = config::LOCALE_ENV, default_value = config::DEFAULT_LOCALE)]
    locale: String,

    /// Worker threads evaluating rows (default: one per CPU)
    #[clap(long, value_name = "N")]
    threads: Option<usize>,

    #[clap(flatten)]
    rows: RowArgs,
}

#[derive(Serialize)]
struct JsonRow<'a, V> {
    input: &'a str,
    value: V,
}

fn main() -> ExitCode {
    let err = match run_main() {
        Ok(code) => return code,
        Err(err) => err,
    };

    if is_broken_pipe(&err) {
        return ExitCode::SUCCESS;
    }

    if std::env::var("RUST_BACKTRACE").is_ok_and(|v| v == "1")
        && std::env::var("RUST_LIB_BACKTRACE").map_or(true, |v| v == "1")
    {
        let _ = writeln!(&mut io::stderr(), "{:?}", err);
    } else {
        let _ = writeln!(&mut io::stderr(), "{:#}", err);
    }

    ExitCode::FAILURE
}

fn run_main() -> Result<ExitCode> {
    let args = Args::parse();
    init_logging(args.log_level.as_deref())?;

    match args.command {
        Command::Geo(geo) => run_geo(geo)?,
        Command::Ip4ToInt(rows) => run_ip4(rows)?,
        Command::Functions { json } => list_functions(json)?,
    }

    Ok(ExitCode::SUCCESS)
}

fn init_logging(directive: Option<&str>) -> Result<()> {
    let filter = match directive {
        Some(directive) => EnvFilter::try_new(directive)
            .with_context(|| format!("invalid log filter: {}", directive))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
    Ok(())
}

/// Read the inputs in batches of `batch_size` rows and hand each batch to `f`.
fn for_each_batch<F>(inputs: &[Utf8PathBuf], batch_size: usize, mut f: F) -> Result<()>
where
    F: FnMut(&[String]) -> Result<()>,
{
    let stdin = [Utf8PathBuf::from("-")];
    let inputs = if inputs.is_empty() { &stdin[..] } else { inputs };
    let batch_size = batch_size.max(1);
    let mut rows = Vec::with_capacity(batch_size);

    for path in inputs {
        let mut reader = FileOrStdin::from_path(path.clone()).reader()?;
        loop {
            rows.clear();
            let more = reader.fill_rows(&mut rows, batch_size)?;
            if !rows.is_empty() {
                f(&rows)?;
            }
            if !more {
                break;
            }
        }
    }
    Ok(())
}

fn run_geo(args: GeoArgs) -> Result<()> {
    // Reject a bad trait before touching the database or the input.
    let geo_trait: GeoTrait = args.geo_trait.parse()?;

    let config = GeoConfig {
        base_dir: args.include.unwrap_or_else(config::default_base_dir),
        locale: args.locale,
    };
    let lookup = GeoLookup::new(&GEO_DATABASE, config);

    let mut pool = rayon::ThreadPoolBuilder::new();
    if let Some(threads) = args.threads {
        pool = pool.num_threads(threads);
    }
    let pool = pool.build().context("failed to start worker threads")?;

    let mut out = io::BufWriter::with_capacity(65536, io::stdout().lock());
    let json = args.rows.json;

    for_each_batch(&args.rows.input, args.rows.batch_size, |rows| {
        let values: Vec<String> = pool.install(|| {
            rows.par_iter()
                .map(|row| lookup.lookup(geo_trait, Some(row.as_str()), None))
                .collect::<ipgeo::Result<_>>()
        })?;

        for (row, value) in rows.iter().zip(&values) {
            if json {
                serde_json::to_writer(&mut out, &JsonRow { input: row, value })?;
            } else {
                out.write_all(value.as_bytes())?;
            }
            out.write_all(b"\n")?;
        }
        Ok(())
    })?;

    out.flush()?;
    Ok(())
}

fn run_ip4(args: RowArgs) -> Result<()> {
    let mut out = io::BufWriter::with_capacity(65536, io::stdout().lock());
    let mut buf = itoa::Buffer::new();

    for_each_batch(&args.input, args.batch_size, |rows| {
        for row in rows {
            let value = ip4_to_integer(Some(row.as_str()));
            if args.json {
                serde_json::to_writer(&mut out, &JsonRow { input: row, value })?;
            } else {
                out.write_all(buf.format(value).as_bytes())?;
            }
            out.write_all(b"\n")?;
        }
        Ok(())
    })?;

    out.flush()?;
    Ok(())
}

fn list_functions(json: bool) -> Result<()> {
    let descriptions = [Ip4ToBigInt.description(), IpToGeo::global().description()];
    let mut out = io::stdout().lock();

    for desc in &descriptions {
        if json {
            serde_json::to_writer(&mut out, desc)?;
            writeln!(out)?;
        } else {
            writeln!(out, "{}\t{}\t(example: {})", desc.name, desc.usage, desc.example)?;
        }
    }
    Ok(())
}
