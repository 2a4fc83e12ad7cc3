use address_core::persistence::{load_snapshot, save_snapshot};
use address_core::{AddressRecord, AddressResolver, ReferencePaths, ResolverConfig};
use anyhow::{bail, Context, Result};
use log::{info, warn};
use serde::Deserialize;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

const SNAPSHOT_FILE: &str = "address_index.bin";

/// One labelled example of an evaluation file.
#[derive(Deserialize)]
struct LabelledAddress {
    text: String,
    result: AddressRecord,
}

struct Args {
    data_dir: PathBuf,
    config: Option<PathBuf>,
    eval: Option<PathBuf>,
}

fn parse_args() -> Result<Args> {
    let mut args = Args { data_dir: PathBuf::from("data"), config: None, eval: None };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => args.config = Some(iter.next().context("--config needs a path")?.into()),
            "--eval" => args.eval = Some(iter.next().context("--eval needs a path")?.into()),
            flag if flag.starts_with("--") => bail!("unknown flag {flag}"),
            dir => args.data_dir = PathBuf::from(dir),
        }
    }
    Ok(args)
}

fn main() -> Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let args = parse_args()?;
    let config = match &args.config {
        Some(path) => ResolverConfig::from_file(path).with_context(|| format!("loading {}", path.display()))?,
        None => ResolverConfig::default(),
    };
    let resolver = open_resolver(&args.data_dir, config);

    match &args.eval {
        Some(path) => evaluate(&resolver, path),
        None => resolve_stdin(&resolver),
    }
}

fn open_resolver(data_dir: &Path, config: ResolverConfig) -> AddressResolver {
    let snapshot = data_dir.join(SNAPSHOT_FILE);
    match load_snapshot(&snapshot) {
        Ok(resolver) if resolver.config == config => return resolver,
        Ok(_) => info!("snapshot was built with a different config, rebuilding"),
        Err(e) => info!("no usable snapshot ({e}), building from reference files"),
    }
    let resolver = AddressResolver::from_reference(&ReferencePaths::in_dir(data_dir), config);
    if let Err(e) = save_snapshot(&resolver, &snapshot) {
        warn!("could not cache index: {e}");
    }
    resolver
}

/// One raw address per input line, one JSON record per output line.
fn resolve_stdin(resolver: &AddressResolver) -> Result<()> {
    let stdin = io::stdin();
    let mut out = BufWriter::new(io::stdout().lock());
    for line in stdin.lock().lines() {
        let line = line?;
        let record = resolver.resolve_record(&line);
        serde_json::to_writer(&mut out, &record)?;
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}

/// Scores the resolver against a JSON list of `{text, result}` examples.
fn evaluate(resolver: &AddressResolver, path: &Path) -> Result<()> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let examples: Vec<LabelledAddress> =
        serde_json::from_reader(BufReader::new(file)).with_context(|| format!("parsing {}", path.display()))?;

    let mut correct = [0usize; 3];
    let mut exact = 0usize;
    let mut slowest = 0u128;
    let started = Instant::now();

    for example in &examples {
        let t = Instant::now();
        let got = resolver.resolve_record(&example.text);
        slowest = slowest.max(t.elapsed().as_micros());

        let hits = [
            got.province == example.result.province,
            got.district == example.result.district,
            got.ward == example.result.ward,
        ];
        for (count, hit) in correct.iter_mut().zip(hits) {
            *count += usize::from(hit);
        }
        if hits.iter().all(|&h| h) {
            exact += 1;
        } else {
            warn!("mismatch for {:?}: expected {:?}, got {:?}", example.text, example.result, got);
        }
    }

    let total = examples.len().max(1) as f64;
    let elapsed = started.elapsed();
    info!(
        "{} examples: province {:.2}%, district {:.2}%, ward {:.2}%, all three {:.2}%",
        examples.len(),
        100.0 * correct[0] as f64 / total,
        100.0 * correct[1] as f64 / total,
        100.0 * correct[2] as f64 / total,
        100.0 * exact as f64 / total
    );
    info!(
        "mean {:.1} µs per address, slowest {} µs",
        elapsed.as_micros() as f64 / total,
        slowest
    );
    Ok(())
}
