use address_core::core::engine::Resolution;
use address_core::core::types::Category;
use address_core::persistence::{load_snapshot, save_snapshot};
use address_core::{AddressResolver, ReferencePaths, ResolverConfig};
use anyhow::{Context, Result};
use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::style::Stylize;
use crossterm::terminal::{Clear, ClearType};
use log::warn;
use std::io::{stdin, stdout, Write};
use std::path::{Path, PathBuf};

const SNAPSHOT_FILE: &str = "address_index.bin";
const CONFIG_FILE: &str = "resolver.json";

fn main() -> Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let data_dir = std::env::args().nth(1).map(PathBuf::from).unwrap_or_else(|| PathBuf::from("data"));
    let resolver = open_resolver(&data_dir)?;

    let mut out = stdout();
    execute!(out, Clear(ClearType::All), MoveTo(0, 0))?;
    println!("{}", "Vietnamese Address Resolver".bold());
    println!("---------------------------------------------------------------");
    println!("Type an address and press [Enter]. '?<prefix>' lists matching names.");
    println!("'exit' quits.\n");

    loop {
        print!("{} ", ">".cyan());
        out.flush()?;

        let mut input = String::new();
        if stdin().read_line(&mut input)? == 0 {
            break;
        }
        match input.trim() {
            "exit" => break,
            "" => continue,
            s if s.starts_with('?') => print_suggestions(&resolver, &s[1..]),
            s => print_resolution(&resolver.explain(s)),
        }
    }
    Ok(())
}

/// Loads the cached index from `data_dir`, or builds it from the reference
/// files there and caches it for the next start.
fn open_resolver(data_dir: &Path) -> Result<AddressResolver> {
    let snapshot = data_dir.join(SNAPSHOT_FILE);
    if snapshot.exists() {
        match load_snapshot(&snapshot) {
            Ok(resolver) => return Ok(resolver),
            Err(e) => warn!("ignoring snapshot {}: {e}", snapshot.display()),
        }
    }

    let config_path = data_dir.join(CONFIG_FILE);
    let config = if config_path.exists() {
        ResolverConfig::from_file(&config_path).with_context(|| format!("loading {}", config_path.display()))?
    } else {
        ResolverConfig::default()
    };

    let resolver = AddressResolver::from_reference(&ReferencePaths::in_dir(data_dir), config);
    if let Err(e) = save_snapshot(&resolver, &snapshot) {
        warn!("could not cache index: {e}");
    }
    Ok(resolver)
}

fn print_resolution(resolution: &Resolution) {
    println!("  normalized: {}", resolution.normalized.as_str().dim());
    for category in [Category::Province, Category::District, Category::Ward] {
        let label = format!("{:>9}:", category.as_str());
        match resolution.result.get(category) {
            Some(name) => println!("  {} {}", label, name.green().bold()),
            None => println!("  {} {}", label, "-".red()),
        }
    }
    println!(
        "  {}",
        format!("{} candidates, score {:.2}", resolution.candidates.len(), resolution.selection.score).dim()
    );
    println!();
}

fn print_suggestions(resolver: &AddressResolver, prefix: &str) {
    for category in [Category::Province, Category::District, Category::Ward] {
        let names = resolver.suggest(category, prefix);
        if names.is_empty() {
            continue;
        }
        let shown: Vec<&str> = names.into_iter().take(8).collect();
        println!("  {:>9}: {}", category.as_str(), shown.join(", "));
    }
    println!();
}
