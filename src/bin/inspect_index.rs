//! Print an overview of a stored case index (`data.json`).

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use nwpcat::catalog::format_hm;
use nwpcat::store::CaseData;

#[derive(Parser, Debug)]
#[command(name = "inspect_index")]
#[command(about = "Inspect a stored nwpcat case index")]
struct Args {
    /// Path to a case's data.json
    file: PathBuf,

    /// Only show this host
    #[arg(short = 'H', long)]
    host: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let content = std::fs::read_to_string(&args.file)
        .with_context(|| format!("reading {}", args.file.display()))?;
    let data: CaseData = serde_json::from_str(&content)
        .with_context(|| format!("parsing {}", args.file.display()))?;

    println!("Inspecting index: {}", args.file.display());

    for (host, experiments) in &data {
        if args.host.as_deref().is_some_and(|wanted| wanted != host) {
            continue;
        }
        println!("\nHost: {}", host);

        for (experiment, index) in experiments {
            println!("  {}", experiment);
            if index.is_empty() {
                println!("    (no files indexed)");
            }
            for (file_template, dates) in index.iter() {
                let leadtimes = dates.values().flat_map(|l| l.iter().copied());
                let (first, last) = leadtimes.fold((None, None), |(lo, hi): (Option<u64>, Option<u64>), l| {
                    (Some(lo.map_or(l, |lo| lo.min(l))), Some(hi.map_or(l, |hi| hi.max(l))))
                });
                let files: usize = dates.values().map(|l| l.len()).sum();

                println!("    {}", file_template);
                println!(
                    "      dates: {} ({} - {})",
                    dates.len(),
                    dates.keys().next().map(String::as_str).unwrap_or("-"),
                    dates.keys().next_back().map(String::as_str).unwrap_or("-"),
                );
                if let (Some(first), Some(last)) = (first, last) {
                    println!("      leadtimes: {} - {}", format_hm(first), format_hm(last));
                }
                println!("      files: {}", files);
            }
        }
    }

    Ok(())
}
