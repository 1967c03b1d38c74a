//! diffhunk - inspect unified diffs and extract single-hunk patches.

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use diffhunk::prelude::*;

/// Inspect unified diffs and extract single-hunk patches.
#[derive(Parser, Debug)]
#[command(name = "diffhunk", version, about)]
struct Cli {
    /// Diff file to read (stdin when omitted)
    #[arg(short = 'f', long = "file", value_name = "PATH", global = true)]
    file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the indexed header and hunk regions
    Regions,
    /// Print the diff with projected old/new gutter numbers
    Numbers,
    /// Extract the single-hunk patch covering a line
    Extract {
        /// 0-based document line inside the hunk
        #[arg(short = 'l', long = "line")]
        line: usize,

        /// Apply the extracted patch to the index (git apply --cached)
        #[arg(long)]
        apply: bool,

        /// Apply in reverse (unstage) instead of staging
        #[arg(long, requires = "apply")]
        reverse: bool,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    diffhunk::metrics::init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let doc = read_document(cli.file.as_deref())?;
    let mut view = DiffView::new();

    match cli.command {
        Command::Regions => print_regions(&mut view, &doc),
        Command::Numbers => print_numbers(&mut view, &doc),
        Command::Extract {
            line,
            apply,
            reverse,
        } => extract(&mut view, &doc, line, apply, reverse),
    }
}

fn read_document(file: Option<&std::path::Path>) -> Result<TextDocument> {
    let text = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            buf
        }
    };
    Ok(TextDocument::new(&text))
}

fn print_regions(view: &mut DiffView, doc: &TextDocument) -> Result<()> {
    while view.idle_scan(doc) {}
    let regions: Vec<(RegionId, RegionKind, usize)> = view
        .index()
        .iter()
        .map(|(id, region)| (id, region.kind(), region.line()))
        .collect();
    for (id, kind, line) in regions {
        match kind {
            RegionKind::Header => {
                let hashes = view
                    .header_blob_hashes(doc, id)
                    .map(|(from, to)| format!(" index {from}..{to}"))
                    .unwrap_or_default();
                println!("{line:>6}  header{hashes}");
            }
            RegionKind::Hunk => {
                if let Some(hunk) = view.index().get(id).and_then(|r| r.hunk().copied()) {
                    println!("{line:>6}  hunk -{} +{}", hunk.old_start, hunk.new_start);
                }
            }
        }
    }
    Ok(())
}

fn print_numbers(view: &mut DiffView, doc: &TextDocument) -> Result<()> {
    let numbers = view.project_line_numbers(doc, 0..doc.line_count());
    let width = view.gutter_width();
    for (line, nums) in numbers.iter().enumerate() {
        let old = nums.old.map(|n| n.to_string()).unwrap_or_default();
        let new = nums.new.map(|n| n.to_string()).unwrap_or_default();
        let text = doc.line_text(line).unwrap_or("");
        println!("{old:>width$} {new:>width$} {text}");
    }
    Ok(())
}

fn extract(
    view: &mut DiffView,
    doc: &TextDocument,
    line: usize,
    apply: bool,
    reverse: bool,
) -> Result<()> {
    let patch = view
        .extract_patch(doc, line)
        .with_context(|| format!("line {line} is not inside a visible hunk"))?;
    if apply {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        let mode = if reverse {
            ApplyMode::Unstage
        } else {
            ApplyMode::Stage
        };
        GitApplier::new(cwd)
            .apply(&patch, mode)
            .context("git apply rejected the patch")?;
    } else {
        print!("{patch}");
    }
    Ok(())
}
