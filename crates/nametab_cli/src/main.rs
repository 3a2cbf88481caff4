use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use nametab_core::{
    render_dump, save_export, save_report, NameTable, Probe, TableStats,
};
use nametab_gen::write_corpus;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "nametab", about = "Nametab CLI — name-keyed probing table")]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Generate a corpus of synthetic records.
    Gen {
        #[arg(long)]
        out: PathBuf,
        #[arg(long)]
        count: usize,
        /// RNG seed; drawn from entropy when omitted.
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Build a table from a corpus file and report on it.
    Load {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value_t = 10)]
        capacity: usize,
        /// Write the live records here, in slot order.
        #[arg(long)]
        export: Option<PathBuf>,
        /// Write the framed report here instead of stdout.
        #[arg(long)]
        report_file: Option<PathBuf>,
        /// Print the stats snapshot as JSON instead of the framed report.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Interactive session: generate, load, delete, search, report.
    Run {
        /// Table capacity; prompted for when omitted.
        #[arg(long)]
        capacity: Option<usize>,
        /// Corpus size; defaults to the capacity.
        #[arg(long)]
        count: Option<usize>,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, default_value = "data")]
        out_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Gen { out, count, seed } => {
            let seed = seed.unwrap_or_else(rand::random);
            write_corpus(&out, seed, count)
                .with_context(|| format!("write corpus {}", out.display()))?;
            println!("gen: {} records -> {} (seed {seed})", count, out.display());
        }
        Cmd::Load {
            input,
            capacity,
            export,
            report_file,
            json,
        } => {
            let table = load_table(&input, capacity)?;
            if let Some(path) = export {
                let path = save_export(&table, path)?;
                println!("export: {}", path.display());
            }
            if json {
                let stats = TableStats::collect(&table);
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else if let Some(path) = report_file {
                let path = save_report(&table, path, None)?;
                println!("report: {}", path.display());
            } else {
                render_dump(&table, &mut io::stdout().lock())?;
            }
        }
        Cmd::Run {
            capacity,
            count,
            seed,
            out_dir,
        } => run_session(capacity, count, seed, &out_dir)?,
    }
    Ok(())
}

/// Insert every non-empty corpus line; empty lines still consume a line
/// number so stored ordinals match the source file.
fn load_table(input: &Path, capacity: usize) -> Result<NameTable> {
    let file = File::open(input).with_context(|| format!("open {}", input.display()))?;
    let mut table = NameTable::with_capacity(capacity);
    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        table
            .insert(&line, idx + 1)
            .with_context(|| format!("corpus line {}", idx + 1))?;
    }
    Ok(table)
}

fn run_session(
    capacity: Option<usize>,
    count: Option<usize>,
    seed: Option<u64>,
    out_dir: &Path,
) -> Result<()> {
    std::fs::create_dir_all(out_dir)?;
    let stdin = io::stdin();
    let mut input = stdin.lock().lines();

    let capacity = match capacity {
        Some(c) => c,
        None => prompt_number(&mut input, "Table size: ")?,
    };
    let count = count.unwrap_or(capacity);
    let seed = seed.unwrap_or_else(rand::random);

    let corpus_path = out_dir.join("data.txt");
    write_corpus(&corpus_path, seed, count)?;
    let mut table = load_table(&corpus_path, capacity)?;
    println!(
        "loaded {} records (capacity {}, seed {seed})",
        table.len(),
        table.capacity()
    );

    let export_path = save_export(&table, out_dir.join("output.txt"))?;

    let deletions = prompt_number(&mut input, "How many lines to delete? ")?;
    for i in 0..deletions {
        let line = prompt_line(&mut input, &format!("Line #{} to delete: ", i + 1))?;
        match table.remove(&line) {
            Ok(true) => println!("removed"),
            Ok(false) => println!("not found"),
            Err(e) => println!("skipped: {e}"),
        }
    }

    let query = prompt_line(&mut input, "Line to search: ")?;
    let probe: Option<Probe> = match table.search(&query) {
        Ok(p) => {
            match p.line_number {
                Some(n) => println!("Found: line {n}, steps = {}", p.steps),
                None => println!("Key not found. Steps = {}", p.steps),
            }
            Some(p)
        }
        Err(e) => {
            println!("bad query: {e}");
            None
        }
    };

    let report_path = save_report(&table, out_dir.join("report.txt"), probe.as_ref())?;
    render_dump(&table, &mut io::stdout().lock())?;
    println!("export: {}", export_path.display());
    println!("report: {}", report_path.display());
    Ok(())
}

fn prompt_line<B: BufRead>(input: &mut io::Lines<B>, prompt: &str) -> Result<String> {
    print!("{prompt}");
    io::stdout().flush()?;
    match input.next() {
        Some(line) => Ok(line?),
        None => bail!("stdin closed"),
    }
}

fn prompt_number<B: BufRead>(input: &mut io::Lines<B>, prompt: &str) -> Result<usize> {
    let line = prompt_line(input, prompt)?;
    line.trim()
        .parse::<usize>()
        .with_context(|| format!("not a number: {line:?}"))
}
