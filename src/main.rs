use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;

use supar::engine::{SortEngine, JOBS_MAX, JOBS_MIN};
use supar::io::{output_path, read_text, write_words, LCP_SUFFIX, RANK_SUFFIX};

#[derive(Parser)]
#[command(name = "supar")]
#[command(about = "Parallel suffix sorting in shared memory")]
struct Cli {
    /// Input file
    input: PathBuf,

    /// Concurrency level [1,64]
    #[arg(short, long, default_value_t = default_jobs())]
    jobs: u32,

    /// Also compute the LCP array
    #[arg(short, long)]
    lcp: bool,

    /// Overwrite existing output files
    #[arg(short, long)]
    force: bool,

    /// Benchmark: sort but do not write output
    #[arg(short, long)]
    bench: bool,

    /// Print the finished arrays to stderr
    #[arg(short = 'o', long)]
    dump: bool,

    /// Check the finished arrays against the text
    #[arg(short, long)]
    validate: bool,

    /// Read at most this many bytes of input
    #[arg(short = 'n', long, value_name = "BYTES")]
    max_bytes: Option<u64>,
}

/// Hardware threads, clamped to the accepted concurrency range.
fn default_jobs() -> u32 {
    std::thread::available_parallelism()
        .map(|n| n.get() as u32)
        .unwrap_or(JOBS_MIN)
        .clamp(JOBS_MIN, JOBS_MAX)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if !(JOBS_MIN..=JOBS_MAX).contains(&cli.jobs) {
        bail!("concurrency level {} not in [{JOBS_MIN}, {JOBS_MAX}]", cli.jobs);
    }

    let rank_path = output_path(&cli.input, RANK_SUFFIX);
    let lcp_path = output_path(&cli.input, LCP_SUFFIX);
    if !cli.bench && !cli.force {
        if rank_path.exists() {
            bail!(
                "output file {} already exists; use -f to overwrite",
                rank_path.display()
            );
        }
        if cli.lcp && lcp_path.exists() {
            bail!(
                "output file {} already exists; use -f to overwrite",
                lcp_path.display()
            );
        }
    }

    let start = Instant::now();
    let text = read_text(&cli.input, cli.max_bytes)?;
    eprintln!(
        "read {} bytes from {} in {:.3}s",
        text.len() - 1,
        cli.input.display(),
        start.elapsed().as_secs_f64()
    );

    let mut engine = SortEngine::new(&text, cli.jobs)?;

    let start = Instant::now();
    engine.build_sa()?;
    eprintln!(
        "sorted {} suffixes with {} jobs in {:.3}s",
        text.len(),
        cli.jobs,
        start.elapsed().as_secs_f64()
    );

    if cli.lcp {
        let start = Instant::now();
        engine.build_lcp()?;
        eprintln!("built LCP array in {:.3}s", start.elapsed().as_secs_f64());
    }

    if cli.dump {
        if cli.lcp {
            engine.dump_lcp();
        } else {
            engine.dump_sa();
        }
    }

    if cli.validate && !engine.validate() {
        bail!("validation failed");
    }

    if !cli.bench {
        let start = Instant::now();
        let sa = engine.sa().context("suffix array missing after build")?;
        write_words(&rank_path, sa)?;
        if cli.lcp {
            let lcp = engine.lcp().context("LCP array missing after build")?;
            write_words(&lcp_path, lcp)?;
        }
        eprintln!(
            "wrote {} in {:.3}s",
            rank_path.display(),
            start.elapsed().as_secs_f64()
        );
    }

    Ok(())
}
