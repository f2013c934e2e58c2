use clap::Parser;

use cbdd::bdd::{Bdd, BddConfig};
use cbdd::reference::Ref;

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// Number of queens.
    #[arg(value_name = "INT", default_value = "8")]
    n: usize,

    /// Hard cap on resident nodes (in bits, so the actual cap is `2^size`).
    #[clap(long, value_name = "INT", default_value = "24")]
    size: usize,

    /// Pin the constraints and collect garbage before merging them.
    #[clap(long)]
    gc: bool,

    /// Print per-table cache statistics at the end.
    #[clap(long)]
    stats: bool,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    simplelog::TermLogger::init(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let time_total = std::time::Instant::now();

    let args = Cli::parse();
    println!("args = {:?}", args);

    let bdd = Bdd::new(BddConfig::default().with_name("queens").with_node_limit(1 << args.size));
    println!("bdd = {:?}", bdd);

    // Encode N-queens problem:
    // - N queens on an NxN board
    // - One queen per row
    // - One queen per column
    // - No two queens on the same diagonal
    let n = args.n;
    println!("Encoding n-queens problem with n = {}", n);
    let mut queens = vec![];
    for i in 0..n {
        let mut row = vec![];
        for j in 0..n {
            row.push(bdd.mk_var((i * n + j) as u32)?);
        }
        queens.push(row);
    }

    let mut constraints: Vec<Ref> = vec![];

    // One queen per row
    for row in &queens {
        constraints.push(bdd.apply_or_many(row.iter().copied())?);
    }

    // One queen per column
    for j in 0..n {
        constraints.push(bdd.apply_or_many(queens.iter().map(|row| row[j]))?);
    }

    // No two queens attacking each other
    for i in 0..n as i32 {
        for j in 0..n as i32 {
            for k in 0..n as i32 {
                for l in 0..n as i32 {
                    let same_line = i == k || j == l;
                    let same_diag = i + j == k + l || i - j == k - l;
                    if (i, j) < (k, l) && (same_line || same_diag) {
                        let a = queens[i as usize][j as usize];
                        let b = queens[k as usize][l as usize];
                        constraints.push(bdd.apply_not(bdd.apply_and(a, b)?)?);
                    }
                }
            }
        }
    }

    println!(
        "Total {} constraints of total size {}",
        constraints.len(),
        bdd.size_many(&constraints)?
    );

    if args.gc {
        for &f in &constraints {
            bdd.activate(f)?;
        }
        println!("GC...");
        bdd.collect_garbage(true);
        println!("bdd = {:?}", bdd);
    }

    println!("Merging constraints...");
    let res = bdd.apply_and_many(constraints.iter().copied())?;
    println!("bdd = {:?}", bdd);
    println!("res of size {}", bdd.size(res)?);

    let solutions = bdd.minterm_count(res, n * n)?;
    println!("Solutions: {}", solutions);
    if let Some(model) = bdd.one_sat(res)? {
        let placed: Vec<String> = model.iter().filter(|lit| lit.is_positive()).map(|lit| lit.to_string()).collect();
        println!("One solution: {}", placed.join(" "));
    }

    if args.stats {
        for s in bdd.cache_stats() {
            println!("{:>10}: capacity = {}, used = {}, hits = {}, misses = {}", s.name, s.capacity, s.used, s.hits, s.misses);
        }
    }

    println!("\nAll done in {:.3} s", time_total.elapsed().as_secs_f64());
    Ok(())
}
