//! GachaForge — gacha rate experiment runner
//!
//! Runs the banner simulation and renders the summary as terminal
//! tables (or JSON with `--json`).

use clap::Parser;

use gf_gacha::RateTable;
use gf_sim::{SimulationRunner, SimulationSummary};

/// Validate a gacha rate table by repeated random trials
#[derive(Parser, Debug)]
#[command(name = "gachaforge", version, about)]
struct Args {
    /// Number of independent trials (typical runs: 100 to 5000)
    #[arg(long, default_value_t = 1000)]
    trials: u64,

    /// Base seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Run trials on the rayon worker pool
    #[arg(long)]
    parallel: bool,

    /// Emit the summary as pretty JSON instead of tables
    #[arg(long)]
    json: bool,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let table = RateTable::standard();
    let mut runner = SimulationRunner::new(table.clone()).with_parallel(args.parallel);
    if let Some(seed) = args.seed {
        runner = runner.with_seed(seed);
    }

    let summary = match runner.run(args.trials) {
        Ok(summary) => summary,
        Err(e) => {
            log::error!("simulation failed: {e}");
            std::process::exit(1);
        }
    };

    if args.json {
        println!("{}", summary.to_json());
    } else {
        print_report(&table, &summary);
    }
}

fn print_report(table: &RateTable, summary: &SimulationSummary) {
    println!("Gacha Rate Experiment");
    println!();

    println!("Banner settings:");
    for tier in &table.tiers {
        println!("  {:<10} {:>8.3}%", tier.name, tier.theoretical_pct());
    }
    println!("  pity ceiling at {} draws", table.pity_threshold);
    println!();

    println!("Run summary:");
    println!("  trials           {}", summary.trial_count);
    println!("  total draws      {}", summary.total_draws);
    println!("  avg draws/trial  {:.1}", summary.average_draws_per_trial);
    println!();

    println!("Rarity breakdown:");
    println!(
        "  {:<10} {:>10} {:>10} {:>9} {:>10}",
        "tier", "theory %", "actual %", "diff", "count"
    );
    for tier in &summary.per_tier {
        println!(
            "  {:<10} {:>10.3} {:>10.3} {:>+9.3} {:>10}",
            tier.name,
            tier.theoretical_pct,
            tier.empirical_pct,
            tier.empirical_pct - tier.theoretical_pct,
            tier.count
        );
    }
    println!();

    println!("Expected draws to first {}:", table.top_tier().name);
    println!("  theoretical  {:.1}", summary.expected_top_tier.theoretical);
    match summary.expected_top_tier.empirical {
        Some(empirical) => {
            println!("  empirical    {empirical:.1}");
            if let Some(diff) = summary.expected_top_tier.absolute_difference {
                println!("  difference   ±{diff:.1}");
            }
        }
        None => println!("  empirical    undefined (no top-tier hits recorded)"),
    }
    println!();

    if summary.histogram.is_empty() {
        println!("First-hit distribution: no top-tier hits recorded");
        return;
    }

    println!("First-hit distribution:");
    for bucket in &summary.histogram {
        let bar = "#".repeat((bucket.percentage / 2.0).round() as usize);
        println!(
            "  {:>9} {:>7} {:>6.1}%  {bar}",
            bucket.range, bucket.count, bucket.percentage
        );
    }
    println!();

    println!("Cumulative first-hit probability:");
    println!("  {:>6} {:>10} {:>10}", "draws", "theory %", "actual %");
    for point in &summary.cumulative_curve {
        println!(
            "  {:>6} {:>10.1} {:>10.1}",
            point.draws, point.theoretical_pct, point.empirical_pct
        );
    }
}
