use std::{io::stderr, path::PathBuf};

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use groceries::{aggregate, bucketize, period_title, Axis, Export, Period, ProductChart, SpendingChart};

/// Charts grocery spending per week, month and year, and the top products
/// bought in each month and year.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Path to the JSON receipt export
    filename: PathBuf,

    /// Number of top products to chart per period
    #[arg(long, default_value_t = 20)]
    n: usize,
}

fn main() -> Result<()> {
    setup_logging();
    let args = Args::parse();

    let transactions = Export::read_json(&args.filename)?.into_sorted_transactions();
    let buckets = bucketize(&transactions)?;

    print!(
        "{}",
        SpendingChart::weekly_and_monthly(
            "Spendings at Rema 1000",
            &buckets.weekly,
            &buckets.monthly
        )
    );
    print_product_charts(Period::Month, &buckets.monthly, args.n);
    print_product_charts(Period::Year, &buckets.yearly, args.n);
    Ok(())
}

fn print_product_charts(period: Period, axis: &Axis<'_>, n: usize) {
    for (start, transactions) in axis {
        let products = aggregate(transactions.iter().copied());
        println!();
        print!("{}", ProductChart::new(period_title(period, *start), &products, n));
    }
}

fn setup_logging() {
    // stdout carries the charts, so logs go to stderr
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(stderr)
        .init();
}
