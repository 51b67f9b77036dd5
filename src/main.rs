#![forbid(unsafe_code)]
//! # Movie Stats CLI
//!
//! This is the command-line interface for the `movie_stats` crate.
//! It loads a movie dataset from CSV, prints descriptive statistics and
//! writes the annotated dataset as JSON lines.
//!
//! ## Features
//! - Unique-title count, mean and vote-weighted mean rating.
//! - Weighted-rating (Bayesian estimator) top-N ranking.
//! - Movies per release year and per genre.
//!
//! ## Example
//! ```bash
//! cargo run --release -- movies_metadata.csv --display-top 10 --ranked-output top.json
//! ```
//!
//! Set `RUST_LOG=info` to follow each step. See `--help` for all options.

use clap::Parser;
use log::error;
use movie_stats::{
    AnalysisOptions, DEFAULT_TOP_K, MeanPolicy, analyze, format_report, load_movies,
    save_json_lines, save_ranking,
};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// CSV file with the movie dataset
    path: PathBuf,

    /// Number of movies kept in the weighted-rating ranking
    #[arg(long, default_value_t = DEFAULT_TOP_K)]
    top_k: usize,

    /// Number of ranked movies printed in the report
    #[arg(long, default_value_t = 5)]
    display_top: usize,

    /// Only print genres with at least this many movies
    #[arg(long, default_value_t = 2)]
    min_genre_count: usize,

    /// Average ratings without truncating them to integers first
    #[arg(long, default_value_t = false)]
    exact_mean: bool,

    /// Where to write the annotated dataset (JSON lines)
    #[arg(long, default_value = "movies_output.json")]
    output: PathBuf,

    /// Skip writing the annotated dataset
    #[arg(long, default_value_t = false)]
    no_export: bool,

    /// Also write the ranking to this file (JSON lines)
    #[arg(long)]
    ranked_output: Option<PathBuf>,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let options = AnalysisOptions {
        top_k: cli.top_k,
        display_top: cli.display_top,
        min_genre_count: cli.min_genre_count,
        mean_policy: if cli.exact_mean {
            MeanPolicy::Exact
        } else {
            MeanPolicy::Truncated
        },
    };

    let dataset = match load_movies(&cli.path) {
        Ok(dataset) => dataset,
        Err(e) => {
            error!("Error loading {}: {}", cli.path.display(), e);
            eprintln!("Error loading the data: {e}");
            process::exit(1);
        }
    };

    let report = analyze(&dataset.movies, &options);
    println!("{}", format_report(&report, &options));

    let mut any_errors = false;
    if !cli.no_export {
        if let Err(e) = save_json_lines(&dataset.movies, &cli.output) {
            error!("Error saving {}: {}", cli.output.display(), e);
            any_errors = true;
        }
    }
    if let Some(path) = &cli.ranked_output {
        match &report.top_rated {
            Some(ranked) => {
                if let Err(e) = save_ranking(ranked, path) {
                    error!("Error saving {}: {}", path.display(), e);
                    any_errors = true;
                }
            }
            None => {
                error!("No ranking to save to {}", path.display());
                any_errors = true;
            }
        }
    }
    if any_errors {
        process::exit(1);
    }
}
