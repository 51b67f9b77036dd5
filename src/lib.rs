//! # movie_stats
//!
//! Descriptive statistics over a tabular movie dataset (the TMDB
//! `movies_metadata.csv` layout):
//!
//! - unique-title count,
//! - mean and vote-weighted mean rating,
//! - a weighted-rating (Bayesian estimator) top-N ranking,
//! - movies per release year and per genre,
//! - a JSON-lines dump of the annotated dataset.
//!
//! ## Example
//! ```
//! use movie_stats::{AnalysisOptions, analyze, load_movies_from_reader};
//!
//! let csv = "title,release_date,vote_count,vote_average,genres\n\
//!            Heat,1995-12-15,1886,7.7,\"[{'id': 28, 'name': 'Action'}]\"\n";
//! let dataset = load_movies_from_reader(csv.as_bytes()).unwrap();
//! let report = analyze(&dataset.movies, &AnalysisOptions::default());
//! assert_eq!(report.unique_titles, 1);
//! assert_eq!(report.genres, vec![("Action".to_string(), 1)]);
//! ```

pub mod error;
pub mod genres;
pub mod ranking;
pub mod record;
pub mod report;
pub mod year;

pub use error::{Error, Result};
pub use genres::{count_genres, parse_genres};
pub use ranking::{
    DEFAULT_TOP_K, MeanPolicy, RankedMovie, RatingAverages, RatingSeries, compute_averages,
    compute_percentile, rank, rank_with, weighted_rating,
};
pub use record::{
    Dataset, Genre, MovieRecord, count_unique_titles, load_movies, load_movies_from_reader,
};
pub use report::{
    AnalysisOptions, MovieReport, analyze, format_report, save_json_lines, save_ranking,
    write_json_lines,
};
pub use year::{YearToken, annotate_years, count_by_release_year, extract_year};
