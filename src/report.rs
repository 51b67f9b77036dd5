//! Running every statistic over a dataset, printing and exporting the results.

use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::{info, warn};
use serde::Serialize;

use crate::error::Result;
use crate::genres::count_genres;
use crate::ranking::{
    DEFAULT_TOP_K, MeanPolicy, RankedMovie, RatingAverages, RatingSeries, rank_with,
};
use crate::record::{MovieRecord, count_unique_titles};
use crate::year::{YearToken, annotate_years, count_by_release_year};

/// Options controlling one analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    /// How many movies the ranking keeps.
    pub top_k: usize,
    /// How many ranked movies the text report shows.
    pub display_top: usize,
    /// Genres below this count are left out of the text report.
    pub min_genre_count: usize,
    pub mean_policy: MeanPolicy,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        AnalysisOptions {
            top_k: DEFAULT_TOP_K,
            display_top: 5,
            min_genre_count: 2,
            mean_policy: MeanPolicy::Truncated,
        }
    }
}

/// All statistics of one dataset.
///
/// `averages` and `top_rated` are `None` when the dataset holds no usable
/// vote data.
#[derive(Debug, Clone)]
pub struct MovieReport {
    pub unique_titles: usize,
    pub averages: Option<RatingAverages>,
    pub top_rated: Option<Vec<RankedMovie>>,
    pub release_years: Vec<(YearToken, usize)>,
    pub genres: Vec<(String, usize)>,
}

/// One line of the JSON-lines export.
#[derive(Debug, Serialize)]
struct AnnotatedMovie<'a> {
    #[serde(flatten)]
    record: &'a MovieRecord,
    year: &'a YearToken,
}

///Run every statistic over `records`.
///A failing rating statistic is logged and left out; the others still run.
pub fn analyze(records: &[MovieRecord], options: &AnalysisOptions) -> MovieReport {
    let unique_titles = count_unique_titles(records);
    info!("Number of unique movies: {unique_titles}");

    let (averages, top_rated) = match RatingSeries::from_records(records) {
        Ok(series) => {
            let series = series.with_policy(options.mean_policy);
            let averages = match series.averages(records) {
                Ok(avg) => {
                    info!("Average rating of all movies: {}", avg.mean_rating);
                    info!(
                        "Weighted average rating of all movies: {}",
                        avg.weighted_mean_rating
                    );
                    Some(avg)
                }
                Err(e) => {
                    warn!("Rating averages unavailable: {e}");
                    None
                }
            };
            let ranked = rank_with(&series, records, options.top_k);
            info!("Ranked {} movies by weighted rating", ranked.len());
            (averages, Some(ranked))
        }
        Err(e) => {
            warn!("Ratings unavailable: {e}");
            (None, None)
        }
    };

    let release_years = count_by_release_year(records);
    info!("Counted movies for {} release years", release_years.len());

    let genres = count_genres(records);
    info!("Counted movies for {} genres", genres.len());

    MovieReport {
        unique_titles,
        averages,
        top_rated,
        release_years,
        genres,
    }
}

///Render a report as plain text.
pub fn format_report(report: &MovieReport, options: &AnalysisOptions) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Number of unique movies: {}", report.unique_titles);

    match &report.averages {
        Some(avg) => {
            let _ = writeln!(out, "Average rating of all movies: {:.4}", avg.mean_rating);
            let _ = writeln!(
                out,
                "Weighted average rating of all movies: {:.4}",
                avg.weighted_mean_rating
            );
        }
        None => {
            let _ = writeln!(out, "No valid vote counts or vote averages found.");
        }
    }

    if let Some(ranked) = &report.top_rated {
        let shown = ranked.len().min(options.display_top);
        let _ = writeln!(out, "\nTop {shown} movies by weighted rating:");
        for (i, m) in ranked.iter().take(shown).enumerate() {
            let _ = writeln!(
                out,
                "{:>3}. {} ({}) votes: {}, average: {:.1}, weighted: {:.4}",
                i + 1,
                m.title,
                m.release_date.as_deref().unwrap_or("unknown"),
                m.vote_count,
                m.vote_average,
                m.weighted_rating
            );
        }
    }

    let _ = writeln!(out, "\nNumber of movies by release year:");
    for (year, count) in &report.release_years {
        let _ = writeln!(out, "{year:>8}  {count}");
    }

    let _ = writeln!(out, "\nNumber of movies in each genre:");
    for (genre, count) in report
        .genres
        .iter()
        .filter(|(_, count)| *count >= options.min_genre_count)
    {
        let _ = writeln!(out, "{genre:>16}  {count}");
    }
    out
}

///Write one JSON object per record, annotated with its release year.
pub fn write_json_lines<W: Write>(records: &[MovieRecord], writer: W) -> Result<()> {
    let years = annotate_years(records);
    let mut writer = BufWriter::new(writer);
    for (record, year) in records.iter().zip(&years) {
        let line = AnnotatedMovie { record, year };
        serde_json::to_writer(&mut writer, &line)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

///Save the annotated dataset as JSON lines to `path`.
pub fn save_json_lines<P: AsRef<Path>>(records: &[MovieRecord], path: P) -> Result<()> {
    let path = path.as_ref();
    write_json_lines(records, File::create(path)?)?;
    info!("Output data successfully saved to {}", path.display());
    Ok(())
}

///Save a ranking as JSON lines to `path`.
pub fn save_ranking<P: AsRef<Path>>(ranked: &[RankedMovie], path: P) -> Result<()> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    for movie in ranked {
        serde_json::to_writer(&mut writer, movie)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    info!("Ranking successfully saved to {}", path.display());
    Ok(())
}
