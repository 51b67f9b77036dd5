//! Movie records and CSV ingestion.

use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::{info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::genres::parse_genres;

// Columns read into typed fields; `year` is reserved for the export annotation.
const TYPED_COLUMNS: &[&str] = &[
    "title",
    "release_date",
    "vote_count",
    "vote_average",
    "popularity",
    "genres",
    "year",
];

/// One `{id, name}` entry of a movie's genre list. Counting only needs the name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
}

/// A movie as ingested from the dataset. Absent or unparseable cells are `None`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct MovieRecord {
    pub title: String,
    pub release_date: Option<String>,
    pub vote_count: Option<u64>,
    pub vote_average: Option<f64>,
    pub popularity: Option<f64>,
    pub genres: Vec<Genre>,
    /// Remaining non-empty CSV cells by column name, kept for the export.
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

/// Records loaded from one CSV source.
#[derive(Debug, Default)]
pub struct Dataset {
    pub movies: Vec<MovieRecord>,
    /// Rows the CSV reader could not decode.
    pub skipped_rows: usize,
}

// Every cell is read as text; conversion happens afterwards so one bad
// cell never rejects the whole row.
#[derive(Debug, Deserialize)]
struct RawMovieRow {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    release_date: Option<String>,
    #[serde(default)]
    vote_count: Option<String>,
    #[serde(default)]
    vote_average: Option<String>,
    #[serde(default)]
    popularity: Option<String>,
    #[serde(default)]
    genres: Option<String>,
}

impl MovieRecord {
    fn from_row(row: RawMovieRow, extra: BTreeMap<String, String>) -> Self {
        MovieRecord {
            title: non_empty(row.title).unwrap_or_default(),
            release_date: non_empty(row.release_date),
            vote_count: parse_number(row.vote_count.as_deref())
                .filter(|v| *v >= 0.0)
                .map(|v| v as u64),
            vote_average: parse_number(row.vote_average.as_deref()),
            popularity: parse_number(row.popularity.as_deref()),
            genres: row.genres.as_deref().map(parse_genres).unwrap_or_default(),
            extra,
        }
    }
}

///Load movies from a CSV file with a header row.
pub fn load_movies<P: AsRef<Path>>(path: P) -> Result<Dataset> {
    let path = path.as_ref();
    info!("Loading data from {}", path.display());
    let file = File::open(path)?;
    let dataset = load_movies_from_reader(file)?;
    info!(
        "Loaded {} movies from {} ({} rows skipped)",
        dataset.movies.len(),
        path.display(),
        dataset.skipped_rows
    );
    Ok(dataset)
}

///Load movies from any CSV source with a header row.
///Rows that cannot be decoded are skipped and counted; a missing header or
///an unreadable source is an error.
pub fn load_movies_from_reader<R: Read>(reader: R) -> Result<Dataset> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Fields)
        .from_reader(reader);
    // Fail early on an unreadable header instead of skipping every row.
    let headers = rdr.headers()?.clone();

    let mut rows = Vec::new();
    let mut skipped_rows = 0;
    for (line, result) in rdr.records().enumerate() {
        let decoded = result.and_then(|record| {
            let row: RawMovieRow = record.deserialize(Some(&headers))?;
            Ok((row, extra_columns(&headers, &record)))
        });
        match decoded {
            Ok(row) => rows.push(row),
            Err(e) => {
                warn!("Skipping row {}: {}", line + 1, e);
                skipped_rows += 1;
            }
        }
    }

    let movies = rows
        .into_par_iter()
        .map(|(row, extra)| MovieRecord::from_row(row, extra))
        .collect();
    Ok(Dataset {
        movies,
        skipped_rows,
    })
}

///Count distinct non-empty titles.
/// # Example
/// ```
/// use movie_stats::{MovieRecord, count_unique_titles};
/// let movies = vec![
///     MovieRecord { title: "Heat".to_string(), ..Default::default() },
///     MovieRecord { title: "Heat".to_string(), ..Default::default() },
///     MovieRecord { title: "Jumanji".to_string(), ..Default::default() },
/// ];
/// assert_eq!(count_unique_titles(&movies), 2);
/// ```
pub fn count_unique_titles(records: &[MovieRecord]) -> usize {
    records
        .iter()
        .map(|r| r.title.as_str())
        .filter(|t| !t.is_empty())
        .collect::<HashSet<&str>>()
        .len()
}

fn extra_columns(
    headers: &csv::StringRecord,
    record: &csv::StringRecord,
) -> BTreeMap<String, String> {
    headers
        .iter()
        .zip(record.iter())
        .filter(|(name, cell)| !cell.is_empty() && !TYPED_COLUMNS.contains(name))
        .map(|(name, cell)| (name.to_string(), cell.to_string()))
        .collect()
}

fn non_empty(cell: Option<String>) -> Option<String> {
    cell.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn parse_number(cell: Option<&str>) -> Option<f64> {
    cell.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}
