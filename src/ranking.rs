//! Weighted-rating (Bayesian estimator) ranking and corpus averages.
//!
//! The score of a movie with `v` votes and average `R` is
//!
//! ```text
//! WR = v / (v + m) * R + m / (m + v) * C
//! ```
//!
//! where `m` is the 95th percentile of all vote counts and `C` the mean rating
//! of the corpus. Only movies with `v >= m` are ranked.

use std::cmp::Ordering;

use log::debug;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::record::{Genre, MovieRecord};

/// Number of movies kept by [`rank`].
pub const DEFAULT_TOP_K: usize = 250;

/// Vote-count percentile a movie must reach to be ranked.
pub const QUALIFYING_PERCENTILE: f64 = 95.0;

/// How the corpus mean rating is averaged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MeanPolicy {
    /// Truncate each rating to an integer before averaging. Matches the
    /// historical output of the analysis even though it drops precision.
    #[default]
    Truncated,
    /// Average the ratings as they are.
    Exact,
}

/// A qualified movie together with its weighted rating.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedMovie {
    pub title: String,
    pub release_date: Option<String>,
    pub vote_count: u64,
    pub vote_average: f64,
    pub popularity: Option<f64>,
    pub genres: Vec<Genre>,
    pub weighted_rating: f64,
}

/// Mean rating and vote-weighted mean rating of a corpus.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RatingAverages {
    pub mean_rating: f64,
    pub weighted_mean_rating: f64,
}

/// Vote counts and ratings of one dataset, extracted once and shared by
/// [`RatingSeries::averages`] and [`rank_with`].
#[derive(Debug, Clone)]
pub struct RatingSeries {
    vote_counts: Vec<f64>,
    vote_averages: Vec<f64>,
    policy: MeanPolicy,
}

impl RatingSeries {
    ///Collect present vote counts and ratings.
    ///Fails with `InsufficientData` when either series is empty.
    pub fn from_records(records: &[MovieRecord]) -> Result<Self> {
        let vote_counts: Vec<f64> = records
            .iter()
            .filter_map(|r| r.vote_count)
            .map(|v| v as f64)
            .collect();
        let vote_averages: Vec<f64> = records.iter().filter_map(|r| r.vote_average).collect();

        if vote_counts.is_empty() || vote_averages.is_empty() {
            return Err(Error::InsufficientData(
                "no valid vote counts or vote averages found",
            ));
        }
        Ok(RatingSeries {
            vote_counts,
            vote_averages,
            policy: MeanPolicy::default(),
        })
    }

    pub fn with_policy(mut self, policy: MeanPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> MeanPolicy {
        self.policy
    }

    /// Corpus mean rating `C`.
    pub fn mean_rating(&self) -> f64 {
        let sum: f64 = match self.policy {
            MeanPolicy::Truncated => self.vote_averages.iter().map(|v| v.trunc()).sum(),
            MeanPolicy::Exact => self.vote_averages.iter().sum(),
        };
        sum / self.vote_averages.len() as f64
    }

    /// Percentile of the vote counts, linear interpolation between closest ranks.
    pub fn vote_count_percentile(&self, percentile: f64) -> f64 {
        compute_percentile(&self.vote_counts, percentile)
    }

    ///Mean rating and vote-weighted mean rating over `records`.
    ///The weighted mean uses every record with both a vote count and a
    ///rating, untruncated. Fails when those records hold no votes at all.
    pub fn averages(&self, records: &[MovieRecord]) -> Result<RatingAverages> {
        let (weighted_sum, total_votes) = records
            .iter()
            .filter_map(|r| Some((r.vote_count? as f64, r.vote_average?)))
            .fold((0.0, 0.0), |(ws, tv), (vc, va)| (ws + va * vc, tv + vc));

        if total_votes == 0.0 {
            return Err(Error::InsufficientData("no votes to weight ratings by"));
        }
        Ok(RatingAverages {
            mean_rating: self.mean_rating(),
            weighted_mean_rating: weighted_sum / total_votes,
        })
    }
}

///Compute the corpus averages of `records`.
/// # Example
/// ```
/// use movie_stats::{MovieRecord, compute_averages};
/// let movies = vec![
///     MovieRecord { vote_count: Some(3), vote_average: Some(8.5), ..Default::default() },
///     MovieRecord { vote_count: Some(1), vote_average: Some(4.5), ..Default::default() },
/// ];
/// let avg = compute_averages(&movies).unwrap();
/// assert_eq!(avg.mean_rating, 6.0);
/// assert_eq!(avg.weighted_mean_rating, 7.5);
/// ```
pub fn compute_averages(records: &[MovieRecord]) -> Result<RatingAverages> {
    RatingSeries::from_records(records)?.averages(records)
}

///Rank `records` by weighted rating and keep the best `top_k`.
pub fn rank(records: &[MovieRecord], top_k: usize) -> Result<Vec<RankedMovie>> {
    let series = RatingSeries::from_records(records)?;
    Ok(rank_with(&series, records, top_k))
}

///Rank `records` using an already extracted [`RatingSeries`].
///Ties keep their input order.
pub fn rank_with(
    series: &RatingSeries,
    records: &[MovieRecord],
    top_k: usize,
) -> Vec<RankedMovie> {
    let mn = series.mean_rating();
    let perc = series.vote_count_percentile(QUALIFYING_PERCENTILE);
    debug!("Weighted rating parameters: mean = {mn}, vote count threshold = {perc}");

    let mut qualified: Vec<RankedMovie> = records
        .iter()
        .filter_map(|r| {
            let vote_count = r.vote_count?;
            let vote_average = r.vote_average?;
            let vc = vote_count as f64;
            if vc < perc || vc + perc <= 0.0 {
                return None;
            }
            Some(RankedMovie {
                title: r.title.clone(),
                release_date: r.release_date.clone(),
                vote_count,
                vote_average,
                popularity: r.popularity,
                genres: r.genres.clone(),
                weighted_rating: weighted_rating(vc, vote_average, perc, mn),
            })
        })
        .collect();

    // `sort_by` is stable: equal scores keep their input order.
    qualified.sort_by(|a, b| {
        b.weighted_rating
            .partial_cmp(&a.weighted_rating)
            .unwrap_or(Ordering::Equal)
    });
    qualified.truncate(top_k);
    qualified
}

/// Bayesian estimate of a rating backed by `vote_count` votes.
pub fn weighted_rating(vote_count: f64, vote_average: f64, perc: f64, mn: f64) -> f64 {
    (vote_count / (vote_count + perc)) * vote_average + (perc / (perc + vote_count)) * mn
}

/// Compute a single percentile from samples
///
/// Uses linear interpolation between nearest ranks. `percentile` is clamped
/// to `0.0..=100.0`, so out-of-range requests return the minimum or maximum.
pub fn compute_percentile(samples: &[f64], percentile: f64) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }

    if samples.len() == 1 {
        return samples[0];
    }

    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let n = sorted.len();
    let p = (percentile / 100.0).clamp(0.0, 1.0);

    let rank = p * (n - 1) as f64;
    let lower_idx = rank.floor() as usize;
    let upper_idx = (lower_idx + 1).min(n - 1);
    let fraction = rank - lower_idx as f64;

    sorted[lower_idx] + fraction * (sorted[upper_idx] - sorted[lower_idx])
}
