//! crates/cat_ratings_core/src/domain.rs
//!
//! Defines the pure, core data structures and rating arithmetic for the
//! application. These types are independent of any storage backend or
//! serialization format.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Errors produced by domain-level validation and lookups.
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    /// A required input was missing or empty.
    #[error("{0}")]
    Validation(String),

    /// No record with the requested id exists in the collection.
    #[error("no cat with id {0}")]
    NotFound(String),
}

/// The running rating totals derived from every rating ever applied.
///
/// `mean` is always the quotient of `sum` and `count`, and `0` while no
/// rating has been applied. It is never set independently.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingTotals {
    pub sum: f64,
    pub count: u64,
    pub mean: f64,
}

impl RatingTotals {
    /// Folds one more rating into the totals.
    ///
    /// Pure arithmetic, no I/O. Any numeric value is accepted and
    /// accumulated; the caller validates presence and numericity at the
    /// request boundary.
    pub fn apply(self, value: f64) -> RatingTotals {
        let sum = self.sum + value;
        let count = self.count + 1;
        RatingTotals {
            sum,
            count,
            mean: sum / count as f64,
        }
    }
}

/// A single rateable cat record.
#[derive(Debug, Clone)]
pub struct Cat {
    /// Opaque unique identifier, assigned at creation, immutable.
    pub id: String,
    /// Free-text label, required at creation, immutable thereafter.
    pub title: String,
    /// URL path of the one stored image backing this record.
    pub image: String,
    /// Creation timestamp, immutable.
    pub date: DateTime<Utc>,
    pub rating_sum: f64,
    pub rating_count: u64,
    pub rating: f64,
}

impl Cat {
    /// Creates a fresh, unrated record for one uploaded image.
    pub fn new(title: &str, image: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            image,
            date: Utc::now(),
            rating_sum: 0.0,
            rating_count: 0,
            rating: 0.0,
        }
    }

    fn totals(&self) -> RatingTotals {
        RatingTotals {
            sum: self.rating_sum,
            count: self.rating_count,
            mean: self.rating,
        }
    }

    /// Folds a new rating into this record, keeping `rating` consistent
    /// with `rating_sum` and `rating_count`.
    pub fn apply_rating(&mut self, value: f64) {
        let totals = self.totals().apply(value);
        self.rating_sum = totals.sum;
        self.rating_count = totals.count;
        self.rating = totals.mean;
    }
}

/// Builds one new record per uploaded image, all sharing the given title.
///
/// Every record gets its own id; there is no multi-image grouping. Fails
/// when no images or no title were supplied.
pub fn new_litter(title: &str, images: Vec<String>) -> Result<Vec<Cat>, DomainError> {
    if title.trim().is_empty() {
        return Err(DomainError::Validation("missing title".to_string()));
    }
    if images.is_empty() {
        return Err(DomainError::Validation("missing images".to_string()));
    }
    Ok(images.into_iter().map(|image| Cat::new(title, image)).collect())
}

/// Applies a rating to the record with the given id, in place.
///
/// Returns a snapshot of the updated record so callers can respond with it
/// after persisting the whole collection.
pub fn rate_cat(cats: &mut [Cat], id: &str, value: f64) -> Result<Cat, DomainError> {
    let cat = cats
        .iter_mut()
        .find(|c| c.id == id)
        .ok_or_else(|| DomainError::NotFound(id.to_string()))?;
    cat.apply_rating(value);
    Ok(cat.clone())
}

/// Orders a collection by rating, best first.
pub fn sort_top_rated(cats: &mut [Cat]) {
    cats.sort_by(|a, b| b.rating.total_cmp(&a.rating));
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    #[test]
    fn rating_sequence_keeps_totals_consistent() {
        let ratings = [4.0, 2.0, 5.0, 1.0, 3.0];
        let mut cat = Cat::new("Mittens", "/cat/image/mittens.jpg".to_string());

        for r in ratings {
            cat.apply_rating(r);
        }

        assert_eq!(cat.rating_count, ratings.len() as u64);
        assert!((cat.rating_sum - ratings.iter().sum::<f64>()).abs() < TOLERANCE);
        assert!((cat.rating - cat.rating_sum / cat.rating_count as f64).abs() < TOLERANCE);
    }

    #[test]
    fn worked_example_four_then_two() {
        let mut cat = Cat::new("a", "/cat/image/a.jpg".to_string());

        cat.apply_rating(4.0);
        assert_eq!(cat.rating_sum, 4.0);
        assert_eq!(cat.rating_count, 1);
        assert_eq!(cat.rating, 4.0);

        cat.apply_rating(2.0);
        assert_eq!(cat.rating_sum, 6.0);
        assert_eq!(cat.rating_count, 2);
        assert_eq!(cat.rating, 3.0);
    }

    #[test]
    fn ratings_are_not_clamped() {
        // Negative and oversized values accumulate as-is.
        let totals = RatingTotals { sum: 0.0, count: 0, mean: 0.0 }
            .apply(-10.0)
            .apply(1_000_000.0);

        assert_eq!(totals.count, 2);
        assert!((totals.sum - 999_990.0).abs() < TOLERANCE);
        assert!((totals.mean - 499_995.0).abs() < TOLERANCE);
    }

    #[test]
    fn new_record_starts_unrated() {
        let cat = Cat::new("Whiskers", "/cat/image/w.png".to_string());
        assert_eq!(cat.rating_sum, 0.0);
        assert_eq!(cat.rating_count, 0);
        assert_eq!(cat.rating, 0.0);
    }

    #[test]
    fn litter_creates_one_record_per_image() {
        let images = vec!["/cat/image/a.jpg".to_string(), "/cat/image/b.jpg".to_string()];
        let cats = new_litter("Twins", images).unwrap();

        assert_eq!(cats.len(), 2);
        assert_ne!(cats[0].id, cats[1].id);
        assert!(cats.iter().all(|c| c.title == "Twins"));
        assert!(cats.iter().all(|c| c.rating == 0.0 && c.rating_count == 0));
    }

    #[test]
    fn litter_rejects_missing_inputs() {
        assert!(matches!(
            new_litter("", vec!["/cat/image/a.jpg".to_string()]),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            new_litter("Solo", Vec::new()),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn rate_cat_reports_unknown_ids() {
        let mut cats = vec![Cat::new("Known", "/cat/image/k.jpg".to_string())];
        let err = rate_cat(&mut cats, "absent", 5.0).unwrap_err();
        assert!(matches!(err, DomainError::NotFound(id) if id == "absent"));
    }

    #[test]
    fn top_rated_sorts_descending() {
        let mut cats = vec![
            Cat::new("low", "/cat/image/l.jpg".to_string()),
            Cat::new("high", "/cat/image/h.jpg".to_string()),
            Cat::new("mid", "/cat/image/m.jpg".to_string()),
        ];
        cats[0].apply_rating(1.0);
        cats[1].apply_rating(5.0);
        cats[2].apply_rating(3.0);

        sort_top_rated(&mut cats);

        let titles: Vec<&str> = cats.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, ["high", "mid", "low"]);
    }
}
