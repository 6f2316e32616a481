pub mod domain;
pub mod ports;

pub use domain::{new_litter, rate_cat, sort_top_rated, Cat, DomainError, RatingTotals};
pub use ports::{CatStore, StoreError, StoreResult};
