//! Statistics over computed mixing times
//!
//! - Equal-width histograms with text rendering ([`histogram`])
//! - Count, range, mean and spread ([`summary`])

pub mod histogram;
pub mod summary;

pub use histogram::Histogram;
pub use summary::Summary;
