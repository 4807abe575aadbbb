//! Historical price retrieval and alignment.
//!
//! The crate is organised leaves first:
//! - [`models`]: request, interval, price field and bar types.
//! - [`providers`]: the [`providers::DataProvider`] boundary and the Yahoo chart implementation.
//! - [`table`]: the aligned, immutable [`table::PriceTable`].
//! - [`fetch`]: per-symbol retrieval with failure isolation.

pub mod fetch;
pub mod models;
pub mod providers;
pub mod table;
pub mod tz;
