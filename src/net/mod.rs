//! Network retrieval of assets.
//!
//! - [`fetcher`]: the [`fetcher::AssetFetcher`] trait and its HTTP implementation

pub mod fetcher;
