//! Recording adapters that capture interactions to cassettes.

pub mod image_fetcher;
