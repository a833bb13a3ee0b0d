//! Data fetching — provider abstraction, the HTTP provider, and the batch loop.

pub mod download;
pub mod provider;
pub mod tiingo;

pub use download::fetch_all;
pub use provider::{DownloadProgress, FetchError, LogProgress, PriceProvider, SilentProgress};
pub use tiingo::TiingoProvider;
