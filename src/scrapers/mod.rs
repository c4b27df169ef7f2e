pub mod browser;
pub mod http;
pub mod traits;
pub mod types;

pub use browser::{BrowserFetcher, BrowserRetry};
pub use http::HttpFetcher;
pub use traits::PageFetcher;
pub use types::{PageLimit, SearchParams};
