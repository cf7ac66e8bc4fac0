pub mod client;
pub mod crawler;
pub mod error;
pub mod log;
pub mod page;
pub mod sitemap;

pub use crawler::{SitemapCrawler, VisitedSet};
pub use error::ScanError;
pub use log::{LogLevel, LogLine, LogSink, MemorySink, SharedSink, TracingSink};
pub use page::{FetchedPage, PageFetcher};
pub use sitemap::SitemapDocument;
