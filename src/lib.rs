//! Auction Scout: vehicle auction crawler with a small HTTP API.

pub mod config;
pub mod crawl;
pub mod extract;
pub mod models;
pub mod scrapers;
pub mod server;
pub mod store;

pub use crawl::{CrawlError, CrawlPhase, CrawlReport, Crawler};
pub use models::{ListingStatus, ListingUpdate, UpdateStatus, VehicleRecord};
pub use store::ResultStore;
