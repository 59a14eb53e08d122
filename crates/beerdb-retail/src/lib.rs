//! Retailer-facing sync engines: catalog, store directory, per-store
//! stock, lazy detail enrichment, and pending-release resolution.
//!
//! Each engine takes a [`RetailClient`] and a database pool, processes its
//! unit of work with skip-and-continue error handling, and returns summary
//! counts for the job log line.

pub mod catalog;
pub mod client;
pub mod details;
pub mod error;
pub mod normalize;
pub mod pending;
pub mod stock;
pub mod stores;
pub mod types;

pub use catalog::{sync_catalog, CatalogSummary};
pub use client::{RetailClient, PAGE_SIZE};
pub use details::enrich_details;
pub use error::RetailError;
pub use normalize::{extract_quantity, to_catalog_upsert, web_origin};
pub use pending::resolve_pending;
pub use stock::{refresh_stock, StockSummary};
pub use stores::sync_stores;
pub use types::{DetailResponse, RetailProduct, SearchPage, StoreDetails};
