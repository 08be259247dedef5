//! # Driftscope Storage Crate
//!
//! This crate is the file-system boundary of the application. It turns a daily price
//! CSV, in whatever shape a data vendor produced it, into a validated `PriceTable`,
//! and writes tables and derived series back out as CSV.
//!
//! ## Architectural Principles
//!
//! - **Adapter:** All CSV specifics (header spellings, unit suffixes, timestamp formats,
//!   placeholder cells) are handled here. The rest of the application only sees
//!   `core-types`.
//! - **Descriptive, not corrective:** Missing cells and calendar gaps are reported in a
//!   `DataQuality` summary. Only structural problems (no date column, duplicate trading
//!   days, unparsable cells) fail the load.
//!
//! ## Public API
//!
//! - `load_csv` / `read_prices`: Parse a file or any reader into a `LoadedTable`.
//! - `write_prices` / `write_series`: Export a table or a set of aligned series.
//! - `DataQuality`: The per-column missing-value and gap report.
//! - `StorageError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod columns;
pub mod error;
pub mod quality;
pub mod reader;
pub mod writer;

// Re-export the key components to create a clean, public-facing API.
pub use columns::{clean_header, Column};
pub use error::StorageError;
pub use quality::DataQuality;
pub use reader::{load_csv, read_prices, LoadedTable};
pub use writer::{write_prices, write_prices_to, write_series, write_series_to};
