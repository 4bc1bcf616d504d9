//! # Gridpress
//!
//! Turns noisy spreadsheet workbooks into clean, rule-transformed tables.
//! A sheet as uploaded by a user rarely is a table: it carries banner rows,
//! blank padding, dead columns and sometimes several tables stacked on top of
//! each other. Gridpress locates the tabular blocks, normalizes them into
//! typed rectangular tables and optionally rewrites their contents according
//! to a declarative rule set before serializing everything back to xlsx.
//!
//! ## Features
//!
//! - **Table detection**: Segments a 2-D cell grid into candidate tables,
//!   infers the header row and strips empty padding
//! - **Header normalization**: Arbitrary header cells become canonical
//!   snake_case identifiers
//! - **Type coercion**: Whole-column best-effort numeric conversion
//! - **Rule transformation**: Delegates to an external chat-completion
//!   service with a deterministic fallback when the service is unavailable
//!   or returns malformed output
//! - **Pure Rust xlsx I/O**: Reads and writes workbooks via `zip` and
//!   `quick-xml`, no external spreadsheet runtime
//!
//! ## Entry points
//!
//! - [`export::export_workbook`]: full pipeline, bytes in / bytes out
//! - [`detect::detect_tables`]: detection and cleaning only
//! - [`transform::RuleTransformer`]: rule application for a single table

mod error;
mod helpers;

pub mod detect;
pub mod export;
pub mod table;
pub mod transform;
pub mod workbook;

pub use crate::detect::detect_tables;
pub use crate::detect::header::normalize_header;
pub use crate::error::GridpressError;
pub use crate::export::export_tables;
pub use crate::export::export_workbook;
pub use crate::table::Table;
pub use crate::transform::debug::DebugSink;
pub use crate::transform::llm::ChatCompleter;
pub use crate::transform::llm::LlmConfig;
pub use crate::transform::llm::OpenAiChat;
pub use crate::transform::rules::RuleSet;
pub use crate::transform::RuleTransformer;
pub use crate::workbook::cell::CellValue;
pub use crate::workbook::grid::Grid;
pub use crate::workbook::xlsx::read_workbook;
pub use crate::workbook::writer::write_workbook;
