//! Service sheet ("hoja de ruta") ingestion.
//!
//! Turns a human-authored spreadsheet export into a structured
//! [`ServiceSheet`]:
//! - strict extraction against the company's fixed-column template
//! - heuristic fallback (delimiter sniffing + keyword buckets) when the strict
//!   result lacks a client or responsible person
//! - default checklist generation
//!
//! Parsing is pure and synchronous; file loading ([`source`]) and Postgres
//! persistence ([`store`]) sit around it.

pub mod checklist;
pub mod date;
pub mod document;
pub mod error;
pub mod flexible;
pub mod pipeline;
pub mod rules;
pub mod source;
pub mod store;
pub mod strict;
pub mod template;
pub mod tokenizer;

pub use checklist::Checklist;
pub use document::{BeverageItem, EquipmentItem, MenuItem, Schedule, SectionType, ServiceSheet};
pub use error::IngestError;
pub use pipeline::{process_text, Extraction, Pipeline, Strategy};
pub use template::Template;
