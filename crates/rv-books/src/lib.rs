//! # rv-books — Lookup tables, event books and index for Revolver Survival
//!
//! Materialises each mode's partition into two aligned artifacts that the
//! settlement engine consumes:
//!
//! - **Lookup table** (`lookUpTable_<mode>.csv`): `id,weight,payout` rows,
//!   integer weights summing exactly to the weight space
//! - **Event book** (`books_<mode>.jsonl`, published compressed): one JSON
//!   record per id narrating the pull
//!
//! and an `index.json` listing every mode with its files.
//!
//! ## Pipeline
//!
//! ```text
//! ModeTable ──> BookGenerator::run
//!                   │
//!                   ├── emit_mode (per mode, sequential or rayon)
//!                   │      ├── TableWriter ──> publish_files/lookUpTable_*.csv
//!                   │      ├── BookWriter  ──> books/books_*.jsonl
//!                   │      └── Compressor  ──> publish_files/books_*.jsonl.zst
//!                   │
//!                   └── IndexDocument::assemble (after every manifest) ──> index.json
//! ```

pub mod compress;
pub mod emitter;
pub mod error;
pub mod event;
pub mod index;
pub mod layout;
pub mod manifest;
pub mod verify;
pub mod writer;

pub use compress::{Compressor, GzipCompressor, ZstdCompressor, compressor_for};
pub use emitter::{BookGenerator, GenerationRun, emit_mode};
pub use error::{BookError, Result};
pub use event::{BookEvent, ChamberResult, OutcomeStatus, chamber_position, narrate};
pub use index::{IndexDocument, IndexMeta, IndexMode, MODE_COST};
pub use layout::OutputLayout;
pub use manifest::ModeManifest;
pub use verify::{ModeVerification, TableSummary, VerificationReport};
pub use writer::{BookRecord, BookWriter, TableRow, TableWriter};
