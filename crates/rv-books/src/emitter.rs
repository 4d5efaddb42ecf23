//! Book & Table Emitter — writes every mode's lookup table and event book
//!
//! For each mode the partition's outcomes are streamed once, in ascending
//! id order, into both the lookup table and the staging book. The staging
//! book is then compressed into the publish directory. The index is only
//! assembled after every mode has produced its manifest.

use rayon::prelude::*;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::PathBuf;

use rv_math::{GameConfig, GameMode, ModeTable, Partition};

use crate::compress::{Compressor, compressor_for};
use crate::error::{BookError, Result};
use crate::event::narrate;
use crate::index::IndexDocument;
use crate::layout::OutputLayout;
use crate::manifest::ModeManifest;
use crate::writer::{BookRecord, BookWriter, DigestWriter, TableRow, TableWriter, sha256_hex};

/// Emit the lookup table and event book for one mode
pub fn emit_mode(
    mode: &GameMode,
    partition: &Partition,
    layout: &OutputLayout,
    compressor: &dyn Compressor,
) -> Result<ModeManifest> {
    let name = mode.name();
    let table_path = layout.table_path(&name);
    let book_path = layout.staging_book_path(&name);

    log::info!(
        "Generating {}: {} wins (weight {}), {} losses (weight {}), survival {:.6}, payout {} ({:.2}x)",
        name,
        partition.win.count,
        partition.win.weight_total,
        partition.loss.count,
        partition.loss.weight_total,
        partition.realized_win_probability(),
        mode.multiplier_fixed_point,
        mode.multiplier()
    );

    let table_file = File::create(&table_path).map_err(BookError::at(&table_path))?;
    let book_file = File::create(&book_path).map_err(BookError::at(&book_path))?;

    let mut table = TableWriter::new(DigestWriter::new(BufWriter::new(table_file)));
    let mut book = BookWriter::new(BufWriter::new(book_file));

    for outcome in partition.outcomes() {
        let payout = if outcome.kind.is_win() {
            mode.multiplier_fixed_point
        } else {
            0
        };

        table
            .write_row(&TableRow {
                id: outcome.id,
                weight: outcome.weight,
                payout,
            })
            .map_err(BookError::at(&table_path))?;

        book.write_record(&BookRecord {
            id: outcome.id,
            events: narrate(outcome.kind, mode.adverse_count, outcome.id, mode.total_slots),
            payout_multiplier: payout,
        })
        .map_err(BookError::at(&book_path))?;
    }

    let (table_sink, totals) = table.finish().map_err(BookError::at(&table_path))?;
    let (_, weights_sha256) = table_sink.finish().map_err(BookError::at(&table_path))?;
    let (_, records) = book.finish().map_err(BookError::at(&book_path))?;

    if totals.total_weight != partition.weight_space as u128 || records != totals.rows {
        return Err(BookError::Verification(format!(
            "{}: wrote {} rows / {} records with total weight {} (expected weight {})",
            name, totals.rows, records, totals.total_weight, partition.weight_space
        )));
    }

    log::debug!("Created {}", table_path.display());
    log::debug!("Created {}", book_path.display());

    let raw = fs::read(&book_path).map_err(BookError::at(&book_path))?;
    let packed = compressor
        .compress(&raw)
        .map_err(BookError::at(&book_path))?;

    let events_path = layout.compressed_book_path(&name, compressor.extension());
    fs::write(&events_path, &packed).map_err(BookError::at(&events_path))?;

    log::debug!(
        "Created {} ({} -> {} bytes)",
        events_path.display(),
        raw.len(),
        packed.len()
    );

    Ok(ModeManifest {
        adverse_count: mode.adverse_count,
        weights: OutputLayout::table_file(&name),
        events: OutputLayout::compressed_book_file(&name, compressor.extension()),
        staging_book: OutputLayout::book_file(&name),
        rows: totals.rows,
        win_rows: partition.win.count,
        total_weight: partition.weight_space,
        weights_sha256,
        events_sha256: sha256_hex(&packed),
        name,
    })
}

/// Result of a complete generation run
#[derive(Debug, Clone)]
pub struct GenerationRun {
    /// Manifests in ascending bullet order
    pub manifests: Vec<ModeManifest>,
    /// Index as written
    pub index: IndexDocument,
    /// Where the index was written
    pub index_path: PathBuf,
}

/// Drives emission for every mode of a table
pub struct BookGenerator<'a> {
    config: &'a GameConfig,
    modes: &'a ModeTable,
    layout: OutputLayout,
    compressor: Box<dyn Compressor>,
    parallel: bool,
}

impl<'a> BookGenerator<'a> {
    /// Generator using the configured codec, sequential by default
    pub fn new(config: &'a GameConfig, modes: &'a ModeTable, layout: OutputLayout) -> Result<Self> {
        Ok(Self {
            config,
            modes,
            layout,
            compressor: compressor_for(config.codec, config.compression_level)?,
            parallel: false,
        })
    }

    /// Emit modes on the rayon pool
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Replace the compression step
    pub fn with_compressor(mut self, compressor: Box<dyn Compressor>) -> Self {
        self.compressor = compressor;
        self
    }

    /// Emit one mode (output directories must exist)
    pub fn emit_mode(&self, adverse: u32) -> Result<ModeManifest> {
        let mode = self.modes.get(adverse)?;
        let partition = self.modes.partition(adverse)?;
        emit_mode(mode, &partition, &self.layout, self.compressor.as_ref())
    }

    /// Emit every mode; the first failure aborts the run
    pub fn emit_all(&self) -> Result<Vec<ModeManifest>> {
        let bullets: Vec<u32> = self.modes.iter().map(|mode| mode.adverse_count).collect();

        if self.parallel {
            bullets
                .par_iter()
                .map(|&adverse| self.emit_mode(adverse))
                .collect()
        } else {
            bullets
                .iter()
                .map(|&adverse| self.emit_mode(adverse))
                .collect()
        }
    }

    /// Create directories, emit every mode, then write the index
    pub fn run(&self) -> Result<GenerationRun> {
        self.layout.ensure()?;

        log::info!(
            "Generating {} simulations per mode for {} ({} modes{})",
            self.modes.simulations(),
            self.config.game,
            self.modes.len(),
            if self.parallel { ", parallel" } else { "" }
        );

        let manifests = self.emit_all()?;

        let index = IndexDocument::assemble(self.config, self.modes, &manifests)?;
        if !index.version.is_stable() {
            log::warn!("Publishing prerelease math package {}", index.version);
        }
        let index_path = self.layout.index_path();
        index.write(&index_path)?;

        log::info!("Created {}", index_path.display());

        Ok(GenerationRun {
            manifests,
            index,
            index_path,
        })
    }
}
