//! Per-run JSON-lines record stream

use crate::record::{DoubletRecord, EventHeader};
use crate::{DoubletSink, OutputError};
use doublet_features::{CrossFeatures, HitFeatures, LayerPairIds};
use doublet_inference::DoubletScore;
use doublet_truth::TruthBlock;
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// One line of the stream
#[derive(Debug, Serialize)]
pub struct DoubletLine<'a> {
    #[serde(flatten)]
    pub event: &'a EventHeader,
    pub inner_seq: u32,
    pub outer_seq: u32,
    pub index: usize,
    pub layer_ids: LayerPairIds,
    pub inner: &'a HitFeatures,
    pub outer: &'a HitFeatures,
    pub inner_pad: &'a [f32],
    pub outer_pad: &'a [f32],
    pub cross: &'a CrossFeatures,
    pub z0_fault: bool,
    pub truth: &'a TruthBlock,
    pub label: f32,
    pub score: &'a DoubletScore,
}

/// Path of the stream for one run
#[must_use]
pub fn run_stream_path(dir: &Path, run: u32, process_name: &str) -> PathBuf {
    dir.join(format!("{run}_{process_name}_doublets.jsonl"))
}

/// Appends one JSON object per scored doublet to a per-run file
pub struct RunRecordStream {
    run: u32,
    path: PathBuf,
    out: BufWriter<File>,
    written: usize,
}

impl RunRecordStream {
    pub fn open(dir: &Path, run: u32, process_name: &str) -> Result<Self, OutputError> {
        fs::create_dir_all(dir).map_err(|source| OutputError::Open {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = run_stream_path(dir, run, process_name);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| OutputError::Open {
                path: path.clone(),
                source,
            })?;
        debug!("Writing run {} records to {}", run, path.display());
        Ok(Self {
            run,
            path,
            out: BufWriter::new(file),
            written: 0,
        })
    }

    #[must_use]
    pub fn run(&self) -> u32 {
        self.run
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records written since the stream was opened
    #[must_use]
    pub fn written(&self) -> usize {
        self.written
    }
}

impl DoubletSink for RunRecordStream {
    // Records are only complete once scored
    fn write_inputs(&mut self, _record: &DoubletRecord<'_>) -> Result<(), OutputError> {
        Ok(())
    }

    fn write_score(
        &mut self,
        record: &DoubletRecord<'_>,
        score: &DoubletScore,
    ) -> Result<(), OutputError> {
        let d = record.doublet;
        let line = DoubletLine {
            event: record.event,
            inner_seq: record.inner_seq,
            outer_seq: record.outer_seq,
            index: d.index,
            layer_ids: d.layer_ids,
            inner: &d.inner.features,
            outer: &d.outer.features,
            inner_pad: d.inner.pad.cells(),
            outer_pad: d.outer.pad.cells(),
            cross: &d.cross,
            z0_fault: d.z0_fault,
            truth: record.truth,
            label: record.label,
            score,
        };
        serde_json::to_writer(&mut self.out, &line)?;
        self.out.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), OutputError> {
        self.out.flush()?;
        Ok(())
    }
}
