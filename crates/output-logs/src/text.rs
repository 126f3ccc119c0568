//! Per-event tab-separated logs
//!
//! Three files per event, opened in append mode:
//! - `_dnn_doublets.txt`: header, raw hit rows, cross scalars, truth block
//! - `_dnn_doublets_tf.txt`: header, image slice and feature slice as submitted
//! - `_dnn_doublets_inf.txt`: `score0 - score1 - label`
//!
//! Data rows end with the literal `542.1369`.

use crate::record::{DoubletRecord, EventHeader};
use crate::{DoubletSink, OutputError};
use doublet_common::{EventId, RECORD_TERMINATOR};
use doublet_inference::DoubletScore;
use std::fmt::Display;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Paths of the three logs of one event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventLogPaths {
    pub doublets: PathBuf,
    pub tensors: PathBuf,
    pub inference: PathBuf,
}

impl EventLogPaths {
    #[must_use]
    pub fn new(dir: &Path, id: &EventId, process_name: &str) -> Self {
        let stem = format!(
            "{}_{}_{}_{}_dnn_doublets",
            id.lumi, id.run, id.event, process_name
        );
        Self {
            doublets: dir.join(format!("{stem}.txt")),
            tensors: dir.join(format!("{stem}_tf.txt")),
            inference: dir.join(format!("{stem}_inf.txt")),
        }
    }
}

fn open_append(path: &Path) -> Result<BufWriter<File>, OutputError> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| OutputError::Open {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(BufWriter::new(file))
}

/// Tab-separated row writer
struct Row<'w, W: Write> {
    out: &'w mut W,
}

impl<'w, W: Write> Row<'w, W> {
    fn field<T: Display>(&mut self, value: T) -> std::io::Result<()> {
        write!(self.out, "{value}\t")
    }

    fn fields<T: Display + Copy>(&mut self, values: &[T]) -> std::io::Result<()> {
        values.iter().try_for_each(|&v| self.field(v))
    }

    fn header(&mut self, event: &EventHeader, inner_seq: u32, outer_seq: u32) -> std::io::Result<()> {
        self.field(event.id.run)?;
        self.field(event.id.event)?;
        self.field(event.id.lumi)?;
        self.field(event.pileup)?;
        self.field(inner_seq)?;
        self.field(outer_seq)?;
        let bs = &event.beam_spot;
        self.fields(&[bs.x0, bs.y0, bs.z0, bs.sigma_z])
    }

    fn terminate(self) -> std::io::Result<()> {
        writeln!(self.out, "{RECORD_TERMINATOR}")
    }
}

/// Text logs of a single event
pub struct EventTextLogs {
    paths: EventLogPaths,
    doublets: BufWriter<File>,
    tensors: BufWriter<File>,
    inference: BufWriter<File>,
}

impl EventTextLogs {
    /// Open (or continue) the logs of an event inside `dir`, creating `dir` if needed
    pub fn open(dir: &Path, id: &EventId, process_name: &str) -> Result<Self, OutputError> {
        fs::create_dir_all(dir).map_err(|source| OutputError::Open {
            path: dir.to_path_buf(),
            source,
        })?;
        let paths = EventLogPaths::new(dir, id, process_name);
        debug!("Writing event logs to {}", paths.doublets.display());
        Ok(Self {
            doublets: open_append(&paths.doublets)?,
            tensors: open_append(&paths.tensors)?,
            inference: open_append(&paths.inference)?,
            paths,
        })
    }

    #[must_use]
    pub fn paths(&self) -> &EventLogPaths {
        &self.paths
    }
}

impl DoubletSink for EventTextLogs {
    fn write_inputs(&mut self, record: &DoubletRecord<'_>) -> Result<(), OutputError> {
        let mut row = Row {
            out: &mut self.doublets,
        };
        row.header(record.event, record.inner_seq, record.outer_seq)?;
        row.fields(&record.doublet.inner.raw_row())?;
        row.fields(&record.doublet.outer.raw_row())?;
        row.fields(&record.doublet.cross.to_array())?;
        row.fields(&record.truth.to_array())?;
        row.terminate()?;

        let mut row = Row {
            out: &mut self.tensors,
        };
        row.header(record.event, record.inner_seq, record.outer_seq)?;
        row.fields(record.image)?;
        row.fields(record.features)?;
        row.terminate()?;
        Ok(())
    }

    fn write_score(
        &mut self,
        record: &DoubletRecord<'_>,
        score: &DoubletScore,
    ) -> Result<(), OutputError> {
        writeln!(
            self.inference,
            "{} - {} - {}",
            score.fake, score.real, record.label
        )?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), OutputError> {
        self.doublets.flush()?;
        self.tensors.flush()?;
        self.inference.flush()?;
        Ok(())
    }
}
