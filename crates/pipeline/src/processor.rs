//! Event loop: selection, encoding, labels, inference and output

use crate::config::{OutputFormat, PipelineConfig};
use crate::summary::{EventSummary, GroupSummary};
use crate::PipelineError;
use doublet_common::{DoubletConfig, EventInput, LayerPairDoublets, TruthAssociation};
use doublet_features::{DoubletSelector, EncodedDoublet, FeatureEncoder};
use doublet_inference::{DoubletBatch, DoubletClassifier, InferenceError};
use doublet_output::{DoubletRecord, DoubletSink, EventHeader, EventTextLogs, RunRecordStream};
use doublet_truth::{LabelResolver, TruthMatch};
use tracing::{debug, info};

/// Encoded doublets of one group with their truth, before inference
#[derive(Debug, Clone)]
pub struct PreparedGroup {
    pub summary: GroupSummary,
    pub doublets: Vec<EncodedDoublet>,
    pub truth: Vec<TruthMatch>,
}

impl PreparedGroup {
    #[must_use]
    pub fn labels(&self) -> Vec<f32> {
        self.truth.iter().map(TruthMatch::label).collect()
    }
}

/// Select, encode and label one layer-pair group
///
/// Returns `None` for groups that are not on a pixel layer pair.
#[must_use]
pub fn prepare_group(
    config: &DoubletConfig,
    group: &LayerPairDoublets,
    truth: &TruthAssociation,
) -> Option<PreparedGroup> {
    let selected = DoubletSelector::new(config).select(group)?;
    let doublets = FeatureEncoder::new(config).encode_layer_pair(&selected);
    let resolver = LabelResolver::new(config);
    let truth: Vec<TruthMatch> = selected
        .doublets
        .iter()
        .map(|d| resolver.resolve(truth, d.inner, d.outer))
        .collect();

    let summary = GroupSummary {
        inner_seq: group.inner_layer.seq_num,
        outer_seq: group.outer_layer.seq_num,
        doublets: group.len(),
        admitted: doublets.len(),
        matched: truth.iter().filter(|t| t.is_matched()).count(),
        z0_faults: doublets.iter().filter(|d| d.z0_fault).count(),
        predicted_real: 0,
    };

    Some(PreparedGroup {
        summary,
        doublets,
        truth,
    })
}

/// Selection, encoding and labels of a whole event, without inference
#[must_use]
pub fn inspect_event(config: &DoubletConfig, event: &EventInput) -> EventSummary {
    let mut summary = EventSummary::new(
        event.id,
        event.pileup_interactions(),
        event.layer_pairs.len(),
    );
    summary.groups = event
        .layer_pairs
        .iter()
        .filter_map(|group| prepare_group(config, group, &event.truth))
        .map(|prepared| prepared.summary)
        .collect();
    summary
}

/// Runs one group through the classifier and writes every row to `sink`
fn process_group<C, S>(
    config: &DoubletConfig,
    classifier: &mut C,
    header: &EventHeader,
    prepared: PreparedGroup,
    sink: &mut S,
) -> Result<GroupSummary, PipelineError>
where
    C: DoubletClassifier + ?Sized,
    S: DoubletSink + ?Sized,
{
    let labels = prepared.labels();
    let PreparedGroup {
        mut summary,
        doublets,
        truth,
    } = prepared;

    let batch = DoubletBatch::assemble(config, &doublets, &labels)?;

    let records = doublets
        .iter()
        .zip(&truth)
        .enumerate()
        .map(|(d, (doublet, t))| {
            let image = batch.image_slice(d).unwrap_or_default();
            let features = batch.feature_slice(d).unwrap_or_default();
            DoubletRecord {
                event: header,
                inner_seq: summary.inner_seq,
                outer_seq: summary.outer_seq,
                doublet,
                truth: &t.block,
                label: t.label(),
                image,
                features,
            }
        })
        .collect::<Vec<_>>();

    for record in &records {
        sink.write_inputs(record)?;
    }

    if batch.is_empty() {
        debug!(
            "Layer pair ({}, {}): no admitted doublets, skipping inference",
            summary.inner_seq, summary.outer_seq
        );
        return Ok(summary);
    }

    let scores = classifier.classify(&batch)?;
    if scores.len() != batch.len() {
        return Err(InferenceError::OutputShape {
            expected: vec![batch.len() as i64, 2],
            actual: vec![scores.len() as i64, 2],
        }
        .into());
    }
    for (record, score) in records.iter().zip(&scores) {
        sink.write_score(record, score)?;
    }
    summary.predicted_real = scores.iter().filter(|s| s.is_real()).count();

    debug!(
        "Layer pair ({}, {}): {} admitted of {}, {} matched, {} predicted real",
        summary.inner_seq,
        summary.outer_seq,
        summary.admitted,
        summary.doublets,
        summary.matched,
        summary.predicted_real
    );
    Ok(summary)
}

fn process_groups<C, S>(
    config: &DoubletConfig,
    classifier: &mut C,
    event: &EventInput,
    sink: &mut S,
) -> Result<EventSummary, PipelineError>
where
    C: DoubletClassifier + ?Sized,
    S: DoubletSink + ?Sized,
{
    let header = EventHeader {
        id: event.id,
        pileup: event.pileup_interactions(),
        beam_spot: event.beam_spot,
    };
    let mut summary = EventSummary::new(event.id, header.pileup, event.layer_pairs.len());

    for group in &event.layer_pairs {
        if let Some(prepared) = prepare_group(config, group, &event.truth) {
            let group_summary = process_group(config, classifier, &header, prepared, sink)?;
            summary.groups.push(group_summary);
        }
    }

    sink.finish()?;
    Ok(summary)
}

/// Drives events through the pipeline with a single classifier
pub struct EventProcessor<C: DoubletClassifier> {
    config: PipelineConfig,
    classifier: C,
    run_stream: Option<RunRecordStream>,
}

impl<C: DoubletClassifier> EventProcessor<C> {
    pub fn new(config: PipelineConfig, classifier: C) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self {
            config,
            classifier,
            run_stream: None,
        })
    }

    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    #[must_use]
    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    /// Process one event; events are independent of each other
    pub fn process_event(&mut self, event: &EventInput) -> Result<EventSummary, PipelineError> {
        let summary = match self.config.output_format {
            OutputFormat::Text => {
                let mut logs = EventTextLogs::open(
                    &self.config.output_dir,
                    &event.id,
                    &self.config.process_name,
                )?;
                process_groups(
                    &self.config.doublets,
                    &mut self.classifier,
                    event,
                    &mut logs,
                )?
            }
            OutputFormat::Jsonl => {
                let stream = stream_for_run(&mut self.run_stream, &self.config, event.id.run)?;
                process_groups(&self.config.doublets, &mut self.classifier, event, stream)?
            }
        };

        info!(
            "Event {}:{}:{} ({}): {} groups, {} doublets admitted, {} matched, {} predicted real",
            summary.id.run,
            summary.id.lumi,
            summary.id.event,
            self.classifier.name(),
            summary.groups.len(),
            summary.admitted(),
            summary.matched(),
            summary.predicted_real()
        );
        Ok(summary)
    }

    /// Flush any open run stream
    pub fn finish(&mut self) -> Result<(), PipelineError> {
        close_stream(self.run_stream.take())
    }
}

fn close_stream(stream: Option<RunRecordStream>) -> Result<(), PipelineError> {
    if let Some(mut stream) = stream {
        stream.finish()?;
        info!(
            "Run {}: {} records written to {}",
            stream.run(),
            stream.written(),
            stream.path().display()
        );
    }
    Ok(())
}

/// Stream of `run`, replacing a stream left open for another run
fn stream_for_run<'s>(
    slot: &'s mut Option<RunRecordStream>,
    config: &PipelineConfig,
    run: u32,
) -> Result<&'s mut RunRecordStream, PipelineError> {
    if slot.as_ref().is_some_and(|s| s.run() != run) {
        close_stream(slot.take())?;
    }
    let stream = match slot.take() {
        Some(stream) => stream,
        None => RunRecordStream::open(&config.output_dir, run, &config.process_name)?,
    };
    Ok(slot.insert(stream))
}
