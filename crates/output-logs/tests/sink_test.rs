use doublet_common::{
    BeamSpot, Cluster, ClusterRef, DetId, DoubletConfig, EventId, GlobalPoint, ModuleSurface,
    Pixel, PixelHit,
};
use doublet_features::{EncodedDoublet, FeatureEncoder, LayerPairIds};
use doublet_inference::DoubletScore;
use doublet_output::{
    run_stream_path, DoubletRecord, DoubletSink, EventHeader, EventLogPaths, EventTextLogs,
    RunRecordStream,
};
use doublet_truth::{ParticleBlock, TruthBlock};
use std::fs;
use tempfile::TempDir;

fn hit(r: f32, adc: u16) -> PixelHit {
    PixelHit {
        position: GlobalPoint::new(r, 0.0, 2.0),
        phi: 0.0,
        r,
        det_id: DetId::Barrel {
            layer: 1,
            ladder: 2,
            module: 3,
        },
        surface: ModuleSurface::default(),
        cluster_ref: ClusterRef(0),
        cluster: Cluster {
            x: 30.0,
            y: 40.0,
            size_x: 1,
            size_y: 1,
            charge: u32::from(adc),
            pixels: vec![Pixel { x: 30, y: 40, adc }],
            spans_two_rocs: false,
            has_bad_pixels: false,
            is_on_edge: false,
        },
    }
}

fn header() -> EventHeader {
    EventHeader {
        id: EventId {
            run: 1,
            lumi: 7,
            event: 12345,
        },
        pileup: 35,
        beam_spot: BeamSpot {
            x0: 0.1,
            y0: -0.05,
            z0: 0.5,
            sigma_z: 3.5,
        },
    }
}

fn encoded() -> EncodedDoublet {
    let config = DoubletConfig::default();
    FeatureEncoder::new(&config).encode_doublet(
        0,
        LayerPairIds { inner: 0, outer: 1 },
        (&hit(3.0, 200), 0),
        (&hit(7.0, 350), 1),
    )
}

fn unmatched_truth() -> TruthBlock {
    TruthBlock {
        header: [-1.0; 3],
        inner: ParticleBlock::missing(),
        outer: ParticleBlock::missing(),
    }
}

#[test]
fn test_text_logs_layout() {
    let dir = TempDir::new().unwrap();
    let out_dir = dir.path().join("doublets");
    let event = header();
    let doublet = encoded();
    let truth = unmatched_truth();
    let image = vec![0.5f32; 5120];
    let features = doublet.feature_vector();

    let record = DoubletRecord {
        event: &event,
        inner_seq: 0,
        outer_seq: 1,
        doublet: &doublet,
        truth: &truth,
        label: 0.0,
        image: &image,
        features: &features,
    };

    let mut logs = EventTextLogs::open(&out_dir, &event.id, "HLT").unwrap();
    logs.write_inputs(&record).unwrap();
    logs.write_score(&record, &DoubletScore::new(0.75, 0.25))
        .unwrap();
    logs.finish().unwrap();

    let paths = EventLogPaths::new(&out_dir, &event.id, "HLT");
    assert_eq!(paths, *logs.paths());
    assert!(paths
        .doublets
        .ends_with("doublets/7_1_12345_HLT_dnn_doublets.txt"));

    let raw = fs::read_to_string(&paths.doublets).unwrap();
    let fields: Vec<&str> = raw.trim_end().split('\t').collect();
    assert_eq!(fields.len(), 10 + 286 + 286 + 7 + 55 + 1);
    assert_eq!(&fields[..6], &["1", "12345", "7", "35", "0", "1"]);
    assert_eq!(&fields[6..10], &["0.1", "-0.05", "0.5", "3.5"]);
    assert_eq!(fields.last(), Some(&"542.1369"));
    // Inner charge closes the inner raw row
    assert_eq!(fields[10 + 285], "200");

    let tf = fs::read_to_string(&paths.tensors).unwrap();
    let fields: Vec<&str> = tf.trim_end().split('\t').collect();
    assert_eq!(fields.len(), 10 + 5120 + 67 + 1);
    assert_eq!(fields[10], "0.5");

    let inf = fs::read_to_string(&paths.inference).unwrap();
    assert_eq!(inf, "0.75 - 0.25 - 0\n");
}

#[test]
fn test_text_logs_append() {
    let dir = TempDir::new().unwrap();
    let event = header();
    let doublet = encoded();
    let truth = unmatched_truth();
    let image = vec![0.0f32; 5120];
    let features = doublet.feature_vector();
    let record = DoubletRecord {
        event: &event,
        inner_seq: 0,
        outer_seq: 1,
        doublet: &doublet,
        truth: &truth,
        label: 1.0,
        image: &image,
        features: &features,
    };

    for _ in 0..2 {
        let mut logs = EventTextLogs::open(dir.path(), &event.id, "RECO").unwrap();
        logs.write_inputs(&record).unwrap();
        logs.write_score(&record, &DoubletScore::new(0.1, 0.9)).unwrap();
        logs.finish().unwrap();
    }

    let paths = EventLogPaths::new(dir.path(), &event.id, "RECO");
    assert_eq!(fs::read_to_string(&paths.doublets).unwrap().lines().count(), 2);
    assert_eq!(fs::read_to_string(&paths.tensors).unwrap().lines().count(), 2);
    assert_eq!(
        fs::read_to_string(&paths.inference).unwrap(),
        "0.1 - 0.9 - 1\n0.1 - 0.9 - 1\n"
    );
}

#[test]
fn test_run_stream_writes_one_object_per_score() {
    let dir = TempDir::new().unwrap();
    let event = header();
    let doublet = encoded();
    let truth = unmatched_truth();
    let image = vec![0.0f32; 5120];
    let features = doublet.feature_vector();
    let record = DoubletRecord {
        event: &event,
        inner_seq: 0,
        outer_seq: 1,
        doublet: &doublet,
        truth: &truth,
        label: 0.0,
        image: &image,
        features: &features,
    };

    let mut stream = RunRecordStream::open(dir.path(), 1, "HLT").unwrap();
    stream.write_inputs(&record).unwrap();
    assert_eq!(stream.written(), 0);
    stream
        .write_score(&record, &DoubletScore::new(0.6, 0.4))
        .unwrap();
    stream
        .write_score(&record, &DoubletScore::new(0.3, 0.7))
        .unwrap();
    stream.finish().unwrap();
    assert_eq!(stream.written(), 2);
    assert_eq!(stream.path(), run_stream_path(dir.path(), 1, "HLT"));

    let content = fs::read_to_string(stream.path()).unwrap();
    let lines: Vec<serde_json::Value> = content
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);

    let first = &lines[0];
    assert_eq!(first["id"]["event"], 12345);
    assert_eq!(first["pileup"], 35);
    assert_eq!(first["layer_ids"]["outer"], 1);
    assert_eq!(first["inner"]["sum_adc"], 200.0);
    assert_eq!(first["inner_pad"].as_array().unwrap().len(), 256);
    assert_eq!(first["truth"]["header"][0], -1.0);
    assert_eq!(first["truth"]["inner"].as_array().unwrap().len(), 26);
    assert_eq!(lines[1]["score"]["real"].as_f64().unwrap() as f32, 0.7);
}
