use doublet_common::{
    Cluster, ClusterRef, DetId, DetLayer, DoubletConfig, GlobalPoint, HitDoublet,
    LayerPairDoublets, ModuleSurface, Pixel, PixelHit, TruthAssociation,
};
use doublet_features::{DoubletSelector, FeatureEncoder};
use doublet_inference::{
    DoubletBatch, DoubletClassifier, DoubletScore, InferenceError, OnnxDoubletClassifier,
    TensorNames,
};
use doublet_truth::LabelResolver;

const MODEL_PATH: &str = "models/doublet_cnn.onnx";

/// Scores every doublet by its Δr, so results are easy to predict
struct DeltaRClassifier;

impl DoubletClassifier for DeltaRClassifier {
    fn classify(&mut self, batch: &DoubletBatch) -> Result<Vec<DoubletScore>, InferenceError> {
        Ok(batch
            .feature_tensor()
            .rows()
            .into_iter()
            .map(|row| {
                let real = (row[63] / 10.0).clamp(0.0, 1.0);
                DoubletScore::new(1.0 - real, real)
            })
            .collect())
    }

    fn name(&self) -> &str {
        "delta-r"
    }
}

fn hit(r: f32, cluster: u32) -> PixelHit {
    PixelHit {
        position: GlobalPoint::new(r, 0.0, 0.0),
        phi: 0.0,
        r,
        det_id: DetId::Barrel {
            layer: 1,
            ladder: 1,
            module: 1,
        },
        surface: ModuleSurface::default(),
        cluster_ref: ClusterRef(cluster),
        cluster: Cluster {
            x: 20.0,
            y: 20.0,
            size_x: 1,
            size_y: 1,
            charge: 300,
            pixels: vec![Pixel {
                x: 20,
                y: 20,
                adc: 300,
            }],
            spans_two_rocs: false,
            has_bad_pixels: false,
            is_on_edge: false,
        },
    }
}

fn group() -> LayerPairDoublets {
    LayerPairDoublets {
        inner_layer: DetLayer { seq_num: 0 },
        outer_layer: DetLayer { seq_num: 1 },
        inner_hits: vec![hit(3.0, 0)],
        outer_hits: vec![hit(5.0, 1), hit(9.0, 2)],
        doublets: vec![
            HitDoublet { inner: 0, outer: 0 },
            HitDoublet { inner: 0, outer: 1 },
        ],
    }
}

fn assemble(config: &DoubletConfig, group: &LayerPairDoublets) -> DoubletBatch {
    let selector = DoubletSelector::new(config);
    let encoder = FeatureEncoder::new(config);
    let resolver = LabelResolver::new(config);
    let truth = TruthAssociation::new();

    let selected = selector.select(group).unwrap();
    let encoded = encoder.encode_layer_pair(&selected);
    let labels: Vec<f32> = selected
        .doublets
        .iter()
        .map(|d| resolver.resolve(&truth, d.inner, d.outer).label())
        .collect();
    DoubletBatch::assemble(config, &encoded, &labels).unwrap()
}

fn encoder_delta_r(config: &DoubletConfig, group: &LayerPairDoublets) -> Vec<f32> {
    let selected = DoubletSelector::new(config).select(group).unwrap();
    FeatureEncoder::new(config)
        .encode_layer_pair(&selected)
        .iter()
        .map(|d| d.cross.delta_r)
        .collect()
}

#[test]
fn test_stub_classifier_scores_in_batch_order() {
    let config = DoubletConfig::default();
    let batch = assemble(&config, &group());
    assert_eq!(batch.len(), 2);
    assert_eq!(batch.labels(), &[0.0, 0.0]);

    // Column 63 carries the encoder's Δr for each doublet
    let delta_r = encoder_delta_r(&config, &group());
    assert_eq!(delta_r, vec![2.0, 6.0]);
    let features = batch.feature_tensor();
    for (d, expected) in delta_r.iter().enumerate() {
        assert_eq!(features[[d, 63]], *expected);
    }

    let mut classifier = DeltaRClassifier;
    let scores = classifier.classify(&batch).unwrap();
    assert_eq!(scores.len(), 2);
    assert!((scores[0].real - 0.2).abs() < 1e-6);
    assert!((scores[1].real - 0.6).abs() < 1e-6);
    assert_eq!(classifier.name(), "delta-r");
}

#[test]
fn test_missing_model_is_reported() {
    let result = OnnxDoubletClassifier::new("no/such/model.onnx", TensorNames::default(), false);
    assert!(matches!(result, Err(InferenceError::ModelLoad(_))));
}

#[test]
#[ignore] // Requires the exported doublet CNN in models/
fn test_onnx_classifier_returns_probabilities() {
    let config = DoubletConfig::default();
    let batch = assemble(&config, &group());

    let mut classifier =
        OnnxDoubletClassifier::new(MODEL_PATH, TensorNames::default(), false).unwrap();
    let scores = classifier.classify(&batch).unwrap();

    assert_eq!(scores.len(), batch.len());
    for score in scores {
        assert!((score.fake + score.real - 1.0).abs() < 1e-4, "{score:?}");
    }
}
