// Integration tests for smartshuffle
use smartshuffle_core::{
    DistanceMatrix, Error, FeatureRecord, FeatureSchema, Item, TourSolver, DEFAULT_FEATURE_FIELDS,
};
use smartshuffle_session::{CapabilityProfile, SessionConfig, ShuffleSession};

fn xy_config() -> SessionConfig {
    SessionConfig::default().with_schema(FeatureSchema::new(vec!["x".to_string(), "y".to_string()]))
}

fn xy_session(points: &[(f64, f64)]) -> ShuffleSession {
    let items = (0..points.len())
        .map(|i| Item::new(format!("id{}", i), format!("track {}", i)))
        .collect();
    let records: Vec<FeatureRecord> = points
        .iter()
        .map(|&(x, y)| FeatureRecord::new().with("x", x).with("y", y))
        .collect();
    ShuffleSession::new(items, &records, xy_config()).unwrap()
}

fn audio_record(seed: usize) -> FeatureRecord {
    DEFAULT_FEATURE_FIELDS
        .iter()
        .enumerate()
        .map(|(k, field)| (*field, ((seed * 37 + k * 11) % 23) as f64 / 7.0))
        .collect()
}

#[test]
fn test_two_cluster_scenario() {
    let session = xy_session(&[(0.0, 0.0), (0.0, 1.0), (10.0, 10.0), (10.0, 11.0)]);
    let tour = session.get_tour().unwrap();

    let expected = 1.0 + 181f64.sqrt() + 1.0;
    let alternative = 1.0 + 200f64.sqrt() + 1.0;
    assert!(expected < alternative);
    assert_eq!(tour.order(), &[0, 1, 2, 3]);
    assert!((tour.length() - expected).abs() < 1e-6);
    assert!(session.warnings().is_empty());
}

#[test]
fn test_exact_length_on_planar_points() {
    let points = [[0.0, 0.0], [0.0, 1.0], [10.0, 10.0], [10.0, 11.0]];
    let tour = TourSolver::default().solve(&points).unwrap();
    let d = DistanceMatrix::from_rows(&points);
    let expected = d.get(0, 1) + d.get(1, 2) + d.get(2, 3);
    assert_eq!(tour.order(), &[0, 1, 2, 3]);
    assert_eq!(tour.length(), expected);
}

#[test]
fn test_empty_session() {
    let session = xy_session(&[]);
    assert!(session.get_tour().unwrap().is_empty());
    assert!(session.get_embedding().is_empty());

    let chart = session.get_chart_data(CapabilityProfile::Full).unwrap();
    assert!(chart.original.is_empty());
    assert!(chart.sorted.is_empty());
    assert!(session.warnings().is_empty());
}

#[test]
fn test_nan_is_a_data_error() {
    let items = vec![Item::new("a", "A"), Item::new("b", "B")];
    let records = vec![
        FeatureRecord::new().with("x", 0.0).with("y", 0.0),
        FeatureRecord::new().with("x", f64::NAN).with("y", 0.0),
    ];
    let err = ShuffleSession::new(items, &records, xy_config()).err().unwrap();
    assert!(err.is_data_error());
    assert!(matches!(err, Error::NonFinite { index: 1, .. }));
}

#[test]
fn test_missing_field_is_a_data_error() {
    let items = vec![Item::new("a", "A")];
    let records = vec![FeatureRecord::new().with("x", 0.0)];
    let err = ShuffleSession::new(items, &records, xy_config()).err().unwrap();
    assert!(matches!(err, Error::MissingField { index: 0, .. }));
}

#[test]
fn test_default_schema_pipeline_is_a_permutation() {
    let n = 25;
    let items: Vec<Item> = (0..n).map(|i| Item::new(i as u64, format!("track {}", i))).collect();
    let records: Vec<FeatureRecord> = (0..n).map(audio_record).collect();
    let session = ShuffleSession::new(items, &records, SessionConfig::default()).unwrap();

    assert_eq!(session.get_feature_matrix().dim(), 10);
    let tour = session.get_tour().unwrap();
    assert_eq!(tour.order()[0], 0);

    let mut sorted = tour.order().to_vec();
    sorted.sort_unstable();
    assert_eq!(sorted, (0..n).collect::<Vec<_>>());
    assert!(tour.length() <= tour.construction_length() + 1e-9);
}

#[test]
fn test_reordering_matches_sorted_labels() {
    let session = xy_session(&[
        (3.0, 3.0),
        (4.0, 6.0),
        (6.0, 0.0),
        (5.0, 3.0),
        (2.0, 5.0),
        (9.0, 9.0),
    ]);
    let tour = session.get_tour().unwrap();
    let chart = session.get_chart_data(CapabilityProfile::Full).unwrap();

    let reordered: Vec<String> = tour
        .order()
        .iter()
        .map(|&i| session.items()[i].name.clone())
        .collect();
    assert_eq!(chart.sorted.labels(), reordered.iter().map(String::as_str).collect::<Vec<_>>());

    let shuffled: Vec<String> = session
        .shuffled_items()
        .unwrap()
        .into_iter()
        .map(|i| i.name)
        .collect();
    assert_eq!(shuffled, reordered);
}

#[test]
fn test_embedding_rows_follow_items() {
    let session = xy_session(&[(0.0, 0.0), (0.0, 1.0), (10.0, 10.0), (10.0, 11.0)]);
    let embedding = session.get_embedding();
    let chart = session.get_chart_data(CapabilityProfile::Constrained).unwrap();

    for (i, point) in chart.original.points.iter().enumerate() {
        assert_eq!(point.index, i);
        assert_eq!([point.x, point.y], embedding.point(i));
        assert_eq!(point.label, session.items()[i].name);
    }
}

#[test]
fn test_sessions_are_reproducible() {
    let points = [(0.3, 0.1), (0.9, 0.4), (0.2, 0.8), (0.5, 0.5), (0.7, 0.9), (0.1, 0.3)];
    let a = xy_session(&points);
    let b = xy_session(&points);
    assert_eq!(a.get_embedding(), b.get_embedding());
    assert_eq!(a.get_tour().unwrap(), b.get_tour().unwrap());
}

#[test]
fn test_chart_data_serializes() {
    let session = xy_session(&[(0.0, 0.0), (1.0, 0.0)]);
    let chart = session.get_chart_data(CapabilityProfile::Constrained).unwrap();
    let json = serde_json::to_value(&chart).unwrap();

    assert_eq!(json["profile"], "constrained");
    assert_eq!(json["original"]["name"], "original");
    assert_eq!(json["sorted"]["points"].as_array().unwrap().len(), 2);
    assert_eq!(json["sorted"]["points"][0]["label"], "track 0");
}
