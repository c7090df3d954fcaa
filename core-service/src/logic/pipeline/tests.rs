use super::*;
use crate::error::PipelineError;
use crate::logic::dataset::{read_predictions, read_rules, write_students};
use crate::logic::generator::Generator;
use crate::logic::store::{FileStore, MemoryStore};
use ndarray::array;
use tempfile::tempdir;

const HEADER: &str =
    "StudentID,Name,Attendance,Assignments,Tutorials,Volunteering,MOOCs,EventsParticipation,PerformanceLevel";

/// Ten rows labelled by the generator's threshold rule
fn hand_crafted() -> String {
    let rows = [
        "S0001,Ann Low,60,9,4,3,1,4,Low",
        "S0002,Ben Low,62,8,3,2,2,3,Low",
        "S0003,Cat Low,70,10,5,4,3,5,Low",
        "S0004,Dan High,80,9,4,3,1,4,High",
        "S0005,Eve High,85,8,3,2,1,3,High",
        "S0006,Fay High,90,10,5,5,2,5,High",
        "S0007,Gus High,95,9,4,4,3,4,High",
        "S0008,Hal Medium,78,9,2,3,1,4,Medium",
        "S0009,Ivy Medium,88,8,1,4,2,5,Medium",
        "S0010,Jon Medium,92,10,4,1,2,4,Medium",
    ];
    format!("{}\n{}\n", HEADER, rows.join("\n"))
}

fn seeded_store() -> MemoryStore {
    MemoryStore::with_table(Table::RawStudents, hand_crafted())
}

#[test]
fn test_hand_crafted_predictions() {
    let store = seeded_store();
    let report = Pipeline::default().run(&store).unwrap();

    assert_eq!(report.rows, 10);
    assert_eq!(report.training_accuracy, 1.0);
    assert!(report.tree_depth <= 3);

    let predictions = read_predictions(&store.read(Table::Predictions).unwrap()).unwrap();
    let dan = predictions.iter().find(|r| r.student_id == "S0004").unwrap();
    assert_eq!(dan.predicted_performance, PerformanceLevel::High);

    let ann = predictions.iter().find(|r| r.student_id == "S0001").unwrap();
    assert_eq!(ann.predicted_performance, PerformanceLevel::Low);
}

#[test]
fn test_low_attendance_always_low() {
    let pipeline = Pipeline::default();
    let records = read_students(hand_crafted().as_bytes()).unwrap();
    let x = feature_matrix(&records);
    let labels: Vec<_> = records.iter().map(|r| r.performance_level).collect();
    let tree = DecisionTree::fit(
        x.view(),
        &labels,
        &FEATURE_COLUMNS,
        TreeParams {
            max_depth: pipeline.config().max_depth,
            seed: pipeline.config().random_seed,
            ..Default::default()
        },
    )
    .unwrap();

    for other in [[60.0, 10.0, 5.0, 5.0, 3.0, 5.0], [60.0, 7.0, 1.0, 0.0, 0.0, 2.0]] {
        let row = ndarray::Array1::from_vec(other.to_vec());
        assert_eq!(tree.predict_row(row.view()), PerformanceLevel::Low);
    }
    assert_eq!(
        tree.predict_row(array![80.0, 9.0, 4.0, 3.0, 1.0, 4.0].view()),
        PerformanceLevel::High
    );
    assert!(tree_text_mentions(&export_text(&tree), "Attendance <= 74.00"));
}

fn tree_text_mentions(text: &str, needle: &str) -> bool {
    text.lines().any(|l| l.contains(needle))
}

#[test]
fn test_training_is_deterministic() {
    let rows = Generator::with_seed(300, 5).generate();
    let raw = write_students(&rows).unwrap();

    let a = Pipeline::default().analyze(&raw).unwrap();
    let b = Pipeline::default().analyze(&raw).unwrap();

    assert_eq!(a.predictions, b.predictions);
    assert_eq!(a.report.tree_text, b.report.tree_text);
    assert_eq!(a.rule_records(), b.rule_records());
}

#[test]
fn test_rules_respect_thresholds() {
    let rows = Generator::with_seed(1000, 42).generate();
    let raw = write_students(&rows).unwrap();
    let config = PipelineConfig::default();
    let analysis = Pipeline::new(config.clone()).analyze(&raw).unwrap();

    for rule in &analysis.rules {
        assert!(rule.support >= config.min_support);
        assert!(rule.confidence >= config.min_confidence);
        assert!((rule.confidence - rule.support / rule.antecedent_support).abs() < 1e-9);
    }
    assert_eq!(analysis.report.rules, analysis.rules.len());
}

#[test]
fn test_distribution_matches_predictions() {
    let store = seeded_store();
    let report = Pipeline::default().run(&store).unwrap();

    let total: usize = report.predicted_distribution.values().sum();
    assert_eq!(total, 10);
    assert_eq!(report.predicted_distribution.get(&PerformanceLevel::Low), Some(&3));
    assert!(report.summary().contains("Processed 10 students"));
}

#[test]
fn test_rules_table_written_at_full_precision() {
    let store = seeded_store();
    let analysis = Pipeline::default().analyze(hand_crafted().as_bytes()).unwrap();
    Pipeline::default().run(&store).unwrap();

    let stored = read_rules(&store.read(Table::Rules).unwrap()).unwrap();
    assert_eq!(stored, analysis.rule_records());
}

#[test]
fn test_missing_raw_table() {
    let store = MemoryStore::new();
    assert!(matches!(
        Pipeline::default().run(&store),
        Err(PipelineError::MissingFile(Table::RawStudents))
    ));
}

#[test]
fn test_failed_run_keeps_previous_outputs() {
    let dir = tempdir().unwrap();
    let store = FileStore::new(dir.path());
    store
        .commit(Commit::new().put(Table::RawStudents, hand_crafted().into_bytes()))
        .unwrap();

    Pipeline::default().run(&store).unwrap();
    let predictions = store.read(Table::Predictions).unwrap();
    let rules = store.read(Table::Rules).unwrap();

    let bad = b"StudentID,Name,Attendance\nS1,Nobody,50\n".to_vec();
    let result = Pipeline::default().ingest(&store, bad);

    assert!(matches!(result, Err(PipelineError::MalformedInput(_))));
    assert_eq!(store.read(Table::Predictions).unwrap(), predictions);
    assert_eq!(store.read(Table::Rules).unwrap(), rules);
    assert_eq!(store.read(Table::RawStudents).unwrap(), hand_crafted().into_bytes());
}

#[test]
fn test_ingest_replaces_all_tables() {
    let store = seeded_store();
    Pipeline::default().run(&store).unwrap();

    let rows = Generator::with_seed(50, 8).generate();
    let raw = write_students(&rows).unwrap();
    let report = Pipeline::default().ingest(&store, raw.clone()).unwrap();

    assert_eq!(report.rows, 50);
    assert_eq!(store.read(Table::RawStudents).unwrap(), raw);
    let predictions = read_predictions(&store.read(Table::Predictions).unwrap()).unwrap();
    assert_eq!(predictions.len(), 50);
    assert_eq!(predictions[0].student_id, "S0001");
}

#[test]
fn test_zero_support_config_is_rejected() {
    // Constant columns put every row on one side of the median
    let rows: Vec<String> = (1..=6)
        .map(|i| format!("S{:04},Same Student,{},9,3,2,1,3,Medium", i, 70 + i * 3))
        .collect();
    let raw = format!("{}\n{}\n", HEADER, rows.join("\n"));
    let store = MemoryStore::with_table(Table::RawStudents, raw);

    let pipeline = Pipeline::new(PipelineConfig::default().with_thresholds(0.0, 0.6));
    assert!(matches!(pipeline.run(&store), Err(PipelineError::InvalidConfig(_))));
    assert!(!store.exists(Table::Rules));

    let report = Pipeline::default().run(&store).unwrap();
    let rules = read_rules(&store.read(Table::Rules).unwrap()).unwrap();
    assert_eq!(report.rules, rules.len());
    assert!(rules
        .iter()
        .all(|r| r.confidence.is_finite() && r.confidence >= 0.6 && r.confidence <= 1.0));
}
