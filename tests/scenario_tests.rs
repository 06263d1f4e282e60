// Worked scenarios: one image's detections through aggregate and evaluate

use sitesafe_core::{
    aggregate, evaluate, BoundingBox, ClassCatalog, CountTable, Detection, Error, SafetyCounts,
    SafetyVerdict,
};

fn catalog() -> ClassCatalog {
    ClassCatalog::new(["person", "no-helmet", "no-vest", "helmet", "vest"]).unwrap()
}

fn detections(catalog: &ClassCatalog, labels: &[&str]) -> Vec<Detection> {
    labels
        .iter()
        .enumerate()
        .map(|(i, label)| {
            Detection::new(
                catalog.index_of(label).unwrap_or(usize::MAX),
                *label,
                0.5 + (i as f32) * 0.01,
                BoundingBox::new(i as f32 * 20.0, 10.0, 15.0, 40.0),
            )
        })
        .collect()
}

fn pairs(table: &CountTable) -> Vec<(&str, usize)> {
    table.iter().collect()
}

#[test]
fn test_scenario_a_missing_helmet() {
    let catalog = catalog();
    let table = aggregate(&catalog, &detections(&catalog, &["person", "person", "no-helmet"])).unwrap();

    assert_eq!(
        pairs(&table),
        vec![
            ("person", 2),
            ("no-helmet", 1),
            ("no-vest", 0),
            ("helmet", 0),
            ("vest", 0)
        ]
    );
    assert_eq!(
        evaluate(&table),
        SafetyVerdict::ViolationDetected(SafetyCounts {
            person: 2,
            no_helmet: 1,
            no_vest: 0
        })
    );
}

#[test]
fn test_scenario_b_empty_image() {
    let catalog = catalog();
    let table = aggregate(&catalog, &[]).unwrap();

    assert_eq!(table.len(), 5);
    assert!(table.iter().all(|(_, count)| count == 0));
    assert_eq!(evaluate(&table), SafetyVerdict::NoWorkersDetected);
}

#[test]
fn test_scenario_c_fully_equipped_worker() {
    let catalog = catalog();
    let table = aggregate(&catalog, &detections(&catalog, &["person", "helmet", "vest"])).unwrap();

    assert_eq!(
        pairs(&table),
        vec![
            ("person", 1),
            ("no-helmet", 0),
            ("no-vest", 0),
            ("helmet", 1),
            ("vest", 1)
        ]
    );
    assert_eq!(
        evaluate(&table),
        SafetyVerdict::AllSafe(SafetyCounts {
            person: 1,
            no_helmet: 0,
            no_vest: 0
        })
    );
}

#[test]
fn test_scenario_d_unknown_label() {
    let catalog = catalog();
    let err = aggregate(&catalog, &detections(&catalog, &["person", "truck"])).unwrap_err();

    assert_eq!(
        err,
        Error::UnknownClass {
            label: "truck".to_string(),
            catalog_size: 5
        }
    );
}

#[test]
fn test_violations_without_any_person_are_not_reported() {
    let catalog = catalog();
    let table = aggregate(&catalog, &detections(&catalog, &["no-helmet", "no-vest"])).unwrap();
    assert_eq!(evaluate(&table), SafetyVerdict::NoWorkersDetected);
}

#[test]
fn test_catalog_without_safety_labels() {
    let catalog = ClassCatalog::new(["car", "truck"]).unwrap();
    let table = aggregate(&catalog, &detections(&catalog, &["car", "car"])).unwrap();

    assert_eq!(table.count_or_zero("person"), 0);
    assert_eq!(table.get("person"), None);
    assert_eq!(evaluate(&table), SafetyVerdict::NoWorkersDetected);
}

#[test]
fn test_helmet_and_vest_counts_do_not_offset_violations() {
    let catalog = catalog();
    let table = aggregate(
        &catalog,
        &detections(&catalog, &["person", "helmet", "helmet", "vest", "no-vest"]),
    )
    .unwrap();

    let verdict = evaluate(&table);
    assert!(verdict.is_violation());
    assert_eq!(verdict.counts().map(|c| c.no_vest), Some(1));
}

#[test]
fn test_verdict_json_shape() {
    let catalog = catalog();
    let table = aggregate(&catalog, &detections(&catalog, &["person", "no-vest"])).unwrap();
    let json = serde_json::to_value(evaluate(&table)).unwrap();

    assert_eq!(
        json,
        serde_json::json!({
            "status": "violation_detected",
            "person": 1,
            "no_helmet": 0,
            "no_vest": 1
        })
    );
}
