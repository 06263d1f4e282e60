use proptest::prelude::*;
use sitesafe_core::safety::{NO_HELMET_LABEL, NO_VEST_LABEL, PERSON_LABEL};
use sitesafe_core::{
    aggregate, evaluate, BoundingBox, ClassCatalog, CountTable, Detection, Error,
    SafetyCounts, SafetyVerdict,
};

/// Catalogs with 1-8 filler labels and any subset of the safety labels,
/// shuffled into arbitrary order
fn catalog_strategy() -> impl Strategy<Value = ClassCatalog> {
    (
        prop::collection::btree_set("x[a-z]{0,7}", 1..8),
        any::<[bool; 3]>(),
    )
        .prop_flat_map(|(filler, include)| {
            let mut labels: Vec<String> = filler.into_iter().collect();
            for (keep, label) in include.iter().zip([PERSON_LABEL, NO_HELMET_LABEL, NO_VEST_LABEL]) {
                if *keep {
                    labels.push(label.to_string());
                }
            }
            Just(labels).prop_shuffle()
        })
        .prop_map(|labels| ClassCatalog::new(labels).unwrap())
}

/// A catalog plus detections drawn only from it
fn scene_strategy() -> impl Strategy<Value = (ClassCatalog, Vec<Detection>)> {
    catalog_strategy().prop_flat_map(|catalog| {
        let n = catalog.len();
        let ids = prop::collection::vec(0..n, 0..60);
        (Just(catalog), ids).prop_map(|(catalog, ids)| {
            let detections = ids
                .into_iter()
                .map(|id| {
                    let label = catalog.label(id).unwrap().to_string();
                    Detection::new(id, label, 0.9, BoundingBox::new(0.0, 0.0, 10.0, 10.0))
                })
                .collect();
            (catalog, detections)
        })
    })
}

/// Tables over the safety labels plus `helmet`, built through `aggregate`
/// from arbitrary per-label counts
fn table_strategy() -> impl Strategy<Value = CountTable> {
    (0usize..5, 0usize..5, 0usize..5, 0usize..5).prop_map(|(person, no_helmet, no_vest, helmet)| {
        let catalog =
            ClassCatalog::new([PERSON_LABEL, NO_HELMET_LABEL, NO_VEST_LABEL, "helmet"]).unwrap();
        let detections: Vec<Detection> = [person, no_helmet, no_vest, helmet]
            .into_iter()
            .enumerate()
            .flat_map(|(id, count)| {
                let label = catalog.label(id).unwrap().to_string();
                std::iter::repeat_with(move || {
                    Detection::new(id, label.clone(), 0.9, BoundingBox::new(0.0, 0.0, 10.0, 10.0))
                })
                .take(count)
            })
            .collect();
        aggregate(&catalog, &detections).unwrap()
    })
}

proptest! {
    #[test]
    fn test_aggregate_is_total_over_catalog_labels((catalog, detections) in scene_strategy()) {
        let table = aggregate(&catalog, &detections);
        prop_assert!(table.is_ok());
    }

    #[test]
    fn test_aggregate_zero_fills((catalog, detections) in scene_strategy()) {
        let table = aggregate(&catalog, &detections).unwrap();
        for label in catalog.iter() {
            let expected = detections.iter().filter(|d| d.class_label == label).count();
            prop_assert_eq!(table.get(label), Some(expected));
        }
    }

    #[test]
    fn test_table_covers_catalog_in_order((catalog, detections) in scene_strategy()) {
        let table = aggregate(&catalog, &detections).unwrap();
        let labels: Vec<&str> = table.iter().map(|(label, _)| label).collect();
        let expected: Vec<&str> = catalog.iter().collect();
        prop_assert_eq!(labels, expected);
        prop_assert_eq!(table.total(), detections.len());
    }

    #[test]
    fn test_aggregate_ignores_detection_order((catalog, detections) in scene_strategy()) {
        let mut reversed = detections.clone();
        reversed.reverse();
        prop_assert_eq!(
            aggregate(&catalog, &detections).unwrap(),
            aggregate(&catalog, &reversed).unwrap()
        );
    }

    #[test]
    fn test_unknown_label_always_fails(
        (catalog, mut detections) in scene_strategy(),
        position in any::<prop::sample::Index>(),
    ) {
        let stray = Detection::new(0, "truck", 0.9, BoundingBox::new(0.0, 0.0, 1.0, 1.0));
        let at = position.index(detections.len() + 1);
        detections.insert(at, stray);

        let err = aggregate(&catalog, &detections).unwrap_err();
        prop_assert!(matches!(err, Error::UnknownClass { ref label, .. } if label == "truck"), "unexpected error: {:?}", err);
    }

    #[test]
    fn test_verdict_precedence(table in table_strategy()) {
        let person = table.count_or_zero(PERSON_LABEL);
        let no_helmet = table.count_or_zero(NO_HELMET_LABEL);
        let no_vest = table.count_or_zero(NO_VEST_LABEL);

        let verdict = evaluate(&table);
        if person == 0 {
            prop_assert_eq!(verdict, SafetyVerdict::NoWorkersDetected);
        } else if no_helmet > 0 || no_vest > 0 {
            prop_assert_eq!(verdict, SafetyVerdict::ViolationDetected(SafetyCounts { person, no_helmet, no_vest }));
        } else {
            prop_assert_eq!(verdict, SafetyVerdict::AllSafe(SafetyCounts { person, no_helmet, no_vest }));
        }
    }

    #[test]
    fn test_verdict_is_exactly_one_variant((catalog, detections) in scene_strategy()) {
        let table = aggregate(&catalog, &detections).unwrap();
        let verdict = evaluate(&table);

        let flags = [
            matches!(verdict, SafetyVerdict::NoWorkersDetected),
            matches!(verdict, SafetyVerdict::ViolationDetected(_)),
            matches!(verdict, SafetyVerdict::AllSafe(_)),
        ];
        prop_assert_eq!(flags.iter().filter(|f| **f).count(), 1);

        if let Some(counts) = verdict.counts() {
            prop_assert_eq!(counts, SafetyCounts::from_table(&table));
            prop_assert!(counts.person > 0);
        }
    }
}
