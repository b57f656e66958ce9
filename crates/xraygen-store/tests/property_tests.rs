use proptest::prelude::*;
use serde_json::{Map, Value, json};
use tempfile::TempDir;
use xraygen_schema::{GeneratedDocument, IssueRecord, TestRecord};
use xraygen_store::{ArtifactStore, load_document, strip_comments, write_document};

fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(|n| json!(n)),
        "[a-z /*]{0,10}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 20, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,8}", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect::<Map<_, _>>())),
        ]
    })
}

fn arb_document() -> impl Strategy<Value = GeneratedDocument> {
    let test = ("[A-Za-z0-9 ]{1,20}", "[A-Za-z0-9 /*\"]{0,30}", prop::option::of("[A-Z][a-z]{2,8}"))
        .prop_map(|(summary, description, priority)| TestRecord {
            description,
            priority,
            ..TestRecord::new(summary)
        });
    let set = ("[A-Za-z ]{1,20}", "[a-z ]{0,20}")
        .prop_map(|(summary, description)| IssueRecord::new(summary, description));
    (
        prop::collection::vec(test, 0..4),
        prop::collection::vec(set.clone(), 0..3),
        prop::collection::vec(set, 0..2),
    )
        .prop_map(|(tests, test_sets, test_plans)| GeneratedDocument {
            tests,
            test_sets,
            test_plans,
            ..GeneratedDocument::default()
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn load_after_save_returns_the_document(doc in arb_document()) {
        let temp = TempDir::new().unwrap();
        let store = ArtifactStore::new(temp.path()).unwrap();
        let path = store.save(&doc, "XTP", "XTP-42").unwrap();
        prop_assert_eq!(load_document(&path).unwrap(), doc);
    }

    #[test]
    fn any_values_at_document_keys_load_as_sequences(
        tests in arb_json(),
        sets in arb_json(),
    ) {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("doc.json");
        std::fs::write(&path, json!({"tests": tests, "testSets": sets}).to_string()).unwrap();

        let doc = load_document(&path).unwrap();
        let reserialized = serde_json::to_value(&doc).unwrap();
        prop_assert!(reserialized["tests"].is_array());
        prop_assert!(reserialized["testSets"].is_array());
    }

    #[test]
    fn stripping_leaves_comment_free_json_unchanged(value in arb_json()) {
        let text = serde_json::to_string_pretty(&value).unwrap();
        prop_assert_eq!(strip_comments(&text), text);
    }

    #[test]
    fn rewrite_is_idempotent(doc in arb_document()) {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("doc.json");
        write_document(&path, &doc).unwrap();
        let first = std::fs::read_to_string(&path).unwrap();
        write_document(&path, &load_document(&path).unwrap()).unwrap();
        prop_assert_eq!(std::fs::read_to_string(&path).unwrap(), first);
    }
}
