//! Property tests for configuration resolution.

use proptest::prelude::*;
use serde_json::{Map, Value, json};
use xraygen_config::{AppConfig, MAX_TIMEOUT_SECS, resolve};

fn arb_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        ".{0,12}".prop_map(Value::String),
    ]
}

fn arb_json() -> impl Strategy<Value = Value> {
    arb_leaf().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map(
                prop_oneof![
                    Just("jira".to_string()),
                    Just("ai".to_string()),
                    Just("browser".to_string()),
                    Just("paths".to_string()),
                    Just("baseUrl".to_string()),
                    Just("model".to_string()),
                    Just("provider".to_string()),
                    Just("headless".to_string()),
                    "[a-z]{1,6}",
                ],
                inner,
                0..5
            )
            .prop_map(|m| Value::Object(m.into_iter().collect::<Map<_, _>>())),
        ]
    })
}

proptest! {
    #[test]
    fn resolve_is_total_and_keeps_required_fields_filled(value in arb_json()) {
        let config = resolve(&value);
        prop_assert!(!config.jira.base_url.is_empty());
        prop_assert!(!config.jira.project_key_default.is_empty());
        prop_assert!(!config.ai.model.is_empty());
        prop_assert!((1..=MAX_TIMEOUT_SECS).contains(&config.ai.timeout_secs));
        prop_assert!((1..=MAX_TIMEOUT_SECS).contains(&config.browser.element_timeout_secs));
    }

    #[test]
    fn any_element_timeout_stays_bounded(secs in any::<u64>()) {
        let config = resolve(&json!({"browser": {"elementTimeoutSecs": secs}}));
        prop_assert!((1..=MAX_TIMEOUT_SECS).contains(&config.browser.element_timeout_secs));
    }

    #[test]
    fn unrelated_keys_never_change_the_result(key in "x[a-z]{1,8}", leaf in arb_leaf()) {
        let mut map = Map::new();
        map.insert(key, leaf);
        prop_assert_eq!(resolve(&Value::Object(map)), AppConfig::default());
    }
}
