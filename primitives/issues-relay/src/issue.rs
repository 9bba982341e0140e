//! Issue records as read from the GitHub issues API.

use serde::{Deserialize, Deserializer, Serialize};

/// The subset of a GitHub issue that gets republished.
///
/// Any other fields in the source document are ignored on decode. Missing
/// or `null` fields decode to their zero value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Issue {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub state: String,
    /// GitHub sends `null` for issues without a description.
    #[serde(deserialize_with = "null_as_default")]
    pub body: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ignores_unknown_fields() {
        let issue: Issue = serde_json::from_value(json!({
            "id": 42,
            "number": 7,
            "title": "flaky test",
            "state": "open",
            "body": "fails on CI",
            "labels": [{"name": "bug"}],
        }))
        .unwrap();

        assert_eq!(
            issue,
            Issue {
                id: 42,
                title: "flaky test".into(),
                state: "open".into(),
                body: "fails on CI".into(),
            }
        );
    }

    #[test]
    fn null_or_missing_body_is_empty() {
        let null_body: Issue =
            serde_json::from_value(json!({"id": 1, "title": "t", "state": "closed", "body": null}))
                .unwrap();
        let no_body: Issue =
            serde_json::from_value(json!({"id": 2, "title": "t", "state": "closed"})).unwrap();

        assert_eq!(null_body.body, "");
        assert_eq!(no_body.body, "");
    }

    #[test]
    fn sparse_or_null_fields_decode_to_zero_values() {
        let batch: Vec<Issue> = serde_json::from_str(
            r#"[{}, {"id": 1, "title": null, "state": "open", "body": "x"}, {"id": null, "state": "open"}]"#,
        )
        .unwrap();

        assert_eq!(
            batch,
            vec![
                Issue::default(),
                Issue {
                    id: 1,
                    title: String::new(),
                    state: "open".into(),
                    body: "x".into(),
                },
                Issue {
                    state: "open".into(),
                    ..Issue::default()
                },
            ]
        );
    }

    #[test]
    fn wrong_types_still_fail() {
        assert!(serde_json::from_str::<Issue>(r#"{"id": "seven"}"#).is_err());
        assert!(serde_json::from_str::<Issue>(r#"{"title": 3}"#).is_err());
    }

    #[test]
    fn serializes_only_relayed_fields() {
        let issue = Issue {
            id: 1,
            title: "a".into(),
            state: "open".into(),
            body: "x".into(),
        };

        let value = serde_json::to_value(&issue).unwrap();
        assert_eq!(value, json!({"id": 1, "title": "a", "state": "open", "body": "x"}));
    }
}
