//! Types shared by the bulk activation operations and the update inputs.

use school_common::{AppError, AppResult};
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

/// Desired activation state of one row.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ActivationInput {
    #[validate(length(min = 1, max = 32))]
    pub id: String,
    pub is_active: bool,
}

/// Set one activation state on many rows.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BulkUpdateInput {
    #[validate(length(min = 1, max = 500))]
    pub ids: Vec<String>,
    pub is_active: bool,
}

/// Result of a setup save or a reset sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetupSummary {
    pub message: String,
    pub affected: u64,
}

impl SetupSummary {
    #[must_use]
    pub fn new(message: impl Into<String>, affected: u64) -> Self {
        Self {
            message: message.into(),
            affected,
        }
    }
}

/// Deserialize a field where `null` and an absent key mean different things.
///
/// Used with `#[serde(default, deserialize_with = "nullable")]`: absent stays
/// `None`, `null` becomes `Some(None)`.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Trim a name, rejecting one that is blank.
pub fn clean_name(raw: &str) -> AppResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(AppError::Validation("name: must not be blank".to_string()));
    }
    Ok(name.to_string())
}

/// Collapse repeated ids, keeping the last requested state for each.
#[must_use]
pub fn dedupe_last_wins(entries: impl IntoIterator<Item = (String, bool)>) -> Vec<(String, bool)> {
    let mut out: Vec<(String, bool)> = Vec::new();
    for (id, active) in entries {
        if let Some(existing) = out.iter_mut().find(|(seen, _)| *seen == id) {
            existing.1 = active;
        } else {
            out.push((id, active));
        }
    }
    out
}

/// Fail with [`AppError::MissingIds`] when some requested ids were not found.
pub fn ensure_all_found(
    kind: &'static str,
    requested: &[String],
    found: &[String],
) -> AppResult<()> {
    let ids = school_db::repositories::missing_ids(requested, found);
    if ids.is_empty() {
        Ok(())
    } else {
        Err(AppError::MissingIds { kind, ids })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_dedupe_last_wins() {
        let entries = vec![
            ("a".to_string(), true),
            ("b".to_string(), true),
            ("a".to_string(), false),
        ];

        assert_eq!(
            dedupe_last_wins(entries),
            vec![("a".to_string(), false), ("b".to_string(), true)]
        );
    }

    #[test]
    fn test_ensure_all_found_reports_missing() {
        let requested = vec!["a".to_string(), "x".to_string()];
        let found = vec!["a".to_string()];

        match ensure_all_found("Classes", &requested, &found) {
            Err(AppError::MissingIds { kind, ids }) => {
                assert_eq!(kind, "Classes");
                assert_eq!(ids, vec!["x".to_string()]);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_clean_name_trims_and_rejects_blank() {
        assert_eq!(clean_name("  Eight ").unwrap(), "Eight");
        assert!(matches!(clean_name("   "), Err(AppError::Validation(_))));
        assert!(matches!(clean_name("\t\n"), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_bulk_update_requires_ids() {
        let input = BulkUpdateInput {
            ids: vec![],
            is_active: true,
        };
        assert!(input.validate().is_err());
    }

    #[derive(Debug, Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "nullable")]
        value: Option<Option<String>>,
    }

    #[test]
    fn test_nullable_distinguishes_null_from_absent() {
        let absent: Patch = serde_json::from_str("{}").unwrap();
        let null: Patch = serde_json::from_str(r#"{"value":null}"#).unwrap();
        let set: Patch = serde_json::from_str(r#"{"value":"x"}"#).unwrap();

        assert_eq!(absent.value, None);
        assert_eq!(null.value, Some(None));
        assert_eq!(set.value, Some(Some("x".to_string())));
    }
}
