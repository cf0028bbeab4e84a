use chrono::{DateTime, Utc};
use tagsweep_domain::{CaseSensitivity, DateFormat, ResourceTagSet};

/// Result of looking up and parsing the delete-by tag of a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeferredVerdict {
    /// The resource carries no delete-by tag.
    NoDeferralTag,
    /// The delete-by tag holds a valid date.
    ParsedDate {
        /// Tag key as stored on the resource.
        tag_key: String,
        /// Raw tag value.
        raw_value: String,
        /// Parsed date.
        date: DateTime<Utc>,
    },
    /// The delete-by tag is present but does not match the date format.
    UnparseableDate {
        /// Tag key as stored on the resource.
        tag_key: String,
        /// Raw tag value.
        raw_value: String,
        /// Parse failure description.
        error: String,
    },
}

/// Resolves the optional delete-by date carried by `tags`.
///
/// The key lookup honours `key_lookup`; the value is parsed strictly with
/// `date_format`. No comparison with the current time happens here.
#[must_use]
pub fn resolve_deferred_deletion(
    tags: &ResourceTagSet,
    delete_by_key: &str,
    date_format: &DateFormat,
    key_lookup: CaseSensitivity,
) -> DeferredVerdict {
    let Some(tag_key) = tags.find_key(delete_by_key, key_lookup) else {
        return DeferredVerdict::NoDeferralTag;
    };
    let raw_value = tags.get(tag_key).unwrap_or_default();

    match date_format.parse(raw_value) {
        Ok(date) => DeferredVerdict::ParsedDate {
            tag_key: tag_key.to_owned(),
            raw_value: raw_value.to_owned(),
            date,
        },
        Err(error) => DeferredVerdict::UnparseableDate {
            tag_key: tag_key.to_owned(),
            raw_value: raw_value.to_owned(),
            error: error.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use tagsweep_domain::{CaseSensitivity, DateFormat, ResourceTagSet};

    use super::{DeferredVerdict, resolve_deferred_deletion};

    #[test]
    fn missing_tag_yields_no_deferral() {
        let tags = ResourceTagSet::from_iter([("env", "trash")]);

        let verdict = resolve_deferred_deletion(
            &tags,
            "DeleteBy",
            &DateFormat::default(),
            CaseSensitivity::Insensitive,
        );
        assert_eq!(verdict, DeferredVerdict::NoDeferralTag);
    }

    #[test]
    fn insensitive_lookup_reads_value_under_original_key() {
        let tags = ResourceTagSet::from_iter([("DELETEBY", "01/01/2099")]);

        let verdict = resolve_deferred_deletion(
            &tags,
            "DeleteBy",
            &DateFormat::default(),
            CaseSensitivity::Insensitive,
        );
        assert_eq!(
            verdict,
            DeferredVerdict::ParsedDate {
                tag_key: "DELETEBY".to_owned(),
                raw_value: "01/01/2099".to_owned(),
                date: Utc
                    .with_ymd_and_hms(2099, 1, 1, 0, 0, 0)
                    .single()
                    .unwrap_or_else(|| unreachable!()),
            }
        );
    }

    #[test]
    fn sensitive_lookup_ignores_differently_cased_key() {
        let tags = ResourceTagSet::from_iter([("deleteby", "not-a-date")]);

        let verdict = resolve_deferred_deletion(
            &tags,
            "DeleteBy",
            &DateFormat::default(),
            CaseSensitivity::Sensitive,
        );
        assert_eq!(verdict, DeferredVerdict::NoDeferralTag);
    }

    #[test]
    fn malformed_value_is_never_a_best_guess_date() {
        for value in ["not-a-date", "2099-01-01", "1/1/2099", "01/01/2099 12:00", "32/01/2099"] {
            let tags = ResourceTagSet::from_iter([("DeleteBy", value)]);

            let verdict = resolve_deferred_deletion(
                &tags,
                "DeleteBy",
                &DateFormat::default(),
                CaseSensitivity::Insensitive,
            );
            assert!(
                matches!(verdict, DeferredVerdict::UnparseableDate { ref raw_value, .. } if raw_value == value),
                "'{value}' produced {verdict:?}"
            );
        }
    }
}
