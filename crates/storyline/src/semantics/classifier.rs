//! Name-pattern classification of columns into semantic roles.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::Result;

use super::role::SemanticRole;

/// Built-in naming conventions per role, in priority order.
///
/// Patterns are matched against the whole lower-cased column name.
pub const DEFAULT_PATTERNS: &[(SemanticRole, &[&str])] = &[
    (
        SemanticRole::CreatedAt,
        &[
            r"created[-_]?at",
            r"created[-_]?on",
            r"createdat",
            r"createdon",
            r"date[-_]?created",
            r"creation[-_]?date",
            r"created",
        ],
    ),
    (
        SemanticRole::UpdatedAt,
        &[
            r"updated[-_]?at",
            r"updated[-_]?on",
            r"updatedat",
            r"updatedon",
            r"modified[-_]?at",
            r"modified[-_]?on",
            r"modifiedat",
            r"modifiedon",
            r"date[-_]?updated",
            r"date[-_]?modified",
            r"last[-_]?modified",
            r"last[-_]?updated",
        ],
    ),
    (
        SemanticRole::DeletedAt,
        &[
            r"deleted[-_]?at",
            r"deleted[-_]?on",
            r"deletedat",
            r"deletedon",
            r"date[-_]?deleted",
            r"soft[-_]?deleted",
        ],
    ),
    (
        SemanticRole::CreatedBy,
        &[r"created[-_]?by", r"createdby", r"author", r"creator", r"owner"],
    ),
    (
        SemanticRole::UpdatedBy,
        &[
            r"updated[-_]?by",
            r"updatedby",
            r"modified[-_]?by",
            r"modifiedby",
            r"last[-_]?modified[-_]?by",
            r"editor",
        ],
    ),
    (
        SemanticRole::Status,
        &[
            r"status",
            r"state",
            r"is[-_]?active",
            r"active",
            r"enabled",
            r"is[-_]?enabled",
        ],
    ),
];

static DEFAULT_CLASSIFIER: Lazy<SemanticClassifier> = Lazy::new(|| {
    SemanticClassifier::from_patterns(DEFAULT_PATTERNS).expect("built-in semantic patterns compile")
});

/// Ordered role → pattern table.
#[derive(Debug, Clone)]
pub struct SemanticClassifier {
    rules: Vec<(SemanticRole, Vec<Regex>)>,
}

impl SemanticClassifier {
    /// The classifier with the built-in naming conventions.
    pub fn standard() -> &'static SemanticClassifier {
        &DEFAULT_CLASSIFIER
    }

    /// Compile a custom pattern table.
    ///
    /// Roles are tried in table order. Each pattern is anchored at both
    /// ends and matched case-insensitively.
    pub fn from_patterns(table: &[(SemanticRole, &[&str])]) -> Result<Self> {
        let mut rules = Vec::with_capacity(table.len());

        for (role, patterns) in table {
            let compiled = patterns
                .iter()
                .map(|p| Regex::new(&format!("(?i)^(?:{})$", p)))
                .collect::<std::result::Result<Vec<_>, _>>()?;
            rules.push((*role, compiled));
        }

        Ok(Self { rules })
    }

    /// Classify a column name; `None` when no convention matches.
    pub fn classify(&self, column_name: &str) -> Option<SemanticRole> {
        let lowered = column_name.to_lowercase();

        self.rules
            .iter()
            .find(|(_, patterns)| patterns.iter().any(|p| p.is_match(&lowered)))
            .map(|(role, _)| *role)
    }

    /// Roles in the order they are tried.
    pub fn roles(&self) -> impl Iterator<Item = SemanticRole> + '_ {
        self.rules.iter().map(|(role, _)| *role)
    }
}

impl Default for SemanticClassifier {
    fn default() -> Self {
        SemanticClassifier::standard().clone()
    }
}

/// Detect the semantic role of a column from its name alone.
pub fn detect_semantic_type(column_name: &str) -> Option<SemanticRole> {
    SemanticClassifier::standard().classify(column_name)
}

/// Lower-case a name and strip `_` and `-`.
///
/// Lookup helper for fuzzy column matching; classification itself runs
/// on the lower-cased name with separators kept.
pub fn normalize_column_name(name: &str) -> String {
    name.to_lowercase().replace(['_', '-'], "")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_all(names: &[&str], expected: Option<SemanticRole>) {
        for name in names {
            assert_eq!(detect_semantic_type(name), expected, "column {:?}", name);
        }
    }

    #[test]
    fn test_created_at_names() {
        assert_all(
            &[
                "created_at", "created-at", "createdAt", "CREATED_AT", "created_on",
                "created-on", "createdon", "CREATEDON", "date_created", "date-created",
                "datecreated", "creation_date", "creation-date", "creationdate", "created",
            ],
            Some(SemanticRole::CreatedAt),
        );
    }

    #[test]
    fn test_updated_at_names() {
        assert_all(
            &[
                "updated_at", "updated-at", "updatedAt", "UPDATED_AT", "updated_on",
                "updated-on", "updatedon", "modified_at", "modified-at", "modifiedat",
                "modified_on", "modified-on", "modifiedon", "date_updated", "date_modified",
                "last_modified", "last-modified", "lastmodified", "last_updated",
                "last-updated", "lastupdated",
            ],
            Some(SemanticRole::UpdatedAt),
        );
    }

    #[test]
    fn test_deleted_at_names() {
        assert_all(
            &[
                "deleted_at", "deleted-at", "deletedAt", "DELETED_AT", "deleted_on",
                "deleted-on", "deletedon", "date_deleted", "date-deleted", "datedeleted",
                "soft_deleted", "soft-deleted", "softdeleted",
            ],
            Some(SemanticRole::DeletedAt),
        );
    }

    #[test]
    fn test_created_by_names() {
        assert_all(
            &[
                "created_by", "created-by", "createdBy", "CREATED_BY", "createdby", "author",
                "AUTHOR", "creator", "owner",
            ],
            Some(SemanticRole::CreatedBy),
        );
    }

    #[test]
    fn test_updated_by_names() {
        assert_all(
            &[
                "updated_by", "updated-by", "updatedBy", "UPDATED_BY", "updatedby",
                "modified_by", "modified-by", "modifiedby", "last_modified_by",
                "last-modified-by", "editor",
            ],
            Some(SemanticRole::UpdatedBy),
        );
    }

    #[test]
    fn test_status_names() {
        assert_all(
            &[
                "status", "STATUS", "state", "STATE", "is_active", "is-active", "isactive",
                "active", "ACTIVE", "enabled", "is_enabled",
            ],
            Some(SemanticRole::Status),
        );
    }

    #[test]
    fn test_unrelated_names() {
        assert_all(
            &[
                "id", "name", "email", "description", "price", "username", "password",
                "title", "content", "some_random_column", "xyz_abc", "foo_bar",
            ],
            None,
        );
    }

    #[test]
    fn test_full_match_not_substring() {
        assert_eq!(detect_semantic_type("created_at_backup"), None);
        assert_eq!(detect_semantic_type("order_status"), None);
        assert_eq!(detect_semantic_type("inactive"), None);
    }

    #[test]
    fn test_custom_table_priority() {
        let classifier = SemanticClassifier::from_patterns(&[
            (SemanticRole::Status, &["flag"][..]),
            (SemanticRole::CreatedBy, &["flag", "maker"][..]),
        ])
        .unwrap();

        assert_eq!(classifier.classify("FLAG"), Some(SemanticRole::Status));
        assert_eq!(classifier.classify("maker"), Some(SemanticRole::CreatedBy));
        assert_eq!(classifier.classify("created_at"), None);
    }

    #[test]
    fn test_invalid_custom_pattern() {
        let result = SemanticClassifier::from_patterns(&[(SemanticRole::Status, &["("][..])]);
        assert!(result.is_err());
    }

    #[test]
    fn test_standard_roles_in_priority_order() {
        let roles: Vec<_> = SemanticClassifier::standard().roles().collect();
        assert_eq!(roles, SemanticRole::ALL.to_vec());
    }

    #[test]
    fn test_normalize_column_name() {
        assert_eq!(normalize_column_name("Created_At"), "createdat");
        assert_eq!(normalize_column_name("last-modified_by"), "lastmodifiedby");
    }
}
