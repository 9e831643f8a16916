//! Conversion of sqlx errors into [`CoreError`] kinds.

use estate_core::error::CoreError;
use estate_core::types::DbId;

/// Unique constraints and the business key each one guards.
///
/// `(constraint, entity, field)`
const UNIQUE_CONSTRAINTS: &[(&str, &str, &str)] = &[
    ("uq_owners_name", "Owner", "name"),
    ("uq_properties_code_internal", "Property", "code_internal"),
];

/// Foreign keys whose violation means the referenced row is absent.
///
/// `(constraint, referenced entity)`
const FOREIGN_KEYS: &[(&str, &str)] = &[
    ("fk_properties_owner_id", "Owner"),
    ("fk_property_images_property_id", "Property"),
    ("fk_property_traces_property_id", "Property"),
];

/// Classify a sqlx error into a [`CoreError`].
///
/// - Unique violations on known `uq_` constraints become `DuplicateEntity`.
/// - Foreign key violations on known `fk_` constraints become `NotFound`.
/// - Check and numeric-range violations become `InvalidArgument`.
/// - Connectivity and pool failures become `StorageUnavailable`.
/// - Everything else becomes `Internal`.
pub fn classify_sqlx_error(err: sqlx::Error) -> CoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let detail = db_err
                .try_downcast_ref::<sqlx::postgres::PgDatabaseError>()
                .and_then(|pg| pg.detail());
            classify_database_error(
                db_err.code().as_deref(),
                db_err.constraint(),
                detail,
                db_err.message(),
            )
        }
        sqlx::Error::PoolTimedOut => {
            CoreError::StorageUnavailable("Timed out acquiring a database connection".into())
        }
        sqlx::Error::PoolClosed => {
            CoreError::StorageUnavailable("Database connection pool is closed".into())
        }
        sqlx::Error::Io(e) => CoreError::StorageUnavailable(format!("Database I/O error: {e}")),
        sqlx::Error::Tls(e) => CoreError::StorageUnavailable(format!("Database TLS error: {e}")),
        sqlx::Error::WorkerCrashed => {
            CoreError::StorageUnavailable("Database connection worker crashed".into())
        }
        other => {
            tracing::error!(error = %other, "Database error");
            CoreError::Internal(format!("Database error: {other}"))
        }
    }
}

/// Classify a server-reported database error from its SQLSTATE and context.
pub fn classify_database_error(
    code: Option<&str>,
    constraint: Option<&str>,
    detail: Option<&str>,
    message: &str,
) -> CoreError {
    match code {
        // unique_violation
        Some("23505") => {
            if let Some((_, entity, field)) = constraint
                .and_then(|c| UNIQUE_CONSTRAINTS.iter().find(|(name, _, _)| *name == c))
            {
                return CoreError::DuplicateEntity {
                    entity,
                    field,
                    value: detail.and_then(key_value_from_detail).unwrap_or_default(),
                };
            }
        }
        // foreign_key_violation
        Some("23503") => {
            if let Some((_, entity)) =
                constraint.and_then(|c| FOREIGN_KEYS.iter().find(|(name, _)| *name == c))
            {
                let id = detail
                    .and_then(key_value_from_detail)
                    .and_then(|v| v.parse::<DbId>().ok())
                    .unwrap_or_default();
                return CoreError::NotFound { entity, id };
            }
        }
        // check_violation, numeric_value_out_of_range
        Some("23514") | Some("22003") => {
            return CoreError::InvalidArgument(message.to_string());
        }
        // connection_exception, insufficient_resources, operator_intervention
        Some(c) if c.starts_with("08") || c.starts_with("53") || c.starts_with("57P") => {
            return CoreError::StorageUnavailable(message.to_string());
        }
        _ => {}
    }

    tracing::error!(code = ?code, constraint = ?constraint, error = %message, "Database error");
    CoreError::Internal(format!("Database error: {message}"))
}

/// Extract the key value from a PostgreSQL constraint detail message.
///
/// `Key (name)=(Ana) already exists.` yields `Ana`.
fn key_value_from_detail(detail: &str) -> Option<String> {
    let start = detail.find(")=(")? + 3;
    let rest = &detail[start..];
    let end = rest.rfind(')')?;
    Some(rest[..end].to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn unique_owner_name_is_duplicate() {
        let err = classify_database_error(
            Some("23505"),
            Some("uq_owners_name"),
            Some("Key (name)=(Ana) already exists."),
            "duplicate key value violates unique constraint",
        );
        assert_matches!(
            err,
            CoreError::DuplicateEntity { entity: "Owner", field: "name", ref value } if value == "Ana"
        );
    }

    #[test]
    fn unique_code_without_detail() {
        let err = classify_database_error(
            Some("23505"),
            Some("uq_properties_code_internal"),
            None,
            "duplicate key",
        );
        assert_matches!(
            err,
            CoreError::DuplicateEntity { entity: "Property", field: "code_internal", .. }
        );
    }

    #[test]
    fn unknown_unique_constraint_is_internal() {
        let err = classify_database_error(Some("23505"), Some("other_key"), None, "dup");
        assert_matches!(err, CoreError::Internal(_));
    }

    #[test]
    fn missing_owner_is_not_found() {
        let err = classify_database_error(
            Some("23503"),
            Some("fk_properties_owner_id"),
            Some("Key (owner_id)=(999) is not present in table \"owners\"."),
            "insert or update violates foreign key constraint",
        );
        assert_matches!(err, CoreError::NotFound { entity: "Owner", id: 999 });
    }

    #[test]
    fn check_violation_is_invalid_argument() {
        let err = classify_database_error(
            Some("23514"),
            Some("ck_properties_price_non_negative"),
            None,
            "new row violates check constraint",
        );
        assert_matches!(err, CoreError::InvalidArgument(_));
    }

    #[test]
    fn connection_errors_are_unavailable() {
        for code in ["08006", "53300", "57P01"] {
            assert_matches!(
                classify_database_error(Some(code), None, None, "down"),
                CoreError::StorageUnavailable(_)
            );
        }
    }

    #[test]
    fn pool_timeout_is_unavailable() {
        assert_matches!(
            classify_sqlx_error(sqlx::Error::PoolTimedOut),
            CoreError::StorageUnavailable(_)
        );
    }

    #[test]
    fn detail_parsing() {
        assert_eq!(
            key_value_from_detail("Key (code_internal)=(P-(1)) already exists."),
            Some("P-(1)".to_string())
        );
        assert_eq!(key_value_from_detail("no key here"), None);
    }
}
