//! Qualified table names that are safe to splice into statement text.
//!
//! MySQL cannot bind identifiers as parameters, so `database` and `table`
//! end up in the SQL string. Both are emitted back-quoted with any embedded
//! back-quote doubled, which is MySQL's own escape for quoted identifiers.

use crate::DbError;

/// MySQL's limit for database and table names, in characters.
const MAX_IDENTIFIER_LEN: usize = 64;

/// A validated `database.table` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    database: String,
    table: String,
}

impl TableRef {
    /// Validate both identifiers.
    ///
    /// Surrounding whitespace is trimmed. What remains must be 1 to 64
    /// characters and free of control characters, `.`, `/` and `\`: the
    /// characters MySQL refuses in database and table names even when
    /// quoted. Anything else, including `-`, spaces and back-quotes, is
    /// allowed and quoted on output.
    ///
    /// # Errors
    /// [`DbError::InvalidIdentifier`] if either name breaks those rules.
    pub fn new(database: &str, table: &str) -> Result<Self, DbError> {
        Ok(Self {
            database: validate_identifier("database", database)?,
            table: validate_identifier("table", table)?,
        })
    }

    pub fn database(&self) -> &str {
        &self.database
    }
}

impl std::fmt::Display for TableRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", quote(&self.database), quote(&self.table))
    }
}

fn quote(identifier: &str) -> String {
    format!("`{}`", identifier.replace('`', "``"))
}

fn validate_identifier(kind: &'static str, value: &str) -> Result<String, DbError> {
    let trimmed = value.trim();
    let valid = !trimmed.is_empty()
        && trimmed.chars().count() <= MAX_IDENTIFIER_LEN
        && !trimmed
            .chars()
            .any(|c| c.is_control() || matches!(c, '.' | '/' | '\\'));

    if !valid {
        return Err(DbError::InvalidIdentifier {
            kind,
            value: value.to_owned(),
        });
    }
    Ok(trimmed.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_names_are_back_quoted() {
        let target = TableRef::new("backoffice", "n8n_scraper_logs").expect("valid");
        assert_eq!(target.to_string(), "`backoffice`.`n8n_scraper_logs`");
        assert_eq!(target.database(), "backoffice");
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let target = TableRef::new(" backoffice ", "logs\n").expect("valid");
        assert_eq!(target.to_string(), "`backoffice`.`logs`");
    }

    #[test]
    fn names_needing_quotes_are_accepted() {
        let target = TableRef::new("back-office", "n8n-logs 2024").expect("valid");
        assert_eq!(target.to_string(), "`back-office`.`n8n-logs 2024`");
        assert!(TableRef::new("2024", "logs$v2").is_ok());
    }

    #[test]
    fn embedded_back_quotes_are_doubled() {
        let target = TableRef::new("backoffice", "logs`; DROP TABLE users; --").expect("valid");
        assert_eq!(
            target.to_string(),
            "`backoffice`.`logs``; DROP TABLE users; --`"
        );
    }

    #[test]
    fn path_and_control_characters_are_rejected() {
        for bad in ["a.b", "logs/../users", "logs\\x", "lo\0gs", "lo\ngs", "", "   "] {
            assert!(
                matches!(
                    TableRef::new("backoffice", bad),
                    Err(DbError::InvalidIdentifier { kind: "table", .. })
                ),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn length_is_counted_in_characters() {
        assert!(TableRef::new("db", &"x".repeat(64)).is_ok());
        assert!(TableRef::new("db", &"x".repeat(65)).is_err());
        assert!(TableRef::new("db", &"é".repeat(64)).is_ok());
        assert!(TableRef::new(&"d".repeat(65), "logs").is_err());
    }
}
