/*
 * Responsibility
 * - What a repo tells the layers above when the database says no
 */
use thiserror::Error;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("db error")]
    Db(#[from] sqlx::Error),
    #[error("conflict")]
    Conflict,
    #[error("referenced row does not exist")]
    MissingReference,
}

impl RepoError {
    pub fn from_sqlx(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(dbe) = &e {
            match dbe.code().as_deref() {
                Some(UNIQUE_VIOLATION) => return RepoError::Conflict,
                Some(FOREIGN_KEY_VIOLATION) => return RepoError::MissingReference,
                _ => {}
            }
        }
        RepoError::Db(e)
    }
}

pub type RepoResult<T> = Result<T, RepoError>;

#[cfg(test)]
mod tests {
    use std::borrow::Cow;
    use std::error::Error as StdError;

    use sqlx::error::{DatabaseError, ErrorKind};

    use super::*;

    #[derive(Debug)]
    struct PgCode(&'static str);

    impl std::fmt::Display for PgCode {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "postgres error {}", self.0)
        }
    }

    impl StdError for PgCode {}

    impl DatabaseError for PgCode {
        fn message(&self) -> &str {
            "postgres error"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            Some(Cow::Borrowed(self.0))
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            ErrorKind::Other
        }
    }

    fn db_error(code: &'static str) -> sqlx::Error {
        sqlx::Error::Database(Box::new(PgCode(code)))
    }

    #[test]
    fn maps_constraint_violations() {
        assert!(matches!(RepoError::from_sqlx(db_error("23505")), RepoError::Conflict));
        assert!(matches!(
            RepoError::from_sqlx(db_error("23503")),
            RepoError::MissingReference
        ));
        assert!(matches!(RepoError::from_sqlx(db_error("40001")), RepoError::Db(_)));
        assert!(matches!(
            RepoError::from_sqlx(sqlx::Error::RowNotFound),
            RepoError::Db(_)
        ));
    }
}
