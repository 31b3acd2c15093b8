use deadpool_postgres::{BuildError, PoolError};
use std::{
    error::Error as StdError,
    fmt::{Display, Formatter},
};
use tokio_postgres::Error as PostgresError;

#[derive(Debug)]
pub struct DatabaseError {
    pub(crate) source: Option<Box<dyn StdError + Send + Sync>>,
    pub(crate) kind: ErrorKind,
}

#[derive(Debug)]
pub enum ErrorKind {
    Pool,
    Postgres,
}

impl DatabaseError {
    pub const fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn into_source(self) -> Option<Box<dyn StdError + Send + Sync>> {
        self.source
    }

    pub fn into_parts(self) -> (ErrorKind, Option<Box<dyn StdError + Send + Sync>>) {
        (self.kind, self.source)
    }

    #[must_use]
    pub fn from_parts(kind: ErrorKind, source: Option<Box<dyn StdError + Send + Sync>>) -> Self {
        Self { source, kind }
    }
}

impl From<BuildError> for DatabaseError {
    fn from(value: BuildError) -> Self {
        DatabaseError {
            source: Some(Box::new(value)),
            kind: ErrorKind::Pool,
        }
    }
}

impl From<PoolError> for DatabaseError {
    fn from(value: PoolError) -> Self {
        DatabaseError {
            source: Some(Box::new(value)),
            kind: ErrorKind::Pool,
        }
    }
}

impl From<PostgresError> for DatabaseError {
    fn from(value: PostgresError) -> Self {
        DatabaseError {
            source: Some(Box::new(value)),
            kind: ErrorKind::Postgres,
        }
    }
}

impl Display for DatabaseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let prefix = match &self.kind {
            ErrorKind::Postgres => "postgres error",
            ErrorKind::Pool => "pool error",
        };
        match &self.source {
            Some(source) => write!(f, "{prefix} - {source}"),
            None => f.write_str(prefix),
        }
    }
}

impl StdError for DatabaseError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| &**source as &(dyn StdError + 'static))
    }
}
