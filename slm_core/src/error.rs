use slm_database::DatabaseError;
use std::{
    error::Error as StdError,
    fmt::{Display, Formatter, Result as FmtResult},
};

#[derive(Debug)]
pub struct SlmError {
    source: Option<Box<dyn StdError + Send + Sync>>,
    kind: ErrorKind,
}

#[derive(Debug)]
pub enum ErrorKind {
    Config,
    Database,
}

impl SlmError {
    #[must_use]
    pub const fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    #[must_use]
    pub fn into_source(self) -> Option<Box<dyn StdError + Send + Sync>> {
        self.source
    }

    #[must_use]
    pub fn into_parts(self) -> (ErrorKind, Option<Box<dyn StdError + Send + Sync>>) {
        (self.kind, self.source)
    }

    #[must_use]
    pub fn from_parts(kind: ErrorKind, source: Option<Box<dyn StdError + Send + Sync>>) -> Self {
        Self { source, kind }
    }

    pub fn config(message: impl Into<String>) -> Self {
        let message: String = message.into();
        Self {
            source: Some(message.into()),
            kind: ErrorKind::Config,
        }
    }
}

impl Display for SlmError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self.kind {
            ErrorKind::Config => f.write_str("config error: ")?,
            ErrorKind::Database => f.write_str("database error: ")?,
        }
        match &self.source {
            Some(err) => Display::fmt(&err, f),
            None => f.write_str(""),
        }
    }
}

impl StdError for SlmError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| &**source as &(dyn StdError + 'static))
    }
}

impl From<DatabaseError> for SlmError {
    fn from(err: DatabaseError) -> Self {
        Self {
            source: Some(Box::new(err)),
            kind: ErrorKind::Database,
        }
    }
}
