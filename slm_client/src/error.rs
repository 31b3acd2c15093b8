use hyper::{http::Error as HttpError, Error as HyperError, StatusCode};
use hyper_util::client::legacy::Error as HyperUtilError;
use serde_json::Error as SerdeError;
use serde_urlencoded::ser::Error as UrlEncodeError;
use std::{
    error::Error as StdError,
    fmt::{Display, Formatter, Result as FmtResult},
    time::Duration,
};

/// Failure to get a decodable answer out of the SLM server.
#[derive(Debug)]
pub enum Error {
    Encoding(UrlEncodeError),
    BuildingRequest(HttpError),
    Sending(HyperUtilError),
    Request(HyperError),
    Timeout(Duration),
    Parsing(SerdeError),
    APIError(StatusCode),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Error::APIError(status) => write!(f, "API Error - {status}"),
            Error::BuildingRequest(err) => write!(f, "Building Request Error - {err}"),
            Error::Encoding(err) => write!(f, "Encoding Error - {err}"),
            Error::Parsing(err) => write!(f, "Parsing Error - {err}"),
            Error::Request(err) => write!(f, "Request Error - {err}"),
            Error::Sending(err) => write!(f, "Sending Error - {err}"),
            Error::Timeout(after) => {
                write!(f, "Timeout Error - no response within {}s", after.as_secs())
            }
        }
    }
}

impl From<UrlEncodeError> for Error {
    fn from(err: UrlEncodeError) -> Self {
        Error::Encoding(err)
    }
}

impl From<HttpError> for Error {
    fn from(err: HttpError) -> Self {
        Error::BuildingRequest(err)
    }
}

impl From<HyperError> for Error {
    fn from(err: HyperError) -> Self {
        Error::Request(err)
    }
}

impl From<HyperUtilError> for Error {
    fn from(err: HyperUtilError) -> Self {
        Error::Sending(err)
    }
}

impl From<SerdeError> for Error {
    fn from(err: SerdeError) -> Self {
        Error::Parsing(err)
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Encoding(err) => Some(err),
            Error::BuildingRequest(err) => Some(err),
            Error::Sending(err) => Some(err),
            Error::Request(err) => Some(err),
            Error::Parsing(err) => Some(err),
            Error::Timeout(_) | Error::APIError(_) => None,
        }
    }
}
