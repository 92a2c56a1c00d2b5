use std::{error, fmt, io};

#[derive(Debug)]
pub enum Error {
    EmptyCatalog,
    LoadCancelled,
    AssetNotPlayable { content_type: String },
    InvalidUrl(url::ParseError),
    JsonError(Box<dyn error::Error + Send>),
    AssetFetchingError(Box<dyn error::Error + Send>),
    IoError(io::Error),
}

impl error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyCatalog => write!(f, "Catalog has no streams"),
            Self::LoadCancelled => write!(f, "Asset load cancelled"),
            Self::AssetNotPlayable { content_type } => {
                write!(f, "Asset is not playable: {content_type}")
            }
            Self::InvalidUrl(err) => write!(f, "Invalid stream URL: {err}"),
            Self::JsonError(err) | Self::AssetFetchingError(err) => err.fmt(f),
            Self::IoError(err) => err.fmt(f),
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::IoError(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Error {
        Error::JsonError(Box::new(err))
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Error {
        Error::InvalidUrl(err)
    }
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Error {
        Error::AssetFetchingError(Box::new(err))
    }
}
