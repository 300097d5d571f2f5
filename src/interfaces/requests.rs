use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RequestError {
    #[error("failed to read request {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("malformed request {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Reads one JSON request document from a file.
pub fn read_request<T: DeserializeOwned>(path: &Path) -> Result<T, RequestError> {
    let display = path.display().to_string();
    let file = File::open(path).map_err(|source| RequestError::Io {
        path: display.clone(),
        source,
    })?;
    parse_request(BufReader::new(file), &display)
}

/// Parses one JSON request document from any reader.
pub fn parse_request<T: DeserializeOwned, R: Read>(reader: R, origin: &str) -> Result<T, RequestError> {
    serde_json::from_reader(reader).map_err(|source| RequestError::Json {
        path: origin.to_string(),
        source,
    })
}
