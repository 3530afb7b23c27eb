use thiserror::Error;

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Http Error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Serde Error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Service Error: {0}")]
    Service(String),
    #[error("Rpc Error: {0}")]
    Rpc(String),
    #[error("Address Error: {0}")]
    Address(#[from] bounties_merkle_tree::address::AddressParseError),
    #[error("io Error: {0}")]
    Io(#[from] std::io::Error),
}

impl SnapshotError {
    /// Rate limiting and connection hiccups are worth another attempt;
    /// anything else promotes straight to the caller.
    pub fn is_transient(&self) -> bool {
        match self {
            SnapshotError::Http(err) => {
                err.is_timeout()
                    || err.is_connect()
                    || err.status() == Some(reqwest::StatusCode::TOO_MANY_REQUESTS)
            }
            _ => false,
        }
    }
}
