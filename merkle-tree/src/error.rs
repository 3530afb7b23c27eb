use thiserror::Error;

use crate::address::AddressParseError;

#[derive(Error, Debug)]
pub enum MerkleTreeError {
    #[error("Merkle Tree Validation Error: {0}")]
    MerkleValidationError(String),
    #[error("Merkle Root Error")]
    MerkleRootError,
    #[error("no proof for leaf index {0}")]
    ProofNotFound(usize),
    #[error("amount overflow while combining claims")]
    AmountOverflow,
    #[error("Address Error: {0}")]
    AddressError(#[from] AddressParseError),
    #[error("Csv Error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("io Error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Serde Error: {0}")]
    SerdeError(#[from] serde_json::Error),
}
