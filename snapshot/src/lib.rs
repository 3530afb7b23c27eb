pub mod claims;
pub mod delegators;
pub mod error;
pub mod hub;
pub mod price;
pub mod retry;
pub mod rpc;
pub mod score;

pub use claims::{ClaimedOracle, LogIndexClient};
pub use delegators::{DelegatorSource, SubgraphDelegators};
pub use error::SnapshotError;
pub use hub::SnapshotHub;
pub use price::PriceApi;
pub use rpc::RpcClient;
pub use score::ScoreApi;
