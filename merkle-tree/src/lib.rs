pub mod address;
pub mod amount;
pub mod csv_entry;
pub mod distribution_tree;
pub mod error;
pub mod merkle_tree;
pub mod tree_node;
pub mod universal_tree;
pub mod utils;

pub use address::Address;
pub use amount::Amount;
pub use distribution_tree::DistributionMerkleTree;
pub use tree_node::TreeNode;
pub use universal_tree::UniversalMerkleTree;
