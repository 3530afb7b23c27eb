mod process_create_merkle_tree;
mod process_distribute;
mod process_generate_call_data;
mod process_get_proof;
mod process_merge_merkle_trees;
mod process_verify;

pub use process_create_merkle_tree::process_create_merkle_tree;
pub use process_distribute::process_distribute;
pub use process_generate_call_data::process_generate_call_data;
pub use process_get_proof::process_get_proof;
pub use process_merge_merkle_trees::process_merge_merkle_trees;
pub use process_verify::process_verify;
