mod arena;
mod error;
mod node;
#[allow(clippy::module_name_repetitions)]
mod tree;

pub use error::TreeError;
pub use tree::ABTree;
