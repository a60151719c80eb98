use thiserror::Error;

/// Errors surfaced by [`crate::ABTree`].
///
/// Both variants are usage errors reported synchronously to the caller;
/// no operation has transient failure modes.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeError {
    /// The branching factors passed to the constructor are invalid.
    #[error("invalid branching factors a = {a}, b = {b}: need a >= 2 and b >= 2 * a - 1")]
    Configuration { a: usize, b: usize },

    /// `delete_min` was called on a tree holding no keys.
    #[error("cannot delete the minimum of an empty tree")]
    EmptyTree,
}
