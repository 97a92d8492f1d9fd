/// Errors returned by mutating [`WavlTree`](crate::WavlTree) operations.
///
/// A failed operation never modifies the tree.
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum WavlError {
    #[error("key {0} is already present")]
    DuplicateKey(i64),
    #[error("key {0} is not present")]
    NotFound(i64),
}

pub type Result<T, E = WavlError> = core::result::Result<T, E>;
