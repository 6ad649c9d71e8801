//! Errors raised by caller-contract violations

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GalError {
    /// `restore` called without a matching `save`
    #[error("restore called with an empty transform stack")]
    UnbalancedRestore,

    /// `begin_group` called while another group is recording
    #[error("a group is already open for recording")]
    GroupAlreadyOpen,

    /// `end_group` called with no group recording
    #[error("no group is open for recording")]
    NoOpenGroup,

    #[error("invalid viewport size {width}x{height}")]
    InvalidViewport { width: i64, height: i64 },

    /// The world/screen matrix cannot be inverted
    #[error("world to screen matrix is singular")]
    SingularMatrix,
}
