//! Controller construction errors
//!
//! Construction is the only failure that surfaces as a `Result`. Every
//! other invalid input degrades to a logged no-op or a default value, so a
//! misconfigured scene never takes the page down with it.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ControllerError {
    /// The configured scroll container does not resolve to an element.
    #[error("no valid scroll container supplied")]
    NoScrollContainer,
}
