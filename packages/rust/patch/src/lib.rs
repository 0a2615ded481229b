//! Marker-based document patching and structural validation.
//!
//! Pure text transforms with no agent knowledge and no file I/O:
//! - [`patch`] — idempotent find-and-replace between sentinel markers,
//!   with a bootstrap path for hosts that have never been patched
//! - [`validate`] — ordered structural checks gating a brief before it
//!   is trusted

pub mod patcher;
pub mod validator;

pub use patcher::{PatchMode, patch};
pub use validator::{BriefCheck, MIN_CONTENT_LINES, ValidationFailure, is_valid, validate};
