//! Common re-exports for convenient importing.
//!
//! # Example
//!
//! ```rust,ignore
//! use fflt::prelude::*;
//! ```

pub use crate::core::{Config, DiffOptions, FuzzyMatcher, PackageRoot, RepoError, RepoRoot, Task};
pub use crate::prompt::{
    CheckboxConfig, CheckboxPrompt, Choice, Entry, PromptError, SelectConfig, SelectPrompt, Separator,
};
