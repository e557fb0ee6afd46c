//! fflt - run linters and formatters on the files changed against a git branch.
//!
//! The interactive parts are two terminal prompts, [`prompt::SelectPrompt`]
//! and [`prompt::CheckboxPrompt`], with fuzzy filtering, pagination and
//! keyboard navigation. [`core`] holds the config, git and task plumbing.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use fflt::prelude::*;
//!
//! let branch = fflt::prompt::run(SelectPrompt::new(SelectConfig::new(
//!     "Which branch?",
//!     vec![Choice::new("main").into(), Choice::new("develop").into()],
//! ))?)?;
//! ```

#![deny(missing_docs)]

pub mod cli;
pub mod core;
pub mod metrics;
pub mod prelude;
pub mod prompt;
