//! formtree: questionnaire field trees with ordered siblings, options, trigger
//! fields and a template library.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
