//! Small shared utilities.

pub mod url;
