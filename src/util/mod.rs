// src/util/mod.rs

//! Small string and filesystem helpers used alongside the exec layer,
//! typically to pick apart command output and sysfs paths.

pub mod fs;
pub mod path;
pub mod text;
pub mod wildcard;

pub use wildcard::{Wildcard, matches};
