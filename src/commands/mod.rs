pub mod completions;
pub mod config;
pub mod hash;
pub mod send;
