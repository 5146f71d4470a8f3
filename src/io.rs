//! File-format plumbing.

pub mod export;
