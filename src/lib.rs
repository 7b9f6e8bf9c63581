//! s3-tree library
//!
//! Presents the flat keyspace of an S3-compatible store as a directory tree
//! that is loaded one level at a time. The terminal shell in `main.rs` is a
//! thin consumer of [`browser::Browser`].

pub mod browser;
pub mod error;
pub mod s3;
pub mod settings;
pub mod tree;
