//! Attach Metaplex token metadata to an existing SPL mint.
//!
//! A run is a fixed sequence of stages: resolve configuration, load and check the wallet,
//! upload the image, compose and upload the metadata document, create the on-chain metadata
//! account, and record the outcome. See [`pipeline::run`].

pub mod compose;
pub mod config;
pub mod doctor;
pub mod error;
pub mod link;
pub mod pipeline;
pub mod record;
pub mod show;
pub mod upload;
pub mod wallet;

pub use error::RunError;
