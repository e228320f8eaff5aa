//! asmmap core: namespace → assembly ownership index.
//!
//! This crate contains all scanning logic: manifest discovery, lexical namespace
//! extraction, ownership resolution, the step-wise scan driver, and index persistence.

pub mod config;
pub mod error;
pub mod extractor;
pub mod index;
pub mod locator;
pub mod manifest;
pub mod paths;
pub mod resolver;
pub mod scanner;
pub mod store;
