//! Core types and trait definitions for the contacts system.
//!
//! This crate has no HTTP or database dependencies. Every other crate in the
//! workspace depends on it.

pub mod contact;
pub mod error;
pub mod form;
pub mod notify;
pub mod query;
pub mod service;
pub mod store;
pub mod validate;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};
