//! Diagnostics produced while checking a model.
//!
//! This module defines the two diagnostic severities used by the checker:
//!
//! - Errors, hard type or semantic violations that make the model invalid
//! - Warnings, advisories that never influence the outcome of a check
//!
//! Both carry the source position of the offending expression and a context
//! tag naming the phase that produced them.

pub mod errors;

#[cfg(test)]
mod tests;
