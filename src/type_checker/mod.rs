//! Type checking and semantic analysis module.
//!
//! The checker walks a whole `System` through `System::accept` and, for
//! every entity it is handed, infers the types of the expressions involved
//! and validates them against the rules of the modeling language:
//!
//! - classifying expressions into the type lattice (guards, invariants, formulas, ...)
//! - checking type declarations, initialisers and function bodies
//! - checking edges, states, instances and the system wide synchronisation mode
//! - checking the well-formedness of model-checking queries
//!
//! Diagnostics are pushed into the system and never stop the pass, so a
//! single run reports every problem in the model.

pub mod compatibility;
pub mod compile_time;
pub mod declarations;
pub mod expressions;
pub mod properties;
pub mod rate_decomposer;
pub mod statements;
pub mod type_checker;

#[cfg(test)]
mod tests;
