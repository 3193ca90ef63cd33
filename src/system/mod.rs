//! The model container.
//!
//! A `System` holds everything the checker validates:
//!
//! - global declarations, templates and dynamic templates
//! - process and partial instantiations
//! - IO declarations, progress measures, Gantt charts, channel priorities
//! - the queries (properties) to be verified
//!
//! It also acts as the sink for diagnostics and for the features recorded
//! during checking, and drives `SystemVisitor`s over its entities in a
//! fixed order.

pub mod system;
