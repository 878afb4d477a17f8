//! Statement builders.
//!
//! [`SelectBuilder`] holds filter/limit/tracking state for one [`Target`] and
//! renders `SELECT`, `INSERT`, `UPDATE` and `DELETE` statements from it. The
//! builder is a value: mutators return new builders and leave the receiver
//! as it was.
//!
//! Literal values are single-quoted without escaping; callers must not pass
//! untrusted text containing quotes.

pub mod filter;
pub mod literal;
pub mod select;
pub mod target;

pub use filter::Filter;
pub use literal::render_literal;
pub use select::{InsertSource, SelectBuilder};
pub use target::{RawTarget, TableRef, Target};
