//! The predicate library
//!
//! Pure constraint checks grouped by family. Each one answers a single
//! question: does this value violate this rule? Routing values to predicates
//! is the dispatcher's job; rendering violations is the message module's.

pub mod compare;
pub mod file;
pub mod format;
pub mod membership;
pub mod numeric;
pub mod shape;

pub use compare::{Comparison, Measure};
pub use file::SizeLimit;
pub use format::{DateLayout, Format, is_email};
pub use numeric::Class;
pub use shape::Shape;
