//! Access-control models: roles, rule rows, attribute filters, and resource trees.

pub mod attribute;
pub mod role;
pub mod tree;

pub use attribute::*;
pub use role::*;
pub use tree::*;
