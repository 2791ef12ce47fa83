//! Work-duration rules and the list/export views built on top of them.

pub mod collation;
pub mod duration;
pub mod view;
