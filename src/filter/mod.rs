//! Entry selection.
//!
//! [`Filter`] decides which candidate entries survive an option set, and
//! [`KeyStyle`] decides the key a surviving entry is attached under.

mod filter;
mod options;

pub use filter::Filter;
pub use options::{FilterOptions, KeyStyle, NamePattern};
