//! ridilint-rules: declarative lint rules evaluated against clause entities
//!
//! Rules live in a JSON file as an array of objects:
//!
//! ```json
//! [
//!   {"type": "var", "if": "camelCase", "must": "\\$[a-z]", "reason": "variables must start lowercase"}
//! ]
//! ```
//!
//! `loader` reads and filters the file, `engine` compiles rules into
//! predicates and filters entity lists.

mod engine;
mod loader;
mod schema;

pub use engine::{filter, RuleError};
pub use loader::{load_rules_from_file, load_rules_from_str, LoadError};
pub use schema::{PatternSet, RawRule};
