//! Variable substitution
//!
//! Resolves `${name}` placeholders in strings and typed placeholder nodes in
//! templates against a [`VariableStore`](dratt_domain::VariableStore).
//!
//! # Usage
//!
//! ```
//! use dratt_application::variable_resolver::substitute_variables_in_string;
//! use dratt_domain::{VariableStore, VariableValue};
//!
//! let store = VariableStore::from([("host".to_string(), VariableValue::from("localhost"))]);
//! let url = substitute_variables_in_string(&store, "http://${host}/api").unwrap();
//! assert_eq!(url, "http://localhost/api");
//! ```

pub mod engine;
pub mod parser;

pub use engine::{
    SubstitutionError, VariableError, substitute_variables_in_expectations,
    substitute_variables_in_request, substitute_variables_in_string,
    substitute_variables_on_template,
};
pub use parser::{VariableReference, parse_variables};
