// RHTMX Unobtrusive Engine - reference validation engine
// Evaluates parsed rules against a document and drives the lifecycle hooks

//! Reference [`ValidationEngine`](rhtmx_unobtrusive::ValidationEngine).
//!
//! Ships the standard rule methods (`required`, length and numeric bounds,
//! `email`, `url`, `date`, `number`, `digits`, `creditcard`, `equalTo`,
//! `accept`, `remote`) with their default messages, and manages one error
//! label per failing field.

pub mod messages;
pub mod standard;
pub mod validator;

pub use validator::{RemoteChecker, Validator};
