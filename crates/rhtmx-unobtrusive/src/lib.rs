// RHTMX Unobtrusive - data-val-* attribute adapters for form validation engines
// Scans markup for declarative validation metadata and feeds it to an engine

//! # rhtmx-unobtrusive
//!
//! Reads `data-val-*` attributes from form controls, translates them into
//! engine rules through an ordered adapter registry, and attaches each form to
//! a [`ValidationEngine`] with hooks that render field messages and the form
//! summary.
//!
//! ```rust,ignore
//! use rhtmx_unobtrusive::{Document, Unobtrusive};
//! use rhtmx_unobtrusive_engine::Validator;
//!
//! let mut doc = Document::parse_html(html);
//! let mut page = Unobtrusive::new(Validator::new());
//! page.parse_document(&doc);
//!
//! let form = doc.select("form")?[0];
//! let valid = page.validate(&mut doc, form);
//! ```

pub mod adapter;
pub mod builtin;
pub mod config;
pub mod controller;
pub mod dom;
pub mod engine;
pub mod error;
pub mod form;
pub mod hooks;
pub mod methods;
pub mod naming;
pub mod report;
pub mod rules;

pub use adapter::{AdaptationContext, Adapter, AdapterRegistry};
pub use config::{ClassNames, UnobtrusiveConfig};
pub use controller::{Event, Unobtrusive};
pub use dom::{Document, Element, NodeId, Selector};
pub use engine::{FieldError, LifecycleHooks, RuleMethod, ValidationEngine};
pub use error::{Result, UnobtrusiveError};
pub use form::{FormValidation, ValidationOptions};
pub use hooks::UnobtrusiveHooks;
pub use report::{document_forms, FormReport};
pub use rules::{FieldRef, MessageSet, RemoteRequest, RuleSet, RuleValue};
