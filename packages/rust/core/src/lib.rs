//! Document model and toggle state machine for sectioner.
//!
//! Ties the rewrite pass to a stateful document: set up once from HTML text,
//! then flip sections between collapsed and expanded without re-parsing.

pub mod document;

pub use document::Document;
