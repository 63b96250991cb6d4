//! Client for initiative records mirrored into an issue tracker.
//!
//! A form of named fields is assembled into an update payload whose shape
//! depends on the initiative's workflow status, then sent to the REST resource
//! that talks to the tracker. Responses are turned into display state.
pub mod assemble;
pub mod client;
pub mod config;
pub mod form;
pub mod link;
pub mod report;
pub mod schema;
pub mod view;
