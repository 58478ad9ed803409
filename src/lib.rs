//! Client-side state for the PNE restaurant admin dashboard.
//!
//! Each managed collection lives in a [`ResourceStore`](application::ResourceStore)
//! backed by either the REST API or an in-memory simulation. Authentication,
//! settings, and exports hang off the [`Dashboard`](application::Dashboard).

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;
