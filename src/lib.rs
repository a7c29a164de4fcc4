//! Client side of a waitlist signup: a two-step form (email, then name) that
//! submits to a remote subscription endpoint.
//!
//! - `signup_form`: the form's state machine
//! - `subscription_client`: the single HTTP call it makes
//! - `domain`: parsed input types
//! - `configuration`, `telemetry`: settings and logging

pub mod configuration;
pub mod domain;
pub mod signup_form;
pub mod subscription_client;
pub mod telemetry;
pub mod utils;
