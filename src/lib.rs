//! AI-assisted form filling: collect a page's fields into a stable
//! addressable schema, batch them to a model backend, and reconcile the
//! (untrusted) reply back onto the page.

pub mod browser;
pub mod cli;
pub mod fill;
pub mod gateway;
pub mod page;
pub mod trace;
