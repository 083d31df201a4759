//! View-state orchestration for a vessel catalog: a selection bus shared by
//! independent views, per-view async load state, and the edit and review
//! workflows layered on top.

pub mod bus;
pub mod config;
pub mod error;
pub mod host;
pub mod load_state;
pub mod services;
pub mod session;
pub mod state;
pub mod views;

#[cfg(test)]
mod test_helpers;
