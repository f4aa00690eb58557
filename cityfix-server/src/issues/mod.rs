//! Issue workflow service
//!
//! - [`IssueService`]: reporting, listing and every mutation of an issue
//! - [`actions`]: one `IssueAction` per mutation kind

pub mod actions;
mod service;

pub use service::IssueService;
