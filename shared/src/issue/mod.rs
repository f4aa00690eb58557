//! Issue domain: snapshot, timeline, workflow rules and payloads

pub mod error;
pub mod machine;
pub mod snapshot;
pub mod timeline;
pub mod types;

pub use error::IssueError;
pub use snapshot::{Issue, IssueStatus, Priority};
pub use timeline::{TimelineAction, TimelineEntry};
pub use types::{
    Actor, AssignRequest, Assignment, IssueCreate, IssueFilter, IssueUpdate, RejectQuery,
    TransitionRequest, sort_for_listing,
};
