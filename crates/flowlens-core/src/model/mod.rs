//! Snapshot data model supplied by the issue-tracker scraper.

pub mod item;
pub mod overview;
pub mod times;

pub use item::{Created, FilterByField, Group, WorkItem, WorkItemId, WorkItemType};
pub use overview::{Overview, load_overview};
pub use times::{ChangeLeadTimes, WorkCenterTime, WorkItemTimes};
