//! Live status aggregation for polling dashboard widgets.
//!
//! SYSTEM CONTEXT
//! ==============
//! Each widget (leaderboard, content sync log, activity feed) polls its own
//! read endpoint on a fixed interval. A [`poll::PollSession`] owns the timer,
//! the fetch and the view state for one widget, and resolves a connection
//! status from fetch outcomes. [`dashboard::Dashboard`] groups sessions and
//! [`indicator`] turns their summaries into status lines.

pub mod config;
pub mod dashboard;
pub mod fetch;
pub mod indicator;
pub mod poll;
pub mod records;

#[cfg(test)]
mod test_helpers;
