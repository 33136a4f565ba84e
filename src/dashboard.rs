//! A named set of independent poll sessions, one per widget.
//!
//! SYSTEM CONTEXT
//! ==============
//! A dashboard page mounts several widgets at once (leaderboard, sync log,
//! activity feed), each with its own cadence and record shape. The dashboard
//! only owns their handles; dropping it stops every session.

use time::OffsetDateTime;

use crate::poll::{PollSession, Status};
use crate::records::Record;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DashboardError {
    #[error("widget already registered: {0}")]
    DuplicateName(String),
}

/// Record-type-erased view of one widget's state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetSummary {
    pub name: String,
    pub kind: &'static str,
    pub status: Status,
    pub update_count: u64,
    pub record_count: usize,
    pub last_update: Option<OffsetDateTime>,
    pub last_error: Option<String>,
}

/// Object-safe control surface over a `PollSession<R>` of any record type.
pub trait Widget: Send {
    fn name(&self) -> &str;
    fn summary(&self) -> WidgetSummary;
    fn refresh_now(&self);
    fn reconnect(&self);
    fn disconnect(&self);
    fn stop(&mut self);
}

impl<R: Record> Widget for PollSession<R> {
    fn name(&self) -> &str {
        PollSession::name(self)
    }

    fn summary(&self) -> WidgetSummary {
        let snap = self.snapshot();
        WidgetSummary {
            name: self.name().to_owned(),
            kind: R::KIND,
            status: snap.status,
            update_count: snap.update_count,
            record_count: snap.records.len(),
            last_update: snap.last_update,
            last_error: snap.last_error,
        }
    }

    fn refresh_now(&self) {
        PollSession::refresh_now(self);
    }

    fn reconnect(&self) {
        PollSession::reconnect(self);
    }

    fn disconnect(&self) {
        PollSession::disconnect(self);
    }

    fn stop(&mut self) {
        PollSession::stop(self);
    }
}

#[derive(Default)]
pub struct Dashboard {
    widgets: Vec<Box<dyn Widget>>,
}

impl Dashboard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a widget under its own name.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::DuplicateName`] if a widget with that name exists.
    /// The rejected widget is dropped, which stops it.
    pub fn add(&mut self, widget: impl Widget + 'static) -> Result<(), DashboardError> {
        if self.get(widget.name()).is_some() {
            return Err(DashboardError::DuplicateName(widget.name().to_owned()));
        }
        self.widgets.push(Box::new(widget));
        Ok(())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&dyn Widget> {
        self.widgets
            .iter()
            .find(|w| w.name() == name)
            .map(Box::as_ref)
    }

    /// Summaries in registration order.
    #[must_use]
    pub fn summaries(&self) -> Vec<WidgetSummary> {
        self.widgets.iter().map(|w| w.summary()).collect()
    }

    /// Reconnect every widget and fetch immediately.
    pub fn reconnect_all(&self) {
        for widget in &self.widgets {
            widget.reconnect();
            widget.refresh_now();
        }
    }

    pub fn stop_all(&mut self) {
        for widget in &mut self.widgets {
            widget.stop();
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }
}

#[cfg(test)]
#[path = "dashboard_test.rs"]
mod tests;
