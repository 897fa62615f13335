//! Owner of the session's single `SelectionState` and the time-series view.
//!
//! Events go in, the state machine produces the next state, and the adapter
//! is asked to redraw. Transitions run to completion before the next event.

use anyhow::Result;
use serde_json::json;
use std::str::FromStr;

use crate::aggregate::GroupSummary;
use crate::data::Record;
use crate::logging::{log, log_transition, obj, Domain, Level};
use crate::render::{tooltip, RenderAdapter};
use crate::selection::{transition, SelectionEvent, SelectionState};
use crate::timeseries::{TimelineView, ViewEvent};

/// One line of driver input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Selection(SelectionEvent),
    View(ViewEvent),
}

impl FromStr for InputEvent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let verb = s.trim().split_whitespace().next().unwrap_or("").to_lowercase();
        match verb.as_str() {
            "zoom" | "pan" | "hover" => s.parse().map(InputEvent::View),
            _ => s.parse().map(InputEvent::Selection),
        }
    }
}

pub struct ChartController<A: RenderAdapter> {
    summaries: Vec<GroupSummary>,
    selection: SelectionState,
    timeline: Option<TimelineView>,
    adapter: A,
}

impl<A: RenderAdapter> ChartController<A> {
    /// Build the controller and draw the initial frame.
    pub fn new(summaries: Vec<GroupSummary>, mut adapter: A) -> Result<Self> {
        let selection = SelectionState::idle();
        adapter.render(&summaries, &selection)?;
        Ok(Self {
            summaries,
            selection,
            timeline: None,
            adapter,
        })
    }

    /// Attach the bar chart and draw its first frame.
    pub fn with_timeline(mut self, view: TimelineView) -> Result<Self> {
        self.adapter.render_timeline(&view)?;
        self.timeline = Some(view);
        Ok(self)
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn timeline(&self) -> Option<&TimelineView> {
        self.timeline.as_ref()
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn into_adapter(self) -> A {
        self.adapter
    }

    /// Apply one event and redraw. Clicks on a category without a box are
    /// ignored since no shape exists for them.
    pub fn dispatch(&mut self, event: SelectionEvent) -> Result<SelectionState> {
        if let SelectionEvent::Click(c) = event {
            if !self.summaries.iter().any(|g| g.category == c) {
                return Ok(self.selection);
            }
        }
        let next = transition(self.selection, event);
        log_transition(&event, &self.selection, &next);
        self.selection = next;
        self.adapter.render(&self.summaries, &self.selection)?;
        Ok(next)
    }

    pub fn handle(&mut self, input: InputEvent) -> Result<()> {
        match input {
            InputEvent::Selection(event) => self.dispatch(event).map(|_| ()),
            InputEvent::View(event) => self.dispatch_view(event),
        }
    }

    /// Apply a zoom, pan or hover to the bar chart. Without a chart the
    /// event is dropped.
    pub fn dispatch_view(&mut self, event: ViewEvent) -> Result<()> {
        let Some(view) = self.timeline.as_mut() else {
            return Ok(());
        };
        match event {
            ViewEvent::Zoom { factor, x, y } => view.zoom_by(factor, (x, y)),
            ViewEvent::Pan { dx, dy } => view.pan_by(dx, dy),
            ViewEvent::Hover { x } => {
                if let Some(tip) = view.record_at(x).map(tooltip) {
                    self.adapter.render_tooltip(&tip)?;
                }
                return Ok(());
            }
        }
        log(
            Level::Debug,
            Domain::Render,
            "view",
            obj(&[("event", json!(event)), ("zoom", json!(view.zoom()))]),
        );
        self.adapter.render_timeline(view)
    }

    /// Records for the visible detail view, if any.
    pub fn strip_records(&self) -> Option<&[Record]> {
        let cat = self.selection.detail_category()?;
        self.summaries
            .iter()
            .find(|g| g.category == cat)
            .map(|g| g.raw_data.as_slice())
    }
}
