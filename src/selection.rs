//! Box-plot selection state machine.
//!
//! ```text
//!            click(c)                  click(c') , c' != c
//!   Idle ─────────────► Selected(c) ──────────────────────► Selected(c')
//!    ▲                    │   │
//!    │     click(c)       │   │ background
//!    └────────────────────┴───┘
//! ```
//!
//! `transition` is pure: it takes the current state and an event and returns
//! the next state. The detail (strip) view is visible exactly while a
//! category is selected.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::category::Category;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SelectionState {
    pub selected: Option<Category>,
    pub detail_visible: bool,
}

impl SelectionState {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn selected(category: Category) -> Self {
        Self {
            selected: Some(category),
            detail_visible: true,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.selected.is_none()
    }

    /// Category whose strip plot should be drawn, if any.
    pub fn detail_category(&self) -> Option<Category> {
        self.selected.filter(|_| self.detail_visible)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "category", rename_all = "snake_case")]
pub enum SelectionEvent {
    /// Click on a group's box shape.
    Click(Category),
    /// Click on empty chart area.
    Background,
}

/// Text form used by the interactive driver: `click <label>` or `background`.
impl FromStr for SelectionEvent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (verb, rest) = s.split_once(char::is_whitespace).unwrap_or((s, ""));
        match verb.to_lowercase().as_str() {
            "background" | "bg" => Ok(SelectionEvent::Background),
            "click" => Category::from_label(rest)
                .map(SelectionEvent::Click)
                .ok_or_else(|| format!("unknown classification: {:?}", rest.trim())),
            other => Err(format!("unknown event: {:?}", other)),
        }
    }
}

pub fn transition(state: SelectionState, event: SelectionEvent) -> SelectionState {
    match (state.selected, event) {
        (_, SelectionEvent::Background) => SelectionState::idle(),
        (Some(current), SelectionEvent::Click(c)) if current == c => SelectionState::idle(),
        (_, SelectionEvent::Click(c)) => SelectionState::selected(c),
    }
}

/// Render-time emphasis of one group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisualWeight {
    Normal,
    Highlighted,
    Dimmed,
}

impl VisualWeight {
    pub fn opacity(&self) -> f64 {
        match self {
            VisualWeight::Normal | VisualWeight::Highlighted => 1.0,
            VisualWeight::Dimmed => 0.2,
        }
    }

    pub fn stroke_width(&self) -> f64 {
        match self {
            VisualWeight::Highlighted => 2.5,
            VisualWeight::Normal | VisualWeight::Dimmed => 1.0,
        }
    }
}

pub fn weight_for(category: Category, state: &SelectionState) -> VisualWeight {
    match state.selected {
        None => VisualWeight::Normal,
        Some(c) if c == category => VisualWeight::Highlighted,
        Some(_) => VisualWeight::Dimmed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_is_idle() {
        let s = SelectionState::default();
        assert!(s.is_idle());
        assert!(!s.detail_visible);
        assert_eq!(s.detail_category(), None);
    }

    #[test]
    fn test_click_selects() {
        let s = transition(SelectionState::idle(), SelectionEvent::Click(Category::Fear));
        assert_eq!(s.selected, Some(Category::Fear));
        assert!(s.detail_visible);
        assert_eq!(s.detail_category(), Some(Category::Fear));
    }

    #[test]
    fn test_reclick_toggles_off() {
        let s = transition(SelectionState::idle(), SelectionEvent::Click(Category::Fear));
        let s = transition(s, SelectionEvent::Click(Category::Fear));
        assert_eq!(s, SelectionState::idle());
    }

    #[test]
    fn test_switch_goes_straight_to_new_category() {
        let s = transition(SelectionState::idle(), SelectionEvent::Click(Category::Fear));
        let s = transition(s, SelectionEvent::Click(Category::Greed));
        assert_eq!(s, SelectionState::selected(Category::Greed));
    }

    #[test]
    fn test_background_clears() {
        let s = transition(SelectionState::selected(Category::Neutral), SelectionEvent::Background);
        assert_eq!(s, SelectionState::idle());
        let s = transition(SelectionState::idle(), SelectionEvent::Background);
        assert_eq!(s, SelectionState::idle());
    }

    #[test]
    fn test_weights() {
        let idle = SelectionState::idle();
        for c in Category::ORDER {
            assert_eq!(weight_for(c, &idle), VisualWeight::Normal);
        }
        let sel = SelectionState::selected(Category::Greed);
        assert_eq!(weight_for(Category::Greed, &sel), VisualWeight::Highlighted);
        assert_eq!(weight_for(Category::Fear, &sel), VisualWeight::Dimmed);
        assert_eq!(VisualWeight::Dimmed.opacity(), 0.2);
        assert!(VisualWeight::Highlighted.stroke_width() > VisualWeight::Normal.stroke_width());
    }

    #[test]
    fn test_parse_event() {
        assert_eq!("click Extreme Fear".parse::<SelectionEvent>(), Ok(SelectionEvent::Click(Category::ExtremeFear)));
        assert_eq!(" background ".parse::<SelectionEvent>(), Ok(SelectionEvent::Background));
        assert!("click Panic".parse::<SelectionEvent>().is_err());
        assert!("hover Fear".parse::<SelectionEvent>().is_err());
    }

    #[test]
    fn test_event_serialization() {
        let v = serde_json::to_value(SelectionEvent::Click(Category::ExtremeFear)).unwrap();
        assert_eq!(v["type"], "click");
        assert_eq!(v["category"], "extreme_fear");
        let v = serde_json::to_value(SelectionEvent::Background).unwrap();
        assert_eq!(v["type"], "background");
    }
}
