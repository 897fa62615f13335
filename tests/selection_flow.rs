use feargreed::category::Category;
use feargreed::selection::{transition, weight_for, SelectionEvent, SelectionState, VisualWeight};

fn run(events: &[SelectionEvent]) -> Vec<SelectionState> {
    let mut state = SelectionState::idle();
    let mut seen = Vec::new();
    for &e in events {
        state = transition(state, e);
        seen.push(state);
    }
    seen
}

#[test]
fn click_then_reclick_toggles() {
    let seen = run(&[
        SelectionEvent::Click(Category::Fear),
        SelectionEvent::Click(Category::Fear),
    ]);
    assert_eq!(seen[0], SelectionState { selected: Some(Category::Fear), detail_visible: true });
    assert_eq!(seen[1], SelectionState { selected: None, detail_visible: false });
}

#[test]
fn switch_has_no_intermediate_idle() {
    let seen = run(&[
        SelectionEvent::Click(Category::Fear),
        SelectionEvent::Click(Category::Greed),
    ]);
    assert!(seen.iter().all(|s| !s.is_idle()));
    assert_eq!(seen[1], SelectionState::selected(Category::Greed));
}

#[test]
fn background_always_returns_to_idle() {
    for c in Category::ORDER {
        let seen = run(&[SelectionEvent::Click(c), SelectionEvent::Background]);
        assert_eq!(seen[1], SelectionState::idle());
    }
    assert_eq!(run(&[SelectionEvent::Background])[0], SelectionState::idle());
}

#[test]
fn detail_visible_iff_selected() {
    let events = [
        SelectionEvent::Click(Category::Neutral),
        SelectionEvent::Click(Category::ExtremeGreed),
        SelectionEvent::Click(Category::ExtremeGreed),
        SelectionEvent::Background,
        SelectionEvent::Click(Category::ExtremeFear),
    ];
    for s in run(&events) {
        assert_eq!(s.detail_visible, s.selected.is_some());
    }
}

#[test]
fn exactly_one_highlight_when_selected() {
    let state = SelectionState::selected(Category::Neutral);
    let weights: Vec<VisualWeight> = Category::ORDER.iter().map(|&c| weight_for(c, &state)).collect();
    assert_eq!(weights.iter().filter(|w| **w == VisualWeight::Highlighted).count(), 1);
    assert_eq!(weights.iter().filter(|w| **w == VisualWeight::Dimmed).count(), 4);
}
