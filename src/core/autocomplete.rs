//! Autocomplete interaction state machine.
//!
//! The whole interaction state (typed text, displayed text, navigation cursor,
//! suggestion sections) is an immutable value. Each input event produces a new
//! value plus a list of effects for the host widget to execute; nothing in
//! here touches the surface, the store, or the network.
//!
//! The input element shows `displayed_query`, which follows the highlighted
//! result while navigating. `original_query` is the last text the user actually
//! typed and is what Escape (or Up past the first result) restores.

use serde_json::{json, Value};

use crate::core::keys::Key;
use crate::core::model::{Section, Selection, SuggestionResult};

/// Position within grouped results. `result == None` is the "no selection"
/// sentinel, rendered as `-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub section: usize,
    pub result: Option<usize>,
}

impl Cursor {
    pub const fn new(section: usize, result: Option<usize>) -> Self {
        Self { section, result }
    }

    pub const fn at(section: usize, result: usize) -> Self {
        Self {
            section,
            result: Some(result),
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.result.is_none()
    }

    pub fn result_index(&self) -> i64 {
        self.result.map(|index| index as i64).unwrap_or(-1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Closed,
    Open,
    Navigating,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AutocompleteEvent {
    /// The input gained focus; `input` is its current text.
    Focus { input: String },
    /// A key was released; `input` is the text after the key took effect.
    KeyUp { key: Key, input: String },
    /// A key was pressed. Only Up/Down are acted on.
    KeyDown { key: Key },
    /// A result was picked with the mouse.
    SelectResult { value: String, filter: Value },
    Blur,
    Reset,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    SetInputText(String),
    RequestSuggestions(String),
    Submit(Selection),
    /// Responses to requests issued so far must not reopen the list.
    CancelPending,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: AutocompleteState,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn new(state: AutocompleteState) -> Self {
        Self {
            state,
            effects: Vec::new(),
        }
    }

    fn with(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AutocompleteState {
    original_query: String,
    displayed_query: String,
    cursor: Cursor,
    sections: Vec<Section>,
    open: bool,
}

impl AutocompleteState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn original_query(&self) -> &str {
        &self.original_query
    }

    pub fn displayed_query(&self) -> &str {
        &self.displayed_query
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn phase(&self) -> Phase {
        if !self.open {
            Phase::Closed
        } else if self.cursor.is_sentinel() {
            Phase::Open
        } else {
            Phase::Navigating
        }
    }

    pub fn selected_result(&self) -> Option<&SuggestionResult> {
        let index = self.cursor.result?;
        self.sections.get(self.cursor.section)?.results.get(index)
    }

    pub fn transition(self, event: AutocompleteEvent) -> Transition {
        match event {
            AutocompleteEvent::Focus { input } => self.on_focus(input),
            AutocompleteEvent::KeyUp { key, input } => self.on_key_up(key, input),
            AutocompleteEvent::KeyDown { key } => match key {
                Key::Down => self.move_down(),
                Key::Up => self.move_up(),
                _ => Transition::new(self),
            },
            AutocompleteEvent::SelectResult { value, filter } => self.on_select(value, filter),
            AutocompleteEvent::Blur => self.close().with(Effect::CancelPending),
            AutocompleteEvent::Reset => Transition::new(self.reset_cursor()),
        }
    }

    /// Replace the sections atomically. New contents drop the highlight: the
    /// cursor returns to `(0, None)` and the displayed text to the typed text.
    /// Identical contents keep the cursor where it is.
    pub fn receive_sections(mut self, sections: Vec<Section>) -> Self {
        let changed = sections != self.sections;
        self.sections = sections;
        if !self.sections.is_empty() {
            self.open = true;
        }
        if changed && !self.cursor.is_sentinel() {
            self.displayed_query = self.original_query.clone();
            self.cursor = Cursor::default();
        }
        if !self.cursor_is_valid() {
            self.cursor = Cursor::default();
        }
        self
    }

    /// Model handed to the renderer.
    pub fn render_model(&self) -> Value {
        json!({
            "sections": self.sections,
            "sectionIndex": self.cursor.section,
            "resultIndex": self.cursor.result_index(),
            "isOpen": self.open && self.sections.iter().any(|section| !section.is_empty()),
            "query": self.displayed_query,
            "originalQuery": self.original_query,
        })
    }

    fn cursor_is_valid(&self) -> bool {
        match self.cursor.result {
            None => self.cursor.section == 0,
            Some(index) => self
                .sections
                .get(self.cursor.section)
                .is_some_and(|section| index < section.len()),
        }
    }

    fn reset_cursor(mut self) -> Self {
        self.cursor = Cursor::default();
        self
    }

    fn close(mut self) -> Transition {
        self.open = false;
        self.sections.clear();
        Transition::new(self.reset_cursor())
    }

    fn on_focus(mut self, input: String) -> Transition {
        self.displayed_query = input.clone();
        self.open = true;
        Transition::new(self.reset_cursor()).with(Effect::RequestSuggestions(input))
    }

    fn on_key_up(mut self, key: Key, input: String) -> Transition {
        if key.is_ignored_while_typing() {
            return Transition::new(self);
        }

        match key {
            Key::Escape => {
                let restored = self.original_query.clone();
                self.displayed_query = restored.clone();
                self.close()
                    .with(Effect::SetInputText(restored))
                    .with(Effect::CancelPending)
            }
            Key::Enter | Key::Tab => self.close().with(Effect::CancelPending),
            _ => {
                self.original_query = input.clone();
                self.displayed_query = input.clone();
                if input.is_empty() {
                    return self.close().with(Effect::CancelPending);
                }
                self.open = true;
                Transition::new(self.reset_cursor()).with(Effect::RequestSuggestions(input))
            }
        }
    }

    fn on_select(mut self, value: String, filter: Value) -> Transition {
        self.displayed_query = value.clone();
        self.close()
            .with(Effect::SetInputText(value.clone()))
            .with(Effect::Submit(Selection { value, filter }))
            .with(Effect::CancelPending)
    }

    fn next_non_empty_after(&self, section: usize) -> Option<usize> {
        (section + 1..self.sections.len()).find(|&index| !self.sections[index].is_empty())
    }

    fn previous_non_empty_before(&self, section: usize) -> Option<usize> {
        (0..section.min(self.sections.len()))
            .rev()
            .find(|&index| !self.sections[index].is_empty())
    }

    fn has_results(&self) -> bool {
        self.sections.iter().any(|section| !section.is_empty())
    }

    fn move_down(self) -> Transition {
        if !self.has_results() {
            return Transition::new(self);
        }

        let Cursor { section, result } = self.cursor;
        let current_len = self.sections.get(section).map(Section::len).unwrap_or(0);
        let next = match result {
            None if current_len > 0 => Some(Cursor::at(section, 0)),
            Some(index) if index + 1 < current_len => Some(Cursor::at(section, index + 1)),
            _ => self
                .next_non_empty_after(section)
                .map(|next_section| Cursor::at(next_section, 0)),
        };

        match next {
            Some(cursor) => self.select(cursor),
            None => Transition::new(self),
        }
    }

    fn move_up(mut self) -> Transition {
        if !self.has_results() {
            return Transition::new(self);
        }

        let Cursor { section, result } = self.cursor;
        match result {
            Some(index) if index > 0 => self.select(Cursor::at(section, index - 1)),
            Some(_) => match self.previous_non_empty_before(section) {
                Some(previous) => {
                    let last = self.sections[previous].len() - 1;
                    self.select(Cursor::at(previous, last))
                }
                None => {
                    let restored = self.original_query.clone();
                    self.displayed_query = restored.clone();
                    Transition::new(self.reset_cursor()).with(Effect::SetInputText(restored))
                }
            },
            None => Transition::new(self),
        }
    }

    fn select(mut self, cursor: Cursor) -> Transition {
        self.cursor = cursor;
        let Some(display) = self
            .selected_result()
            .map(|result| result.display_value().to_string())
        else {
            return Transition::new(self);
        };
        self.displayed_query = display.clone();
        Transition::new(self).with(Effect::SetInputText(display))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn results(values: &[&str]) -> Vec<SuggestionResult> {
        values.iter().map(|value| SuggestionResult::new(*value)).collect()
    }

    fn scenario_sections() -> Vec<Section> {
        vec![
            Section::new(results(&["R1", "R2"])),
            Section::new(results(&["R3"])),
        ]
    }

    fn typed(text: &str) -> AutocompleteState {
        let Transition { state, .. } = AutocompleteState::new().transition(AutocompleteEvent::KeyUp {
            key: Key::Char('x'),
            input: text.to_string(),
        });
        state
    }

    fn press(state: AutocompleteState, key: Key) -> AutocompleteState {
        state.transition(AutocompleteEvent::KeyDown { key }).state
    }

    #[test]
    fn down_walks_across_sections_and_stops_at_the_end() {
        let mut state = typed("r").receive_sections(scenario_sections());
        assert_eq!(state.cursor(), Cursor::default());

        let mut seen = Vec::new();
        for _ in 0..4 {
            state = press(state, Key::Down);
            seen.push(state.cursor());
        }

        assert_eq!(
            seen,
            vec![
                Cursor::at(0, 0),
                Cursor::at(0, 1),
                Cursor::at(1, 0),
                Cursor::at(1, 0)
            ]
        );
        assert_eq!(state.displayed_query(), "R3");
        assert_eq!(state.phase(), Phase::Navigating);
    }

    #[test]
    fn up_from_first_result_restores_typed_text() {
        let state = press(typed("r").receive_sections(scenario_sections()), Key::Down);
        assert_eq!(state.cursor(), Cursor::at(0, 0));
        assert_eq!(state.displayed_query(), "R1");

        let transition = state.transition(AutocompleteEvent::KeyDown { key: Key::Up });
        assert_eq!(transition.state.cursor(), Cursor::default());
        assert_eq!(transition.state.displayed_query(), "r");
        assert_eq!(transition.effects, vec![Effect::SetInputText("r".to_string())]);

        let again = transition.state.clone().transition(AutocompleteEvent::KeyDown { key: Key::Up });
        assert_eq!(again.state, transition.state);
        assert!(again.effects.is_empty());
    }

    #[test]
    fn up_crosses_into_last_result_of_previous_section() {
        let mut state = typed("r").receive_sections(scenario_sections());
        for _ in 0..3 {
            state = press(state, Key::Down);
        }
        assert_eq!(state.cursor(), Cursor::at(1, 0));

        state = press(state, Key::Up);
        assert_eq!(state.cursor(), Cursor::at(0, 1));
        assert_eq!(state.displayed_query(), "R2");
    }

    #[test]
    fn escape_restores_original_query_after_navigation() {
        let mut state = typed("piz").receive_sections(scenario_sections());
        state = press(press(state, Key::Down), Key::Down);
        assert_eq!(state.displayed_query(), "R2");

        let transition = state.transition(AutocompleteEvent::KeyUp {
            key: Key::Escape,
            input: "R2".to_string(),
        });
        assert_eq!(transition.state.displayed_query(), "piz");
        assert_eq!(transition.state.original_query(), "piz");
        assert_eq!(transition.state.phase(), Phase::Closed);
        assert_eq!(
            transition.effects,
            vec![Effect::SetInputText("piz".to_string()), Effect::CancelPending]
        );
    }

    #[test]
    fn typing_while_closed_opens_and_requests() {
        let transition = AutocompleteState::new().transition(AutocompleteEvent::KeyUp {
            key: Key::Char('z'),
            input: "piz".to_string(),
        });
        assert_eq!(transition.state.phase(), Phase::Open);
        assert_eq!(transition.state.original_query(), "piz");
        assert_eq!(
            transition.effects,
            vec![Effect::RequestSuggestions("piz".to_string())]
        );
    }

    #[test]
    fn ignored_keys_do_not_touch_state() {
        let state = typed("piz").receive_sections(scenario_sections());
        for key in [Key::Shift, Key::Left, Key::Down, Key::LeftOs] {
            let transition = state.clone().transition(AutocompleteEvent::KeyUp {
                key,
                input: "pizz".to_string(),
            });
            assert_eq!(transition.state, state);
            assert!(transition.effects.is_empty());
        }
    }

    #[test]
    fn clearing_the_input_closes() {
        let state = typed("p").receive_sections(scenario_sections());
        let transition = state.transition(AutocompleteEvent::KeyUp {
            key: Key::Backspace,
            input: String::new(),
        });
        assert_eq!(transition.state.phase(), Phase::Closed);
        assert!(transition.state.sections().is_empty());
        assert_eq!(transition.effects, vec![Effect::CancelPending]);
    }

    #[test]
    fn enter_and_tab_close_without_touching_text() {
        for key in [Key::Enter, Key::Tab] {
            let state = press(typed("p").receive_sections(scenario_sections()), Key::Down);
            let transition = state.transition(AutocompleteEvent::KeyUp {
                key,
                input: "R1".to_string(),
            });
            assert_eq!(transition.state.phase(), Phase::Closed);
            assert_eq!(transition.state.displayed_query(), "R1");
            assert_eq!(transition.effects, vec![Effect::CancelPending]);
        }
    }

    #[test]
    fn focus_resets_cursor_and_requests_current_text() {
        let state = press(typed("p").receive_sections(scenario_sections()), Key::Down);
        let transition = state.transition(AutocompleteEvent::Focus {
            input: "pasta".to_string(),
        });
        assert_eq!(transition.state.cursor(), Cursor::default());
        assert_eq!(
            transition.effects,
            vec![Effect::RequestSuggestions("pasta".to_string())]
        );
    }

    #[test]
    fn mouse_selection_sets_text_submits_and_closes() {
        let state = typed("p").receive_sections(scenario_sections());
        let filter = json!({ "builtin.location": { "$eq": "NYC" } });
        let transition = state.transition(AutocompleteEvent::SelectResult {
            value: "New York".to_string(),
            filter: filter.clone(),
        });
        assert_eq!(transition.state.phase(), Phase::Closed);
        assert_eq!(
            transition.effects,
            vec![
                Effect::SetInputText("New York".to_string()),
                Effect::Submit(Selection {
                    value: "New York".to_string(),
                    filter,
                }),
                Effect::CancelPending,
            ]
        );
    }

    #[test]
    fn empty_sections_are_skipped_in_both_directions() {
        let sections = vec![
            Section::new(Vec::new()),
            Section::new(results(&["A"])),
            Section::new(Vec::new()),
            Section::new(results(&["B"])),
        ];
        let mut state = typed("x").receive_sections(sections);
        state = press(state, Key::Down);
        assert_eq!(state.cursor(), Cursor::at(1, 0));
        state = press(state, Key::Down);
        assert_eq!(state.cursor(), Cursor::at(3, 0));
        state = press(state, Key::Up);
        assert_eq!(state.cursor(), Cursor::at(1, 0));
        state = press(state, Key::Up);
        assert_eq!(state.cursor(), Cursor::default());
        assert_eq!(state.displayed_query(), "x");
    }

    #[test]
    fn navigation_without_sections_is_a_no_op() {
        let state = typed("x");
        assert_eq!(press(state.clone(), Key::Down), state);
        assert_eq!(press(state.clone(), Key::Up), state);
    }

    #[test]
    fn new_sections_drop_the_highlight_and_restore_typed_text() {
        let mut state = typed("r").receive_sections(scenario_sections());
        for _ in 0..3 {
            state = press(state, Key::Down);
        }
        assert_eq!(state.cursor(), Cursor::at(1, 0));
        assert_eq!(state.displayed_query(), "R3");

        let state = state.receive_sections(vec![Section::new(results(&["only"]))]);
        assert_eq!(state.cursor(), Cursor::default());
        assert_eq!(state.displayed_query(), "r");

        let state = press(state, Key::Down)
            .receive_sections(vec![Section::new(results(&["first", "second"]))]);
        assert_eq!(state.cursor(), Cursor::default());
        assert_eq!(state.displayed_query(), "r");
        assert!(state.selected_result().is_none());
    }

    #[test]
    fn identical_sections_keep_the_cursor() {
        let state = press(typed("r").receive_sections(scenario_sections()), Key::Down);
        let state = state.receive_sections(scenario_sections());
        assert_eq!(state.cursor(), Cursor::at(0, 0));
        assert_eq!(state.displayed_query(), "R1");
    }

    #[test]
    fn render_model_uses_minus_one_sentinel() {
        let state = typed("r").receive_sections(scenario_sections());
        let model = state.render_model();
        assert_eq!(model["sectionIndex"], json!(0));
        assert_eq!(model["resultIndex"], json!(-1));
        assert_eq!(model["isOpen"], json!(true));
        assert_eq!(model["sections"][1]["results"][0]["value"], json!("R3"));

        let model = press(state, Key::Down).render_model();
        assert_eq!(model["resultIndex"], json!(0));
        assert_eq!(model["query"], json!("R1"));
        assert_eq!(model["originalQuery"], json!("r"));
    }

    fn shapes() -> Vec<Vec<usize>> {
        vec![
            vec![1],
            vec![3],
            vec![2, 1],
            vec![1, 0, 2],
            vec![0, 0, 1],
            vec![4, 4, 4],
        ]
    }

    fn build(shape: &[usize]) -> Vec<Section> {
        shape
            .iter()
            .enumerate()
            .map(|(section, len)| {
                Section::new(
                    (0..*len)
                        .map(|index| SuggestionResult::new(format!("s{section}r{index}")))
                        .collect(),
                )
            })
            .collect()
    }

    #[test]
    fn every_up_down_sequence_keeps_the_cursor_in_bounds() {
        for shape in shapes() {
            let base = typed("q").receive_sections(build(&shape));
            for length in 0..=7u32 {
                for mask in 0..(1u32 << length) {
                    let mut state = base.clone();
                    for step in 0..length {
                        let key = if mask & (1 << step) == 0 { Key::Down } else { Key::Up };
                        state = press(state, key);
                        let cursor = state.cursor();
                        match cursor.result {
                            None => {
                                assert_eq!(cursor.section, 0);
                                assert_eq!(state.displayed_query(), "q");
                            }
                            Some(index) => {
                                assert!(index < shape[cursor.section], "{shape:?} {cursor:?}");
                                assert_eq!(
                                    state.displayed_query(),
                                    format!("s{}r{index}", cursor.section)
                                );
                            }
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn repeated_up_always_reaches_the_sentinel() {
        for shape in shapes() {
            let total: usize = shape.iter().sum();
            let mut start = typed("q").receive_sections(build(&shape));
            for _ in 0..total {
                start = press(start, Key::Down);
                let mut state = start.clone();
                for _ in 0..=total {
                    state = press(state, Key::Up);
                }
                assert!(state.cursor().is_sentinel());
                assert_eq!(state.displayed_query(), "q");
                assert_eq!(press(state.clone(), Key::Up), state);
            }
        }
    }
}
