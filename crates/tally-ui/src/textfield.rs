use std::ops::Range;
use std::rc::Rc;

use tally_core::*;
use unicode_segmentation::UnicodeSegmentation;

/// Start of the grapheme cluster that ends at or before `byte`.
fn prev_grapheme_boundary(text: &str, byte: usize) -> usize {
    let mut last = 0usize;
    for (i, _) in text.grapheme_indices(true) {
        if i >= byte {
            break;
        }
        last = i;
    }
    last
}

fn clamp_to_char_boundary(s: &str, i: usize) -> usize {
    if i >= s.len() {
        return s.len();
    }
    let mut j = i;
    while j > 0 && !s.is_char_boundary(j) {
        j -= 1;
    }
    j
}

/// Platform-side editing state for one text field: the text being edited and
/// a byte-range selection that always sits on char boundaries.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextFieldState {
    pub text: String,
    pub selection: Range<usize>,
}

impl TextFieldState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopts the application's value (controlled field). The selection is
    /// kept where possible and clamped otherwise.
    pub fn sync(&mut self, value: &str) {
        if self.text == value {
            return;
        }
        self.text = value.to_string();
        let start = clamp_to_char_boundary(&self.text, self.selection.start);
        let end = clamp_to_char_boundary(&self.text, self.selection.end);
        self.selection = start.min(end)..end.max(start);
    }

    pub fn insert_text(&mut self, text: &str) {
        let start = self.selection.start.min(self.text.len());
        let end = self.selection.end.min(self.text.len());

        self.text.replace_range(start..end, text);
        let new_pos = start + text.len();
        self.selection = new_pos..new_pos;
    }

    /// Returns false when there was nothing to delete.
    pub fn delete_backward(&mut self) -> bool {
        if self.selection.start == self.selection.end {
            let pos = self.selection.start.min(self.text.len());
            if pos == 0 {
                return false;
            }
            let prev = prev_grapheme_boundary(&self.text, pos);
            self.text.replace_range(prev..pos, "");
            self.selection = prev..prev;
        } else {
            self.insert_text("");
        }
        true
    }

    pub fn move_to_end(&mut self) {
        let end = self.text.len();
        self.selection = end..end;
    }

    pub fn select_all(&mut self) {
        self.selection = 0..self.text.len();
    }
}

/// Controlled text field. `value` is rendered as-is; every edit the platform
/// applies is reported through `on_change` with the full new value.
pub fn TextField(
    value: impl Into<String>,
    hint: impl Into<String>,
    on_change: impl Fn(String) + 'static,
) -> View {
    View::new(
        0,
        ViewKind::TextField {
            state_key: 0,
            value: value.into(),
            hint: hint.into(),
            on_change: Some(Rc::new(on_change)),
        },
    )
    .semantics(Semantics::new(Role::TextField))
}

pub trait TextFieldExt {
    /// Stable key for platform editing state; survives siblings appearing
    /// or disappearing before the field.
    fn state_key(self, key: ViewId) -> View;
}

impl TextFieldExt for View {
    fn state_key(mut self, key: ViewId) -> View {
        if let ViewKind::TextField { state_key, .. } = &mut self.kind {
            *state_key = key;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_textfield_insert() {
        let mut state = TextFieldState::new();
        state.insert_text("Hello");
        assert_eq!(state.text, "Hello");
        assert_eq!(state.selection, 5..5);
    }

    #[test]
    fn test_textfield_delete_backward() {
        let mut state = TextFieldState::new();
        state.insert_text("Hello");
        assert!(state.delete_backward());
        assert_eq!(state.text, "Hell");
        assert_eq!(state.selection, 4..4);

        let mut empty = TextFieldState::new();
        assert!(!empty.delete_backward());
    }

    #[test]
    fn test_grapheme_delete() {
        // thumbs up + skin tone is one grapheme cluster
        let mut st = TextFieldState::new();
        st.insert_text("A\u{1F44D}\u{1F3FD}");
        assert!(st.delete_backward());
        assert_eq!(st.text, "A");
        assert_eq!(st.selection, 1..1);
    }

    #[test]
    fn test_replace_selection_keeps_range_ordered() {
        let mut st = TextFieldState::new();
        st.insert_text("Hello");
        st.select_all();
        st.insert_text("X");
        assert_eq!(st.text, "X");
        assert_eq!(st.selection, 1..1);

        // a shrinking sync never leaves the range reversed
        st.insert_text("yz");
        st.selection = 1..3;
        st.sync("X");
        assert!(st.selection.start <= st.selection.end);
        st.insert_text("!");
        assert_eq!(st.text, "X!");
    }

    #[test]
    fn test_sync_clamps_selection() {
        let mut st = TextFieldState::new();
        st.insert_text("abcdef");
        st.sync("ab");
        assert_eq!(st.text, "ab");
        assert_eq!(st.selection, 2..2);

        st.select_all();
        st.sync("ab");
        assert_eq!(st.selection, 0..2);
    }

    #[test]
    fn test_state_key_only_applies_to_text_fields() {
        let field = TextField("", "", |_| {}).state_key(9);
        assert!(matches!(field.kind, ViewKind::TextField { state_key: 9, .. }));
        let button = crate::Button("x", || {}).state_key(9);
        assert!(matches!(button.kind, ViewKind::Button { .. }));
    }
}
