//! Platform runners: a headless driver and a terminal front-end on top of it.
//!
//! [`App`] owns the scheduler, the last composed frame, and platform-managed
//! text field state. Input is routed through the frame's hit regions; every
//! handler runs as one batch and the app recomposes when the commit touched
//! state the composition read.

pub mod config;
pub mod terminal;

use std::collections::HashMap;

use anyhow::{Context, anyhow};
use tally_core::*;
use tally_devtools::Inspector;
use tally_ui::{TextFieldState, layout_and_paint};
use unicode_segmentation::UnicodeSegmentation;
use web_time::Instant;

pub use config::RunnerConfig;
pub use terminal::{Command, run_terminal_app, run_with_io};

/// Window chrome for runners without a real window.
#[derive(Clone, Debug, Default)]
pub struct HeadlessChrome {
    title: String,
}

impl HeadlessChrome {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }
}

impl WindowChrome for HeadlessChrome {
    fn set_title(&mut self, title: &str) {
        if self.title != title {
            log::debug!("window title: {title}");
            self.title = title.to_string();
        }
    }

    fn title(&self) -> &str {
        &self.title
    }
}

/// Focus survives recomposition by pointing at something stable rather than
/// at a stamped id, which shifts when earlier siblings come and go.
#[derive(Clone, Debug, PartialEq, Eq)]
enum FocusAnchor {
    StateKey(u64),
    Tag(String),
    Id(ViewId),
}

impl FocusAnchor {
    fn for_target(hit: &HitRegion, sem: Option<&SemNode>) -> Self {
        if let Some(key) = hit.tf_state_key {
            return FocusAnchor::StateKey(key);
        }
        match sem.and_then(|n| n.test_tag.clone()) {
            Some(tag) => FocusAnchor::Tag(tag),
            None => FocusAnchor::Id(hit.id),
        }
    }

    fn resolve(&self, hits: &[HitRegion], sems: &[SemNode]) -> Option<ViewId> {
        match self {
            FocusAnchor::StateKey(key) => hits
                .iter()
                .find(|h| h.tf_state_key == Some(*key))
                .map(|h| h.id),
            FocusAnchor::Tag(tag) => sems
                .iter()
                .find(|n| n.test_tag.as_deref() == Some(tag.as_str()))
                .map(|n| n.id)
                .filter(|id| hits.iter().any(|h| h.id == *id)),
            FocusAnchor::Id(id) => hits.iter().any(|h| h.id == *id).then_some(*id),
        }
    }
}

type RootFn = Box<dyn FnMut(&mut Scheduler) -> View>;

pub struct App {
    root: RootFn,
    sched: Scheduler,
    frame: Option<Frame>,
    textfield_states: HashMap<u64, TextFieldState>,
    focus: Option<FocusAnchor>,
    inspector: Inspector,
    chrome: Box<dyn WindowChrome>,
}

impl App {
    pub fn new(
        root: impl FnMut(&mut Scheduler) -> View + 'static,
        chrome: impl WindowChrome + 'static,
    ) -> Self {
        Self {
            root: Box::new(root),
            sched: Scheduler::new(),
            frame: None,
            textfield_states: HashMap::new(),
            focus: None,
            inspector: Inspector::new(),
            chrome: Box::new(chrome),
        }
    }

    pub fn headless(root: impl FnMut(&mut Scheduler) -> View + 'static) -> Self {
        Self::new(root, HeadlessChrome::new("Tally"))
    }

    pub fn with_config(mut self, config: &RunnerConfig) -> Self {
        self.chrome.set_title(&config.title);
        self.inspector.hud.inspector_enabled = config.inspector;
        self
    }

    pub fn inspector_mut(&mut self) -> &mut Inspector {
        &mut self.inspector
    }

    pub fn title(&self) -> &str {
        self.chrome.title()
    }

    /// Current frame, composing first if needed (mount or invalidation).
    pub fn frame(&mut self) -> anyhow::Result<&Frame> {
        if self.frame.is_none() || self.sched.is_invalidated() {
            self.recompose()?;
        }
        self.frame
            .as_ref()
            .ok_or_else(|| anyhow!("composition produced no frame"))
    }

    pub fn scene_text(&mut self) -> anyhow::Result<String> {
        Ok(self.frame()?.scene.to_text())
    }

    pub fn focused(&self) -> Option<ViewId> {
        self.sched.focused
    }

    pub fn find_tag(&mut self, tag: &str) -> anyhow::Result<ViewId> {
        self.frame()?
            .find_by_tag(tag)
            .map(|n| n.id)
            .ok_or_else(|| anyhow!("no view tagged '{tag}'"))
    }

    /// Platform editing state for the field `id`, if it has been composed.
    pub fn text_field_state(&mut self, id: ViewId) -> anyhow::Result<Option<&TextFieldState>> {
        let key = self
            .frame()?
            .hit(id)
            .map(|h| h.tf_state_key.unwrap_or(h.id))
            .ok_or(CoreError::UnknownView(id))?;
        Ok(self.textfield_states.get(&key))
    }

    fn recompose(&mut self) -> anyhow::Result<()> {
        let started = Instant::now();
        let anchor = self.focus.clone();
        let mut frame = self
            .sched
            .compose(&mut self.root, |root, _| {
                let (scene, hits, sems) = layout_and_paint(root, None);
                match anchor.as_ref().and_then(|a| a.resolve(&hits, &sems)) {
                    Some(id) => layout_and_paint(root, Some(id)),
                    None => (scene, hits, sems),
                }
            })
            .context("composing root view")?;
        let elapsed_ms = started.elapsed().as_secs_f32() * 1000.0;

        self.sched.focused = frame
            .semantics_nodes
            .iter()
            .find(|n| n.focused())
            .map(|n| n.id);
        if self.sched.focused.is_none() && self.focus.take().is_some() {
            log::debug!("focused view left the tree; focus cleared");
        }

        if let Some(title) = frame.title.take() {
            self.chrome.set_title(&title);
        }

        // controlled fields: the view's value is the source of truth
        for hit in frame.hit_regions.iter().filter(|h| h.on_text_change.is_some()) {
            let value = frame
                .semantics(hit.id)
                .and_then(|n| n.value.as_deref())
                .unwrap_or_default();
            self.textfield_states
                .entry(hit.tf_state_key.unwrap_or(hit.id))
                .or_insert_with(|| {
                    let mut st = TextFieldState::new();
                    st.sync(value);
                    st.move_to_end();
                    st
                })
                .sync(value);
        }

        self.inspector.frame(&mut frame, elapsed_ms);
        log::debug!(
            "frame {}: {} pass(es), {:.2} ms",
            self.inspector.hud.frame_count(),
            frame.passes,
            elapsed_ms
        );
        self.frame = Some(frame);
        Ok(())
    }

    fn target(&mut self, id: ViewId) -> anyhow::Result<(HitRegion, Option<SemNode>)> {
        let frame = self.frame()?;
        let hit = frame.hit(id).cloned().ok_or(CoreError::UnknownView(id))?;
        Ok((hit, frame.semantics(id).cloned()))
    }

    fn not_interactive(id: ViewId, sem: Option<&SemNode>, action: &'static str) -> CoreError {
        CoreError::NotInteractive {
            id,
            role: sem.map_or(Role::Container, |n| n.role),
            action,
        }
    }

    fn set_focus(&mut self, hit: &HitRegion, sem: Option<&SemNode>) {
        let anchor = FocusAnchor::for_target(hit, sem);
        if self.focus.as_ref() != Some(&anchor) {
            self.focus = Some(anchor);
            self.sched.invalidate();
        }
    }

    fn after_dispatch(&mut self) -> anyhow::Result<()> {
        if let Some(title) = take_window_title() {
            self.chrome.set_title(&title);
        }
        if self.sched.is_invalidated() {
            self.recompose()?;
        }
        Ok(())
    }

    pub fn click(&mut self, id: ViewId) -> anyhow::Result<()> {
        let (hit, sem) = self.target(id)?;
        let on_click = hit
            .on_click
            .clone()
            .ok_or_else(|| Self::not_interactive(id, sem.as_ref(), "clicks"))?;
        self.set_focus(&hit, sem.as_ref());
        log::debug!("click #{id}");
        self.sched.dispatch(|| on_click());
        self.after_dispatch()
    }

    pub fn click_tag(&mut self, tag: &str) -> anyhow::Result<()> {
        let id = self.find_tag(tag)?;
        self.click(id)
    }

    /// Applies `edit` to the field's state and, if it changed anything,
    /// reports the new full value as one change event.
    fn edit(
        &mut self,
        id: ViewId,
        edit: impl FnOnce(&mut TextFieldState) -> bool,
    ) -> anyhow::Result<()> {
        let (hit, sem) = self.target(id)?;
        let on_change = hit
            .on_text_change
            .clone()
            .ok_or_else(|| Self::not_interactive(id, sem.as_ref(), "text input"))?;
        let key = hit.tf_state_key.unwrap_or(hit.id);
        let value = sem.as_ref().and_then(|n| n.value.clone()).unwrap_or_default();

        let state = self.textfield_states.entry(key).or_insert_with(|| {
            let mut st = TextFieldState::new();
            st.sync(&value);
            st.move_to_end();
            st
        });
        let before = state.text.clone();
        if !edit(state) || state.text == before {
            return Ok(());
        }
        let new_value = state.text.clone();

        self.set_focus(&hit, sem.as_ref());
        log::debug!("text change #{id}: {new_value:?}");
        self.sched.dispatch(|| on_change(new_value));
        self.after_dispatch()
    }

    /// Replaces the whole value: one change event.
    pub fn set_text(&mut self, id: ViewId, value: &str) -> anyhow::Result<()> {
        self.edit(id, |st| {
            st.select_all();
            st.insert_text(value);
            true
        })
    }

    /// Types `text` at the caret: one change event per grapheme.
    pub fn type_text(&mut self, id: ViewId, text: &str) -> anyhow::Result<()> {
        let mut target = id;
        for g in text.graphemes(true) {
            self.edit(target, |st| {
                st.insert_text(g);
                true
            })?;
            target = self.focused().unwrap_or(target);
        }
        Ok(())
    }

    pub fn backspace(&mut self, id: ViewId) -> anyhow::Result<()> {
        self.edit(id, TextFieldState::delete_backward)
    }

    /// Moves focus to the next focusable view, wrapping around.
    pub fn focus_next(&mut self) -> anyhow::Result<Option<ViewId>> {
        let current = self.focused();
        let frame = self.frame()?;
        let chain = &frame.focus_chain;
        if chain.is_empty() {
            return Ok(None);
        }
        let next = match current.and_then(|id| chain.iter().position(|c| *c == id)) {
            Some(i) => chain[(i + 1) % chain.len()],
            None => chain[0],
        };
        let (hit, sem) = self.target(next)?;
        self.set_focus(&hit, sem.as_ref());
        self.frame()?;
        Ok(self.focused())
    }

    /// Tears down the root view: cleanups run and all remembered state is
    /// released. The next `frame()` mounts a fresh root.
    pub fn unmount(&mut self) {
        self.sched.unmount();
        self.frame = None;
        self.focus = None;
        self.textfield_states.clear();
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_ui::*;

    fn counter(_: &mut Scheduler) -> View {
        let count = remember_with_key("count", || signal(0));
        let text = remember_with_key("text", || signal(String::new()));
        let title = count.get();
        launched_effect!(title, move || set_window_title(format!("n={title}")));

        Column(Modifier::new()).child((
            (text.get() == "hide").then(|| Text("hidden field ahead")),
            Button(format!("Count {}", count.get()), {
                let count = count.clone();
                move || count.update(|n| *n += 1)
            })
            .modifier(Modifier::new().test_tag("button")),
            TextField(text.get(), "type here", {
                let text = text.clone();
                move |v| text.set(v)
            })
            .state_key(1)
            .modifier(Modifier::new().test_tag("input")),
            Text("static"),
        ))
    }

    #[test]
    fn mount_sets_title_and_paints() {
        let mut app = App::headless(counter);
        assert_eq!(app.scene_text().unwrap(), "[ Count 0 ]\n> (type here)\nstatic\n");
        assert_eq!(app.title(), "n=0");
    }

    #[test]
    fn clicks_update_state_and_title() {
        let mut app = App::headless(counter);
        app.click_tag("button").unwrap();
        app.click_tag("button").unwrap();
        assert_eq!(app.title(), "n=2");
        assert!(app.scene_text().unwrap().starts_with("[*Count 2*]"));
    }

    #[test]
    fn typing_sends_one_change_per_grapheme() {
        let mut app = App::headless(counter);
        let input = app.find_tag("input").unwrap();
        app.type_text(input, "hi").unwrap();
        assert_eq!(app.scene_text().unwrap(), "[ Count 0 ]\n> hi_\nstatic\n");
        let input = app.find_tag("input").unwrap();
        app.backspace(input).unwrap();
        assert!(app.scene_text().unwrap().contains("> h_"));
    }

    #[test]
    fn focus_follows_field_when_ids_shift() {
        let mut app = App::headless(counter);
        let input = app.find_tag("input").unwrap();
        app.set_text(input, "hide").unwrap();
        // a sibling appeared before the field, so its id moved
        let moved = app.find_tag("input").unwrap();
        assert_ne!(moved, input);
        assert_eq!(app.focused(), Some(moved));
        assert_eq!(
            app.text_field_state(moved).unwrap().map(|s| s.text.as_str()),
            Some("hide")
        );
    }

    #[test]
    fn setting_the_same_value_is_not_a_change() {
        let mut app = App::headless(counter);
        let input = app.find_tag("input").unwrap();
        app.set_text(input, "").unwrap();
        assert_eq!(app.focused(), None);
    }

    #[test]
    fn wrong_targets_are_typed_errors() {
        let mut app = App::headless(counter);
        let input = app.find_tag("input").unwrap();
        let err = app.click(input).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CoreError>(),
            Some(CoreError::NotInteractive { role: Role::TextField, .. })
        ));
        let err = app.click(999).unwrap_err();
        assert!(matches!(err.downcast_ref::<CoreError>(), Some(CoreError::UnknownView(999))));
        assert!(app.find_tag("nope").is_err());
    }

    #[test]
    fn focus_next_cycles() {
        let mut app = App::headless(counter);
        let button = app.find_tag("button").unwrap();
        let input = app.find_tag("input").unwrap();
        assert_eq!(app.focus_next().unwrap(), Some(button));
        assert_eq!(app.focus_next().unwrap(), Some(input));
        assert_eq!(app.focus_next().unwrap(), Some(button));
    }

    #[test]
    fn unmount_resets_state() {
        let mut app = App::headless(counter);
        app.click_tag("button").unwrap();
        app.unmount();
        assert!(app.scene_text().unwrap().starts_with("[ Count 0 ]"));
        assert_eq!(app.title(), "n=0");
    }
}
