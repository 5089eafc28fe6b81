#![allow(non_snake_case)]
//! Widgets, text fields and headless layout/paint.
//!
//! Builders return plain `View` values. `layout_and_paint` stamps ids,
//! flattens the tree into an indented text `Scene`, and collects the hit
//! regions and semantics nodes the platform uses to route input.

use std::rc::Rc;

use tally_core::*;

pub mod textfield;
pub use textfield::{TextField, TextFieldExt, TextFieldState};

pub fn Column(modifier: Modifier) -> View {
    View::new(0, ViewKind::Column).modifier(modifier)
}

pub fn Heading(level: u8, text: impl Into<String>) -> View {
    let text = text.into();
    View::new(
        0,
        ViewKind::Heading {
            text: text.clone(),
            level: level.clamp(1, 6),
        },
    )
    .semantics(Semantics::new(Role::Heading).label(text))
}

pub fn Text(text: impl Into<String>) -> View {
    View::new(0, ViewKind::Text { text: text.into() })
}

pub fn Button(text: impl Into<String>, on_click: impl Fn() + 'static) -> View {
    View::new(
        0,
        ViewKind::Button {
            text: text.into(),
            on_click: Some(Rc::new(on_click)),
        },
    )
    .semantics(Semantics::new(Role::Button))
}

pub fn Image(modifier: Modifier, src: impl Into<String>, alt: impl Into<String>) -> View {
    View::new(
        0,
        ViewKind::Image {
            src: src.into(),
            alt: alt.into(),
        },
    )
    .modifier(modifier)
    .semantics(Semantics::new(Role::Image))
}

/// Bulleted list. Children that are not `ListItem`s are painted as-is.
pub fn List(modifier: Modifier) -> View {
    View::new(0, ViewKind::List).modifier(modifier)
}

pub fn ListItem(modifier: Modifier, text: impl Into<String>) -> View {
    View::new(0, ViewKind::ListItem { text: text.into() }).modifier(modifier)
}

/// Read-only multi-line text display.
pub fn TextArea(modifier: Modifier, value: impl Into<String>) -> View {
    View::new(
        0,
        ViewKind::TextArea {
            value: value.into(),
            read_only: true,
        },
    )
    .modifier(modifier)
    .semantics(Semantics::new(Role::TextArea).read_only())
}

/// Extension trait for child building
pub trait ViewExt: Sized {
    fn child(self, children: impl IntoChildren) -> Self;
}

impl ViewExt for View {
    fn child(self, children: impl IntoChildren) -> Self {
        self.with_children(children.into_children())
    }
}

pub trait IntoChildren {
    fn into_children(self) -> Vec<View>;
}

impl IntoChildren for View {
    fn into_children(self) -> Vec<View> {
        vec![self]
    }
}

impl IntoChildren for Vec<View> {
    fn into_children(self) -> Vec<View> {
        self
    }
}

/// Conditional rendering: `None` contributes no children.
impl IntoChildren for Option<View> {
    fn into_children(self) -> Vec<View> {
        self.into_iter().collect()
    }
}

impl<const N: usize> IntoChildren for [View; N] {
    fn into_children(self) -> Vec<View> {
        self.into()
    }
}

macro_rules! impl_into_children_tuple {
    ($($idx:tt $t:ident),+) => {
        impl<$($t: IntoChildren),+> IntoChildren for ($($t,)+) {
            fn into_children(self) -> Vec<View> {
                let mut v = Vec::new();
                $(v.extend(self.$idx.into_children());)+
                v
            }
        }
    };
}

impl_into_children_tuple!(0 A, 1 B);
impl_into_children_tuple!(0 A, 1 B, 2 C);
impl_into_children_tuple!(0 A, 1 B, 2 C, 3 D);
impl_into_children_tuple!(0 A, 1 B, 2 C, 3 D, 4 E);
impl_into_children_tuple!(0 A, 1 B, 2 C, 3 D, 4 E, 5 F);
impl_into_children_tuple!(0 A, 1 B, 2 C, 3 D, 4 E, 5 F, 6 G);
impl_into_children_tuple!(0 A, 1 B, 2 C, 3 D, 4 E, 5 F, 6 G, 7 H);

fn role_for(kind: &ViewKind) -> Role {
    match kind {
        ViewKind::Column => Role::Container,
        ViewKind::Heading { .. } => Role::Heading,
        ViewKind::Text { .. } => Role::Text,
        ViewKind::Button { .. } => Role::Button,
        ViewKind::TextField { .. } => Role::TextField,
        ViewKind::Image { .. } => Role::Image,
        ViewKind::List => Role::List,
        ViewKind::ListItem { .. } => Role::ListItem,
        ViewKind::TextArea { .. } => Role::TextArea,
    }
}

struct Painter {
    focused: Option<ViewId>,
    scene: Scene,
    hits: Vec<HitRegion>,
    sems: Vec<SemNode>,
}

impl Painter {
    fn sem(&mut self, v: &View, label: Option<String>, value: Option<String>) {
        let (role, mut flags, explicit_label) = match &v.semantics {
            Some(s) => (s.role, s.flags, s.label.clone()),
            None => (role_for(&v.kind), SemanticsFlags::default(), None),
        };
        if self.focused == Some(v.id) {
            flags |= SemanticsFlags::FOCUSED;
        }
        self.sems.push(SemNode {
            id: v.id,
            role,
            label: explicit_label.or(label),
            value,
            test_tag: v.modifier.test_tag.clone(),
            key: v.modifier.key.clone(),
            flags,
        });
    }

    fn walk(&mut self, v: &View, indent: u16) {
        let indent = indent + v.modifier.padding;
        let is_focused = self.focused == Some(v.id);

        match &v.kind {
            ViewKind::Column => {
                self.sem(v, None, None);
                for c in &v.children {
                    self.walk(c, indent);
                }
            }
            ViewKind::Heading { text, level } => {
                let marks = "#".repeat(*level as usize);
                self.scene.push_line(indent, format!("{marks} {text}"));
                self.sem(v, Some(text.clone()), None);
            }
            ViewKind::Text { text } => {
                self.scene.push_line(indent, text.clone());
                self.sem(v, Some(text.clone()), None);
            }
            ViewKind::Button { text, on_click } => {
                let marker = if is_focused { "*" } else { " " };
                self.scene
                    .push_line(indent, format!("[{marker}{text}{marker}]"));
                self.hits.push(HitRegion {
                    id: v.id,
                    on_click: on_click.clone(),
                    on_text_change: None,
                    focusable: true,
                    tf_state_key: None,
                });
                self.sem(v, Some(text.clone()), None);
            }
            ViewKind::TextField {
                state_key,
                value,
                hint,
                on_change,
            } => {
                let caret = if is_focused { "_" } else { "" };
                let shown = if value.is_empty() && !is_focused && !hint.is_empty() {
                    format!("({hint})")
                } else {
                    format!("{value}{caret}")
                };
                self.scene.push_line(indent, format!("> {shown}"));
                self.hits.push(HitRegion {
                    id: v.id,
                    on_click: None,
                    on_text_change: on_change.clone(),
                    focusable: true,
                    tf_state_key: (*state_key != 0).then_some(*state_key),
                });
                self.sem(v, (!hint.is_empty()).then(|| hint.clone()), Some(value.clone()));
            }
            ViewKind::Image { src, alt } => {
                let line = if alt.is_empty() {
                    format!("<img {src}>")
                } else {
                    format!("<img \"{alt}\" {src}>")
                };
                self.scene.push_line(indent, line);
                self.sem(v, (!alt.is_empty()).then(|| alt.clone()), None);
            }
            ViewKind::List => {
                if v.children.is_empty() {
                    self.scene.push_line(indent, "list (empty)");
                } else {
                    self.scene
                        .push_line(indent, format!("list ({} items)", v.children.len()));
                }
                self.sem(v, None, None);
                for c in &v.children {
                    match &c.kind {
                        ViewKind::ListItem { text } => {
                            self.scene
                                .push_line(indent + 1 + c.modifier.padding, format!("- {text}"));
                            self.sem(c, Some(text.clone()), None);
                        }
                        _ => self.walk(c, indent + 1),
                    }
                }
            }
            ViewKind::ListItem { text } => {
                // outside a list
                self.scene.push_line(indent, format!("- {text}"));
                self.sem(v, Some(text.clone()), None);
            }
            ViewKind::TextArea { value, .. } => {
                if value.is_empty() {
                    self.scene.push_line(indent, "textarea (empty)");
                } else {
                    self.scene.push_line(indent, "textarea");
                    for line in value.lines() {
                        self.scene.push_line(indent + 1, format!("| {line}"));
                    }
                }
                self.sem(v, None, Some(value.clone()));
            }
        }
    }
}

/// Assigns ids depth-first (root is 1), then paints the tree.
pub fn layout_and_paint(
    root: &View,
    focused: Option<ViewId>,
) -> (Scene, Vec<HitRegion>, Vec<SemNode>) {
    fn stamp(mut v: View, id: &mut u64) -> View {
        v.id = *id;
        *id += 1;
        v.children = v.children.into_iter().map(|c| stamp(c, id)).collect();
        v
    }
    let mut id = 1u64;
    let root = stamp(root.clone(), &mut id);

    let mut painter = Painter {
        focused,
        scene: Scene::default(),
        hits: vec![],
        sems: vec![],
    };
    painter.walk(&root, 0);
    log::trace!(
        "painted {} line(s), {} hit region(s)",
        painter.scene.nodes.len(),
        painter.hits.len()
    );
    (painter.scene, painter.hits, painter.sems)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn sample() -> View {
        Column(Modifier::new()).child((
            Heading(1, "Title"),
            Button("Go", || {}),
            TextField("", "name", |_| {}),
            Image(Modifier::new(), "https://example.com/a.png", ""),
            List(Modifier::new()).child(vec![
                ListItem(Modifier::new().key("li-0"), "a"),
                ListItem(Modifier::new().key("li-1"), "b"),
            ]),
            TextArea(Modifier::new(), "one\ntwo\n"),
        ))
    }

    #[test]
    fn paints_every_widget() {
        let (scene, _, _) = layout_and_paint(&sample(), None);
        insta::assert_snapshot!(scene.to_text(), @r"
        # Title
        [ Go ]
        > (name)
        <img https://example.com/a.png>
        list (2 items)
          - a
          - b
        textarea
          | one
          | two
        ");
    }

    #[test]
    fn ids_are_depth_first() {
        let (_, hits, sems) = layout_and_paint(&sample(), None);
        let ids: Vec<_> = sems.iter().map(|n| (n.id, n.role)).collect();
        assert_eq!(
            ids,
            vec![
                (1, Role::Container),
                (2, Role::Heading),
                (3, Role::Button),
                (4, Role::TextField),
                (5, Role::Image),
                (6, Role::List),
                (7, Role::ListItem),
                (8, Role::ListItem),
                (9, Role::TextArea),
            ]
        );
        assert_eq!(hits.iter().map(|h| h.id).collect::<Vec<_>>(), vec![3, 4]);

        let keys: Vec<_> = sems.iter().filter_map(|n| n.key.as_deref()).collect();
        assert_eq!(keys, ["li-0", "li-1"]);
    }

    #[test]
    fn empty_list_and_none_children() {
        let view = Column(Modifier::new()).child((
            None::<View>,
            List(Modifier::new()),
            TextArea(Modifier::new(), ""),
        ));
        let (scene, _, _) = layout_and_paint(&view, None);
        assert_eq!(scene.to_text(), "list (empty)\ntextarea (empty)\n");
    }

    #[test]
    fn focus_marks_button_and_field() {
        let view = Column(Modifier::new()).child((
            Button("Go", || {}),
            TextField("abc", "", |_| {}),
        ));
        let (scene, _, sems) = layout_and_paint(&view, Some(3));
        assert_eq!(scene.to_text(), "[ Go ]\n> abc_\n");
        assert!(sems.iter().find(|n| n.id == 3).is_some_and(SemNode::focused));
        assert_eq!(sems[2].value.as_deref(), Some("abc"));
    }

    #[test]
    fn hit_regions_carry_callbacks() {
        let clicks = Rc::new(Cell::new(0));
        let view = Button("Go", {
            let clicks = clicks.clone();
            move || clicks.set(clicks.get() + 1)
        });
        let (_, hits, _) = layout_and_paint(&view, None);
        if let Some(cb) = &hits[0].on_click {
            cb();
        }
        assert_eq!(clicks.get(), 1);
    }

    #[test]
    fn read_only_text_area_semantics() {
        let (_, _, sems) = layout_and_paint(&TextArea(Modifier::new(), "log"), None);
        assert!(sems[0].flags.contains(SemanticsFlags::READ_ONLY));
        assert_eq!(sems[0].value.as_deref(), Some("log"));
    }
}
