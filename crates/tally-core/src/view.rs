use std::rc::Rc;

use crate::Modifier;

pub type ViewId = u64;

pub type Callback = Rc<dyn Fn()>;
pub type TextCallback = Rc<dyn Fn(String)>;

#[derive(Clone)]
pub enum ViewKind {
    Column,
    Heading {
        text: String,
        level: u8,
    },
    Text {
        text: String,
    },
    Button {
        text: String,
        on_click: Option<Callback>,
    },
    /// Controlled input: `value` is what the application says the field holds.
    TextField {
        state_key: ViewId,
        value: String,
        hint: String,
        on_change: Option<TextCallback>,
    },
    Image {
        src: String,
        alt: String,
    },
    List,
    ListItem {
        text: String,
    },
    TextArea {
        value: String,
        read_only: bool,
    },
}

impl std::fmt::Debug for ViewKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewKind::Column => write!(f, "Column"),
            ViewKind::Heading { text, level } => f
                .debug_struct("Heading")
                .field("text", text)
                .field("level", level)
                .finish(),
            ViewKind::Text { text } => f.debug_struct("Text").field("text", text).finish(),
            ViewKind::Button { text, .. } => f
                .debug_struct("Button")
                .field("text", text)
                .field("on_click", &"<callback>")
                .finish(),
            ViewKind::TextField {
                state_key,
                value,
                hint,
                ..
            } => f
                .debug_struct("TextField")
                .field("state_key", state_key)
                .field("value", value)
                .field("hint", hint)
                .finish(),
            ViewKind::Image { src, alt } => f
                .debug_struct("Image")
                .field("src", src)
                .field("alt", alt)
                .finish(),
            ViewKind::List => write!(f, "List"),
            ViewKind::ListItem { text } => {
                f.debug_struct("ListItem").field("text", text).finish()
            }
            ViewKind::TextArea { value, read_only } => f
                .debug_struct("TextArea")
                .field("value", value)
                .field("read_only", read_only)
                .finish(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct View {
    pub id: ViewId,
    pub kind: ViewKind,
    pub modifier: Modifier,
    pub children: Vec<View>,
    pub semantics: Option<crate::semantics::Semantics>,
}

impl View {
    pub fn new(id: ViewId, kind: ViewKind) -> Self {
        View {
            id,
            kind,
            modifier: Modifier::default(),
            children: vec![],
            semantics: None,
        }
    }
    pub fn modifier(mut self, m: Modifier) -> Self {
        self.modifier = m;
        self
    }
    pub fn with_children(mut self, kids: Vec<View>) -> Self {
        self.children = kids;
        self
    }
    pub fn semantics(mut self, s: crate::semantics::Semantics) -> Self {
        self.semantics = Some(s);
        self
    }

    /// Number of views in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(View::node_count).sum::<usize>()
    }

    /// Depth-first search by test tag.
    pub fn find_by_tag(&self, tag: &str) -> Option<&View> {
        if self.modifier.test_tag.as_deref() == Some(tag) {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find_by_tag(tag))
    }
}

/// Renderable scene: indented text lines, top to bottom.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Scene {
    pub nodes: Vec<SceneNode>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SceneNode {
    Line { indent: u16, text: String },
    /// Drawn after the content regardless of tree position (HUD, inspector).
    Overlay { text: String },
}

impl Scene {
    pub fn push_line(&mut self, indent: u16, text: impl Into<String>) {
        self.nodes.push(SceneNode::Line {
            indent,
            text: text.into(),
        });
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let overlays = self.nodes.iter().filter_map(|n| match n {
            SceneNode::Overlay { text } => Some(text),
            SceneNode::Line { .. } => None,
        });
        let lines = self.nodes.iter().filter_map(|n| match n {
            SceneNode::Line { indent, text } => Some((*indent, text)),
            SceneNode::Overlay { .. } => None,
        });
        for (indent, text) in lines {
            out.extend(std::iter::repeat_n(' ', indent as usize * 2));
            out.push_str(text);
            out.push('\n');
        }
        for text in overlays {
            out.push_str("# ");
            out.push_str(text);
            out.push('\n');
        }
        out
    }
}
