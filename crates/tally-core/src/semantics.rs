use bitflags::bitflags;

/// High‑level semantic role of a view, similar to ARIA roles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Container,
    Heading,
    Text,
    Button,
    TextField,
    Image,
    List,
    ListItem,
    TextArea,
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct SemanticsFlags: u8 {
        const FOCUSED = 1 << 0;
        const ENABLED = 1 << 1;
        const READ_ONLY = 1 << 2;
    }
}

impl Default for SemanticsFlags {
    fn default() -> Self {
        SemanticsFlags::ENABLED
    }
}

/// Semantics attached to a `View`, used to build the accessibility tree.
#[derive(Clone, Debug)]
pub struct Semantics {
    /// Primary role of this node (what kind of thing it is).
    pub role: Role,
    /// Human‑readable label for screen readers. For buttons, this is the
    /// “name” that is announced.
    pub label: Option<String>,
    pub flags: SemanticsFlags,
}

impl Semantics {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            label: None,
            flags: SemanticsFlags::default(),
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn read_only(mut self) -> Self {
        self.flags |= SemanticsFlags::READ_ONLY;
        self
    }
}
