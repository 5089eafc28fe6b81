/// Per-view attributes that are not part of a widget's own data.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Modifier {
    /// Identity among siblings (list items).
    pub key: Option<String>,
    /// Extra indentation, in cells, when painted.
    pub padding: u16,
    pub test_tag: Option<String>,
}

impl Modifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn padding(mut self, cells: u16) -> Self {
        self.padding = cells;
        self
    }

    pub fn test_tag(mut self, tag: impl Into<String>) -> Self {
        self.test_tag = Some(tag.into());
        self
    }
}
