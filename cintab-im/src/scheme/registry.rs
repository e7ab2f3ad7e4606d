//! Scheme catalog
//!
//! Describes the input schemes this input method knows about: id,
//! display name, backing table file, and rotation order. A scheme with
//! no table file (the latin pass-through scheme) needs no parsed table
//! and is always available.

/// Metadata for one input scheme
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemeMetadata {
    /// Unique identifier ("cangjie", "array", ...)
    pub id: String,
    /// Human-readable name shown in the UI
    pub display_name: String,
    /// Backing CIN table file; `None` marks a scheme that needs no table
    pub table_file: Option<String>,
    /// Rotation order (0, 1, 2, ...)
    pub order: usize,
}

impl SchemeMetadata {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        table_file: Option<&str>,
        order: usize,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            table_file: table_file.map(str::to_string),
            order,
        }
    }

    /// Whether this scheme composes through a parsed table.
    pub fn needs_table(&self) -> bool {
        self.table_file.is_some()
    }
}

/// Catalog of known schemes, in rotation order.
#[derive(Debug, Clone)]
pub struct SchemeRegistry {
    schemes: Vec<SchemeMetadata>,
}

impl SchemeRegistry {
    /// The built-in scheme catalog.
    pub fn builtin() -> Self {
        Self::new(vec![
            SchemeMetadata::new("cangjie", "倉頡", Some("qhcj.cin"), 0),
            SchemeMetadata::new("array", "行列", Some("qhar.cin"), 1),
            SchemeMetadata::new("boshiamy", "嘸蝦米", Some("qhbs.cin"), 2),
            SchemeMetadata::new("dayi", "大易", Some("qhdy.cin"), 3),
            SchemeMetadata::new("zhengma", "鄭碼", Some("qhzm.cin"), 4),
            SchemeMetadata::new("english", "英文", None, 5),
        ])
    }

    /// A registry over a custom catalog, kept in the given order.
    pub fn new(mut schemes: Vec<SchemeMetadata>) -> Self {
        schemes.sort_by_key(|m| m.order);
        Self { schemes }
    }

    pub fn schemes(&self) -> &[SchemeMetadata] {
        &self.schemes
    }

    pub fn is_empty(&self) -> bool {
        self.schemes.is_empty()
    }

    /// Look up a scheme by id.
    pub fn get(&self, id: &str) -> Option<&SchemeMetadata> {
        self.schemes.iter().find(|m| m.id == id)
    }

    /// Look up a scheme by its table file name.
    pub fn by_table_file(&self, file: &str) -> Option<&SchemeMetadata> {
        self.schemes
            .iter()
            .find(|m| m.table_file.as_deref() == Some(file))
    }

    /// The scheme after `id` in rotation order, wrapping around.
    /// Unknown ids rotate from the start of the catalog.
    pub fn next_after(&self, id: &str) -> Option<&SchemeMetadata> {
        if self.schemes.is_empty() {
            return None;
        }
        let index = self.schemes.iter().position(|m| m.id == id).unwrap_or(0);
        self.schemes.get((index + 1) % self.schemes.len())
    }
}

impl Default for SchemeRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
