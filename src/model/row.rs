use serde::{Deserialize, Serialize};

/// One editable line of the mapping table.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct MappingRow {
    #[serde(default)]
    pub from: String,

    #[serde(default)]
    pub to: String,

    #[serde(default)]
    pub comment: String,

    #[serde(default)]
    pub is_duplicate_of_earlier: bool,
}

impl MappingRow {
    pub fn new(from: impl Into<String>, to: impl Into<String>, comment: impl Into<String>) -> Self {
        MappingRow {
            from: from.into(),
            to: to.into(),
            comment: comment.into(),
            is_duplicate_of_earlier: false,
        }
    }
}

/// A `(from, to, comment)` triple as returned by the build server.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct MappingElement {
    #[serde(default)]
    pub from: String,

    #[serde(default)]
    pub to: String,

    #[serde(default)]
    pub comment: String,
}

impl MappingElement {
    pub fn new(from: impl Into<String>, to: impl Into<String>, comment: impl Into<String>) -> Self {
        MappingElement {
            from: from.into(),
            to: to.into(),
            comment: comment.into(),
        }
    }
}

impl From<MappingElement> for MappingRow {
    fn from(e: MappingElement) -> Self {
        MappingRow::new(e.from, e.to, e.comment)
    }
}
