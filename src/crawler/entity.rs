use serde::Serialize;

/// A searchable work returned by a source
///
/// Identity is by `id`; titles are free text and may collide across
/// distinct entities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entity {
    /// Opaque identifier, unique within one source
    pub id: String,

    /// Display title
    pub title: String,
}

impl Entity {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}
