use std::fmt;
use uuid::Uuid;

/// Length of a hyphenated UUID, e.g. `67e55044-10b1-426f-9247-bb680e5fe0c8`
const HYPHENATED_LEN: usize = 36;

/// Opaque handle for one generation request. Doubles as the artifact file stem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(Uuid);

impl TaskId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a client-supplied id.
    ///
    /// Only the hyphenated form is accepted, so anything that could act as a
    /// path component (`..`, `/`, braces, urn prefixes) is rejected before a
    /// filesystem path is ever built from it.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.len() != HYPHENATED_LEN {
            return None;
        }
        Uuid::try_parse(raw).ok().map(Self)
    }

    pub fn file_name(&self) -> String {
        format!("{}.mp3", self)
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}
