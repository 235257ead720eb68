/// Options controlling how a container is opened and searched.
///
/// # Examples
///
/// ```rust
/// use olestorage::ole::{NameMatching, OpenOptions};
///
/// // Create with defaults
/// let options = OpenOptions::default();
///
/// // Or customize
/// let options = OpenOptions::new()
///     .with_name_matching(NameMatching::CaseInsensitive)
///     .with_max_tree_depth(64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenOptions {
    /// How `Storage::open` compares entry names
    pub name_matching: NameMatching,
    /// Deepest directory tree (and storage nesting) accepted before the
    /// directory is reported corrupt. Never more than the entry count.
    pub max_tree_depth: usize,
    /// Whether the mini stream container is read at open time
    pub load_mini_stream: bool,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            name_matching: NameMatching::Exact,
            max_tree_depth: usize::MAX,
            load_mini_stream: true,
        }
    }
}

impl OpenOptions {
    /// Create a new `OpenOptions` with default values.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how entry names are compared during lookups.
    #[inline]
    pub fn with_name_matching(mut self, matching: NameMatching) -> Self {
        self.name_matching = matching;
        self
    }

    /// Set the deepest tree accepted while listing a storage.
    #[inline]
    pub fn with_max_tree_depth(mut self, depth: usize) -> Self {
        self.max_tree_depth = depth;
        self
    }

    /// Set whether the mini stream container is loaded.
    ///
    /// Without it, short streams with content cannot be read. Useful when
    /// only long streams or the directory listing are of interest.
    #[inline]
    pub fn with_mini_stream(mut self, load: bool) -> Self {
        self.load_mini_stream = load;
        self
    }
}

/// Entry name comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NameMatching {
    /// Names must match exactly
    #[default]
    Exact,
    /// ASCII letters compare case-insensitively
    CaseInsensitive,
}

impl NameMatching {
    #[inline]
    pub fn matches(self, candidate: &str, wanted: &str) -> bool {
        match self {
            NameMatching::Exact => candidate == wanted,
            NameMatching::CaseInsensitive => candidate.eq_ignore_ascii_case(wanted),
        }
    }
}
