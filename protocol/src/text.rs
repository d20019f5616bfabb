use serde::Deserialize;
use serde::Serialize;

/// Composer text with markdown entities applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextWithTags {
    pub text: String,
    /// Entities within `text`, ordered by start offset.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<TextTag>,
}

impl TextWithTags {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tags: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Move the contents out, leaving an empty value behind.
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }
}

impl From<&str> for TextWithTags {
    fn from(text: &str) -> Self {
        Self::plain(text)
    }
}

impl From<String> for TextWithTags {
    fn from(text: String) -> Self {
        Self::plain(text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextTag {
    /// Byte range in the parent `text` buffer that this tag covers.
    pub byte_range: ByteRange,
    /// Entity name, e.g. `**` for bold or a link target.
    pub tag: String,
}

impl TextTag {
    pub fn new(byte_range: ByteRange, tag: impl Into<String>) -> Self {
        Self {
            byte_range,
            tag: tag.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByteRange {
    /// Start byte offset (inclusive) within the UTF-8 text buffer.
    pub start: usize,
    /// End byte offset (exclusive) within the UTF-8 text buffer.
    pub end: usize,
}

impl From<std::ops::Range<usize>> for ByteRange {
    fn from(range: std::ops::Range<usize>) -> Self {
        Self {
            start: range.start,
            end: range.end,
        }
    }
}
