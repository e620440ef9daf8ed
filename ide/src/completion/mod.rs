//! Completion results for editor integrations.
//! All coordinates are UTF-8 byte offsets into the input `text`.
//! Spans are half-open ranges `[start, end)`.

use serde::{Deserialize, Serialize};

mod options;

pub(crate) use options::completion_at;

/// High-level bucket for UI grouping: elements, attributes, values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionKind {
    Type,
    Property,
    Constant,
}

/// One completion candidate for an editor UI.
///
/// `label` is what the list shows and, unless `apply` is set, also the
/// inserted text. `boost` nudges ranking among equally good matches.
///
/// Use [`CompletionItem::new`] to construct with sensible defaults, then
/// chain builder methods (`.with_detail()`, `.with_boost()`, etc.) to
/// customise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionItem {
    pub label: String,
    #[serde(rename = "type")]
    pub kind: CompletionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apply: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default)]
    pub boost: i32,
}

impl CompletionItem {
    pub fn new(label: impl Into<String>, kind: CompletionKind) -> Self {
        Self {
            label: label.into(),
            kind,
            apply: None,
            detail: None,
            boost: 0,
        }
    }

    pub fn with_apply(mut self, apply: impl Into<String>) -> Self {
        self.apply = Some(apply.into());
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_boost(mut self, boost: i32) -> Self {
        self.boost = boost;
        self
    }

    /// Layer caller-declared overrides onto this item. The label is
    /// structural (it is what gets matched and inserted), so it is not
    /// overridable.
    pub(crate) fn overridden(mut self, over: &ItemOverride) -> Self {
        if let Some(kind) = over.kind {
            self.kind = kind;
        }
        if let Some(apply) = &over.apply {
            self.apply = Some(apply.clone());
        }
        if let Some(detail) = &over.detail {
            self.detail = Some(detail.clone());
        }
        if let Some(boost) = over.boost {
            self.boost = boost;
        }
        self
    }
}

/// Display overrides a schema may attach to one element or attribute.
/// Unset fields keep the generated defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemOverride {
    pub kind: Option<CompletionKind>,
    pub apply: Option<String>,
    pub detail: Option<String>,
    pub boost: Option<i32>,
}

impl ItemOverride {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(mut self, kind: CompletionKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn apply(mut self, apply: impl Into<String>) -> Self {
        self.apply = Some(apply.into());
        self
    }

    pub fn detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn boost(mut self, boost: i32) -> Self {
        self.boost = Some(boost);
        self
    }
}

/// Which typed text keeps a [`CompletionResult`] valid as the user keeps
/// typing, so the host can filter instead of re-querying. Serializes as
/// the source of the equivalent regular expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPattern {
    /// A partial tag or attribute name.
    Name,
    /// A partial attribute value, quoted or bare.
    Value,
    /// A partial tag: optional `<`, optional `/`, then a partial name.
    Tag,
}

impl MatchPattern {
    pub fn as_regex_str(self) -> &'static str {
        match self {
            MatchPattern::Name => r"^[:\-\.\w\u00b7-\uffff]*$",
            MatchPattern::Value => r#"^"?[^"\s]*"?$"#,
            MatchPattern::Tag => r"^<?/?[:\-\.\w\u00b7-\uffff]*$",
        }
    }

    /// Programmatic form of the same pattern.
    pub fn matches(self, text: &str) -> bool {
        match self {
            MatchPattern::Name => text.chars().all(is_completion_name_char),
            MatchPattern::Value => {
                let rest = text.strip_prefix('"').unwrap_or(text);
                let rest = rest.strip_suffix('"').unwrap_or(rest);
                rest.chars().all(|c| c != '"' && !c.is_whitespace())
            }
            MatchPattern::Tag => {
                let rest = text.strip_prefix('<').unwrap_or(text);
                let rest = rest.strip_prefix('/').unwrap_or(rest);
                rest.chars().all(is_completion_name_char)
            }
        }
    }
}

fn is_completion_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(c, '_' | ':' | '-' | '.')
        || ('\u{00b7}'..='\u{ffff}').contains(&c)
}

impl Serialize for MatchPattern {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_regex_str())
    }
}

impl<'de> Deserialize<'de> for MatchPattern {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let source = String::deserialize(deserializer)?;
        [MatchPattern::Name, MatchPattern::Value, MatchPattern::Tag]
            .into_iter()
            .find(|pattern| pattern.as_regex_str() == source)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown match pattern {source:?}")))
    }
}

/// Result of a completion query at a byte cursor.
///
/// Accepting an option replaces `[from, cursor)`, or `[from, to)` when
/// `to` is set (it extends past the cursor to swallow text the completion
/// re-inserts, like a trailing `>` or `"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionResult {
    pub from: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<u32>,
    pub options: Vec<CompletionItem>,
    #[serde(rename = "validFor")]
    pub valid_for: MatchPattern,
}
