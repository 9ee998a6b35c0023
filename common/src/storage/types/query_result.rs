use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Discriminant of a [`NormalizedSource`]. Matching is exact; any other value,
/// including a differently cased known kind, is kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum SourceKind {
    Video,
    #[default]
    Document,
    Image,
    Other(String),
}

impl SourceKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Video => "video",
            Self::Document => "document",
            Self::Image => "image",
            Self::Other(value) => value,
        }
    }
}

impl From<&str> for SourceKind {
    fn from(value: &str) -> Self {
        match value {
            "video" => Self::Video,
            "document" => Self::Document,
            "image" => Self::Image,
            _ => Self::Other(value.to_string()),
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for SourceKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SourceKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Self::from(value.as_str()))
    }
}

/// Where a piece of supporting evidence for an answer came from. Fields are the
/// union over every kind; the ones that do not apply stay `None` and serialize
/// as `null`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NormalizedSource {
    pub node_type: SourceKind,
    pub video_name: Option<String>,
    pub start_time: Option<f64>,
    pub end_time: Option<f64>,
    pub pdf_name: Option<String>,
    pub page_num: Option<i64>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QueryResult {
    pub answer: String,
    pub sources: Vec<NormalizedSource>,
}

impl QueryResult {
    /// An answer produced locally, without consulting the backend.
    pub fn message(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            sources: Vec::new(),
        }
    }
}
