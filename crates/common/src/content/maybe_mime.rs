use std::str::FromStr;

use mime::Mime;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An optional mime hint carried on a remote record.
///
/// Deserialization is lenient: a hint that doesn't parse as a mime type is
/// treated as absent, so one malformed record can't fail a whole fetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaybeMime(pub Option<Mime>);

impl MaybeMime {
    /// The hint if present, otherwise a guess from the path's extension.
    ///
    /// Markdown files resolve to `text/markdown`; anything unknown falls
    /// back to `text/plain`.
    pub fn or_guess(&self, path: &str) -> Mime {
        match &self.0 {
            Some(mime) => mime.clone(),
            None => mime_guess::from_path(path).first_or_text_plain(),
        }
    }

    pub fn is_some(&self) -> bool {
        self.0.is_some()
    }
}

impl From<Mime> for MaybeMime {
    fn from(mime: Mime) -> Self {
        MaybeMime(Some(mime))
    }
}

impl Serialize for MaybeMime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match &self.0 {
            Some(mime) => serializer.serialize_str(mime.as_ref()),
            None => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for MaybeMime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let opt: Option<String> = Option::deserialize(deserializer)?;
        match opt {
            Some(s) if !s.trim().is_empty() => match Mime::from_str(s.trim()) {
                Ok(mime) => Ok(MaybeMime(Some(mime))),
                Err(e) => {
                    tracing::warn!("ignoring invalid mime hint {:?}: {}", s, e);
                    Ok(MaybeMime(None))
                }
            },
            _ => Ok(MaybeMime(None)),
        }
    }
}
