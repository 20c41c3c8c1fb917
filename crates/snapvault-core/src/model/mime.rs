use crate::errors::ValueError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// MIME type of an asset (`type/subtype`, optional `;param=value` suffix)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MimeType {
    essence: String,
    params: Option<String>,
}

impl MimeType {
    pub fn parse(value: &str) -> Result<Self, ValueError> {
        let malformed = || ValueError::MalformedMimeType {
            value: value.to_string(),
        };
        let (essence, params) = match value.split_once(';') {
            Some((e, p)) => (e.trim(), Some(p.trim())),
            None => (value.trim(), None),
        };
        let (ty, subtype) = essence.split_once('/').ok_or_else(malformed)?;
        let token_ok = |t: &str| {
            !t.is_empty()
                && t.chars()
                    .all(|c| c.is_ascii_alphanumeric() || "!#$&-^_.+".contains(c))
        };
        if !token_ok(ty) || !token_ok(subtype) {
            return Err(malformed());
        }
        if matches!(params, Some(p) if p.is_empty()) {
            return Err(malformed());
        }
        Ok(Self {
            essence: essence.to_ascii_lowercase(),
            params: params.map(str::to_string),
        })
    }

    /// `type/subtype` without parameters
    pub fn essence(&self) -> &str {
        &self.essence
    }

    pub fn top_level(&self) -> &str {
        self.essence.split('/').next().unwrap_or_default()
    }

    pub fn subtype(&self) -> &str {
        self.essence.split('/').nth(1).unwrap_or_default()
    }

    pub fn params(&self) -> Option<&str> {
        self.params.as_deref()
    }
}

impl fmt::Display for MimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.params {
            Some(p) => write!(f, "{};{}", self.essence, p),
            None => f.write_str(&self.essence),
        }
    }
}

impl FromStr for MimeType {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MimeType::parse(s)
    }
}

impl TryFrom<String> for MimeType {
    type Error = ValueError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        MimeType::parse(&value)
    }
}

impl From<MimeType> for String {
    fn from(mime: MimeType) -> Self {
        mime.to_string()
    }
}
