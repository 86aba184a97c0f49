use serde::{
    Deserialize,
    Serialize,
};
use std::{
    fmt,
    path::{
        Path,
        PathBuf,
    },
    str::FromStr,
};
use url::Url;

/// Where a metrics document lives: an HTTP(S) URL or a filesystem path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SourceRef {
    Url(Url),
    Path(PathBuf),
}

impl SourceRef {
    /// Resolves relative filesystem paths against `base`. URLs and absolute paths are unchanged.
    pub fn resolve_against(self, base: &Path) -> Self {
        match self {
            SourceRef::Path(path) if path.is_relative() => SourceRef::Path(base.join(path)),
            other => other,
        }
    }
}

impl FromStr for SourceRef {
    type Err = url::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.starts_with("http://") || s.starts_with("https://") {
            Url::parse(s).map(SourceRef::Url)
        } else {
            Ok(SourceRef::Path(PathBuf::from(s)))
        }
    }
}

impl TryFrom<String> for SourceRef {
    type Error = url::ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SourceRef> for String {
    fn from(value: SourceRef) -> Self {
        value.to_string()
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceRef::Url(url) => write!(f, "{url}"),
            SourceRef::Path(path) => write!(f, "{}", path.display()),
        }
    }
}
