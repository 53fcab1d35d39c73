//! File kind classification by extension.

/// Kind of servable file, detected from the resolved file name's extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Markup document (`html`).
    Html,
    /// Stylesheet (`css`).
    Css,
    /// Script (`js`).
    Js,
    /// Cache manifest (`appcache`).
    Appcache,
    /// Anything else; served untransformed, no explicit content type.
    Other,
}

impl FileKind {
    pub fn from_extension(ext: &str) -> Self {
        match ext {
            "html" => Self::Html,
            "css" => Self::Css,
            "js" => Self::Js,
            "appcache" => Self::Appcache,
            _ => Self::Other,
        }
    }

    /// Classify a file name by its last extension.
    pub fn from_name(name: &str) -> Self {
        match name.rsplit_once('.') {
            Some((_, ext)) => Self::from_extension(ext),
            None => Self::Other,
        }
    }

    /// Content-Type header value. Markup and unknown kinds carry none.
    pub fn content_type(self) -> Option<&'static str> {
        match self {
            Self::Js => Some("application/javascript"),
            Self::Css => Some("text/css"),
            Self::Appcache => Some("text/cache-manifest"),
            Self::Html | Self::Other => None,
        }
    }
}
