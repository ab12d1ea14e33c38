//! Conversion options.

/// Default base URL for bibliography entities.
pub const DEFAULT_BIBXML_URL: &str = "https://bib.ietf.org/public/rfc/bibxml";

/// Default `docName` of the generated `<rfc>` element.
pub const DEFAULT_DOC_NAME: &str = "draft-ietf-xml2rfc-template-05";

/// Settings for one conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Source name used in error messages and the trailing comment.
    pub source_name: Option<String>,
    /// `docName` attribute of the root element.
    pub doc_name: String,
    /// Base URL under which `reference.RFC.NNNN.xml` entities live.
    pub bibxml_url: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            source_name: None,
            doc_name: DEFAULT_DOC_NAME.to_string(),
            bibxml_url: DEFAULT_BIBXML_URL.to_string(),
        }
    }
}

impl Options {
    pub fn with_source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = Some(name.into());
        self
    }

    pub fn with_doc_name(mut self, name: impl Into<String>) -> Self {
        self.doc_name = name.into();
        self
    }

    /// Set the bibliography base URL; a trailing slash is ignored.
    pub fn with_bibxml_url(mut self, url: impl Into<String>) -> Self {
        let url: String = url.into();
        self.bibxml_url = url.trim_end_matches('/').to_string();
        self
    }
}
