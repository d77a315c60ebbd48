//! Namespace-qualified names, generalized so OOXML callers can resolve
//! `w:`/`a:`/`r:` prefixes the same way ODF callers resolve
//! `text:`/`table:`/`style:`.

use std::collections::HashMap;

/// A namespace-qualified element or attribute name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedName {
    pub namespace_uri: Option<String>,
    pub local_name: String,
    pub qualified_name: String,
}

impl QualifiedName {
    pub fn from_string(name: &str) -> Self {
        Self::from_string_with_context(name, None)
    }

    fn from_string_with_context(name: &str, context: Option<&NamespaceContext>) -> Self {
        match name.find(':') {
            Some(colon) => {
                let prefix = &name[..colon];
                let local_name = name[colon + 1..].to_string();
                let namespace_uri = match context {
                    Some(ctx) => ctx.resolve_prefix(prefix).map(str::to_string),
                    None => well_known_prefix_uri(prefix).map(str::to_string),
                };
                Self {
                    namespace_uri,
                    local_name,
                    qualified_name: name.to_string(),
                }
            },
            None => {
                let namespace_uri = context.and_then(|ctx| ctx.default_namespace().map(str::to_string));
                Self {
                    namespace_uri,
                    local_name: name.to_string(),
                    qualified_name: name.to_string(),
                }
            },
        }
    }

    pub fn matches(&self, other: &QualifiedName) -> bool {
        self.local_name == other.local_name
            && (self.namespace_uri.is_none()
                || other.namespace_uri.is_none()
                || self.namespace_uri == other.namespace_uri)
    }
}

impl std::fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.qualified_name)
    }
}

/// Prefix -> URI table for namespaces recognized literally by this crate.
fn well_known_prefix_uri(prefix: &str) -> Option<&'static str> {
    Some(match prefix {
        "office" => "urn:oasis:names:tc:opendocument:xmlns:office:1.0",
        "text" => "urn:oasis:names:tc:opendocument:xmlns:text:1.0",
        "table" => "urn:oasis:names:tc:opendocument:xmlns:table:1.0",
        "draw" => "urn:oasis:names:tc:opendocument:xmlns:drawing:1.0",
        "style" => "urn:oasis:names:tc:opendocument:xmlns:style:1.0",
        "fo" => "urn:oasis:names:tc:opendocument:xmlns:xsl-fo-compatible:1.0",
        "svg" => "urn:oasis:names:tc:opendocument:xmlns:svg-compatible:1.0",
        "xlink" => "http://www.w3.org/1999/xlink",
        "manifest" => "urn:oasis:names:tc:opendocument:xmlns:manifest:1.0",
        "meta" => "urn:oasis:names:tc:opendocument:xmlns:meta:1.0",
        "number" => "urn:oasis:names:tc:opendocument:xmlns:datastyle:1.0",
        "presentation" => "urn:oasis:names:tc:opendocument:xmlns:presentation:1.0",
        "loext" => "urn:org:documentfoundation:names:experimental:office:xmlns:loext:1.0",
        "w" => "http://schemas.openxmlformats.org/wordprocessingml/2006/main",
        "p" => "http://schemas.openxmlformats.org/presentationml/2006/main",
        "a" => "http://schemas.openxmlformats.org/drawingml/2006/main",
        "r" => "http://schemas.openxmlformats.org/officeDocument/2006/relationships",
        "xdr" => "http://schemas.openxmlformats.org/drawingml/2006/spreadsheetDrawing",
        "wp" => "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing",
        "pic" => "http://schemas.openxmlformats.org/drawingml/2006/picture",
        "xl" => "http://schemas.openxmlformats.org/spreadsheetml/2006/main",
        _ => return None,
    })
}

/// Per-document prefix -> URI bindings collected from `xmlns*` attributes.
#[derive(Debug, Clone, Default)]
pub struct NamespaceContext {
    prefixes: HashMap<String, String>,
    default_namespace: Option<String>,
}

impl NamespaceContext {
    pub fn add_namespace(&mut self, attr_key: &str, uri: &str) {
        if attr_key == "xmlns" {
            self.default_namespace = Some(uri.to_string());
        } else if let Some(prefix) = attr_key.strip_prefix("xmlns:") {
            self.prefixes.insert(prefix.to_string(), uri.to_string());
        }
    }

    pub fn resolve_prefix(&self, prefix: &str) -> Option<&str> {
        self.prefixes
            .get(prefix)
            .map(String::as_str)
            .or_else(|| well_known_prefix_uri(prefix))
    }

    pub fn default_namespace(&self) -> Option<&str> {
        self.default_namespace.as_deref()
    }

    pub fn parse_qualified_name(&self, name: &str) -> QualifiedName {
        QualifiedName::from_string_with_context(name, Some(self))
    }
}
