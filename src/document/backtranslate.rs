//! Back-translation: applies a JSON text diff to a document's source XML,
//! replacing each named run's text and deleting every run whose ID the diff
//! omits.
//!
//! Content IDs are assigned by walking the DOM in document order and
//! numbering each leaf text-bearing group as it's encountered - the same
//! order an external renderer producing `modifiedText` keys would have
//! walked it, so IDs are reproducible without this crate ever having run
//! `translate()` itself. ODF groups are contiguous runs of `Node::Text` /
//! `text:s` / `text:tab` siblings (mirroring [`crate::element::build_odf`]'s
//! aggregation); OOXML groups are each `w:r` run's `w:t`/`w:tab` children.

use std::collections::HashMap;

use crate::common::{Error, Result};
use crate::xml::{Element, Node};

fn escape_xml_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

fn is_odf_text_ish(node: &Node) -> bool {
    match node {
        Node::Text(_) => true,
        Node::Element(e) => {
            let local = e.local_name();
            (local == "s" || local == "tab") && e.tag.starts_with("text:")
        },
    }
}

fn build_odf_replacement(new_text: &str) -> Vec<Node> {
    let mut out = Vec::new();
    for (idx, part) in new_text.split('\t').enumerate() {
        if idx > 0 {
            out.push(Node::Element(Element::new("text:tab")));
        }
        if !part.is_empty() {
            out.push(Node::Text(escape_xml_text(part)));
        }
    }
    out
}

/// Walks `children` in place, assigning sequential content IDs to each
/// contiguous text-ish run and splicing in `diff`'s replacement where a run's
/// ID is present; a run whose ID isn't in `diff` is deleted entirely.
fn apply_odf_children(children: Vec<Node>, diff: &HashMap<u32, String>, next_id: &mut u32) -> Vec<Node> {
    let mut out = Vec::with_capacity(children.len());
    let mut i = 0;
    while i < children.len() {
        if is_odf_text_ish(&children[i]) {
            while i < children.len() && is_odf_text_ish(&children[i]) {
                i += 1;
            }
            let cid = *next_id;
            *next_id += 1;
            if let Some(new_text) = diff.get(&cid) {
                out.extend(build_odf_replacement(new_text));
            }
        } else {
            match &children[i] {
                Node::Element(e) => {
                    let mut e = e.clone();
                    let kids = std::mem::take(&mut e.children);
                    e.children = apply_odf_children(kids, diff, next_id);
                    out.push(Node::Element(e));
                },
                Node::Text(_) => unreachable!("covered by is_odf_text_ish"),
            }
            i += 1;
        }
    }
    out
}

fn build_ooxml_run_replacement(new_text: &str) -> Vec<Node> {
    let mut out = Vec::new();
    for (idx, part) in new_text.split('\t').enumerate() {
        if idx > 0 {
            out.push(Node::Element(Element::new("w:tab")));
        }
        let mut t = Element::new("w:t");
        t.set_attr("xml:space", "preserve");
        t.children.push(Node::Text(escape_xml_text(part)));
        out.push(Node::Element(t));
    }
    out
}

/// Walks `children` in place; every `w:r` run is one content-ID group,
/// replaced wholesale when `diff` names its ID and dropped entirely
/// otherwise. Non-run elements recurse unchanged so nested paragraphs/tables
/// are still walked.
fn apply_ooxml_children(children: Vec<Node>, diff: &HashMap<u32, String>, next_id: &mut u32) -> Vec<Node> {
    let mut out = Vec::with_capacity(children.len());
    for node in children {
        match node {
            Node::Text(t) => out.push(Node::Text(t)),
            Node::Element(mut e) => {
                if e.local_name() == "r" && e.tag.starts_with("w:") {
                    let cid = *next_id;
                    *next_id += 1;
                    if let Some(new_text) = diff.get(&cid) {
                        e.children = build_ooxml_run_replacement(new_text);
                        out.push(Node::Element(e));
                    }
                } else {
                    let kids = std::mem::take(&mut e.children);
                    e.children = apply_ooxml_children(kids, diff, next_id);
                    out.push(Node::Element(e));
                }
            },
        }
    }
    out
}

/// Finds `root`'s opening-tag byte span (start through the unquoted `>` that
/// closes it) and its matching `</tag>` closing span in `source`, so the
/// root's exact original bytes - including its `xmlns*` declarations, which
/// [`Element::parse`] does not retain as ordinary attributes - can be
/// preserved verbatim around freshly serialized children.
fn locate_root_tag<'a>(source: &'a [u8], tag: &str) -> Result<(&'a [u8], &'a [u8], &'a [u8])> {
    let mut i = 0usize;
    let open_start = loop {
        match source[i..].iter().position(|&b| b == b'<') {
            Some(offset) => {
                let pos = i + offset;
                let next = source.get(pos + 1).copied().unwrap_or(0);
                if next == b'?' || next == b'!' {
                    i = pos + 1;
                    continue;
                }
                break pos;
            },
            None => return Err(Error::NotXml("no root start tag found".to_string())),
        }
    };

    let mut in_quotes: Option<u8> = None;
    let mut open_end = None;
    let mut j = open_start;
    while j < source.len() {
        let b = source[j];
        match in_quotes {
            Some(q) if b == q => in_quotes = None,
            Some(_) => {},
            None => match b {
                b'"' | b'\'' => in_quotes = Some(b),
                b'>' => {
                    open_end = Some(j + 1);
                    break;
                },
                _ => {},
            },
        }
        j += 1;
    }
    let open_end = open_end.ok_or_else(|| Error::NotXml("unterminated root start tag".to_string()))?;
    if source[open_end.saturating_sub(2)] == b'/' {
        return Err(Error::NotXml("root element is self-closing, nothing to back-translate".to_string()));
    }

    let closing = format!("</{tag}>");
    let closing_start = find_subsequence(&source[open_end..], closing.as_bytes())
        .map(|rel| open_end + rel)
        .ok_or_else(|| Error::NotXml("no matching root end tag found".to_string()))?;
    let closing_end = closing_start + closing.len();

    Ok((&source[..open_end], &source[closing_start..closing_end], &source[closing_end..]))
}

fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).rposition(|w| w == needle)
}

/// Applies `diff` (`cid -> new text`) to `source`'s root element, returning
/// the fully re-serialized bytes. `is_ooxml` selects the ODF text-run
/// grouping or the OOXML `w:r` grouping.
pub fn apply_diff(source: &[u8], diff: &HashMap<u32, String>, is_ooxml: bool) -> Result<Vec<u8>> {
    let root = Element::parse(source)?;
    let (prefix, closing_tag, suffix) = locate_root_tag(source, &root.tag)?;

    let mut root = root;
    let children = std::mem::take(&mut root.children);
    let mut next_id = 0u32;
    root.children = if is_ooxml {
        apply_ooxml_children(children, diff, &mut next_id)
    } else {
        apply_odf_children(children, diff, &mut next_id)
    };

    let mut body = String::new();
    for child in &root.children {
        match child {
            Node::Text(t) => body.push_str(t),
            Node::Element(e) => e.write_xml(&mut body),
        }
    }

    let mut out = Vec::with_capacity(prefix.len() + body.len() + closing_tag.len() + suffix.len());
    out.extend_from_slice(prefix);
    out.extend_from_slice(body.as_bytes());
    out.extend_from_slice(closing_tag);
    out.extend_from_slice(suffix);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn odf_diff_rewrites_targeted_run_and_deletes_run_missing_from_diff() {
        let xml = br#"<?xml version="1.0" encoding="UTF-8"?>
<office:document-content xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0" xmlns:text="urn:oasis:names:tc:opendocument:xmlns:text:1.0">
<office:body><office:text><text:p>first</text:p><text:p>second</text:p></office:text></office:body>
</office:document-content>"#;
        let mut diff = HashMap::new();
        diff.insert(0u32, "changed".to_string());

        let out = apply_diff(xml, &diff, false).unwrap();
        let out_str = String::from_utf8(out).unwrap();
        assert!(out_str.contains("<text:p>changed</text:p>"));
        assert!(out_str.contains("<text:p></text:p>"));
        assert!(!out_str.contains("second"));
        assert!(out_str.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    }

    #[test]
    fn odf_diff_preserves_run_whose_id_is_present_unchanged() {
        let xml = br#"<office:document-content xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0" xmlns:text="urn:oasis:names:tc:opendocument:xmlns:text:1.0"><office:body><office:text><text:p>kept</text:p></office:text></office:body></office:document-content>"#;
        let mut diff = HashMap::new();
        diff.insert(0u32, "kept".to_string());

        let out = apply_diff(xml, &diff, false).unwrap();
        let out_str = String::from_utf8(out).unwrap();
        assert!(out_str.contains("<text:p>kept</text:p>"));
    }

    #[test]
    fn ooxml_diff_splits_run_on_embedded_tab() {
        let xml = br#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r><w:t>old</w:t></w:r></w:p></w:body></w:document>"#;
        let mut diff = HashMap::new();
        diff.insert(0u32, "hello\t world".to_string());

        let out = apply_diff(xml, &diff, true).unwrap();
        let out_str = String::from_utf8(out).unwrap();
        assert!(out_str.contains(r#"<w:t xml:space="preserve">hello</w:t>"#));
        assert!(out_str.contains("<w:tab/>"));
        assert!(out_str.contains(r#"<w:t xml:space="preserve"> world</w:t>"#));
    }

    #[test]
    fn ooxml_run_missing_from_diff_is_dropped_but_paragraph_survives() {
        let xml = br#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r><w:t>kept</w:t></w:r><w:r><w:t>dropped</w:t></w:r></w:p></w:body></w:document>"#;
        let mut diff = HashMap::new();
        diff.insert(0u32, "kept".to_string());

        let out = apply_diff(xml, &diff, true).unwrap();
        let out_str = String::from_utf8(out).unwrap();
        assert!(out_str.contains("kept"));
        assert!(!out_str.contains("dropped"));
        assert!(out_str.contains("<w:p>"));
    }

    #[test]
    fn empty_diff_deletes_every_run_but_preserves_structure() {
        let xml = br#"<office:document-content xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0" xmlns:text="urn:oasis:names:tc:opendocument:xmlns:text:1.0"><office:body><office:text><text:p>gone</text:p></office:text></office:body></office:document-content>"#;
        let diff = HashMap::new();
        let out = apply_diff(xml, &diff, false).unwrap();
        let out_str = String::from_utf8(out).unwrap();
        assert!(out_str.contains("<text:p></text:p>"));
        assert!(!out_str.contains("gone"));
    }

    #[test]
    fn non_leaf_structure_survives_regardless_of_diff_contents() {
        let xml = br#"<office:document-content xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0" xmlns:text="urn:oasis:names:tc:opendocument:xmlns:text:1.0"><office:body><office:text><text:p>a</text:p><text:p>b</text:p></office:text></office:body></office:document-content>"#;
        let diff = HashMap::new();
        let out = apply_diff(xml, &diff, false).unwrap();
        let out_str = String::from_utf8(out).unwrap();
        assert_eq!(out_str.matches("<text:p>").count(), 2);
    }
}
