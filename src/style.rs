//! Style registry & resolution (L6): walks `styles.xml` plus
//! `<office:automatic-styles>` into a name-keyed registry, then resolves a
//! style's parent chain (cycle-safe) into a flat, semantically-named
//! property bag.

use std::collections::{HashMap, HashSet};

use crate::common::unit::{EMUS_PER_PT, EMUS_PER_TWIP};
use crate::common::{Length, RGBColor, VerticalPosition};
use crate::xml::Element;

/// The style families this registry recognizes. ODF keys off `style:family`;
/// OOXML doesn't have an equivalent attribute, so OOXML styles are always
/// registered under the family implied by their `w:type` (`Paragraph`,
/// `Text` for `character`, `Table`, or the [`StyleFamily::TableCell`] used
/// for table-style conditional formats, parsed but not further split out).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleFamily {
    Paragraph,
    Text,
    Table,
    TableColumn,
    TableRow,
    TableCell,
    Graphic,
    Section,
    PageLayout,
    DrawingPage,
}

impl StyleFamily {
    fn from_odf_attr(value: &str) -> Option<Self> {
        Some(match value {
            "paragraph" => Self::Paragraph,
            "text" => Self::Text,
            "table" => Self::Table,
            "table-column" => Self::TableColumn,
            "table-row" => Self::TableRow,
            "table-cell" => Self::TableCell,
            "graphic" => Self::Graphic,
            "section" => Self::Section,
            "page-layout" => Self::PageLayout,
            "drawing-page" => Self::DrawingPage,
            _ => return None,
        })
    }

    fn from_ooxml_type(value: &str) -> Option<Self> {
        Some(match value {
            "paragraph" => Self::Paragraph,
            "character" => Self::Text,
            "table" => Self::Table,
            _ => return None,
        })
    }
}

/// Unordered, flat map of semantic property name -> raw string value.
/// Mapping from source-format attribute to semantic name happens once, at
/// parse time; unmapped attributes are dropped silently.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyBag(HashMap<String, String>);

impl PropertyBag {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(|s| s.as_str())
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Overlay `other` on top of `self`: `other`'s keys win.
    fn overlaid_with(mut self, other: &PropertyBag) -> Self {
        for (k, v) in other.0.iter() {
            self.0.insert(k.clone(), v.clone());
        }
        self
    }
}

#[derive(Debug, Clone)]
pub struct Style {
    pub name: String,
    pub family: StyleFamily,
    pub parent: Option<String>,
    pub properties: PropertyBag,
}

/// `style:master-page` -> `style:page-layout-name`.
#[derive(Debug, Clone, Default)]
pub struct MasterPageStyle {
    pub name: String,
    pub page_layout_name: String,
}

/// Name-keyed style registry plus a per-family default bucket
/// (`style:default-style`).
#[derive(Debug, Clone, Default)]
pub struct StyleRegistry {
    styles: HashMap<String, Style>,
    family_defaults: HashMap<StyleFamily, PropertyBag>,
    master_pages: HashMap<String, MasterPageStyle>,
}

/// The fully inherited property bag for one style, after walking its
/// parent chain to a fixed point.
#[derive(Debug, Clone, Default)]
pub struct ResolvedStyle(PropertyBag);

impl ResolvedStyle {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key)
    }
}

// ODF attribute -> semantic key mapping tables, covering every family this
// layer resolves.
const ODF_PARAGRAPH_ATTRS: &[(&str, &str)] = &[
    ("fo:text-align", "text_align"),
    ("fo:margin-top", "margin_top"),
    ("fo:margin-bottom", "margin_bottom"),
    ("fo:margin-left", "margin_left"),
    ("fo:margin-right", "margin_right"),
    ("fo:line-height", "line_height"),
];
const ODF_TEXT_ATTRS: &[(&str, &str)] = &[
    ("fo:font-size", "font_size"),
    ("fo:font-weight", "font_weight"),
    ("fo:font-style", "font_style"),
    ("fo:color", "color"),
    ("style:font-name", "font_name"),
    ("style:text-underline-style", "underline_style"),
    ("style:text-position", "text_position"),
];
const ODF_TABLE_ATTRS: &[(&str, &str)] = &[
    ("style:width", "width"),
    ("table:align", "align"),
];
const ODF_TABLE_COLUMN_ATTRS: &[(&str, &str)] = &[("style:column-width", "width")];
const ODF_TABLE_ROW_ATTRS: &[(&str, &str)] = &[("style:row-height", "height")];
const ODF_TABLE_CELL_ATTRS: &[(&str, &str)] = &[
    ("fo:background-color", "background_color"),
    ("fo:border", "border"),
    ("style:vertical-align", "vertical_align"),
];
const ODF_GRAPHIC_ATTRS: &[(&str, &str)] = &[
    ("svg:x", "x"),
    ("svg:y", "y"),
    ("svg:width", "width"),
    ("svg:height", "height"),
    ("draw:fill-color", "fill_color"),
    ("draw:stroke-color", "stroke_color"),
];

fn map_odf_properties(props: &Element, table: &[(&str, &str)]) -> PropertyBag {
    let mut bag = PropertyBag::default();
    for (attr_name, semantic) in table {
        if let Some(value) = props.attr(attr_name) {
            bag.set(*semantic, value);
        }
    }
    bag
}

impl StyleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Walks `<office:styles>`, `<office:automatic-styles>`, and
    /// `<office:master-styles>` children of `document` (which may be
    /// `styles.xml`'s or `content.xml`'s root), registering every
    /// `style:style`, `style:default-style`, and `style:master-page`.
    pub fn ingest_odf(&mut self, document: &Element) {
        for section in document.element_children() {
            match section.local_name() {
                "styles" | "automatic-styles" => self.ingest_odf_styles_section(section),
                "master-styles" => self.ingest_odf_master_styles(section),
                _ => {},
            }
        }
    }

    fn ingest_odf_styles_section(&mut self, section: &Element) {
        for el in section.element_children() {
            match el.local_name() {
                "style" => {
                    if let Some(style) = self.parse_odf_style(el) {
                        self.styles.insert(style.name.clone(), style);
                    }
                },
                "default-style" => {
                    let Some(family_attr) = el.attr("style:family") else {
                        continue;
                    };
                    let Some(family) = StyleFamily::from_odf_attr(family_attr) else {
                        tracing::warn!(family = family_attr, "unknown ODF default-style family");
                        continue;
                    };
                    let bag = self.collect_odf_property_bags(el, family);
                    self.family_defaults.insert(family, bag);
                },
                _ => {},
            }
        }
    }

    fn ingest_odf_master_styles(&mut self, section: &Element) {
        for el in section.element_children() {
            if el.local_name() != "master-page" {
                continue;
            }
            let Some(name) = el.attr("style:name") else {
                continue;
            };
            let page_layout_name = el.attr("style:page-layout-name").unwrap_or_default();
            self.master_pages.insert(
                name.to_string(),
                MasterPageStyle {
                    name: name.to_string(),
                    page_layout_name: page_layout_name.to_string(),
                },
            );
        }
    }

    fn parse_odf_style(&self, el: &Element) -> Option<Style> {
        let name = el.attr("style:name")?.to_string();
        let family_attr = el.attr("style:family")?;
        let family = match StyleFamily::from_odf_attr(family_attr) {
            Some(f) => f,
            None => {
                tracing::warn!(name, family = family_attr, "unknown ODF style family");
                return None;
            },
        };
        let parent = el.attr("style:parent-style-name").map(|s| s.to_string());
        let properties = self.collect_odf_property_bags(el, family);

        Some(Style {
            name,
            family,
            parent,
            properties,
        })
    }

    fn collect_odf_property_bags(&self, el: &Element, family: StyleFamily) -> PropertyBag {
        let mut bag = PropertyBag::default();
        for props in el.element_children() {
            let table: &[(&str, &str)] = match props.local_name() {
                "paragraph-properties" => ODF_PARAGRAPH_ATTRS,
                "text-properties" => ODF_TEXT_ATTRS,
                "table-properties" => ODF_TABLE_ATTRS,
                "table-column-properties" => ODF_TABLE_COLUMN_ATTRS,
                "table-row-properties" => ODF_TABLE_ROW_ATTRS,
                "table-cell-properties" => ODF_TABLE_CELL_ATTRS,
                "graphic-properties" => ODF_GRAPHIC_ATTRS,
                _ => continue,
            };
            let _ = family;
            bag = bag.overlaid_with(&map_odf_properties(props, table));
        }
        bag
    }

    /// Registers OOXML `w:style` entries from `word/styles.xml`; `w:styleId`
    /// is the registry key.
    pub fn ingest_ooxml(&mut self, styles_root: &Element) {
        for el in styles_root.element_children() {
            if el.local_name() != "style" {
                continue;
            }
            let Some(id) = el.attr("w:styleId") else {
                continue;
            };
            let Some(type_attr) = el.attr("w:type") else {
                continue;
            };
            let Some(family) = StyleFamily::from_ooxml_type(type_attr) else {
                continue;
            };
            let parent = el
                .first_child_element("w:basedOn")
                .and_then(|b| b.attr("w:val"))
                .map(|s| s.to_string());

            let mut properties = PropertyBag::default();
            if let Some(ppr) = el.first_child_element("w:pPr") {
                map_ooxml_paragraph_properties(ppr, &mut properties);
            }
            if let Some(rpr) = el.first_child_element("w:rPr") {
                map_ooxml_text_properties(rpr, &mut properties);
            }

            self.styles.insert(
                id.to_string(),
                Style {
                    name: id.to_string(),
                    family,
                    parent,
                    properties,
                },
            );
        }
    }

    pub fn style(&self, name: &str) -> Option<&Style> {
        self.styles.get(name)
    }

    pub fn master_page(&self, name: &str) -> Option<&MasterPageStyle> {
        self.master_pages.get(name)
    }

    /// Resolves `name`'s full property bag: family default, then the
    /// parent chain root-to-leaf, each overriding the last.
    pub fn resolve(&self, name: &str) -> ResolvedStyle {
        let Some(style) = self.styles.get(name) else {
            return ResolvedStyle::default();
        };

        let mut chain = Vec::new();
        let mut visited = HashSet::new();
        let mut current = Some(style);
        while let Some(s) = current {
            if !visited.insert(s.name.clone()) {
                break; // cycle guard
            }
            chain.push(s);
            current = s.parent.as_deref().and_then(|p| self.styles.get(p));
        }
        chain.reverse(); // root -> leaf

        let mut bag = self
            .family_defaults
            .get(&style.family)
            .cloned()
            .unwrap_or_default();
        for s in chain {
            bag = bag.overlaid_with(&s.properties);
        }

        ResolvedStyle(bag)
    }

    /// Folds a sequence of explicit style names encountered walking an
    /// element's ancestor chain from the document root down to the element
    /// itself, each resolved style overriding the previous.
    pub fn resolve_chain<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> ResolvedStyle {
        let mut bag = PropertyBag::default();
        for name in names {
            bag = bag.overlaid_with(&self.resolve(name).0);
        }
        ResolvedStyle(bag)
    }
}

fn map_ooxml_paragraph_properties(ppr: &Element, out: &mut PropertyBag) {
    if let Some(jc) = ppr.first_child_element("w:jc").and_then(|e| e.attr("w:val")) {
        out.set("text_align", jc);
    }
    if let Some(ind) = ppr.first_child_element("w:ind") {
        if let Some(left) = ind.attr("w:left") {
            out.set("margin_left", left);
        }
        if let Some(right) = ind.attr("w:right") {
            out.set("margin_right", right);
        }
    }
}

fn map_ooxml_text_properties(rpr: &Element, out: &mut PropertyBag) {
    if let Some(sz) = rpr.first_child_element("w:sz").and_then(|e| e.attr("w:val")) {
        out.set("font_size_half_points", sz);
    }
    if let Some(b) = rpr.first_child_element("w:b") {
        let is_off = b.attr("w:val").is_some_and(|v| v == "0" || v == "false");
        out.set("font_weight", if is_off { "normal" } else { "bold" });
    }
    if let Some(i) = rpr.first_child_element("w:i") {
        let is_off = i.attr("w:val").is_some_and(|v| v == "0" || v == "false");
        out.set("font_style", if is_off { "normal" } else { "italic" });
    }
    if let Some(color) = rpr.first_child_element("w:color").and_then(|e| e.attr("w:val")) {
        out.set("color", color);
    }
    if let Some(rfonts) = rpr.first_child_element("w:rFonts").and_then(|e| e.attr("w:ascii")) {
        out.set("font_name", rfonts);
    }
    if rpr.first_child_element("w:vertAlign").and_then(|e| e.attr("w:val")) == Some("superscript") {
        out.set("vertical_position", "superscript");
    } else if rpr.first_child_element("w:vertAlign").and_then(|e| e.attr("w:val")) == Some("subscript")
    {
        out.set("vertical_position", "subscript");
    }
}

/// Parses an ODF length attribute (`"2.54cm"`, `"1in"`, `"12pt"`) into a
/// [`Length`]. Unit suffixes follow the OpenDocument schema; unrecognized
/// suffixes are treated as points (the common default across style props).
fn parse_odf_length(value: &str) -> Option<Length> {
    let value = value.trim();
    if let Some(n) = value.strip_suffix("cm") {
        return n.trim().parse::<f64>().ok().map(Length::from_cm);
    }
    if let Some(n) = value.strip_suffix("in") {
        return n.trim().parse::<f64>().ok().map(Length::from_inches);
    }
    if let Some(n) = value.strip_suffix("mm") {
        return n
            .trim()
            .parse::<f64>()
            .ok()
            .map(|mm| Length::from_cm(mm / 10.0));
    }
    if let Some(n) = value.strip_suffix("pt") {
        return n
            .trim()
            .parse::<f64>()
            .ok()
            .map(|pt| Length::from_emus((pt * EMUS_PER_PT as f64).round() as i64));
    }
    value.parse::<f64>().ok().map(Length::from_inches)
}

/// Converts an OOXML `w:ind`-style twip value (1/1440th inch) to a
/// [`Length`].
fn twips_to_length(value: &str) -> Option<Length> {
    value
        .parse::<i64>()
        .ok()
        .map(|twips| Length::from_emus(twips * EMUS_PER_TWIP))
}

/// Typed view over a [`ResolvedStyle`] for `text:p` / `w:pPr` paragraphs.
#[derive(Debug, Clone, Default)]
pub struct ParagraphStyle {
    pub text_align: Option<String>,
    pub margin_left: Option<Length>,
    pub margin_right: Option<Length>,
    pub margin_top: Option<Length>,
    pub margin_bottom: Option<Length>,
}

impl From<&ResolvedStyle> for ParagraphStyle {
    fn from(r: &ResolvedStyle) -> Self {
        Self {
            text_align: r.get("text_align").map(str::to_string),
            margin_left: r.get("margin_left").and_then(parse_length_either),
            margin_right: r.get("margin_right").and_then(parse_length_either),
            margin_top: r.get("margin_top").and_then(parse_length_either),
            margin_bottom: r.get("margin_bottom").and_then(parse_length_either),
        }
    }
}

/// Typed view for `text:span` / `w:rPr` runs.
#[derive(Debug, Clone, Default)]
pub struct TextStyle {
    pub font_name: Option<String>,
    pub font_size: Option<Length>,
    pub bold: bool,
    pub italic: bool,
    pub color: Option<RGBColor>,
    pub vertical_position: VerticalPosition,
}

impl From<&ResolvedStyle> for TextStyle {
    fn from(r: &ResolvedStyle) -> Self {
        let font_size = r
            .get("font_size")
            .and_then(parse_odf_length)
            .or_else(|| {
                r.get("font_size_half_points")
                    .and_then(|v| v.parse::<f64>().ok())
                    .map(|half_pt| Length::from_emus(((half_pt / 2.0) * EMUS_PER_PT as f64).round() as i64))
            });

        Self {
            font_name: r.get("font_name").map(str::to_string),
            font_size,
            bold: r.get("font_weight") == Some("bold"),
            italic: r.get("font_style") == Some("italic"),
            color: r.get("color").and_then(|c| c.parse::<RGBColor>().ok()),
            vertical_position: match r.get("vertical_position") {
                Some("superscript") => VerticalPosition::Superscript,
                Some("subscript") => VerticalPosition::Subscript,
                Some("text_position") => VerticalPosition::Normal,
                _ => VerticalPosition::Normal,
            },
        }
    }
}

/// Typed view for `table:table` / `w:tblPr`.
#[derive(Debug, Clone, Default)]
pub struct TableStyle {
    pub width: Option<Length>,
    pub align: Option<String>,
}

impl From<&ResolvedStyle> for TableStyle {
    fn from(r: &ResolvedStyle) -> Self {
        Self {
            width: r.get("width").and_then(parse_length_either),
            align: r.get("align").map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TableColumnStyle {
    pub width: Option<Length>,
}

impl From<&ResolvedStyle> for TableColumnStyle {
    fn from(r: &ResolvedStyle) -> Self {
        Self {
            width: r.get("width").and_then(parse_length_either),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TableRowStyle {
    pub height: Option<Length>,
}

impl From<&ResolvedStyle> for TableRowStyle {
    fn from(r: &ResolvedStyle) -> Self {
        Self {
            height: r.get("height").and_then(parse_length_either),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TableCellStyle {
    pub background_color: Option<RGBColor>,
    pub vertical_align: Option<String>,
    pub border: Option<String>,
}

impl From<&ResolvedStyle> for TableCellStyle {
    fn from(r: &ResolvedStyle) -> Self {
        Self {
            background_color: r.get("background_color").and_then(|c| c.parse::<RGBColor>().ok()),
            vertical_align: r.get("vertical_align").map(str::to_string),
            border: r.get("border").map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DrawingStyle {
    pub x: Option<Length>,
    pub y: Option<Length>,
    pub width: Option<Length>,
    pub height: Option<Length>,
    pub fill_color: Option<RGBColor>,
    pub stroke_color: Option<RGBColor>,
}

impl From<&ResolvedStyle> for DrawingStyle {
    fn from(r: &ResolvedStyle) -> Self {
        Self {
            x: r.get("x").and_then(parse_length_either),
            y: r.get("y").and_then(parse_length_either),
            width: r.get("width").and_then(parse_length_either),
            height: r.get("height").and_then(parse_length_either),
            fill_color: r.get("fill_color").and_then(|c| c.parse::<RGBColor>().ok()),
            stroke_color: r.get("stroke_color").and_then(|c| c.parse::<RGBColor>().ok()),
        }
    }
}

/// Parses a length that could be either an ODF unit-suffixed string or a
/// bare OOXML twips integer.
fn parse_length_either(value: &str) -> Option<Length> {
    if value.chars().next().is_some_and(|c| c.is_ascii_digit() || c == '-') && value.parse::<i64>().is_ok() {
        twips_to_length(value)
    } else {
        parse_odf_length(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style(name: &str, family: StyleFamily, parent: Option<&str>, props: &[(&str, &str)]) -> Style {
        let mut bag = PropertyBag::default();
        for (k, v) in props {
            bag.set(*k, *v);
        }
        Style {
            name: name.to_string(),
            family,
            parent: parent.map(str::to_string),
            properties: bag,
        }
    }

    #[test]
    fn resolves_parent_chain_with_child_override() {
        let mut reg = StyleRegistry::new();
        reg.styles.insert(
            "Default".to_string(),
            style("Default", StyleFamily::Paragraph, None, &[("font_size", "10pt")]),
        );
        reg.styles.insert(
            "Heading1".to_string(),
            style(
                "Heading1",
                StyleFamily::Paragraph,
                Some("Default"),
                &[("font_weight", "bold")],
            ),
        );

        let resolved = reg.resolve("Heading1");
        assert_eq!(resolved.get("font_size"), Some("10pt"));
        assert_eq!(resolved.get("font_weight"), Some("bold"));
    }

    #[test]
    fn cyclic_parent_chain_does_not_loop_forever() {
        let mut reg = StyleRegistry::new();
        reg.styles.insert(
            "A".to_string(),
            style("A", StyleFamily::Paragraph, Some("B"), &[("x", "1")]),
        );
        reg.styles.insert(
            "B".to_string(),
            style("B", StyleFamily::Paragraph, Some("A"), &[("y", "2")]),
        );

        let resolved = reg.resolve("A");
        assert!(resolved.get("x").is_some() || resolved.get("y").is_some());
    }

    #[test]
    fn resolution_is_idempotent_under_re_resolving_its_output() {
        let mut reg = StyleRegistry::new();
        reg.styles.insert(
            "Solo".to_string(),
            style("Solo", StyleFamily::Paragraph, None, &[("text_align", "center")]),
        );
        let first = reg.resolve("Solo");
        let second = reg.resolve("Solo");
        assert_eq!(first.get("text_align"), second.get("text_align"));
    }

    #[test]
    fn unknown_style_name_resolves_to_empty_not_fatal() {
        let reg = StyleRegistry::new();
        let resolved = reg.resolve("DoesNotExist");
        assert_eq!(resolved.get("anything"), None);
    }
}
