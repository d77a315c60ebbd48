//! Document element graph (L7): an arena of typed element records, indexed
//! by [`ElementId`], replacing `Rc`/`Weak` parent/child/sibling ownership
//! with plain indices (cyclic ownership between a parent and its children
//! is otherwise unrepresentable without reference counting or unsafe code).

use crate::xml::Element as XmlElement;

/// Index into an [`ElementGraph`]'s arena. Stable for the graph's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(u32);

/// The tagged-variant element set the element graph is built from.
#[derive(Debug, Clone)]
pub enum ElementKind {
    Root,
    Slide,
    Sheet,
    Paragraph { style_name: Option<String> },
    Span { style_name: Option<String> },
    /// Aggregates consecutive inline text content: plain runs, `text:s`
    /// (expanded to N spaces), and `text:tab` (expanded to `\t`).
    Text { content: String },
    LineBreak,
    PageBreak,
    Link { href: Option<String> },
    Bookmark { name: Option<String> },
    List,
    ListItem,
    Table { style_name: Option<String> },
    TableColumn { repeat: u32, style_name: Option<String> },
    TableRow { repeat: u32, style_name: Option<String> },
    TableCell {
        col_span: u32,
        row_span: u32,
        repeat: u32,
        covered: bool,
        value_type: Option<String>,
        table_cell_style: Option<String>,
    },
    Frame { style_name: Option<String> },
    Image { href: Option<String> },
    Rect { style_name: Option<String> },
    Line { style_name: Option<String> },
    Circle { style_name: Option<String> },
    CustomShape { style_name: Option<String> },
}

impl ElementKind {
    /// The explicit style name attached to this element, if its variant
    /// carries one (style resolution's root-to-element fold-left walks these).
    pub fn style_name(&self) -> Option<&str> {
        match self {
            ElementKind::Paragraph { style_name }
            | ElementKind::Span { style_name }
            | ElementKind::Table { style_name }
            | ElementKind::TableColumn { style_name, .. }
            | ElementKind::TableRow { style_name, .. }
            | ElementKind::Frame { style_name }
            | ElementKind::Rect { style_name }
            | ElementKind::Line { style_name }
            | ElementKind::Circle { style_name }
            | ElementKind::CustomShape { style_name } => style_name.as_deref(),
            ElementKind::TableCell { table_cell_style, .. } => table_cell_style.as_deref(),
            _ => None,
        }
    }
}

struct Node {
    kind: ElementKind,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
}

/// Arena owning every element of one document. Cursors borrow this and
/// carry an [`ElementId`]; the document's lifetime encloses all cursors,
/// enforced by the borrow checker.
#[derive(Default)]
pub struct ElementGraph {
    nodes: Vec<Node>,
}

impl ElementGraph {
    fn alloc(&mut self, kind: ElementKind, parent: Option<ElementId>) -> ElementId {
        let id = ElementId(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind,
            parent,
            children: Vec::new(),
        });
        if let Some(parent) = parent {
            self.nodes[parent.0 as usize].children.push(id);
        }
        id
    }

    fn node(&self, id: ElementId) -> &Node {
        &self.nodes[id.0 as usize]
    }

    pub fn kind(&self, id: ElementId) -> &ElementKind {
        &self.node(id).kind
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.node(id).parent
    }

    pub fn children(&self, id: ElementId) -> &[ElementId] {
        &self.node(id).children
    }

    pub fn first_child(&self, id: ElementId) -> Option<ElementId> {
        self.node(id).children.first().copied()
    }

    pub fn previous_sibling(&self, id: ElementId) -> Option<ElementId> {
        let parent = self.parent(id)?;
        let siblings = self.children(parent);
        let pos = siblings.iter().position(|&s| s == id)?;
        pos.checked_sub(1).map(|i| siblings[i])
    }

    pub fn next_sibling(&self, id: ElementId) -> Option<ElementId> {
        let parent = self.parent(id)?;
        let siblings = self.children(parent);
        let pos = siblings.iter().position(|&s| s == id)?;
        siblings.get(pos + 1).copied()
    }

    /// Replaces a `Text` node's content in place, exercised by OOXML `w:t`
    /// back-translation. No-op on any other kind.
    pub fn set_text_content(&mut self, id: ElementId, content: impl Into<String>) {
        if let ElementKind::Text { content: c } = &mut self.nodes[id.0 as usize].kind {
            *c = content.into();
        }
    }

    /// Builds the graph for one content root (an `office:text` /
    /// `office:presentation` / `office:spreadsheet` body, or one
    /// `draw:page` / `table:table` entry), returning the new root's id.
    pub fn build_odf(source: &XmlElement) -> (ElementGraph, ElementId) {
        let mut graph = ElementGraph::default();
        let ctx = BuildCtx {
            direct_table_is_sheet: source.local_name() == "spreadsheet",
        };
        let root = graph.alloc(ElementKind::Root, None);
        build_children(source, root, &mut graph, &ctx);
        (graph, root)
    }
}

struct BuildCtx {
    direct_table_is_sheet: bool,
}

/// Walks `source`'s children in document order, merging consecutive
/// inline text (`Node::Text`, `text:s`, `text:tab`) into one `Text`
/// element and dispatching every other child element through
/// [`dispatch_element`].
fn build_children(source: &XmlElement, parent: ElementId, graph: &mut ElementGraph, ctx: &BuildCtx) {
    let mut pending = String::new();

    for child in &source.children {
        match child {
            crate::xml::Node::Text(t) => pending.push_str(t),
            crate::xml::Node::Element(el) => match el.local_name() {
                "s" if el.tag.starts_with("text:") => {
                    let count: usize = el.attr("text:c").and_then(|v| v.parse().ok()).unwrap_or(1);
                    pending.extend(std::iter::repeat(' ').take(count.max(1)));
                },
                "tab" if el.tag.starts_with("text:") => pending.push('\t'),
                "line-break" if el.tag.starts_with("text:") => {
                    flush_text(&mut pending, parent, graph);
                    graph.alloc(ElementKind::LineBreak, Some(parent));
                },
                _ => {
                    flush_text(&mut pending, parent, graph);
                    dispatch_element(el, parent, graph, ctx);
                },
            },
        }
    }

    flush_text(&mut pending, parent, graph);
}

fn flush_text(pending: &mut String, parent: ElementId, graph: &mut ElementGraph) {
    if !pending.is_empty() {
        graph.alloc(
            ElementKind::Text {
                content: std::mem::take(pending),
            },
            Some(parent),
        );
    }
}

fn attr_u32(el: &XmlElement, local: &str, default: u32) -> u32 {
    el.attrs()
        .find(|(name, _)| name.rsplit(':').next() == Some(local))
        .and_then(|(_, v)| v.parse::<u32>().ok())
        .unwrap_or(default)
}

/// Central tag -> variant dispatch table. Unknown elements in
/// a known parent and `draw:g` both flatten: rather than allocate a
/// transparent `Group` node and special-case it on every traversal, this
/// builder recurses straight into the unknown/group element's children
/// under the *current* parent, so no Group node is ever materialized and
/// normal sibling/child navigation sees only real content.
fn dispatch_element(el: &XmlElement, parent: ElementId, graph: &mut ElementGraph, ctx: &BuildCtx) {
    match el.local_name() {
        "g" if el.tag.starts_with("draw:") => build_children(el, parent, graph, ctx),

        // `text:table-of-content` transparently promotes its `text:index-body`
        // child: recurse into the body's children directly under `parent`,
        // dropping both wrapper layers.
        "table-of-content" if el.tag.starts_with("text:") => {
            if let Some(body) = el.first_child_element("text:index-body") {
                build_children(body, parent, graph, ctx);
            }
        },

        "p" => {
            let id = graph.alloc(
                ElementKind::Paragraph {
                    style_name: el.attr("text:style-name").map(str::to_string),
                },
                Some(parent),
            );
            build_children(el, id, graph, ctx);
        },
        "span" => {
            let id = graph.alloc(
                ElementKind::Span {
                    style_name: el.attr("text:style-name").map(str::to_string),
                },
                Some(parent),
            );
            build_children(el, id, graph, ctx);
        },
        "a" if el.tag.starts_with("text:") => {
            let id = graph.alloc(
                ElementKind::Link {
                    href: el.attr("xlink:href").map(str::to_string),
                },
                Some(parent),
            );
            build_children(el, id, graph, ctx);
        },
        "bookmark" | "bookmark-start" => {
            graph.alloc(
                ElementKind::Bookmark {
                    name: el.attr("text:name").map(str::to_string),
                },
                Some(parent),
            );
        },
        "list" => {
            let id = graph.alloc(ElementKind::List, Some(parent));
            build_children(el, id, graph, ctx);
        },
        "list-item" => {
            let id = graph.alloc(ElementKind::ListItem, Some(parent));
            build_children(el, id, graph, ctx);
        },
        "table" => {
            let kind = if ctx.direct_table_is_sheet {
                ElementKind::Sheet
            } else {
                ElementKind::Table {
                    style_name: el.attr("table:style-name").map(str::to_string),
                }
            };
            let id = graph.alloc(kind, Some(parent));
            let inner_ctx = BuildCtx {
                direct_table_is_sheet: false,
            };
            build_children(el, id, graph, &inner_ctx);
        },
        "table-column" => {
            graph.alloc(
                ElementKind::TableColumn {
                    repeat: attr_u32(el, "number-columns-repeated", 1),
                    style_name: el.attr("table:style-name").map(str::to_string),
                },
                Some(parent),
            );
        },
        "table-row" => {
            let id = graph.alloc(
                ElementKind::TableRow {
                    repeat: attr_u32(el, "number-rows-repeated", 1),
                    style_name: el.attr("table:style-name").map(str::to_string),
                },
                Some(parent),
            );
            build_children(el, id, graph, ctx);
        },
        "table-cell" | "covered-table-cell" => {
            let covered = el.local_name() == "covered-table-cell";
            let id = graph.alloc(
                ElementKind::TableCell {
                    col_span: attr_u32(el, "number-columns-spanned", 1),
                    row_span: attr_u32(el, "number-rows-spanned", 1),
                    repeat: attr_u32(el, "number-columns-repeated", 1),
                    covered,
                    value_type: el.attr("office:value-type").map(str::to_string),
                    table_cell_style: el.attr("table:style-name").map(str::to_string),
                },
                Some(parent),
            );
            build_children(el, id, graph, ctx);
        },
        "frame" => {
            let id = graph.alloc(
                ElementKind::Frame {
                    style_name: el.attr("draw:style-name").map(str::to_string),
                },
                Some(parent),
            );
            build_children(el, id, graph, ctx);
        },
        "image" => {
            graph.alloc(
                ElementKind::Image {
                    href: el.attr("xlink:href").map(str::to_string),
                },
                Some(parent),
            );
        },
        "rect" => {
            graph.alloc(
                ElementKind::Rect {
                    style_name: el.attr("draw:style-name").map(str::to_string),
                },
                Some(parent),
            );
        },
        "line" => {
            graph.alloc(
                ElementKind::Line {
                    style_name: el.attr("draw:style-name").map(str::to_string),
                },
                Some(parent),
            );
        },
        "circle" | "ellipse" => {
            graph.alloc(
                ElementKind::Circle {
                    style_name: el.attr("draw:style-name").map(str::to_string),
                },
                Some(parent),
            );
        },
        "custom-shape" => {
            let id = graph.alloc(
                ElementKind::CustomShape {
                    style_name: el.attr("draw:style-name").map(str::to_string),
                },
                Some(parent),
            );
            build_children(el, id, graph, ctx);
        },
        "page" if el.tag.starts_with("draw:") => {
            let id = graph.alloc(ElementKind::Slide, Some(parent));
            build_children(el, id, graph, ctx);
        },
        // Unknown element in a known container: flatten transparently,
        // still visiting its text children.
        _ => build_children(el, parent, graph, ctx),
    }
}

/// Builds a graph for one WordprocessingML body (`w:document`'s `w:body`,
/// or any `w:p`/`w:tbl`-bearing container such as a header/footer part),
/// returning the new root's id.
pub fn build_ooxml(source: &XmlElement) -> (ElementGraph, ElementId) {
    let mut graph = ElementGraph::default();
    let root = graph.alloc(ElementKind::Root, None);
    build_ooxml_children(source, root, &mut graph);
    (graph, root)
}

/// Walks `source`'s children, merging consecutive `w:t` / `w:tab` runs into
/// one `Text` element the same way [`build_children`] does for ODF, and
/// dispatching every other child through [`dispatch_ooxml_element`].
fn build_ooxml_children(source: &XmlElement, parent: ElementId, graph: &mut ElementGraph) {
    let mut pending = String::new();

    for child in &source.children {
        match child {
            crate::xml::Node::Text(_) => {}, // WordprocessingML never carries bare text outside w:t
            crate::xml::Node::Element(el) => match el.local_name() {
                "t" if el.tag.starts_with("w:") => pending.push_str(&el.text_content()),
                "tab" if el.tag.starts_with("w:") => pending.push('\t'),
                "br" if el.tag.starts_with("w:") => {
                    flush_text(&mut pending, parent, graph);
                    let is_page_break = el.attr("w:type") == Some("page");
                    graph.alloc(
                        if is_page_break { ElementKind::PageBreak } else { ElementKind::LineBreak },
                        Some(parent),
                    );
                },
                _ => {
                    flush_text(&mut pending, parent, graph);
                    dispatch_ooxml_element(el, parent, graph);
                },
            },
        }
    }

    flush_text(&mut pending, parent, graph);
}

fn ooxml_gridspan(tc: &XmlElement) -> u32 {
    tc.first_child_element("w:tcPr")
        .and_then(|p| p.first_child_element("w:gridSpan"))
        .and_then(|e| e.attr("w:val"))
        .and_then(|v| v.parse().ok())
        .unwrap_or(1)
}

/// `w:vMerge` with no `w:val` (or `w:val="continue"`) marks a cell as
/// covered by the rowspan started by the nearest `w:val="restart"` cell
/// above it in the same column (OOXML has no explicit
/// rowspan count, only a continuation marker).
fn ooxml_vmerge_continues(tc: &XmlElement) -> bool {
    tc.first_child_element("w:tcPr")
        .and_then(|p| p.first_child_element("w:vMerge"))
        .is_some_and(|v| v.attr("w:val").is_none_or(|val| val == "continue"))
}

fn ooxml_style_id(el: &XmlElement, props_tag: &str, ref_tag: &str) -> Option<String> {
    el.first_child_element(props_tag)
        .and_then(|p| p.first_child_element(ref_tag))
        .and_then(|e| e.attr("w:val"))
        .map(str::to_string)
}

/// Tag -> variant dispatch table for WordprocessingML, the
/// OOXML counterpart to [`dispatch_element`]'s ODF table.
fn dispatch_ooxml_element(el: &XmlElement, parent: ElementId, graph: &mut ElementGraph) {
    match el.local_name() {
        "p" if el.tag.starts_with("w:") => {
            let id = graph.alloc(
                ElementKind::Paragraph {
                    style_name: ooxml_style_id(el, "w:pPr", "w:pStyle"),
                },
                Some(parent),
            );
            build_ooxml_children(el, id, graph);
        },
        "r" if el.tag.starts_with("w:") => {
            let id = graph.alloc(
                ElementKind::Span {
                    style_name: ooxml_style_id(el, "w:rPr", "w:rStyle"),
                },
                Some(parent),
            );
            build_ooxml_children(el, id, graph);
        },
        "hyperlink" if el.tag.starts_with("w:") => {
            let id = graph.alloc(
                ElementKind::Link {
                    href: el.attr("r:id").map(str::to_string),
                },
                Some(parent),
            );
            build_ooxml_children(el, id, graph);
        },
        "bookmarkStart" if el.tag.starts_with("w:") => {
            graph.alloc(
                ElementKind::Bookmark {
                    name: el.attr("w:name").map(str::to_string),
                },
                Some(parent),
            );
        },
        "tbl" if el.tag.starts_with("w:") => {
            let id = graph.alloc(
                ElementKind::Table {
                    style_name: ooxml_style_id(el, "w:tblPr", "w:tblStyle"),
                },
                Some(parent),
            );
            build_ooxml_children(el, id, graph);
        },
        "tr" if el.tag.starts_with("w:") => {
            let id = graph.alloc(
                ElementKind::TableRow {
                    repeat: 1,
                    style_name: None,
                },
                Some(parent),
            );
            build_ooxml_children(el, id, graph);
        },
        "tc" if el.tag.starts_with("w:") => {
            let id = graph.alloc(
                ElementKind::TableCell {
                    col_span: ooxml_gridspan(el),
                    row_span: 1,
                    repeat: 1,
                    covered: ooxml_vmerge_continues(el),
                    value_type: None,
                    table_cell_style: None,
                },
                Some(parent),
            );
            build_ooxml_children(el, id, graph);
        },
        "drawing" if el.tag.starts_with("w:") => {
            let id = graph.alloc(ElementKind::Frame { style_name: None }, Some(parent));
            build_ooxml_children(el, id, graph);
        },
        // Structured document tags and other transparent wrappers flatten
        // into their parent, same discipline as `draw:g` in the ODF table.
        "sdt" if el.tag.starts_with("w:") => {
            if let Some(content) = el.first_child_element("w:sdtContent") {
                build_ooxml_children(content, parent, graph);
            }
        },
        _ => build_ooxml_children(el, parent, graph),
    }
}

/// Lazy, `O(depth)` navigation cursor over an [`ElementGraph`]: holds an
/// `ElementId` plus a borrow of the arena.
pub struct Cursor<'a> {
    graph: &'a ElementGraph,
    stack: Vec<ElementId>,
}

impl<'a> Cursor<'a> {
    pub fn at(graph: &'a ElementGraph, root: ElementId) -> Self {
        Self {
            graph,
            stack: vec![root],
        }
    }

    pub fn current(&self) -> ElementId {
        *self.stack.last().expect("cursor stack never empty")
    }

    pub fn kind(&self) -> &ElementKind {
        self.graph.kind(self.current())
    }

    /// Descends to the current element's first child, if any, pushing it
    /// onto the cursor stack.
    pub fn push_child(&mut self) -> bool {
        match self.graph.first_child(self.current()) {
            Some(child) => {
                self.stack.push(child);
                true
            },
            None => false,
        }
    }

    /// Ascends back to the parent, popping the current element off the
    /// stack. No-op (returns `false`) at the root.
    pub fn pop(&mut self) -> bool {
        if self.stack.len() <= 1 {
            return false;
        }
        self.stack.pop();
        true
    }

    /// Moves to the current element's next sibling in place.
    pub fn push_next(&mut self) -> bool {
        let current = self.current();
        match self.graph.next_sibling(current) {
            Some(next) => {
                *self.stack.last_mut().unwrap() = next;
                true
            },
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::Element as XmlElement;

    #[test]
    fn aggregates_text_and_expands_s_and_tab() {
        let xml = br#"<text:p xmlns:text="urn:oasis:names:tc:opendocument:xmlns:text:1.0">hello<text:s text:c="2"/>world<text:tab/>end</text:p>"#;
        let root = XmlElement::parse(xml).unwrap();
        let (graph, root_id) = ElementGraph::build_odf(&root);
        let children = graph.children(root_id);
        assert_eq!(children.len(), 1);
        match graph.kind(children[0]) {
            ElementKind::Text { content } => assert_eq!(content, "hello  world\tend"),
            other => panic!("expected Text, got {other:?}"),
        }
    }

    #[test]
    fn unknown_element_flattens_transparently() {
        let xml = br#"<office:text xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0" xmlns:text="urn:oasis:names:tc:opendocument:xmlns:text:1.0">
            <office:weirdwrapper><text:p>inside</text:p></office:weirdwrapper>
        </office:text>"#;
        let root = XmlElement::parse(xml).unwrap();
        let (graph, root_id) = ElementGraph::build_odf(&root);
        let children = graph.children(root_id);
        assert_eq!(children.len(), 1);
        assert!(matches!(graph.kind(children[0]), ElementKind::Paragraph { .. }));
    }

    #[test]
    fn draw_g_flattens_to_children() {
        let xml = br#"<draw:frame xmlns:draw="urn:oasis:names:tc:opendocument:xmlns:drawing:1.0">
            <draw:g><draw:rect/><draw:line/></draw:g>
        </draw:frame>"#;
        let root = XmlElement::parse(xml).unwrap();
        let (graph, root_id) = ElementGraph::build_odf(&root);
        let frame_children = graph.children(root_id);
        assert_eq!(frame_children.len(), 1);
        let frame = frame_children[0];
        let shapes = graph.children(frame);
        assert_eq!(shapes.len(), 2);
        assert!(matches!(graph.kind(shapes[0]), ElementKind::Rect { .. }));
        assert!(matches!(graph.kind(shapes[1]), ElementKind::Line { .. }));
    }

    #[test]
    fn cursor_navigates_siblings_and_parent() {
        let xml = br#"<office:text xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0" xmlns:text="urn:oasis:names:tc:opendocument:xmlns:text:1.0">
            <text:p>first</text:p><text:p>second</text:p>
        </office:text>"#;
        let root = XmlElement::parse(xml).unwrap();
        let (graph, root_id) = ElementGraph::build_odf(&root);
        let mut cursor = Cursor::at(&graph, root_id);
        assert!(cursor.push_child());
        assert!(matches!(cursor.kind(), ElementKind::Paragraph { .. }));
        let first = cursor.current();
        assert!(cursor.push_next());
        let second = cursor.current();
        assert_ne!(first, second);
        assert!(!cursor.push_next());
        assert!(cursor.pop());
        assert_eq!(cursor.current(), root_id);
    }

    #[test]
    fn set_text_content_rewrites_text_node() {
        let xml = br#"<text:p xmlns:text="urn:oasis:names:tc:opendocument:xmlns:text:1.0">old</text:p>"#;
        let root = XmlElement::parse(xml).unwrap();
        let (mut graph, root_id) = ElementGraph::build_odf(&root);
        let text_id = graph.children(root_id)[0];
        graph.set_text_content(text_id, "new");
        match graph.kind(text_id) {
            ElementKind::Text { content } => assert_eq!(content, "new"),
            other => panic!("expected Text, got {other:?}"),
        }
    }

    #[test]
    fn ooxml_run_aggregates_t_and_tab() {
        let xml = br#"<w:p xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
            <w:r><w:t>hello</w:t><w:tab/><w:t xml:space="preserve"> world</w:t></w:r>
        </w:p>"#;
        let root = XmlElement::parse(xml).unwrap();
        let (graph, root_id) = build_ooxml(&root);
        let paragraph = graph.children(root_id)[0];
        assert!(matches!(graph.kind(paragraph), ElementKind::Paragraph { .. }));
        let run = graph.children(paragraph)[0];
        assert!(matches!(graph.kind(run), ElementKind::Span { .. }));
        let text = graph.children(run)[0];
        match graph.kind(text) {
            ElementKind::Text { content } => assert_eq!(content, "hello\t world"),
            other => panic!("expected Text, got {other:?}"),
        }
    }

    #[test]
    fn ooxml_table_cell_reports_gridspan_and_vmerge() {
        let xml = br#"<w:tbl xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
            <w:tr>
                <w:tc><w:tcPr><w:gridSpan w:val="2"/><w:vMerge w:val="restart"/></w:tcPr></w:tc>
                <w:tc><w:tcPr><w:vMerge/></w:tcPr></w:tc>
            </w:tr>
        </w:tbl>"#;
        let root = XmlElement::parse(xml).unwrap();
        let (graph, root_id) = build_ooxml(&root);
        let table = graph.children(root_id)[0];
        let row = graph.children(table)[0];
        let cells = graph.children(row);
        match graph.kind(cells[0]) {
            ElementKind::TableCell { col_span, covered, .. } => {
                assert_eq!(*col_span, 2);
                assert!(!covered);
            },
            other => panic!("expected TableCell, got {other:?}"),
        }
        match graph.kind(cells[1]) {
            ElementKind::TableCell { covered, .. } => assert!(*covered),
            other => panic!("expected TableCell, got {other:?}"),
        }
    }

    #[test]
    fn ooxml_sdt_flattens_to_content() {
        let xml = br#"<w:body xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
            <w:sdt><w:sdtContent><w:p/></w:sdtContent></w:sdt>
        </w:body>"#;
        let root = XmlElement::parse(xml).unwrap();
        let (graph, root_id) = build_ooxml(&root);
        let children = graph.children(root_id);
        assert_eq!(children.len(), 1);
        assert!(matches!(graph.kind(children[0]), ElementKind::Paragraph { .. }));
    }
}
