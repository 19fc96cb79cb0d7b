use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

// Re-export the raw attribute type from the tokenizer so the rest of the
// codebase works with a single definition.
pub use crate::parser::tokenizer::RawAttr;

/// Handle to a node in the [`Ast`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Abstract syntax tree for one template.
///
/// Nodes live in a flat arena and reference each other by [`NodeId`]; the
/// owning direction is parent to `children`, the `parent` field is a plain
/// back-reference. This keeps the tree serializable and free of ownership
/// cycles.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Ast {
    nodes: Vec<AstNode>,
    pub root: Option<NodeId>,
}

impl Ast {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: AstNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    pub fn get(&self, id: NodeId) -> &AstNode {
        &self.nodes[id.0]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut AstNode {
        &mut self.nodes[id.0]
    }

    /// Element accessor for ids that are elements by construction
    /// (stack entries, `if_conditions` blocks).
    pub fn element(&self, id: NodeId) -> &Element {
        match &self.nodes[id.0] {
            AstNode::Element(el) => el,
            other => panic!("node {:?} is not an element: {:?}", id, other),
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> &mut Element {
        match &mut self.nodes[id.0] {
            AstNode::Element(el) => el,
            other => panic!("node {:?} is not an element: {:?}", id, other),
        }
    }

    pub fn nodes(&self) -> impl Iterator<Item = &AstNode> {
        self.nodes.iter()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AstNode {
    Element(Element),
    Text(Text),
    Comment(Comment),
}

/// Element node with directive-derived facets.
///
/// `attrs_list`/`attrs_map` hold the raw attributes as written; structural
/// attributes (`v-for`, `v-if`, `key`, ...) are removed from the list as they
/// are extracted, while the map always keeps every name for later lookups.
/// `attrs` and `dynamic_attrs` hold the processed bindings the generator
/// consumes: literal values arrive JSON-quoted, bound values verbatim.
#[derive(Debug, Clone, Serialize)]
pub struct Element {
    pub tag: String,
    pub attrs_list: Vec<RawAttr>,
    pub attrs_map: HashMap<String, String>,
    /// Source range per attribute name, kept even after the attribute is
    /// extracted from `attrs_list` so late diagnostics can still point at it.
    #[serde(skip)]
    pub attr_ranges: HashMap<String, (usize, usize)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub plain: bool,
    pub has_bindings: bool,
    pub processed: bool,
    pub forbidden: bool,
    pub is_static: bool,
    pub static_root: bool,
    pub static_in_for: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub for_clause: Option<ForClause>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub if_expr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elseif_expr: Option<String>,
    pub is_else: bool,
    pub if_conditions: Vec<IfCondition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ref_expr: Option<String>,
    pub ref_in_for: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slot_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slot_target: Option<String>,
    pub attrs: Vec<Attr>,
    pub dynamic_attrs: Vec<Attr>,
    pub events: Vec<EventHandler>,
    pub directives: Vec<Directive>,
    pub start: usize,
    pub end: usize,
}

impl Element {
    pub fn new(tag: impl Into<String>, attrs_list: Vec<RawAttr>, parent: Option<NodeId>) -> Self {
        let mut attrs_map = HashMap::new();
        let mut attr_ranges = HashMap::new();
        for attr in &attrs_list {
            attrs_map.insert(attr.name.clone(), attr.value.clone());
            attr_ranges.insert(attr.name.clone(), (attr.start, attr.end));
        }
        Self {
            tag: tag.into(),
            attrs_list,
            attrs_map,
            attr_ranges,
            parent,
            children: Vec::new(),
            plain: false,
            has_bindings: false,
            processed: false,
            forbidden: false,
            is_static: false,
            static_root: false,
            static_in_for: false,
            for_clause: None,
            if_expr: None,
            elseif_expr: None,
            is_else: false,
            if_conditions: Vec::new(),
            key: None,
            ref_expr: None,
            ref_in_for: false,
            slot_name: None,
            slot_target: None,
            attrs: Vec::new(),
            dynamic_attrs: Vec::new(),
            events: Vec::new(),
            directives: Vec::new(),
            start: 0,
            end: 0,
        }
    }

    /// Look up an attribute by name and remove it from `attrs_list` so later
    /// processing skips it. The map keeps the entry unless `remove_from_map`
    /// is set, because codegen still consults the map.
    pub fn get_and_remove_attr(&mut self, name: &str, remove_from_map: bool) -> Option<String> {
        let value = self.attrs_map.get(name).cloned();
        if value.is_some() {
            if let Some(pos) = self.attrs_list.iter().position(|a| a.name == name) {
                self.attrs_list.remove(pos);
            }
        }
        if remove_from_map {
            self.attrs_map.remove(name);
        }
        value
    }

    /// Resolve `:name`/`v-bind:name` to the bound expression, falling back to
    /// the static attribute JSON-quoted. The result is codegen-ready.
    pub fn get_binding_attr(&mut self, name: &str, get_static: bool) -> Option<String> {
        let dynamic_value = self
            .get_and_remove_attr(&format!(":{}", name), false)
            .or_else(|| self.get_and_remove_attr(&format!("v-bind:{}", name), false));
        if let Some(value) = dynamic_value {
            return Some(value);
        }
        if get_static {
            if let Some(value) = self.get_and_remove_attr(name, false) {
                return serde_json::to_string(&value).ok();
            }
        }
        None
    }

    /// Source range of the raw attribute binding `:name`, `v-bind:name` or
    /// plain `name`, for diagnostics. Survives attribute extraction.
    pub fn raw_attr_range(&self, name: &str) -> Option<(usize, usize)> {
        self.attr_ranges
            .get(&format!(":{}", name))
            .or_else(|| self.attr_ranges.get(&format!("v-bind:{}", name)))
            .or_else(|| self.attr_ranges.get(name))
            .copied()
    }

    pub fn add_attr(&mut self, name: impl Into<String>, value: impl Into<String>, dynamic: bool) {
        let attr = Attr { name: name.into(), value: value.into(), dynamic };
        if dynamic {
            self.dynamic_attrs.push(attr);
        } else {
            self.attrs.push(attr);
        }
        self.plain = false;
    }

    pub fn add_handler(&mut self, handler: EventHandler) {
        self.events.push(handler);
        self.plain = false;
    }

    pub fn add_directive(&mut self, directive: Directive) {
        self.directives.push(directive);
        self.plain = false;
    }
}

/// Decomposed loop expression: `v-for="(item, key, index) in source"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForClause {
    pub exp: String,
    pub alias: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iterator1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iterator2: Option<String>,
}

/// One branch of a conditional chain. The list lives on the anchor element
/// (the branch carrying `v-if`), whose own entry references itself; `exp` is
/// `None` for the final `v-else` arm.
#[derive(Debug, Clone, Serialize)]
pub struct IfCondition {
    pub exp: Option<String>,
    pub block: NodeId,
}

/// Processed binding fragment consumed by the generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attr {
    pub name: String,
    pub value: String,
    pub dynamic: bool,
}

/// Event listener entry. Modifiers are recorded verbatim and never
/// interpreted by the compiler.
#[derive(Debug, Clone, Serialize)]
pub struct EventHandler {
    pub name: String,
    pub value: String,
    pub dynamic: bool,
    pub modifiers: BTreeSet<String>,
    pub start: usize,
    pub end: usize,
}

/// Generic directive binding: `v-name:arg.mod1.mod2="value"`.
#[derive(Debug, Clone, Serialize)]
pub struct Directive {
    pub name: String,
    pub raw_name: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arg: Option<String>,
    pub is_dynamic_arg: bool,
    pub modifiers: BTreeSet<String>,
    pub start: usize,
    pub end: usize,
}

/// Text node. `expression` is present when the content carries `{{ }}`
/// interpolation; plain literal text leaves it empty.
#[derive(Debug, Clone, Serialize)]
pub struct Text {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression: Option<ParsedText>,
    pub is_static: bool,
    pub start: usize,
    pub end: usize,
}

/// Parsed interpolation: the spliceable expression plus the raw interleaving
/// of literal and binding segments for tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedText {
    pub expression: String,
    pub tokens: Vec<TextToken>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TextToken {
    Literal(String),
    Binding { binding: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct Comment {
    pub content: String,
    pub start: usize,
    pub end: usize,
}

/// `some-attr` to `someAttr`. A hyphen only camelizes when followed by a
/// character that can start an identifier segment.
pub(crate) fn camelize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut chars = name.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '-' {
            match chars.peek() {
                Some(&next) if next.is_ascii_alphanumeric() || next == '_' => {
                    chars.next();
                    out.push(next.to_ascii_uppercase());
                }
                _ => out.push('-'),
            }
        } else {
            out.push(c);
        }
    }
    out
}
