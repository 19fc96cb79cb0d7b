mod data;

use data::gen_props;

use crate::ast::{camelize, Ast, AstNode, Attr, Element, ForClause, NodeId, Text};
use crate::error::{split_range, Warnings};
use crate::options::Merged;

/// Rendering code produced from one template.
pub struct GeneratedCode {
    /// Body of the render function, a single expression under `with(this)`.
    pub render: String,
    /// Hoisted render functions for static subtrees, referenced from the
    /// main body as `_m(index)`.
    pub static_render_fns: Vec<String>,
}

/// Per-call generator state. Collects hoisted static render functions and
/// keyless-list tips while the tree is walked.
struct CodegenState<'a> {
    opts: &'a Merged,
    warnings: &'a mut Warnings,
    static_render_fns: Vec<String>,
}

/// Facets an enclosing frame has already expanded, so the dispatch in
/// [`CodegenState::gen_element`] moves past them on re-entry.
#[derive(Clone, Copy, Default)]
struct Processed {
    static_root: bool,
    for_loop: bool,
    if_chain: bool,
}

/// Builds the render expression and hoisted static render functions for a
/// parsed, optimized tree.
pub fn generate(ast: &Ast, opts: &Merged, warnings: &mut Warnings) -> GeneratedCode {
    let mut state = CodegenState { opts, warnings, static_render_fns: Vec::new() };
    let code = match ast.root {
        // an inert root renders nothing rather than its raw content
        Some(root) if ast.element(root).tag == "script" => "null".to_string(),
        Some(root) => state.gen_element(ast, root, Processed::default()),
        None => "_c(\"div\")".to_string(),
    };
    GeneratedCode {
        render: format!("with(this){{return {}}}", code),
        static_render_fns: state.static_render_fns,
    }
}

impl<'a> CodegenState<'a> {
    fn maybe_component(&self, el: &Element) -> bool {
        !(self.opts.is_reserved_tag)(&el.tag)
    }

    fn gen_element(&mut self, ast: &Ast, id: NodeId, processed: Processed) -> String {
        let el = ast.element(id);
        if el.static_root && !processed.static_root {
            return self.gen_static(ast, id);
        }
        if let Some(clause) = &el.for_clause {
            if !processed.for_loop {
                return self.gen_for(ast, id, clause, processed);
            }
        }
        if el.if_expr.is_some() && !processed.if_chain {
            return self.gen_if(ast, id, processed);
        }
        if el.tag == "template" && el.slot_target.is_none() {
            return self
                .gen_children(ast, id, false)
                .unwrap_or_else(|| "void 0".to_string());
        }
        if el.tag == "slot" {
            return self.gen_slot(ast, id);
        }
        let data = if el.plain { None } else { Some(self.gen_data(ast, id)) };
        let children = self.gen_children(ast, id, true);
        let mut code = format!("_c('{}'", el.tag);
        if let Some(data) = data {
            code.push(',');
            code.push_str(&data);
        }
        if let Some(children) = children {
            code.push(',');
            code.push_str(&children);
        }
        code.push(')');
        code
    }

    /// Hoists a static subtree into its own render function and leaves an
    /// `_m` reference in its place.
    fn gen_static(&mut self, ast: &Ast, id: NodeId) -> String {
        let rendered =
            self.gen_element(ast, id, Processed { static_root: true, ..Processed::default() });
        self.static_render_fns.push(format!("with(this){{return {}}}", rendered));
        let index = self.static_render_fns.len() - 1;
        if ast.element(id).static_in_for {
            format!("_m({},true)", index)
        } else {
            format!("_m({})", index)
        }
    }

    fn gen_for(
        &mut self,
        ast: &Ast,
        id: NodeId,
        clause: &ForClause,
        processed: Processed,
    ) -> String {
        let el = ast.element(id);
        if self.maybe_component(el)
            && el.tag != "slot"
            && el.tag != "template"
            && el.key.is_none()
        {
            let (start, end) = split_range(el.raw_attr_range("v-for"));
            self.warnings.tip(
                format!(
                    "<{} v-for=\"{} in {}\">: component lists rendered with v-for should \
                     have explicit keys so list patches can reuse elements reliably.",
                    el.tag, clause.alias, clause.exp
                ),
                start,
                end,
            );
        }
        let body = self.gen_element(ast, id, Processed { for_loop: true, ..processed });
        let mut params = clause.alias.clone();
        if let Some(iterator) = &clause.iterator1 {
            params.push(',');
            params.push_str(iterator);
        }
        if let Some(iterator) = &clause.iterator2 {
            params.push(',');
            params.push_str(iterator);
        }
        format!("_l(({}),function({}){{return {}}})", clause.exp, params, body)
    }

    /// Folds a conditional chain into nested ternaries, ending in `_e()`
    /// when no `v-else` branch closes the chain.
    fn gen_if(&mut self, ast: &Ast, id: NodeId, processed: Processed) -> String {
        self.gen_if_conditions(ast, id, 0, processed)
    }

    fn gen_if_conditions(
        &mut self,
        ast: &Ast,
        id: NodeId,
        index: usize,
        processed: Processed,
    ) -> String {
        let condition = match ast.element(id).if_conditions.get(index) {
            Some(condition) => condition,
            None => return "_e()".to_string(),
        };
        // the anchor element is its own first branch; sibling branches start
        // a fresh dispatch so their own v-for still expands
        let block_processed = if condition.block == id {
            Processed { if_chain: true, ..processed }
        } else {
            Processed::default()
        };
        let block = self.gen_element(ast, condition.block, block_processed);
        match &condition.exp {
            Some(exp) => format!(
                "({})?{}:{}",
                exp,
                block,
                self.gen_if_conditions(ast, id, index + 1, processed)
            ),
            None => block,
        }
    }

    fn gen_children(&mut self, ast: &Ast, id: NodeId, check_skip: bool) -> Option<String> {
        let children = &ast.element(id).children;
        if children.is_empty() {
            return None;
        }
        // a lone v-for child skips the array wrapper and normalizes itself
        if children.len() == 1 {
            if let AstNode::Element(child) = ast.get(children[0]) {
                if child.for_clause.is_some() && child.tag != "template" && child.tag != "slot" {
                    let normalization = if check_skip {
                        if self.maybe_component(child) { ",1" } else { ",0" }
                    } else {
                        ""
                    };
                    let code = self.gen_element(ast, children[0], Processed::default());
                    return Some(format!("{}{}", code, normalization));
                }
            }
        }
        let normalization = if check_skip { self.normalization_type(ast, children) } else { 0 };
        let nodes: Vec<String> =
            children.iter().map(|&child| self.gen_node(ast, child)).collect();
        if normalization == 0 {
            Some(format!("[{}]", nodes.join(",")))
        } else {
            Some(format!("[{}],{}", nodes.join(","), normalization))
        }
    }

    // 0: children are plain elements
    // 1: components may return one level of nested arrays
    // 2: v-for, template or slot children return arrays of arbitrary depth
    fn normalization_type(&self, ast: &Ast, children: &[NodeId]) -> u8 {
        let mut res = 0;
        for &child in children {
            let el = match ast.get(child) {
                AstNode::Element(el) => el,
                _ => continue,
            };
            if needs_normalization(el)
                || el.if_conditions.iter().any(|c| needs_normalization(ast.element(c.block)))
            {
                return 2;
            }
            if self.maybe_component(el)
                || el.if_conditions.iter().any(|c| self.maybe_component(ast.element(c.block)))
            {
                res = 1;
            }
        }
        res
    }

    fn gen_node(&mut self, ast: &Ast, id: NodeId) -> String {
        match ast.get(id) {
            AstNode::Element(_) => self.gen_element(ast, id, Processed::default()),
            AstNode::Text(text) => gen_text(text),
            AstNode::Comment(comment) => format!("_e({})", json_str(&comment.content)),
        }
    }

    /// `<slot>` outlets become `_t` calls carrying the fallback content and
    /// any bound slot props.
    fn gen_slot(&mut self, ast: &Ast, id: NodeId) -> String {
        let children = self.gen_children(ast, id, false);
        let el = ast.element(id);
        let slot_name = match &el.slot_name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => "\"default\"".to_string(),
        };
        let mut res = format!("_t({}", slot_name);
        if let Some(children) = &children {
            res.push_str(&format!(",function(){{return {}}}", children));
        }
        let attrs = if el.attrs.is_empty() && el.dynamic_attrs.is_empty() {
            None
        } else {
            // slot props are exposed camelCased
            let props: Vec<Attr> = el
                .attrs
                .iter()
                .chain(el.dynamic_attrs.iter())
                .map(|attr| Attr {
                    name: camelize(&attr.name),
                    value: attr.value.clone(),
                    dynamic: attr.dynamic,
                })
                .collect();
            Some(gen_props(&props))
        };
        let bind = el.attrs_map.get("v-bind").filter(|value| !value.is_empty());
        if (attrs.is_some() || bind.is_some()) && children.is_none() {
            res.push_str(",null");
        }
        if let Some(attrs) = &attrs {
            res.push(',');
            res.push_str(attrs);
        }
        if let Some(bind) = bind {
            if attrs.is_none() {
                res.push_str(",null");
            }
            res.push(',');
            res.push_str(bind);
        }
        res.push(')');
        res
    }
}

fn gen_text(text: &Text) -> String {
    match &text.expression {
        Some(parsed) => format!("_v({})", parsed.expression),
        None => format!("_v({})", transform_special_newlines(&json_str(&text.content))),
    }
}

fn needs_normalization(el: &Element) -> bool {
    el.for_clause.is_some() || el.tag == "template" || el.tag == "slot"
}

/// JSON-quotes a string for embedding in generated code.
pub(crate) fn json_str(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

/// U+2028 and U+2029 terminate lines in JavaScript but survive JSON
/// quoting, so they must escape here.
pub(crate) fn transform_special_newlines(value: &str) -> String {
    value.replace('\u{2028}', "\\u2028").replace('\u{2029}', "\\u2029")
}

// === Tests ===
