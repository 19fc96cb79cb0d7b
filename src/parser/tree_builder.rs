use super::text_parser::parse_text;
use super::tokenizer::{RawAttr, TokenSink};
use crate::ast::{
    camelize, Ast, AstNode, Comment, Directive, Element, EventHandler, ForClause, IfCondition,
    NodeId, Text,
};
use crate::error::{split_range, CompileError, ErrorKind, Warnings};
use crate::options::Merged;
use serde_json::Value;
use std::collections::{BTreeSet, HashSet};

/// Builds the element tree from tokenizer events.
///
/// Elements are pushed into the arena when their start tag arrives and get
/// their directive facets extracted when they close, so module transforms
/// observe fully attributed nodes. The builder also stitches `else`/`else-if`
/// branches onto the preceding `if` element and condenses whitespace-only
/// text the way the output renderer expects.
pub struct TreeBuilder<'a> {
    opts: &'a Merged,
    warnings: &'a mut Warnings,
    template: &'a str,
    ast: Ast,
    stack: Vec<NodeId>,
    root: Option<NodeId>,
    current_parent: Option<NodeId>,
    in_pre: bool,
    warned: bool, // structural warnings fire once per template
}

impl<'a> TreeBuilder<'a> {
    pub fn new(template: &'a str, opts: &'a Merged, warnings: &'a mut Warnings) -> Self {
        Self {
            opts,
            warnings,
            template,
            ast: Ast::new(),
            stack: Vec::new(),
            root: None,
            current_parent: None,
            in_pre: false,
            warned: false,
        }
    }

    pub fn finish(mut self) -> Ast {
        self.ast.root = self.root;
        self.ast
    }

    fn warn_once(&mut self, msg: impl Into<String>, start: Option<usize>, end: Option<usize>) {
        if !self.warned {
            self.warned = true;
            self.warnings.warn(msg, start, end);
        }
    }

    // === Element lifecycle ===

    fn close_element(&mut self, id: NodeId) {
        self.trim_ending_whitespace(id);
        if !self.ast.element(id).processed {
            self.process_element(id);
        }
        // Siblings of the root are only legal as branches of a root v-if.
        if self.stack.is_empty() && Some(id) != self.root {
            let root_has_if = self
                .root
                .map(|root| self.ast.element(root).if_expr.is_some())
                .unwrap_or(false);
            let is_branch = {
                let el = self.ast.element(id);
                el.elseif_expr.is_some() || el.is_else
            };
            if root_has_if && is_branch {
                self.check_root_constraints(id);
                if let Some(root) = self.root {
                    let exp = self.ast.element(id).elseif_expr.clone();
                    self.ast
                        .element_mut(root)
                        .if_conditions
                        .push(IfCondition { exp, block: id });
                }
            } else {
                let start = self.ast.element(id).start;
                self.warn_once(
                    "Component template should contain exactly one root element. \
                     If you are using v-if on multiple elements, \
                     use v-else-if to chain them instead.",
                    Some(start),
                    None,
                );
            }
        }
        if let Some(parent) = self.current_parent {
            if !self.ast.element(id).forbidden {
                let is_branch = {
                    let el = self.ast.element(id);
                    el.elseif_expr.is_some() || el.is_else
                };
                if is_branch {
                    self.process_if_conditions(id, parent);
                } else {
                    self.ast.element_mut(parent).children.push(id);
                    self.ast.element_mut(id).parent = Some(parent);
                }
            }
        }
        if (self.opts.is_pre_tag)(&self.ast.element(id).tag) {
            self.in_pre = false;
        }
        let opts = self.opts;
        for module in &opts.modules {
            module.post_transform(&mut self.ast, id, self.warnings);
        }
    }

    /// Drops trailing whitespace-only text nodes so `</div>` after an
    /// indented child does not leave a stray blank child behind.
    fn trim_ending_whitespace(&mut self, id: NodeId) {
        if self.in_pre {
            return;
        }
        loop {
            let last = match self.ast.element(id).children.last() {
                Some(&last) => last,
                None => break,
            };
            let blank = matches!(self.ast.get(last), AstNode::Text(t) if t.content == " ");
            if !blank {
                break;
            }
            self.ast.element_mut(id).children.pop();
        }
    }

    fn check_root_constraints(&mut self, id: NodeId) {
        let (tag, start) = {
            let el = self.ast.element(id);
            (el.tag.clone(), el.start)
        };
        if tag == "slot" || tag == "template" {
            self.warn_once(
                format!(
                    "Cannot use <{}> as component root element because it may contain multiple nodes.",
                    tag
                ),
                Some(start),
                None,
            );
        }
        if self.ast.element(id).attrs_map.contains_key("v-for") {
            let range = self.ast.element(id).raw_attr_range("v-for");
            let (start, end) = split_range(range);
            self.warn_once(
                "Cannot use v-for on stateful component root element because it renders multiple elements.",
                start,
                end,
            );
        }
    }

    /// Attaches an `else`/`else-if` element to the condition list of the
    /// previous sibling carrying `v-if`. The branch element never becomes a
    /// child of its parent; it is only reachable through the condition list.
    fn process_if_conditions(&mut self, id: NodeId, parent: NodeId) {
        let prev = self.find_prev_element(parent);
        let has_if = prev
            .map(|prev| self.ast.element(prev).if_expr.is_some())
            .unwrap_or(false);
        if has_if {
            let exp = self.ast.element(id).elseif_expr.clone();
            if let Some(prev) = prev {
                self.ast
                    .element_mut(prev)
                    .if_conditions
                    .push(IfCondition { exp, block: id });
            }
        } else {
            let (describe, tag, range) = {
                let el = self.ast.element(id);
                match &el.elseif_expr {
                    Some(exp) => (
                        format!("else-if=\"{}\"", exp),
                        el.tag.clone(),
                        el.raw_attr_range("v-else-if"),
                    ),
                    None => ("else".to_string(), el.tag.clone(), el.raw_attr_range("v-else")),
                }
            };
            let (start, end) = split_range(range);
            self.warnings.warn(
                format!("v-{} used on element <{}> without corresponding v-if.", describe, tag),
                start,
                end,
            );
        }
    }

    /// Last element child of `parent`, popping interleaved text and comment
    /// nodes. Non-blank content between branches is dead and gets a warning.
    fn find_prev_element(&mut self, parent: NodeId) -> Option<NodeId> {
        loop {
            let last = match self.ast.element(parent).children.last() {
                Some(&last) => last,
                None => return None,
            };
            let (content, start) = match self.ast.get(last) {
                AstNode::Element(_) => return Some(last),
                AstNode::Text(t) => (t.content.clone(), t.start),
                AstNode::Comment(c) => (c.content.clone(), c.start),
            };
            if content != " " {
                self.warnings.warn(
                    format!(
                        "text \"{}\" between v-if and v-else(-if) will be ignored.",
                        content.trim()
                    ),
                    Some(start),
                    None,
                );
            }
            self.ast.element_mut(parent).children.pop();
        }
    }

    // === Directive extraction ===

    fn process_for(&mut self, id: NodeId) -> Result<(), CompileError> {
        let range = self.ast.element(id).raw_attr_range("v-for");
        let exp = match self.ast.element_mut(id).get_and_remove_attr("v-for", false) {
            Some(exp) if !exp.is_empty() => exp,
            _ => return Ok(()),
        };
        match parse_for(&exp) {
            Some(clause) => {
                self.ast.element_mut(id).for_clause = Some(clause);
                Ok(())
            }
            None => {
                let (start, end) = range.unwrap_or((0, 0));
                Err(CompileError::new(
                    ErrorKind::InvalidForExpression,
                    format!("Invalid v-for expression: {}", exp),
                    start,
                    end,
                ))
            }
        }
    }

    fn process_if(&mut self, id: NodeId) {
        let el = self.ast.element_mut(id);
        match el.get_and_remove_attr("v-if", false) {
            Some(exp) if !exp.is_empty() => {
                el.if_expr = Some(exp.clone());
                el.if_conditions.push(IfCondition { exp: Some(exp), block: id });
            }
            _ => {
                if el.get_and_remove_attr("v-else", false).is_some() {
                    el.is_else = true;
                }
                if let Some(exp) = el.get_and_remove_attr("v-else-if", false) {
                    if !exp.is_empty() {
                        el.elseif_expr = Some(exp);
                    }
                }
            }
        }
    }

    fn process_element(&mut self, id: NodeId) {
        self.process_key(id);
        {
            let el = self.ast.element_mut(id);
            el.plain = el.key.is_none() && el.attrs_list.is_empty();
        }
        self.process_ref(id);
        self.process_slot_content(id);
        self.process_slot_outlet(id);
        let opts = self.opts;
        for module in &opts.modules {
            module.transform(&mut self.ast, id, self.warnings);
        }
        self.process_attrs(id);
    }

    fn process_key(&mut self, id: NodeId) {
        let exp = match self.ast.element_mut(id).get_binding_attr("key", true) {
            Some(exp) if !exp.is_empty() => exp,
            _ => return,
        };
        if self.ast.element(id).tag == "template" {
            let range = self.ast.element(id).raw_attr_range("key");
            let (start, end) = split_range(range);
            self.warnings.warn(
                "<template> cannot be keyed. Place the key on real elements instead.",
                start,
                end,
            );
        }
        self.ast.element_mut(id).key = Some(exp);
    }

    fn process_ref(&mut self, id: NodeId) {
        let ref_expr = match self.ast.element_mut(id).get_binding_attr("ref", true) {
            Some(expr) if !expr.is_empty() => expr,
            _ => return,
        };
        let in_for = self.check_in_for(id);
        let el = self.ast.element_mut(id);
        el.ref_expr = Some(ref_expr);
        el.ref_in_for = in_for;
    }

    /// A ref inside any `v-for` ancestor resolves to an array at runtime.
    fn check_in_for(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            let el = self.ast.element(node);
            if el.for_clause.is_some() {
                return true;
            }
            current = el.parent;
        }
        false
    }

    /// `slot="name"` on slotted content. The target is kept as a regular
    /// attribute on real elements for native shadow DOM compatibility.
    fn process_slot_content(&mut self, id: NodeId) {
        let target = match self.ast.element_mut(id).get_binding_attr("slot", true) {
            Some(target) if !target.is_empty() => target,
            _ => return,
        };
        let mapped = if target == "\"\"" { "\"default\"".to_string() } else { target.clone() };
        let el = self.ast.element_mut(id);
        el.slot_target = Some(mapped);
        if el.tag != "template" {
            el.add_attr("slot", target, false);
        }
    }

    /// `<slot name="...">` outlets.
    fn process_slot_outlet(&mut self, id: NodeId) {
        if self.ast.element(id).tag != "slot" {
            return;
        }
        let name = self.ast.element_mut(id).get_binding_attr("name", true);
        self.ast.element_mut(id).slot_name = name;
        if self.ast.element(id).key.is_some() {
            let range = self.ast.element(id).raw_attr_range("key");
            let (start, end) = split_range(range);
            self.warnings.warn(
                "`key` does not work on <slot> because slots are abstract outlets \
                 and can possibly expand into multiple elements. \
                 Use the key on a wrapping element instead.",
                start,
                end,
            );
        }
    }

    /// Routes every remaining attribute: `:`/`v-bind:` to attribute bindings,
    /// `@`/`v-on:` to handlers, other `v-` prefixes to generic directives,
    /// and everything else to literal attributes.
    fn process_attrs(&mut self, id: NodeId) {
        let attrs: Vec<RawAttr> = self.ast.element(id).attrs_list.clone();
        for attr in &attrs {
            let raw_name = attr.name.as_str();
            if !is_directive_name(raw_name) {
                let quoted = Value::String(attr.value.clone()).to_string();
                self.ast.element_mut(id).add_attr(raw_name, quoted, false);
                continue;
            }
            self.ast.element_mut(id).has_bindings = true;
            let modifiers = parse_modifiers(raw_name);
            let name = strip_modifiers(raw_name);
            if let Some(rest) = name.strip_prefix(':').or_else(|| name.strip_prefix("v-bind:")) {
                self.process_bind_attr(id, rest, attr, modifiers);
            } else if let Some(rest) =
                name.strip_prefix('@').or_else(|| name.strip_prefix("v-on:"))
            {
                self.process_on_attr(id, rest, attr, modifiers);
            } else {
                self.process_directive_attr(id, &name, attr, modifiers);
            }
        }
    }

    fn process_bind_attr(
        &mut self,
        id: NodeId,
        name: &str,
        attr: &RawAttr,
        modifiers: BTreeSet<String>,
    ) {
        let dynamic = is_dynamic_arg(name);
        let mut name =
            if dynamic { name[1..name.len() - 1].to_string() } else { name.to_string() };
        if attr.value.trim().is_empty() {
            self.warnings.warn(
                format!(
                    "The value for a v-bind expression cannot be empty. Found in \"v-bind:{}\"",
                    name
                ),
                None,
                None,
            );
        }
        if !dynamic {
            if modifiers.contains("prop") {
                name = camelize(&name);
                if name == "innerHtml" {
                    name = "innerHTML".to_string();
                }
            }
            if modifiers.contains("camel") {
                name = camelize(&name);
            }
        }
        self.ast.element_mut(id).add_attr(name, attr.value.clone(), dynamic);
    }

    fn process_on_attr(
        &mut self,
        id: NodeId,
        name: &str,
        attr: &RawAttr,
        modifiers: BTreeSet<String>,
    ) {
        let dynamic = is_dynamic_arg(name);
        let name = if dynamic { &name[1..name.len() - 1] } else { name };
        self.ast.element_mut(id).add_handler(EventHandler {
            name: name.to_string(),
            value: attr.value.trim().to_string(),
            dynamic,
            modifiers,
            start: attr.start,
            end: attr.end,
        });
    }

    fn process_directive_attr(
        &mut self,
        id: NodeId,
        name: &str,
        attr: &RawAttr,
        modifiers: BTreeSet<String>,
    ) {
        let stripped = if let Some(rest) = name.strip_prefix("v-") {
            rest.to_string()
        } else if let Some(rest) = name.strip_prefix('#') {
            // shorthand for the slot directive with an argument
            format!("slot:{}", rest)
        } else {
            name.to_string()
        };
        let (dir_name, arg, is_dynamic_arg) = split_directive_arg(&stripped);
        let is_model = dir_name == "model";
        self.ast.element_mut(id).add_directive(Directive {
            name: dir_name,
            raw_name: attr.name.clone(),
            value: attr.value.clone(),
            arg,
            is_dynamic_arg,
            modifiers,
            start: attr.start,
            end: attr.end,
        });
        if is_model {
            self.check_for_alias_model(id, &attr.value);
        }
    }

    /// `v-model` bound to a loop alias writes to a function-local copy and
    /// never reaches the source array.
    fn check_for_alias_model(&mut self, id: NodeId, value: &str) {
        let tag = self.ast.element(id).tag.clone();
        let range = self.ast.element(id).raw_attr_range("v-model");
        let mut current = Some(id);
        while let Some(node) = current {
            let el = self.ast.element(node);
            let aliased = el.for_clause.as_ref().map(|f| f.alias == value).unwrap_or(false);
            let parent = el.parent;
            if aliased {
                let (start, end) = split_range(range);
                self.warnings.warn(
                    format!(
                        "<{} v-model=\"{}\">: You are binding v-model directly to a v-for \
                         iteration alias. This will not be able to modify the v-for source \
                         array because writing to the alias is like modifying a function \
                         local variable. Consider using an array of objects and use v-model \
                         on an object property instead.",
                        tag, value
                    ),
                    start,
                    end,
                );
            }
            current = parent;
        }
    }
}

impl TokenSink for TreeBuilder<'_> {
    fn start_tag(
        &mut self,
        tag: &str,
        attrs: Vec<RawAttr>,
        unary: bool,
        start: usize,
        end: usize,
    ) -> Result<(), CompileError> {
        let mut seen = HashSet::new();
        for attr in &attrs {
            if !seen.insert(attr.name.clone()) {
                self.warnings.warn(
                    format!("duplicate attribute: {}", attr.name),
                    Some(attr.start),
                    Some(attr.end),
                );
            }
            if attr.name.contains(invalid_attr_char) {
                let from = attr.start + attr.name.find('[').unwrap_or(0);
                self.warnings.warn(
                    "Invalid dynamic argument expression: attribute names cannot contain \
                     spaces, quotes, <, >, / or =.",
                    Some(from),
                    Some(attr.start + attr.name.len()),
                );
            }
        }

        let mut element = Element::new(tag, attrs, self.current_parent);
        element.start = start;
        element.end = end;
        if is_forbidden_tag(&element) {
            element.forbidden = true;
            self.warnings.warn(
                format!(
                    "Templates should only be responsible for mapping the state to the UI. \
                     Avoid placing tags with side-effects in your templates, such as <{}>, \
                     as they will not be parsed.",
                    tag
                ),
                Some(start),
                None,
            );
        }
        let id = self.ast.push(AstNode::Element(element));

        let opts = self.opts;
        for module in &opts.modules {
            module.pre_transform(&mut self.ast, id, self.warnings);
        }

        if (opts.is_pre_tag)(tag) {
            self.in_pre = true;
        }
        if !self.ast.element(id).processed {
            self.process_for(id)?;
            self.process_if(id);
        }

        if self.root.is_none() {
            self.root = Some(id);
            self.check_root_constraints(id);
        }

        if !unary {
            self.current_parent = Some(id);
            self.stack.push(id);
        } else {
            self.close_element(id);
        }
        Ok(())
    }

    fn end_tag(&mut self, _tag: &str, _start: usize, end: usize) -> Result<(), CompileError> {
        let id = match self.stack.pop() {
            Some(id) => id,
            None => return Ok(()),
        };
        self.current_parent = self.stack.last().copied();
        self.ast.element_mut(id).end = end;
        self.close_element(id);
        Ok(())
    }

    fn text(&mut self, text: &str, start: usize, end: usize) -> Result<(), CompileError> {
        let parent = match self.current_parent {
            Some(parent) => parent,
            None => {
                if text == self.template {
                    self.warn_once(
                        "Component template requires a root element, rather than just text.",
                        Some(start),
                        None,
                    );
                } else {
                    let trimmed = text.trim();
                    if !trimmed.is_empty() {
                        self.warn_once(
                            format!("text \"{}\" outside root element will be ignored.", trimmed),
                            Some(start),
                            None,
                        );
                    }
                }
                return Ok(());
            }
        };
        let children_empty = self.ast.element(parent).children.is_empty();
        // Whitespace-only runs condense to a single space, or vanish right
        // after an opening tag. Inside <pre> everything survives verbatim.
        let resolved: &str = if self.in_pre || !text.trim().is_empty() {
            text
        } else if children_empty {
            ""
        } else {
            " "
        };
        if resolved.is_empty() {
            return Ok(());
        }
        let node = if resolved != " " {
            match parse_text(resolved, &self.opts.delimiters) {
                Some(parsed) => Some(Text {
                    content: resolved.to_string(),
                    expression: Some(parsed),
                    is_static: false,
                    start,
                    end,
                }),
                None => Some(Text {
                    content: resolved.to_string(),
                    expression: None,
                    is_static: true,
                    start,
                    end,
                }),
            }
        } else {
            // collapse runs of blank nodes
            let last_blank = self
                .ast
                .element(parent)
                .children
                .last()
                .map(|&c| matches!(self.ast.get(c), AstNode::Text(t) if t.content == " "))
                .unwrap_or(false);
            if last_blank {
                None
            } else {
                Some(Text {
                    content: " ".to_string(),
                    expression: None,
                    is_static: true,
                    start,
                    end,
                })
            }
        };
        if let Some(text_node) = node {
            let id = self.ast.push(AstNode::Text(text_node));
            self.ast.element_mut(parent).children.push(id);
        }
        Ok(())
    }

    fn comment(&mut self, text: &str, start: usize, end: usize) -> Result<(), CompileError> {
        // comments outside the root are dropped
        if let Some(parent) = self.current_parent {
            let id = self.ast.push(AstNode::Comment(Comment {
                content: text.to_string(),
                start,
                end,
            }));
            self.ast.element_mut(parent).children.push(id);
        }
        Ok(())
    }

    fn warn(&mut self, msg: String, start: Option<usize>, end: Option<usize>) {
        self.warnings.warn(msg, start, end);
    }
}

// === Attribute name helpers ===

pub(crate) fn is_directive_name(name: &str) -> bool {
    name.starts_with("v-") || name.starts_with('@') || name.starts_with(':') || name.starts_with('#')
}

fn is_dynamic_arg(name: &str) -> bool {
    name.len() >= 2 && name.starts_with('[') && name.ends_with(']')
}

fn invalid_attr_char(c: char) -> bool {
    c.is_whitespace() || matches!(c, '"' | '\'' | '<' | '>' | '/' | '=')
}

fn is_forbidden_tag(el: &Element) -> bool {
    if !crate::html::is_forbidden_element(&el.tag) {
        return false;
    }
    // <script type="text/x-template"> and friends are inert
    el.tag != "script"
        || el.attrs_map.get("type").map(|t| t == "text/javascript").unwrap_or(true)
}

/// Modifier flags are the `.mod` segments after the argument, if any. A `.`
/// inside a dynamic `[arg]` does not start a modifier.
fn parse_modifiers(name: &str) -> BTreeSet<String> {
    let boundary = name.rfind(']').map(|i| i + 1).unwrap_or(0);
    let mut out = BTreeSet::new();
    let mut parts = name[boundary..].split('.');
    parts.next(); // everything before the first dot is the name itself
    for part in parts {
        if !part.is_empty() {
            out.insert(part.to_string());
        }
    }
    out
}

fn strip_modifiers(name: &str) -> String {
    let boundary = name.rfind(']').map(|i| i + 1).unwrap_or(0);
    match name[boundary..].find('.') {
        Some(dot) => name[..boundary + dot].to_string(),
        None => name.to_string(),
    }
}

/// Splits `name:arg` at the first colon; `[arg]` marks the argument dynamic.
fn split_directive_arg(stripped: &str) -> (String, Option<String>, bool) {
    let colon = match stripped.find(':') {
        Some(colon) => colon,
        None => return (stripped.to_string(), None, false),
    };
    let arg = &stripped[colon + 1..];
    if arg.is_empty() {
        return (stripped.to_string(), None, false);
    }
    let name = stripped[..colon].to_string();
    if is_dynamic_arg(arg) {
        (name, Some(arg[1..arg.len() - 1].to_string()), true)
    } else {
        (name, Some(arg.to_string()), false)
    }
}

// === Loop expression decomposition ===

/// Decomposes `(item, key, index) in source` into its bindings. Destructuring
/// aliases like `{ a, b } in xs` stay intact because iterator segments must
/// not contain commas, braces or brackets. Returns `None` when there is no
/// `in`/`of` split or no source expression.
pub(crate) fn parse_for(exp: &str) -> Option<ForClause> {
    let (left, right) = split_in_of(exp)?;
    let source = right.trim();
    if source.is_empty() {
        return None;
    }
    let mut alias = left.trim();
    alias = alias.strip_prefix('(').unwrap_or(alias);
    alias = alias.strip_suffix(')').unwrap_or(alias);
    let (alias, iterator1, iterator2) = match match_iterators(alias) {
        Some((head, it1, it2)) => {
            (head.trim().to_string(), non_empty(it1), it2.and_then(non_empty))
        }
        None => (alias.to_string(), None, None),
    };
    Some(ForClause { exp: source.to_string(), alias, iterator1, iterator2 })
}

/// First whitespace-delimited `in` or `of` keyword splits alias from source.
fn split_in_of(exp: &str) -> Option<(&str, &str)> {
    let bytes = exp.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if !bytes[i].is_ascii_whitespace() {
            i += 1;
            continue;
        }
        let ws_start = i;
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        for kw in ["in", "of"] {
            if exp[i..].starts_with(kw) {
                let after = i + kw.len();
                if bytes.get(after).map(|b| b.is_ascii_whitespace()).unwrap_or(false) {
                    let mut j = after;
                    while j < bytes.len() && bytes[j].is_ascii_whitespace() {
                        j += 1;
                    }
                    return Some((&exp[..ws_start], &exp[j..]));
                }
            }
        }
    }
    None
}

/// Trailing `,x` or `,x,y` iterator bindings, where a binding may not contain
/// a comma, closing brace or closing bracket.
fn match_iterators(alias: &str) -> Option<(&str, String, Option<String>)> {
    let clean = |s: &str| !s.contains([',', '}', ']']);
    let mut search = 0;
    while let Some(rel) = alias[search..].find(',') {
        let at = search + rel;
        let head = &alias[..at];
        let tail = &alias[at + 1..];
        if clean(tail) {
            return Some((head, tail.trim().to_string(), None));
        }
        if let Some(mid) = tail.find(',') {
            let (first, second) = (&tail[..mid], &tail[mid + 1..]);
            if clean(first) && clean(second) {
                return Some((head, first.trim().to_string(), Some(second.trim().to_string())));
            }
        }
        search = at + 1;
    }
    None
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_with_simple_alias() {
        let clause = parse_for("item in items").unwrap();
        assert_eq!(clause.exp, "items");
        assert_eq!(clause.alias, "item");
        assert_eq!(clause.iterator1, None);
        assert_eq!(clause.iterator2, None);
    }

    #[test]
    fn test_for_with_of_keyword() {
        let clause = parse_for("item of items").unwrap();
        assert_eq!(clause.exp, "items");
        assert_eq!(clause.alias, "item");
    }

    #[test]
    fn test_for_with_index() {
        let clause = parse_for("(item, i) in items").unwrap();
        assert_eq!(clause.alias, "item");
        assert_eq!(clause.iterator1.as_deref(), Some("i"));
        assert_eq!(clause.iterator2, None);
    }

    #[test]
    fn test_for_with_key_and_index() {
        let clause = parse_for("(value, key, index) in object").unwrap();
        assert_eq!(clause.exp, "object");
        assert_eq!(clause.alias, "value");
        assert_eq!(clause.iterator1.as_deref(), Some("key"));
        assert_eq!(clause.iterator2.as_deref(), Some("index"));
    }

    #[test]
    fn test_for_with_object_destructuring() {
        let clause = parse_for("{ name, age } in people").unwrap();
        assert_eq!(clause.alias, "{ name, age }");
        assert_eq!(clause.iterator1, None);
    }

    #[test]
    fn test_for_with_destructuring_and_index() {
        let clause = parse_for("({ name }, i) in people").unwrap();
        assert_eq!(clause.alias, "{ name }");
        assert_eq!(clause.iterator1.as_deref(), Some("i"));
    }

    #[test]
    fn test_for_with_array_destructuring() {
        let clause = parse_for("[first, second] in pairs").unwrap();
        assert_eq!(clause.alias, "[first, second]");
    }

    #[test]
    fn test_for_without_keyword_is_invalid() {
        assert!(parse_for("items").is_none());
        assert!(parse_for("item items").is_none());
    }

    #[test]
    fn test_for_without_source_is_invalid() {
        assert!(parse_for("item in ").is_none());
        assert!(parse_for("item in").is_none());
    }

    #[test]
    fn test_for_keyword_must_stand_alone() {
        let clause = parse_for("mint in drinks").unwrap();
        assert_eq!(clause.alias, "mint");
        assert_eq!(clause.exp, "drinks");
    }

    #[test]
    fn test_for_with_complex_source() {
        let clause = parse_for("item in list.filter(function (x) { return x.ok })").unwrap();
        assert_eq!(clause.exp, "list.filter(function (x) { return x.ok })");
        assert_eq!(clause.alias, "item");
    }

    #[test]
    fn test_modifiers_after_static_arg() {
        let mods = parse_modifiers("v-on:click.stop.prevent");
        assert!(mods.contains("stop"));
        assert!(mods.contains("prevent"));
        assert_eq!(mods.len(), 2);
        assert_eq!(strip_modifiers("v-on:click.stop.prevent"), "v-on:click");
    }

    #[test]
    fn test_modifiers_skip_dynamic_arg_dots() {
        let mods = parse_modifiers("v-on:[event.name].capture");
        assert!(mods.contains("capture"));
        assert_eq!(mods.len(), 1);
        assert_eq!(strip_modifiers("v-on:[event.name].capture"), "v-on:[event.name]");
    }

    #[test]
    fn test_no_modifiers() {
        assert!(parse_modifiers("v-bind:href").is_empty());
        assert_eq!(strip_modifiers("v-bind:href"), "v-bind:href");
    }

    #[test]
    fn test_directive_arg_split() {
        assert_eq!(
            split_directive_arg("my-dir:arg"),
            ("my-dir".to_string(), Some("arg".to_string()), false)
        );
        assert_eq!(split_directive_arg("show"), ("show".to_string(), None, false));
        assert_eq!(
            split_directive_arg("slot:[name]"),
            ("slot".to_string(), Some("name".to_string()), true)
        );
    }
}
