use crate::ast::{Ast, AstNode, Element, NodeId};
use crate::error::{split_range, Warnings};
use crate::options::Merged;
use crate::parser::is_directive_name;
use crate::parser::text_parser::parse_text;
use std::collections::HashSet;

/// Post-parse sweep for structural misuse no single builder step can see:
/// bindings smuggled into static-only attribute positions, and keys that
/// name more than one rendered node.
pub fn detect(ast: &Ast, opts: &Merged, warnings: &mut Warnings) {
    if let Some(root) = ast.root {
        check_element(ast, root, false, opts, warnings);
    }
}

fn check_element(ast: &Ast, id: NodeId, in_for: bool, opts: &Merged, warnings: &mut Warnings) {
    let el = ast.element(id);
    check_literal_attrs(el, opts, warnings);
    let in_for = in_for || el.for_clause.is_some();
    if in_for {
        check_constant_key(el, warnings);
    }
    check_sibling_keys(ast, el, warnings);
    for condition in &el.if_conditions {
        if condition.block != id {
            check_element(ast, condition.block, in_for, opts, warnings);
        }
    }
    for &child in &el.children {
        if matches!(ast.get(child), AstNode::Element(_)) {
            check_element(ast, child, in_for, opts, warnings);
        }
    }
}

/// A `{{ }}` binding inside a plain attribute value was recorded as literal
/// text and will never update.
fn check_literal_attrs(el: &Element, opts: &Merged, warnings: &mut Warnings) {
    for attr in &el.attrs_list {
        if is_directive_name(&attr.name) {
            continue;
        }
        if parse_text(&attr.value, &opts.delimiters).is_some() {
            warnings.warn(
                format!(
                    "{}=\"{}\": Interpolation inside attributes has been removed. \
                     Use v-bind or the colon shorthand instead. For example, \
                     instead of <div id=\"{{{{ val }}}}\">, use <div :id=\"val\">.",
                    attr.name, attr.value
                ),
                Some(attr.start),
                Some(attr.end),
            );
        }
    }
}

/// Inside a loop a constant key names every copy identically.
fn check_constant_key(el: &Element, warnings: &mut Warnings) {
    let key = match &el.key {
        Some(key) => key,
        None => return,
    };
    if is_literal(key) {
        let (start, end) = split_range(el.raw_attr_range("key"));
        warnings.warn(
            format!(
                "<{}> inside v-for uses the constant key {}. Keys must identify \
                 each repeated element uniquely; bind the key to the item or its \
                 index instead.",
                el.tag, key
            ),
            start,
            end,
        );
    }
}

/// Unconditionally rendered siblings must not share one literal key.
/// Branches of a conditional chain are mutually exclusive and may.
fn check_sibling_keys(ast: &Ast, el: &Element, warnings: &mut Warnings) {
    let mut seen: HashSet<&str> = HashSet::new();
    for &child in &el.children {
        let child_el = match ast.get(child) {
            AstNode::Element(child_el) => child_el,
            _ => continue,
        };
        if child_el.if_expr.is_some() {
            continue;
        }
        let key = match &child_el.key {
            Some(key) => key,
            None => continue,
        };
        if !is_literal(key) {
            continue;
        }
        if !seen.insert(key.as_str()) {
            let (start, end) = split_range(child_el.raw_attr_range("key"));
            warnings.warn(
                format!("Duplicate keys detected: {}. This may cause an update error.", key),
                start,
                end,
            );
        }
    }
}

// A key expression that is a self-contained JSON literal cannot vary
// between renders or copies.
fn is_literal(expression: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(expression).is_ok()
}

// === Tests ===
