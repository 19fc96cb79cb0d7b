use crate::ast::{Ast, AstNode, NodeId};
use crate::html;
use crate::options::Merged;

/// Marks the static parts of a parsed template.
///
/// First pass flags every node that can never change; second pass promotes
/// qualifying subtrees to static roots so codegen can hoist them into
/// separate render procedures that run once and get cached.
pub fn optimize(ast: &mut Ast, opts: &Merged) {
    let root = match ast.root {
        Some(root) => root,
        None => return,
    };
    mark_static(ast, root, opts);
    mark_static_roots(ast, root, false);
}

fn mark_static(ast: &mut Ast, id: NodeId, opts: &Merged) {
    if !matches!(ast.get(id), AstNode::Element(_)) {
        // text staticness is decided at parse time, comments never change
        return;
    }
    let is_static = is_static_element(ast, id, opts);
    ast.element_mut(id).is_static = is_static;

    // Components keep their subtree dynamic: the child template belongs to
    // the component, not to this render procedure.
    let descend = {
        let el = ast.element(id);
        (opts.is_reserved_tag)(&el.tag) || el.tag == "slot"
    };
    if !descend {
        return;
    }

    let children = ast.element(id).children.clone();
    for child in children {
        mark_static(ast, child, opts);
        if !node_is_static(ast, child) {
            ast.element_mut(id).is_static = false;
        }
    }
    let blocks: Vec<NodeId> =
        ast.element(id).if_conditions.iter().skip(1).map(|c| c.block).collect();
    for block in blocks {
        mark_static(ast, block, opts);
        if !node_is_static(ast, block) {
            ast.element_mut(id).is_static = false;
        }
    }
}

fn mark_static_roots(ast: &mut Ast, id: NodeId, in_for: bool) {
    if !matches!(ast.get(id), AstNode::Element(_)) {
        return;
    }
    if ast.element(id).is_static {
        ast.element_mut(id).static_in_for = in_for;
    }
    // A subtree whose only content is one plain text node stays inline;
    // hoisting it costs more than rendering it.
    let qualifies = {
        let el = ast.element(id);
        el.is_static
            && !el.children.is_empty()
            && !(el.children.len() == 1 && is_plain_text_node(ast, el.children[0]))
    };
    if qualifies {
        ast.element_mut(id).static_root = true;
        return;
    }

    let children = ast.element(id).children.clone();
    let has_for = ast.element(id).for_clause.is_some();
    for child in children {
        mark_static_roots(ast, child, in_for || has_for);
    }
    let blocks: Vec<NodeId> =
        ast.element(id).if_conditions.iter().skip(1).map(|c| c.block).collect();
    for block in blocks {
        mark_static_roots(ast, block, in_for);
    }
}

/// An element is static when nothing about it depends on render state: no
/// bindings, no structural directives, no key/ref/slot facets, and it is a
/// reserved platform tag outside any `<template v-for>` body.
fn is_static_element(ast: &Ast, id: NodeId, opts: &Merged) -> bool {
    let el = ast.element(id);
    !el.has_bindings
        && el.if_expr.is_none()
        && el.elseif_expr.is_none()
        && !el.is_else
        && el.for_clause.is_none()
        && !el.forbidden
        && !html::is_built_in_element(&el.tag)
        && (opts.is_reserved_tag)(&el.tag)
        && !is_direct_child_of_template_for(ast, id)
        && el.key.is_none()
        && el.ref_expr.is_none()
        && el.slot_name.is_none()
        && el.slot_target.is_none()
        && el.events.is_empty()
        && el.directives.is_empty()
        && el.dynamic_attrs.is_empty()
}

fn node_is_static(ast: &Ast, id: NodeId) -> bool {
    match ast.get(id) {
        AstNode::Element(el) => el.is_static,
        AstNode::Text(t) => t.is_static,
        AstNode::Comment(_) => true,
    }
}

fn is_plain_text_node(ast: &Ast, id: NodeId) -> bool {
    match ast.get(id) {
        AstNode::Element(_) => false,
        AstNode::Text(t) => t.expression.is_none(),
        AstNode::Comment(_) => true,
    }
}

/// `<template v-for>` repeats its children directly, so they can never be
/// hoisted even when they look static.
fn is_direct_child_of_template_for(ast: &Ast, id: NodeId) -> bool {
    let mut parent = ast.element(id).parent;
    while let Some(p) = parent {
        let el = ast.element(p);
        if el.tag != "template" {
            return false;
        }
        if el.for_clause.is_some() {
            return true;
        }
        parent = el.parent;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Warnings;
    use crate::options::{CompileOptions, CompilerConfig};
    use crate::parser;

    fn parse_and_optimize(template: &str) -> Ast {
        let opts = CompilerConfig::default().merge(&CompileOptions::default());
        let mut warnings = Warnings::new(false, 0);
        let mut ast = parser::parse(template, &opts, &mut warnings).unwrap();
        optimize(&mut ast, &opts);
        ast
    }

    #[test]
    fn test_fully_static_tree_is_a_static_root() {
        let ast = parse_and_optimize("<div><p>hello</p><p>world</p></div>");
        let root = ast.root.unwrap();
        assert!(ast.element(root).is_static);
        assert!(ast.element(root).static_root);
    }

    #[test]
    fn test_interpolation_poisons_ancestors() {
        let ast = parse_and_optimize("<div><p>{{ msg }}</p></div>");
        let root = ast.root.unwrap();
        assert!(!ast.element(root).is_static);
        assert!(!ast.element(root).static_root);
    }

    #[test]
    fn test_static_sibling_of_dynamic_content_is_hoisted() {
        let ast = parse_and_optimize("<div><span>{{ a }}</span><p><b>bold</b></p></div>");
        let root = ast.root.unwrap();
        assert!(!ast.element(root).is_static);
        let p = *ast.element(root).children.last().unwrap();
        assert!(ast.element(p).is_static);
        assert!(ast.element(p).static_root);
    }

    #[test]
    fn test_single_text_child_is_not_worth_hoisting() {
        let ast = parse_and_optimize("<div><span>{{ a }}</span><p>plain</p></div>");
        let root = ast.root.unwrap();
        let p = *ast.element(root).children.last().unwrap();
        assert!(ast.element(p).is_static);
        assert!(!ast.element(p).static_root);
    }

    #[test]
    fn test_directive_marks_element_dynamic() {
        let ast = parse_and_optimize("<div v-show=\"ok\"><p>body</p></div>");
        let root = ast.root.unwrap();
        assert!(!ast.element(root).is_static);
    }

    #[test]
    fn test_bound_attribute_marks_element_dynamic() {
        let ast = parse_and_optimize("<div :id=\"key\"><p>body</p></div>");
        let root = ast.root.unwrap();
        assert!(!ast.element(root).is_static);
    }

    #[test]
    fn test_component_tag_is_never_static() {
        let ast = parse_and_optimize("<div><my-widget><p>inner</p></my-widget></div>");
        let root = ast.root.unwrap();
        assert!(!ast.element(root).is_static);
        let widget = ast.element(root).children[0];
        assert!(!ast.element(widget).is_static);
        // the component subtree is left untouched
        let inner = ast.element(widget).children[0];
        assert!(!ast.element(inner).is_static);
        assert!(!ast.element(inner).static_root);
    }

    #[test]
    fn test_static_in_for_is_tracked() {
        let ast = parse_and_optimize(
            "<ul><li v-for=\"item in items\"><span><b>fixed</b></span></li></ul>",
        );
        let root = ast.root.unwrap();
        let li = ast.element(root).children[0];
        let span = ast.element(li).children[0];
        assert!(ast.element(span).is_static);
        assert!(ast.element(span).static_root);
        assert!(ast.element(span).static_in_for);
    }

    #[test]
    fn test_template_for_children_stay_inline() {
        let ast = parse_and_optimize(
            "<div><template v-for=\"item in items\"><span><b>x</b></span></template></div>",
        );
        let root = ast.root.unwrap();
        let template = ast.element(root).children[0];
        let span = ast.element(template).children[0];
        assert!(!ast.element(span).is_static);
    }

    #[test]
    fn test_later_branches_of_a_chain_are_visited() {
        let ast = parse_and_optimize(
            "<div><p v-if=\"a\">{{ a }}</p><p v-else><b>static body</b></p></div>",
        );
        let root = ast.root.unwrap();
        let first = ast.element(root).children[0];
        assert_eq!(ast.element(first).if_conditions.len(), 2);
        let else_block = ast.element(first).if_conditions[1].block;
        // branch blocks are never static roots themselves
        assert!(!ast.element(else_block).is_static);
    }
}
