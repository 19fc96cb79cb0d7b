use trellis_compiler::ast::{Ast, AstNode, NodeId};
use trellis_compiler::{CompileOptions, CompiledResult, Compiler};

fn compile(template: &str) -> CompiledResult {
    let compiler = Compiler::default();
    compiler.compile(template, &CompileOptions::default()).unwrap()
}

/// Child ids of `id` that are elements, skipping text and comment nodes.
fn element_children(ast: &Ast, id: NodeId) -> Vec<NodeId> {
    ast.element(id)
        .children
        .iter()
        .copied()
        .filter(|&child| matches!(ast.get(child), AstNode::Element(_)))
        .collect()
}

fn text_content(ast: &Ast, id: NodeId) -> String {
    match ast.get(id) {
        AstNode::Text(text) => text.content.clone(),
        other => panic!("expected a text node, got {:?}", other),
    }
}

#[test]
fn test_force_closed_elements_warn_once_each() {
    let result = compile("<div><span><i>x</div>");

    // </div> reaches past two still-open elements; each gets one warning
    assert_eq!(result.errors.len(), 2);
    assert!(result.errors[0].msg.contains("<i> has no matching end tag"));
    assert!(result.errors[1].msg.contains("<span> has no matching end tag"));

    // the tree is still fully closed and nested as written
    let ast = &result.ast;
    let root = ast.root.unwrap();
    assert_eq!(ast.element(root).tag, "div");
    let span = element_children(ast, root)[0];
    assert_eq!(ast.element(span).tag, "span");
    let italic = element_children(ast, span)[0];
    assert_eq!(ast.element(italic).tag, "i");
    assert_eq!(text_content(ast, ast.element(italic).children[0]), "x");
}

#[test]
fn test_paragraph_auto_closes_its_sibling() {
    let result = compile("<div><p>one<p>two</p></div>");
    assert!(result.errors.is_empty());

    let ast = &result.ast;
    let paragraphs = element_children(ast, ast.root.unwrap());
    assert_eq!(paragraphs.len(), 2);
    assert_eq!(text_content(ast, ast.element(paragraphs[0]).children[0]), "one");
    assert_eq!(text_content(ast, ast.element(paragraphs[1]).children[0]), "two");
}

#[test]
fn test_raw_text_content_is_never_parsed() {
    let result = compile("<script>if (a < b) { go() }</script>");

    // side-effect tags parse but warn and render to null
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].msg.contains("side-effects"));
    assert_eq!(result.render, "with(this){return null}");

    let ast = &result.ast;
    let el = ast.element(ast.root.unwrap());
    assert_eq!(el.tag, "script");
    assert!(el.forbidden);
    assert_eq!(el.children.len(), 1);
    assert_eq!(text_content(ast, el.children[0]), "if (a < b) { go() }");
}

#[test]
fn test_conditional_chain_collects_in_order() {
    let result =
        compile(r#"<div><h1 v-if="a">A</h1><h2 v-else-if="b">B</h2><h3 v-else>C</h3></div>"#);
    assert!(result.errors.is_empty());

    // only the anchor stays a child; the branches hang off its chain
    let ast = &result.ast;
    let children = element_children(ast, ast.root.unwrap());
    assert_eq!(children.len(), 1);
    let anchor = ast.element(children[0]);
    assert_eq!(anchor.tag, "h1");
    assert_eq!(anchor.if_conditions.len(), 3);
    assert_eq!(anchor.if_conditions[0].exp.as_deref(), Some("a"));
    assert_eq!(anchor.if_conditions[1].exp.as_deref(), Some("b"));
    assert_eq!(anchor.if_conditions[2].exp, None);
    assert_eq!(ast.element(anchor.if_conditions[1].block).tag, "h2");
    assert_eq!(ast.element(anchor.if_conditions[2].block).tag, "h3");

    // first match wins, rendered as a ternary chain
    assert_eq!(
        result.render,
        r#"with(this){return _c('div',[(a)?_c('h1',[_v("A")]):(b)?_c('h2',[_v("B")]):_c('h3',[_v("C")])])}"#
    );
}

#[test]
fn test_void_element_needs_no_end_tag() {
    let result = compile(r#"<div><img src="x">tail</div>"#);
    assert!(result.errors.is_empty());

    let ast = &result.ast;
    let children = ast.element(ast.root.unwrap()).children.clone();
    assert_eq!(children.len(), 2);
    let img = ast.element(children[0]);
    assert_eq!(img.tag, "img");
    assert!(img.children.is_empty());
    // the text stays in the parent because <img> never opened a scope
    assert_eq!(text_content(ast, children[1]), "tail");
}

#[test]
fn test_second_root_element_is_rejected() {
    let result = compile("<div>a</div><div>b</div>");
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].msg.contains("exactly one root element"));
}

#[test]
fn test_v_for_on_root_is_rejected() {
    let result = compile(r#"<div v-for="item in items">x</div>"#);

    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].msg.contains("Cannot use v-for on stateful component root"));
    // the loop itself still compiles
    assert_eq!(
        result.render,
        r#"with(this){return _l((items),function(item){return _c('div',[_v("x")])})}"#
    );
}

#[test]
fn test_text_only_template_has_no_root() {
    let result = compile("just some text");

    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].msg.contains("requires a root element"));
    assert!(result.ast.root.is_none());
    assert_eq!(result.render, r#"with(this){return _c("div")}"#);
}

#[test]
fn test_text_after_the_root_is_dropped() {
    let result = compile("<div>x</div>trailing");

    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].msg.contains(r#"text "trailing" outside root element"#));

    // the root parsed normally without the trailer
    let ast = &result.ast;
    let root = ast.root.unwrap();
    assert_eq!(ast.element(root).children.len(), 1);
    assert_eq!(text_content(ast, ast.element(root).children[0]), "x");
    assert_eq!(result.render, r#"with(this){return _c('div',[_v("x")])}"#);
}

#[test]
fn test_root_conditional_branches_are_allowed() {
    let result = compile(r#"<p v-if="a">yes</p><p v-else>no</p>"#);
    assert!(result.errors.is_empty());

    let ast = &result.ast;
    assert_eq!(ast.element(ast.root.unwrap()).if_conditions.len(), 2);
    assert_eq!(
        result.render,
        r#"with(this){return (a)?_c('p',[_v("yes")]):_c('p',[_v("no")])}"#
    );
}

#[test]
fn test_dangling_else_aborts_the_branch() {
    let result = compile(r#"<div><span v-else>x</span></div>"#);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].msg.contains("without corresponding v-if"));
    // the branch is dropped from the tree
    assert!(element_children(&result.ast, result.ast.root.unwrap()).is_empty());
}

#[test]
fn test_text_between_branches_is_dropped() {
    let result = compile(r#"<div><span v-if="a">x</span> gap <span v-else>y</span></div>"#);

    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].msg.contains(r#"text "gap" between v-if and v-else(-if)"#));

    // the chain joins up across the removed text node
    let ast = &result.ast;
    let root = ast.root.unwrap();
    assert_eq!(ast.element(root).children.len(), 1);
    let anchor = ast.element(ast.element(root).children[0]);
    assert_eq!(anchor.if_conditions.len(), 2);
    assert_eq!(
        result.render,
        r#"with(this){return _c('div',[(a)?_c('span',[_v("x")]):_c('span',[_v("y")])])}"#
    );
}

#[test]
fn test_whitespace_between_elements_condenses() {
    let result = compile("<div>\n  <span>a</span>\n  <span>b</span>\n</div>");

    let ast = &result.ast;
    let children = ast.element(ast.root.unwrap()).children.clone();
    // leading run vanishes, the middle one condenses, the trailing one drops
    assert_eq!(children.len(), 3);
    assert_eq!(text_content(ast, children[1]), " ");
}

#[test]
fn test_element_offsets_cover_the_tags() {
    let result = compile("<div><span>x</span></div>");

    let ast = &result.ast;
    let root = ast.root.unwrap();
    assert_eq!(ast.element(root).start, 0);
    assert_eq!(ast.element(root).end, 25);
    let span = element_children(ast, root)[0];
    assert_eq!(ast.element(span).start, 5);
    assert_eq!(ast.element(span).end, 19);
}

#[test]
fn test_errors_accumulate_across_one_pass() {
    let result = compile(r#"<div id="a" id="b"><span v-else>x</span><i>ok</div>"#);

    assert_eq!(result.errors.len(), 3);
    assert!(result.errors[0].msg.contains("duplicate attribute"));
    assert!(result.errors[1].msg.contains("without corresponding v-if"));
    assert!(result.errors[2].msg.contains("no matching end tag"));

    // the valid part of the template still came through
    let ast = &result.ast;
    let children = element_children(ast, ast.root.unwrap());
    assert_eq!(children.len(), 1);
    assert_eq!(ast.element(children[0]).tag, "i");
}
