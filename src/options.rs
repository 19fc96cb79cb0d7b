use crate::ast::{Ast, Directive, Element, NodeId};
use crate::error::Warnings;
use crate::html;
use std::collections::HashMap;
use std::sync::Arc;

/// Tag-name predicate, swappable per compiler and per call.
pub type TagPredicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Element hooks contributed by a platform or a caller.
///
/// The transform phases receive the arena and the element's id so a hook can
/// rewrite the element in place or graft new nodes into the tree.
pub trait ElementModule: Send + Sync {
    /// Runs when the start tag is seen, before any directive extraction.
    fn pre_transform(&self, _ast: &mut Ast, _el: NodeId, _warnings: &mut Warnings) {}

    /// Runs while the element closes, between the structural directives and
    /// attribute processing.
    fn transform(&self, _ast: &mut Ast, _el: NodeId, _warnings: &mut Warnings) {}

    /// Runs after the element and its children are fully processed.
    fn post_transform(&self, _ast: &mut Ast, _el: NodeId, _warnings: &mut Warnings) {}

    /// Extra fragment for the element's data object, e.g. `staticClass:"a",`.
    /// Must end with a trailing comma when non-empty.
    fn gen_data(&self, _el: &Element) -> Option<String> {
        None
    }
}

/// What the generator should do about one parsed directive.
pub enum DirectiveCode {
    /// Fully handled at compile time.
    None,
    /// Unknown to the compiler: emit it into the data object for the
    /// runtime to resolve.
    Runtime,
    /// Wrap the finished data object expression.
    WrapData(Box<dyn FnOnce(String) -> String>),
    /// Wrap the listener map expression.
    WrapListeners(Box<dyn FnOnce(String) -> String>),
}

/// Compile-time handler for a named directive.
pub trait DirectiveGen: Send + Sync {
    fn generate(&self, el: &Element, dir: &Directive, warnings: &mut Warnings) -> DirectiveCode;
}

/// `v-bind` without an argument: spread a whole object into the data.
struct BindDirective;

impl DirectiveGen for BindDirective {
    fn generate(&self, el: &Element, dir: &Directive, _warnings: &mut Warnings) -> DirectiveCode {
        let tag = el.tag.clone();
        let value = dir.value.clone();
        let prop = dir.modifiers.contains("prop");
        let sync = dir.modifiers.contains("sync");
        DirectiveCode::WrapData(Box::new(move |code| {
            format!(
                "_b({},'{}',{},{}{})",
                code,
                tag,
                value,
                prop,
                if sync { ",true" } else { "" }
            )
        }))
    }
}

/// `v-on` without an argument: merge a whole listener object.
struct OnDirective;

impl DirectiveGen for OnDirective {
    fn generate(&self, _el: &Element, dir: &Directive, warnings: &mut Warnings) -> DirectiveCode {
        if !dir.modifiers.is_empty() {
            warnings.warn("v-on without an argument does not support modifiers.", None, None);
        }
        let value = dir.value.clone();
        DirectiveCode::WrapListeners(Box::new(move |code| format!("_g({},{})", code, value)))
    }
}

/// `v-cloak` has no compile-time or runtime effect beyond the attribute.
struct CloakDirective;

impl DirectiveGen for CloakDirective {
    fn generate(&self, _el: &Element, _dir: &Directive, _warnings: &mut Warnings) -> DirectiveCode {
        DirectiveCode::None
    }
}

/// Base configuration a [`crate::compile::Compiler`] is built with.
pub struct CompilerConfig {
    pub expect_html: bool,
    pub modules: Vec<Arc<dyn ElementModule>>,
    pub directives: HashMap<String, Arc<dyn DirectiveGen>>,
    pub is_unary_tag: TagPredicate,
    pub can_be_left_open_tag: TagPredicate,
    pub is_reserved_tag: TagPredicate,
    pub is_pre_tag: TagPredicate,
    pub optimize: bool,
    pub delimiters: (String, String),
    pub comments: bool,
    pub output_source_range: bool,
    pub should_decode_newlines: bool,
    pub should_decode_newlines_for_href: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        let mut directives: HashMap<String, Arc<dyn DirectiveGen>> = HashMap::new();
        directives.insert("bind".to_string(), Arc::new(BindDirective));
        directives.insert("on".to_string(), Arc::new(OnDirective));
        directives.insert("cloak".to_string(), Arc::new(CloakDirective));
        Self {
            expect_html: true,
            modules: Vec::new(),
            directives,
            is_unary_tag: Arc::new(html::is_void_element),
            can_be_left_open_tag: Arc::new(html::can_be_left_open),
            is_reserved_tag: Arc::new(html::is_reserved_element),
            is_pre_tag: Arc::new(|tag: &str| tag == "pre"),
            optimize: true,
            delimiters: ("{{".to_string(), "}}".to_string()),
            comments: false,
            output_source_range: false,
            should_decode_newlines: false,
            should_decode_newlines_for_href: false,
        }
    }
}

/// Per-call overrides. Every field defaults to "keep the compiler setting";
/// `modules` concatenates after the base list and `directives` merge over
/// the base map, everything else overwrites.
#[derive(Clone, Default)]
pub struct CompileOptions {
    pub modules: Option<Vec<Arc<dyn ElementModule>>>,
    pub directives: Option<HashMap<String, Arc<dyn DirectiveGen>>>,
    pub is_unary_tag: Option<TagPredicate>,
    pub can_be_left_open_tag: Option<TagPredicate>,
    pub optimize: Option<bool>,
    pub delimiters: Option<(String, String)>,
    pub comments: Option<bool>,
    pub output_source_range: Option<bool>,
    pub should_decode_newlines: Option<bool>,
    pub should_decode_newlines_for_href: Option<bool>,
}

/// Fully resolved options for one compile call.
pub struct Merged {
    pub expect_html: bool,
    pub modules: Vec<Arc<dyn ElementModule>>,
    pub directives: HashMap<String, Arc<dyn DirectiveGen>>,
    pub is_unary_tag: TagPredicate,
    pub can_be_left_open_tag: TagPredicate,
    pub is_reserved_tag: TagPredicate,
    pub is_pre_tag: TagPredicate,
    pub optimize: bool,
    pub delimiters: (String, String),
    pub comments: bool,
    pub output_source_range: bool,
    pub should_decode_newlines: bool,
    pub should_decode_newlines_for_href: bool,
}

impl CompilerConfig {
    pub fn merge(&self, options: &CompileOptions) -> Merged {
        let mut modules = self.modules.clone();
        if let Some(extra) = &options.modules {
            modules.extend(extra.iter().cloned());
        }
        let mut directives = self.directives.clone();
        if let Some(extra) = &options.directives {
            for (name, handler) in extra {
                directives.insert(name.clone(), Arc::clone(handler));
            }
        }
        Merged {
            expect_html: self.expect_html,
            modules,
            directives,
            is_unary_tag: options
                .is_unary_tag
                .clone()
                .unwrap_or_else(|| Arc::clone(&self.is_unary_tag)),
            can_be_left_open_tag: options
                .can_be_left_open_tag
                .clone()
                .unwrap_or_else(|| Arc::clone(&self.can_be_left_open_tag)),
            is_reserved_tag: Arc::clone(&self.is_reserved_tag),
            is_pre_tag: Arc::clone(&self.is_pre_tag),
            optimize: options.optimize.unwrap_or(self.optimize),
            delimiters: options.delimiters.clone().unwrap_or_else(|| self.delimiters.clone()),
            comments: options.comments.unwrap_or(self.comments),
            output_source_range: options.output_source_range.unwrap_or(self.output_source_range),
            should_decode_newlines: options
                .should_decode_newlines
                .unwrap_or(self.should_decode_newlines),
            should_decode_newlines_for_href: options
                .should_decode_newlines_for_href
                .unwrap_or(self.should_decode_newlines_for_href),
        }
    }
}
