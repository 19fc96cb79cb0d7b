use crate::ast::{Ast, AstNode};
use crate::codegen;
use crate::detector;
use crate::error::{CompileError, Warning, Warnings};
use crate::optimizer;
use crate::options::{CompileOptions, CompilerConfig};
use crate::parser;
use log::debug;
use serde::Serialize;

/// Everything one compile call produces. Immutable once returned.
///
/// `errors` are conditions the consumer should treat as compile failures;
/// `tips` are advisory. Both keep the order they were recorded in.
#[derive(Debug, Serialize)]
pub struct CompiledResult {
    pub ast: Ast,
    pub render: String,
    pub static_render_fns: Vec<String>,
    pub errors: Vec<Warning>,
    pub tips: Vec<Warning>,
}

/// Template compiler with a fixed base configuration.
///
/// One compiler serves any number of [`Compiler::compile`] calls; all
/// per-call state (arena, stacks, diagnostics) lives in the call frame, so
/// concurrent calls never interfere.
pub struct Compiler {
    base: CompilerConfig,
}

impl Compiler {
    pub fn new(base: CompilerConfig) -> Self {
        Self { base }
    }

    /// Compiles a template against the base configuration plus per-call
    /// overrides.
    ///
    /// Recoverable anomalies land in the result's `errors`/`tips` lists;
    /// `Err` is reserved for control-flow expressions that cannot be
    /// compiled at all.
    pub fn compile(
        &self,
        template: &str,
        options: &CompileOptions,
    ) -> Result<CompiledResult, CompileError> {
        let merged = self.base.merge(options);
        let trimmed = template.trim();
        // warnings report positions in the caller's untrimmed template
        let offset = template.len() - template.trim_start().len();
        debug!("compile: {} chars ({} trimmed)", trimmed.len(), template.len() - trimmed.len());
        let mut warnings = Warnings::new(merged.output_source_range, offset);
        let mut ast = parser::parse(trimmed, &merged, &mut warnings)?;
        debug!("parse: {} errors, {} tips", warnings.errors.len(), warnings.tips.len());
        if merged.optimize {
            optimizer::optimize(&mut ast, &merged);
            debug!("optimize: {} static roots", count_static_roots(&ast));
        }
        let code = codegen::generate(&ast, &merged, &mut warnings);
        debug!(
            "generate: {} chars, {} static fns",
            code.render.len(),
            code.static_render_fns.len()
        );
        detector::detect(&ast, &merged, &mut warnings);
        Ok(CompiledResult {
            ast,
            render: code.render,
            static_render_fns: code.static_render_fns,
            errors: warnings.errors,
            tips: warnings.tips,
        })
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new(CompilerConfig::default())
    }
}

fn count_static_roots(ast: &Ast) -> usize {
    ast.nodes()
        .filter(|node| matches!(node, AstNode::Element(el) if el.static_root))
        .count()
}

// === Tests ===
