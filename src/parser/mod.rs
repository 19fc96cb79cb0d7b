pub mod text_parser;
pub mod tokenizer;
mod tree_builder;

pub(crate) use tree_builder::is_directive_name;

use crate::ast::Ast;
use crate::error::{CompileError, Warnings};
use crate::options::Merged;
use tree_builder::TreeBuilder;

/// Parses a template into its AST.
///
/// Tokenizer events stream straight into the tree builder; recoverable
/// anomalies land in `warnings` and parsing continues. Only a loop
/// expression that cannot be decomposed aborts the parse.
pub fn parse(template: &str, opts: &Merged, warnings: &mut Warnings) -> Result<Ast, CompileError> {
    let mut builder = TreeBuilder::new(template, opts, warnings);
    tokenizer::tokenize(template, opts, &mut builder)?;
    Ok(builder.finish())
}
