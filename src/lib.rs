//! Compiles HTML templates into render procedures.
//!
//! A template goes through four stages: the parser turns markup into an
//! AST, the optimizer marks subtrees that never change, codegen emits the
//! render procedure plus hoisted static renderers, and the detector walks
//! the finished AST for mistakes the earlier stages tolerate. [`Compiler`]
//! runs the whole pipeline; the stage modules are public for callers that
//! want a single step.

pub mod ast;
pub mod codegen;
pub mod compile;
pub mod detector;
pub mod error;
pub mod html;
pub mod optimizer;
pub mod options;
pub mod parser;

pub use ast::Ast;
pub use compile::{CompiledResult, Compiler};
pub use error::{CompileError, ErrorKind, Warning};
pub use options::{CompileOptions, CompilerConfig};
