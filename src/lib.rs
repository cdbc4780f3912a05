//! # Lazy component compiler
//!
//! Compiles a `.lazy` component (a script region of ES module code followed
//! by a markup region) into an ES module that defines and registers a custom
//! element.
//!
//! ## Pipeline
//!
//! 1. **Split**: the first line-start or whitespace-preceded `<` begins the
//!    template region.
//! 2. **Parse**: the script goes through oxc and is lowered into the ESTree
//!    Tree Model; the template goes through html5ever with `{expr}` bindings
//!    resolved to `DataBinding` nodes.
//! 3. **Compile**: named exports become props, and the props become an element
//!    class with observed attributes, per-instance state in the constructor
//!    scope, and accessors for every prop.
//! 4. **Emit**: the output tree is printed as JavaScript.
//!
//! Every compilation owns its input tree and shares no state with others, so
//! callers may compile components in parallel.

mod boilerplate;
mod codegen;
mod compile;
mod error;
mod names;
mod parse;
mod props;
mod script;
mod split;
mod template;
pub mod tree;

#[cfg(feature = "napi")]
mod native;

#[cfg(test)]
mod compile_tests;

pub use boilerplate::{synthesize, ComponentBoilerplate};
pub use codegen::{emit_expression, emit_program, EmitOptions};
pub use compile::{classify, compile, compile_source, compile_with_options, Classified, CompileOptions};
pub use error::{CompilerError, ErrorKind, Result};
pub use names::{to_lower_camel_case, to_upper_camel_case};
pub use parse::parse_component;
pub use props::{extract_props, Prop};
pub use script::{parse_expression, parse_script};
pub use split::{split_regions, split_source, SourceRegions};
pub use template::parse_template;
pub use tree::Program;

#[cfg(feature = "napi")]
pub use native::{compile_native, compile_source_native, emit_native, parse_component_native};
