//! Node bindings. Trees cross the boundary as ESTree JSON.

use napi_derive::napi;
use serde::de::DeserializeOwned;
use std::fmt::Display;

use crate::codegen::{emit_program, EmitOptions};
use crate::compile::{compile_source, compile_with_options, CompileOptions};
use crate::parse::parse_component;
use crate::tree::Program;

fn to_napi_error(error: impl Display) -> napi::Error {
    napi::Error::from_reason(error.to_string())
}

fn from_json<T: DeserializeOwned + Default>(value: Option<serde_json::Value>) -> napi::Result<T> {
    match value {
        Some(value) => serde_json::from_value(value).map_err(to_napi_error),
        None => Ok(T::default()),
    }
}

#[napi]
pub fn compile_native(
    name: String,
    program: serde_json::Value,
    options: Option<serde_json::Value>,
) -> napi::Result<serde_json::Value> {
    let program: Program = serde_json::from_value(program).map_err(to_napi_error)?;
    let options: CompileOptions = from_json(options)?;
    let output = compile_with_options(&name, program, &options).map_err(to_napi_error)?;
    serde_json::to_value(output).map_err(to_napi_error)
}

/// Compile `.lazy` source text straight to JavaScript.
#[napi]
pub fn compile_source_native(
    name: String,
    source: String,
    options: Option<serde_json::Value>,
) -> napi::Result<String> {
    let options: CompileOptions = from_json(options)?;
    let output = compile_source(&name, &source, &options).map_err(to_napi_error)?;
    emit_program(&output, &EmitOptions::default()).map_err(to_napi_error)
}

#[napi]
pub fn parse_component_native(source: String) -> napi::Result<serde_json::Value> {
    let program = parse_component(&source).map_err(to_napi_error)?;
    serde_json::to_value(program).map_err(to_napi_error)
}

#[napi]
pub fn emit_native(
    program: serde_json::Value,
    options: Option<serde_json::Value>,
) -> napi::Result<String> {
    let program: Program = serde_json::from_value(program).map_err(to_napi_error)?;
    let options: EmitOptions = from_json(options)?;
    emit_program(&program, &options).map_err(to_napi_error)
}
