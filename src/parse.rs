//! Parse Module for the Lazy compiler
//!
//! Turns one `.lazy` source text into a single module `Program`: the script
//! items first, then the template's top-level elements.

use tracing::debug;

use crate::error::Result;
use crate::script::parse_script;
use crate::split::split_regions;
use crate::template::parse_template;
use crate::tree::{Program, ProgramItem};

pub fn parse_component(source: &str) -> Result<Program> {
    let regions = split_regions(source);
    debug!(
        script_bytes = regions.script.len(),
        template_bytes = regions.template.len(),
        "split component source"
    );

    let mut body = parse_script(regions.script)?;
    body.extend(
        parse_template(regions.template)?
            .into_iter()
            .map(ProgramItem::Element),
    );

    Ok(Program::module(body))
}
