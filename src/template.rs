//! Template region parsing.
//!
//! `{expr}` bindings are swapped for placeholders so html5ever sees plain
//! markup, then the DOM is converted back into `Element` nodes with each
//! placeholder resolved to a `DataBinding`.

use html5ever::tendril::TendrilSink;
use html5ever::{parse_fragment, LocalName, Namespace, QualName};
use lazy_static::lazy_static;
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use regex::Regex;
use tracing::debug;

use crate::error::{CompilerError, ErrorKind, Result};
use crate::script::parse_expression;
use crate::tree::{
    Attribute, AttributeValue, DataBinding, Element, ElementChild, Expression, Literal,
};

const BINDING_PLACEHOLDER_PREFIX: &str = "__LAZY_BINDING_";
const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

lazy_static! {
    static ref BINDING_PLACEHOLDER_RE: Regex = Regex::new(r"__LAZY_BINDING_(\d+)__").unwrap();
}

// ═══════════════════════════════════════════════════════════════════════════════
// BINDING NORMALIZATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Byte index just past the `}` closing the brace at `start`, skipping over
/// string and template literals. `None` if the brace is never closed.
fn find_balanced_brace_end(text: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string: Option<char> = None;
    let mut in_template_literal = false;
    let mut template_brace_depth = 0usize;
    let mut chars = text[start..].char_indices().peekable();

    while let Some((offset, c)) = chars.next() {
        if c == '\\' {
            chars.next();
            continue;
        }

        if let Some(quote) = in_string {
            if c == quote {
                in_string = None;
            }
            continue;
        }

        if in_template_literal {
            if c == '`' && template_brace_depth == 0 {
                in_template_literal = false;
            } else if c == '$' && matches!(chars.peek(), Some((_, '{'))) {
                template_brace_depth += 1;
                chars.next();
            } else if c == '}' && template_brace_depth > 0 {
                template_brace_depth -= 1;
            }
            continue;
        }

        match c {
            '"' | '\'' => in_string = Some(c),
            '`' => in_template_literal = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(start + offset + 1);
                }
            }
            _ => {}
        }
    }

    None
}

/// Replace every balanced `{...}` with `__LAZY_BINDING_<n>__`, returning the
/// rewritten text and the binding sources by index. HTML comments are copied
/// through untouched; an unclosed `{` stays literal text.
fn normalize_bindings(text: &str) -> (String, Vec<String>) {
    let mut normalized = String::with_capacity(text.len());
    let mut bindings = Vec::new();
    let mut i = 0;

    while i < text.len() {
        let rest = &text[i..];

        if rest.starts_with("<!--") {
            let end = rest.find("-->").map(|e| e + 3).unwrap_or(rest.len());
            normalized.push_str(&rest[..end]);
            i += end;
            continue;
        }

        if rest.starts_with('{') {
            if let Some(end) = find_balanced_brace_end(text, i) {
                normalized.push_str(&format!("{}{}__", BINDING_PLACEHOLDER_PREFIX, bindings.len()));
                bindings.push(text[i + 1..end - 1].to_string());
                i = end;
                continue;
            }
        }

        let c = rest.chars().next().unwrap_or_default();
        normalized.push(c);
        i += c.len_utf8().max(1);
    }

    (normalized, bindings)
}

fn binding_expression(code: &str) -> Result<Expression> {
    parse_expression(code).map_err(|error| {
        if error.kind != ErrorKind::ScriptSyntax {
            return error;
        }
        let mut template_error = CompilerError::new(
            ErrorKind::TemplateSyntax,
            format!("Invalid binding expression `{{{}}}`", code.trim()),
        )
        .with_context(code.trim());
        template_error.hints = error.hints;
        template_error
    })
}

// ═══════════════════════════════════════════════════════════════════════════════
// DOM CONVERSION
// ═══════════════════════════════════════════════════════════════════════════════

enum Fragment<'t> {
    Text(&'t str),
    Binding(Expression),
}

struct TemplateBuilder {
    bindings: Vec<Expression>,
}

impl TemplateBuilder {
    /// Split `text` at binding placeholders. Placeholders that do not name a
    /// known binding are left as text.
    fn fragments<'t>(&self, text: &'t str) -> Vec<Fragment<'t>> {
        let mut fragments = Vec::new();
        let mut last_end = 0;

        for caps in BINDING_PLACEHOLDER_RE.captures_iter(text) {
            let (Some(whole), Some(index)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let Some(expression) = index
                .as_str()
                .parse::<usize>()
                .ok()
                .and_then(|i| self.bindings.get(i))
            else {
                continue;
            };

            if whole.start() > last_end {
                fragments.push(Fragment::Text(&text[last_end..whole.start()]));
            }
            // Cloned: html5ever may duplicate formatting elements and their attributes.
            fragments.push(Fragment::Binding(expression.clone()));
            last_end = whole.end();
        }

        if last_end < text.len() {
            fragments.push(Fragment::Text(&text[last_end..]));
        }
        fragments
    }

    fn attribute(&self, name: &str, value: &str) -> Attribute {
        let value = self
            .fragments(value)
            .into_iter()
            .filter_map(|fragment| match fragment {
                Fragment::Text("") => None,
                Fragment::Text(text) => Some(AttributeValue::Literal(Literal::string(text))),
                Fragment::Binding(expression) => {
                    Some(AttributeValue::DataBinding(DataBinding { expression }))
                }
            })
            .collect();

        Attribute {
            name: name.to_string(),
            value,
        }
    }

    fn children(&self, handle: &Handle) -> Vec<ElementChild> {
        let mut children = Vec::new();
        for child in handle.children.borrow().iter() {
            match &child.data {
                NodeData::Text { contents } => {
                    let text = contents.borrow();
                    for fragment in self.fragments(&text) {
                        match fragment {
                            Fragment::Text(text) if text.trim().is_empty() => {}
                            Fragment::Text(text) => {
                                children.push(ElementChild::Literal(Literal::string(text)))
                            }
                            Fragment::Binding(expression) => {
                                children.push(ElementChild::DataBinding(DataBinding { expression }))
                            }
                        }
                    }
                }
                NodeData::Element { .. } => {
                    if let Some(element) = self.element(child) {
                        children.push(ElementChild::Element(element));
                    }
                }
                NodeData::Document
                | NodeData::Doctype { .. }
                | NodeData::Comment { .. }
                | NodeData::ProcessingInstruction { .. } => {}
            }
        }
        children
    }

    fn element(&self, handle: &Handle) -> Option<Element> {
        let NodeData::Element {
            name,
            attrs,
            template_contents,
            ..
        } = &handle.data
        else {
            return None;
        };

        let attributes = attrs
            .borrow()
            .iter()
            .map(|attr| self.attribute(&attr.name.local, &attr.value))
            .collect();

        // `<template>` children live in a separate document fragment.
        let children = match template_contents.borrow().as_ref() {
            Some(contents) => self.children(contents),
            None => self.children(handle),
        };

        Some(Element {
            tag: name.local.to_string(),
            attributes,
            children,
        })
    }

    /// Top-level elements in document order. The `html` root of the
    /// fragment and any `head`/`body` wrappers are flattened away; stray
    /// text is dropped.
    fn collect(&self, handle: &Handle, elements: &mut Vec<Element>) {
        match &handle.data {
            NodeData::Document => {
                for child in handle.children.borrow().iter() {
                    self.collect(child, elements);
                }
            }
            NodeData::Element { name, .. } => match &*name.local {
                "html" | "head" | "body" => {
                    for child in handle.children.borrow().iter() {
                        self.collect(child, elements);
                    }
                }
                _ => {
                    if let Some(element) = self.element(handle) {
                        elements.push(element);
                    }
                }
            },
            _ => {}
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// MAIN PARSING FUNCTION
// ═══════════════════════════════════════════════════════════════════════════════

/// Parse a template region into its top-level elements.
pub fn parse_template(text: &str) -> Result<Vec<Element>> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    if text.contains(BINDING_PLACEHOLDER_PREFIX) {
        return Err(CompilerError::new(
            ErrorKind::TemplateSyntax,
            format!("`{}` is reserved for binding placeholders", BINDING_PLACEHOLDER_PREFIX),
        )
        .with_context(BINDING_PLACEHOLDER_PREFIX));
    }

    let (normalized, sources) = normalize_bindings(text);
    let bindings = sources
        .iter()
        .map(|code| binding_expression(code))
        .collect::<Result<Vec<_>>>()?;

    // A `<template>` context accepts any content model, so table parts such
    // as `<tr>` keep their elements instead of being foster-parented away.
    let context = QualName::new(
        None,
        Namespace::from(HTML_NAMESPACE),
        LocalName::from("template"),
    );
    let dom = parse_fragment(RcDom::default(), Default::default(), context, Vec::new())
        .from_utf8()
        .read_from(&mut normalized.as_bytes())
        .map_err(|e| {
            CompilerError::new(
                ErrorKind::TemplateSyntax,
                format!("Failed to parse template: {}", e),
            )
        })?;

    let builder = TemplateBuilder { bindings };
    let mut elements = Vec::new();
    builder.collect(&dom.document, &mut elements);

    debug!(
        elements = elements.len(),
        bindings = builder.bindings.len(),
        "parsed template region"
    );
    Ok(elements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{BinaryExpression, BinaryOperator, TemplateLiteral};

    fn binding(name: &str) -> DataBinding {
        DataBinding {
            expression: Expression::identifier(name),
        }
    }

    #[test]
    fn test_balanced_brace_end() {
        assert_eq!(find_balanced_brace_end("{a}", 0), Some(3));
        assert_eq!(find_balanced_brace_end("x {{a: 1}} y", 2), Some(10));
        assert_eq!(find_balanced_brace_end("{'}'}", 0), Some(5));
        assert_eq!(find_balanced_brace_end("{`${a}}`}", 0), Some(9));
        assert_eq!(find_balanced_brace_end("{a", 0), None);
    }

    #[test]
    fn test_normalize_bindings() {
        let (normalized, bindings) = normalize_bindings("<p class={cls}>{a < b} {</p>");
        assert_eq!(
            normalized,
            "<p class=__LAZY_BINDING_0__>__LAZY_BINDING_1__ {</p>"
        );
        assert_eq!(bindings, vec!["cls".to_string(), "a < b".to_string()]);
    }

    #[test]
    fn test_comments_are_not_normalized() {
        let (normalized, bindings) = normalize_bindings("<!-- {x} --><p></p>");
        assert_eq!(normalized, "<!-- {x} --><p></p>");
        assert!(bindings.is_empty());
    }

    #[test]
    fn test_heading_with_binding() {
        let elements = parse_template("\n\n<div role=\"heading\">{title}</div>").unwrap();
        assert_eq!(
            elements,
            vec![Element {
                tag: "div".to_string(),
                attributes: vec![Attribute {
                    name: "role".to_string(),
                    value: vec![AttributeValue::Literal(Literal::string("heading"))],
                }],
                children: vec![ElementChild::DataBinding(binding("title"))],
            }]
        );
    }

    #[test]
    fn test_mixed_attribute_value() {
        let elements = parse_template("<p class=\"card {variant}\" hidden></p>").unwrap();
        let attributes = &elements[0].attributes;
        assert_eq!(
            attributes[0].value,
            vec![
                AttributeValue::Literal(Literal::string("card ")),
                AttributeValue::DataBinding(binding("variant")),
            ]
        );
        assert_eq!(attributes[1].name, "hidden");
        assert!(attributes[1].value.is_empty());
    }

    #[test]
    fn test_text_and_bindings_keep_order() {
        let elements = parse_template("<p>Hello, {name}! You are {age + 1}.</p>").unwrap();
        assert_eq!(
            elements[0].children,
            vec![
                ElementChild::Literal(Literal::string("Hello, ")),
                ElementChild::DataBinding(binding("name")),
                ElementChild::Literal(Literal::string("! You are ")),
                ElementChild::DataBinding(DataBinding {
                    expression: Expression::BinaryExpression(Box::new(BinaryExpression {
                        operator: BinaryOperator::Add,
                        left: Expression::identifier("age"),
                        right: Expression::Literal(Literal::new(
                            crate::tree::LiteralValue::Number(1.0)
                        )),
                    })),
                }),
                ElementChild::Literal(Literal::string(".")),
            ]
        );
    }

    #[test]
    fn test_whitespace_comments_and_stray_text_dropped() {
        let elements =
            parse_template("stray\n<ul>\n  <!-- items -->\n  <li>one</li>\n</ul>\n<p></p>").unwrap();
        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0].tag, "ul");
        assert_eq!(elements[0].children.len(), 1);
        assert_eq!(elements[1].tag, "p");
    }

    #[test]
    fn test_template_literal_binding() {
        let elements = parse_template("<span>{`${a}-b`}</span>").unwrap();
        let ElementChild::DataBinding(DataBinding {
            expression: Expression::TemplateLiteral(TemplateLiteral { expressions, .. }),
        }) = &elements[0].children[0]
        else {
            panic!("expected a template literal binding");
        };
        assert_eq!(expressions, &vec![Expression::identifier("a")]);
    }

    #[test]
    fn test_invalid_binding() {
        let err = parse_template("<p>{a +}</p>").unwrap_err();
        assert_eq!(err.kind, ErrorKind::TemplateSyntax);
        assert_eq!(err.context.as_deref(), Some("a +"));
    }

    #[test]
    fn test_binding_must_be_one_expression() {
        for source in ["<p>{a b}</p>", "<p>{x)}</p>", "<p>{a; b}</p>"] {
            let err = parse_template(source).unwrap_err();
            assert_eq!(err.kind, ErrorKind::TemplateSyntax, "{}", source);
        }
    }

    #[test]
    fn test_table_parts_keep_bindings() {
        let elements = parse_template("<tr><td>{x}</td></tr>").unwrap();
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].tag, "tr");
        let ElementChild::Element(cell) = &elements[0].children[0] else {
            panic!("expected a cell");
        };
        assert_eq!(cell.tag, "td");
        assert_eq!(cell.children, vec![ElementChild::DataBinding(binding("x"))]);
    }

    #[test]
    fn test_placeholder_prefix_is_reserved() {
        let err = parse_template("<p>__LAZY_BINDING_0__</p>").unwrap_err();
        assert_eq!(err.kind, ErrorKind::TemplateSyntax);
    }

    #[test]
    fn test_empty_template() {
        assert!(parse_template("  \n").unwrap().is_empty());
    }
}
