//! End-to-end compilation tests: ESTree input and `.lazy` source through to
//! emitted JavaScript.

use serde_json::json;

use crate::codegen::{emit_program, EmitOptions};
use crate::compile::{compile, compile_source, CompileOptions};
use crate::error::ErrorKind;
use crate::tree::{
    ClassMember, Declaration, Expression, MethodKind, Program, ProgramItem, Statement,
    VariableKind,
};

fn heading_program() -> Program {
    serde_json::from_value(json!({
        "type": "Program",
        "sourceType": "module",
        "body": [{
            "type": "ExportNamedDeclaration",
            "declaration": {
                "type": "VariableDeclaration",
                "kind": "let",
                "declarations": [{
                    "type": "VariableDeclarator",
                    "id": { "type": "Identifier", "name": "title" },
                    "init": { "type": "Literal", "value": "Hello World!" }
                }]
            },
            "specifiers": [],
            "source": null
        }]
    }))
    .unwrap()
}

fn class_members(program: &Program) -> &[ClassMember] {
    let Some(ProgramItem::ExportNamedDeclaration(export)) = program.body.first() else {
        panic!("expected the exported class first");
    };
    let Some(Declaration::ClassDeclaration(class)) = &export.declaration else {
        panic!("expected a class declaration");
    };
    &class.body.body
}

const HEADING_JS: &str = "\
export class Heading1 extends HTMLElement {
  static get observedAttributes() {
    return ['title']
  }
  title
  constructor() {
    super()
    let title = 'Hello World!'
    Object.defineProperties(this, {
      title: {
        get: () => title,
        set: (value) => {
          title = value
        }
      }
    })
  }
  connectedCallback() {}
  attributeChangedCallback(name, oldValue, newValue) {
    this[name] = newValue
  }
  disconnectedCallback() {}
}
customElements.define('heading-1', Heading1)
";

#[test]
fn test_heading_from_estree() {
    let output = compile("heading-1", heading_program()).unwrap();
    let members = class_members(&output);

    let ClassMember::MethodDefinition(observed) = &members[0] else {
        panic!("expected observedAttributes first");
    };
    assert_eq!(observed.kind, MethodKind::Get);
    assert!(observed.is_static);
    assert_eq!(
        observed.value.body.body,
        vec![Statement::returns(Expression::array(vec![Expression::string(
            "title"
        )]))]
    );

    let ClassMember::MethodDefinition(constructor) = &members[2] else {
        panic!("expected the constructor after the instance field");
    };
    assert_eq!(constructor.kind, MethodKind::Constructor);
    let Statement::VariableDeclaration(title) = &constructor.value.body.body[1] else {
        panic!("expected the backing binding after super()");
    };
    assert_eq!(title.kind, VariableKind::Let);
    assert_eq!(
        title.declarations[0].init,
        Some(Expression::string("Hello World!"))
    );
}

#[test]
fn test_heading_emits_element_module() {
    let output = compile("heading-1", heading_program()).unwrap();
    let js = emit_program(&output, &EmitOptions::default()).unwrap();
    assert_eq!(js, HEADING_JS);
}

#[test]
fn test_compile_source_matches_estree_input() {
    let source = "export let title = 'Hello World!'\n\n<div role=\"heading\">{title}</div>\n";
    let from_source = compile_source("heading-1", source, &CompileOptions::default()).unwrap();
    let from_estree = compile("heading-1", heading_program()).unwrap();
    assert_eq!(from_source, from_estree);
}

#[test]
fn test_compilation_is_deterministic() {
    let first = compile("heading-1", heading_program()).unwrap();
    let second = compile("heading-1", heading_program()).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_imports_are_hoisted_above_the_class() {
    let source = "import { format } from './format.js'\nexport let count = 0\nexport function label() { return format(count) }\n<p>{label()}</p>";
    let output = compile_source("counter-label", source, &CompileOptions::default()).unwrap();
    let js = emit_program(&output, &EmitOptions::default()).unwrap();

    assert!(js.starts_with("import { format } from './format.js'\nexport class CounterLabel extends HTMLElement {"));
    assert!(js.contains("return ['count']"));
    assert!(js.contains("const label = function label() {"));
    assert!(js.ends_with("customElements.define('counter-label', CounterLabel)\n"));
}

#[test]
fn test_options_change_base_class_and_registry() {
    let options = CompileOptions {
        base_class: "BaseElement".to_string(),
        registry: "window.registry".to_string(),
        export_class: false,
        file_path: String::new(),
    };
    let output = compile_source("x-a", "export let a", &options).unwrap();
    let js = emit_program(&output, &EmitOptions::default()).unwrap();

    assert!(js.starts_with("class XA extends BaseElement {"));
    assert!(js.ends_with("window.registry.define('x-a', XA)\n"));
}

#[test]
fn test_rejections_surface_from_source() {
    let cases = [
        ("export default 1", ErrorKind::UnsupportedExportShape),
        ("export * from './x.js'", ErrorKind::UnsupportedExportShape),
        ("export let { a } = b", ErrorKind::UnsupportedBindingPattern),
        ("export class Widget {}", ErrorKind::UnsupportedDeclarationShape),
        ("export { a } from './a.js'", ErrorKind::UnsupportedExportShape),
    ];
    for (source, kind) in cases {
        let options = CompileOptions {
            file_path: "widget.lazy".to_string(),
            ..CompileOptions::default()
        };
        let err = compile_source("x-widget", source, &options).unwrap_err();
        assert_eq!(err.kind, kind, "{}", source);
        assert_eq!(err.file, "widget.lazy");
    }
}

#[test]
fn test_modifier_named_props_stay_fields() {
    let output = compile_source("x-a", "export let get = 1\n<p></p>", &CompileOptions::default())
        .unwrap();
    let js = emit_program(&output, &EmitOptions::default()).unwrap();

    assert!(js.contains("  get;\n  constructor() {\n"));
    assert!(js.contains("      get: {\n        get: () => get,"));
}

#[test]
fn test_aliases_sharing_an_accessor_are_rejected() {
    let source = "export let a = 1\nexport { a as \"foo-bar\", a as fooBar }";
    let err = compile_source("x-a", source, &CompileOptions::default()).unwrap_err();
    assert_eq!(err.kind, ErrorKind::DuplicateProp);
}

#[test]
fn test_file_stem_without_class_name_is_rejected() {
    let err = compile_source("1-card", "export let a", &CompileOptions::default()).unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidComponentName);
}
