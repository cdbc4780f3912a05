//! Boilerplate synthesis.
//!
//! Builds the custom-element class for a component from its prop list. The
//! class members always appear in the same order: `observedAttributes`,
//! instance fields, `constructor`, `connectedCallback`,
//! `attributeChangedCallback`, `disconnectedCallback`, then extra methods.
//! Prop state lives in `let`/`const` bindings of the constructor scope and is
//! exposed through accessors defined on the instance, so every instance owns
//! independent state.

use std::collections::{HashMap, HashSet};

use oxc_syntax::identifier::is_identifier_name;
use tracing::debug;

use crate::compile::CompileOptions;
use crate::error::{CompilerError, ErrorKind, Result};
use crate::names::{to_lower_camel_case, to_upper_camel_case};
use crate::props::Prop;
use crate::tree::{
    ArrowBody, ArrowFunction, BlockStatement, Class, ClassBody, ClassMember, Declaration,
    ExportNamedDeclaration, Expression, Function, Identifier, ImportDeclaration, MemberExpression,
    MethodDefinition, MethodKind, Pattern, Program, ProgramItem, Property, PropertyDefinition, Statement,
    VariableDeclaration, VariableKind,
};

// ═══════════════════════════════════════════════════════════════════════════════
// CLASS PARTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Property key for `name`: a bare identifier when possible, else a string.
fn property_key(name: &str) -> Expression {
    if is_identifier_name(name) {
        Expression::identifier(name)
    } else {
        Expression::string(name)
    }
}

/// `a.b.c` as a member chain; a plain name stays an identifier.
fn dotted_path(path: &str) -> Expression {
    let mut segments = path.split('.');
    let head = Expression::identifier(segments.next().unwrap_or_default());
    segments.fold(head, Expression::member)
}

/// String literals for every prop that can change after construction.
pub fn observed_attributes(props: &[Prop]) -> Vec<Expression> {
    props
        .iter()
        .filter(|prop| !prop.constant)
        .map(|prop| Expression::string(&prop.external_name))
        .collect()
}

/// One value-less field per prop; the shape only, state lives in the constructor.
pub fn public_instance_fields(props: &[Prop]) -> Vec<ClassMember> {
    props
        .iter()
        .map(|prop| {
            ClassMember::PropertyDefinition(PropertyDefinition {
                key: property_key(&prop.external_name),
                value: None,
                computed: false,
                is_static: false,
            })
        })
        .collect()
}

/// `let`/`const` backing bindings, one per prop.
pub fn scope_definitions(props: &[Prop]) -> Vec<Statement> {
    props
        .iter()
        .map(|prop| {
            let kind = if prop.constant {
                VariableKind::Const
            } else {
                VariableKind::Let
            };
            Statement::VariableDeclaration(VariableDeclaration::single(
                kind,
                &prop.internal_name,
                prop.initial_value.clone(),
            ))
        })
        .collect()
}

fn accessor(prop: &Prop) -> Property {
    let mut descriptor = vec![Property::init(
        Expression::identifier("get"),
        Expression::ArrowFunctionExpression(Box::new(ArrowFunction {
            params: vec![],
            body: ArrowBody::Expression(Box::new(Expression::identifier(&prop.internal_name))),
            expression: true,
            is_async: false,
        })),
    )];

    if !prop.constant {
        let assignment = Expression::assign(
            Pattern::identifier(&prop.internal_name),
            Expression::identifier("value"),
        );
        descriptor.push(Property::init(
            Expression::identifier("set"),
            Expression::ArrowFunctionExpression(Box::new(ArrowFunction {
                params: vec![Pattern::identifier("value")],
                body: ArrowBody::BlockStatement(BlockStatement::new(vec![Statement::expression(
                    assignment,
                )])),
                expression: false,
                is_async: false,
            })),
        ));
    }

    Property::init(
        property_key(&to_lower_camel_case(&prop.external_name)),
        Expression::object(descriptor),
    )
}

/// `Object.defineProperties(this, { ... })` exposing every prop.
pub fn property_definitions(props: &[Prop]) -> Statement {
    Statement::expression(Expression::call(
        Expression::member(Expression::identifier("Object"), "defineProperties"),
        vec![
            Expression::ThisExpression,
            Expression::object(props.iter().map(accessor).collect()),
        ],
    ))
}

/// `this[name] = newValue`, forwarding attribute changes to the accessors.
pub fn attribute_changed_callback_body(_props: &[Prop]) -> Vec<Statement> {
    vec![Statement::expression(Expression::assign(
        Pattern::MemberExpression(Box::new(MemberExpression {
            object: Expression::ThisExpression,
            property: Expression::identifier("name"),
            computed: true,
            optional: false,
        })),
        Expression::identifier("newValue"),
    ))]
}

// ═══════════════════════════════════════════════════════════════════════════════
// COMPONENT BOILERPLATE
// ═══════════════════════════════════════════════════════════════════════════════

/// The variable parts of a generated component module.
#[derive(Debug, Clone, Default)]
pub struct ComponentBoilerplate {
    /// Tag name, e.g. `heading-1`.
    pub name: String,
    pub imports: Vec<ImportDeclaration>,
    pub observed_attributes: Vec<Expression>,
    pub class_property_definitions: Vec<ClassMember>,
    /// Statements after `super()`.
    pub class_constructor_body: Vec<Statement>,
    pub attribute_changed_callback_body: Vec<Statement>,
    pub class_method_definitions: Vec<MethodDefinition>,
}

impl ComponentBoilerplate {
    pub fn class_name(&self) -> String {
        to_upper_camel_case(&self.name)
    }

    pub fn into_program(self, options: &CompileOptions) -> Program {
        let class_name = self.class_name();

        let observed_attributes = MethodDefinition {
            key: Expression::identifier("observedAttributes"),
            value: Function::anonymous(
                vec![],
                vec![Statement::returns(Expression::array(self.observed_attributes))],
            ),
            kind: MethodKind::Get,
            computed: false,
            is_static: true,
        };

        let mut constructor_body = vec![Statement::expression(Expression::call(
            Expression::Super,
            vec![],
        ))];
        constructor_body.extend(self.class_constructor_body);
        let constructor = MethodDefinition {
            key: Expression::identifier("constructor"),
            value: Function::anonymous(vec![], constructor_body),
            kind: MethodKind::Constructor,
            computed: false,
            is_static: false,
        };

        let attribute_changed_callback = MethodDefinition::method(
            "attributeChangedCallback",
            vec![
                Pattern::identifier("name"),
                Pattern::identifier("oldValue"),
                Pattern::identifier("newValue"),
            ],
            self.attribute_changed_callback_body,
        );

        let mut members = vec![ClassMember::MethodDefinition(observed_attributes)];
        members.extend(self.class_property_definitions);
        members.push(ClassMember::MethodDefinition(constructor));
        members.push(ClassMember::MethodDefinition(MethodDefinition::method(
            "connectedCallback",
            vec![],
            vec![],
        )));
        members.push(ClassMember::MethodDefinition(attribute_changed_callback));
        members.push(ClassMember::MethodDefinition(MethodDefinition::method(
            "disconnectedCallback",
            vec![],
            vec![],
        )));
        members.extend(
            self.class_method_definitions
                .into_iter()
                .map(ClassMember::MethodDefinition),
        );

        let class = Box::new(Class {
            id: Some(Identifier::new(&class_name)),
            super_class: Some(dotted_path(&options.base_class)),
            body: ClassBody { body: members },
        });

        let class_item = if options.export_class {
            ProgramItem::ExportNamedDeclaration(ExportNamedDeclaration::declaration(
                Declaration::ClassDeclaration(class),
            ))
        } else {
            ProgramItem::Statement(Statement::ClassDeclaration(class))
        };

        let registration = Statement::expression(Expression::call(
            Expression::member(dotted_path(&options.registry), "define"),
            vec![
                Expression::string(&self.name),
                Expression::identifier(&class_name),
            ],
        ));

        let mut body: Vec<ProgramItem> = self
            .imports
            .into_iter()
            .map(ProgramItem::ImportDeclaration)
            .collect();
        body.push(class_item);
        body.push(ProgramItem::Statement(registration));

        Program::module(body)
    }
}

/// External names, accessor keys and backing bindings must each be unique:
/// a repeat would drop an accessor or redeclare a binding.
fn ensure_unique_names(props: &[Prop]) -> Result<()> {
    let mut external = HashSet::new();
    let mut accessors = HashMap::new();
    let mut internal = HashSet::new();

    for prop in props {
        if !external.insert(prop.external_name.as_str()) {
            return Err(CompilerError::new(
                ErrorKind::DuplicateProp,
                format!("Prop '{}' is exported more than once", prop.external_name),
            )
            .with_context(prop.external_name.clone()));
        }

        let key = to_lower_camel_case(&prop.external_name);
        if let Some(previous) = accessors.insert(key.clone(), prop.external_name.as_str()) {
            return Err(CompilerError::new(
                ErrorKind::DuplicateProp,
                format!(
                    "Props '{}' and '{}' both define the accessor '{}'",
                    previous, prop.external_name, key
                ),
            )
            .with_context(prop.external_name.clone()));
        }

        if !internal.insert(prop.internal_name.as_str()) {
            return Err(CompilerError::new(
                ErrorKind::DuplicateProp,
                format!(
                    "Binding '{}' backs more than one prop",
                    prop.internal_name
                ),
            )
            .with_context(prop.external_name.clone())
            .with_hint("Export each binding under a single name"));
        }
    }
    Ok(())
}

fn ensure_class_name(name: &str, class_name: &str) -> Result<()> {
    if is_identifier_name(class_name) {
        return Ok(());
    }
    Err(CompilerError::new(
        ErrorKind::InvalidComponentName,
        format!(
            "Component name '{}' does not yield a class name ('{}')",
            name, class_name
        ),
    )
    .with_context(name.to_string())
    .with_hint("Start the name with a letter, e.g. `x-card`"))
}

/// Build the complete element module for `name` from its props.
pub fn synthesize(
    name: &str,
    props: &[Prop],
    imports: Vec<ImportDeclaration>,
    options: &CompileOptions,
) -> Result<Program> {
    ensure_class_name(name, &to_upper_camel_case(name))?;
    ensure_unique_names(props)?;

    let mut class_constructor_body = scope_definitions(props);
    class_constructor_body.push(property_definitions(props));

    let boilerplate = ComponentBoilerplate {
        name: name.to_string(),
        imports,
        observed_attributes: observed_attributes(props),
        class_property_definitions: public_instance_fields(props),
        class_constructor_body,
        attribute_changed_callback_body: attribute_changed_callback_body(props),
        class_method_definitions: Vec::new(),
    };

    debug!(
        component = name,
        class = %boilerplate.class_name(),
        props = props.len(),
        observed = boilerplate.observed_attributes.len(),
        "synthesized component class"
    );

    Ok(boilerplate.into_program(options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{Literal, ObjectMember};

    fn prop(external: &str, internal: &str, constant: bool) -> Prop {
        Prop {
            external_name: external.to_string(),
            internal_name: internal.to_string(),
            initial_value: None,
            constant,
        }
    }

    fn accessor_entries(statement: &Statement) -> Vec<Property> {
        let Statement::ExpressionStatement(statement) = statement else {
            panic!("expected an expression statement");
        };
        let Expression::CallExpression(call) = &statement.expression else {
            panic!("expected a call");
        };
        let Expression::ObjectExpression(object) = &call.arguments[1] else {
            panic!("expected a descriptor map");
        };
        object
            .properties
            .iter()
            .map(|member| match member {
                ObjectMember::Property(property) => property.clone(),
                ObjectMember::SpreadElement(_) => panic!("unexpected spread"),
            })
            .collect()
    }

    fn descriptor_keys(property: &Property) -> Vec<String> {
        let Expression::ObjectExpression(object) = &property.value else {
            panic!("expected a descriptor");
        };
        object
            .properties
            .iter()
            .filter_map(|member| match member {
                ObjectMember::Property(p) => p.key.as_identifier().map(|id| id.name.clone()),
                ObjectMember::SpreadElement(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_observed_attributes_skip_constants() {
        let props = vec![
            prop("foo", "bar", false),
            prop("hello", "world", false),
            prop("test", "test", true),
        ];
        assert_eq!(
            observed_attributes(&props),
            vec![Expression::string("foo"), Expression::string("hello")]
        );
    }

    #[test]
    fn test_scope_definitions_follow_mutability() {
        let mut title = prop("title", "title", false);
        title.initial_value = Some(Expression::string("Hi"));
        let statements = scope_definitions(&[title, prop("id", "id", true)]);

        assert_eq!(
            statements,
            vec![
                Statement::VariableDeclaration(VariableDeclaration::single(
                    VariableKind::Let,
                    "title",
                    Some(Expression::string("Hi")),
                )),
                Statement::VariableDeclaration(VariableDeclaration::single(
                    VariableKind::Const,
                    "id",
                    None,
                )),
            ]
        );
    }

    #[test]
    fn test_accessors_have_setters_only_when_mutable() {
        let statement = property_definitions(&[prop("count", "count", false), prop("max", "max", true)]);
        let entries = accessor_entries(&statement);

        assert_eq!(entries.len(), 2);
        assert_eq!(descriptor_keys(&entries[0]), vec!["get", "set"]);
        assert_eq!(descriptor_keys(&entries[1]), vec!["get"]);
    }

    #[test]
    fn test_accessor_key_is_lower_camel_case() {
        let statement = property_definitions(&[prop("aria-label", "label", false)]);
        let entries = accessor_entries(&statement);
        assert_eq!(entries[0].key, Expression::identifier("ariaLabel"));
    }

    #[test]
    fn test_instance_field_keys() {
        let fields = public_instance_fields(&[prop("title", "t", true), prop("aria-label", "l", false)]);
        let keys: Vec<Expression> = fields
            .into_iter()
            .map(|member| match member {
                ClassMember::PropertyDefinition(field) => {
                    assert!(field.value.is_none());
                    field.key
                }
                _ => panic!("expected a field"),
            })
            .collect();
        assert_eq!(
            keys,
            vec![
                Expression::identifier("title"),
                Expression::Literal(Literal::string("aria-label")),
            ]
        );
    }

    #[test]
    fn test_duplicate_external_names_rejected() {
        let props = vec![prop("a", "a", false), prop("a", "b", true)];
        let err = synthesize("x-y", &props, vec![], &CompileOptions::default()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicateProp);
    }

    #[test]
    fn test_colliding_accessor_keys_rejected() {
        let props = vec![prop("foo-bar", "a", false), prop("fooBar", "b", false)];
        let err = synthesize("x-y", &props, vec![], &CompileOptions::default()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicateProp);
        assert_eq!(err.context.as_deref(), Some("fooBar"));
    }

    #[test]
    fn test_shared_backing_binding_rejected() {
        let props = vec![prop("a", "a", false), prop("b", "a", true)];
        let err = synthesize("x-y", &props, vec![], &CompileOptions::default()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicateProp);
        assert_eq!(err.context.as_deref(), Some("b"));
    }

    #[test]
    fn test_name_without_class_name_rejected() {
        for name in ["1-card", "-", ""] {
            let err = synthesize(name, &[], vec![], &CompileOptions::default()).unwrap_err();
            assert_eq!(err.kind, ErrorKind::InvalidComponentName, "{}", name);
        }
    }

    #[test]
    fn test_dotted_host_paths_become_member_chains() {
        let options = CompileOptions {
            base_class: "ui.Base".to_string(),
            registry: "window.registry".to_string(),
            ..CompileOptions::default()
        };
        let program = synthesize("x-card", &[], vec![], &options).unwrap();

        let ProgramItem::ExportNamedDeclaration(export) = &program.body[0] else {
            panic!("expected exported class");
        };
        let Some(Declaration::ClassDeclaration(class)) = &export.declaration else {
            panic!("expected class declaration");
        };
        assert_eq!(
            class.super_class,
            Some(Expression::member(Expression::identifier("ui"), "Base"))
        );
        assert_eq!(
            program.body[1],
            ProgramItem::Statement(Statement::expression(Expression::call(
                Expression::member(
                    Expression::member(Expression::identifier("window"), "registry"),
                    "define"
                ),
                vec![Expression::string("x-card"), Expression::identifier("XCard")],
            )))
        );
    }

    #[test]
    fn test_member_order() {
        let program = synthesize(
            "foo-bar",
            &[prop("a", "a", false)],
            vec![],
            &CompileOptions::default(),
        )
        .unwrap();

        let ProgramItem::ExportNamedDeclaration(export) = &program.body[0] else {
            panic!("expected exported class");
        };
        let Some(Declaration::ClassDeclaration(class)) = &export.declaration else {
            panic!("expected class declaration");
        };
        assert_eq!(class.id, Some(Identifier::new("FooBar")));
        assert_eq!(class.super_class, Some(Expression::identifier("HTMLElement")));

        let names: Vec<String> = class
            .body
            .body
            .iter()
            .map(|member| match member {
                ClassMember::MethodDefinition(m) => m.key.as_identifier().unwrap().name.clone(),
                ClassMember::PropertyDefinition(p) => format!("field:{}", p.key.as_identifier().unwrap().name),
                ClassMember::StaticBlock(_) => "static".to_string(),
            })
            .collect();
        assert_eq!(
            names,
            vec![
                "observedAttributes",
                "field:a",
                "constructor",
                "connectedCallback",
                "attributeChangedCallback",
                "disconnectedCallback",
            ]
        );
    }

    #[test]
    fn test_unexported_class_with_custom_host() {
        let options = CompileOptions {
            base_class: "BaseElement".to_string(),
            registry: "registry".to_string(),
            export_class: false,
            ..CompileOptions::default()
        };
        let program = synthesize("x-card", &[], vec![], &options).unwrap();

        let ProgramItem::Statement(Statement::ClassDeclaration(class)) = &program.body[0] else {
            panic!("expected a plain class declaration");
        };
        assert_eq!(class.super_class, Some(Expression::identifier("BaseElement")));
        assert_eq!(
            program.body[1],
            ProgramItem::Statement(Statement::expression(Expression::call(
                Expression::member(Expression::identifier("registry"), "define"),
                vec![Expression::string("x-card"), Expression::identifier("XCard")],
            )))
        );
    }
}
