//! Eager validation of a definition set, without building anything.
//!
//! The container itself reports malformed attributes only when they are
//! read. [`check_definitions`] walks every definition up front, so a
//! document can be validated before it is deployed.

use std::collections::{HashMap, HashSet};

use ioc_registry::TypeIntrospection;
use ioc_types::{is_valid_id, is_valid_name, ObjectDefinition, ValueSpec};
use serde::Serialize;

/// How serious a finding is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Resolving the definition will fail.
    Error,
    /// Resolving the definition may fail or behave unexpectedly.
    Warning,
}

/// One finding about one definition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Problem {
    pub id: String,
    pub severity: Severity,
    pub message: String,
}

impl Problem {
    fn error(id: &str, message: impl Into<String>) -> Self {
        Self {
            id: id.to_string(),
            severity: Severity::Error,
            message: message.into(),
        }
    }

    fn warning(id: &str, message: impl Into<String>) -> Self {
        Self {
            id: id.to_string(),
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Validate every definition and the reference graph between them.
///
/// With `types`, declared types and methods are also checked against the
/// registry. Findings are ordered by definition, then by check.
pub fn check_definitions(
    definitions: &[ObjectDefinition],
    types: Option<&dyn TypeIntrospection>,
) -> Vec<Problem> {
    let known: HashSet<&str> = definitions.iter().map(|def| def.id.as_str()).collect();
    let mut problems = Vec::new();
    for definition in definitions {
        check_definition(definition, &known, types, &mut problems);
    }
    problems.extend(find_cycles(definitions));
    problems
}

fn check_definition(
    definition: &ObjectDefinition,
    known: &HashSet<&str>,
    types: Option<&dyn TypeIntrospection>,
    problems: &mut Vec<Problem>,
) {
    let id = definition.id.as_str();
    if !is_valid_id(id) {
        problems.push(Problem::error(id, "invalid object identifier"));
    }
    if let Err(e) = definition.declared_scope() {
        problems.push(Problem::error(id, e.to_string()));
    }

    let mut names = |kind: &str, name: &str| {
        if !is_valid_name(name) {
            problems.push(Problem::error(id, format!("invalid {kind} {name:?}")));
        }
    };
    if let Some(type_name) = &definition.type_name {
        names("type name", type_name);
    }
    if let Some(method) = &definition.factory_method {
        names("factory method", method);
    }
    if let Some(method) = &definition.init_method {
        names("init method", method);
    }
    for property in &definition.properties {
        names("property name", &property.name);
    }

    match (&definition.factory_object, &definition.type_name) {
        (Some(object), _) => {
            if definition.factory_method.is_none() {
                problems.push(Problem::warning(
                    id,
                    format!("factory object {object} declared without a factory method"),
                ));
            }
            if !known.contains(object.as_str()) {
                problems.push(Problem::error(id, format!("factory object {object} is not defined")));
            }
        }
        (None, Some(type_name)) => {
            if let Some(types) = types {
                check_type(id, type_name, definition.static_factory_method(), types, problems);
            }
        }
        (None, None) => problems.push(Problem::error(
            id,
            "definition declares neither a type nor a factory object",
        )),
    }

    let values = definition
        .constructor_args
        .iter()
        .chain(definition.properties.iter().map(|p| &p.value));
    for value in values {
        check_value(id, value, known, problems);
    }
}

fn check_type(
    id: &str,
    type_name: &str,
    static_factory: Option<&str>,
    types: &dyn TypeIntrospection,
    problems: &mut Vec<Problem>,
) {
    if !types.has_type(type_name) {
        problems.push(Problem::error(id, format!("unknown type {type_name}")));
        return;
    }
    if types.is_abstract(type_name).unwrap_or(false) {
        problems.push(Problem::error(id, format!("type {type_name} is abstract")));
    }
    if let Some(method) = static_factory {
        let usable = types.has_method(type_name, method)
            && types.method_is_static(type_name, method).unwrap_or(false)
            && types.method_is_public(type_name, method).unwrap_or(false);
        if !usable {
            problems.push(Problem::error(
                id,
                format!("{type_name} has no public static method {method}"),
            ));
        }
    }
}

fn check_value(id: &str, spec: &ValueSpec, known: &HashSet<&str>, problems: &mut Vec<Problem>) {
    match spec {
        ValueSpec::Scalar { ty: Some(ty), .. } => {
            if let Err(e) = ty.parse::<ioc_types::ScalarType>() {
                problems.push(Problem::error(id, e.to_string()));
            }
        }
        ValueSpec::Scalar { ty: None, .. } | ValueSpec::Null => {}
        ValueSpec::Ref { target } | ValueSpec::IdRef { target } => {
            if !known.contains(target.as_str()) {
                let kind = if matches!(spec, ValueSpec::Ref { .. }) { "ref" } else { "idref" };
                problems.push(Problem::error(id, format!("{kind} to undefined object {target}")));
            }
        }
        ValueSpec::List { items } => {
            for item in items {
                check_value(id, item, known, problems);
            }
        }
        ValueSpec::Map { entries } => {
            let mut seen = HashSet::new();
            for entry in entries {
                if !is_valid_name(&entry.key) {
                    problems.push(Problem::error(id, format!("invalid map key {:?}", entry.key)));
                }
                if !seen.insert(entry.key.as_str()) {
                    problems.push(Problem::warning(
                        id,
                        format!("duplicate map key {}; the first entry wins", entry.key),
                    ));
                }
                check_value(id, &entry.value, known, problems);
            }
        }
        ValueSpec::Unrecognized { node } => {
            problems.push(Problem::error(id, format!("unsupported value node '{node}'")));
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

/// Cycles through `ref` edges and factory objects, one finding per cycle.
fn find_cycles(definitions: &[ObjectDefinition]) -> Vec<Problem> {
    let edges: HashMap<&str, Vec<&str>> = definitions
        .iter()
        .map(|def| (def.id.as_str(), def.dependencies()))
        .collect();
    let mut marks: HashMap<&str, Mark> = HashMap::new();
    let mut problems = Vec::new();

    for definition in definitions {
        let mut path = Vec::new();
        visit(definition.id.as_str(), &edges, &mut marks, &mut path, &mut problems);
    }
    problems
}

fn visit<'a>(
    id: &'a str,
    edges: &HashMap<&'a str, Vec<&'a str>>,
    marks: &mut HashMap<&'a str, Mark>,
    path: &mut Vec<&'a str>,
    problems: &mut Vec<Problem>,
) {
    match marks.get(id) {
        Some(Mark::Done) => return,
        Some(Mark::InProgress) => {
            let start = path.iter().position(|p| *p == id).unwrap_or(0);
            let mut cycle: Vec<&str> = path[start..].to_vec();
            cycle.push(id);
            problems.push(Problem::error(
                cycle[0],
                format!("circular reference: {}", cycle.join(" -> ")),
            ));
            return;
        }
        None => {}
    }
    let Some(deps) = edges.get(id) else {
        return;
    };
    marks.insert(id, Mark::InProgress);
    path.push(id);
    for &dep in deps {
        visit(dep, edges, marks, path, problems);
    }
    path.pop();
    marks.insert(id, Mark::Done);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Fixture;

    fn errors(problems: &[Problem]) -> Vec<String> {
        problems
            .iter()
            .filter(|p| p.is_error())
            .map(|p| format!("{}: {}", p.id, p.message))
            .collect()
    }

    #[test]
    fn clean_definitions_have_no_problems() {
        let defs = vec![
            ObjectDefinition::new("a")
                .of_type("Widget")
                .with_property("owner", ValueSpec::reference("b")),
            ObjectDefinition::new("b").of_type("Holder").with_scope("prototype"),
        ];
        let fixture = Fixture::new();
        assert!(check_definitions(&defs, Some(&*fixture.registry)).is_empty());
    }

    #[test]
    fn attribute_problems_are_reported() {
        let defs = vec![
            ObjectDefinition::new("a").of_type("Widget").with_scope("request"),
            ObjectDefinition::new("b").of_type("Bad Type"),
            ObjectDefinition::new("c"),
            ObjectDefinition::new("d")
                .with_factory("ghost", "make")
                .with_init_method("init()"),
        ];
        let found = errors(&check_definitions(&defs, None));
        assert_eq!(found.len(), 5, "{found:?}");
        assert!(found[0].starts_with("a: unknown scope"));
        assert!(found[1].contains("invalid type name"));
        assert!(found[2].contains("neither a type nor a factory object"));
        assert!(found.iter().any(|p| p.contains("init method")));
        assert!(found.iter().any(|p| p.contains("ghost is not defined")));
    }

    #[test]
    fn value_problems_are_reported() {
        let defs = vec![ObjectDefinition::new("a")
            .of_type("Holder")
            .with_arg(ValueSpec::idref("missing"))
            .with_arg(ValueSpec::typed("1", "decimal"))
            .with_arg(ValueSpec::map([
                ("k", ValueSpec::Null),
                ("k", ValueSpec::Null),
                ("bad key", ValueSpec::Unrecognized {
                    node: "expression".into(),
                }),
            ]))];
        let problems = check_definitions(&defs, None);
        let found = errors(&problems);
        assert_eq!(found.len(), 4, "{found:?}");
        assert!(problems
            .iter()
            .any(|p| p.severity == Severity::Warning && p.message.contains("duplicate map key")));
    }

    #[test]
    fn registry_checks() {
        let fixture = Fixture::new();
        let defs = vec![
            ObjectDefinition::new("unknown").of_type("Nope"),
            ObjectDefinition::new("abstract").of_type("Shape"),
            ObjectDefinition::new("bad_factory").of_type("Widget").with_static_factory("boot"),
            ObjectDefinition::new("good_factory").of_type("Widget").with_static_factory("create"),
        ];
        let found = errors(&check_definitions(&defs, Some(&*fixture.registry)));
        assert_eq!(found.len(), 3, "{found:?}");
        assert!(found.iter().all(|p| !p.starts_with("good_factory")));
    }

    #[test]
    fn reference_cycles_are_reported_once() {
        let defs = vec![
            ObjectDefinition::new("a").with_property("next", ValueSpec::reference("b")),
            ObjectDefinition::new("b").with_arg(ValueSpec::list([ValueSpec::reference("c")])),
            ObjectDefinition::new("c").with_factory("a", "make"),
            ObjectDefinition::new("d").of_type("Holder").with_arg(ValueSpec::reference("a")),
            ObjectDefinition::new("e").of_type("Holder").with_arg(ValueSpec::idref("e")),
        ];
        let cycles: Vec<_> = check_definitions(&defs, None)
            .into_iter()
            .filter(|p| p.message.starts_with("circular"))
            .collect();
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].id, "a");
        assert_eq!(cycles[0].message, "circular reference: a -> b -> c -> a");
    }
}
