use std::path::Path;

use anyhow::{bail, Context};
use colored::Colorize;
use ioc_core::{check_definitions, Problem, Severity};
use ioc_document::Document;
use ioc_types::{ObjectDefinition, ValueSpec};
use serde_json::json;
use tracing::debug;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let format = cli.format;
    match cli.command {
        Command::List(args) => cmd_list(&args.document, format),
        Command::Show(args) => cmd_show(&args.document, &args.id, format),
        Command::Check(args) => cmd_check(&args.document, format),
        Command::Hash(args) => cmd_hash(&args.document, format),
    }
}

fn load(path: &Path) -> anyhow::Result<Document> {
    debug!(path = %path.display(), "loading definition document");
    Document::load(path).with_context(|| format!("failed to load {}", path.display()))
}

fn cmd_list(path: &Path, format: OutputFormat) -> anyhow::Result<()> {
    let doc = load(path)?;
    match format {
        OutputFormat::Json => {
            let rows: Vec<_> = doc
                .definitions()
                .iter()
                .map(|def| json!({"id": def.id, "scope": scope_label(def), "type": def.type_name}))
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        OutputFormat::Text => {
            for line in list_lines(doc.definitions()) {
                println!("{line}");
            }
            println!("{} objects", doc.definitions().len().to_string().bold());
        }
    }
    Ok(())
}

fn cmd_show(path: &Path, id: &str, format: OutputFormat) -> anyhow::Result<()> {
    let doc = load(path)?;
    let Some(def) = doc.get(id) else {
        bail!("no object definition for {id}");
    };
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(def)?),
        OutputFormat::Text => {
            for line in show_lines(def) {
                println!("{line}");
            }
        }
    }
    Ok(())
}

fn cmd_check(path: &Path, format: OutputFormat) -> anyhow::Result<()> {
    let doc = load(path)?;
    let problems = check_definitions(doc.definitions(), None);
    let errors = problems.iter().filter(|p| p.is_error()).count();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&problems)?),
        OutputFormat::Text => {
            for problem in &problems {
                println!("{}", problem_line(problem));
            }
            if errors == 0 {
                println!(
                    "{} {} objects checked, {} warnings",
                    "✓".green().bold(),
                    doc.definitions().len(),
                    problems.len()
                );
            }
        }
    }
    if errors > 0 {
        bail!("{errors} error(s) in {}", path.display());
    }
    Ok(())
}

fn cmd_hash(path: &Path, format: OutputFormat) -> anyhow::Result<()> {
    let doc = load(path)?;
    let context = doc.context();
    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "context": context.to_hex(),
                "format": doc.format().as_str(),
                "objects": doc.definitions().len(),
            }))?
        ),
        OutputFormat::Text => println!("{}", context.to_hex().yellow()),
    }
    Ok(())
}

fn scope_label(def: &ObjectDefinition) -> String {
    match def.declared_scope() {
        Ok(scope) => scope.to_string(),
        Err(_) => format!("invalid({})", def.scope.as_deref().unwrap_or_default()),
    }
}

fn list_lines(definitions: &[ObjectDefinition]) -> Vec<String> {
    definitions
        .iter()
        .map(|def| {
            let kind = match (def.instance_factory(), def.type_name.as_deref()) {
                (Some((object, method)), _) => format!("{object}->{method}()"),
                (None, Some(type_name)) => match def.static_factory_method() {
                    Some(method) => format!("{type_name}::{method}()"),
                    None => type_name.to_string(),
                },
                (None, None) => "-".to_string(),
            };
            format!(
                "{} {} {}",
                format!("{:<24}", def.id).bold(),
                format!("{:<10}", scope_label(def)).cyan(),
                kind
            )
        })
        .collect()
}

fn show_lines(def: &ObjectDefinition) -> Vec<String> {
    let mut lines = vec![format!("Object {}", def.id.yellow().bold())];
    lines.push(format!("  Scope: {}", scope_label(def).cyan()));
    if let Some(type_name) = &def.type_name {
        lines.push(format!("  Type: {type_name}"));
    }
    if let Some((object, method)) = def.instance_factory() {
        lines.push(format!("  Factory: {}->{method}()", object.yellow()));
    } else if let Some(method) = def.static_factory_method() {
        lines.push(format!("  Factory: ::{method}()"));
    }
    if let Some(method) = &def.init_method {
        lines.push(format!("  Init: {method}()"));
    }
    for (i, arg) in def.constructor_args.iter().enumerate() {
        lines.push(format!("  Arg #{i}: {}", describe(arg)));
    }
    for property in &def.properties {
        lines.push(format!("  Property {} = {}", property.name.bold(), describe(&property.value)));
    }
    lines
}

fn problem_line(problem: &Problem) -> String {
    let label = match problem.severity {
        Severity::Error => "error".red().bold(),
        Severity::Warning => "warning".yellow(),
    };
    format!("{label} {}: {}", problem.id.bold(), problem.message)
}

/// One-line rendering of a value specification.
fn describe(spec: &ValueSpec) -> String {
    match spec {
        ValueSpec::Scalar { raw, ty, .. } => match ty {
            Some(ty) => format!("{raw:?} as {ty}"),
            None => format!("{raw:?}"),
        },
        ValueSpec::Null => "null".to_string(),
        ValueSpec::IdRef { target } => format!("idref({target})"),
        ValueSpec::Ref { target } => format!("ref({target})"),
        ValueSpec::List { items } => {
            let items: Vec<_> = items.iter().map(describe).collect();
            format!("[{}]", items.join(", "))
        }
        ValueSpec::Map { entries } => {
            let entries: Vec<_> = entries
                .iter()
                .map(|e| format!("{}: {}", e.key, describe(&e.value)))
                .collect();
            format!("{{{}}}", entries.join(", "))
        }
        ValueSpec::Unrecognized { node } => format!("<{node}>"),
    }
}
