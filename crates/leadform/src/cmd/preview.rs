use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result, bail};
use clap::Args;
use leadform_spec::{
    FormBuilderSession, FormValues, ShowWhen, build_preview, definition_schema, render_json,
    render_text,
};
use serde_json::json;

use super::{Context, issues_json, issues_text};

#[derive(Args, Debug, Clone, Default)]
pub struct PreviewArgs {
    /// JSON object of values keyed by element id (Client Details sub-fields
    /// use `<id>-email`, `<id>-custom-0`, ...)
    #[arg(long, value_name = "values.json")]
    pub values: Option<PathBuf>,
}

pub fn show(ctx: &Context) -> Result<()> {
    let session = ctx.load_session()?;
    let definition = session.to_definition();
    ctx.emit(
        json!({
            "formId": session.form_id(),
            "definition": definition,
            "issues": issues_json(session.structural_issues()),
        }),
        || outline(&session),
    )
}

fn outline(session: &FormBuilderSession) -> String {
    let mut lines = vec![format!("Form: {}", session.title())];
    if let Some(id) = session.form_id() {
        lines.push(format!("Saved as: {id}"));
    }
    if session.elements().is_empty() {
        lines.push("(no elements)".to_string());
    }
    for element in session.elements() {
        let marker = if element.required { "*" } else { "" };
        lines.push(format!(
            "{:>2}. [{}] {}{}  ({})",
            element.order,
            element.element_type(),
            element.title,
            marker,
            element.id
        ));
        for condition in &element.conditions {
            lines.push(format!(
                "      if {} {} {:?}  ({}, {})",
                condition.source_element_id,
                condition.operator,
                condition.value,
                condition.id,
                match element.show_when {
                    ShowWhen::All => "all",
                    ShowWhen::Any => "any",
                }
            ));
        }
    }
    let issues = session.structural_issues();
    if !issues.is_empty() {
        lines.push(issues_text(issues));
    }
    lines.join("\n")
}

pub fn check(ctx: &Context) -> Result<()> {
    let session = ctx.load_session()?;
    let issues = session.structural_issues();
    ctx.emit(
        json!({ "ok": issues.is_empty(), "issues": issues_json(issues) }),
        || {
            if issues.is_empty() {
                "Form is ready to save".to_string()
            } else {
                issues_text(issues)
            }
        },
    )?;
    if !issues.is_empty() {
        bail!("form has {} structural issue(s)", issues.len());
    }
    Ok(())
}

pub fn preview(ctx: &Context, args: PreviewArgs) -> Result<()> {
    let mut session = ctx.load_session()?;
    session.enter_preview();
    if let Some(path) = &args.values {
        for (key, value) in read_values(path)? {
            session.set_value(key, value)?;
        }
    }
    let payload = build_preview(&session);
    ctx.emit(render_json(&payload), || render_text(&payload))
}

fn read_values(path: &Path) -> Result<FormValues> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read values {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("{} must be a JSON object of field values", path.display()))
}

/// The schema is JSON in both output modes.
pub fn schema() -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&definition_schema())?);
    Ok(())
}
