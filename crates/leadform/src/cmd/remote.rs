use anyhow::{Context as _, Result, bail};
use clap::Args;
use leadform_spec::{FormBuilderSession, SessionError};
use serde_json::json;

use super::{Context, block_on, issues_json, issues_text};

/// Where the builder sends the user after a successful save.
pub const LEADS_REDIRECT: &str = "/leads";

#[derive(Args, Debug, Clone)]
pub struct PullArgs {
    #[arg(value_name = "FORM_ID")]
    pub id: String,
    /// Replace a working copy that belongs to another form
    #[arg(long)]
    pub force: bool,
}

pub fn push(ctx: &Context) -> Result<()> {
    let mut session = ctx.load_session()?;
    let definition = match session.prepare_save() {
        Ok(definition) => definition,
        Err(SessionError::Blocked(issues)) => {
            if ctx.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&json!({ "saved": false, "issues": issues_json(&issues) }))?
                );
            } else {
                eprintln!("{}", issues_text(&issues));
            }
            bail!("cannot save: form has {} structural issue(s)", issues.len());
        }
        Err(err) => return Err(err.into()),
    };

    let repository = ctx.repository()?;
    let existing = session.form_id().map(str::to_string);
    let saved = block_on(async {
        match &existing {
            Some(id) => repository.update(id, &definition).await.map(|()| id.clone()),
            None => repository.create(&definition).await,
        }
    })?;
    let form_id = match saved {
        Ok(form_id) => form_id,
        Err(err) => {
            tracing::error!(%err, "failed to save form");
            return Err(err).context("failed to save form");
        }
    };

    session.mark_saved(&form_id);
    ctx.mirror.save(&session)?;
    ctx.emit(
        json!({
            "saved": true,
            "id": form_id,
            "created": existing.is_none(),
            "redirect": LEADS_REDIRECT,
        }),
        || format!("Saved form {form_id}\nRedirect: {LEADS_REDIRECT}"),
    )
}

pub fn pull(ctx: &Context, args: PullArgs) -> Result<()> {
    if !args.force
        && let Some(current) = ctx.mirror.load()?
        && current.form_id() != Some(args.id.as_str())
    {
        bail!(
            "the working copy holds another form ({}); pass --force to replace it",
            current.form_id().unwrap_or("unsaved")
        );
    }

    let repository = ctx.repository()?;
    let fetched = block_on(repository.fetch(&args.id))?;
    let definition = match fetched {
        Ok(definition) => definition,
        Err(err) => {
            tracing::error!(id = %args.id, %err, "failed to load form");
            return Err(err).with_context(|| format!("failed to load form {}", args.id));
        }
    };

    let session = FormBuilderSession::from_definition(Some(args.id.clone()), definition)?;
    ctx.mirror.save(&session)?;
    ctx.emit(
        json!({ "id": args.id, "title": session.title(), "elements": session.elements().len() }),
        || {
            format!(
                "Loaded '{}' ({} elements)",
                session.title(),
                session.elements().len()
            )
        },
    )
}

pub fn list(ctx: &Context) -> Result<()> {
    let repository = ctx.repository()?;
    let forms = match block_on(repository.list())? {
        Ok(forms) => forms,
        Err(err) => {
            tracing::error!(%err, "failed to list forms");
            return Err(err).context("failed to list forms");
        }
    };
    ctx.emit(json!(forms), || {
        if forms.is_empty() {
            return "No saved forms".to_string();
        }
        forms
            .iter()
            .map(|form| {
                format!(
                    "{}  {}  {}",
                    form.id,
                    form.updated_at.as_deref().unwrap_or("-"),
                    form.title
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    })
}
