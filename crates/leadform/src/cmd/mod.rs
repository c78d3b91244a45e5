pub mod condition;
pub mod elements;
pub mod fields;
pub mod preview;
pub mod remote;

use std::path::PathBuf;

use anyhow::{Context as _, Result, bail};
use leadform_spec::{FormBuilderSession, StoreEvent, StructuralIssue};
use leadform_store::{ElementMirror, FormRepository, HttpFormRepository, LocalFormRepository};
use serde_json::{Value, json};

use crate::config::BuilderConfig;

/// Shared state for one CLI invocation: resolved config, the working-copy
/// mirror and the output mode.
pub struct Context {
    pub config: BuilderConfig,
    pub mirror: ElementMirror,
    pub json: bool,
}

impl Context {
    pub fn new(config: BuilderConfig, storage: Option<PathBuf>, json: bool) -> Self {
        let path = storage.unwrap_or_else(|| config.storage_path());
        Self {
            mirror: ElementMirror::new(path),
            config,
            json,
        }
    }

    /// Restores the working copy, failing when none was started.
    pub fn load_session(&self) -> Result<FormBuilderSession> {
        let session = self
            .mirror
            .load()
            .with_context(|| format!("failed to read {}", self.mirror.path().display()))?;
        match session {
            Some(session) => Ok(session),
            None => bail!(
                "no form in progress at {}; run `leadform init` first",
                self.mirror.path().display()
            ),
        }
    }

    /// Reports side effects of the last edit and flushes the working copy.
    pub fn commit(&self, session: &mut FormBuilderSession) -> Result<()> {
        for event in session.take_store_events() {
            eprintln!("note: {}", describe_event(&event));
        }
        self.mirror
            .flush(session)
            .with_context(|| format!("failed to write {}", self.mirror.path().display()))?;
        Ok(())
    }

    pub fn repository(&self) -> Result<Box<dyn FormRepository>> {
        match &self.config.api_base_url {
            Some(url) => {
                let repo =
                    HttpFormRepository::new(url, self.config.api_token.clone(), self.config.timeout())
                        .with_context(|| format!("cannot use API at {url}"))?;
                Ok(Box::new(repo))
            }
            None => Ok(Box::new(LocalFormRepository::new(self.config.forms_dir()))),
        }
    }

    /// Prints `value` as JSON in `--json` mode, otherwise the text form.
    pub fn emit(&self, value: Value, text: impl FnOnce() -> String) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(&value)?);
        } else {
            println!("{}", text());
        }
        Ok(())
    }
}

pub fn describe_event(event: &StoreEvent) -> String {
    match event {
        StoreEvent::ConditionPruned {
            owner_id,
            condition_id,
            source_element_id,
        } => format!(
            "removed condition {condition_id} from {owner_id}: source {source_element_id} no longer comes before it"
        ),
        StoreEvent::ConditionsCascaded {
            deleted_id,
            removed,
        } => format!("removed {removed} condition(s) that referenced {deleted_id}"),
    }
}

pub fn issues_json(issues: &[StructuralIssue]) -> Value {
    Value::Array(
        issues
            .iter()
            .map(|issue| {
                json!({
                    "code": issue.code(),
                    "title": issue.title(),
                    "message": issue.message(),
                    "remediation": issue.remediation(),
                })
            })
            .collect(),
    )
}

pub fn issues_text(issues: &[StructuralIssue]) -> String {
    issues
        .iter()
        .map(|issue| format!("! {issue}"))
        .collect::<Vec<_>>()
        .join("\n")
}

pub(crate) fn block_on<F: std::future::Future>(future: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    Ok(runtime.block_on(future))
}
