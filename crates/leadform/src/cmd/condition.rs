use anyhow::Result;
use clap::{Args, Subcommand};
use leadform_spec::{ConditionOperator, ShowWhen};
use serde_json::json;

use super::Context;

#[derive(Subcommand, Debug, Clone)]
pub enum ConditionCommand {
    /// Show ELEMENT only when SOURCE's value satisfies the operator
    Add(AddConditionArgs),
    /// Remove a condition from an element
    Remove(RemoveConditionArgs),
    /// Combine an element's conditions with AND (all) or OR (any)
    ShowWhen(ShowWhenArgs),
    /// List the elements a condition on ELEMENT may reference
    Sources(SourcesArgs),
}

#[derive(Args, Debug, Clone)]
pub struct AddConditionArgs {
    #[arg(value_name = "ELEMENT_ID")]
    pub owner: String,
    #[arg(long, value_name = "SOURCE_ID")]
    pub source: String,
    /// equals, not_equals, contains, not_contains, starts_with, ends_with,
    /// is_empty, is_not_empty, greater_than, less_than
    #[arg(long)]
    pub operator: ConditionOperator,
    #[arg(long, default_value = "")]
    pub value: String,
}

#[derive(Args, Debug, Clone)]
pub struct RemoveConditionArgs {
    #[arg(value_name = "ELEMENT_ID")]
    pub owner: String,
    #[arg(value_name = "CONDITION_ID")]
    pub condition: String,
}

#[derive(Args, Debug, Clone)]
pub struct ShowWhenArgs {
    #[arg(value_name = "ELEMENT_ID")]
    pub owner: String,
    /// all or any
    pub mode: ShowWhen,
}

#[derive(Args, Debug, Clone)]
pub struct SourcesArgs {
    #[arg(value_name = "ELEMENT_ID")]
    pub owner: String,
}

pub fn run(ctx: &Context, command: ConditionCommand) -> Result<()> {
    match command {
        ConditionCommand::Add(args) => add(ctx, args),
        ConditionCommand::Remove(args) => remove(ctx, args),
        ConditionCommand::ShowWhen(args) => show_when(ctx, args),
        ConditionCommand::Sources(args) => sources(ctx, args),
    }
}

fn add(ctx: &Context, args: AddConditionArgs) -> Result<()> {
    if !args.operator.takes_operand() && !args.value.is_empty() {
        eprintln!("note: operator {} ignores --value", args.operator);
    }
    let mut session = ctx.load_session()?;
    let id = session.edit_store(|store| {
        store.add_condition(&args.owner, &args.source, args.operator, args.value.clone())
    })?;
    ctx.commit(&mut session)?;
    ctx.emit(
        json!({
            "id": id,
            "element": args.owner,
            "sourceElementId": args.source,
            "operator": args.operator,
            "value": args.value,
        }),
        || format!("Added condition {id} to {}", args.owner),
    )
}

fn remove(ctx: &Context, args: RemoveConditionArgs) -> Result<()> {
    let mut session = ctx.load_session()?;
    let removed = session.edit_store(|store| store.remove_condition(&args.owner, &args.condition))?;
    ctx.commit(&mut session)?;
    ctx.emit(json!(removed), || {
        format!("Removed condition {} from {}", removed.id, args.owner)
    })
}

fn show_when(ctx: &Context, args: ShowWhenArgs) -> Result<()> {
    let mut session = ctx.load_session()?;
    session.edit_store(|store| store.set_show_when(&args.owner, args.mode))?;
    ctx.commit(&mut session)?;
    ctx.emit(json!({ "element": args.owner, "showWhen": args.mode }), || {
        let mode = match args.mode {
            ShowWhen::All => "all conditions",
            ShowWhen::Any => "any condition",
        };
        format!("{} now shows when {mode} match", args.owner)
    })
}

fn sources(ctx: &Context, args: SourcesArgs) -> Result<()> {
    let session = ctx.load_session()?;
    let sources = session.store().condition_sources(&args.owner)?;
    let value = json!(
        sources
            .iter()
            .map(|element| json!({ "id": element.id, "type": element.element_type(), "title": element.title }))
            .collect::<Vec<_>>()
    );
    ctx.emit(value, || {
        if sources.is_empty() {
            return format!("No earlier elements can drive {}", args.owner);
        }
        sources
            .iter()
            .map(|element| format!("{}  [{}] {}", element.id, element.element_type(), element.title))
            .collect::<Vec<_>>()
            .join("\n")
    })
}
