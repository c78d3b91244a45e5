use anyhow::Result;
use clap::{Args, Subcommand};
use leadform_spec::ClientField;
use serde_json::json;

use super::Context;

#[derive(Subcommand, Debug, Clone)]
pub enum OptionCommand {
    /// Append an option to a choice element
    Add(AddOptionArgs),
    /// Remove an option; the last one cannot be removed
    Remove(OptionIndexArgs),
    /// Rename an option
    Update(UpdateOptionArgs),
    /// Move an option one slot up or down
    Move(MoveOptionArgs),
}

#[derive(Args, Debug, Clone)]
pub struct AddOptionArgs {
    #[arg(value_name = "ELEMENT_ID")]
    pub id: String,
    pub label: String,
}

#[derive(Args, Debug, Clone)]
pub struct OptionIndexArgs {
    #[arg(value_name = "ELEMENT_ID")]
    pub id: String,
    pub index: usize,
}

#[derive(Args, Debug, Clone)]
pub struct UpdateOptionArgs {
    #[arg(value_name = "ELEMENT_ID")]
    pub id: String,
    pub index: usize,
    pub label: String,
}

#[derive(Args, Debug, Clone)]
#[command(group(clap::ArgGroup::new("direction").required(true).args(["up", "down"])))]
pub struct MoveOptionArgs {
    #[arg(value_name = "ELEMENT_ID")]
    pub id: String,
    pub index: usize,
    #[arg(long)]
    pub up: bool,
    #[arg(long)]
    pub down: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ClientFieldCommand {
    /// Turn a built-in contact field on or off (email is always on)
    Set(SetClientFieldArgs),
    /// Ask for an extra free-text contact field
    AddCustom(AddOptionArgs),
    /// Remove a custom contact field
    RemoveCustom(OptionIndexArgs),
}

#[derive(Args, Debug, Clone)]
pub struct SetClientFieldArgs {
    #[arg(value_name = "ELEMENT_ID")]
    pub id: String,
    /// name, phone, address or company
    pub field: ClientField,
    #[arg(action = clap::ArgAction::Set)]
    pub enabled: bool,
}

pub fn run_option(ctx: &Context, command: OptionCommand) -> Result<()> {
    let mut session = ctx.load_session()?;
    let (id, message) = match command {
        OptionCommand::Add(args) => {
            let index = session.edit_store(|store| store.add_option(&args.id, args.label.clone()))?;
            (args.id, format!("Added option {index}: {}", args.label))
        }
        OptionCommand::Remove(args) => {
            let label = session.edit_store(|store| store.remove_option(&args.id, args.index))?;
            (args.id, format!("Removed option '{label}'"))
        }
        OptionCommand::Update(args) => {
            session.edit_store(|store| store.update_option(&args.id, args.index, args.label.clone()))?;
            (args.id, format!("Option {} is now '{}'", args.index, args.label))
        }
        OptionCommand::Move(args) => {
            let moved = session.edit_store(|store| store.move_option(&args.id, args.index, args.up))?;
            let message = if moved { "Moved option" } else { "Option already at the edge" };
            (args.id, message.to_string())
        }
    };
    ctx.commit(&mut session)?;

    let options = session
        .store()
        .get(&id)
        .and_then(|element| element.options())
        .unwrap_or_default()
        .to_vec();
    ctx.emit(json!({ "id": id, "options": options }), || message)
}

pub fn run_client_field(ctx: &Context, command: ClientFieldCommand) -> Result<()> {
    let mut session = ctx.load_session()?;
    let (id, message) = match command {
        ClientFieldCommand::Set(args) => {
            session.edit_store(|store| store.set_client_field(&args.id, args.field, args.enabled))?;
            let state = if args.enabled { "on" } else { "off" };
            (args.id, format!("{} is {state}", args.field.key()))
        }
        ClientFieldCommand::AddCustom(args) => {
            session.edit_store(|store| store.add_custom_client_field(&args.id, args.label.clone()))?;
            (args.id, format!("Added custom field '{}'", args.label))
        }
        ClientFieldCommand::RemoveCustom(args) => {
            let label = session
                .edit_store(|store| store.remove_custom_client_field(&args.id, args.index))?;
            (args.id, format!("Removed custom field '{label}'"))
        }
    };
    ctx.commit(&mut session)?;

    let fields = session
        .store()
        .get(&id)
        .and_then(|element| element.client_fields())
        .cloned();
    ctx.emit(json!({ "id": id, "clientFields": fields }), || message)
}
