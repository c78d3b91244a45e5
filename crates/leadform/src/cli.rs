use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::cmd::condition::ConditionCommand;
use crate::cmd::elements::{AddArgs, EditArgs, ElementIdArgs, InitArgs, MoveArgs, ReorderArgs};
use crate::cmd::fields::{ClientFieldCommand, OptionCommand};
use crate::cmd::preview::PreviewArgs;
use crate::cmd::remote::PullArgs;
use crate::cmd::{self, Context};
use crate::config::BuilderConfig;
use crate::logging;

#[derive(Parser, Debug)]
#[command(
    name = "leadform",
    about = "Build lead capture forms from the command line",
    version,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Config file (defaults to the per-user leadform/config.toml)
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Working-copy storage file, overrides the config
    #[arg(long, value_name = "PATH", global = true)]
    storage: Option<PathBuf>,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    json: bool,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start a new form in the working copy
    Init(InitArgs),
    /// List the element types that can be added
    Palette,
    /// Append an element
    Add(AddArgs),
    /// Delete an element and the conditions that depend on it
    Remove(ElementIdArgs),
    /// Copy an element to the end of the form
    Duplicate(ElementIdArgs),
    /// Move the element at INDEX one slot up or down
    Move(MoveArgs),
    /// Drag an element onto another one
    Reorder(ReorderArgs),
    /// Conditional visibility rules
    #[command(subcommand)]
    Condition(ConditionCommand),
    /// Options of choice elements
    #[command(subcommand, name = "option")]
    Options(OptionCommand),
    /// Fields collected by the Client Details section
    #[command(subcommand)]
    ClientField(ClientFieldCommand),
    /// Change an element's settings
    Edit(Box<EditArgs>),
    /// Print the form outline
    Show,
    /// Check that the form can be saved
    Check,
    /// Fill in the form and show visibility and validation results
    Preview(PreviewArgs),
    /// Save the form as a draft to the backend
    Push,
    /// Load a saved form into the working copy
    Pull(PullArgs),
    /// List saved forms
    List,
    /// Print the JSON schema of a form definition
    Schema,
}

pub fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    run(cli)
}

pub fn run(cli: Cli) -> Result<()> {
    let config = BuilderConfig::load(cli.config.as_deref())?;
    let ctx = Context::new(config, cli.storage, cli.json);
    match cli.command {
        Commands::Init(args) => cmd::elements::init(&ctx, args),
        Commands::Palette => cmd::elements::list_palette(&ctx),
        Commands::Add(args) => cmd::elements::add(&ctx, args),
        Commands::Remove(args) => cmd::elements::remove(&ctx, args),
        Commands::Duplicate(args) => cmd::elements::duplicate(&ctx, args),
        Commands::Move(args) => cmd::elements::move_element(&ctx, args),
        Commands::Reorder(args) => cmd::elements::reorder(&ctx, args),
        Commands::Condition(command) => cmd::condition::run(&ctx, command),
        Commands::Options(command) => cmd::fields::run_option(&ctx, command),
        Commands::ClientField(command) => cmd::fields::run_client_field(&ctx, command),
        Commands::Edit(args) => cmd::elements::edit(&ctx, *args),
        Commands::Show => cmd::preview::show(&ctx),
        Commands::Check => cmd::preview::check(&ctx),
        Commands::Preview(args) => cmd::preview::preview(&ctx, args),
        Commands::Push => cmd::remote::push(&ctx),
        Commands::Pull(args) => cmd::remote::pull(&ctx, args),
        Commands::List => cmd::remote::list(&ctx),
        Commands::Schema => cmd::preview::schema(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadform_spec::{ClientField, ConditionOperator, ElementType, ShowWhen};

    #[test]
    fn parses_add_with_loose_type_names() {
        let cli = Cli::try_parse_from(["leadform", "--json", "add", "short-answer"])
            .expect("expected CLI to parse");
        assert!(cli.json);
        match cli.command {
            Commands::Add(args) => assert_eq!(args.element_type, ElementType::ShortAnswer),
            _ => panic!("expected add args"),
        }

        let cli = Cli::try_parse_from(["leadform", "add", "Client Details"]).expect("parse");
        assert!(matches!(
            cli.command,
            Commands::Add(AddArgs {
                element_type: ElementType::ClientDetails
            })
        ));
        assert!(Cli::try_parse_from(["leadform", "add", "signature"]).is_err());
    }

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = Cli::try_parse_from([
            "leadform",
            "show",
            "--storage",
            "/tmp/storage.json",
            "-v",
        ])
        .expect("parse");
        assert!(cli.verbose);
        assert_eq!(cli.storage, Some(PathBuf::from("/tmp/storage.json")));
        assert!(matches!(cli.command, Commands::Show));
    }

    #[test]
    fn move_needs_exactly_one_direction() {
        assert!(Cli::try_parse_from(["leadform", "move", "1"]).is_err());
        assert!(Cli::try_parse_from(["leadform", "move", "1", "--up", "--down"]).is_err());
        let cli = Cli::try_parse_from(["leadform", "move", "2", "--down"]).expect("parse");
        match cli.command {
            Commands::Move(args) => {
                assert_eq!(args.index, 2);
                assert!(args.down && !args.up);
            }
            _ => panic!("expected move args"),
        }
    }

    #[test]
    fn parses_condition_commands() {
        let cli = Cli::try_parse_from([
            "leadform",
            "condition",
            "add",
            "amount",
            "--source",
            "budget",
            "--operator",
            "greater-than",
            "--value",
            "10",
        ])
        .expect("parse");
        match cli.command {
            Commands::Condition(ConditionCommand::Add(args)) => {
                assert_eq!(args.owner, "amount");
                assert_eq!(args.operator, ConditionOperator::GreaterThan);
                assert_eq!(args.value, "10");
            }
            _ => panic!("expected condition add"),
        }

        let cli = Cli::try_parse_from(["leadform", "condition", "show-when", "amount", "any"])
            .expect("parse");
        match cli.command {
            Commands::Condition(ConditionCommand::ShowWhen(args)) => {
                assert_eq!(args.mode, ShowWhen::Any)
            }
            _ => panic!("expected show-when"),
        }
    }

    #[test]
    fn parses_client_field_toggle_and_edit() {
        let cli = Cli::try_parse_from(["leadform", "client-field", "set", "c", "phone", "false"])
            .expect("parse");
        match cli.command {
            Commands::ClientField(ClientFieldCommand::Set(args)) => {
                assert_eq!(args.field, ClientField::Phone);
                assert!(!args.enabled);
            }
            _ => panic!("expected client-field set"),
        }

        let cli = Cli::try_parse_from([
            "leadform", "edit", "n", "--required", "true", "--min", "-5", "--title", "Budget",
        ])
        .expect("parse");
        match cli.command {
            Commands::Edit(args) => {
                assert_eq!(args.required, Some(true));
                assert_eq!(args.min, Some(-5.0));
                assert_eq!(args.title.as_deref(), Some("Budget"));
            }
            _ => panic!("expected edit"),
        }
    }
}
