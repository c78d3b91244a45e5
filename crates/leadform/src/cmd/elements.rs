use anyhow::{Result, bail};
use clap::Args;
use leadform_spec::{ElementType, FormBuilderSession, ValidationRules, palette};
use serde_json::{Value, json};

use super::{Context, issues_json, issues_text};

#[derive(Args, Debug, Clone)]
pub struct InitArgs {
    /// Title of the new form
    #[arg(long, default_value = "Untitled form")]
    pub title: String,
    /// Discard the form currently in progress
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug, Clone)]
pub struct AddArgs {
    /// Element type, e.g. "Short Answer" or short-answer
    #[arg(value_name = "TYPE")]
    pub element_type: ElementType,
}

#[derive(Args, Debug, Clone)]
pub struct ElementIdArgs {
    #[arg(value_name = "ELEMENT_ID")]
    pub id: String,
}

#[derive(Args, Debug, Clone)]
#[command(group(clap::ArgGroup::new("direction").required(true).args(["up", "down"])))]
pub struct MoveArgs {
    /// Zero-based position of the element
    pub index: usize,
    #[arg(long)]
    pub up: bool,
    #[arg(long)]
    pub down: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ReorderArgs {
    /// Element being dragged
    pub dragged: String,
    /// Element it is dropped onto; the dragged element lands right before it
    pub target: String,
}

#[derive(Args, Debug, Clone, Default)]
pub struct EditArgs {
    #[arg(value_name = "ELEMENT_ID")]
    pub id: String,
    #[arg(long)]
    pub title: Option<String>,
    /// Empty string clears the description
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub required: Option<bool>,
    #[arg(long)]
    pub placeholder: Option<String>,
    #[arg(long = "default")]
    pub default_value: Option<String>,
    #[arg(long)]
    pub min_length: Option<usize>,
    #[arg(long)]
    pub max_length: Option<usize>,
    #[arg(long, allow_negative_numbers = true)]
    pub min: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    pub max: Option<f64>,
    #[arg(long)]
    pub pattern: Option<String>,
    /// Drop every validation rule before applying the flags above
    #[arg(long)]
    pub clear_validation: bool,
}

impl EditArgs {
    fn touches_validation(&self) -> bool {
        self.clear_validation
            || self.min_length.is_some()
            || self.max_length.is_some()
            || self.min.is_some()
            || self.max.is_some()
            || self.pattern.is_some()
    }
}

fn optional(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

pub fn init(ctx: &Context, args: InitArgs) -> Result<()> {
    if ctx.mirror.exists() && !args.force {
        bail!(
            "a form is already in progress at {}; pass --force to start over",
            ctx.mirror.path().display()
        );
    }
    let session = FormBuilderSession::new(args.title);
    ctx.mirror.clear()?;
    ctx.mirror.save(&session)?;
    tracing::info!(path = %ctx.mirror.path().display(), "started new form");

    ctx.emit(
        json!({ "title": session.title(), "issues": issues_json(session.structural_issues()) }),
        || {
            format!(
                "Started form '{}'\n{}",
                session.title(),
                issues_text(session.structural_issues())
            )
        },
    )
}

pub fn list_palette(ctx: &Context) -> Result<()> {
    let entries = palette();
    let value = Value::Array(
        entries
            .iter()
            .map(|spec| {
                json!({
                    "type": spec.element_type,
                    "icon": spec.icon,
                    "summary": spec.summary,
                    "editorFields": spec.editor_fields,
                })
            })
            .collect(),
    );
    ctx.emit(value, || {
        entries
            .iter()
            .map(|spec| format!("{:<16} {}", spec.label(), spec.summary))
            .collect::<Vec<_>>()
            .join("\n")
    })
}

pub fn add(ctx: &Context, args: AddArgs) -> Result<()> {
    let mut session = ctx.load_session()?;
    let id = session.add_element(args.element_type)?;
    ctx.commit(&mut session)?;
    ctx.emit(json!({ "id": id, "type": args.element_type }), || {
        format!("Added {} {id}", args.element_type)
    })
}

pub fn remove(ctx: &Context, args: ElementIdArgs) -> Result<()> {
    let mut session = ctx.load_session()?;
    let removed = session.delete_element(&args.id)?;
    ctx.commit(&mut session)?;
    ctx.emit(json!({ "id": args.id, "removed": removed.is_some() }), || match &removed {
        Some(element) => format!("Removed {} '{}'", element.element_type(), element.title),
        None => format!("No element {}", args.id),
    })
}

pub fn duplicate(ctx: &Context, args: ElementIdArgs) -> Result<()> {
    let mut session = ctx.load_session()?;
    let copy = session.duplicate_element(&args.id)?;
    ctx.commit(&mut session)?;
    ctx.emit(json!({ "source": args.id, "copy": copy }), || match &copy {
        Some(copy) => format!("Duplicated {} as {copy}", args.id),
        None => format!("No element {}", args.id),
    })
}

pub fn move_element(ctx: &Context, args: MoveArgs) -> Result<()> {
    let mut session = ctx.load_session()?;
    let moved = if args.up {
        session.move_up(args.index)?
    } else {
        session.move_down(args.index)?
    };
    ctx.commit(&mut session)?;
    ctx.emit(json!({ "index": args.index, "moved": moved }), || {
        if moved {
            "Moved".to_string()
        } else {
            "Already at the edge".to_string()
        }
    })
}

pub fn reorder(ctx: &Context, args: ReorderArgs) -> Result<()> {
    let mut session = ctx.load_session()?;
    session.begin_drag(&args.dragged)?;
    session.drag_over(&args.target);
    let moved = session.drop_on(&args.target)?;
    ctx.commit(&mut session)?;
    let order = session
        .elements()
        .iter()
        .map(|element| element.id.clone())
        .collect::<Vec<_>>();
    ctx.emit(json!({ "moved": moved, "order": order }), || order.join("\n"))
}

pub fn edit(ctx: &Context, args: EditArgs) -> Result<()> {
    let mut session = ctx.load_session()?;
    let touches_validation = args.touches_validation();
    let element = session.open_editor(&args.id)?;

    if let Some(title) = args.title {
        element.title = title;
    }
    if let Some(description) = args.description {
        element.description = optional(description);
    }
    if let Some(required) = args.required {
        element.required = required;
    }
    if let Some(placeholder) = args.placeholder {
        element.placeholder = optional(placeholder);
    }
    if let Some(default_value) = args.default_value {
        element.default_value = optional(default_value);
    }

    if touches_validation {
        let element_type = element.element_type();
        let Some(slot) = element.validation_slot() else {
            bail!("{element_type} elements have no validation rules");
        };
        let mut rules = if args.clear_validation {
            ValidationRules::default()
        } else {
            slot.take().unwrap_or_default()
        };
        rules.min_length = args.min_length.or(rules.min_length);
        rules.max_length = args.max_length.or(rules.max_length);
        rules.min = args.min.or(rules.min);
        rules.max = args.max.or(rules.max);
        if let Some(pattern) = args.pattern {
            rules.pattern = optional(pattern);
        }
        *slot = (!rules.is_empty()).then_some(rules);
    }

    session.save_edit()?;
    ctx.commit(&mut session)?;
    let saved = session.store().get(&args.id).cloned();
    ctx.emit(json!(saved), || format!("Updated {}", args.id))
}
