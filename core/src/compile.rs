//! Compilation of declarative schemas into wire documents.
//!
//! Compilation is a pure, recursive fold: every level returns a finished
//! [`WireOption`] or [`WireCommand`] built in one expression from its
//! validated children. Nothing is mutated after construction, so a failure
//! deep inside a subcommand leaves no half-built document behind.
//!
//! The output depends only on the input value. Lists keep their source
//! order and localization maps are ordered, so compiling the same schema
//! twice produces byte-identical JSON.

use serde_json::Number;
use tracing::warn;

use crate::permissions::resolve_permissions;
use crate::types::{
    Choice, CommandSchema, NumericOption, OptionBase, OptionSchema, SubcommandGroupSchema,
    SubcommandSchema, TextOption,
};
use crate::validate::{
    CompileError, Trail, check_count, check_name, check_unique, require_description,
};
use crate::wire::{ChoiceValue, WireChoice, WireCommand, WireOption, WireOptionType};

/// Compiles a command schema into its wire document.
///
/// # Errors
///
/// Returns a [`CompileError`] naming the command when the schema combines
/// mutually exclusive shapes, lists only unknown permission flags, lacks a
/// required name or description, or violates a naming, ordering or size
/// rule.
///
/// # Examples
///
/// ```
/// use slash_commands_core::{CommandSchema, CompileError, SubcommandSchema, compile};
///
/// let doc = compile(&CommandSchema::new("ping", "pong")).unwrap();
/// assert_eq!(
///     serde_json::to_value(&doc).unwrap(),
///     serde_json::json!({ "name": "ping", "description": "pong", "options": [] }),
/// );
///
/// let mut bad = CommandSchema::new("admin", "Admin tools")
///     .with_subcommand(SubcommandSchema::new("kick", "Kick someone"));
/// bad.options = Some(Vec::new());
/// assert!(matches!(compile(&bad), Err(CompileError::ConflictingShape { .. })));
/// ```
pub fn compile(schema: &CommandSchema) -> Result<WireCommand, CompileError> {
    let trail = Trail::root(&schema.name);
    check_shape(schema)?;
    check_name(&schema.name, &trail)?;
    let description = require_description(schema.description.as_deref(), &trail)?;
    let default_member_permissions = compile_permissions(schema)?;

    let options = match (&schema.subcommand_groups, &schema.subcommands) {
        (Some(groups), _) => {
            check_count(groups.len(), "subcommand groups", &trail)?;
            check_unique(groups.iter().map(|g| g.name.as_str()), &trail)?;
            groups
                .iter()
                .map(|group| compile_group(group, &trail))
                .collect::<Result<Vec<_>, _>>()?
        }
        (None, Some(subcommands)) => compile_subcommands(subcommands, &trail)?,
        (None, None) => compile_options(schema.options.as_deref().unwrap_or_default(), &trail)?,
    };

    Ok(WireCommand {
        name: schema.name.clone(),
        name_localizations: schema.name_localizations.clone(),
        description: description.to_string(),
        description_localizations: schema.description_localizations.clone(),
        options,
        default_member_permissions,
        contexts: schema.context.map(|c| c.context_ids()),
        nsfw: schema.nsfw,
    })
}

/// Checks a pre-built wire document supplied in place of a schema.
///
/// Such documents skip compilation; only their name is validated so that
/// they can be keyed in a registry.
///
/// # Errors
///
/// Returns [`CompileError::MissingRequiredField`] or
/// [`CompileError::InvalidName`] for an empty or malformed name.
pub fn check_prebuilt(doc: &WireCommand) -> Result<(), CompileError> {
    check_name(&doc.name, &Trail::root(&doc.name))
}

fn check_shape(schema: &CommandSchema) -> Result<(), CompileError> {
    let conflict = match (
        schema.subcommand_groups.is_some(),
        schema.subcommands.is_some(),
        schema.options.is_some(),
    ) {
        (true, true, _) => Some(("subcommand groups", "subcommands")),
        (true, false, true) => Some(("subcommand groups", "options")),
        (false, true, true) => Some(("subcommands", "options")),
        _ => None,
    };

    match conflict {
        Some((first, second)) => Err(CompileError::ConflictingShape {
            command: schema.name.clone(),
            first,
            second,
        }),
        None => Ok(()),
    }
}

fn compile_permissions(schema: &CommandSchema) -> Result<Option<String>, CompileError> {
    let Some(names) = schema.permissions.as_deref().filter(|n| !n.is_empty()) else {
        return Ok(None);
    };

    let resolved = resolve_permissions(names);
    for unknown in &resolved.unknown {
        warn!(command = %schema.name, flag = %unknown, "ignoring unknown permission flag");
    }
    if resolved.valid == 0 {
        return Err(CompileError::InvalidPermission {
            command: schema.name.clone(),
            given: names.to_vec(),
        });
    }
    Ok(Some(resolved.mask.to_string()))
}

fn compile_group(group: &SubcommandGroupSchema, parent: &Trail) -> Result<WireOption, CompileError> {
    let trail = parent.child(&group.name);
    check_name(&group.name, &trail)?;
    let description = require_description(group.description.as_deref(), &trail)?;
    if group.subcommands.is_empty() {
        return Err(CompileError::EmptySubcommandGroup {
            command: trail.command(),
            path: trail.path(),
        });
    }

    Ok(WireOption {
        name_localizations: group.name_localizations.clone(),
        description_localizations: group.description_localizations.clone(),
        options: Some(compile_subcommands(&group.subcommands, &trail)?),
        ..WireOption::new(WireOptionType::SubcommandGroup, &group.name, description)
    })
}

fn compile_subcommands(
    subcommands: &[SubcommandSchema],
    trail: &Trail,
) -> Result<Vec<WireOption>, CompileError> {
    check_count(subcommands.len(), "subcommands", trail)?;
    check_unique(subcommands.iter().map(|s| s.name.as_str()), trail)?;
    subcommands
        .iter()
        .map(|sub| compile_subcommand(sub, trail))
        .collect()
}

fn compile_subcommand(sub: &SubcommandSchema, parent: &Trail) -> Result<WireOption, CompileError> {
    let trail = parent.child(&sub.name);
    check_name(&sub.name, &trail)?;
    let description = require_description(sub.description.as_deref(), &trail)?;

    Ok(WireOption {
        name_localizations: sub.name_localizations.clone(),
        description_localizations: sub.description_localizations.clone(),
        options: Some(compile_options(
            sub.options.as_deref().unwrap_or_default(),
            &trail,
        )?),
        ..WireOption::new(WireOptionType::Subcommand, &sub.name, description)
    })
}

fn compile_options(options: &[OptionSchema], trail: &Trail) -> Result<Vec<WireOption>, CompileError> {
    check_count(options.len(), "options", trail)?;
    check_unique(options.iter().map(OptionSchema::name), trail)?;

    let mut seen_optional = false;
    for option in options {
        if !option.is_required() {
            seen_optional = true;
        } else if seen_optional {
            return Err(CompileError::RequiredOptionOrder {
                command: trail.command(),
                path: trail.path(),
                option: option.name().to_string(),
            });
        }
    }

    options
        .iter()
        .map(|option| compile_option(option, trail))
        .collect()
}

fn compile_option(option: &OptionSchema, parent: &Trail) -> Result<WireOption, CompileError> {
    let base = option.base();
    let trail = parent.child(&base.name);

    match option {
        OptionSchema::Text(text) => compile_text(text, &trail),
        OptionSchema::Integer(numeric) => compile_numeric(numeric, WireOptionType::Integer, &trail),
        OptionSchema::Number(numeric) => compile_numeric(numeric, WireOptionType::Number, &trail),
        OptionSchema::Channel(channel) => Ok(WireOption {
            channel_types: channel
                .allowed_channel_types
                .as_ref()
                .map(|types| types.iter().map(|t| t.id()).collect()),
            ..compile_base(&channel.base, WireOptionType::Channel, &trail)?
        }),
        OptionSchema::Boolean(base) => compile_base(base, WireOptionType::Boolean, &trail),
        OptionSchema::User(base) => compile_base(base, WireOptionType::User, &trail),
        OptionSchema::Role(base) => compile_base(base, WireOptionType::Role, &trail),
        OptionSchema::Mentionable(base) => compile_base(base, WireOptionType::Mentionable, &trail),
        OptionSchema::Attachment(base) => compile_base(base, WireOptionType::Attachment, &trail),
    }
}

fn compile_base(base: &OptionBase, kind: WireOptionType, trail: &Trail) -> Result<WireOption, CompileError> {
    check_name(&base.name, trail)?;
    let description = require_description(Some(base.description.as_str()), trail)?;

    Ok(WireOption {
        name_localizations: base.name_localizations.clone(),
        description_localizations: base.description_localizations.clone(),
        required: base.required,
        ..WireOption::new(kind, &base.name, description)
    })
}

fn compile_text(text: &TextOption, trail: &Trail) -> Result<WireOption, CompileError> {
    if let (Some(min), Some(max)) = (text.min_length, text.max_length) {
        if min > max {
            return Err(trail.invalid_option(format!(
                "min_length {min} is greater than max_length {max}"
            )));
        }
    }

    Ok(WireOption {
        min_length: text.min_length,
        max_length: text.max_length,
        autocomplete: text.autocomplete,
        choices: compile_choices(text.choices.as_deref(), text.autocomplete, trail, |value| {
            ChoiceValue::String(value.clone())
        })?,
        ..compile_base(&text.base, WireOptionType::String, trail)?
    })
}

fn compile_numeric(
    numeric: &NumericOption,
    kind: WireOptionType,
    trail: &Trail,
) -> Result<WireOption, CompileError> {
    if kind == WireOptionType::Integer {
        let bounds = numeric.min_value.iter().chain(numeric.max_value.iter());
        let choices = numeric.choices.iter().flatten().map(|c| &c.value);
        if let Some(value) = bounds.chain(choices).find(|n| !is_integer(n)) {
            return Err(trail.invalid_option(format!("{value} is not an integer")));
        }
    }
    if let (Some(min), Some(max)) = (&numeric.min_value, &numeric.max_value) {
        if min.as_f64() > max.as_f64() {
            return Err(trail.invalid_option(format!(
                "min_value {min} is greater than max_value {max}"
            )));
        }
    }

    Ok(WireOption {
        min_value: numeric.min_value.clone(),
        max_value: numeric.max_value.clone(),
        autocomplete: numeric.autocomplete,
        choices: compile_choices(numeric.choices.as_deref(), numeric.autocomplete, trail, |value| {
            ChoiceValue::Number(value.clone())
        })?,
        ..compile_base(&numeric.base, kind, trail)?
    })
}

fn compile_choices<T>(
    choices: Option<&[Choice<T>]>,
    autocomplete: Option<bool>,
    trail: &Trail,
    to_value: impl Fn(&T) -> ChoiceValue,
) -> Result<Option<Vec<WireChoice>>, CompileError> {
    let Some(choices) = choices.filter(|c| !c.is_empty()) else {
        return Ok(None);
    };
    if autocomplete == Some(true) {
        return Err(trail.invalid_option("autocomplete and choices are mutually exclusive"));
    }
    check_count(choices.len(), "choices", trail)?;

    Ok(Some(
        choices
            .iter()
            .map(|choice| WireChoice {
                name: choice.name.clone(),
                name_localizations: choice.name_localizations.clone(),
                value: to_value(&choice.value),
            })
            .collect(),
    ))
}

fn is_integer(n: &Number) -> bool {
    n.is_i64() || n.is_u64()
}
