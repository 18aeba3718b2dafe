//! Declarative schema types for chat commands.
//!
//! These types describe a command the way a developer writes it: a name and
//! description, optional localizations and permissions, and exactly one
//! nested shape (flat options, subcommands, or subcommand groups). They are
//! designed for serialization with [`serde`] so command definitions can live
//! in JSON or YAML files, and they carry no behavior beyond small builder
//! helpers. The [`compile`](crate::compile()) function turns them into the
//! wire format.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Number;

/// Locale code → localized string (e.g. `"de" → "Befehl"`).
///
/// Ordered so that compiling the same schema always yields the same bytes.
pub type Localizations = BTreeMap<String, String>;

/// Where a command may be invoked.
///
/// # Examples
///
/// ```
/// use slash_commands_core::CommandContext;
///
/// assert_eq!(CommandContext::Guild.context_ids(), vec![0]);
/// assert_eq!(CommandContext::Both.context_ids(), vec![0, 1]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandContext {
    /// Only inside guilds.
    Guild,
    /// Only in direct messages with the application.
    Dm,
    /// Guilds and direct messages.
    Both,
}

impl CommandContext {
    /// Returns the interaction context ids the registration API expects.
    pub fn context_ids(self) -> Vec<u8> {
        match self {
            CommandContext::Guild => vec![0],
            CommandContext::Dm => vec![1],
            CommandContext::Both => vec![0, 1],
        }
    }
}

/// Channel kinds a `channel` option can be restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelType {
    GuildText,
    GuildVoice,
    GuildCategory,
    GuildAnnouncement,
    AnnouncementThread,
    PublicThread,
    PrivateThread,
    GuildStageVoice,
    GuildForum,
    GuildMedia,
}

impl ChannelType {
    /// Numeric channel type id used on the wire.
    pub fn id(self) -> u8 {
        match self {
            ChannelType::GuildText => 0,
            ChannelType::GuildVoice => 2,
            ChannelType::GuildCategory => 4,
            ChannelType::GuildAnnouncement => 5,
            ChannelType::AnnouncementThread => 10,
            ChannelType::PublicThread => 11,
            ChannelType::PrivateThread => 12,
            ChannelType::GuildStageVoice => 13,
            ChannelType::GuildForum => 15,
            ChannelType::GuildMedia => 16,
        }
    }
}

/// A predefined value the user can pick for an option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice<T> {
    /// Label shown to the user.
    pub name: String,
    /// Localized labels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_localizations: Option<Localizations>,
    /// Value sent back when the choice is picked.
    pub value: T,
}

impl<T> Choice<T> {
    /// Creates a choice without localizations.
    pub fn new(name: impl Into<String>, value: T) -> Self {
        Self {
            name: name.into(),
            name_localizations: None,
            value,
        }
    }
}

/// Fields shared by every option kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptionBase {
    /// Option name (lowercase, alphanumeric, `_` or `-`).
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_localizations: Option<Localizations>,
    /// Required for every option.
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_localizations: Option<Localizations>,
    /// Whether the user must supply a value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
}

impl OptionBase {
    /// Creates the shared fields for an option.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            ..Default::default()
        }
    }
}

/// A `text` option.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextOption {
    #[serde(flatten)]
    pub base: OptionBase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autocomplete: Option<bool>,
    #[serde(default, alias = "choises", skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<Choice<String>>>,
}

/// An `integer` or `number` option.
///
/// Bounds and choice values keep their source representation, so `3` stays
/// an integer and `2.5` stays a float on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NumericOption {
    #[serde(flatten)]
    pub base: OptionBase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autocomplete: Option<bool>,
    #[serde(default, alias = "choises", skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<Choice<Number>>>,
}

/// A `channel` option.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelOption {
    #[serde(flatten)]
    pub base: OptionBase,
    /// Channel kinds the user may pick; all kinds when absent.
    #[serde(
        default,
        alias = "channel_types",
        skip_serializing_if = "Option::is_none"
    )]
    pub allowed_channel_types: Option<Vec<ChannelType>>,
}

/// One option of a command or subcommand, tagged by `type`.
///
/// Kinds that do not support a field simply do not have it: an input
/// document that puts `choices` on a `boolean` option deserializes fine and
/// the extra field is dropped.
///
/// # Examples
///
/// ```
/// use slash_commands_core::{OptionKind, OptionSchema};
///
/// let option: OptionSchema = serde_json::from_str(
///     r#"{ "type": "boolean", "name": "ephemeral", "description": "Only you can see it" }"#,
/// ).unwrap();
/// assert_eq!(option.kind(), OptionKind::Boolean);
/// assert_eq!(option.name(), "ephemeral");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OptionSchema {
    Text(TextOption),
    Integer(NumericOption),
    Number(NumericOption),
    Boolean(OptionBase),
    User(OptionBase),
    Channel(ChannelOption),
    Role(OptionBase),
    Mentionable(OptionBase),
    Attachment(OptionBase),
}

/// Option kind without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionKind {
    Text,
    Integer,
    Number,
    Boolean,
    User,
    Channel,
    Role,
    Mentionable,
    Attachment,
}

impl OptionSchema {
    /// Creates a `text` option.
    pub fn text(name: impl Into<String>, description: impl Into<String>) -> TextOption {
        TextOption {
            base: OptionBase::new(name, description),
            ..Default::default()
        }
    }

    /// Creates the payload for an `integer` or `number` option.
    pub fn numeric(name: impl Into<String>, description: impl Into<String>) -> NumericOption {
        NumericOption {
            base: OptionBase::new(name, description),
            ..Default::default()
        }
    }

    /// Creates a `boolean` option.
    pub fn boolean(name: impl Into<String>, description: impl Into<String>) -> Self {
        OptionSchema::Boolean(OptionBase::new(name, description))
    }

    /// Creates a `user` option.
    pub fn user(name: impl Into<String>, description: impl Into<String>) -> Self {
        OptionSchema::User(OptionBase::new(name, description))
    }

    /// Shared fields of this option.
    pub fn base(&self) -> &OptionBase {
        match self {
            OptionSchema::Text(o) => &o.base,
            OptionSchema::Integer(o) | OptionSchema::Number(o) => &o.base,
            OptionSchema::Channel(o) => &o.base,
            OptionSchema::Boolean(base)
            | OptionSchema::User(base)
            | OptionSchema::Role(base)
            | OptionSchema::Mentionable(base)
            | OptionSchema::Attachment(base) => base,
        }
    }

    /// Option name.
    pub fn name(&self) -> &str {
        &self.base().name
    }

    /// Returns `true` when the option is marked required.
    pub fn is_required(&self) -> bool {
        self.base().required.unwrap_or(false)
    }

    /// Kind tag of this option.
    pub fn kind(&self) -> OptionKind {
        match self {
            OptionSchema::Text(_) => OptionKind::Text,
            OptionSchema::Integer(_) => OptionKind::Integer,
            OptionSchema::Number(_) => OptionKind::Number,
            OptionSchema::Boolean(_) => OptionKind::Boolean,
            OptionSchema::User(_) => OptionKind::User,
            OptionSchema::Channel(_) => OptionKind::Channel,
            OptionSchema::Role(_) => OptionKind::Role,
            OptionSchema::Mentionable(_) => OptionKind::Mentionable,
            OptionSchema::Attachment(_) => OptionKind::Attachment,
        }
    }
}

impl From<TextOption> for OptionSchema {
    fn from(option: TextOption) -> Self {
        OptionSchema::Text(option)
    }
}

impl From<ChannelOption> for OptionSchema {
    fn from(option: ChannelOption) -> Self {
        OptionSchema::Channel(option)
    }
}

impl TextOption {
    /// Marks the option as required.
    pub fn required(mut self) -> Self {
        self.base.required = Some(true);
        self
    }

    /// Sets the accepted length range.
    pub fn with_length(mut self, min: Option<u16>, max: Option<u16>) -> Self {
        self.min_length = min;
        self.max_length = max;
        self
    }

    /// Appends a choice.
    pub fn with_choice(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.choices
            .get_or_insert_with(Vec::new)
            .push(Choice::new(name, value.into()));
        self
    }
}

impl NumericOption {
    /// Marks the option as required.
    pub fn required(mut self) -> Self {
        self.base.required = Some(true);
        self
    }

    /// Sets the accepted value range.
    pub fn with_range(mut self, min: Option<Number>, max: Option<Number>) -> Self {
        self.min_value = min;
        self.max_value = max;
        self
    }

    /// Appends a choice.
    pub fn with_choice(mut self, name: impl Into<String>, value: impl Into<Number>) -> Self {
        self.choices
            .get_or_insert_with(Vec::new)
            .push(Choice::new(name, value.into()));
        self
    }
}

/// A subcommand: named, described, with a flat option list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubcommandSchema {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_localizations: Option<Localizations>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_localizations: Option<Localizations>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<OptionSchema>>,
}

impl SubcommandSchema {
    /// Creates a subcommand with no options.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: Some(description.into()),
            ..Default::default()
        }
    }

    /// Appends an option.
    pub fn with_option(mut self, option: impl Into<OptionSchema>) -> Self {
        self.options.get_or_insert_with(Vec::new).push(option.into());
        self
    }
}

/// A named group of subcommands.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubcommandGroupSchema {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_localizations: Option<Localizations>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_localizations: Option<Localizations>,
    /// Must not be empty.
    #[serde(default)]
    pub subcommands: Vec<SubcommandSchema>,
}

impl SubcommandGroupSchema {
    /// Creates an empty group.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: Some(description.into()),
            ..Default::default()
        }
    }

    /// Appends a subcommand.
    pub fn with_subcommand(mut self, subcommand: SubcommandSchema) -> Self {
        self.subcommands.push(subcommand);
        self
    }
}

/// Declarative description of one chat command.
///
/// At most one of [`options`](Self::options),
/// [`subcommands`](Self::subcommands) and
/// [`subcommand_groups`](Self::subcommand_groups) may be set; the compiler
/// rejects any other combination.
///
/// # Examples
///
/// ```
/// use slash_commands_core::*;
///
/// let schema = CommandSchema::new("config", "Manage settings")
///     .with_permission("ManageGuild")
///     .with_subcommand(
///         SubcommandSchema::new("show", "Print the current settings"),
///     );
///
/// assert_eq!(schema.name, "config");
/// assert!(schema.options.is_none());
/// assert_eq!(schema.subcommands.as_ref().map(Vec::len), Some(1));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommandSchema {
    /// Unique command name.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_localizations: Option<Localizations>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_localizations: Option<Localizations>,
    /// Named permission flags a member needs by default (e.g. `"BanMembers"`).
    #[serde(default, alias = "permisions", skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<CommandContext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nsfw: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<OptionSchema>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcommands: Option<Vec<SubcommandSchema>>,
    #[serde(
        default,
        alias = "subcommandgroups",
        skip_serializing_if = "Option::is_none"
    )]
    pub subcommand_groups: Option<Vec<SubcommandGroupSchema>>,
}

impl CommandSchema {
    /// Creates a command with a name and description and nothing else.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: Some(description.into()),
            ..Default::default()
        }
    }

    /// Appends a top-level option.
    pub fn with_option(mut self, option: impl Into<OptionSchema>) -> Self {
        self.options.get_or_insert_with(Vec::new).push(option.into());
        self
    }

    /// Appends a subcommand.
    pub fn with_subcommand(mut self, subcommand: SubcommandSchema) -> Self {
        self.subcommands
            .get_or_insert_with(Vec::new)
            .push(subcommand);
        self
    }

    /// Appends a subcommand group.
    pub fn with_group(mut self, group: SubcommandGroupSchema) -> Self {
        self.subcommand_groups
            .get_or_insert_with(Vec::new)
            .push(group);
        self
    }

    /// Adds a named permission flag.
    pub fn with_permission(mut self, flag: impl Into<String>) -> Self {
        self.permissions
            .get_or_insert_with(Vec::new)
            .push(flag.into());
        self
    }

    /// Restricts where the command can be used.
    pub fn with_context(mut self, context: CommandContext) -> Self {
        self.context = Some(context);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_field_aliases() {
        let schema: CommandSchema = serde_json::from_value(serde_json::json!({
            "name": "ban",
            "description": "Ban a member",
            "permisions": ["BanMembers"],
            "subcommandgroups": [{
                "name": "list",
                "description": "Lists",
                "subcommands": [{ "name": "show", "description": "Show" }]
            }]
        }))
        .unwrap();

        assert_eq!(schema.permissions, Some(vec!["BanMembers".to_string()]));
        assert_eq!(schema.subcommand_groups.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn test_option_kind_tagging() {
        let option: OptionSchema = serde_json::from_value(serde_json::json!({
            "type": "text",
            "name": "query",
            "description": "Search text",
            "required": true,
            "min_length": 2,
            "choises": [{ "name": "a", "value": "a" }]
        }))
        .unwrap();

        assert_eq!(option.kind(), OptionKind::Text);
        assert!(option.is_required());
        let OptionSchema::Text(text) = option else {
            panic!("expected a text option");
        };
        assert_eq!(text.min_length, Some(2));
        assert_eq!(text.choices.map(|c| c.len()), Some(1));
    }

    #[test]
    fn test_missing_shape_fields_are_none() {
        let schema: CommandSchema =
            serde_json::from_str(r#"{ "name": "ping", "description": "pong" }"#).unwrap();
        assert!(schema.options.is_none());
        assert!(schema.subcommands.is_none());
        assert!(schema.subcommand_groups.is_none());
    }

    #[test]
    fn test_channel_type_ids() {
        assert_eq!(ChannelType::GuildText.id(), 0);
        assert_eq!(ChannelType::GuildForum.id(), 15);
    }
}
