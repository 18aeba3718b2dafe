//! Wire-format documents accepted by the command-registration API.
//!
//! Field order follows the API body. Optional fields that are absent are
//! left out of the JSON entirely rather than sent as `null`.

use serde::{Deserialize, Serialize};
use serde_json::Number;

use crate::types::Localizations;

/// Option type ids used on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum WireOptionType {
    Subcommand,
    SubcommandGroup,
    String,
    Integer,
    Boolean,
    User,
    Channel,
    Role,
    Mentionable,
    Number,
    Attachment,
}

impl From<WireOptionType> for u8 {
    fn from(kind: WireOptionType) -> u8 {
        match kind {
            WireOptionType::Subcommand => 1,
            WireOptionType::SubcommandGroup => 2,
            WireOptionType::String => 3,
            WireOptionType::Integer => 4,
            WireOptionType::Boolean => 5,
            WireOptionType::User => 6,
            WireOptionType::Channel => 7,
            WireOptionType::Role => 8,
            WireOptionType::Mentionable => 9,
            WireOptionType::Number => 10,
            WireOptionType::Attachment => 11,
        }
    }
}

impl TryFrom<u8> for WireOptionType {
    type Error = String;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Ok(match id {
            1 => WireOptionType::Subcommand,
            2 => WireOptionType::SubcommandGroup,
            3 => WireOptionType::String,
            4 => WireOptionType::Integer,
            5 => WireOptionType::Boolean,
            6 => WireOptionType::User,
            7 => WireOptionType::Channel,
            8 => WireOptionType::Role,
            9 => WireOptionType::Mentionable,
            10 => WireOptionType::Number,
            11 => WireOptionType::Attachment,
            other => return Err(format!("unknown option type id {other}")),
        })
    }
}

/// Value of a wire choice: a string for text options, a number otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChoiceValue {
    String(String),
    Number(Number),
}

/// A choice inside a wire option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireChoice {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_localizations: Option<Localizations>,
    pub value: ChoiceValue,
}

/// An option, subcommand, or subcommand group in a wire document.
///
/// Subcommands and groups keep their children in [`options`](Self::options);
/// value options leave it unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireOption {
    #[serde(rename = "type")]
    pub kind: WireOptionType,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_localizations: Option<Localizations>,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_localizations: Option<Localizations>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<WireChoice>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<WireOption>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_types: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autocomplete: Option<bool>,
}

impl WireOption {
    /// Creates an option of `kind` with only its required fields set.
    pub fn new(kind: WireOptionType, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            name_localizations: None,
            description: description.into(),
            description_localizations: None,
            required: None,
            choices: None,
            options: None,
            channel_types: None,
            min_value: None,
            max_value: None,
            min_length: None,
            max_length: None,
            autocomplete: None,
        }
    }
}

/// A complete chat-input command body, ready to send.
///
/// # Examples
///
/// ```
/// use slash_commands_core::WireCommand;
///
/// let doc = WireCommand::new("ping", "pong");
/// assert_eq!(
///     serde_json::to_value(&doc).unwrap(),
///     serde_json::json!({ "name": "ping", "description": "pong", "options": [] }),
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireCommand {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_localizations: Option<Localizations>,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_localizations: Option<Localizations>,
    #[serde(default)]
    pub options: Vec<WireOption>,
    /// Decimal string of the permission bitmask.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_member_permissions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contexts: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nsfw: Option<bool>,
}

impl WireCommand {
    /// Creates a document with a name, description and no options.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            name_localizations: None,
            description: description.into(),
            description_localizations: None,
            options: Vec::new(),
            default_member_permissions: None,
            contexts: None,
            nsfw: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_type_serializes_as_id() {
        let option = WireOption::new(WireOptionType::Attachment, "file", "Upload");
        let value = serde_json::to_value(&option).unwrap();
        assert_eq!(value["type"], 11);
        assert!(value.get("choices").is_none());
    }

    #[test]
    fn test_unknown_option_type_rejected() {
        let err = serde_json::from_str::<WireOption>(
            r#"{ "type": 42, "name": "x", "description": "y" }"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("unknown option type id 42"));
    }

    #[test]
    fn test_choice_value_untagged() {
        let choice: WireChoice =
            serde_json::from_str(r#"{ "name": "three", "value": 3 }"#).unwrap();
        assert_eq!(choice.value, ChoiceValue::Number(3.into()));

        let choice: WireChoice =
            serde_json::from_str(r#"{ "name": "three", "value": "3" }"#).unwrap();
        assert_eq!(choice.value, ChoiceValue::String("3".into()));
    }
}
