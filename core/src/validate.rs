//! Structural checks applied while compiling a command schema.
//!
//! Every failure is a [`CompileError`] that names the command it belongs to
//! and the path to the offending element (e.g. `config set value`), so a
//! loader can report exactly which definition to fix.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Longest accepted name, in characters.
pub const MAX_NAME_LENGTH: usize = 32;
/// Longest accepted description, in characters.
pub const MAX_DESCRIPTION_LENGTH: usize = 100;
/// Most options, choices, subcommands or groups allowed at one level.
pub const MAX_CHILDREN: usize = 25;

static NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[-_\p{Ll}\p{Lo}\p{N}]{1,32}$").expect("name pattern is valid")
});

/// Command compilation errors.
///
/// Each variant is fatal for the command it names and for that command only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// Two mutually exclusive shape fields are both set.
    #[error("command `{command}` cannot combine {first} and {second}")]
    ConflictingShape {
        command: String,
        first: &'static str,
        second: &'static str,
    },
    /// A non-empty permission list contained no known flag.
    #[error("command `{command}` has no valid permission flags in {given:?}")]
    InvalidPermission { command: String, given: Vec<String> },
    /// A name, description or handler is absent where it is required.
    #[error("`{path}` is missing required field `{field}`")]
    MissingRequiredField {
        command: String,
        path: String,
        field: &'static str,
    },
    /// A name does not match the allowed character set or length.
    #[error(
        "`{path}` has invalid name `{name}` (1-32 lowercase letters, digits, `_` or `-`)"
    )]
    InvalidName {
        command: String,
        path: String,
        name: String,
    },
    /// Two siblings share a name.
    #[error("`{path}` defines `{name}` more than once")]
    DuplicateName {
        command: String,
        path: String,
        name: String,
    },
    /// A length or count limit was exceeded.
    #[error("`{path}` has too many {what} (limit {limit})")]
    LimitExceeded {
        command: String,
        path: String,
        what: &'static str,
        limit: usize,
    },
    /// A subcommand group without subcommands.
    #[error("subcommand group `{path}` has no subcommands")]
    EmptySubcommandGroup { command: String, path: String },
    /// A required option placed after an optional one.
    #[error("`{path}`: required option `{option}` follows an optional option")]
    RequiredOptionOrder {
        command: String,
        path: String,
        option: String,
    },
    /// Option-specific constraint violation.
    #[error("option `{path}`: {reason}")]
    InvalidOption {
        command: String,
        path: String,
        reason: String,
    },
}

impl CompileError {
    /// Name of the command the error belongs to.
    pub fn command(&self) -> &str {
        match self {
            CompileError::ConflictingShape { command, .. }
            | CompileError::InvalidPermission { command, .. }
            | CompileError::MissingRequiredField { command, .. }
            | CompileError::InvalidName { command, .. }
            | CompileError::DuplicateName { command, .. }
            | CompileError::LimitExceeded { command, .. }
            | CompileError::EmptySubcommandGroup { command, .. }
            | CompileError::RequiredOptionOrder { command, .. }
            | CompileError::InvalidOption { command, .. } => command,
        }
    }
}

/// Position inside a command being compiled.
#[derive(Debug, Clone)]
pub(crate) struct Trail {
    command: String,
    segments: Vec<String>,
}

impl Trail {
    pub(crate) fn root(command: &str) -> Self {
        let command = if command.is_empty() {
            "<unnamed>".to_string()
        } else {
            command.to_string()
        };
        Self {
            segments: vec![command.clone()],
            command,
        }
    }

    pub(crate) fn child(&self, name: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(if name.is_empty() { "<unnamed>" } else { name }.to_string());
        Self {
            command: self.command.clone(),
            segments,
        }
    }

    pub(crate) fn command(&self) -> String {
        self.command.clone()
    }

    pub(crate) fn path(&self) -> String {
        self.segments.join(" ")
    }

    pub(crate) fn missing(&self, field: &'static str) -> CompileError {
        CompileError::MissingRequiredField {
            command: self.command(),
            path: self.path(),
            field,
        }
    }

    pub(crate) fn invalid_option(&self, reason: impl Into<String>) -> CompileError {
        CompileError::InvalidOption {
            command: self.command(),
            path: self.path(),
            reason: reason.into(),
        }
    }
}

/// Returns `true` if `name` is a valid command, subcommand or option name.
///
/// # Examples
///
/// ```
/// use slash_commands_core::is_valid_name;
///
/// assert!(is_valid_name("set-prefix"));
/// assert!(is_valid_name("top_10"));
/// assert!(!is_valid_name("Ping"));
/// assert!(!is_valid_name("two words"));
/// ```
pub fn is_valid_name(name: &str) -> bool {
    NAME_PATTERN.is_match(name)
}

pub(crate) fn check_name(name: &str, trail: &Trail) -> Result<(), CompileError> {
    if name.is_empty() {
        return Err(trail.missing("name"));
    }
    if !is_valid_name(name) {
        return Err(CompileError::InvalidName {
            command: trail.command(),
            path: trail.path(),
            name: name.to_string(),
        });
    }
    Ok(())
}

pub(crate) fn require_description<'a>(
    description: Option<&'a str>,
    trail: &Trail,
) -> Result<&'a str, CompileError> {
    let description = description
        .filter(|d| !d.trim().is_empty())
        .ok_or_else(|| trail.missing("description"))?;
    if description.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(CompileError::LimitExceeded {
            command: trail.command(),
            path: trail.path(),
            what: "description characters",
            limit: MAX_DESCRIPTION_LENGTH,
        });
    }
    Ok(description)
}

pub(crate) fn check_count(
    count: usize,
    what: &'static str,
    trail: &Trail,
) -> Result<(), CompileError> {
    if count > MAX_CHILDREN {
        return Err(CompileError::LimitExceeded {
            command: trail.command(),
            path: trail.path(),
            what,
            limit: MAX_CHILDREN,
        });
    }
    Ok(())
}

pub(crate) fn check_unique<'a>(
    names: impl IntoIterator<Item = &'a str>,
    trail: &Trail,
) -> Result<(), CompileError> {
    let mut seen: HashSet<&str> = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(CompileError::DuplicateName {
                command: trail.command(),
                path: trail.path(),
                name: name.to_string(),
            });
        }
    }
    Ok(())
}
