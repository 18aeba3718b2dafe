//! Declarative chat command schemas and their compiler.
//!
//! This crate defines the types a developer uses to describe a chat command
//! and the compiler that turns them into the body the command-registration
//! API accepts:
//!
//! - [`CommandSchema`]: a command with its name, description,
//!   localizations, permissions and exactly one nested shape.
//! - [`SubcommandSchema`] / [`SubcommandGroupSchema`]: nested commands.
//! - [`OptionSchema`]: a tagged union over the supported option kinds.
//! - [`WireCommand`]: the compiled, normalized wire document.
//!
//! [`compile()`] validates shape exclusivity, names, descriptions,
//! permissions and size limits, and fails with a [`CompileError`] that names
//! the offending command.
//!
//! # Example
//!
//! ```
//! use slash_commands_core::*;
//!
//! let schema = CommandSchema::new("echo", "Repeat a message").with_option(
//!     OptionSchema::text("message", "What to repeat")
//!         .required()
//!         .with_length(Some(1), Some(200)),
//! );
//!
//! let doc = compile(&schema).unwrap();
//! assert_eq!(doc.name, "echo");
//! assert_eq!(doc.options[0].kind, WireOptionType::String);
//! assert_eq!(doc.options[0].max_length, Some(200));
//! ```

mod compile;
mod permissions;
mod types;
mod validate;
mod wire;

pub use compile::{check_prebuilt, compile};
pub use permissions::{PERMISSION_FLAGS, ResolvedPermissions, permission_bit, resolve_permissions};
pub use types::*;
pub use validate::{
    CompileError, MAX_CHILDREN, MAX_DESCRIPTION_LENGTH, MAX_NAME_LENGTH, is_valid_name,
};
pub use wire::{ChoiceValue, WireChoice, WireCommand, WireOption, WireOptionType};
