//! Named permission flags and their bit positions.

/// Every permission flag the registration API publishes, by name.
pub const PERMISSION_FLAGS: &[(&str, u64)] = &[
    ("CreateInstantInvite", 1 << 0),
    ("KickMembers", 1 << 1),
    ("BanMembers", 1 << 2),
    ("Administrator", 1 << 3),
    ("ManageChannels", 1 << 4),
    ("ManageGuild", 1 << 5),
    ("AddReactions", 1 << 6),
    ("ViewAuditLog", 1 << 7),
    ("PrioritySpeaker", 1 << 8),
    ("Stream", 1 << 9),
    ("ViewChannel", 1 << 10),
    ("SendMessages", 1 << 11),
    ("SendTTSMessages", 1 << 12),
    ("ManageMessages", 1 << 13),
    ("EmbedLinks", 1 << 14),
    ("AttachFiles", 1 << 15),
    ("ReadMessageHistory", 1 << 16),
    ("MentionEveryone", 1 << 17),
    ("UseExternalEmojis", 1 << 18),
    ("ViewGuildInsights", 1 << 19),
    ("Connect", 1 << 20),
    ("Speak", 1 << 21),
    ("MuteMembers", 1 << 22),
    ("DeafenMembers", 1 << 23),
    ("MoveMembers", 1 << 24),
    ("UseVAD", 1 << 25),
    ("ChangeNickname", 1 << 26),
    ("ManageNicknames", 1 << 27),
    ("ManageRoles", 1 << 28),
    ("ManageWebhooks", 1 << 29),
    ("ManageGuildExpressions", 1 << 30),
    ("UseApplicationCommands", 1 << 31),
    ("RequestToSpeak", 1 << 32),
    ("ManageEvents", 1 << 33),
    ("ManageThreads", 1 << 34),
    ("CreatePublicThreads", 1 << 35),
    ("CreatePrivateThreads", 1 << 36),
    ("UseExternalStickers", 1 << 37),
    ("SendMessagesInThreads", 1 << 38),
    ("UseEmbeddedActivities", 1 << 39),
    ("ModerateMembers", 1 << 40),
    ("ViewCreatorMonetizationAnalytics", 1 << 41),
    ("UseSoundboard", 1 << 42),
    ("CreateGuildExpressions", 1 << 43),
    ("CreateEvents", 1 << 44),
    ("UseExternalSounds", 1 << 45),
    ("SendVoiceMessages", 1 << 46),
    ("SendPolls", 1 << 49),
    ("UseExternalApps", 1 << 50),
];

/// Looks up the bit for a permission flag name (case-sensitive).
///
/// # Examples
///
/// ```
/// use slash_commands_core::permission_bit;
///
/// assert_eq!(permission_bit("Administrator"), Some(8));
/// assert_eq!(permission_bit("administrator"), None);
/// ```
pub fn permission_bit(name: &str) -> Option<u64> {
    PERMISSION_FLAGS
        .iter()
        .find(|(flag, _)| *flag == name)
        .map(|(_, bit)| *bit)
}

/// Result of resolving a list of flag names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedPermissions {
    /// OR of every known flag.
    pub mask: u64,
    /// Number of names that resolved to a flag.
    pub valid: usize,
    /// Names that are not permission flags, in input order.
    pub unknown: Vec<String>,
}

/// OR-reduces the named flags, collecting names that are not flags.
pub fn resolve_permissions<S: AsRef<str>>(names: &[S]) -> ResolvedPermissions {
    names
        .iter()
        .fold(ResolvedPermissions::default(), |mut acc, name| {
            match permission_bit(name.as_ref()) {
                Some(bit) => {
                    acc.mask |= bit;
                    acc.valid += 1;
                }
                None => acc.unknown.push(name.as_ref().to_string()),
            }
            acc
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_combines_bits() {
        let resolved = resolve_permissions(&["KickMembers", "BanMembers"]);
        assert_eq!(resolved.mask, 6);
        assert_eq!(resolved.valid, 2);
        assert!(resolved.unknown.is_empty());
    }

    #[test]
    fn test_resolve_collects_unknown() {
        let resolved = resolve_permissions(&["Administrator", "Fly"]);
        assert_eq!(resolved.mask, 8);
        assert_eq!(resolved.unknown, vec!["Fly".to_string()]);
    }

    #[test]
    fn test_high_bits() {
        assert_eq!(permission_bit("SendPolls"), Some(1 << 49));
    }
}
