use serde::{Deserialize, Serialize};

/// User facing templates, one per recognized error kind.
///
/// Placeholders are written `{name}` and filled by [`render`]. Any template
/// missing from the config file falls back to the English default.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ErrorMessages {
    /// `{command}`, `{bot}`
    pub not_owner: String,
    pub too_many_arguments: String,
    /// `{permissions}`
    pub missing_user_permissions: String,
    /// `{permissions}`
    pub missing_bot_permissions: String,
    /// `{parameter}`
    pub missing_argument: String,
    /// `{argument}`
    pub bad_emoji: String,
    /// `{seconds}`, `{bucket}`
    pub cooldown: String,
    /// `{max}`, `{bucket}`
    pub max_concurrency: String,
    /// `{argument}`
    pub member_not_found: String,
    /// `{argument}`
    pub user_not_found: String,
    pub bad_argument_fallback: String,
    pub guild_only: String,
    pub dm_only: String,
    pub nsfw_only: String,
}

impl Default for ErrorMessages {
    fn default() -> Self {
        ErrorMessages {
            not_owner: "`{command}` can only be used by the owner of {bot}.".to_owned(),
            too_many_arguments: "You gave this command more arguments than it takes.".to_owned(),
            missing_user_permissions: "You need the {permissions} permission(s) to use this command."
                .to_owned(),
            missing_bot_permissions: "I need the {permissions} permission(s) to run this command."
                .to_owned(),
            missing_argument: "{parameter} is a required argument that is missing.".to_owned(),
            bad_emoji: "`{argument}` is not an emoji I can use.".to_owned(),
            cooldown: "This command is on cooldown{bucket}. Try again in {seconds}s.".to_owned(),
            max_concurrency: "This command can only run {max} time(s) at once{bucket}.".to_owned(),
            member_not_found: "I couldn't find a member matching `{argument}`.".to_owned(),
            user_not_found: "I couldn't find a user matching `{argument}`.".to_owned(),
            bad_argument_fallback: "One of the arguments you gave couldn't be understood."
                .to_owned(),
            guild_only: "This command can only be used in a server.".to_owned(),
            dm_only: "This command can only be used in DMs.".to_owned(),
            nsfw_only: "This command can only be used in NSFW channels.".to_owned(),
        }
    }
}

/// Fills every `{key}` in `template`. Unknown placeholders are left as is.
pub fn render(template: &str, values: &[(&str, &str)]) -> String {
    values
        .iter()
        .fold(template.to_owned(), |text, (key, value)| {
            text.replace(&format!("{{{key}}}"), value)
        })
}

/// ` (per user)` for scoped buckets, nothing for the default one.
pub fn bucket_suffix(label: &str) -> String {
    if label.is_empty() {
        String::new()
    } else {
        format!(" ({label})")
    }
}
