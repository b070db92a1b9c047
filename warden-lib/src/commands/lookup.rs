use crate::{
    data::PoiseContext,
    error_handler::{BucketKind, CommandError},
    limits::BucketTarget,
};
use color_eyre::eyre::{Result, WrapErr};
use poise::{CreateReply, serenity_prelude::CreateEmbed};
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

const LOOKUP_COOLDOWN: Duration = Duration::from_secs(5);

#[derive(Deserialize, Debug, PartialEq)]
struct Profile {
    id: String,
    name: String,
}

fn is_valid_username(name: &str) -> bool {
    (3..=16).contains(&name.len())
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn parse_profile(body: &str) -> Result<Profile> {
    serde_json::from_str(body).wrap_err("Username API sent something that isn't a profile")
}

/// `0123456789abcdef0123456789abcdef` -> `01234567-89ab-cdef-0123-456789abcdef`.
/// Anything that isn't 32 hex digits is left alone.
fn hyphenate_uuid(id: &str) -> String {
    if id.len() != 32 || !id.chars().all(|c| c.is_ascii_hexdigit()) {
        return id.to_owned();
    }

    format!(
        "{}-{}-{}-{}-{}",
        &id[..8],
        &id[8..12],
        &id[12..16],
        &id[16..20],
        &id[20..]
    )
}

/// Look up an account by its username
#[poise::command(slash_command, prefix_command)]
pub async fn lookup(
    ctx: PoiseContext<'_>,
    #[description = "The username to look up"] username: String,
) -> Result<()> {
    if !is_valid_username(&username) {
        return Err(CommandError::BadArgument(format!(
            "`{username}` isn't a valid username. Usernames are 3 to 16 letters, digits or underscores."
        ))
        .into());
    }

    let target = BucketTarget::of(ctx).await;
    ctx.data()
        .cooldowns
        .check("lookup", BucketKind::User, LOOKUP_COOLDOWN, &target)?;

    ctx.defer().await?;

    let base = ctx.data().config.read().await.username_lookup_url.clone();
    let response = ctx
        .data()
        .http
        .get(format!("{}/{username}", base.trim_end_matches('/')))
        .send()
        .await
        .wrap_err("Username API is unreachable")?;

    if matches!(
        response.status(),
        StatusCode::NOT_FOUND | StatusCode::NO_CONTENT
    ) {
        ctx.say(format!("No account is named `{username}`.")).await?;
        return Ok(());
    }

    let body = response
        .error_for_status()
        .wrap_err("Username API returned an error")?
        .text()
        .await?;
    let profile = parse_profile(&body)?;

    ctx.send(
        CreateReply::default().embed(
            CreateEmbed::new()
                .title(&profile.name)
                .field("ID", format!("`{}`", hyphenate_uuid(&profile.id)), false),
        ),
    )
    .await?;

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn validates_usernames() {
        assert!(is_valid_username("Notch"));
        assert!(is_valid_username("a_b_c_123"));
        assert!(!is_valid_username("ab"));
        assert!(!is_valid_username("seventeen_chars_x"));
        assert!(!is_valid_username("no spaces"));
        assert!(!is_valid_username("../../etc"));
    }

    #[test]
    fn parses_profiles() {
        let body = r#"{"id":"069a79f444e94726a5befca90e38aaf5","name":"Notch"}"#;

        assert_eq!(parse_profile(body).unwrap(), Profile {
            id: "069a79f444e94726a5befca90e38aaf5".to_owned(),
            name: "Notch".to_owned(),
        });
        assert!(parse_profile(r#"{"errorMessage":"nope"}"#).is_err());
    }

    #[test]
    fn hyphenates_ids() {
        assert_eq!(
            hyphenate_uuid("069a79f444e94726a5befca90e38aaf5"),
            "069a79f4-44e9-4726-a5be-fca90e38aaf5"
        );
        assert_eq!(hyphenate_uuid("short"), "short");
    }
}
