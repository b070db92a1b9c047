use crate::{config::Config, data::State};
use warden_traits::ForwardRefToTracing;
use color_eyre::eyre::{Result, WrapErr};
use itertools::Itertools;
use poise::serenity_prelude::{Context, Mentionable, Message};
use regex::Regex;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use std::{path::Path, sync::LazyLock};

static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bhttps?://[^\s<>()\[\]]+").expect("link regex is valid"));

/// Whole-word, case-insensitive banned word filter.
#[derive(Debug, Default)]
pub struct BannedWords {
    pattern: Option<Regex>,
}

impl BannedWords {
    /// One word per line. Blank lines and `#` comments are skipped.
    pub fn parse(text: &str) -> Result<Self> {
        let words = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(regex::escape)
            .collect_vec();

        if words.is_empty() {
            return Ok(Self::default());
        }

        let pattern = Regex::new(&format!(r"(?i)\b(?:{})\b", words.join("|")))
            .wrap_err("Failed to compile banned words")?;

        Ok(Self {
            pattern: Some(pattern),
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Could not read {}", path.display()))?;

        let words = Self::parse(&text)?;
        tracing::info!("loaded banned words from {}", path.display());

        Ok(words)
    }

    /// A broken or missing file disables the filter instead of stopping the bot.
    pub fn from_config(config: &Config) -> Self {
        config
            .banned_words_path
            .as_ref()
            .and_then(|path| Self::load(path).warn_err_ok("Automod disabled"))
            .unwrap_or_default()
    }

    pub fn find<'a>(&self, content: &'a str) -> Option<&'a str> {
        self.pattern
            .as_ref()?
            .find(content)
            .map(|found| found.as_str())
    }
}

/// Where links are checked. No url means links aren't checked at all.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LinkCheckConfig {
    pub reputation_url: Option<String>,
    /// Matches the service trusts less than this are let through.
    pub min_trust_rating: f64,
}

impl Default for LinkCheckConfig {
    fn default() -> Self {
        LinkCheckConfig {
            reputation_url: None,
            min_trust_rating: 0.5,
        }
    }
}

/// Every distinct `http(s)` link in `content`, without trailing punctuation.
pub fn extract_links(content: &str) -> Vec<&str> {
    LINK.find_iter(content)
        .map(|found| {
            found
                .as_str()
                .trim_end_matches(['.', ',', '!', '?', ':', ';', '\'', '"'])
        })
        .unique()
        .collect()
}

#[derive(Deserialize)]
struct Reputation {
    #[serde(rename = "match")]
    matched: bool,
    #[serde(default)]
    matches: Vec<ReputationMatch>,
}

#[derive(Deserialize)]
struct ReputationMatch {
    domain: String,
    trust_rating: f64,
}

/// The first domain in a reputation response rated at least `min_trust_rating`.
pub fn flagged_domain(body: &str, min_trust_rating: f64) -> Result<Option<String>> {
    let reputation = serde_json::from_str::<Reputation>(body)
        .wrap_err("Reputation API sent something that isn't a verdict")?;

    if !reputation.matched {
        return Ok(None);
    }

    Ok(reputation
        .matches
        .into_iter()
        .find(|found| found.trust_rating >= min_trust_rating)
        .map(|found| found.domain))
}

async fn check_link(
    data: &State,
    config: &LinkCheckConfig,
    url: &str,
    link: &str,
) -> Result<Option<String>> {
    let body = data
        .http
        .post(url)
        .header(CONTENT_TYPE, "application/json")
        .header(USER_AGENT, "warden")
        .body(serde_json::json!({ "message": link }).to_string())
        .send()
        .await
        .wrap_err("Reputation API is unreachable")?
        .error_for_status()
        .wrap_err("Reputation API returned an error")?
        .text()
        .await?;

    flagged_domain(&body, config.min_trust_rating)
}

/// A link check that fails lets the link through.
async fn flagged_link(data: &State, content: &str) -> Option<String> {
    let config = data.config.read().await.links.clone();
    let url = config.reputation_url.as_deref()?;

    for link in extract_links(content) {
        if let Some(domain) = check_link(data, &config, url, link)
            .await
            .warn_err_ok("Link check failed")
            .flatten()
        {
            return Some(domain);
        }
    }

    None
}

async fn delete_and_warn(
    ctx: &Context,
    data: &State,
    message: &Message,
    reason: &str,
    warning: String,
) -> Result<()> {
    message
        .delete(ctx)
        .await
        .wrap_err_with(|| format!("Failed to delete message for {reason}"))?;

    tracing::info!(
        "deleted message from {} in {} for {}",
        message.author.tag(),
        message.channel_id,
        reason
    );

    let lifetime = data.config.read().await.automod_warning_lifetime;
    let warning = message
        .channel_id
        .say(ctx, format!("{} {warning}", message.author.mention()))
        .await?;

    tokio::time::sleep(lifetime).await;
    warning.delete(ctx).await.ok();

    Ok(())
}

/// Banned words first, then links. Only guild messages from people are checked.
pub async fn moderate_message(ctx: &Context, data: &State, message: &Message) -> Result<()> {
    if message.author.bot || message.guild_id.is_none() {
        return Ok(());
    }

    let found = {
        let banned_words = data.banned_words.read();
        banned_words.find(&message.content).map(str::to_owned)
    };

    if let Some(word) = found {
        return delete_and_warn(
            ctx,
            data,
            message,
            &format!("`{word}`"),
            "that word isn't allowed here.".to_owned(),
        )
        .await;
    }

    if let Some(domain) = flagged_link(data, &message.content).await {
        return delete_and_warn(
            ctx,
            data,
            message,
            &format!("a link to `{domain}`"),
            format!("links to `{domain}` aren't allowed here."),
        )
        .await;
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn matches_whole_words_only() {
        let words = BannedWords::parse("heck\n# comment\n\n  darn  \n").unwrap();

        assert_eq!(words.find("oh HECK no"), Some("HECK"));
        assert_eq!(words.find("darn it"), Some("darn"));
        assert_eq!(words.find("darnation"), None);
        assert_eq!(words.find("checks"), None);
    }

    #[test]
    fn escapes_regex_syntax() {
        let words = BannedWords::parse("a.b").unwrap();

        assert_eq!(words.find("a.b"), Some("a.b"));
        assert_eq!(words.find("axb"), None);
    }

    #[test]
    fn empty_list_matches_nothing() {
        let words = BannedWords::parse("# nothing yet\n").unwrap();

        assert_eq!(words.find("anything"), None);
    }

    #[test]
    fn finds_links() {
        let content = "see https://example.com/a?b=c, and <http://evil.test/x>. \
                       again: https://example.com/a?b=c! not www.plain.test or ftp://x.test";

        assert_eq!(extract_links(content), vec![
            "https://example.com/a?b=c",
            "http://evil.test/x"
        ]);
        assert!(extract_links("no links here").is_empty());
    }

    #[test]
    fn reads_reputation_verdicts() {
        let clean = r#"{"match":false}"#;
        let flagged = r#"{"match":true,"matches":[
            {"followed":false,"domain":"maybe.test","source":"x","type":"PHISHING","trust_rating":0.2},
            {"followed":false,"domain":"evil.test","source":"x","type":"PHISHING","trust_rating":1.0}
        ]}"#;

        assert_eq!(flagged_domain(clean, 0.5).unwrap(), None);
        assert_eq!(flagged_domain(flagged, 0.5).unwrap().as_deref(), Some("evil.test"));
        assert_eq!(flagged_domain(flagged, 0.1).unwrap().as_deref(), Some("maybe.test"));
        assert_eq!(flagged_domain(r#"{"match":true,"matches":[]}"#, 0.5).unwrap(), None);
        assert!(flagged_domain("<html>", 0.5).is_err());
    }
}
