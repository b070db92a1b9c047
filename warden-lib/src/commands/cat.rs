use crate::{data::PoiseContext, error_handler::BucketKind, limits::BucketTarget};
use color_eyre::eyre::{OptionExt, Result, WrapErr};
use poise::{CreateReply, serenity_prelude::CreateEmbed};
use serde::Deserialize;
use std::time::Duration;

const CAT_API: &str = "https://api.thecatapi.com/v1/images/search";
const CAT_COOLDOWN: Duration = Duration::from_secs(3);

#[derive(Deserialize)]
struct CatImage {
    url: String,
}

fn first_image_url(body: &str) -> Result<String> {
    serde_json::from_str::<Vec<CatImage>>(body)
        .wrap_err("Cat API sent something that isn't a list of images")?
        .into_iter()
        .next()
        .map(|image| image.url)
        .ok_or_eyre("Cat API returned no images")
}

/// A random cat picture
#[poise::command(slash_command, prefix_command)]
pub async fn cat(ctx: PoiseContext<'_>) -> Result<()> {
    let target = BucketTarget::of(ctx).await;
    ctx.data()
        .cooldowns
        .check("cat", BucketKind::Channel, CAT_COOLDOWN, &target)?;

    ctx.defer().await?;

    let body = ctx
        .data()
        .http
        .get(CAT_API)
        .send()
        .await
        .wrap_err("Cat API is unreachable")?
        .error_for_status()
        .wrap_err("Cat API returned an error")?
        .text()
        .await?;

    let url = first_image_url(&body)?;

    ctx.send(CreateReply::default().embed(CreateEmbed::new().title("🐱").image(url)))
        .await?;

    Ok(())
}

#[cfg(test)]
mod test {
    use super::first_image_url;

    #[test]
    fn picks_first_image() {
        let body = r#"[{"id":"abc","url":"https://cdn2.thecatapi.com/images/abc.jpg","width":500,"height":375}]"#;

        assert_eq!(
            first_image_url(body).unwrap(),
            "https://cdn2.thecatapi.com/images/abc.jpg"
        );
    }

    #[test]
    fn rejects_empty_and_garbage() {
        assert!(first_image_url("[]").is_err());
        assert!(first_image_url("<html>").is_err());
    }
}
