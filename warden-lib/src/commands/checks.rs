use crate::{data::PoiseContext, error_handler::CommandError};
use color_eyre::eyre::Result;

async fn is_operator(ctx: PoiseContext<'_>) -> bool {
    ctx.data().is_operator(ctx.author().id).await
}

/// For commands only operators may run.
pub async fn operator_only(ctx: PoiseContext<'_>) -> Result<bool> {
    if is_operator(ctx).await {
        return Ok(true);
    }

    Err(CommandError::NotOwner.into())
}

/// Global check: during maintenance only operators get through.
pub async fn allowed_during_maintenance(ctx: PoiseContext<'_>) -> Result<bool> {
    Ok(!ctx.data().session.maintenance() || is_operator(ctx).await)
}

/// Passes for operators and for members who can manage the server.
pub async fn is_operator_or_manager(ctx: PoiseContext<'_>) -> Result<bool> {
    if is_operator(ctx).await {
        return Ok(true);
    }

    let member = ctx.author_member().await;
    let manages_guild = member
        .as_deref()
        .and_then(|member| {
            ctx.guild()
                .map(|guild| guild.member_permissions(member).manage_guild())
        })
        .unwrap_or(false);

    if manages_guild {
        return Ok(true);
    }

    Err(CommandError::CheckAny(vec![
        CommandError::NotOwner,
        CommandError::MissingUserPermissions(vec!["manage_guild".to_owned()]),
    ])
    .into())
}
