use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use dotenvy::dotenv;
use poise::serenity_prelude as serenity;
use tokio::io::{AsyncReadExt, stdin};
use tracing_subscriber::util::SubscriberInitExt;
use warden_lib::{
    commands::{self, checks::allowed_during_maintenance, prefix::strip_guild_prefix},
    config,
    data::{AppState, State},
    error_handler::adapter::on_error,
    event_handler::event_handler,
};

/// The cli arguments for the bot
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Don't start the discord bot
    #[arg(short, long, default_value = "false")]
    pub dry_run: bool,

    /// Path to the config file
    #[arg(short, long, default_value_t = String::from("config.toml"))]
    pub config: String,
}

/// Single key console controls, handy when the bot can't be reached over discord.
fn spawn_console(state: State) {
    tokio::task::spawn(async move {
        let mut stdin = stdin();
        let mut key = [0; 1];

        loop {
            if let Err(e) = stdin.read_exact(&mut key).await {
                tracing::error!("Failed to read from stdin: {:?}", e);
                return;
            }

            match key[0] {
                b'm' => {
                    let enabled = !state.session.maintenance();
                    state.session.set_maintenance(enabled);
                    println!("Maintenance mode {}", if enabled { "on" } else { "off" });
                }
                b's' => {
                    println!(
                        "Up since {}, maintenance: {}, no-prefix: {}",
                        state.started_at,
                        state.session.maintenance(),
                        state.session.no_prefix()
                    );
                }
                _ => {}
            }
        }
    });
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().wrap_err("Failed to load .env file. Add a file with the following contents: `DISCORD_TOKEN=\"your token\"` to a .env file in the root directory of the repo.")?;
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .compact()
        .with_file(true)
        .with_line_number(true)
        .with_target(false)
        .finish()
        .init();

    let Args {
        dry_run,
        config: config_path,
    } = Args::parse();
    let token =
        std::env::var("DISCORD_TOKEN").wrap_err("Expected a discord token environment variable")?;
    let config =
        config::Config::create_from_file(&config_path).wrap_err("Failed to load config")?;

    let guild_id = config.guild_id.map(serenity::GuildId::new);
    let state = AppState::new(config, config_path)?;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands::all(),
            prefix_options: poise::PrefixFrameworkOptions {
                stripped_dynamic_prefix: Some(|ctx, message, data| {
                    Box::pin(strip_guild_prefix(ctx, message, data))
                }),
                mention_as_prefix: true,
                ..Default::default()
            },
            command_check: Some(|ctx| Box::pin(allowed_during_maintenance(ctx))),
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup({
            let state = State::clone(&state);

            move |ctx, _ready, framework| {
                Box::pin(async move {
                    state.set_application_owners(framework.options().owners.iter().copied());

                    match guild_id {
                        Some(guild_id) => {
                            poise::builtins::register_in_guild(
                                ctx,
                                &framework.options().commands,
                                guild_id,
                            )
                            .await?
                        }
                        None => {
                            poise::builtins::register_globally(ctx, &framework.options().commands)
                                .await?
                        }
                    }

                    Ok(state)
                })
            }
        });

    let client = serenity::ClientBuilder::new(
        token,
        serenity::GatewayIntents::non_privileged()
            | serenity::GatewayIntents::MESSAGE_CONTENT
            | serenity::GatewayIntents::GUILD_MEMBERS
            | serenity::GatewayIntents::GUILD_MESSAGE_REACTIONS
            | serenity::GatewayIntents::GUILD_MESSAGES,
    )
    .framework(framework.build())
    .await;

    if dry_run {
        println!("Bot setup worked, dry run enabled, exiting");
        return Ok(());
    }

    spawn_console(state);

    tracing::info!("Starting bot");

    client
        .wrap_err("Failed to start bot (serenity)")?
        .start()
        .await
        .wrap_err("Failed to start bot (startup)")
}
