mod commands;
mod config;
mod session;
mod teams;

use std::env::var;

use poise::serenity_prelude as serenity;

type Error = Box<dyn std::error::Error + Send + Sync>;
type Context<'a> = poise::Context<'a, Data, Error>;

// User data, which is stored and accessible in all command invocations
pub struct Data {
    config: config::BotConfig,
    sessions: tokio::sync::Mutex<session::SessionMap>,
}

async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    // Only customize the errors we care about, forward the rest to the
    // default handler
    match error {
        poise::FrameworkError::Setup { error, .. } => panic!("Failed to start bot: {:?}", error),
        poise::FrameworkError::Command { error, ctx, .. } => {
            println!("Error in command `{}`: {:?}", ctx.command().name, error,);
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                println!("Error while handling error: {}", e)
            }
        }
    }
}

async fn event_handler(
    _ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    _data: &Data,
) -> Result<(), Error> {
    if let serenity::FullEvent::Ready { data_about_bot, .. } = event {
        println!("Logged in as {}", data_about_bot.user.name);
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let options = poise::FrameworkOptions {
        commands: vec![commands::generateteams(), commands::reroll()],
        // The global error handler for all error cases that may occur
        on_error: |error| Box::pin(on_error(error)),
        // This code is run before every command
        pre_command: |ctx| {
            Box::pin(async move {
                println!("Executing command {}...", ctx.command().qualified_name);
            })
        },
        event_handler: |ctx, event, framework, data| {
            Box::pin(event_handler(ctx, event, framework, data))
        },
        ..Default::default()
    };

    let framework = poise::Framework::builder()
        .setup(move |ctx, _ready, framework| {
            Box::pin(async move {
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;

                let config = config::BotConfig::load();
                let ttl = chrono::Duration::seconds(config.reroll_ttl_secs as i64);

                Ok(Data {
                    config,
                    sessions: tokio::sync::Mutex::new(session::SessionMap::new(ttl)),
                })
            })
        })
        .options(options)
        .build();

    dotenv::dotenv().ok();
    let token = var("DISCORD_TOKEN").expect("Missing `DISCORD_TOKEN` env var");

    // Voice states tell us who is in which channel; the member cache is
    // needed to turn those user ids into usernames
    let intents = serenity::GatewayIntents::non_privileged() | serenity::GatewayIntents::GUILD_MEMBERS;

    let client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await;

    client.unwrap().start().await.unwrap()
}
