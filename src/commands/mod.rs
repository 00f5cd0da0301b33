use crate::config::BotConfig;
use crate::session::{PostedMessage, SessionLookup};
use crate::teams::{self, ShuffleError, TeamSplit};
use crate::{Context, Error};

use chrono::Utc;
use poise::serenity_prelude as serenity;
use serenity::builder::{CreateEmbed, CreateEmbedFooter};

/// Resolves the invoking user's voice channel and the usernames of its
/// non-bot occupants, from the guild cache. Returns `None` when the user
/// is not connected to voice.
fn voice_roster(ctx: &Context<'_>) -> Option<(serenity::ChannelId, Vec<String>)> {
    let guild = ctx.guild()?;

    let channel_id = guild
        .voice_states
        .get(&ctx.author().id)
        .and_then(|state| state.channel_id)?;

    let roster = guild
        .voice_states
        .values()
        .filter(|state| state.channel_id == Some(channel_id))
        .filter_map(|state| guild.members.get(&state.user_id))
        .filter(|member| !member.user.bot)
        .map(|member| member.user.name.clone())
        .collect();

    Some((channel_id, roster))
}

fn team_embed(config: &BotConfig, split: &TeamSplit) -> CreateEmbed {
    CreateEmbed::new()
        .title("Team Draw")
        .color(config.embed_color)
        .field(&config.team_a_name, split.team_a.join("\n"), true)
        .field(&config.team_b_name, split.team_b.join("\n"), true)
        .footer(CreateEmbedFooter::new(format!(
            "Players in voice channel: {}",
            split.total()
        )))
}

async fn say_ephemeral(ctx: &Context<'_>, text: &str) -> Result<(), Error> {
    ctx.send(
        poise::CreateReply::default()
            .content(text)
            .ephemeral(true),
    )
    .await?;
    Ok(())
}

/// Splits everyone in your voice channel into two random teams
#[poise::command(slash_command, guild_only)]
pub async fn generateteams(ctx: Context<'_>) -> Result<(), Error> {
    let Some((voice_channel, roster)) = voice_roster(&ctx) else {
        say_ephemeral(&ctx, "You need to be in a voice channel to generate teams!").await?;
        return Ok(());
    };

    // The rng handle must not live across an await, so shuffle first and
    // match on the result
    let result = teams::split_teams(&roster, &mut rand::thread_rng());
    let split = match result {
        Ok(split) => split,
        Err(ShuffleError::InsufficientPlayers { .. }) => {
            say_ephemeral(
                &ctx,
                "Not enough players in the voice channel to form teams.",
            )
            .await?;
            return Ok(());
        }
    };

    println!(
        "drew teams for {} players in voice channel {}",
        split.total(),
        voice_channel
    );

    let reply = ctx
        .send(poise::CreateReply::default().embed(team_embed(&ctx.data().config, &split)))
        .await?;
    let message = reply.message().await?;

    let mut sessions = ctx.data().sessions.lock().await;
    sessions.record(
        voice_channel,
        roster,
        PostedMessage {
            channel_id: message.channel_id,
            message_id: message.id,
        },
        Utc::now(),
    );

    Ok(())
}

/// Redraws the last teams for your voice channel with the same players
#[poise::command(slash_command, guild_only)]
pub async fn reroll(ctx: Context<'_>) -> Result<(), Error> {
    let Some((voice_channel, _)) = voice_roster(&ctx) else {
        say_ephemeral(&ctx, "You need to be in a voice channel to reroll teams!").await?;
        return Ok(());
    };

    // Hold the session lock for the whole flow so two rerolls on the same
    // channel cannot both read the old roster and race each other's record
    let mut sessions = ctx.data().sessions.lock().await;

    let (roster, old_message) = match sessions.fetch_active(voice_channel, Utc::now()) {
        SessionLookup::Active(session) => (session.roster.clone(), session.message),
        SessionLookup::Absent => {
            say_ephemeral(
                &ctx,
                "No teams have been generated for this voice channel yet.",
            )
            .await?;
            return Ok(());
        }
        SessionLookup::Expired => {
            say_ephemeral(
                &ctx,
                "The reroll window has elapsed, use /generateteams for a fresh draw.",
            )
            .await?;
            return Ok(());
        }
    };

    // Best effort only, losing the old message is not worth aborting over
    if let Err(e) = old_message.retract(ctx.http()).await {
        tracing::warn!("could not delete previous team message: {}", e);
    }

    // Reshuffle the roster as recorded, even if people have since joined
    // or left the channel
    let result = teams::split_teams(&roster, &mut rand::thread_rng());
    let split = match result {
        Ok(split) => split,
        Err(ShuffleError::InsufficientPlayers { .. }) => {
            say_ephemeral(
                &ctx,
                "Not enough players in the voice channel to form teams.",
            )
            .await?;
            return Ok(());
        }
    };

    println!(
        "rerolled teams for {} players in voice channel {}",
        split.total(),
        voice_channel
    );

    let reply = ctx
        .send(poise::CreateReply::default().embed(team_embed(&ctx.data().config, &split)))
        .await?;
    let message = reply.message().await?;

    sessions.record(
        voice_channel,
        roster,
        PostedMessage {
            channel_id: message.channel_id,
            message_id: message.id,
        },
        Utc::now(),
    );

    Ok(())
}
