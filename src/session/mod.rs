use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use poise::serenity_prelude as serenity;

/// Handle to a previously posted team message, kept so a reroll can take
/// the old one down before posting the replacement.
#[derive(Debug, Clone, Copy)]
pub struct PostedMessage {
    pub channel_id: serenity::ChannelId,
    pub message_id: serenity::MessageId,
}

impl PostedMessage {
    pub async fn retract(&self, http: &serenity::Http) -> Result<(), serenity::Error> {
        self.channel_id.delete_message(http, self.message_id).await
    }
}

/// The last team draw for a voice channel: the roster it was drawn from,
/// when it was drawn, and the message that announced it.
#[derive(Debug)]
pub struct Session {
    pub roster: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub message: PostedMessage,
}

#[derive(Debug)]
pub enum SessionLookup<'a> {
    Active(&'a Session),
    Expired,
    Absent,
}

/// In-memory map of the most recent team draw per voice channel.
///
/// Entries are never actively evicted. An entry past its TTL is simply
/// reported as `Expired` and sits there until the next draw for that
/// channel overwrites it. Lives in the bot's shared `Data` behind a
/// `tokio::sync::Mutex`; callers take `now` so the expiry logic can be
/// tested with fabricated clocks.
#[derive(Debug)]
pub struct SessionMap {
    entries: HashMap<serenity::ChannelId, Session>,
    ttl: Duration,
}

impl SessionMap {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
        }
    }

    /// Inserts or overwrites the session for a voice channel. Rerolls call
    /// this too, which restarts the TTL window.
    pub fn record(
        &mut self,
        channel_id: serenity::ChannelId,
        roster: Vec<String>,
        message: PostedMessage,
        now: DateTime<Utc>,
    ) {
        self.entries.insert(
            channel_id,
            Session {
                roster,
                created_at: now,
                message,
            },
        );
    }

    /// Looks up the session for a voice channel, distinguishing a channel
    /// that never had a draw from one whose reroll window has elapsed.
    pub fn fetch_active(
        &self,
        channel_id: serenity::ChannelId,
        now: DateTime<Utc>,
    ) -> SessionLookup<'_> {
        match self.entries.get(&channel_id) {
            None => SessionLookup::Absent,
            Some(session) if now - session.created_at > self.ttl => SessionLookup::Expired,
            Some(session) => SessionLookup::Active(session),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn handle() -> PostedMessage {
        PostedMessage {
            channel_id: serenity::ChannelId::new(1),
            message_id: serenity::MessageId::new(1),
        }
    }

    fn roster(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_session_lifecycle() {
        let mut map = SessionMap::new(Duration::seconds(120));
        let channel = serenity::ChannelId::new(10);

        map.record(channel, roster(&["A", "B", "C"]), handle(), t0());

        // Inside the window the stored roster comes back
        match map.fetch_active(channel, t0() + Duration::seconds(60)) {
            SessionLookup::Active(session) => {
                assert_eq!(session.roster, roster(&["A", "B", "C"]));
            }
            other => panic!("expected active session, got {:?}", other),
        }

        // Exactly at the TTL boundary is still active
        assert!(matches!(
            map.fetch_active(channel, t0() + Duration::seconds(120)),
            SessionLookup::Active(_)
        ));

        // Past the window the entry reports expired but is not removed
        assert!(matches!(
            map.fetch_active(channel, t0() + Duration::seconds(121)),
            SessionLookup::Expired
        ));

        // A channel that never had a draw is absent, not expired
        assert!(matches!(
            map.fetch_active(serenity::ChannelId::new(11), t0()),
            SessionLookup::Absent
        ));
    }

    #[test]
    fn test_rerecord_restarts_the_window() {
        let mut map = SessionMap::new(Duration::seconds(120));
        let channel = serenity::ChannelId::new(10);

        map.record(channel, roster(&["A", "B"]), handle(), t0());
        map.record(
            channel,
            roster(&["A", "B"]),
            handle(),
            t0() + Duration::seconds(100),
        );

        // 180s after the first draw but only 80s after the second
        assert!(matches!(
            map.fetch_active(channel, t0() + Duration::seconds(180)),
            SessionLookup::Active(_)
        ));
    }

    #[test]
    fn test_reroll_reshuffles_the_recorded_roster() {
        use rand::rngs::StdRng;
        use rand::SeedableRng;

        let mut map = SessionMap::new(Duration::seconds(120));
        let channel = serenity::ChannelId::new(10);
        map.record(channel, roster(&["A", "B", "C", "D"]), handle(), t0());

        // The reroll draws from the stored roster, not live channel
        // membership, so the combined teams are exactly the recorded set
        let stored = match map.fetch_active(channel, t0() + Duration::seconds(30)) {
            SessionLookup::Active(session) => session.roster.clone(),
            other => panic!("expected active session, got {:?}", other),
        };

        let mut rng = StdRng::seed_from_u64(7);
        let split = crate::teams::split_teams(&stored, &mut rng).unwrap();

        let mut combined = split.team_a.clone();
        combined.extend(split.team_b.iter().cloned());
        combined.sort();
        assert_eq!(combined, roster(&["A", "B", "C", "D"]));
    }
}
