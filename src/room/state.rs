use chrono::{DateTime, Utc};
use rand::Rng;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::models::{Member, RoundState};
use crate::cards::{group_by_rank, new_deck, sort_hand, Card, DeckVariant};
use crate::websockets::{Roster, RosterEntry, WebSocketMessage};

/// A frame addressed to one transport
#[derive(Debug, Clone, PartialEq)]
pub struct Outbound {
    pub connection_id: String,
    pub message: WebSocketMessage,
}

impl Outbound {
    fn new(connection_id: &str, message: WebSocketMessage) -> Self {
        Self {
            connection_id: connection_id.to_string(),
            message,
        }
    }
}

/// Result of admitting a transport into the room
#[derive(Debug, Clone)]
pub struct Admission {
    pub member_id: String,
    /// True when the transport took over an existing member with the same name
    pub merged: bool,
    /// Transport that was bound to the member before this admission
    pub replaced_connection: Option<String>,
    pub outbound: Vec<Outbound>,
}

/// State of one room. Every transition is synchronous and returns the frames
/// it wants delivered; callers serialize access.
#[derive(Debug)]
pub struct RoomState {
    name: String,
    deck_variant: DeckVariant,
    members: Vec<Member>,
    round: RoundState,
    /// Grouped cards of the current deal, revealed by `show_cards`
    current_pool: Vec<Vec<Card>>,
    /// What the room saw at the last reveal
    last_reveal: Vec<Vec<Card>>,
    last_activity: DateTime<Utc>,
}

impl RoomState {
    pub fn new(name: String, deck_variant: DeckVariant, now: DateTime<Utc>) -> Self {
        Self {
            name,
            deck_variant,
            members: Vec::new(),
            round: RoundState::RoundEnded,
            current_pool: Vec::new(),
            last_reveal: Vec::new(),
            last_activity: now,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn round(&self) -> RoundState {
        self.round
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn member_by_name(&self, name: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.name == name)
    }

    pub fn member_by_connection(&self, connection_id: &str) -> Option<&Member> {
        self.members
            .iter()
            .find(|m| m.connection_id == connection_id)
    }

    pub fn current_pool(&self) -> &[Vec<Card>] {
        &self.current_pool
    }

    pub fn last_reveal(&self) -> &[Vec<Card>] {
        &self.last_reveal
    }

    pub fn last_activity(&self) -> DateTime<Utc> {
        self.last_activity
    }

    pub fn online_count(&self) -> usize {
        self.members.iter().filter(|m| m.is_online()).count()
    }

    /// Binds a transport to the member called `name`, creating the member if
    /// nobody by that name exists
    pub fn admit(&mut self, connection_id: &str, name: &str, now: DateTime<Utc>) -> Admission {
        self.last_activity = now;
        let mut outbound = Vec::new();

        let (member_id, merged, replaced_connection) =
            match self.members.iter_mut().find(|m| m.name == name) {
                Some(member) => {
                    let previous = std::mem::replace(
                        &mut member.connection_id,
                        connection_id.to_string(),
                    );
                    member.offline_since = None;
                    info!(
                        room = %self.name,
                        player = %name,
                        member_id = %member.id,
                        "Player re-joined room"
                    );

                    outbound.push(Outbound::new(
                        connection_id,
                        WebSocketMessage::deck(&member.hand),
                    ));
                    let replaced = (previous != connection_id).then_some(previous);
                    (member.id.clone(), true, replaced)
                }
                None => {
                    let member = Member::new(
                        Uuid::new_v4().to_string(),
                        name.to_string(),
                        connection_id.to_string(),
                    );
                    info!(
                        room = %self.name,
                        player = %name,
                        member_id = %member.id,
                        "New player joined room"
                    );
                    let id = member.id.clone();
                    self.members.push(member);
                    (id, false, None)
                }
            };

        outbound.push(Outbound::new(
            connection_id,
            WebSocketMessage::show(&self.last_reveal),
        ));
        outbound.extend(self.roster_broadcast());

        Admission {
            member_id,
            merged,
            replaced_connection,
            outbound,
        }
    }

    /// Marks the member bound to `connection_id` offline. Transports that no
    /// longer own a member are ignored.
    pub fn disconnect(&mut self, connection_id: &str, now: DateTime<Utc>) -> Vec<Outbound> {
        let Some(member) = self
            .members
            .iter_mut()
            .find(|m| m.connection_id == connection_id && m.is_online())
        else {
            debug!(room = %self.name, connection_id = %connection_id, "Disconnect from stale transport");
            return Vec::new();
        };

        member.offline_since = Some(now);
        info!(room = %self.name, player = %member.name, "Player disconnected");
        self.last_activity = now;
        self.roster_broadcast()
    }

    /// Deals a fresh deck to every online member. No-op while a round is active.
    pub fn next_round<R: Rng + ?Sized>(&mut self, rng: &mut R, now: DateTime<Utc>) -> Vec<Outbound> {
        if self.round == RoundState::RoundActive {
            debug!(room = %self.name, "Round already active, ignoring next round");
            return Vec::new();
        }

        self.last_activity = now;
        let mut deck = new_deck(self.deck_variant, rng);
        let mut dealt = Vec::new();
        let mut outbound = Vec::new();

        for member in self.members.iter_mut() {
            if !member.is_online() {
                member.hand.clear();
                continue;
            }

            let wanted = member.requested_count.unwrap_or(0);
            let take = wanted.min(deck.len());
            if take < wanted {
                warn!(
                    room = %self.name,
                    player = %member.name,
                    requested = wanted,
                    dealt = take,
                    "Deck exhausted, dealing short hand"
                );
            }

            let hand = sort_hand(deck.split_off(deck.len() - take));
            debug!(room = %self.name, player = %member.name, cards = hand.len(), "Dealt hand");
            dealt.extend_from_slice(&hand);
            outbound.push(Outbound::new(
                &member.connection_id,
                WebSocketMessage::deck(&hand),
            ));
            member.hand = hand;
        }

        info!(
            room = %self.name,
            dealt = dealt.len(),
            remaining = deck.len(),
            "Next round dealt"
        );
        self.current_pool = group_by_rank(dealt);
        self.round = RoundState::RoundActive;
        outbound
    }

    /// Reveals the current deal to every member. No-op unless a round is active.
    pub fn show_cards(&mut self, now: DateTime<Utc>) -> Vec<Outbound> {
        if self.round != RoundState::RoundActive {
            debug!(room = %self.name, "No active round, ignoring show");
            return Vec::new();
        }

        self.last_activity = now;
        self.round = RoundState::RoundEnded;
        self.last_reveal = self.current_pool.clone();
        info!(room = %self.name, groups = self.last_reveal.len(), "Cards shown");

        let message = WebSocketMessage::show(&self.last_reveal);
        self.members
            .iter()
            .map(|m| Outbound::new(&m.connection_id, message.clone()))
            .collect()
    }

    /// Updates how many cards the member wants in the next deal
    pub fn set_card_count(
        &mut self,
        connection_id: &str,
        count: Option<usize>,
        now: DateTime<Utc>,
    ) -> Vec<Outbound> {
        let Some(member) = self
            .members
            .iter_mut()
            .find(|m| m.connection_id == connection_id)
        else {
            debug!(room = %self.name, connection_id = %connection_id, "Card count from unknown transport");
            return Vec::new();
        };

        member.requested_count = count;
        info!(room = %self.name, player = %member.name, count = ?count, "Card count changed");
        self.last_activity = now;
        self.roster_broadcast()
    }

    /// Card count per member name as the clients display it
    pub fn roster(&self) -> Roster {
        self.members
            .iter()
            .map(|m| {
                let entry = match m.requested_count {
                    Some(count) if m.is_online() => RosterEntry::Count(count),
                    _ => RosterEntry::placeholder(),
                };
                (m.name.clone(), entry)
            })
            .collect()
    }

    fn roster_broadcast(&self) -> Vec<Outbound> {
        let message = WebSocketMessage::clients(&self.roster());
        self.members
            .iter()
            .filter(|m| m.is_online())
            .map(|m| Outbound::new(&m.connection_id, message.clone()))
            .collect()
    }

    /// Drops members that have been offline for at least `ttl`, returning their names
    pub fn evict_offline_members(&mut self, now: DateTime<Utc>, ttl: Duration) -> Vec<String> {
        let (stale, kept): (Vec<Member>, Vec<Member>) = std::mem::take(&mut self.members)
            .into_iter()
            .partition(|m| m.offline_longer_than(now, ttl));
        self.members = kept;

        let names: Vec<String> = stale.into_iter().map(|m| m.name).collect();
        if !names.is_empty() {
            info!(room = %self.name, evicted = ?names, "Evicted offline members");
        }
        names
    }

    /// A room is dormant when nobody is online and nothing happened for `ttl`
    pub fn is_dormant(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        self.online_count() == 0
            && (now - self.last_activity)
                .to_std()
                .map(|idle| idle >= ttl)
                .unwrap_or(false)
    }
}
