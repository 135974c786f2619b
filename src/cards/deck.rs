use rand::Rng;
use strum::IntoEnumIterator;

use super::basic::{Card, Rank, Suit};

/// Supported deck sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeckVariant {
    /// 7 through Ace in every suit
    #[default]
    Short,
    /// 2 through Ace in every suit
    Full,
}

impl DeckVariant {
    pub fn card_count(self) -> usize {
        match self {
            DeckVariant::Short => 32,
            DeckVariant::Full => 52,
        }
    }

    pub fn lowest_rank(self) -> Rank {
        match self {
            DeckVariant::Short => Rank::Seven,
            DeckVariant::Full => Rank::Two,
        }
    }

    pub fn from_card_count(count: usize) -> Option<Self> {
        match count {
            32 => Some(DeckVariant::Short),
            52 => Some(DeckVariant::Full),
            _ => None,
        }
    }
}

/// Builds the unshuffled deck: every suit, and within a suit every rank ascending
pub fn build_deck(variant: DeckVariant) -> Vec<Card> {
    let lowest = variant.lowest_rank();
    Suit::iter()
        .flat_map(|suit| {
            Rank::iter()
                .filter(move |rank| *rank >= lowest)
                .map(move |rank| Card::new(rank, suit))
        })
        .collect()
}

/// Fisher-Yates shuffle in place
pub fn shuffle<R: Rng + ?Sized>(deck: &mut [Card], rng: &mut R) {
    for i in (1..deck.len()).rev() {
        let j = rng.random_range(0..=i);
        deck.swap(i, j);
    }
}

/// A freshly built deck shuffled between 1 and 10 times.
///
/// A single pass is already uniform; the extra passes only re-randomize.
pub fn new_deck<R: Rng + ?Sized>(variant: DeckVariant, rng: &mut R) -> Vec<Card> {
    let mut deck = build_deck(variant);
    let passes = rng.random_range(1..=10);
    for _ in 0..passes {
        shuffle(&mut deck, rng);
    }
    deck
}

/// Sorts cards by descending rank
pub fn sort_hand(mut cards: Vec<Card>) -> Vec<Card> {
    cards.sort_by(|a, b| b.cmp(a));
    cards
}

/// Groups cards of equal rank, highest rank first
pub fn group_by_rank(cards: Vec<Card>) -> Vec<Vec<Card>> {
    sort_hand(cards)
        .chunk_by(|a, b| a.rank == b.rank)
        .map(|group| group.to_vec())
        .collect()
}
