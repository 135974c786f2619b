// Public API
pub use basic::{Card, Rank, Suit};
pub use deck::{build_deck, group_by_rank, new_deck, shuffle, sort_hand, DeckVariant};

// Internal modules
mod basic;
mod deck;
