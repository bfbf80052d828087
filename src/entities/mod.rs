// Entity Models
//
// Each entity has a stable UUID identity. Sessions and transactions are
// append-only values; bankrolls and locations group and label them.

pub mod bankroll;
pub mod location;
pub mod session;
pub mod transaction;

pub use bankroll::Bankroll;
pub use location::{default_locations, default_stakes, Location, LocationImage};
pub use session::{
    parse_big_blind, GameType, Session, TournamentDetails, TournamentSize, TournamentSpeed,
};
pub use transaction::{Transaction, TransactionKind};
