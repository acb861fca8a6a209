//! Jungle (Dou Shou Qi): board, species, rules and the session that plays them.

pub mod board;
pub mod factory;
pub mod handle;
pub mod layout;
pub mod pieces;
pub mod rules;
pub mod session;
pub mod types;

pub use factory::{JungleFactory, SessionFactory};
pub use handle::PlayerHandle;
pub use layout::Layout;
pub use session::{GameSession, GameStatus, Move, MoveOutcome};
