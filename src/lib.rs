pub mod board;
pub mod notation;
pub mod piece;
pub mod session;
pub mod tower;

pub use board::*;
pub use notation::{MoveToken, NotationError};
pub use piece::*;
pub use session::*;
pub use tower::*;
