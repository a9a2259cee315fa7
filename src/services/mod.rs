pub mod judge;
pub mod listing;
pub mod terminal;
pub mod tournament;

pub use judge::{JudgeError, JudgingSurface, Progress, Signal};
pub use terminal::TerminalJudge;
pub use tournament::{RunSummary, Tournament, TournamentError, TournamentState};
