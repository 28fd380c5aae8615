/// Events emitted by the simulation and the quiz gate.
/// The presentation layer consumes these for sound and messages.

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    DotEaten { x: usize, y: usize },
    PowerPelletEaten { x: usize, y: usize },
    GhostEaten { id: usize },
    GhostRevived { id: usize },
    FrightenedEnded,
    PlayerCaught { id: usize },
    MazeCleared,
    QuizTriggered { threshold: u32 },
    AnswerCorrect,
    AnswerWrong,
    TierAdvanced,
    CurriculumComplete,
}
