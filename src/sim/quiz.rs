/// Quiz gate: score thresholds, answer handling and tier progression.
///
/// ## Flow
///
/// ```text
///   PLAYING ──score ≥ next threshold──▶ QUIZ (question pending)
///   QUIZ    ──question arrives───────▶ QUIZ (question shown)
///   QUIZ    ──answer─────────────────▶ QUIZ (feedback shown, timer running)
///   timer expires:
///     wrong                           ──▶ PLAYING
///     correct, streak < 3             ──▶ PLAYING
///     correct, streak = 3, Linear     ──▶ LEVEL_TRANSITION ──timer──▶ IDLE (Quadratic, maze restored)
///     correct, streak = 3, Quadratic  ──▶ VICTORY
/// ```
///
/// All delays are counted in milliseconds by `advance_quiz`, which the
/// game loop calls with the real elapsed time. Nothing here sleeps.

use crate::sim::event::GameEvent;
use crate::sim::step;
use crate::sim::world::{Phase, VictoryKind, WorldState};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Difficulty {
    /// First-degree equations, integer solution.
    Linear,
    /// Second-degree equations, integer roots.
    Quadratic,
}

impl Difficulty {
    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Linear => "PRIMER GRADO",
            Difficulty::Quadratic => "SEGUNDO GRADO",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Question {
    pub text: String,
    pub options: Vec<String>,
    pub correct_index: usize,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Feedback {
    Correct,
    Wrong,
}

#[derive(Clone, Debug)]
pub struct QuizState {
    pub difficulty: Difficulty,
    /// Correct answers in the current tier. Wrong answers leave it alone.
    pub streak: u32,
    /// Score value of the last quiz that fired (0 before the first).
    pub last_threshold: u32,
    /// Every question text asked this run, oldest first.
    pub history: Vec<String>,
    /// `None` while in QUIZ means the question is still being fetched.
    pub question: Option<Question>,
    pub feedback: Option<Feedback>,
    pub selected: Option<usize>,
    /// Remaining feedback or transition delay.
    pub timer_ms: u64,
}

impl QuizState {
    pub fn new() -> Self {
        QuizState {
            difficulty: Difficulty::Linear,
            streak: 0,
            last_threshold: 0,
            history: vec![],
            question: None,
            feedback: None,
            selected: None,
            timer_ms: 0,
        }
    }

    fn clear_question(&mut self) {
        self.question = None;
        self.feedback = None;
        self.selected = None;
        self.timer_ms = 0;
    }
}

impl Default for QuizState {
    fn default() -> Self {
        Self::new()
    }
}

// ══════════════════════════════════════════════════════════════
// Threshold detection
// ══════════════════════════════════════════════════════════════

/// Fire the quiz when the score has crossed the next threshold.
/// Called after every resolution pass; only acts while PLAYING.
pub fn check_threshold(world: &mut WorldState) -> Option<GameEvent> {
    if world.phase != Phase::Playing || world.score == 0 {
        return None;
    }
    let next = world.next_quiz_at();
    if world.score < next {
        return None;
    }

    world.quiz.last_threshold = next;
    world.quiz.clear_question();
    world.phase = Phase::Quiz;
    log::info!(
        "Quiz triggered at score {} (threshold {}, tier {:?})",
        world.score,
        next,
        world.quiz.difficulty,
    );
    Some(GameEvent::QuizTriggered { threshold: next })
}

/// True while the world waits for a question to show.
pub fn awaiting_question(world: &WorldState) -> bool {
    world.phase == Phase::Quiz && world.quiz.question.is_none()
}

/// The most recent question texts, capped to the configured window.
pub fn recent_history(world: &WorldState) -> Vec<String> {
    let h = &world.quiz.history;
    let start = h.len().saturating_sub(world.quiz_cfg.history_window);
    h[start..].to_vec()
}

/// Show a question. Ignored unless a question is pending.
pub fn present_question(world: &mut WorldState, question: Question) {
    if !awaiting_question(world) {
        return;
    }
    world.quiz.history.push(question.text.clone());
    world.quiz.question = Some(question);
}

// ══════════════════════════════════════════════════════════════
// Answers
// ══════════════════════════════════════════════════════════════

/// Accept one answer per question. Input while feedback is showing,
/// or before the question has arrived, is ignored.
pub fn submit_answer(world: &mut WorldState, index: usize) -> Option<GameEvent> {
    if world.phase != Phase::Quiz || world.quiz.feedback.is_some() {
        return None;
    }
    let question = world.quiz.question.as_ref()?;
    if index >= question.options.len() {
        return None;
    }

    world.quiz.selected = Some(index);
    if index == question.correct_index {
        world.quiz.streak += 1;
        world.quiz.feedback = Some(Feedback::Correct);
        world.quiz.timer_ms = world.quiz_cfg.correct_feedback_ms;
        log::info!("Correct answer (streak {})", world.quiz.streak);
        Some(GameEvent::AnswerCorrect)
    } else {
        world.quiz.feedback = Some(Feedback::Wrong);
        world.quiz.timer_ms = world.quiz_cfg.wrong_feedback_ms;
        log::info!("Wrong answer (streak stays {})", world.quiz.streak);
        Some(GameEvent::AnswerWrong)
    }
}

// ══════════════════════════════════════════════════════════════
// Timers
// ══════════════════════════════════════════════════════════════

/// Run the feedback and transition timers forward by `elapsed_ms`.
pub fn advance_quiz(world: &mut WorldState, elapsed_ms: u64) -> Vec<GameEvent> {
    let mut events = vec![];
    match world.phase {
        Phase::Quiz => {
            let Some(feedback) = world.quiz.feedback else {
                return events;
            };
            world.quiz.timer_ms = world.quiz.timer_ms.saturating_sub(elapsed_ms);
            if world.quiz.timer_ms > 0 {
                return events;
            }
            world.quiz.clear_question();
            resolve_feedback(world, feedback, &mut events);
        }
        Phase::LevelTransition => {
            world.quiz.timer_ms = world.quiz.timer_ms.saturating_sub(elapsed_ms);
            if world.quiz.timer_ms > 0 {
                return events;
            }
            world.quiz.difficulty = Difficulty::Quadratic;
            world.quiz.streak = 0;
            step::restart_level(world);
            world.set_message("Harder equations ahead!", 20);
            log::info!("Tier advanced to {:?}; maze restored", world.quiz.difficulty);
        }
        _ => {}
    }
    events
}

fn resolve_feedback(world: &mut WorldState, feedback: Feedback, events: &mut Vec<GameEvent>) {
    if feedback == Feedback::Wrong || world.quiz.streak < world.quiz_cfg.streak_to_advance {
        world.phase = Phase::Playing;
        return;
    }

    match world.quiz.difficulty {
        Difficulty::Linear => {
            world.phase = Phase::LevelTransition;
            world.quiz.timer_ms = world.quiz_cfg.transition_ms;
            events.push(GameEvent::TierAdvanced);
        }
        Difficulty::Quadratic => {
            world.phase = Phase::Victory(VictoryKind::CurriculumComplete);
            log::info!("Curriculum complete with score {}", world.score);
            events.push(GameEvent::CurriculumComplete);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{QuizConfig, SpeedConfig};
    use crate::domain::entity::Pos;
    use crate::domain::tile::Tile;
    use crate::sim::level::parse_layout;

    fn world() -> WorldState {
        let def = parse_layout("quiz", &[
            "#########",
            "#S.....G#",
            "#########",
        ]).unwrap();
        let mut w = WorldState::new(def, SpeedConfig::default(), QuizConfig::default(), 3);
        w.phase = Phase::Playing;
        w
    }

    fn question() -> Question {
        Question {
            text: "Resuelve: x + 1 = 3".into(),
            options: vec!["x = 1".into(), "x = 2".into(), "x = 3".into(), "x = 4".into()],
            correct_index: 1,
        }
    }

    /// Trigger, present and answer one question, then let feedback expire.
    fn answer(w: &mut WorldState, index: usize) -> Vec<GameEvent> {
        w.score = w.next_quiz_at();
        check_threshold(w).unwrap();
        present_question(w, question());
        submit_answer(w, index).unwrap();
        advance_quiz(w, 5_000)
    }

    #[test]
    fn threshold_fires_once_per_crossing() {
        let mut w = world();
        w.score = 490;
        assert_eq!(check_threshold(&mut w), None);
        w.score = 500;
        assert_eq!(check_threshold(&mut w), Some(GameEvent::QuizTriggered { threshold: 500 }));
        assert_eq!(w.phase, Phase::Quiz);
        assert_eq!(w.quiz.last_threshold, 500);

        // no second activation for the same crossing
        w.phase = Phase::Playing;
        w.score = 990;
        assert_eq!(check_threshold(&mut w), None);
        w.score = 1000;
        assert_eq!(check_threshold(&mut w), Some(GameEvent::QuizTriggered { threshold: 1000 }));
        assert_eq!(w.next_quiz_at(), 1500);
    }

    #[test]
    fn overshooting_threshold_still_fires() {
        let mut w = world();
        w.score = 480;
        assert_eq!(check_threshold(&mut w), None);
        w.score += 50;
        assert_eq!(check_threshold(&mut w), Some(GameEvent::QuizTriggered { threshold: 500 }));
        assert_eq!(w.next_quiz_at(), 1000);
    }

    #[test]
    fn threshold_ignored_outside_playing() {
        let mut w = world();
        w.phase = Phase::Idle;
        w.score = 600;
        assert_eq!(check_threshold(&mut w), None);
        assert_eq!(w.quiz.last_threshold, 0);
    }

    #[test]
    fn present_records_history() {
        let mut w = world();
        w.score = 500;
        check_threshold(&mut w);
        assert!(awaiting_question(&w));
        present_question(&mut w, question());
        assert!(!awaiting_question(&w));
        assert_eq!(w.quiz.history, vec!["Resuelve: x + 1 = 3".to_string()]);

        // a late second delivery does not replace the shown question
        present_question(&mut w, Question { text: "other".into(), ..question() });
        assert_eq!(w.quiz.history.len(), 1);
    }

    #[test]
    fn recent_history_is_capped() {
        let mut w = world();
        w.quiz.history = (0..30).map(|i| format!("q{i}")).collect();
        let recent = recent_history(&w);
        assert_eq!(recent.len(), 20);
        assert_eq!(recent[0], "q10");
        assert_eq!(recent[19], "q29");
    }

    #[test]
    fn only_first_answer_counts() {
        let mut w = world();
        w.score = 500;
        check_threshold(&mut w);

        // nothing to answer yet
        assert_eq!(submit_answer(&mut w, 1), None);

        present_question(&mut w, question());
        assert_eq!(submit_answer(&mut w, 9), None);
        assert_eq!(submit_answer(&mut w, 1), Some(GameEvent::AnswerCorrect));
        assert_eq!(submit_answer(&mut w, 1), None);
        assert_eq!(submit_answer(&mut w, 0), None);
        assert_eq!(w.quiz.streak, 1);
        assert_eq!(w.quiz.feedback, Some(Feedback::Correct));
    }

    #[test]
    fn correct_feedback_delay_then_resume() {
        let mut w = world();
        w.score = 500;
        check_threshold(&mut w);
        present_question(&mut w, question());
        submit_answer(&mut w, 1);

        assert!(advance_quiz(&mut w, 600).is_empty());
        assert_eq!(w.phase, Phase::Quiz);
        advance_quiz(&mut w, 400);
        assert_eq!(w.phase, Phase::Playing);
        assert!(w.quiz.question.is_none());
        assert!(w.quiz.feedback.is_none());
    }

    #[test]
    fn wrong_answer_keeps_streak_and_resumes() {
        let mut w = world();
        w.quiz.streak = 2;
        w.score = 500;
        check_threshold(&mut w);
        present_question(&mut w, question());
        assert_eq!(submit_answer(&mut w, 0), Some(GameEvent::AnswerWrong));

        advance_quiz(&mut w, 1_000);
        assert_eq!(w.phase, Phase::Quiz, "wrong feedback lasts two seconds");
        advance_quiz(&mut w, 1_000);
        assert_eq!(w.phase, Phase::Playing);
        assert_eq!(w.quiz.streak, 2);
        assert!(w.quiz.question.is_none());
    }

    #[test]
    fn three_correct_at_linear_escalates_and_restores_maze() {
        let mut w = world();
        w.grid.consume(Pos::new(2, 1));
        w.player.pos = Pos::new(4, 1);

        answer(&mut w, 1);
        answer(&mut w, 0);
        answer(&mut w, 1);
        assert_eq!(w.phase, Phase::Playing);
        assert_eq!(w.quiz.streak, 2);

        w.score = w.next_quiz_at();
        check_threshold(&mut w);
        present_question(&mut w, question());
        submit_answer(&mut w, 1);
        let events = advance_quiz(&mut w, 1_000);
        assert_eq!(events, vec![GameEvent::TierAdvanced]);
        assert_eq!(w.phase, Phase::LevelTransition);
        assert_eq!(w.quiz.difficulty, Difficulty::Linear);

        let score = w.score;
        let threshold = w.quiz.last_threshold;
        advance_quiz(&mut w, 2_999);
        assert_eq!(w.phase, Phase::LevelTransition);
        advance_quiz(&mut w, 1);
        assert_eq!(w.phase, Phase::Idle);
        assert_eq!(w.quiz.difficulty, Difficulty::Quadratic);
        assert_eq!(w.quiz.streak, 0);
        assert_eq!(w.score, score);
        assert_eq!(w.quiz.last_threshold, threshold);
        assert_eq!(w.grid.get(Pos::new(2, 1)), Tile::Dot);
        assert_eq!(w.player.pos, w.player_spawn);
    }

    #[test]
    fn three_correct_at_quadratic_wins() {
        let mut w = world();
        w.quiz.difficulty = Difficulty::Quadratic;
        answer(&mut w, 1);
        answer(&mut w, 1);
        let events = answer(&mut w, 1);
        assert_eq!(events, vec![GameEvent::CurriculumComplete]);
        assert_eq!(w.phase, Phase::Victory(VictoryKind::CurriculumComplete));
        assert!(w.is_over());
    }
}
