/// Offline question generator.
///
/// Linear tier:    `a·x + b = c` with an integer solution.
/// Quadratic tier: `(x - r1)(x - r2) = 0` expanded, integer roots.
///
/// Each question gets three distinct distractors near the answer and the
/// correct option lands at a random index. Texts already in the history
/// are skipped; after `MAX_ATTEMPTS` collisions the fallback is returned.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::{fallback_question, QuestionSource, ServiceError, OPTION_COUNT};
use crate::sim::quiz::{Difficulty, Question};

const MAX_ATTEMPTS: usize = 32;

pub struct LocalQuestions {
    rng: Pcg32,
}

impl LocalQuestions {
    pub fn new(seed: u64) -> Self {
        LocalQuestions { rng: Pcg32::seed_from_u64(seed) }
    }

    fn linear(&mut self) -> Question {
        let a: i32 = self.rng.random_range(2..=9);
        let x: i32 = self.rng.random_range(-10..=10);
        let b: i32 = self.rng.random_range(-20..=20);
        let c = a * x + b;

        let text = format!("Resuelve: {} = {c}", linear_lhs(a, b));
        let answer = format!("x = {x}");
        let mut wrong = vec![];
        let mut d = 1;
        while wrong.len() < OPTION_COUNT - 1 {
            // alternate above and below the answer
            for candidate in [x + d, x - d] {
                if wrong.len() < OPTION_COUNT - 1 {
                    wrong.push(format!("x = {candidate}"));
                }
            }
            d += self.rng.random_range(1..=3);
        }
        self.shuffle(text, answer, wrong)
    }

    fn quadratic(&mut self) -> Question {
        let r1: i32 = self.rng.random_range(-9..=9);
        let mut r2: i32 = self.rng.random_range(-9..=9);
        if r2 == r1 {
            r2 = if r1 == 0 { 3 } else { -r1 };
        }
        let (lo, hi) = (r1.min(r2), r1.max(r2));

        // x² - (r1 + r2)x + r1·r2 = 0
        let text = format!("Resuelve: {} = 0", quadratic_lhs(-(lo + hi), lo * hi));
        let answer = roots_label(lo, hi);
        let wrong = vec![
            roots_label(-hi, -lo),
            roots_label(lo, hi + 1),
            roots_label(lo - 1, hi),
            roots_label(lo - 1, hi + 1),
        ];
        self.shuffle(text, answer, wrong)
    }

    /// `wrong` must hold at least three labels that differ from `answer`
    /// and from each other once duplicates are dropped.
    fn shuffle(&mut self, text: String, answer: String, wrong: Vec<String>) -> Question {
        let mut options = vec![answer.clone()];
        for w in wrong {
            if options.len() < OPTION_COUNT && !options.contains(&w) {
                options.push(w);
            }
        }
        options.shuffle(&mut self.rng);
        let correct_index = options.iter().position(|o| *o == answer).unwrap_or(0);
        Question { text, options, correct_index }
    }
}

impl QuestionSource for LocalQuestions {
    fn generate_question(
        &mut self,
        history: &[String],
        difficulty: Difficulty,
    ) -> Result<Question, ServiceError> {
        for _ in 0..MAX_ATTEMPTS {
            let q = match difficulty {
                Difficulty::Linear => self.linear(),
                Difficulty::Quadratic => self.quadratic(),
            };
            if !history.iter().any(|h| *h == q.text) {
                return Ok(q);
            }
        }
        log::warn!("Local generator kept repeating itself; using fallback");
        Ok(fallback_question())
    }
}

fn linear_lhs(a: i32, b: i32) -> String {
    match b {
        0 => format!("{a}x"),
        b if b > 0 => format!("{a}x + {b}"),
        b => format!("{a}x - {}", -b),
    }
}

fn quadratic_lhs(b: i32, c: i32) -> String {
    let mut s = String::from("x²");
    match b {
        0 => {}
        1 => s.push_str(" + x"),
        -1 => s.push_str(" - x"),
        b if b > 0 => s.push_str(&format!(" + {b}x")),
        b => s.push_str(&format!(" - {}x", -b)),
    }
    match c {
        0 => {}
        c if c > 0 => s.push_str(&format!(" + {c}")),
        c => s.push_str(&format!(" - {}", -c)),
    }
    s
}

fn roots_label(a: i32, b: i32) -> String {
    format!("x = {a}, x = {b}")
}
