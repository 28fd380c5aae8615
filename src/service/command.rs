/// Shell-command bridge to the generation service.
///
/// The configured command runs under `sh -c`. It gets the prompt on stdin
/// and `QUIZMAN_REQUEST=maze|question` in its environment, and must print
/// a single JSON object on stdout. A non-zero exit status is an error;
/// stderr is kept for the log.

use std::io::Write;
use std::process::{Command, Stdio};

use super::{parse_maze_response, parse_question_response, prompt, MazeSource, QuestionSource, ServiceError};
use crate::sim::level::LevelDef;
use crate::sim::quiz::{Difficulty, Question};

pub const REQUEST_ENV: &str = "QUIZMAN_REQUEST";

#[derive(Clone, Debug)]
pub struct CommandBackend {
    command: String,
}

impl CommandBackend {
    pub fn new(command: &str) -> Self {
        CommandBackend { command: command.to_string() }
    }

    /// Run the command once and return its stdout.
    fn run(&self, request: &str, prompt: &str) -> Result<String, ServiceError> {
        log::debug!("Running generator for {request}: {}", self.command);

        let mut child = Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .env(REQUEST_ENV, request)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            // A generator that ignores stdin may close it early.
            if let Err(e) = stdin.write_all(prompt.as_bytes()) {
                log::debug!("Generator closed stdin: {e}");
            }
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(ServiceError::Exit {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl MazeSource for CommandBackend {
    fn generate_maze(&mut self, width: usize, height: usize) -> Result<LevelDef, ServiceError> {
        let text = self.run("maze", &prompt::maze_prompt(width, height))?;
        parse_maze_response(&text)
    }
}

impl QuestionSource for CommandBackend {
    fn generate_question(
        &mut self,
        history: &[String],
        difficulty: Difficulty,
    ) -> Result<Question, ServiceError> {
        let text = self.run("question", &prompt::question_prompt(history, difficulty))?;
        parse_question_response(&text, history)
    }
}
