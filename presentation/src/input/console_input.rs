//! Line-based [`InputSource`] for the terminal

use async_trait::async_trait;
use colored::Colorize;
use std::io::Write;
use taskweave_application::{InputError, InputSource};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Stdin};
use tokio::sync::Mutex;

/// Words that end an interactive session
const QUIT_WORDS: [&str; 3] = ["q", "quit", "exit"];

/// Reads one human turn per line from any buffered reader.
///
/// An empty line, a quit word or end of input ends the session.
pub struct LineInput<R> {
    reader: Mutex<R>,
    echo_prompt: bool,
}

/// Standard input
pub type ConsoleInput = LineInput<BufReader<Stdin>>;

impl ConsoleInput {
    pub fn stdin() -> Self {
        Self {
            reader: Mutex::new(BufReader::new(tokio::io::stdin())),
            echo_prompt: true,
        }
    }
}

impl<R> LineInput<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: Mutex::new(reader),
            echo_prompt: false,
        }
    }
}

fn interpret(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() || QUIT_WORDS.contains(&line.to_lowercase().as_str()) {
        None
    } else {
        Some(line.to_string())
    }
}

#[async_trait]
impl<R> InputSource for LineInput<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn next_input(&self, prompt: &str) -> Result<Option<String>, InputError> {
        if self.echo_prompt {
            print!("{} ", format!("{}>", prompt).green().bold());
            let _ = std::io::stdout().flush();
        }

        let mut reader = self.reader.lock().await;
        let mut line = String::new();
        let read = reader
            .read_line(&mut line)
            .await
            .map_err(|e| InputError::Io(e.to_string()))?;
        if read == 0 {
            return Ok(None);
        }
        Ok(interpret(&line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reads_lines_until_quit() {
        let input = LineInput::new(BufReader::new(&b"hello\n  TO[Odd]: 3 \nquit\nignored\n"[..]));

        assert_eq!(input.next_input(">").await.unwrap().as_deref(), Some("hello"));
        assert_eq!(
            input.next_input(">").await.unwrap().as_deref(),
            Some("TO[Odd]: 3")
        );
        assert_eq!(input.next_input(">").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_eof_ends_session() {
        let input = LineInput::new(BufReader::new(&b""[..]));
        assert_eq!(input.next_input(">").await.unwrap(), None);
    }

    #[test]
    fn test_interpret() {
        assert_eq!(interpret("\n"), None);
        assert_eq!(interpret("EXIT"), None);
        assert_eq!(interpret("exit plan").as_deref(), Some("exit plan"));
    }
}
