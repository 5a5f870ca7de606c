//! Line-oriented interactive loop.

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

use crate::agent::{AgentEvent, ConversationDriver, EventSink};
use crate::Result;

pub const PROMPT: &str = "\n👤 You: ";
pub const GOODBYE: &str = "\n👋 Goodbye!";

/// What to do with one line of user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    Exit,
    Skip,
    Send(&'a str),
}

impl<'a> Command<'a> {
    pub fn parse(line: &'a str) -> Self {
        let text = line.trim();
        if text.is_empty() {
            Command::Skip
        } else if text.eq_ignore_ascii_case("exit") || text.eq_ignore_ascii_case("quit") {
            Command::Exit
        } else {
            Command::Send(text)
        }
    }
}

/// Read lines from `input` until `exit`, `quit` or end of input.
///
/// Recoverable errors are written to `output` and the loop continues.
pub async fn run<R, W>(driver: &mut ConversationDriver, input: R, output: &mut W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut input = input;
    let mut line = String::new();

    loop {
        output.write_all(PROMPT.as_bytes()).await?;
        output.flush().await?;

        line.clear();
        if input.read_line(&mut line).await? == 0 {
            debug!("end of input");
            break;
        }

        match Command::parse(&line) {
            Command::Exit => break,
            Command::Skip => continue,
            Command::Send(text) => {
                let rendered = match driver.send(text).await {
                    Ok(answer) => format!("\n🤖 Agent: {}\n", answer.trim()),
                    Err(err) => format!("\n❌ Error: {err}\n"),
                };
                output.write_all(rendered.as_bytes()).await?;
            }
        }
    }

    output.write_all(format!("{GOODBYE}\n").as_bytes()).await?;
    output.flush().await?;
    Ok(())
}

/// Prints tool activity to stdout as it happens.
pub struct ConsoleEventSink;

impl ConsoleEventSink {
    pub fn render(event: &AgentEvent) -> Option<String> {
        match event {
            AgentEvent::ToolInvoked {
                name, arguments, ..
            } => Some(format!(
                "\n🔧 Executing function: {name} with args: {}",
                serde_json::Value::Object(arguments.clone())
            )),
            AgentEvent::ToolCompleted {
                name,
                is_error: true,
                ..
            } => Some(format!("❌ Function {name} returned an error")),
            AgentEvent::Commentary { text, .. } => Some(format!("\n💬 {}", text.trim())),
            _ => None,
        }
    }
}

#[async_trait]
impl EventSink for ConsoleEventSink {
    async fn report(&self, event: AgentEvent) -> Result<()> {
        if let Some(line) = Self::render(&event) {
            println!("{line}");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_command_parsing() {
        assert_eq!(Command::parse("  exit \n"), Command::Exit);
        assert_eq!(Command::parse("QUIT"), Command::Exit);
        assert_eq!(Command::parse("   \n"), Command::Skip);
        assert_eq!(Command::parse(" exit now "), Command::Send("exit now"));
    }

    #[test]
    fn test_console_render() {
        let event = AgentEvent::ToolInvoked {
            request_id: "r".into(),
            name: "get_weather".into(),
            arguments: json!({"location": "Tokyo"}).as_object().cloned().unwrap(),
        };
        assert_eq!(
            ConsoleEventSink::render(&event).unwrap(),
            "\n🔧 Executing function: get_weather with args: {\"location\":\"Tokyo\"}"
        );
        let answered = AgentEvent::Answered {
            request_id: "r".into(),
            text: "done".into(),
        };
        assert!(ConsoleEventSink::render(&answered).is_none());
    }
}
