//! Console front end for a chat session.

use std::future::Future;
use std::io::{self, Write};
use std::path::Path;

use banker_conversation::{SessionController, SessionError, SessionStats};
use banker_core::CompletionProvider;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tracing::info;

use crate::snapshot;

/// Words the console treats as session commands instead of messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConsoleCommand {
    Quit,
    Clear,
    Stats,
    Save,
    Help,
}

impl ConsoleCommand {
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "quit" | "exit" => Some(Self::Quit),
            "clear" => Some(Self::Clear),
            "stats" => Some(Self::Stats),
            "save" => Some(Self::Save),
            "help" => Some(Self::Help),
            _ => None,
        }
    }

    #[must_use]
    pub const fn help_text() -> &'static str {
        r"
📋 Commands:
  • 'quit' or 'exit' - End the conversation
  • 'clear' - Start a new conversation
  • 'stats' - Show conversation statistics
  • 'save'  - Save conversation to file
  • 'help'  - Show this list
"
    }

    #[must_use]
    pub const fn welcome_text() -> &'static str {
        r"
============================================================
🏦 BANKING AI ASSISTANT
============================================================
I'm here to help you with:
  • Account information and inquiries
  • Banking products information
  • Financial planning advice
  • Security and fraud prevention tips
"
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Input {
    Line(String),
    Eof,
    Interrupted,
}

const GOODBYE_INTERRUPTED: &str = "\n\n👋 Conversation interrupted. Goodbye!";

/// Run the read/submit/print loop until the user quits, stdin closes, or
/// Ctrl-C arrives.
pub async fn run_interactive<P>(
    session: &mut SessionController<P>,
    log_file: &Path,
) -> anyhow::Result<()>
where
    P: CompletionProvider + Send + Sync,
{
    let mut stdout = io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    write!(stdout, "{}", ConsoleCommand::welcome_text())?;
    writeln!(stdout, "{}", ConsoleCommand::help_text())?;

    loop {
        write!(stdout, "You: ")?;
        stdout.flush()?;

        let input = match next_input(&mut lines, tokio::signal::ctrl_c()).await? {
            Input::Line(line) => line,
            Input::Eof => {
                writeln!(stdout)?;
                break;
            }
            Input::Interrupted => {
                writeln!(stdout, "{GOODBYE_INTERRUPTED}")?;
                break;
            }
        };

        // Dropping an in-flight submit keeps the user turn, like a failed call.
        let flow = tokio::select! {
            flow = handle_line(session, &input, log_file, &mut stdout) => Some(flow?),
            signal = tokio::signal::ctrl_c() => {
                signal?;
                None
            }
        };

        match flow {
            Some(Flow::Continue) => {}
            Some(Flow::Exit) => {
                writeln!(stdout, "\n👋 Thank you for using the banking assistant!")?;
                if !session.history().is_empty() {
                    write!(stdout, "Would you like to save this conversation? (yes/no): ")?;
                    stdout.flush()?;
                    if let Input::Line(answer) =
                        next_input(&mut lines, tokio::signal::ctrl_c()).await?
                        && matches!(answer.to_lowercase().as_str(), "yes" | "y")
                    {
                        save(session, log_file, &mut stdout)?;
                    }
                }
                break;
            }
            None => {
                writeln!(stdout, "{GOODBYE_INTERRUPTED}")?;
                break;
            }
        }
    }

    info!(
        "Conversation ended: {} total messages",
        session.history().len()
    );
    Ok(())
}

/// Wait for the next trimmed line, or for `interrupt` to fire first.
pub async fn next_input<R, F>(lines: &mut Lines<R>, interrupt: F) -> io::Result<Input>
where
    R: AsyncBufRead + Unpin,
    F: Future<Output = io::Result<()>>,
{
    tokio::select! {
        line = lines.next_line() => {
            Ok(line?.map_or(Input::Eof, |l| Input::Line(l.trim().to_string())))
        }
        signal = interrupt => {
            signal?;
            Ok(Input::Interrupted)
        }
    }
}

/// Handle one line of user input.
///
/// Blank lines are ignored, commands act on the session, and anything else
/// is submitted as a message. Provider failures are reported and the loop
/// carries on.
pub async fn handle_line<P, W>(
    session: &mut SessionController<P>,
    input: &str,
    log_file: &Path,
    out: &mut W,
) -> anyhow::Result<Flow>
where
    P: CompletionProvider + Send + Sync,
    W: Write + Send,
{
    let input = input.trim();
    if input.is_empty() {
        return Ok(Flow::Continue);
    }

    match ConsoleCommand::parse(input) {
        Some(ConsoleCommand::Quit) => return Ok(Flow::Exit),
        Some(ConsoleCommand::Clear) => {
            session.clear();
            writeln!(out, "🔄 Conversation cleared. Starting fresh!\n")?;
        }
        Some(ConsoleCommand::Stats) => render_stats(&session.current_stats(), out)?,
        Some(ConsoleCommand::Save) => save(session, log_file, out)?,
        Some(ConsoleCommand::Help) => writeln!(out, "{}", ConsoleCommand::help_text())?,
        None => match session.submit(input).await {
            Ok(reply) => writeln!(out, "\n🤖 Banking Bot: {reply}\n")?,
            Err(SessionError::EmptyMessage) => {}
            Err(e) => writeln!(out, "\n❌ Error: {e}\nPlease try again.\n")?,
        },
    }

    Ok(Flow::Continue)
}

fn save<P, W>(session: &SessionController<P>, log_file: &Path, out: &mut W) -> io::Result<()>
where
    P: CompletionProvider + Send + Sync,
    W: Write,
{
    match snapshot::write_snapshot(log_file, &session.snapshot()) {
        Ok(()) => writeln!(out, "\n✅ Conversation saved to {}\n", log_file.display()),
        Err(e) => writeln!(out, "\n❌ Could not save conversation: {e:#}\n"),
    }
}

fn render_stats<W: Write>(stats: &SessionStats, out: &mut W) -> io::Result<()> {
    let rule = "-".repeat(40);
    writeln!(out, "\n{rule}")?;
    writeln!(out, "📊 CONVERSATION STATISTICS")?;
    writeln!(out, "{rule}")?;
    writeln!(out, "Total Messages: {}", stats.total_messages)?;
    writeln!(out, "Your Questions: {}", stats.user_messages)?;
    writeln!(out, "Bot Responses: {}", stats.assistant_messages)?;
    writeln!(out, "Duration: {:.0} seconds", stats.elapsed_seconds.floor())?;
    writeln!(out, "{rule}\n")
}
