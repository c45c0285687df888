use anyhow::{Context, Result};
use std::io::{self, BufRead, Write};
use std::time::Duration;

use crate::commands::item_line;
use crate::wellness::config::load_config;
use crate::wellness::resources::{
    BREATHING_STEPS, BREATHING_TIMER_SECS, GUIDED_MEDITATIONS, HELPFUL_RESOURCES, ResourceLink,
    run_countdown,
};
use crate::wellness::session::WellnessSession;

const PROMPT: &str = "What's on your mind today? > ";

const HELP: &str = "\
Type a message to talk, or use a command:
  /mood <1-10> [notes]  log how you feel
  /trend                daily mood trend
  /insights             wellness news and research
  /history              conversation so far
  /meditation           guided meditation links
  /breathing            4-7-8 breathing steps
  /timer [secs]         breathing countdown (default 120)
  /resources            helpful resources
  /reset                clear moods and chat
  /help                 this list
  /quit                 leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplInput {
    Empty,
    Chat(String),
    Mood { raw: String, notes: String },
    Trend,
    Insights,
    History,
    Meditation,
    Breathing,
    Timer(Option<String>),
    Resources,
    Reset,
    Help,
    Quit,
    Unknown(String),
}

pub fn parse_line(line: &str) -> ReplInput {
    let line = line.trim();
    if line.is_empty() {
        return ReplInput::Empty;
    }
    let Some(command) = line.strip_prefix('/') else {
        return ReplInput::Chat(line.to_string());
    };

    let (name, rest) = command
        .split_once(char::is_whitespace)
        .map(|(n, r)| (n, r.trim()))
        .unwrap_or((command, ""));
    match name.to_ascii_lowercase().as_str() {
        "mood" => {
            let (raw, notes) = rest
                .split_once(char::is_whitespace)
                .map(|(m, n)| (m, n.trim()))
                .unwrap_or((rest, ""));
            ReplInput::Mood {
                raw: raw.to_string(),
                notes: notes.to_string(),
            }
        }
        "trend" => ReplInput::Trend,
        "insights" => ReplInput::Insights,
        "history" => ReplInput::History,
        "meditation" => ReplInput::Meditation,
        "breathing" => ReplInput::Breathing,
        "timer" => ReplInput::Timer((!rest.is_empty()).then(|| rest.to_string())),
        "resources" => ReplInput::Resources,
        "reset" => ReplInput::Reset,
        "help" => ReplInput::Help,
        "quit" | "exit" => ReplInput::Quit,
        other => ReplInput::Unknown(other.to_string()),
    }
}

fn write_links<W: Write>(out: &mut W, heading: &str, links: &[ResourceLink]) -> io::Result<()> {
    writeln!(out, "{heading}")?;
    for link in links {
        writeln!(out, "- {} <{}>", link.title, link.url)?;
    }
    Ok(())
}

/// Drive a session from `input` until EOF or `/quit`. `timer_step` is the
/// countdown tick interval.
pub fn run_repl<R: BufRead, W: Write>(
    session: &mut WellnessSession,
    input: R,
    out: &mut W,
    timer_step: Duration,
) -> Result<()> {
    writeln!(out, "ClarityCare. Type /help for commands.")?;
    write!(out, "{PROMPT}")?;
    out.flush()?;

    for line in input.lines() {
        let line = line.context("failed to read session input")?;
        match parse_line(&line) {
            ReplInput::Empty => {}
            ReplInput::Chat(text) => {
                let reply = session.send_message(&text);
                writeln!(out, "[{}] {}: {}", reply.time, reply.sender.label(), reply.text)?;
            }
            ReplInput::Mood { raw, notes } => match raw.parse::<i64>() {
                Ok(mood) => match session.log_mood(mood, &notes) {
                    Ok(sample) => writeln!(
                        out,
                        "Mood {} logged at {}",
                        sample.raw_mood.value(),
                        sample.timestamp.format("%Y-%m-%d %H:%M")
                    )?,
                    Err(err) => writeln!(out, "error: {err}")?,
                },
                Err(_) => writeln!(out, "error: usage /mood <1-10> [notes]")?,
            },
            ReplInput::Trend => {
                if session.moods().is_empty() {
                    writeln!(out, "No moods logged yet.")?;
                }
                for point in session.mood_trend() {
                    writeln!(out, "{} {:.2}", point.day, point.mean_mood)?;
                }
            }
            ReplInput::Insights => {
                let payload = session.insights();
                writeln!(out, "Wellness News")?;
                for item in &payload.news {
                    writeln!(out, "{}", item_line(item))?;
                }
                writeln!(out, "Latest Research")?;
                for item in &payload.papers {
                    writeln!(out, "{}", item_line(item))?;
                }
            }
            ReplInput::History => {
                for msg in session.history() {
                    writeln!(out, "[{}] {}: {}", msg.time, msg.sender.label(), msg.text)?;
                }
            }
            ReplInput::Meditation => write_links(out, "Guided Meditation", GUIDED_MEDITATIONS)?,
            ReplInput::Breathing => {
                writeln!(out, "4-7-8 Breathing")?;
                for (i, step) in BREATHING_STEPS.iter().enumerate() {
                    writeln!(out, "{}. {step}", i + 1)?;
                }
                writeln!(out, "Use /timer to start a {BREATHING_TIMER_SECS}-second countdown.")?;
            }
            ReplInput::Timer(raw) => {
                let secs = match raw.as_deref().map(str::parse::<u64>) {
                    None => Some(BREATHING_TIMER_SECS),
                    Some(Ok(secs)) => Some(secs),
                    Some(Err(_)) => None,
                };
                match secs {
                    Some(secs) => {
                        let mut write_err = None;
                        run_countdown(secs, timer_step, |clock| {
                            if write_err.is_none()
                                && let Err(err) = writeln!(out, "{clock}").and_then(|_| out.flush())
                            {
                                write_err = Some(err);
                            }
                        });
                        if let Some(err) = write_err {
                            return Err(err.into());
                        }
                        writeln!(out, "Done!")?;
                    }
                    None => writeln!(out, "error: usage /timer [secs]")?,
                }
            }
            ReplInput::Resources => write_links(out, "Helpful Resources", HELPFUL_RESOURCES)?,
            ReplInput::Reset => {
                session.reset();
                writeln!(out, "Session cleared.")?;
            }
            ReplInput::Help => writeln!(out, "{HELP}")?,
            ReplInput::Quit => break,
            ReplInput::Unknown(name) => writeln!(out, "unknown command /{name}; try /help")?,
        }
        write!(out, "{PROMPT}")?;
        out.flush()?;
    }
    writeln!(out)?;
    Ok(())
}

pub fn run() -> Result<()> {
    let cfg = load_config()?;
    let mut session = WellnessSession::from_config(&cfg);
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    run_repl(&mut session, stdin.lock(), &mut stdout, Duration::from_secs(1))
}

#[cfg(test)]
mod tests {
    use super::{ReplInput, parse_line, run_repl};
    use crate::wellness::config::{NewsConfig, PapersConfig};
    use crate::wellness::content::{ContentItem, ContentSource, SourceOutcome};
    use crate::wellness::insights::InsightQueries;
    use crate::wellness::responder::UnconfiguredResponder;
    use crate::wellness::session::WellnessSession;
    use std::io::Cursor;
    use std::time::Duration;

    struct Quiet;

    impl ContentSource for Quiet {
        fn name(&self) -> &'static str {
            "quiet"
        }

        fn fetch(&self, _query: &str, _limit: usize) -> SourceOutcome {
            SourceOutcome::Live(vec![ContentItem::text("calm headline")])
        }
    }

    fn session() -> WellnessSession {
        WellnessSession::new(
            Box::new(Quiet),
            Box::new(Quiet),
            Box::new(Quiet),
            Box::new(UnconfiguredResponder),
            InsightQueries::from_config(&NewsConfig::default(), &PapersConfig::default()),
            3,
        )
    }

    fn drive(script: &str) -> String {
        let mut s = session();
        let mut out = Vec::new();
        run_repl(&mut s, Cursor::new(script.to_string()), &mut out, Duration::ZERO)
            .expect("repl runs");
        String::from_utf8(out).expect("utf8")
    }

    #[test]
    fn parse_line_recognizes_commands_and_chat() {
        assert_eq!(parse_line("   "), ReplInput::Empty);
        assert_eq!(parse_line("hello there"), ReplInput::Chat("hello there".to_string()));
        assert_eq!(
            parse_line("/mood 7 long walk today"),
            ReplInput::Mood {
                raw: "7".to_string(),
                notes: "long walk today".to_string()
            }
        );
        assert_eq!(parse_line("/timer"), ReplInput::Timer(None));
        assert_eq!(parse_line("/timer 5"), ReplInput::Timer(Some("5".to_string())));
        assert_eq!(parse_line("/QUIT"), ReplInput::Quit);
        assert_eq!(parse_line("/dance"), ReplInput::Unknown("dance".to_string()));
    }

    #[test]
    fn mood_then_trend_prints_the_day() {
        let out = drive("/mood 6 okay\n/trend\n/quit\n");
        assert!(out.contains("Mood 6 logged at"));
        assert!(out.contains(" 6.00"));
    }

    #[test]
    fn invalid_mood_is_reported_not_stored() {
        let out = drive("/mood 42\n/mood soon\n/trend\n");
        assert!(out.contains("error: invalid input: mood must be between 1 and 10, got 42"));
        assert!(out.contains("error: usage /mood <1-10> [notes]"));
        assert!(out.contains("No moods logged yet."));
    }

    #[test]
    fn chat_without_credentials_still_answers() {
        let out = drive("I can't sleep\n/history\n");
        assert!(out.contains("Therapist: Sorry, I couldn't respond right now"));
        assert!(out.contains("You: I can't sleep"));
    }

    #[test]
    fn timer_counts_down_and_finishes() {
        let out = drive("/timer 2\n");
        assert!(out.contains("00:02\n00:01\n00:00\nDone!"));
    }

    #[test]
    fn quick_actions_list_static_content() {
        let out = drive("/meditation\n/breathing\n/resources\n/insights\n");
        assert!(out.contains("- Body Scan <https://www.youtube.com/watch?v=IHjvM-BLhzU>"));
        assert!(out.contains("2. Hold breath (7 sec)"));
        assert!(out.contains("- Crisis Text Line <https://www.crisistextline.org/>"));
        assert!(out.contains("Latest Research\n- calm headline"));
    }
}
