use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands::{self, CommandReport};

#[derive(Debug, Parser)]
#[command(
    name = "claritycare",
    version,
    about = "Mood tracking, supportive chat and wellness insights in the terminal"
)]
struct Cli {
    /// Print command reports as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive session: chat, log moods, browse insights.
    Session,
    /// Send one message and print the exchange.
    Chat {
        #[arg(long, short)]
        message: String,
    },
    /// Daily mood trend from samples like "2024-05-01 09:30=7".
    Trend {
        #[arg(long = "sample")]
        samples: Vec<String>,
    },
    /// Wellness news and research papers.
    Insights,
    /// Run the web search source on its own.
    Search {
        #[arg(long, short)]
        query: String,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Configuration, credentials and recognized environment variables.
    Status,
}

fn print_report(report: &CommandReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print!("{}", report.render_text());
    }
    Ok(())
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let report = match cli.command {
        Command::Session => return commands::session::run(),
        Command::Chat { message } => {
            commands::chat::run(&commands::chat::ChatOptions { message })?
        }
        Command::Trend { samples } => {
            commands::trend::run(&commands::trend::TrendOptions { samples })?
        }
        Command::Insights => commands::insights::run()?,
        Command::Search { query, limit } => {
            commands::search::run(&commands::search::SearchOptions { query, limit })?
        }
        Command::Status => commands::status::run()?,
    };

    print_report(&report, cli.json)?;
    if !report.ok {
        anyhow::bail!(
            "{} finished with {} issue(s)",
            report.command,
            report.issues.len()
        );
    }
    Ok(())
}
