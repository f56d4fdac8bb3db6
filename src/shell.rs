//! Terminal front end for a [`DiceTable`]
//!
//! Parses one command per line and renders the session as plain text.

use crate::{
    errors::EngineError,
    games::{parse_bet_input, BetPreset, DiceTable, RollOutcome, RollRecord, SessionStats},
};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Roll the given stake, or the selected bet amount
    Roll(Option<i64>),
    Bet(i64),
    Preset(BetPreset),
    Reset,
    History,
    Stats,
    Status,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShellError {
    #[error("Unknown command '{0}'. Type 'help' for a list of commands.")]
    UnknownCommand(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

pub const HELP: &str = "\
Commands:
  roll [amount]   roll the die (4-6 wins, 1-3 loses)
  bet <amount>    set the bet amount
  10% | 50% | max quick bet relative to your balance
  reset           restore the starting balance and clear history
  history         list past rolls, newest first
  stats           win/loss summary
  status          balance, bet and last result
  help            show this message
  quit            leave the table";

pub fn parse_command(line: &str) -> Result<Command, ShellError> {
    let mut parts = line.split_whitespace();
    let Some(word) = parts.next() else {
        return Ok(Command::Status);
    };
    let arg = parts.next();
    if parts.next().is_some() {
        return Err(ShellError::UnknownCommand(line.trim().to_string()));
    }

    let command = match (word.to_ascii_lowercase().as_str(), arg) {
        ("roll" | "r", None) => Command::Roll(None),
        ("roll" | "r", Some(amount)) => Command::Roll(Some(parse_bet_input(amount)?)),
        ("bet" | "b", Some(amount)) => Command::Bet(parse_bet_input(amount)?),
        ("bet" | "b", None) => return Err(ShellError::Usage("bet <amount>")),
        ("10%", None) => Command::Preset(BetPreset::TenPercent),
        ("50%" | "half", None) => Command::Preset(BetPreset::Half),
        ("max" | "all", None) => Command::Preset(BetPreset::Max),
        ("reset", None) => Command::Reset,
        ("history" | "h", None) => Command::History,
        ("stats", None) => Command::Stats,
        ("status" | "s", None) => Command::Status,
        ("help" | "?", None) => Command::Help,
        ("quit" | "exit" | "q", None) => Command::Quit,
        _ => return Err(ShellError::UnknownCommand(line.trim().to_string())),
    };
    Ok(command)
}

/// Run one command against the table and render its output.
///
/// `Quit` renders nothing; the caller ends the loop.
pub async fn execute(table: &DiceTable, command: Command) -> Result<String, EngineError> {
    let output = match command {
        Command::Roll(amount) => {
            let record = match amount {
                Some(amount) => table.roll(amount).await?,
                None => table.roll_current().await?,
            };
            render_roll(&record, table.balance())
        }
        Command::Bet(amount) => {
            table.set_bet_amount(amount)?;
            format!("Bet set to ${}", format_amount(amount))
        }
        Command::Preset(preset) => {
            let amount = table.apply_preset(preset)?;
            format!("Bet set to ${}", format_amount(amount))
        }
        Command::Reset => {
            table.reset()?;
            format!("Table reset. {}", render_status(table))
        }
        Command::History => render_history(table.snapshot().history.iter()),
        Command::Stats => render_stats(&table.stats()),
        Command::Status => render_status(table),
        Command::Help => HELP.to_string(),
        Command::Quit => String::new(),
    };
    Ok(output)
}

/// Group thousands with commas: 1234567 -> "1,234,567"
pub fn format_amount(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if amount < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

pub fn render_roll(record: &RollRecord, balance: i64) -> String {
    let verdict = match record.outcome {
        RollOutcome::Win => format!("You won ${}!", format_amount(record.bet)),
        RollOutcome::Lose => format!("You lost ${}.", format_amount(record.bet)),
    };
    format!(
        "🎲 Rolled {}. {} Balance: ${}",
        record.roll,
        verdict,
        format_amount(balance)
    )
}

pub fn render_status(table: &DiceTable) -> String {
    let snapshot = table.snapshot();
    let last = match snapshot.last_result {
        Some(outcome) => outcome.to_string(),
        None => "-".to_string(),
    };
    format!(
        "Balance: ${} | Bet: ${} | Last result: {}{}",
        format_amount(snapshot.balance),
        format_amount(snapshot.bet_amount),
        last,
        if snapshot.busy { " | rolling..." } else { "" }
    )
}

pub fn render_history<'a, I>(history: I) -> String
where
    I: ExactSizeIterator<Item = &'a RollRecord>,
{
    if history.len() == 0 {
        return "No game history yet. Start playing!".to_string();
    }

    history
        .map(|record| {
            let change = if record.balance_change >= 0 {
                format!("+${}", format_amount(record.balance_change))
            } else {
                format!("-${}", format_amount(-record.balance_change))
            };
            format!(
                "[{}] rolled {}  bet ${}  {}",
                record.timestamp.format("%H:%M:%S"),
                record.roll,
                format_amount(record.bet),
                change
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_stats(stats: &SessionStats) -> String {
    format!(
        "Rolls: {} | Wins: {} | Losses: {} | Win rate: {:.1}% | Wagered: ${} | Net: {}${}",
        stats.rolls,
        stats.wins,
        stats.losses,
        stats.win_rate * 100.0,
        format_amount(stats.total_wagered),
        if stats.net_change < 0 { "-" } else { "+" },
        format_amount(stats.net_change.abs())
    )
}
