//! Line-based game loop for terminals.
//!
//! Location rounds accept `hint`, `guess <lat> <lon>` and `quit`. Trivia
//! rounds accept an answer number or id, and `quit`. End of input ends the
//! session like `quit`.

use std::io::{BufRead, Write};
use std::str::FromStr;

use anyhow::Result;
use satama_core::{
    Accuracy, ActiveRound, AnswerId, Coordinate, HintPayload, HintStep, RoundId, RoundResult,
    SessionConfig, SessionId, TriviaRound, geo,
};
use tracing::{debug, instrument, warn};

use crate::catalog::{HarborCatalog, TriviaCatalog};
use crate::clock::Clock;
use crate::error::ServiceError;
use crate::identity::Identity;
use crate::service::{GameService, SessionOutcome};
use crate::store::ResultStore;

/// One line of player input.
#[derive(Debug, Clone, PartialEq)]
enum Input {
    Hint,
    Guess(f64, f64),
    Answer(String),
    Quit,
    Help,
}

impl FromStr for Input {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(first) = words.next() else {
            return Err("Type `help` for commands".to_string());
        };
        match first.to_ascii_lowercase().as_str() {
            "hint" | "h" => Ok(Self::Hint),
            "quit" | "q" | "exit" => Ok(Self::Quit),
            "help" | "?" => Ok(Self::Help),
            "guess" | "g" => {
                let numbers: Vec<f64> = words
                    .map(|w| w.trim_end_matches(',').parse::<f64>())
                    .collect::<Result<_, _>>()
                    .map_err(|e| format!("Cannot read coordinates: {}", e))?;
                match numbers.as_slice() {
                    [lat, lon] => Ok(Self::Guess(*lat, *lon)),
                    _ => Err("Usage: guess <latitude> <longitude>".to_string()),
                }
            }
            "answer" | "a" => words
                .next()
                .map(|w| Self::Answer(w.to_string()))
                .ok_or_else(|| "Usage: answer <number or id>".to_string()),
            _ => Ok(Self::Answer(first.to_string())),
        }
    }
}

/// Plays one session on `input`/`output` and returns its outcome.
///
/// # Errors
///
/// Fails when the session cannot start or the terminal cannot be read or
/// written. Rejected moves are reported to the player and the loop goes on.
/// Once started, the session is always ended and offered to the store, even
/// when the loop fails.
#[instrument(skip_all)]
pub fn play<C, I, S, K, R, W>(
    service: &mut GameService<C, I, S, K>,
    config: &SessionConfig,
    mut input: R,
    mut output: W,
) -> Result<SessionOutcome>
where
    C: HarborCatalog + TriviaCatalog,
    I: Identity,
    S: ResultStore,
    K: Clock,
    R: BufRead,
    W: Write,
{
    let session = service.start_session(config)?;
    let id = *session.id();
    writeln!(
        output,
        "Session {} started: {} rounds at {} difficulty",
        id,
        session.plan().len(),
        session.difficulty()
    )?;

    let played = play_rounds(service, id, &mut input, &mut output);
    if let Err(e) = &played {
        warn!(session_id = %id, error = %e, "Game loop failed, ending session");
    }
    let outcome = service.end_session(id)?;
    played?;

    let session = outcome.session();
    writeln!(
        output,
        "Final score {} over {} rounds, best streak {} ({})",
        session.total_score(),
        session.rounds_played(),
        session.best_streak(),
        outcome.save()
    )?;
    Ok(outcome)
}

/// Plays rounds until the session is over, the player quits or input ends.
fn play_rounds<C, I, S, K, R, W>(
    service: &mut GameService<C, I, S, K>,
    id: SessionId,
    input: &mut R,
    output: &mut W,
) -> Result<()>
where
    C: HarborCatalog + TriviaCatalog,
    I: Identity,
    S: ResultStore,
    K: Clock,
    R: BufRead,
    W: Write,
{
    let mut shown: Option<RoundId> = None;
    let mut line = String::new();
    loop {
        if let Some(result) = service.expire_round(id)? {
            writeln!(output, "Time is up!")?;
            print_result(output, &result)?;
        }
        let Some(round) = service.current_round(id)?.cloned() else {
            break;
        };
        if shown != Some(round.id()) {
            present(output, &round, service.clock().now())?;
            shown = Some(round.id());
        }

        write!(output, "> ")?;
        output.flush()?;
        line.clear();
        if input.read_line(&mut line)? == 0 {
            debug!("End of input");
            break;
        }

        let command = match line.trim().parse::<Input>() {
            Ok(command) => command,
            Err(message) => {
                writeln!(output, "{}", message)?;
                continue;
            }
        };
        match step(service, &round, command) {
            Ok(Step::Quit) => break,
            Ok(Step::Message(text)) => writeln!(output, "{}", text)?,
            Ok(Step::Resolved(result)) => print_result(output, &result)?,
            Err(ServiceError::Game(e)) => writeln!(output, "Not accepted: {}", e)?,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

enum Step {
    Quit,
    Message(String),
    Resolved(RoundResult),
}

fn step<C, I, S, K>(
    service: &mut GameService<C, I, S, K>,
    round: &ActiveRound,
    command: Input,
) -> Result<Step, ServiceError>
where
    C: HarborCatalog + TriviaCatalog,
    I: Identity,
    S: ResultStore,
    K: Clock,
{
    match (round, command) {
        (_, Input::Quit) => Ok(Step::Quit),
        (ActiveRound::Location(_), Input::Help) => Ok(Step::Message(
            "Commands: hint, guess <latitude> <longitude>, quit".to_string(),
        )),
        (ActiveRound::Trivia(_), Input::Help) => Ok(Step::Message(
            "Answer with the number or id of a choice, or quit".to_string(),
        )),
        (ActiveRound::Location(_), Input::Hint) => {
            Ok(Step::Message(match service.request_hint(round.id())? {
                Some(hint) => describe_hint(&hint),
                None => "No hints left".to_string(),
            }))
        }
        (ActiveRound::Location(_), Input::Guess(lat, lon)) => {
            let guess = Coordinate::new(lat, lon)?;
            service.submit_guess(round.id(), guess).map(Step::Resolved)
        }
        (ActiveRound::Location(_), Input::Answer(_)) => Ok(Step::Message(
            "This is a location round: guess <latitude> <longitude>".to_string(),
        )),
        (ActiveRound::Trivia(trivia), Input::Answer(choice)) => {
            let answer = resolve_choice(trivia, &choice);
            service.submit_answer(round.id(), answer).map(Step::Resolved)
        }
        (ActiveRound::Trivia(_), _) => Ok(Step::Message(
            "This is a trivia round: answer with a number".to_string(),
        )),
    }
}

/// Maps a 1-based choice number to its answer id; anything else is taken as an id.
fn resolve_choice(round: &TriviaRound, choice: &str) -> AnswerId {
    choice
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| round.question().answers().get(i))
        .map(|a| a.id().clone())
        .unwrap_or_else(|| AnswerId::from(choice))
}

fn present<W: Write>(
    output: &mut W,
    round: &ActiveRound,
    now: chrono::DateTime<chrono::Utc>,
) -> std::io::Result<()> {
    match round {
        ActiveRound::Location(r) => {
            writeln!(output, "\nRound {}: where is {}?", r.id().ordinal(), r.harbor().name())?;
            writeln!(output, "{} hints available", r.hints_remaining())
        }
        ActiveRound::Trivia(r) => {
            writeln!(output, "\nRound {}: {}", r.id().ordinal(), r.question().prompt())?;
            for (i, answer) in r.question().answers().iter().enumerate() {
                writeln!(output, "  {}. {}", i + 1, answer.text())?;
            }
            writeln!(output, "{} seconds to answer", r.remaining(now).num_seconds())
        }
    }
}

fn describe_hint(hint: &HintStep) -> String {
    let text = match hint.payload() {
        HintPayload::Zoom { level } => format!("The map zooms in to level {}", level),
        HintPayload::Text { clue } => format!("Clue: {}", clue),
        HintPayload::Image { uri } => format!("Picture: {}", uri),
        HintPayload::Region { center, radius_m } => format!(
            "It lies within {:.0} km of {}",
            radius_m / 1000.0,
            center
        ),
    };
    format!("{} (-{} points)", text, hint.penalty())
}

fn print_result<W: Write>(output: &mut W, result: &RoundResult) -> std::io::Result<()> {
    match result.accuracy() {
        Accuracy::Distance {
            meters,
            bearing_deg,
        } => writeln!(
            output,
            "{:.1} km off, the harbor lies {} of your guess. {} points",
            meters / 1000.0,
            geo::compass_point(*bearing_deg),
            result.score()
        ),
        Accuracy::Answer { correct: true, .. } => {
            writeln!(output, "Correct! {} points", result.score())
        }
        Accuracy::Answer {
            timed_out: true, ..
        } => writeln!(output, "Too late. {} points", result.score()),
        Accuracy::Answer { .. } => writeln!(output, "Wrong answer. {} points", result.score()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands() {
        assert_eq!("hint".parse::<Input>(), Ok(Input::Hint));
        assert_eq!("guess 60.17, 24.94".parse::<Input>(), Ok(Input::Guess(60.17, 24.94)));
        assert_eq!("2".parse::<Input>(), Ok(Input::Answer("2".to_string())));
        assert_eq!("answer oslo".parse::<Input>(), Ok(Input::Answer("oslo".to_string())));
        assert_eq!("Q".parse::<Input>(), Ok(Input::Quit));
        assert!("guess 60.17".parse::<Input>().is_err());
        assert!("guess north east".parse::<Input>().is_err());
        assert!("".parse::<Input>().is_err());
    }
}
