//! Headless session runner: plays all-bot games and prints the rankings.
//! Useful for eyeballing balance and for smoke-testing rule changes.
//!
//! ```text
//! cardtable [--variant shedding|elimination] [--players N] [--games N]
//!           [--difficulty low|high] [--seed N]
//! ```

use std::process::ExitCode;

use cardtable_rs::rules::Variant;
use cardtable_rs::session::{GameSession, SessionConfig};
use cardtable_rs::strategy::Difficulty;

struct Options {
    variant: Variant,
    players: usize,
    games: usize,
    difficulty: Difficulty,
    seed: Option<u64>,
}

fn parse_args() -> Result<Options, String> {
    let mut opts = Options {
        variant: Variant::Shedding,
        players: 4,
        games: 1,
        difficulty: Difficulty::Low,
        seed: None,
    };
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        let mut value = |name: &str| {
            args.next().ok_or_else(|| format!("{name} requires a value"))
        };
        match arg.as_str() {
            "--variant" => {
                opts.variant = match value("--variant")?.as_str() {
                    "shedding" => Variant::Shedding,
                    "elimination" => Variant::Elimination,
                    other => return Err(format!("unknown variant '{other}'")),
                };
            }
            "--players" => {
                opts.players = value("--players")?
                    .parse()
                    .map_err(|e| format!("--players: {e}"))?;
            }
            "--games" => {
                opts.games = value("--games")?
                    .parse()
                    .map_err(|e| format!("--games: {e}"))?;
            }
            "--difficulty" => {
                opts.difficulty = match value("--difficulty")?.as_str() {
                    "low" => Difficulty::Low,
                    "high" => Difficulty::High,
                    other => return Err(format!("unknown difficulty '{other}'")),
                };
            }
            "--seed" => {
                opts.seed =
                    Some(value("--seed")?.parse().map_err(|e| format!("--seed: {e}"))?);
            }
            "--help" | "-h" => {
                println!(
                    "usage: cardtable [--variant shedding|elimination] [--players N] \
                     [--games N] [--difficulty low|high] [--seed N]"
                );
                std::process::exit(0);
            }
            other => return Err(format!("unknown argument '{other}'")),
        }
    }
    Ok(opts)
}

fn main() -> ExitCode {
    pretty_env_logger::init();

    let opts = match parse_args() {
        Ok(opts) => opts,
        Err(msg) => {
            eprintln!("cardtable: {msg}");
            return ExitCode::FAILURE;
        }
    };

    let mut wins = vec![0usize; opts.players];
    for game in 0..opts.games {
        let mut config = match opts.variant {
            Variant::Shedding => SessionConfig::shedding(opts.players),
            Variant::Elimination => SessionConfig::elimination(opts.players),
        }
        .with_difficulty(opts.difficulty);
        if let Some(seed) = opts.seed {
            config = config.with_seed(seed.wrapping_add(game as u64));
        }

        let mut session = match GameSession::create(config) {
            Ok(session) => session,
            Err(e) => {
                eprintln!("cardtable: {e}");
                return ExitCode::FAILURE;
            }
        };
        match session.run_to_completion() {
            Ok(ranking) => {
                wins[ranking[0]] += 1;
                println!("game {:>4}: ranking {ranking:?}", game + 1);
            }
            Err(e) => {
                eprintln!("cardtable: game {} failed: {e}", game + 1);
                return ExitCode::FAILURE;
            }
        }
    }

    println!("wins by seat: {wins:?}");
    ExitCode::SUCCESS
}
