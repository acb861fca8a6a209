use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use jungle_game_engine::engine::plugin::GameFactory;
use jungle_game_engine::games::jungle::layout::{load_default_layout, load_layout};
use jungle_game_engine::games::jungle::types::{Position, Terrain};
use jungle_game_engine::games::jungle::{GameSession, JungleFactory};

#[derive(Parser)]
#[command(name = "jungle-engine", about = "Play Jungle from the terminal")]
struct Cli {
    /// Path to a layout TOML file (default: auto-discover, then the standard board)
    #[arg(long, env = "JUNGLE_LAYOUT")]
    layout: Option<PathBuf>,
}

const HELP: &str = "commands: x,y x,y | moves | undo | pass | board | reset | help | quit";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let layout = match cli.layout {
        Some(ref path) => load_layout(path).map_err(|e| format!("Failed to load layout: {}", e))?,
        None => load_default_layout(),
    };
    let factory = JungleFactory::new(layout);
    let mut session = GameSession::new(&factory)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "{}: {}", factory.display_name(), factory.description())?;
    writeln!(out, "{}", render(&session))?;
    writeln!(out, "{}", HELP)?;

    for line in io::stdin().lock().lines() {
        let line = line?;
        let words: Vec<&str> = line.split_whitespace().collect();
        match words.as_slice() {
            [] => continue,
            ["quit"] | ["exit"] => break,
            ["help"] => writeln!(out, "{}", HELP)?,
            ["board"] => writeln!(out, "{}", render(&session))?,
            ["undo"] => {
                if session.undo() {
                    writeln!(out, "{}", render(&session))?;
                } else {
                    writeln!(out, "nothing to undo")?;
                }
            }
            ["pass"] => {
                session.pass_turn();
                writeln!(out, "{}", render(&session))?;
            }
            ["reset"] => {
                session.reset(&factory)?;
                writeln!(out, "{}", render(&session))?;
            }
            ["moves"] => {
                let moves = session.legal_moves(session.current_seat());
                let listed: Vec<String> = moves
                    .iter()
                    .map(|m| format!("{}:{}->{}", m.piece.species, m.from, m.to))
                    .collect();
                writeln!(out, "{}", listed.join("  "))?;
            }
            [from, to] => {
                let (from, to) = match (from.parse::<Position>(), to.parse::<Position>()) {
                    (Ok(f), Ok(t)) => (f, t),
                    (Err(e), _) | (_, Err(e)) => {
                        writeln!(out, "{}", e)?;
                        continue;
                    }
                };
                match session.request_move(from, to) {
                    Ok(outcome) if outcome.accepted => {
                        if let Some(piece) = &outcome.captured {
                            writeln!(out, "captured {}", piece.species)?;
                        }
                        writeln!(out, "{}", render(&session))?;
                        if let Some(winner) = &outcome.winner {
                            writeln!(out, "game over, {} wins", winner)?;
                        }
                    }
                    Ok(outcome) => {
                        writeln!(
                            out,
                            "rejected: {}",
                            outcome.rejection.as_deref().unwrap_or("unknown")
                        )?;
                    }
                    Err(e) => writeln!(out, "error: {}", e)?,
                }
            }
            _ => writeln!(out, "unknown command, {}", HELP)?,
        }
        for event in session.take_events() {
            debug!(event = %event.event_type, player = ?event.player_id, "session event");
        }
        out.flush()?;
    }

    Ok(())
}

/// Row `height-1` on top. Seat 0 pieces upper-case, seat 1 lower-case.
fn render(session: &GameSession) -> String {
    let board = session.board();
    let mut lines = Vec::new();
    for y in (0..board.height()).rev() {
        let mut row = format!("{:>2} ", y);
        for x in 0..board.width() {
            let pos = Position::new(x, y);
            let Ok(cell) = board.cell(pos) else { continue };
            let glyph = match (cell.occupant, cell.terrain) {
                (Some(occ), _) if occ.owner == 0 => occ.species.symbol().to_ascii_uppercase(),
                (Some(occ), _) => occ.species.symbol(),
                (None, Terrain::Water) => '~',
                (None, Terrain::Trap { .. }) => '#',
                (None, Terrain::Den { .. }) => '@',
                (None, Terrain::Normal) => '.',
            };
            row.push(' ');
            row.push(glyph);
        }
        lines.push(row);
    }
    let axis: String = (0..board.width()).map(|x| format!(" {}", x % 10)).collect();
    lines.push(format!("   {}", axis));
    match session.winner() {
        Some(winner) => lines.push(format!("game over, winner: {}", winner)),
        None => lines.push(format!("to move: {}", session.current_player())),
    }
    lines.join("\n")
}
