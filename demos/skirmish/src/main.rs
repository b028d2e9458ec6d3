use phalanx::prelude::*;
use rand::Rng;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// Round summary
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct RoundSummary {
    round: u32,
    attacker: String,
    ticks: u64,
    winner: Option<String>,
    catches: usize,
    benched: usize,
    score_blue: u32,
    score_red: u32,
}

// ---------------------------------------------------------------------------
// Round setup
// ---------------------------------------------------------------------------

const SQUAD: usize = 3;
const MAX_TICKS: u64 = 1_800;

/// Puts a fresh squad on each field, wakes everyone up and drops the ball
/// on the attacking side.
fn deploy(game: &mut Match, rng: &mut impl Rng) {
    for faction in [Faction::Blue, Faction::Red] {
        for _ in 0..SQUAD {
            let point = game.field(faction).random_point(rng);
            match game.spawn(faction, point) {
                Some(id) => {
                    game.activate(id);
                }
                None => tracing::warn!(%faction, "no soldier available"),
            }
        }
    }
    game.place_ball_randomly(rng);
}

/// Takes every soldier off the field so the next round starts clean.
fn clear(game: &mut Match) {
    let ids: Vec<SoldierId> = game.soldiers().map(|(id, _)| id).collect();
    for id in ids {
        game.bench(id, true);
    }
}

async fn play_round(
    game: &mut Match,
    scheduler: &mut TickScheduler,
    round: u32,
    rng: &mut impl Rng,
) -> RoundSummary {
    let attacker = game.attacker();
    deploy(game, rng);
    let report = game.run(scheduler, MAX_TICKS).await;
    clear(game);

    let count = |f: fn(&MatchEvent) -> bool| report.events.iter().filter(|e| f(e)).count();
    RoundSummary {
        round,
        attacker: attacker.to_string(),
        ticks: report.ticks,
        winner: report.winner.map(|f| f.to_string()),
        catches: count(|e| matches!(e, MatchEvent::Caught { .. })),
        benched: count(|e| matches!(e, MatchEvent::Benched { .. })),
        score_blue: game.score(Faction::Blue),
        score_red: game.score(Faction::Red),
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => MatchConfig::load(&path)?,
        None => MatchConfig::default(),
    };
    let rounds: u32 = match std::env::args().nth(2) {
        Some(n) => n.parse()?,
        None => 2,
    };

    let mut game = Match::new(config);
    let mut scheduler = TickScheduler::new(game.config().tick_config());
    let mut rng = rand::rng();

    for round in 1..=rounds {
        let summary = play_round(&mut game, &mut scheduler, round, &mut rng).await;
        println!("{}", serde_json::to_string(&summary)?);
        game.swap_roles();
    }
    Ok(())
}
