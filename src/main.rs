//! Tilefall headless runner
//!
//! Plays one session with the demo player, saves the stats and prints the
//! last-game and lifetime summaries.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use serde::Serialize;

use tilefall::persistence::{LifetimeSummary, SaveReport, StatsStore};
use tilefall::settings::{Difficulty, SessionConfig, Settings};
use tilefall::sim::{Autoplay, Match, SessionResult, TickDriver};
use tilefall::user::{LoggedInUser, resolve_user_id};

#[derive(Debug, Parser)]
#[command(name = "tilefall")]
#[command(about = "Play a falling-tile session headless and record the stats", long_about = None)]
struct Args {
    /// Player id (Guest when omitted)
    #[arg(short, long)]
    user: Option<String>,

    /// Song index
    #[arg(short, long, default_value_t = 1)]
    song: u32,

    /// Difficulty, e.g. "easy" or "VERY_HARD" (settings file when omitted)
    #[arg(short, long, value_parser = parse_difficulty)]
    difficulty: Option<Difficulty>,

    /// Lane RNG seed (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Demo player skill, 0.0 to 1.0
    #[arg(long, default_value_t = 0.8)]
    skill: f32,

    /// Track length in seconds (settings file when omitted)
    #[arg(long)]
    seconds: Option<f32>,

    /// Stats directory (settings file when omitted)
    #[arg(long)]
    stats_dir: Option<PathBuf>,

    /// Settings file
    #[arg(long, default_value = "settings.json")]
    settings: PathBuf,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

fn parse_difficulty(s: &str) -> Result<Difficulty, String> {
    Difficulty::from_str(s).ok_or_else(|| format!("unknown difficulty: {s}"))
}

#[derive(Debug, Serialize)]
struct Report {
    last: SessionResult,
    saved_last: bool,
    saved_lifetime: bool,
    new_best: bool,
    lifetime: Option<LifetimeSummary>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut settings = Settings::load(&args.settings);
    if let Some(difficulty) = args.difficulty {
        settings.difficulty = difficulty;
    }
    if let Some(seconds) = args.seconds {
        settings.fallback_track_seconds = seconds;
    }
    if let Some(dir) = args.stats_dir {
        settings.stats_dir = dir;
    }

    let user = args.user.map(LoggedInUser::new).unwrap_or_default();
    let user_id = resolve_user_id(&user);

    let seed = args.seed.unwrap_or_else(rand::random);
    log::info!("Tilefall (headless) starting with seed: {}", seed);

    let config = SessionConfig::from_settings(&settings, args.song).with_seed(seed);
    let result = play(config, &user_id, seed, args.skill)?;

    let store = StatsStore::new(&settings.stats_dir);
    let saved = store
        .save(&result)
        .with_context(|| format!("failed to save stats for {}", result.user_id))?;
    let lifetime = store.load_lifetime_summary(&user_id, result.song_id, result.difficulty.key());

    let report = Report {
        last: result,
        saved_last: saved.last_written,
        saved_lifetime: saved.lifetime_written,
        new_best: saved.new_best,
        lifetime,
    };

    if args.json {
        let json = serde_json::to_string_pretty(&report).context("failed to serialize report")?;
        println!("{json}");
    } else {
        print_text(&report, &saved);
    }
    Ok(())
}

/// Run the match on the fixed-step clock until it ends
fn play(config: SessionConfig, user_id: &str, seed: u64, skill: f32) -> anyhow::Result<SessionResult> {
    let mut driver = TickDriver::new(config.tick_rate);
    let frame_dt = config.tick_dt();

    let mut session = Match::new(config, user_id, None);
    let mut bot = Autoplay::new(seed.wrapping_add(1), skill);
    session.start();

    while !session.phase().is_over() {
        driver.run(frame_dt, || {
            session.on_tick();
            bot.act(&mut session);
        });
    }

    log::debug!("Played {} ticks", driver.total_ticks());
    session
        .take_result()
        .context("session ended without a result")
}

fn print_text(report: &Report, saved: &SaveReport) {
    let last = &report.last;
    println!("Last game");
    println!("  Player:     {}", last.user_id);
    println!("  Song:       {} ({})", last.song_id, last.difficulty);
    println!("  Played:     {}", last.time_text);
    println!("  Score:      {}", last.score);
    println!("  Hits:       {}", last.hits);
    println!("  Misses:     {} ({} wrong presses)", last.misses, last.wrongs);
    println!("  Accuracy:   {:.2}%", last.accuracy_percent);
    println!("  Max combo:  {}", last.max_combo);

    if !saved.last_written || !saved.lifetime_written {
        println!("  (stats were not fully saved, see log)");
    }
    if saved.new_best {
        println!("  New personal best!");
    }

    let Some(lifetime) = &report.lifetime else {
        return;
    };
    println!();
    println!("Lifetime");
    println!("  Games:      {}", lifetime.total_games);
    println!("  Hits:       {}", lifetime.total_hits);
    println!("  Misses:     {}", lifetime.total_misses);
    println!("  Errors:     {}", lifetime.total_errors);
    println!("  Score:      {}", lifetime.total_score);
    println!("  Accuracy:   {:.2}%", lifetime.lifetime_accuracy_percent);
    println!(
        "  Best ({} {}): {} pts, {:.2}%, combo {}",
        lifetime.song_id,
        lifetime.difficulty,
        lifetime.best.score,
        lifetime.best.accuracy_percent,
        lifetime.best.max_combo
    );
}
