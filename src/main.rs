//! Headless replay verifier.
//!
//! Loads a `.osu` beatmap and either replays a stored replay or runs an
//! autoplay reference session, then prints the results as JSON.
//!
//! ```text
//! rvsrg-verify <map.osu> (--replay <file.r|file.json> | --autoplay)
//!              [--rate <x>] [--settings <settings.toml>]
//! ```

use clap::{ArgGroup, Parser};
use rvsrg_engine::database::replay_storage::load_replay_from_path;
use rvsrg_engine::logic::replay_engine::simulate;
use rvsrg_engine::models::engine::constants::us_to_ms;
use rvsrg_engine::models::engine::load_beatmap;
use rvsrg_engine::models::replay::ReplayRecord;
use rvsrg_engine::{ColumnMapSource, GameEngine, GameplaySettings, Mods, PlayResults};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(group(ArgGroup::new("mode").required(true).args(["replay", "autoplay"])))]
struct Cli {
    /// Beatmap (.osu) to play.
    map: PathBuf,

    /// Replay to verify (.r blob or .json export).
    #[arg(short, long)]
    replay: Option<PathBuf>,

    /// Run an autoplay reference session instead of a replay.
    #[arg(short, long)]
    autoplay: bool,

    /// Playback rate for autoplay. Replays carry their own rate.
    #[arg(long, default_value_t = 1.0)]
    rate: f64,

    /// Gameplay settings file (TOML).
    #[arg(short, long)]
    settings: Option<PathBuf>,
}

fn load_record(path: &Path) -> Result<ReplayRecord, String> {
    if path.extension().is_some_and(|ext| ext == "json") {
        let json = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
        ReplayRecord::from_json(&json).map_err(|e| e.to_string())
    } else {
        load_replay_from_path(path).map_err(|e| e.to_string())
    }
}

fn run(args: &Cli) -> Result<PlayResults, String> {
    let settings = args
        .settings
        .as_deref()
        .map(GameplaySettings::load)
        .unwrap_or_default();
    let beatmap = load_beatmap(&args.map).map_err(|e| e.to_string())?;

    if let Some(path) = &args.replay {
        let record = load_record(path)?;
        log::info!("MAIN: Verifying replay {:?} ({} presses)", path, record.press_count());
        return simulate(&beatmap, &record, &settings).map_err(|e| e.to_string());
    }

    let mods = Mods {
        autoplay: true,
        playback_rate: args.rate,
        ..Mods::default()
    };
    let mut engine = GameEngine::new(&beatmap, &mods, &settings, ColumnMapSource::Seed(0))
        .map_err(|e| e.to_string())?;
    let end_ms = us_to_ms(engine.song_end_us()) + 1.0;
    engine.tick(end_ms, &[]).map_err(|e| e.to_string())?;
    let summary = engine.finish().map_err(|e| e.to_string())?;
    Ok(summary.results)
}

fn main() -> ExitCode {
    if std::env::var_os("RUST_LOG").is_none() {
        unsafe {
            std::env::set_var("RUST_LOG", "info");
        }
    }
    env_logger::init();

    let args = Cli::parse();

    match run(&args) {
        Ok(results) => match serde_json::to_string_pretty(&results) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                log::error!("MAIN: Failed to serialize results: {}", e);
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            log::error!("MAIN: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_replay_mode() {
        let cli = Cli::try_parse_from(["rvsrg-verify", "map.osu", "--replay", "play.r"]).unwrap();
        assert_eq!(cli.map, PathBuf::from("map.osu"));
        assert_eq!(cli.replay, Some(PathBuf::from("play.r")));
        assert!(!cli.autoplay);
        assert_eq!(cli.rate, 1.0);
    }

    #[test]
    fn test_autoplay_with_rate() {
        let cli =
            Cli::try_parse_from(["rvsrg-verify", "map.osu", "--autoplay", "--rate", "1.5"]).unwrap();
        assert!(cli.autoplay);
        assert_eq!(cli.rate, 1.5);
    }

    #[test]
    fn test_a_mode_is_required() {
        assert!(Cli::try_parse_from(["rvsrg-verify", "map.osu"]).is_err());
        assert!(Cli::try_parse_from(["rvsrg-verify", "map.osu", "-a", "-r", "play.r"]).is_err());
    }
}
