//! Starlance headless demo
//!
//! Runs a scripted autopilot through an arcade session or a built-in mission
//! and prints a summary. Usage:
//!
//! ```text
//! starlance [arcade|<mission-id>] [seed] [tuning.json]
//! ```

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use glam::Vec2;

    use starlance::consts::*;
    use starlance::sim::{GameState, GameStatus, TickInput, WeaponType, advance, catalog, find_mission};
    use starlance::{LogAudio, MissionRecords, ProgressionSnapshot, Tuning};

    /// Session length cap (3 minutes of frames)
    const MAX_TICKS: u64 = 60 * 180;

    struct Args {
        mode: String,
        seed: u64,
        tuning_path: Option<String>,
    }

    fn parse_args() -> Args {
        let mut args = std::env::args().skip(1);
        let mode = args.next().unwrap_or_else(|| "arcade".to_string());
        let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(0x5EED);
        let tuning_path = args.next();
        Args {
            mode,
            seed,
            tuning_path,
        }
    }

    fn load_tuning(path: Option<&str>) -> Tuning {
        let Some(path) = path else {
            return Tuning::default();
        };
        let loaded = std::fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|json| Tuning::from_json(&json).map_err(|e| e.to_string()));
        match loaded {
            Ok(tuning) => {
                log::info!("Loaded tuning from {}", path);
                tuning
            }
            Err(e) => {
                log::warn!("Ignoring tuning file {}: {}", path, e);
                Tuning::default()
            }
        }
    }

    /// Chase the nearest enemy horizontally and keep the trigger down
    fn autopilot(state: &GameState) -> TickInput {
        let player = state.player.pos;
        let target = state
            .enemies
            .iter()
            .filter(|e| e.is_collidable())
            .min_by(|a, b| {
                a.pos
                    .distance_squared(player)
                    .total_cmp(&b.pos.distance_squared(player))
            })
            .map(|e| e.pos);

        let mut input = TickInput::frame();
        if let Some(Vec2 { x, .. }) = target {
            input.left = x < player.x - 6.0;
            input.right = x > player.x + 6.0;
        }
        let weapon = &state.player.weapon;
        // Hold charge for a while every few seconds, then release into a shot
        let cycle = state.time_ticks % 300;
        input.charge = (200..260).contains(&cycle) && !weapon.overheated;
        input.shoot = !input.charge && weapon.heat_percent() < 85.0;
        input.cycle_weapon = state.time_ticks % 900 == 899;
        input
    }

    pub fn run() {
        env_logger::init();
        let args = parse_args();
        let tuning = load_tuning(args.tuning_path.as_deref());

        let mut progression = ProgressionSnapshot {
            unlocked_weapons: vec![
                WeaponType::Pulse,
                WeaponType::LaserCannon,
                WeaponType::PlasmaBeam,
                WeaponType::HomingMissile,
            ],
            ..Default::default()
        };
        progression.weapon_levels.insert(WeaponType::Pulse, 2);

        let mut state = if args.mode == "arcade" {
            GameState::new_arcade(args.seed, &progression, tuning)
        } else {
            match find_mission(&args.mode) {
                Some(definition) => GameState::new_mission(args.seed, &progression, tuning, &definition),
                None => {
                    let ids: Vec<String> = catalog().into_iter().map(|m| m.id).collect();
                    eprintln!("Unknown mission '{}'. Available: arcade, {}", args.mode, ids.join(", "));
                    std::process::exit(2);
                }
            }
        };
        log::info!("Starlance demo starting (seed {})", args.seed);

        let mut audio = LogAudio;
        let mut rejected = 0u32;
        while state.status == GameStatus::Playing && state.time_ticks < MAX_TICKS {
            let input = autopilot(&state);
            match advance(&state, &input, &mut audio) {
                Ok(next) => state = next,
                Err(e) => {
                    // Keep the last good state and try again next frame
                    rejected += 1;
                    log::warn!("Tick rejected: {}", e);
                    if rejected > 10 {
                        break;
                    }
                }
            }
        }

        println!("Status:  {:?}", state.status);
        println!("Time:    {:.1} s", state.time_ms / 1000.0);
        println!("Score:   {}", state.score);
        println!("Kills:   {}", state.kills);
        println!("Lives:   {}/{}", state.player.lives, PLAYER_MAX_LIVES);
        println!(
            "Weapon:  {} (heat {:.0}%, energy {:.0}%)",
            state
                .player
                .weapon
                .active_weapon()
                .map(|w| w.kind.as_str())
                .unwrap_or("none"),
            state.player.weapon.heat_percent(),
            state.player.weapon.energy_percent()
        );

        if let Some(result) = &state.mission_result {
            let mut records = MissionRecords::new();
            if records.record(result) {
                println!("New best for {}: {}", result.mission_id, result.score);
            }
            let next = progression.apply_result(result);
            match next.to_json() {
                Ok(json) => println!("Progression: {}", json),
                Err(e) => log::warn!("Could not serialize progression: {}", e),
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    demo::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // No headless demo on the web; embed the library instead
}
