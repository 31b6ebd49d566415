/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::fs::File;
use std::path::Path;
use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use env_logger::{Env, Target};
use rand::rngs::StdRng;
use rand::SeedableRng;

use config::GameConfig;
use domain::entity::{Facing, FrameInput};
use domain::rules::format_time;
use sim::draw_list;
use sim::event::GameEvent;
use sim::level::{embedded_level, load_level_file};
use sim::step::{restart_game, step};
use sim::world::{WorldState, VOLUME_STEP};
use ui::gamepad::{GamepadState, PadAction};
use ui::input::InputState;
use ui::renderer::Renderer;
use ui::sound::{cue_for, SoundEngine};

const FRAME_SLEEP: Duration = Duration::from_millis(5);
/// Backlog beyond this many ticks is dropped instead of replayed.
const MAX_CATCH_UP: u32 = 5;

const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d')];
const KEYS_JUMP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char(' ')];
const KEYS_PAUSE: &[KeyCode] = &[KeyCode::Char('p')];
const KEYS_RESTART: &[KeyCode] = &[KeyCode::Char('r')];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Char('q'), KeyCode::Esc];

fn main() {
    let config = GameConfig::load();
    init_logging(&config.log_file);
    for warning in &config.warnings {
        log::warn!("config: {warning}");
    }

    let level = match &config.level_file {
        Some(path) => load_level_file(path),
        None => embedded_level(),
    };
    let world = level.and_then(|level| {
        WorldState::new(level, config.physics, config.audio.into(), StdRng::from_entropy())
    });
    let mut world = match world {
        Ok(w) => w,
        Err(e) => {
            log::error!("level setup failed: {e}");
            eprintln!("Level setup failed: {e}");
            std::process::exit(1);
        }
    };

    let mut renderer = Renderer::new();

    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = SoundEngine::new();

    let result = game_loop(&mut world, &mut renderer, sound.as_ref(), &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        log::error!("game loop aborted: {e}");
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Super Valenti!");
    println!("Final Score: {}", world.final_score());
}

/// Route `log` output to a file; the terminal belongs to the renderer.
/// If the file can't be created, logging stays off.
fn init_logging(path: &Path) {
    let file = match File::create(path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Cannot open log file {}: {e}", path.display());
            return;
        }
    };
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .try_init();
}

fn game_loop(
    world: &mut WorldState,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    kb.enable_release_events()?;
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);

    let tick_rate = config.timing.frame_duration();
    let dt = 1.0 / config.timing.fps as f32;
    let mut last_tick = Instant::now();
    // Jump presses seen between ticks, consumed by the next tick.
    let mut pending_jump = false;

    let result = loop {
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() {
            break Ok(());
        }
        match handle_meta(world, sound, &kb, &gp) {
            Ok(true) => break Ok(()),
            Ok(false) => {}
            Err(e) => break Err(e),
        }

        pending_jump |= kb.any_pressed(KEYS_JUMP) || gp.pressed(PadAction::Jump);

        let movement = read_movement(&kb, &gp);
        for _ in 0..due_ticks(&mut last_tick, Instant::now(), tick_rate) {
            let input = FrameInput {
                movement,
                jump: std::mem::take(&mut pending_jump),
            };
            let events = step(world, input, dt);
            log_events(&events);
            process_sound_events(sound, &events, world.audio.sfx);
        }

        if let Some(s) = sound {
            s.set_music_volume(world.audio.music);
        }

        let frame = draw_list::build(world);
        if let Err(e) = renderer.render(&frame, gp.connected) {
            break Err(e.into());
        }

        std::thread::sleep(FRAME_SLEEP);
    };

    kb.disable_release_events()?;
    result
}

/// Whole ticks owed between `*last_tick` and `now`. Advances `last_tick`
/// by one period per tick so the simulation keeps the configured rate.
fn due_ticks(last_tick: &mut Instant, now: Instant, tick_rate: Duration) -> u32 {
    let mut ticks = 0;
    while now.saturating_duration_since(*last_tick) >= tick_rate {
        if ticks == MAX_CATCH_UP {
            log::debug!("simulation fell behind; skipping backlog");
            *last_tick = now;
            break;
        }
        *last_tick += tick_rate;
        ticks += 1;
    }
    ticks
}

fn read_movement(kb: &InputState, gp: &GamepadState) -> Option<Facing> {
    let left = kb.any_held(KEYS_LEFT) || gp.left_held();
    let right = kb.any_held(KEYS_RIGHT) || gp.right_held();
    match (left, right) {
        (true, false) => Some(Facing::Left),
        (false, true) => Some(Facing::Right),
        _ => None,
    }
}

/// Pause, restart, quit and volume keys. Returns Ok(true) to quit.
fn handle_meta(
    world: &mut WorldState,
    sound: Option<&SoundEngine>,
    kb: &InputState,
    gp: &GamepadState,
) -> Result<bool, Box<dyn std::error::Error>> {
    if kb.any_pressed(KEYS_QUIT) || gp.pressed(PadAction::Quit) {
        log::info!("quit requested");
        return Ok(true);
    }

    // Start doubles as pause and restart on the default pad mapping.
    if world.is_over() {
        if !world.paused && (kb.any_pressed(KEYS_RESTART) || gp.pressed(PadAction::Restart)) {
            restart_game(world)?;
            if let Some(s) = sound { s.resume_music(); }
        }
        return Ok(false);
    }

    if kb.any_pressed(KEYS_PAUSE) || gp.pressed(PadAction::Pause) {
        let paused = world.toggle_pause();
        log::info!("{}", if paused { "paused" } else { "resumed" });
        if let Some(s) = sound {
            if paused { s.pause_music(); } else { s.resume_music(); }
        }
        return Ok(false);
    }

    if world.paused {
        if kb.any_pressed(&[KeyCode::Char('[')]) { world.audio.adjust_music(-VOLUME_STEP); }
        if kb.any_pressed(&[KeyCode::Char(']')]) { world.audio.adjust_music(VOLUME_STEP); }
        if kb.any_pressed(&[KeyCode::Char('-')]) { world.audio.adjust_sfx(-VOLUME_STEP); }
        if kb.any_pressed(&[KeyCode::Char('='), KeyCode::Char('+')]) {
            world.audio.adjust_sfx(VOLUME_STEP);
        }
    }

    Ok(false)
}

fn log_events(events: &[GameEvent]) {
    for event in events {
        match event {
            GameEvent::PlayerHurt { lives_left } => log::info!("player hit, {lives_left} lives left"),
            GameEvent::LevelComplete { time, new_best: true } => {
                log::info!("new best time {}", format_time(*time));
            }
            GameEvent::CollectiblePicked { kind } => log::debug!("picked up {kind:?}"),
            _ => {}
        }
    }
}

fn process_sound_events(sound: Option<&SoundEngine>, events: &[GameEvent], volume: f32) {
    let s = match sound {
        Some(s) => s,
        None => return,
    };
    for cue in events.iter().filter_map(cue_for) {
        s.play(cue, volume);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICK: Duration = Duration::from_millis(10);

    #[test]
    fn due_ticks_keeps_the_remainder() {
        let start = Instant::now();
        let mut last = start;
        assert_eq!(due_ticks(&mut last, start + Duration::from_millis(9), TICK), 0);
        assert_eq!(due_ticks(&mut last, start + Duration::from_millis(15), TICK), 1);
        // The 5 ms left over counts toward the next tick.
        assert_eq!(due_ticks(&mut last, start + Duration::from_millis(20), TICK), 1);
        assert_eq!(last, start + Duration::from_millis(20));
    }

    #[test]
    fn due_ticks_holds_rate_despite_late_polls() {
        let start = Instant::now();
        let mut last = start;
        let mut total = 0;
        // Polling every 15 ms must still yield 100 ticks per second.
        for i in 1..=200u64 {
            total += due_ticks(&mut last, start + Duration::from_millis(15 * i), TICK);
        }
        assert_eq!(total, 300);
    }

    #[test]
    fn due_ticks_drops_a_long_stall() {
        let start = Instant::now();
        let mut last = start;
        let now = start + Duration::from_secs(2);
        assert_eq!(due_ticks(&mut last, now, TICK), MAX_CATCH_UP);
        assert_eq!(last, now);
        assert_eq!(due_ticks(&mut last, now, TICK), 0);
    }
}
