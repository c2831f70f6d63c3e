/// Entry point and game loop.

mod ui;

use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags};
use crossterm::{execute, terminal};

use lavadash::config::GameConfig;
use lavadash::sim::event::GameEvent;
use lavadash::sim::level::Status;
use lavadash::sim::pack;
use lavadash::sim::parser::LevelParser;
use lavadash::sim::session::{Phase, Session};
use lavadash::sim::step::FrameInput;
use ui::gamepad::GamepadState;
use ui::input::{InputState, PAUSE_KEYS, QUIT_KEYS, RESTART_KEYS};
use ui::renderer::Renderer;
use ui::sound::SoundEngine;

const FRAME_SLEEP: Duration = Duration::from_millis(5);
const KEYS_CONFIRM: &[KeyCode] = &[KeyCode::Enter, KeyCode::Char(' ')];

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = GameConfig::load();
    let levels = pack::load_levels(&config.levels_dir);
    let parser = LevelParser::new(config.registry());
    let mut session = Session::new(levels, parser, &config.speed);

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        log::error!("terminal init failed: {e}");
        return;
    }

    // Release events make held-key movement exact; not every terminal has them.
    let enhanced = terminal::supports_keyboard_enhancement().unwrap_or(false)
        && execute!(
            std::io::stdout(),
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )
        .is_ok();

    let sound = SoundEngine::new();
    let result = game_loop(&mut session, &mut renderer, sound.as_ref(), &config, enhanced);

    if enhanced {
        let _ = execute!(std::io::stdout(), PopKeyboardEnhancementFlags);
    }
    if let Err(e) = renderer.cleanup() {
        log::error!("terminal cleanup failed: {e}");
    }
    if let Err(e) = result {
        log::error!("game error: {e}");
    }

    println!();
    println!("Thanks for playing Lava Dash!");
    println!(
        "Reached level {} of {} with {} deaths.",
        session.current_index() + 1,
        session.total_levels(),
        session.deaths
    );
}

fn game_loop(
    session: &mut Session,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
    enhanced: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    kb.honor_release = enhanced;
    let mut gp = GamepadState::new(&config.gamepad);
    let tick_rate = Duration::from_millis(config.speed.tick_rate_ms);
    let dt = tick_rate.as_secs_f64();
    let mut last_tick = Instant::now();

    loop {
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() || kb.any_pressed(QUIT_KEYS) || gp.cancel_pressed() {
            break;
        }
        handle_meta(session, &kb, &gp);

        if last_tick.elapsed() >= tick_rate {
            let input = FrameInput { movement: kb.movement().or_else(|| gp.movement()) };
            let events = session.step(input, dt);
            process_sound_events(sound, &events);
            last_tick = Instant::now();
        }

        renderer.render(session)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

/// Pause, restart and replay. Edge-triggered, so they act once per press.
fn handle_meta(session: &mut Session, kb: &InputState, gp: &GamepadState) {
    match session.phase {
        Phase::Playing | Phase::Paused => {
            if kb.any_pressed(PAUSE_KEYS) || gp.pause_pressed() {
                session.toggle_pause();
            }
            if kb.any_pressed(RESTART_KEYS) || gp.restart_pressed() {
                session.restart_level();
                session.set_message("Restarted", 25);
            }
        }
        Phase::Complete => {
            if kb.any_pressed(KEYS_CONFIRM) || gp.confirm_pressed() {
                session.restart_game();
            }
        }
    }
}

fn process_sound_events(sound: Option<&SoundEngine>, events: &[GameEvent]) {
    let Some(sfx) = sound else { return };
    for event in events {
        sfx.play_event(event);
    }
    let cleared = events
        .iter()
        .any(|e| matches!(e, GameEvent::LevelFinished { status: Status::Won }));
    if cleared {
        sfx.play_win();
    }
}
