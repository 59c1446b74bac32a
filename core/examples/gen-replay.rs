//! Generates replay JSON for a scripted race.
//!
//! Usage:
//!   cargo run -p kawaii-kart-core --example gen-replay -- [cruise|weave|idle] > replay.json

use kawaii_kart_core::*;

const FPS: f64 = 60.0;

fn main() {
    let mode = std::env::args().nth(1).unwrap_or_else(|| "cruise".to_string());

    let config = default_config(42);
    // Countdown plus about two minutes of racing
    let total = ((config.countdown_seconds + 120.0) * FPS) as usize;

    let frames: Vec<InputFrame> = match mode.as_str() {
        "cruise" => {
            // Hold the throttle, fire items as soon as they arrive
            (0..total)
                .map(|i| {
                    let mut buttons = button::ACCELERATE;
                    if i % 30 == 0 {
                        buttons |= button::ITEM;
                    }
                    frame(buttons)
                })
                .collect()
        }
        "weave" => {
            // Throttle with slow left/right weaving across the road
            (0..total)
                .map(|i| {
                    let steer = match (i / 90) % 4 {
                        0 => button::LEFT,
                        2 => button::RIGHT,
                        _ => 0,
                    };
                    frame(button::ACCELERATE | steer)
                })
                .collect()
        }
        "idle" => {
            // Human never moves; AI races on its own
            vec![frame(0); total]
        }
        _ => {
            eprintln!("Unknown mode: {}. Use 'cruise', 'weave', or 'idle'", mode);
            std::process::exit(1);
        }
    };

    let input = ReplayInput {
        config,
        character: 0,
        design: CarDesign::default(),
        frames,
    };

    let output = match replay(&input) {
        Ok(output) => output,
        Err(e) => {
            eprintln!("replay failed: {}", e);
            std::process::exit(1);
        }
    };

    eprintln!("=== Replay result ({} mode) ===", mode);
    eprintln!("Frames run: {}/{}", output.frames_run, input.frames.len());
    eprintln!("Phase: {:?}", output.phase);
    eprintln!("Race clock: {:.2}s", output.race_clock);
    eprintln!("Finish order: {:?}", output.finish_order);
    eprintln!("Places: {:?}", output.places);

    println!("{}", serde_json::to_string(&input).unwrap());
}

fn frame(buttons: u8) -> InputFrame {
    InputFrame {
        dt: 1.0 / FPS,
        input: ControlInput::from_buttons(buttons),
    }
}
