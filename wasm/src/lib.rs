use kawaii_kart_core::{
    default_config, project_racers, project_road, start_race, Animal, Camera, CarDesign,
    ControlInput, ItemKind, Phase, RaceConfig, RaceSession, RacerSprite, RacerStatus,
    RoadSlice, DEFAULT_VIEWPORT, ROSTER,
};
use log::{Level, LevelFilter, Log, Metadata, Record};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Forwards `log` records to the browser console.
struct ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let msg = JsValue::from_str(&format!("[{}] {}", record.target(), record.args()));
        match record.level() {
            Level::Error => web_sys::console::error_1(&msg),
            Level::Warn => web_sys::console::warn_1(&msg),
            Level::Info => web_sys::console::info_1(&msg),
            Level::Debug | Level::Trace => web_sys::console::debug_1(&msg),
        }
    }

    fn flush(&self) {}
}

static LOGGER: ConsoleLogger = ConsoleLogger;

/// Install panic hook and console logger so panics and race events show in
/// the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Info);
    }
}

/// Raise or lower console verbosity: 0 off .. 5 trace.
#[wasm_bindgen]
pub fn set_log_level(level: u8) {
    let filter = match level {
        0 => LevelFilter::Off,
        1 => LevelFilter::Error,
        2 => LevelFilter::Warn,
        3 => LevelFilter::Info,
        4 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    log::set_max_level(filter);
}

/// Per-racer view for rendering and HUD.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsRacer {
    id: usize,
    character: usize,
    name: &'static str,
    is_human: bool,
    track_position: f64,
    lateral_offset: f64,
    speed: f64,
    max_speed: f64,
    lap: i32,
    place: usize,
    held_item: Option<ItemKind>,
    finished: bool,
    finish_time: Option<f64>,
    status: RacerStatus,
    design: CarDesign,
}

/// Session snapshot for JS.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsState {
    frame: u64,
    phase: Phase,
    race_clock: f64,
    countdown_remaining: f64,
    lap_goal: i32,
    track_length: f64,
    human: usize,
    racers: Vec<JsRacer>,
    finish_order: Vec<usize>,
}

/// Pixel-space frame for the canvas: road slices and sprites, back to front.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsView {
    road: Vec<RoadSlice>,
    sprites: Vec<RacerSprite>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsSegment {
    index: usize,
    curvature: f64,
    height_offset: f64,
    has_item_box: bool,
}

fn state_to_js(s: &RaceSession) -> JsState {
    JsState {
        frame: s.frame,
        phase: s.phase,
        race_clock: s.race_clock,
        countdown_remaining: s.countdown_remaining,
        lap_goal: s.config.lap_goal,
        track_length: s.track_length(),
        human: s.human,
        racers: s
            .racers
            .iter()
            .map(|r| JsRacer {
                id: r.id,
                character: r.character,
                name: r.profile().name,
                is_human: r.is_human(),
                track_position: r.track_position,
                lateral_offset: r.lateral_offset,
                speed: r.speed,
                max_speed: r.max_speed,
                lap: r.lap,
                place: r.place,
                held_item: r.held_item,
                finished: r.finished,
                finish_time: r.finish_time,
                status: r.status(),
                design: r.design.clone(),
            })
            .collect(),
        finish_order: s.finish_order.clone(),
    }
}

fn parse_config(seed: u32, config_json: Option<String>) -> RaceConfig {
    // Malformed or missing config falls back to the reference circuit
    let mut config = config_json
        .and_then(|json| serde_json::from_str::<RaceConfig>(&json).ok())
        .unwrap_or_else(|| default_config(seed));
    config.seed = seed;
    config
}

/// Parse a saved session and make sure it is safe to step.
fn parse_snapshot(json: &str) -> Result<RaceSession, String> {
    let session: RaceSession = serde_json::from_str(json).map_err(|e| e.to_string())?;
    session.check().map_err(|e| e.to_string())?;
    Ok(session)
}

/// Character roster as JS objects `{ name, animal, tagline, color, ... }`.
#[wasm_bindgen]
pub fn roster() -> Result<JsValue, JsValue> {
    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct JsCharacter {
        name: &'static str,
        animal: Animal,
        tagline: &'static str,
        color: &'static str,
        dark_color: &'static str,
        speed: f64,
        accel: f64,
        handling: f64,
        weakness: ItemKind,
    }
    let list: Vec<JsCharacter> = ROSTER
        .iter()
        .map(|c| JsCharacter {
            name: c.name,
            animal: c.animal,
            tagline: c.tagline,
            color: c.color,
            dark_color: c.dark_color,
            speed: c.speed,
            accel: c.accel,
            handling: c.handling,
            weakness: c.weakness,
        })
        .collect();
    Ok(serde_wasm_bindgen::to_value(&list)?)
}

#[wasm_bindgen]
pub struct WasmRace {
    inner: RaceSession,
}

#[wasm_bindgen]
impl WasmRace {
    /// Start a race for roster index `character`.
    /// `design_json` is a `CarDesign` (missing fields take defaults);
    /// `config_json` is an optional `RaceConfig`.
    #[wasm_bindgen(constructor)]
    pub fn new(
        seed: u32,
        character: usize,
        design_json: &str,
        config_json: Option<String>,
    ) -> Result<WasmRace, JsError> {
        let design: CarDesign = serde_json::from_str(design_json).unwrap_or_default();
        let config = parse_config(seed, config_json);
        let inner = start_race(&config, character, design)?;
        Ok(WasmRace { inner })
    }

    /// Advance one rendered frame. `buttons` uses the core button bitmask.
    pub fn advance(&mut self, dt: f64, buttons: u8) {
        self.inner.advance(dt, &ControlInput::from_buttons(buttons));
    }

    /// Start over with the same character and kart on a fresh seed.
    pub fn restart(&mut self) -> Result<(), JsError> {
        self.inner.restart()?;
        Ok(())
    }

    /// Export the session snapshot as a JS object.
    pub fn export_state(&self) -> Result<JsValue, JsValue> {
        Ok(serde_wasm_bindgen::to_value(&state_to_js(&self.inner))?)
    }

    /// Full session (including RNG state) as JSON, for save/restore.
    pub fn snapshot(&self) -> Result<String, JsError> {
        Ok(serde_json::to_string(&self.inner)?)
    }

    /// Restore a session saved with `snapshot`. Rejects snapshots that
    /// do not describe a playable race.
    pub fn restore(json: &str) -> Result<WasmRace, JsError> {
        let inner = parse_snapshot(json).map_err(|e| JsError::new(&e))?;
        Ok(WasmRace { inner })
    }

    /// Restore from a snapshot that JS already parsed into an object.
    pub fn import_state(state: JsValue) -> Result<WasmRace, JsError> {
        let json = js_sys::JSON::stringify(&state)
            .map_err(|_| JsError::new("state is not JSON-serializable"))?;
        WasmRace::restore(&String::from(json))
    }

    /// Clone the session (for what-if previews).
    pub fn clone_state(&self) -> WasmRace {
        WasmRace {
            inner: self.inner.clone(),
        }
    }

    /// Road and racer sprites as seen from behind the human racer.
    pub fn view(&self) -> Result<JsValue, JsValue> {
        let s = &self.inner;
        let camera = Camera::chase(s.human_racer(), &s.track);
        let view = JsView {
            road: project_road(&DEFAULT_VIEWPORT, &s.track, &camera),
            sprites: project_racers(&DEFAULT_VIEWPORT, &s.track, &s.racers, &camera),
        };
        Ok(serde_wasm_bindgen::to_value(&view)?)
    }

    /// Segment `index` (wrapped onto the loop).
    pub fn segment_at(&self, index: i32) -> Result<JsValue, JsValue> {
        let seg = self.inner.track.segment_at(index as i64);
        let js = JsSegment {
            index: seg.index,
            curvature: seg.curvature,
            height_offset: seg.height_offset,
            has_item_box: seg.has_item_box,
        };
        Ok(serde_wasm_bindgen::to_value(&js)?)
    }

    /// Most recent human item outcome, cleared on read.
    pub fn take_item_outcome(&mut self) -> Result<JsValue, JsValue> {
        match self.inner.last_item_outcome.take() {
            Some(outcome) => Ok(serde_wasm_bindgen::to_value(&outcome)?),
            None => Ok(JsValue::NULL),
        }
    }

    // Quick accessors
    pub fn frame(&self) -> u32 {
        self.inner.frame as u32
    }

    pub fn phase(&self) -> String {
        format!("{:?}", self.inner.phase).to_lowercase()
    }

    pub fn race_clock(&self) -> f64 {
        self.inner.race_clock
    }

    pub fn countdown_remaining(&self) -> f64 {
        self.inner.countdown_remaining
    }

    pub fn is_over(&self) -> bool {
        self.inner.is_over()
    }

    pub fn human_place(&self) -> usize {
        self.inner.human_racer().place
    }

    pub fn human_lap(&self) -> i32 {
        self.inner.human_racer().lap
    }

    pub fn total_segments(&self) -> usize {
        self.inner.track.total_segments()
    }

    pub fn segment_length(&self) -> f64 {
        self.inner.track.segment_length
    }

    pub fn road_width(&self) -> f64 {
        self.inner.track.road_width
    }

    pub fn rng_state(&self) -> u32 {
        self.inner.rng.state
    }
}
