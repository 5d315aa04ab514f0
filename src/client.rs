use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

use crate::command::Command;
use crate::game::Game;
use crate::settings::Settings;

/// Browser-facing handle. The page calls `tick` once per animation frame and
/// draws the returned view; key handlers call `submitCommand`.
#[wasm_bindgen]
pub struct GameClient {
    game: Game,
}

#[wasm_bindgen]
impl GameClient {
    #[wasm_bindgen(constructor)]
    pub fn new(settings: JsValue) -> Result<GameClient, JsValue> {
        let settings: Settings = from_value(settings).unwrap_or_default();
        Ok(Self {
            game: Game::new(settings),
        })
    }

    #[wasm_bindgen(js_name = tick)]
    pub fn tick(&mut self, dt_ms: f64) -> Result<JsValue, JsValue> {
        self.game.step(dt_ms);
        to_value(&self.game.view()).map_err(|e| e.into())
    }

    #[wasm_bindgen(js_name = submitCommand)]
    pub fn submit_command(&mut self, command: &str) -> Result<(), JsValue> {
        let parsed: Command = command
            .parse()
            .map_err(|e: crate::ParseError| JsValue::from_str(&e.to_string()))?;
        self.game.submit_command(parsed);
        Ok(())
    }

    #[wasm_bindgen(js_name = faster)]
    pub fn faster(&mut self) -> u32 {
        self.game.faster();
        self.game.tick_ms()
    }

    #[wasm_bindgen(js_name = slower)]
    pub fn slower(&mut self) -> u32 {
        self.game.slower();
        self.game.tick_ms()
    }

    #[wasm_bindgen(js_name = setTickMs)]
    pub fn set_tick_ms(&mut self, tick_ms: u32) -> u32 {
        self.game.set_tick_ms(tick_ms);
        self.game.tick_ms()
    }

    #[wasm_bindgen(js_name = snapshot)]
    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        to_value(&self.game.view()).map_err(|e| e.into())
    }

    #[wasm_bindgen(js_name = stats)]
    pub fn stats(&self) -> Result<JsValue, JsValue> {
        to_value(&self.game.stats()).map_err(|e| e.into())
    }

    #[wasm_bindgen(js_name = upcoming)]
    pub fn upcoming(&self, depth: usize) -> Result<JsValue, JsValue> {
        to_value(&self.game.upcoming(depth)).map_err(|e| e.into())
    }

    #[wasm_bindgen(js_name = snapshotJson)]
    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.game.view()).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}
