use serde::{Deserialize, Serialize};

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Gravity interval at game start.
    pub tick_ms: u32,
    pub min_tick_ms: u32,
    pub max_tick_ms: u32,
    /// Amount `faster`/`slower` move the interval by.
    pub tick_step_ms: u32,
    pub ghost_enabled: bool,
    /// Fixed bag seed; `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tick_ms: 750,
            min_tick_ms: 150,
            max_tick_ms: 1200,
            tick_step_ms: 100,
            ghost_enabled: true,
            seed: None,
        }
    }
}

impl Settings {
    pub fn clamp_tick(&self, tick_ms: u32) -> u32 {
        let lo = self.min_tick_ms.max(1);
        let hi = self.max_tick_ms.max(lo);
        tick_ms.clamp(lo, hi)
    }
}
