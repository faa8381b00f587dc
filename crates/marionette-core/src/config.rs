//! Playback configuration
//!
//! The animation thresholds shipped as constants in the original client
//! (apply at 12, dwell 30, ceiling 180). They are tuning values, not
//! invariants, so they live in configuration with those defaults. Tests
//! pin the defaults; the driver only ever reads the config it was given.

use serde::{Deserialize, Serialize};

/// Tick thresholds for one action's animation
///
/// Invariants kept by the setters: `result_tick <= min_ticks <=
/// timeout_ticks`.
///
/// # Example
///
/// ```
/// use marionette_core::TimingConfig;
///
/// let timing = TimingConfig::default();
/// assert_eq!(timing.result_tick(), 12);
/// assert_eq!(timing.min_ticks(), 30);
/// assert_eq!(timing.timeout_ticks(), 180);
///
/// // Setters keep the thresholds ordered.
/// let mut timing = TimingConfig::default();
/// timing.set_min_ticks(5);
/// assert_eq!(timing.min_ticks(), timing.result_tick());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Tick at which pending outcomes apply
    result_tick: u32,
    /// Minimum dwell before an action may complete
    min_ticks: u32,
    /// Hard ceiling; force-apply and complete here
    timeout_ticks: u32,
}

impl TimingConfig {
    /// Create a config, reordering values so the invariants hold
    pub fn new(result_tick: u32, min_ticks: u32, timeout_ticks: u32) -> Self {
        let min_ticks = min_ticks.max(result_tick);
        let timeout_ticks = timeout_ticks.max(min_ticks);
        Self {
            result_tick,
            min_ticks,
            timeout_ticks,
        }
    }

    /// Tick at which pending outcomes apply
    pub fn result_tick(&self) -> u32 {
        self.result_tick
    }

    /// Minimum dwell before an action may complete
    pub fn min_ticks(&self) -> u32 {
        self.min_ticks
    }

    /// Hard ceiling for one action
    pub fn timeout_ticks(&self) -> u32 {
        self.timeout_ticks
    }

    /// Set the result tick, pushing the later thresholds up if needed
    pub fn set_result_tick(&mut self, ticks: u32) {
        self.result_tick = ticks;
        self.min_ticks = self.min_ticks.max(ticks);
        self.timeout_ticks = self.timeout_ticks.max(self.min_ticks);
    }

    /// Set the minimum dwell, clamped to `[result_tick, timeout_ticks]`
    pub fn set_min_ticks(&mut self, ticks: u32) {
        self.min_ticks = ticks.clamp(self.result_tick, self.timeout_ticks);
    }

    /// Set the ceiling, clamped to at least `min_ticks`
    pub fn set_timeout_ticks(&mut self, ticks: u32) {
        self.timeout_ticks = ticks.max(self.min_ticks);
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            result_tick: 12,
            min_ticks: 30,
            timeout_ticks: 180,
        }
    }
}

/// Screen slots enemies are placed at
///
/// When a troop has more members than slots, placement cycles back to the
/// first slot.
///
/// # Example
///
/// ```
/// use marionette_core::LayoutConfig;
///
/// let layout = LayoutConfig::default();
/// let first = layout.slot_for(0);
/// assert_eq!(layout.slot_for(layout.len()), first);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutConfig {
    slots: Vec<(i32, i32)>,
}

impl LayoutConfig {
    /// Create a layout from explicit slots; empty input keeps the defaults
    pub fn new(slots: Vec<(i32, i32)>) -> Self {
        if slots.is_empty() {
            Self::default()
        } else {
            Self { slots }
        }
    }

    /// Number of distinct slots
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True when no slots are configured; never true after `new`
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Slot for the troop member at `index`, cycling past the end
    pub fn slot_for(&self, index: usize) -> (i32, i32) {
        match self.slots.get(index % self.slots.len().max(1)) {
            Some(slot) => *slot,
            None => (0, 0),
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            slots: vec![
                (208, 312),
                (288, 348),
                (368, 312),
                (448, 348),
                (176, 420),
                (256, 456),
                (336, 420),
                (416, 456),
            ],
        }
    }
}

/// Top-level configuration for the synchronization layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
    /// Grant battle_end rewards locally
    ///
    /// Deployments whose server pushes authoritative inventory updates
    /// set this to false and treat the reward payload as display data.
    #[serde(default = "default_grant")]
    pub grant_local_rewards: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            timing: TimingConfig::default(),
            layout: LayoutConfig::default(),
            grant_local_rewards: true,
        }
    }
}

fn default_grant() -> bool {
    true
}
