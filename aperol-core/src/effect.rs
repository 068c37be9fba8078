//! Decorative hue-cycling background, switched on and off by one control.

use serde::Serialize;
use std::{sync::Arc, time::Duration};
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{Instant, interval_at},
};
use tracing::{debug, warn};

pub const INITIAL_BACKGROUND: &str = "#e0f7fa";
pub const HUE_STEP: u16 = 10;
pub const CYCLE_PERIOD: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decoration {
    /// Current hue while cycling; `None` when showing the resting background.
    pub hue: Option<u16>,
    pub background: String,
    pub background_image: String,
}

impl Decoration {
    pub fn initial() -> Self {
        Self {
            hue: None,
            background: INITIAL_BACKGROUND.to_string(),
            background_image: "none".to_string(),
        }
    }

    pub fn for_hue(hue: u16) -> Self {
        let hue = hue % 360;
        Self {
            hue: Some(hue),
            background: format!("hsl({hue}, 100%, 50%)"),
            background_image: format!(
                "radial-gradient(circle, hsl({}, 100%, 50%), hsl({}, 100%, 50%))",
                (hue + 60) % 360,
                (hue + 120) % 360
            ),
        }
    }
}

impl Default for Decoration {
    fn default() -> Self {
        Self::initial()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectState {
    Off,
    On,
}

/// Owns the one cycle task that may be running.
#[derive(Debug)]
pub struct EffectToggle {
    tx: Arc<watch::Sender<Decoration>>,
    cycle: Option<JoinHandle<()>>,
}

impl Default for EffectToggle {
    fn default() -> Self {
        Self::new()
    }
}

impl EffectToggle {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Decoration::initial());
        Self { tx: Arc::new(tx), cycle: None }
    }

    pub fn subscribe(&self) -> watch::Receiver<Decoration> {
        self.tx.subscribe()
    }

    pub fn decoration(&self) -> Decoration {
        self.tx.borrow().clone()
    }

    pub fn state(&self) -> EffectState {
        if self.cycle.is_some() { EffectState::On } else { EffectState::Off }
    }

    /// Text for the control that flips the effect.
    pub fn label(&self) -> &'static str {
        match self.state() {
            EffectState::Off => "Trippy Mode",
            EffectState::On => "Disable Trippy Mode",
        }
    }

    /// Flip the effect. Turning off waits for the running cycle to stop
    /// before restoring the initial decoration.
    pub async fn toggle(&mut self) -> EffectState {
        match self.cycle.take() {
            Some(handle) => {
                handle.abort();
                match handle.await {
                    Err(e) if !e.is_cancelled() => {
                        warn!(error = %e, "ambient effect cycle ended abnormally");
                    }
                    _ => {}
                }
                self.tx.send_replace(Decoration::initial());
                debug!("ambient effect stopped");
                EffectState::Off
            }
            None => {
                self.cycle = Some(self.spawn_cycle());
                debug!("ambient effect started");
                EffectState::On
            }
        }
    }

    fn spawn_cycle(&self) -> JoinHandle<()> {
        let tx = Arc::clone(&self.tx);
        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + CYCLE_PERIOD, CYCLE_PERIOD);
            let mut hue: u16 = 0;
            loop {
                ticker.tick().await;
                hue = (hue + HUE_STEP) % 360;
                tx.send_replace(Decoration::for_hue(hue));
            }
        })
    }
}

impl Drop for EffectToggle {
    fn drop(&mut self) {
        if let Some(handle) = self.cycle.take() {
            handle.abort();
        }
    }
}
