//! Engine sound envelope driven by throttle movement.
//!
//! The envelope is plain state: feed it `(dt, throttle)` each tick and play back
//! the returned [`EngineSoundFrame`]. Nothing here touches an audio device.

/// Throttle rate (per second) below which no spool sound plays.
const RATE_DEADZONE: f32 = 0.05;
/// Throttle rate span that takes a spool sound from silent to full.
const RATE_RANGE: f32 = 0.55;
/// How fast every channel chases its target (1/s).
const RESPONSE: f32 = 6.0;
/// Spool strength that fires a one-shot.
const ONE_SHOT_THRESHOLD: f32 = 0.02;

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Output levels for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EngineSoundFrame {
    pub loop_volume: f32,
    pub loop_rate: f32,
    pub start_volume: f32,
    pub end_volume: f32,
    /// Playback rate for the spool-up one-shot, if it should fire.
    pub start_one_shot: Option<f32>,
    /// Playback rate for the spool-down one-shot, if it should fire.
    pub end_one_shot: Option<f32>,
}

/// Smoothed engine channels plus the throttle seen last tick.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSound {
    loop_volume: f32,
    loop_rate: f32,
    start_volume: f32,
    end_volume: f32,
    last_throttle: f32,
    paused: bool,
}

impl Default for EngineSound {
    fn default() -> Self {
        Self {
            loop_volume: 0.0,
            loop_rate: 0.9,
            start_volume: 0.0,
            end_volume: 0.0,
            last_throttle: 0.0,
            paused: false,
        }
    }
}

impl EngineSound {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Freeze the envelope. Returns `true` when the state actually changed.
    pub fn set_paused(&mut self, paused: bool) -> bool {
        if paused == self.paused {
            return false;
        }
        self.paused = paused;
        true
    }

    /// Current levels without advancing.
    pub fn frame(&self) -> EngineSoundFrame {
        EngineSoundFrame {
            loop_volume: self.loop_volume,
            loop_rate: self.loop_rate,
            start_volume: self.start_volume,
            end_volume: self.end_volume,
            start_one_shot: None,
            end_one_shot: None,
        }
    }

    /// Advance by `dt` with the current throttle. While paused the state is
    /// left untouched and the held levels are returned.
    pub fn update(&mut self, dt: f32, throttle: f32) -> EngineSoundFrame {
        if self.paused {
            return self.frame();
        }

        let rate = (throttle - self.last_throttle) / dt.max(0.001);
        let up = ((rate - RATE_DEADZONE) / RATE_RANGE).clamp(0.0, 1.0);
        let down = ((-rate - RATE_DEADZONE) / RATE_RANGE).clamp(0.0, 1.0);
        let steering = up.max(down);

        let target_loop_volume = lerp(0.05, 0.9, throttle) * (1.0 - 0.4 * steering);
        let target_loop_rate = lerp(0.85, 1.45, throttle);
        let target_start_volume = up * lerp(0.12, 0.85, throttle);
        let target_end_volume = down * lerp(0.12, 0.75, 1.0 - throttle);

        let response = 1.0 - (-dt * RESPONSE).exp();
        self.loop_volume += (target_loop_volume - self.loop_volume) * response;
        self.loop_rate += (target_loop_rate - self.loop_rate) * response;
        self.start_volume += (target_start_volume - self.start_volume) * response;
        self.end_volume += (target_end_volume - self.end_volume) * response;
        self.last_throttle = throttle;

        EngineSoundFrame {
            start_one_shot: (up > ONE_SHOT_THRESHOLD).then(|| lerp(0.95, 1.2, throttle)),
            end_one_shot: (down > ONE_SHOT_THRESHOLD).then(|| lerp(0.95, 1.15, 1.0 - throttle)),
            ..self.frame()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn idle_settles_to_low_hum() {
        let mut sound = EngineSound::new();
        let mut frame = sound.frame();
        for _ in 0..600 {
            frame = sound.update(DT, 0.0);
        }
        assert!((frame.loop_volume - 0.05).abs() < 1e-3);
        assert!((frame.loop_rate - 0.85).abs() < 1e-3);
        assert!(frame.start_volume.abs() < 1e-3);
        assert!(frame.start_one_shot.is_none());
        assert!(frame.end_one_shot.is_none());
    }

    #[test]
    fn spooling_up_fires_start_and_ducks_loop() {
        let mut sound = EngineSound::new();
        // 0.6 per second is the flight model's throttle rate.
        let mut throttle = 0.0;
        let mut frame = sound.frame();
        for _ in 0..30 {
            throttle += 0.6 * DT;
            frame = sound.update(DT, throttle);
        }
        let rate = lerp(0.95, 1.2, throttle);
        assert_eq!(frame.start_one_shot, Some(rate));
        assert!(frame.end_one_shot.is_none());
        assert!(frame.start_volume > 0.0);
        assert!(frame.loop_volume < lerp(0.05, 0.9, throttle));
    }

    #[test]
    fn spooling_down_fires_end() {
        let mut sound = EngineSound::new();
        for _ in 0..120 {
            sound.update(DT, 1.0);
        }
        let frame = sound.update(DT, 1.0 - 0.6 * DT);
        assert!(frame.end_one_shot.is_some());
        assert!(frame.start_one_shot.is_none());
        assert!(frame.end_volume > 0.0);
    }

    #[test]
    fn paused_envelope_holds_state() {
        let mut sound = EngineSound::new();
        sound.update(DT, 0.5);
        assert!(sound.set_paused(true));
        assert!(!sound.set_paused(true));
        let before = sound.clone();
        let frame = sound.update(DT, 1.0);
        assert_eq!(sound, before);
        assert_eq!(frame, before.frame());
        assert!(sound.set_paused(false));
    }

    #[test]
    fn zero_dt_does_not_blow_up() {
        let mut sound = EngineSound::new();
        let frame = sound.update(0.0, 0.3);
        assert!(frame.loop_volume.is_finite());
        assert_eq!(frame.loop_volume, 0.0);
        assert!(frame.start_one_shot.is_some());
    }
}
