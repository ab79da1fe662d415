//! Engine audio for Island Flight: a throttle-driven envelope and a Kira player for it.

pub mod engine_sound;

pub use engine_sound::*;

use anyhow::{Context, Result};
use kira::{
    manager::{backend::DefaultBackend, AudioManager, AudioManagerSettings},
    sound::static_sound::{StaticSoundData, StaticSoundHandle, StaticSoundSettings},
    sound::PlaybackState,
    tween::Tween,
};
use std::path::Path;

/// File names expected in the engine sound directory.
pub const LOOP_FILE: &str = "loop.wav";
pub const START_FILE: &str = "start.wav";
pub const END_FILE: &str = "end.wav";

/// Plays the engine loop plus spool-up/spool-down one-shots from an [`EngineSoundFrame`].
pub struct EngineAudio {
    manager: AudioManager,
    loop_handle: StaticSoundHandle,
    start_data: StaticSoundData,
    end_data: StaticSoundData,
    start_handle: Option<StaticSoundHandle>,
    end_handle: Option<StaticSoundHandle>,
    paused: bool,
}

impl EngineAudio {
    /// Open the default output device, load the three clips from `dir` and start
    /// the (silent) loop.
    pub fn new(dir: &Path) -> Result<Self> {
        let mut manager = AudioManager::<DefaultBackend>::new(AudioManagerSettings::default())
            .context("failed to open audio output")?;

        let load = |name: &str| {
            let path = dir.join(name);
            StaticSoundData::from_file(&path)
                .with_context(|| format!("failed to load {}", path.display()))
        };
        let loop_data = load(LOOP_FILE)?;
        let start_data = load(START_FILE)?;
        let end_data = load(END_FILE)?;

        let settings = StaticSoundSettings::new().loop_region(..).volume(0.0);
        let loop_handle = manager
            .play(loop_data.with_settings(settings))
            .context("failed to start engine loop")?;
        log::info!("Engine audio loaded from {}", dir.display());

        Ok(Self {
            manager,
            loop_handle,
            start_data,
            end_data,
            start_handle: None,
            end_handle: None,
            paused: false,
        })
    }

    /// Push one frame of levels to the mixer, firing one-shots that are not already playing.
    pub fn apply(&mut self, frame: &EngineSoundFrame) -> Result<()> {
        if self.paused {
            return Ok(());
        }
        self.loop_handle
            .set_volume(f64::from(frame.loop_volume), Tween::default());
        self.loop_handle
            .set_playback_rate(f64::from(frame.loop_rate), Tween::default());

        if let Some(rate) = frame.start_one_shot {
            play_one_shot(&mut self.manager, &self.start_data, &mut self.start_handle, rate)?;
        }
        if let Some(rate) = frame.end_one_shot {
            play_one_shot(&mut self.manager, &self.end_data, &mut self.end_handle, rate)?;
        }
        set_one_shot_volume(&mut self.start_handle, frame.start_volume);
        set_one_shot_volume(&mut self.end_handle, frame.end_volume);
        Ok(())
    }

    /// Pause or resume every engine channel.
    pub fn set_paused(&mut self, paused: bool) {
        if paused == self.paused {
            return;
        }
        self.paused = paused;
        let handles = std::iter::once(&mut self.loop_handle)
            .chain(self.start_handle.as_mut())
            .chain(self.end_handle.as_mut());
        for handle in handles {
            if paused {
                handle.pause(Tween::default());
            } else {
                handle.resume(Tween::default());
            }
        }
    }

    /// Set master volume (0.0 to 1.0).
    pub fn set_master_volume(&mut self, volume: f64) {
        self.manager.main_track().set_volume(volume, Tween::default());
    }
}

fn is_playing(handle: &Option<StaticSoundHandle>) -> bool {
    handle
        .as_ref()
        .is_some_and(|h| h.state() != PlaybackState::Stopped)
}

fn play_one_shot(
    manager: &mut AudioManager,
    data: &StaticSoundData,
    slot: &mut Option<StaticSoundHandle>,
    rate: f32,
) -> Result<()> {
    if is_playing(slot) {
        return Ok(());
    }
    let settings = StaticSoundSettings::new().playback_rate(f64::from(rate));
    let handle = manager
        .play(data.clone().with_settings(settings))
        .context("failed to play engine one-shot")?;
    *slot = Some(handle);
    Ok(())
}

fn set_one_shot_volume(slot: &mut Option<StaticSoundHandle>, volume: f32) {
    if let Some(handle) = slot.as_mut() {
        handle.set_volume(f64::from(volume), Tween::default());
    }
}
