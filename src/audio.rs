//! Audio system using Web Audio API
//!
//! Music and sound effects are synthesized with oscillators; no sample files.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use web_sys::{AudioContext, AudioContextState, GainNode, OscillatorNode, OscillatorType};

use crate::music::{MusicScheduler, ScheduledNote};
use crate::sim::{GameEvent, RoundPhase};

/// Peak gain of a melody note
const NOTE_GAIN: f32 = 0.05;
/// Gain a note decays to (exponential ramps cannot reach 0)
const NOTE_FLOOR: f32 = 0.001;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Something caught, collected or delivered
    Catch,
    /// A life lost
    Miss,
    /// Turn finished
    TurnOver,
}

pub struct AudioManager {
    ctx: Option<AudioContext>,
    music: MusicScheduler,
    rng: Pcg32,
    music_volume: f32,
    muted: bool,
}

impl AudioManager {
    pub fn new(music_volume: f32, muted: bool) -> Self {
        // May fail outside a secure context
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        let seed = (js_sys::Math::random() * u32::MAX as f64) as u64;
        let manager = Self {
            ctx,
            music: MusicScheduler::new(),
            rng: Pcg32::seed_from_u64(seed),
            music_volume: music_volume.clamp(0.0, 1.0),
            muted,
        };
        if muted {
            manager.suspend();
        }
        manager
    }

    /// Resume audio context (required after user gesture)
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            if ctx.state() == AudioContextState::Suspended {
                let _ = ctx.resume();
            }
        }
    }

    fn suspend(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.suspend();
        }
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Flip mute; suspends the whole context so queued notes go quiet too.
    /// Returns the new state.
    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        if self.muted {
            self.suspend();
        } else {
            self.resume();
        }
        log::info!("Audio {}", if self.muted { "muted" } else { "unmuted" });
        self.muted
    }

    fn now(&self) -> f64 {
        self.ctx.as_ref().map(|ctx| ctx.current_time()).unwrap_or(0.0)
    }

    pub fn start_music(&mut self) {
        if !self.muted {
            self.resume();
        }
        let now = self.now();
        self.music.start(now, &mut self.rng);
        self.pump_music();
    }

    pub fn stop_music(&mut self) {
        self.music.stop();
    }

    pub fn set_music_speed(&mut self, speed: f32) {
        self.music.set_speed(speed);
    }

    /// Queue every note due within the lookahead. Call on a short interval.
    pub fn pump_music(&mut self) {
        let Some(ctx) = self.ctx.clone() else { return };
        let notes = self.music.schedule(ctx.current_time());
        if self.muted {
            return;
        }
        for note in notes {
            self.play_note(&ctx, note);
        }
    }

    /// React to simulation events
    pub fn handle_event(&mut self, event: &GameEvent) {
        match event {
            GameEvent::MusicStart => self.start_music(),
            GameEvent::MusicStop => self.stop_music(),
            GameEvent::MusicSpeed(speed) => self.set_music_speed(*speed),
            GameEvent::Scored { .. } => self.play(SoundEffect::Catch),
            GameEvent::LifeLost => self.play(SoundEffect::Miss),
            GameEvent::TurnEnded { .. } => self.play(SoundEffect::TurnOver),
            GameEvent::PhaseChanged {
                to: RoundPhase::Waiting,
                ..
            } => self.stop_music(),
            GameEvent::PhaseChanged { .. } => {}
        }
    }

    /// Play a sound effect
    pub fn play(&self, effect: SoundEffect) {
        if self.muted {
            return;
        }
        let Some(ctx) = &self.ctx else { return };
        let vol = self.music_volume.max(0.2);

        match effect {
            SoundEffect::Catch => self.play_catch(ctx, vol),
            SoundEffect::Miss => self.play_miss(ctx, vol),
            SoundEffect::TurnOver => self.play_turn_over(ctx, vol),
        }
    }

    // === Sound generators ===

    /// Create an oscillator with gain envelope
    fn create_osc(
        &self,
        ctx: &AudioContext,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    /// Chiptune melody note: square wave, decaying over 90% of its length
    fn play_note(&self, ctx: &AudioContext, note: ScheduledNote) {
        let Some((osc, gain)) = self.create_osc(ctx, note.freq, OscillatorType::Square) else {
            return;
        };
        let t = note.start;
        let peak = (NOTE_GAIN * self.music_volume).max(NOTE_FLOOR * 2.0);

        gain.gain().set_value_at_time(peak, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(NOTE_FLOOR, t + note.duration * 0.9)
            .ok();

        osc.start_with_when(t).ok();
        osc.stop_with_when(t + note.duration).ok();
    }

    /// Catch - bright two-note ding
    fn play_catch(&self, ctx: &AudioContext, vol: f32) {
        for (i, freq) in [1046.5, 1568.0].iter().enumerate() {
            let delay = i as f64 * 0.06;
            if let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Sine) {
                let t = ctx.current_time() + delay;
                gain.gain().set_value_at_time(vol * 0.2, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.15)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + 0.2).ok();
            }
        }
    }

    /// Miss - short falling buzz
    fn play_miss(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 220.0, OscillatorType::Sawtooth) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.15, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.25)
            .ok();
        osc.frequency().set_value_at_time(220.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(90.0, t + 0.25)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.3).ok();
    }

    /// Turn over - sleigh-bell arpeggio
    fn play_turn_over(&self, ctx: &AudioContext, vol: f32) {
        for (i, freq) in [784.0, 659.25, 523.25, 1046.5].iter().enumerate() {
            let delay = i as f64 * 0.12;
            if let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Triangle) {
                let t = ctx.current_time() + delay;
                gain.gain().set_value_at_time(vol * 0.25, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.3)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + 0.35).ok();
            }
        }
    }
}
