//! Procedural Christmas music
//!
//! A lookahead scheduler: the shell calls [`MusicScheduler::schedule`] every
//! few tens of milliseconds with the audio clock, and gets back every note
//! that must start within the lookahead window. Playback lives in `audio`.

use rand::seq::IndexedRandom;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

/// Beats per minute at speed 1
pub const BASE_TEMPO: f32 = 180.0;
/// How far ahead of the audio clock notes are queued (seconds)
pub const LOOKAHEAD: f64 = 0.1;
/// How often the shell should call `schedule` (ms)
pub const SCHEDULE_INTERVAL_MS: i32 = 25;
/// Falling further behind than this resyncs instead of bursting notes
const MAX_LAG: f64 = 1.0;

// Note frequencies (Hz)
const B4: f32 = 493.88;
const C5: f32 = 523.25;
const D5: f32 = 587.33;
const E5: f32 = 659.25;
const F5: f32 = 698.46;
const G5: f32 = 784.99;
const A5: f32 = 880.00;
const B5: f32 = 987.77;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Note {
    pub freq: f32,
    pub beats: f32,
}

const fn n(freq: f32, beats: f32) -> Note {
    Note { freq, beats }
}

const JINGLE_BELLS: [Note; 26] = [
    n(E5, 1.0), n(E5, 1.0), n(E5, 2.0),
    n(E5, 1.0), n(E5, 1.0), n(E5, 2.0),
    n(E5, 1.0), n(G5, 1.0), n(C5, 1.5), n(D5, 0.5), n(E5, 4.0),
    n(F5, 1.0), n(F5, 1.0), n(F5, 1.5), n(F5, 0.5),
    n(F5, 1.0), n(E5, 1.0), n(E5, 1.0), n(E5, 0.5), n(E5, 0.5),
    n(E5, 1.0), n(D5, 1.0), n(D5, 1.0), n(E5, 1.0), n(D5, 2.0), n(G5, 2.0),
];

const WE_WISH_YOU: [Note; 30] = [
    n(C5, 1.0),
    n(F5, 1.0), n(F5, 0.5), n(G5, 0.5), n(F5, 0.5), n(E5, 0.5),
    n(D5, 1.0), n(D5, 1.0), n(D5, 1.0),
    n(G5, 1.0), n(G5, 0.5), n(A5, 0.5), n(G5, 0.5), n(F5, 0.5),
    n(E5, 1.0), n(C5, 1.0), n(C5, 1.0),
    n(A5, 1.0), n(A5, 0.5), n(B5, 0.5), n(A5, 0.5), n(G5, 0.5),
    n(F5, 1.0), n(D5, 1.0), n(C5, 0.5), n(C5, 0.5),
    n(D5, 1.0), n(G5, 1.0), n(E5, 1.0),
    n(F5, 2.0),
];

const DECK_THE_HALLS: [Note; 18] = [
    n(G5, 1.5), n(F5, 0.5), n(E5, 1.0), n(D5, 1.0),
    n(C5, 1.0), n(D5, 1.0), n(E5, 1.0), n(C5, 1.0),
    n(D5, 0.5), n(E5, 0.5), n(F5, 0.5), n(D5, 0.5), n(E5, 1.0), n(C5, 1.0),
    n(D5, 0.5), n(C5, 0.5), n(B4, 1.0), n(C5, 2.0),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Melody {
    JingleBells,
    WeWishYou,
    DeckTheHalls,
}

impl Melody {
    pub const ALL: [Melody; 3] = [Melody::JingleBells, Melody::WeWishYou, Melody::DeckTheHalls];

    pub fn notes(&self) -> &'static [Note] {
        match self {
            Melody::JingleBells => &JINGLE_BELLS,
            Melody::WeWishYou => &WE_WISH_YOU,
            Melody::DeckTheHalls => &DECK_THE_HALLS,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Melody::JingleBells => "Jingle Bells",
            Melody::WeWishYou => "We Wish You a Merry Christmas",
            Melody::DeckTheHalls => "Deck the Halls",
        }
    }
}

/// A note ready for the synthesizer, on the audio clock
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledNote {
    pub freq: f32,
    pub start: f64,
    pub duration: f64,
}

#[derive(Debug, Clone)]
pub struct MusicScheduler {
    playing: bool,
    melody: Melody,
    note_index: usize,
    next_note_time: f64,
    tempo: f32,
    speed: f32,
}

impl Default for MusicScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl MusicScheduler {
    pub fn new() -> Self {
        Self {
            playing: false,
            melody: Melody::JingleBells,
            note_index: 0,
            next_note_time: 0.0,
            tempo: BASE_TEMPO,
            speed: 1.0,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn melody(&self) -> Melody {
        self.melody
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Restart with a random melody from the top
    pub fn start(&mut self, now: f64, rng: &mut Pcg32) {
        let melody = Melody::ALL.choose(rng).copied().unwrap_or(Melody::JingleBells);
        self.start_melody(now, melody);
    }

    pub fn start_melody(&mut self, now: f64, melody: Melody) {
        self.playing = true;
        self.melody = melody;
        self.note_index = 0;
        self.next_note_time = now;
        self.tempo = BASE_TEMPO;
        self.speed = 1.0;
        log::debug!("Music: {}", melody.title());
    }

    /// Tempo multiplier; ignored unless positive and finite
    pub fn set_speed(&mut self, speed: f32) {
        if speed.is_finite() && speed > 0.0 {
            self.speed = speed;
        }
    }

    pub fn stop(&mut self) {
        self.playing = false;
    }

    /// Seconds per beat at the current speed
    pub fn seconds_per_beat(&self) -> f64 {
        60.0 / (self.tempo * self.speed) as f64
    }

    /// Every note starting before `now + LOOKAHEAD`, looping the melody
    pub fn schedule(&mut self, now: f64) -> Vec<ScheduledNote> {
        let mut out = Vec::new();
        if !self.playing {
            return out;
        }

        if self.next_note_time < now - MAX_LAG {
            log::debug!("Music fell behind by {:.2}s, resyncing", now - self.next_note_time);
            self.next_note_time = now;
        }

        let notes = self.melody.notes();
        while self.next_note_time < now + LOOKAHEAD {
            let note = notes[self.note_index % notes.len()];
            let duration = note.beats as f64 * self.seconds_per_beat();
            out.push(ScheduledNote {
                freq: note.freq,
                start: self.next_note_time,
                duration,
            });
            self.next_note_time += duration;
            self.note_index = (self.note_index + 1) % notes.len();
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_stopped_schedules_nothing() {
        let mut music = MusicScheduler::new();
        assert!(music.schedule(10.0).is_empty());
        music.start_melody(0.0, Melody::JingleBells);
        music.stop();
        assert!(music.schedule(0.0).is_empty());
    }

    #[test]
    fn test_lookahead_window() {
        let mut music = MusicScheduler::new();
        music.start_melody(0.0, Melody::JingleBells);
        // One beat at 180 BPM is 1/3 s, so only the first note fits
        let first = music.schedule(0.0);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].freq, E5);
        assert_eq!(first[0].start, 0.0);
        assert!((first[0].duration - 1.0 / 3.0).abs() < 1e-9);

        assert!(music.schedule(0.1).is_empty());
        let second = music.schedule(0.25);
        assert_eq!(second.len(), 1);
        assert!((second[0].start - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_speed_shortens_notes() {
        let mut music = MusicScheduler::new();
        music.start_melody(0.0, Melody::DeckTheHalls);
        music.set_speed(2.0);
        let notes = music.schedule(0.0);
        // 1.5 beats at 360 BPM
        assert!((notes[0].duration - 0.25).abs() < 1e-9);

        music.set_speed(f32::NAN);
        music.set_speed(-1.0);
        assert_eq!(music.speed(), 2.0);
    }

    #[test]
    fn test_melody_loops() {
        let mut music = MusicScheduler::new();
        music.start_melody(0.0, Melody::DeckTheHalls);
        let total_beats: f32 = DECK_THE_HALLS.iter().map(|n| n.beats).sum();
        let loop_len = total_beats as f64 / 3.0;
        let mut all = Vec::new();
        let mut t = 0.0;
        while t < loop_len + 0.5 {
            all.extend(music.schedule(t));
            t += 0.025;
        }
        let restart = &all[DECK_THE_HALLS.len()];
        assert_eq!(restart.freq, G5);
        assert!((restart.start - loop_len).abs() < 1e-6);
    }

    #[test]
    fn test_resync_after_stall() {
        let mut music = MusicScheduler::new();
        music.start_melody(0.0, Melody::WeWishYou);
        music.schedule(0.0);
        let notes = music.schedule(30.0);
        assert!(notes.len() <= 2);
        assert!(notes[0].start >= 30.0);
    }

    #[test]
    fn test_start_resets_speed_and_picks_a_melody() {
        let mut rng = Pcg32::seed_from_u64(8);
        let mut music = MusicScheduler::new();
        music.set_speed(3.0);
        music.start(5.0, &mut rng);
        assert!(music.is_playing());
        assert_eq!(music.speed(), 1.0);
        assert!(Melody::ALL.contains(&music.melody()));
        assert_eq!(music.schedule(5.0)[0].start, 5.0);
    }
}
