//! Round flow: identities, turns, rounds and the active theme
//!
//! A game is `max_rounds` rounds. Each round draws one theme from the deck and
//! every player takes one timed turn on it. Phase changes only happen through
//! [`Session::transition`], which rejects anything outside the fixed sequence:
//!
//! ```text
//! Waiting -> IdentityReveal -> Countdown -> Playing -> RoundOver
//! RoundOver -> Countdown (next player) | Leaderboard (round done)
//! Leaderboard -> Countdown (next round) | GameOver
//! GameOver -> Waiting
//! ```

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::deck::ThemeDeck;
use super::identity::{Player, generate_elf};
use super::landmarks::{FrameInput, HAND_CONNECTIONS, Hand};
use super::theme::{Theme, ThemeKind, ThemeStats};
use crate::consts::{MAX_PLAYERS, MIN_PLAYERS};
use crate::difficulty_for_elapsed;
use crate::error::GameError;
use crate::renderer::{Color, DisplayList};
use crate::settings::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoundPhase {
    /// Start screen
    Waiting,
    /// Showing each player their elf
    IdentityReveal,
    /// Counting down before a turn
    Countdown,
    /// A turn is running
    Playing,
    /// A turn just ended; shows that player's score
    RoundOver,
    /// Every player had their turn this round
    Leaderboard,
    /// All rounds played
    GameOver,
}

impl RoundPhase {
    /// Whether `self -> next` is part of the fixed sequence
    pub fn can_transition_to(self, next: RoundPhase) -> bool {
        use RoundPhase::*;
        matches!(
            (self, next),
            (Waiting, IdentityReveal)
                | (IdentityReveal, Countdown)
                | (Countdown, Playing)
                | (Playing, RoundOver)
                | (RoundOver, Countdown)
                | (RoundOver, Leaderboard)
                | (Leaderboard, Countdown)
                | (Leaderboard, GameOver)
                | (GameOver, Waiting)
        )
    }
}

/// Why a turn ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnEndReason {
    TimeUp,
    LivesLost,
}

/// Things the shell reacts to (screens, music, sound effects)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    PhaseChanged { from: RoundPhase, to: RoundPhase },
    MusicStart,
    MusicStop,
    /// Tempo multiplier for the running melody
    MusicSpeed(f32),
    Scored { points: u32 },
    LifeLost,
    TurnEnded { reason: TurnEndReason, score: u32 },
}

/// What the start screen collected
#[derive(Debug, Clone, PartialEq)]
pub struct GameSetup {
    pub player_count: u32,
    pub themes: Vec<ThemeKind>,
}

/// Result of the most recent turn, for the round-end screen
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurnSummary {
    pub player: usize,
    pub score: u32,
    pub reason: TurnEndReason,
}

pub struct Session {
    phase: RoundPhase,
    width: f32,
    height: f32,
    round_seconds: f32,
    countdown_seconds: f32,
    max_rounds: u32,
    rng: Pcg32,

    players: Vec<Player>,
    /// Player being revealed or playing
    current_player: usize,
    /// 1-based
    round: u32,
    deck: ThemeDeck,
    round_theme: Option<ThemeKind>,
    active: Option<Box<dyn Theme>>,

    countdown_timer: f32,
    round_timer: f32,
    last_turn: Option<TurnSummary>,
    /// Hands from the latest playing frame, drawn as feedback
    last_hands: Vec<Hand>,
}

impl Session {
    pub fn new(settings: &Settings, width: f32, height: f32, seed: u64) -> Self {
        Self {
            phase: RoundPhase::Waiting,
            width,
            height,
            round_seconds: settings.round_seconds.max(1.0),
            countdown_seconds: settings.countdown_seconds.max(0.0),
            max_rounds: settings.max_rounds.max(1),
            rng: Pcg32::seed_from_u64(seed),
            players: Vec::new(),
            current_player: 0,
            round: 1,
            deck: ThemeDeck::default(),
            round_theme: None,
            active: None,
            countdown_timer: 0.0,
            round_timer: 0.0,
            last_turn: None,
            last_hands: Vec::new(),
        }
    }

    // === Accessors ===

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn current_player(&self) -> Option<&Player> {
        self.players.get(self.current_player)
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn max_rounds(&self) -> u32 {
        self.max_rounds
    }

    /// Theme drawn for the current round
    pub fn round_theme(&self) -> Option<ThemeKind> {
        self.round_theme
    }

    /// Score and lives of the running turn
    pub fn theme_stats(&self) -> Option<ThemeStats> {
        self.active.as_ref().map(|theme| theme.stats())
    }

    pub fn last_turn(&self) -> Option<TurnSummary> {
        self.last_turn
    }

    pub fn countdown_remaining(&self) -> f32 {
        self.countdown_timer
    }

    pub fn time_remaining(&self) -> f32 {
        self.round_timer
    }

    /// Whole seconds left on the countdown, never negative
    pub fn countdown_display(&self) -> u32 {
        self.countdown_timer.max(0.0).ceil() as u32
    }

    /// Whole seconds left in the turn, never negative
    pub fn time_display(&self) -> u32 {
        self.round_timer.max(0.0).ceil() as u32
    }

    /// Canvas resized; applies from the next theme instance on
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    // === Flow ===

    /// The only place the phase changes
    fn transition(
        &mut self,
        action: &'static str,
        to: RoundPhase,
        events: &mut Vec<GameEvent>,
    ) -> Result<(), GameError> {
        let from = self.phase;
        if !from.can_transition_to(to) {
            log::warn!("Rejected {:?} -> {:?} ({})", from, to, action);
            return Err(GameError::InvalidAction {
                action,
                phase: from,
            });
        }
        self.phase = to;
        log::info!("Phase {:?} -> {:?}", from, to);
        events.push(GameEvent::PhaseChanged { from, to });
        Ok(())
    }

    /// Validate the setup, hand out elf identities and start revealing them
    pub fn init_game(&mut self, setup: GameSetup) -> Result<Vec<GameEvent>, GameError> {
        if self.phase != RoundPhase::Waiting {
            return Err(self.reject("start a game"));
        }
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&setup.player_count) {
            return Err(GameError::InvalidPlayerCount(setup.player_count));
        }
        let mut themes = setup.themes;
        themes.dedup();
        if themes.is_empty() {
            return Err(GameError::NoThemesSelected);
        }

        let mut events = Vec::new();
        self.transition("start a game", RoundPhase::IdentityReveal, &mut events)?;

        self.players = (0..setup.player_count as usize)
            .map(|id| generate_elf(id, &mut self.rng))
            .collect();
        self.current_player = 0;
        self.round = 1;
        self.round_theme = None;
        self.active = None;
        self.last_turn = None;
        self.deck = ThemeDeck::new(themes);
        self.deck.refill(&mut self.rng);

        log::info!(
            "New game: {} players, {} themes, {} rounds",
            self.players.len(),
            self.deck.selected().len(),
            self.max_rounds
        );
        Ok(events)
    }

    /// Reveal the next elf, or start round one after the last
    pub fn next_identity_or_start(&mut self) -> Result<Vec<GameEvent>, GameError> {
        let mut events = Vec::new();
        if self.phase != RoundPhase::IdentityReveal {
            return Err(self.reject("reveal the next elf"));
        }

        if self.current_player + 1 < self.players.len() {
            self.current_player += 1;
            return Ok(events);
        }

        self.transition("start the first round", RoundPhase::Countdown, &mut events)?;
        self.current_player = 0;
        self.pick_round_theme();
        self.prepare_turn(&mut events);
        Ok(events)
    }

    /// Advance timers and the active theme by `dt` seconds
    pub fn tick(&mut self, dt: f32, input: &FrameInput) -> Vec<GameEvent> {
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };
        let mut events = Vec::new();

        match self.phase {
            RoundPhase::Countdown => {
                self.countdown_timer -= dt;
                if self.countdown_timer <= 0.0 {
                    self.countdown_timer = 0.0;
                    if self
                        .transition("start playing", RoundPhase::Playing, &mut events)
                        .is_ok()
                    {
                        self.round_timer = self.round_seconds;
                    }
                }
            }
            RoundPhase::Playing => self.tick_playing(dt, input, &mut events),
            _ => {}
        }

        events
    }

    fn tick_playing(&mut self, dt: f32, input: &FrameInput, events: &mut Vec<GameEvent>) {
        self.last_hands.clone_from(&input.hands);

        self.round_timer -= dt;
        if self.round_timer <= 0.0 {
            self.round_timer = 0.0;
            self.finish_turn(TurnEndReason::TimeUp, events);
            return;
        }

        let difficulty = difficulty_for_elapsed(self.round_seconds - self.round_timer);
        events.push(GameEvent::MusicSpeed(difficulty));

        let Some(theme) = self.active.as_mut() else {
            return;
        };
        let before = theme.stats();
        theme.update(dt, input, difficulty, &mut self.rng);
        let after = theme.stats();

        if after.score > before.score {
            events.push(GameEvent::Scored {
                points: after.score - before.score,
            });
        }
        for _ in after.lives..before.lives {
            events.push(GameEvent::LifeLost);
        }

        if after.is_out() {
            self.finish_turn(TurnEndReason::LivesLost, events);
        }
    }

    /// End the running turn and bank its score
    pub fn end_turn(&mut self, reason: TurnEndReason) -> Result<Vec<GameEvent>, GameError> {
        if self.phase != RoundPhase::Playing {
            return Err(self.reject("end the turn"));
        }
        let mut events = Vec::new();
        self.finish_turn(reason, &mut events);
        Ok(events)
    }

    fn finish_turn(&mut self, reason: TurnEndReason, events: &mut Vec<GameEvent>) {
        if self.transition("end the turn", RoundPhase::RoundOver, events).is_err() {
            return;
        }

        let score = self.theme_stats().map(|s| s.score).unwrap_or(0);
        if let Some(player) = self.players.get_mut(self.current_player) {
            player.total_score = player.total_score.saturating_add(score);
            log::info!(
                "{} scored {} ({:?}), total {}",
                player.name,
                score,
                reason,
                player.total_score
            );
        }
        self.last_turn = Some(TurnSummary {
            player: self.current_player,
            score,
            reason,
        });
        self.last_hands.clear();

        events.push(GameEvent::MusicStop);
        events.push(GameEvent::TurnEnded { reason, score });
    }

    /// Next player's turn on the same theme, or the leaderboard after the last
    pub fn next_turn(&mut self) -> Result<Vec<GameEvent>, GameError> {
        if self.phase != RoundPhase::RoundOver {
            return Err(self.reject("start the next turn"));
        }
        let mut events = Vec::new();
        if self.current_player + 1 < self.players.len() {
            self.transition("start the next turn", RoundPhase::Countdown, &mut events)?;
            self.current_player += 1;
            self.prepare_turn(&mut events);
        } else {
            self.transition("show the leaderboard", RoundPhase::Leaderboard, &mut events)?;
            self.active = None;
        }
        Ok(events)
    }

    /// Next round with a freshly drawn theme, or game over after the last
    pub fn start_next_round(&mut self) -> Result<Vec<GameEvent>, GameError> {
        if self.phase != RoundPhase::Leaderboard {
            return Err(self.reject("start the next round"));
        }
        let mut events = Vec::new();
        if self.round >= self.max_rounds {
            self.transition("finish the game", RoundPhase::GameOver, &mut events)?;
            if let Some(winner) = self.winner() {
                log::info!("Game over, winner {} with {}", winner.name, winner.total_score);
            }
        } else {
            self.transition("start next round", RoundPhase::Countdown, &mut events)?;
            self.round += 1;
            self.current_player = 0;
            self.pick_round_theme();
            self.prepare_turn(&mut events);
        }
        Ok(events)
    }

    /// Back to the start screen
    pub fn reset_game(&mut self) -> Result<Vec<GameEvent>, GameError> {
        let mut events = Vec::new();
        self.transition("reset the game", RoundPhase::Waiting, &mut events)?;
        self.players.clear();
        self.current_player = 0;
        self.round = 1;
        self.round_theme = None;
        self.active = None;
        self.last_turn = None;
        self.countdown_timer = 0.0;
        self.round_timer = 0.0;
        Ok(events)
    }

    fn reject(&self, action: &'static str) -> GameError {
        log::warn!("Cannot {} while in {:?}", action, self.phase);
        GameError::InvalidAction {
            action,
            phase: self.phase,
        }
    }

    fn pick_round_theme(&mut self) {
        self.round_theme = self.deck.draw(&mut self.rng);
        if let Some(kind) = self.round_theme {
            log::info!("Round {}: {}", self.round, kind.display_name());
        }
    }

    /// Fresh theme instance and countdown for the current player
    fn prepare_turn(&mut self, events: &mut Vec<GameEvent>) {
        self.active = self
            .round_theme
            .map(|kind| kind.create(self.width, self.height, &mut self.rng));
        self.countdown_timer = self.countdown_seconds;
        self.round_timer = self.round_seconds;
        self.last_hands.clear();
        events.push(GameEvent::MusicStart);
    }

    // === Results ===

    /// Players by total score, best first; ties keep join order
    pub fn standings(&self) -> Vec<&Player> {
        let mut sorted: Vec<&Player> = self.players.iter().collect();
        sorted.sort_by(|a, b| b.total_score.cmp(&a.total_score));
        sorted
    }

    pub fn winner(&self) -> Option<&Player> {
        self.standings().into_iter().next()
    }

    // === Drawing ===

    /// Theme sprites plus the tracked hands while a turn is running
    pub fn draw(&self, out: &mut DisplayList) {
        if self.phase != RoundPhase::Playing {
            return;
        }
        let Some(theme) = self.active.as_ref() else {
            return;
        };
        theme.draw(out);

        for hand in &self.last_hands {
            let point = |i: usize| hand.get(i).map(|p| p.to_canvas(self.width, self.height));
            for &(a, b) in HAND_CONNECTIONS.iter() {
                if let (Some(from), Some(to)) = (point(a), point(b)) {
                    out.line(from, to, Color::Rgba(0, 255, 0, 0.5), 2.0);
                }
            }
            for i in 0..hand.len() {
                if let Some(p) = point(i) {
                    out.circle(p, 2.0, Color::Css("red"), 0.5);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::landmarks::{HAND_POINTS, Landmark};
    use proptest::prelude::*;

    fn settings() -> Settings {
        Settings {
            round_seconds: 10.0,
            countdown_seconds: 2.0,
            max_rounds: 2,
            ..Settings::default()
        }
    }

    fn setup(players: u32) -> GameSetup {
        GameSetup {
            player_count: players,
            themes: vec![ThemeKind::ChristmasTree],
        }
    }

    /// Session sitting in Countdown for player 0, round 1
    fn counting_down(players: u32) -> Session {
        let mut session = Session::new(&settings(), 1280.0, 720.0, 42);
        session.init_game(setup(players)).unwrap();
        for _ in 0..players {
            session.next_identity_or_start().unwrap();
        }
        assert_eq!(session.phase(), RoundPhase::Countdown);
        session
    }

    fn play_out_turn(session: &mut Session) {
        session.tick(5.0, &FrameInput::default());
        assert_eq!(session.phase(), RoundPhase::Playing);
        session.tick(20.0, &FrameInput::default());
        assert_eq!(session.phase(), RoundPhase::RoundOver);
    }

    #[test]
    fn test_init_rejects_bad_setup() {
        let mut session = Session::new(&settings(), 1280.0, 720.0, 1);
        assert_eq!(
            session.init_game(setup(0)),
            Err(GameError::InvalidPlayerCount(0))
        );
        assert_eq!(
            session.init_game(setup(9)),
            Err(GameError::InvalidPlayerCount(9))
        );
        let none = GameSetup {
            player_count: 2,
            themes: vec![],
        };
        assert_eq!(session.init_game(none), Err(GameError::NoThemesSelected));
        assert_eq!(session.phase(), RoundPhase::Waiting);
        assert!(session.players().is_empty());
    }

    #[test]
    fn test_identity_reveal_walks_players() {
        let mut session = Session::new(&settings(), 1280.0, 720.0, 1);
        let events = session.init_game(setup(3)).unwrap();
        assert_eq!(
            events,
            vec![GameEvent::PhaseChanged {
                from: RoundPhase::Waiting,
                to: RoundPhase::IdentityReveal
            }]
        );
        assert_eq!(session.players().len(), 3);
        assert_eq!(session.current_player().unwrap().id, 0);

        assert!(session.next_identity_or_start().unwrap().is_empty());
        assert!(session.next_identity_or_start().unwrap().is_empty());
        assert_eq!(session.current_player().unwrap().id, 2);

        let events = session.next_identity_or_start().unwrap();
        assert_eq!(session.phase(), RoundPhase::Countdown);
        assert_eq!(session.current_player().unwrap().id, 0);
        assert_eq!(session.round_theme(), Some(ThemeKind::ChristmasTree));
        assert!(events.contains(&GameEvent::MusicStart));
    }

    #[test]
    fn test_countdown_clamps_to_zero_then_plays() {
        let mut session = counting_down(1);
        assert_eq!(session.countdown_display(), 2);
        session.tick(1.5, &FrameInput::default());
        assert_eq!(session.countdown_display(), 1);

        let events = session.tick(1.0, &FrameInput::default());
        assert_eq!(session.countdown_remaining(), 0.0);
        assert_eq!(session.countdown_display(), 0);
        assert_eq!(session.phase(), RoundPhase::Playing);
        assert_eq!(session.time_remaining(), 10.0);
        assert_eq!(
            events,
            vec![GameEvent::PhaseChanged {
                from: RoundPhase::Countdown,
                to: RoundPhase::Playing
            }]
        );
    }

    #[test]
    fn test_time_up_ends_turn_at_exactly_zero() {
        let mut session = counting_down(1);
        session.tick(5.0, &FrameInput::default());
        let events = session.tick(10.5, &FrameInput::default());
        assert_eq!(session.time_remaining(), 0.0);
        assert_eq!(session.time_display(), 0);
        assert_eq!(session.phase(), RoundPhase::RoundOver);
        assert!(events.contains(&GameEvent::MusicStop));
        assert!(events.contains(&GameEvent::TurnEnded {
            reason: TurnEndReason::TimeUp,
            score: 0
        }));
        assert_eq!(
            session.last_turn(),
            Some(TurnSummary {
                player: 0,
                score: 0,
                reason: TurnEndReason::TimeUp
            })
        );
    }

    #[test]
    fn test_playing_tick_reports_music_speed() {
        let mut session = counting_down(1);
        session.tick(5.0, &FrameInput::default());
        let events = session.tick(3.0, &FrameInput::default());
        let speed = events.iter().find_map(|e| match e {
            GameEvent::MusicSpeed(s) => Some(*s),
            _ => None,
        });
        assert!((speed.unwrap() - 1.1).abs() < 1e-5);
    }

    #[test]
    fn test_bad_dt_is_ignored() {
        let mut session = counting_down(1);
        session.tick(-3.0, &FrameInput::default());
        session.tick(f32::NAN, &FrameInput::default());
        session.tick(f32::INFINITY, &FrameInput::default());
        assert_eq!(session.countdown_remaining(), 2.0);
        assert_eq!(session.phase(), RoundPhase::Countdown);
    }

    #[test]
    fn test_ticks_outside_play_do_nothing() {
        let mut session = Session::new(&settings(), 1280.0, 720.0, 1);
        assert!(session.tick(1.0, &FrameInput::default()).is_empty());
        session.init_game(setup(1)).unwrap();
        assert!(session.tick(1.0, &FrameInput::default()).is_empty());
        assert_eq!(session.phase(), RoundPhase::IdentityReveal);
    }

    #[test]
    fn test_lives_lost_ends_turn() {
        let mut session = counting_down(1);
        session.tick(5.0, &FrameInput::default());
        // Ornaments fall past the bottom with nobody catching them
        let mut lost = 0;
        let mut ended = None;
        for _ in 0..10_000 {
            for event in session.tick(0.05, &FrameInput::default()) {
                match event {
                    GameEvent::LifeLost => lost += 1,
                    GameEvent::TurnEnded { reason, .. } => ended = Some(reason),
                    _ => {}
                }
            }
            if session.phase() != RoundPhase::Playing {
                break;
            }
        }
        // Either the clock or the lives ran out first; both end the turn
        assert_eq!(session.phase(), RoundPhase::RoundOver);
        match ended {
            Some(TurnEndReason::LivesLost) => assert_eq!(lost, 15),
            Some(TurnEndReason::TimeUp) => assert!(lost < 15),
            None => panic!("turn never ended"),
        }
    }

    #[test]
    fn test_end_turn_banks_score() {
        let mut session = counting_down(2);
        session.tick(5.0, &FrameInput::default());
        session.tick(0.1, &FrameInput::default());
        let score = session.theme_stats().unwrap().score;
        session.players[0].total_score = 7;
        let events = session.end_turn(TurnEndReason::TimeUp).unwrap();
        assert_eq!(session.players()[0].total_score, 7 + score);
        assert_eq!(session.players()[1].total_score, 0);
        assert_eq!(events[0], GameEvent::PhaseChanged {
            from: RoundPhase::Playing,
            to: RoundPhase::RoundOver
        });
        assert_eq!(
            session.end_turn(TurnEndReason::TimeUp),
            Err(GameError::InvalidAction {
                action: "end the turn",
                phase: RoundPhase::RoundOver
            })
        );
    }

    #[test]
    fn test_full_game_flow() {
        let mut session = counting_down(2);

        // Round 1
        play_out_turn(&mut session);
        session.next_turn().unwrap();
        assert_eq!(session.phase(), RoundPhase::Countdown);
        assert_eq!(session.current_player().unwrap().id, 1);
        play_out_turn(&mut session);
        session.next_turn().unwrap();
        assert_eq!(session.phase(), RoundPhase::Leaderboard);

        // Round 2
        session.start_next_round().unwrap();
        assert_eq!(session.round(), 2);
        assert_eq!(session.current_player().unwrap().id, 0);
        play_out_turn(&mut session);
        session.next_turn().unwrap();
        play_out_turn(&mut session);
        session.next_turn().unwrap();

        session.start_next_round().unwrap();
        assert_eq!(session.phase(), RoundPhase::GameOver);
        assert_eq!(session.round(), 2);
        assert!(session.winner().is_some());

        session.reset_game().unwrap();
        assert_eq!(session.phase(), RoundPhase::Waiting);
        assert!(session.players().is_empty());
    }

    const PHASES: [RoundPhase; 7] = [
        RoundPhase::Waiting,
        RoundPhase::IdentityReveal,
        RoundPhase::Countdown,
        RoundPhase::Playing,
        RoundPhase::RoundOver,
        RoundPhase::Leaderboard,
        RoundPhase::GameOver,
    ];

    type FlowAction = fn(&mut Session) -> Result<Vec<GameEvent>, GameError>;

    /// Each public flow action and the only phase it may run from
    fn flow_actions() -> [(&'static str, RoundPhase, FlowAction); 6] {
        [
            ("init_game", RoundPhase::Waiting, |s| s.init_game(setup(2))),
            ("next_identity_or_start", RoundPhase::IdentityReveal, |s| {
                s.next_identity_or_start()
            }),
            ("end_turn", RoundPhase::Playing, |s| s.end_turn(TurnEndReason::TimeUp)),
            ("next_turn", RoundPhase::RoundOver, |s| s.next_turn()),
            ("start_next_round", RoundPhase::Leaderboard, |s| s.start_next_round()),
            ("reset_game", RoundPhase::GameOver, |s| s.reset_game()),
        ]
    }

    /// Two-player session driven into `phase` through the public API
    fn session_in(phase: RoundPhase) -> Session {
        let mut session = Session::new(&settings(), 1280.0, 720.0, 42);
        if phase == RoundPhase::Waiting {
            return session;
        }
        session.init_game(setup(2)).unwrap();
        if phase == RoundPhase::IdentityReveal {
            return session;
        }
        session.next_identity_or_start().unwrap();
        session.next_identity_or_start().unwrap();
        if phase == RoundPhase::Countdown {
            return session;
        }
        session.tick(5.0, &FrameInput::default());
        if phase == RoundPhase::Playing {
            return session;
        }
        session.tick(20.0, &FrameInput::default());
        if phase == RoundPhase::RoundOver {
            return session;
        }
        session.next_turn().unwrap();
        play_out_turn(&mut session);
        session.next_turn().unwrap();
        if phase == RoundPhase::Leaderboard {
            return session;
        }
        session.start_next_round().unwrap();
        for _ in 0..2 {
            play_out_turn(&mut session);
            session.next_turn().unwrap();
        }
        session.start_next_round().unwrap();
        session
    }

    #[test]
    fn test_session_in_reaches_every_phase() {
        for phase in PHASES {
            assert_eq!(session_in(phase).phase(), phase);
        }
    }

    #[test]
    fn test_illegal_actions_are_rejected() {
        for phase in PHASES {
            for (name, allowed, action) in flow_actions() {
                if phase == allowed {
                    continue;
                }
                let mut session = session_in(phase);
                let round = session.round();
                let player = session.current_player().map(|p| p.id);
                let theme = session.round_theme();

                match action(&mut session) {
                    Err(GameError::InvalidAction { phase: at, .. }) => {
                        assert_eq!(at, phase, "{} from {:?}", name, phase)
                    }
                    other => panic!("{} from {:?} gave {:?}", name, phase, other),
                }
                assert_eq!(session.phase(), phase, "{} moved the phase", name);
                assert_eq!(session.round(), round, "{} moved the round", name);
                assert_eq!(session.current_player().map(|p| p.id), player);
                assert_eq!(session.round_theme(), theme);
            }
        }
    }

    #[test]
    fn test_next_round_cannot_skip_remaining_turns() {
        let mut session = counting_down(3);
        play_out_turn(&mut session);
        assert!(session.start_next_round().is_err());
        assert_eq!(session.phase(), RoundPhase::RoundOver);
        assert_eq!(session.round(), 1);

        session.next_turn().unwrap();
        assert_eq!(session.current_player().unwrap().id, 1);
    }

    #[test]
    fn test_next_turn_cannot_skip_identity_reveal() {
        let mut session = Session::new(&settings(), 1280.0, 720.0, 5);
        session.init_game(setup(2)).unwrap();
        assert!(session.next_turn().is_err());
        assert_eq!(session.phase(), RoundPhase::IdentityReveal);
        assert_eq!(session.current_player().unwrap().id, 0);
        assert_eq!(session.round_theme(), None);
        assert!(session.theme_stats().is_none());
    }

    #[test]
    fn test_standings_sort_stable_descending() {
        let mut session = counting_down(3);
        session.players[0].total_score = 5;
        session.players[1].total_score = 9;
        session.players[2].total_score = 5;
        let ids: Vec<usize> = session.standings().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 0, 2]);
        assert_eq!(session.winner().unwrap().id, 1);
    }

    #[test]
    fn test_draw_only_while_playing() {
        let mut session = counting_down(1);
        let mut out = DisplayList::new();
        session.draw(&mut out);
        assert!(out.is_empty());

        session.tick(5.0, &FrameInput::default());
        let hand = vec![Landmark::new(0.5, 0.5); HAND_POINTS];
        let input = FrameInput {
            hands: vec![hand],
            faces: vec![],
        };
        session.tick(0.01, &input);
        session.draw(&mut out);
        // Skeleton lines and joint dots at least
        assert!(out.len() >= HAND_CONNECTIONS.len() + HAND_POINTS);
    }

    proptest! {
        #[test]
        fn prop_every_round_plays_each_player_in_order(
            actions in prop::collection::vec(0u8..8, 1..200),
        ) {
            let players = 2usize;
            let mut session = Session::new(&settings(), 1280.0, 720.0, 9);
            // (round, player) for every turn that reached its countdown
            let mut turns: Vec<(u32, usize)> = Vec::new();

            for action in actions {
                let events = match action {
                    0 => session.init_game(setup(players as u32)).unwrap_or_default(),
                    1 => session.next_identity_or_start().unwrap_or_default(),
                    2 => session.end_turn(TurnEndReason::TimeUp).unwrap_or_default(),
                    3 => session.next_turn().unwrap_or_default(),
                    4 => session.start_next_round().unwrap_or_default(),
                    5 => session.reset_game().unwrap_or_default(),
                    6 => session.tick(3.0, &FrameInput::default()),
                    _ => session.tick(20.0, &FrameInput::default()),
                };

                for event in events {
                    let GameEvent::PhaseChanged { from, to } = event else {
                        continue;
                    };
                    prop_assert!(from.can_transition_to(to));
                    if to == RoundPhase::Waiting {
                        turns.clear();
                    }
                    if to != RoundPhase::Countdown {
                        continue;
                    }
                    prop_assert!(session.round_theme().is_some());
                    prop_assert!(session.theme_stats().is_some());

                    let turn = (session.round(), session.current_player);
                    match turns.last() {
                        None => {
                            prop_assert_eq!(from, RoundPhase::IdentityReveal);
                            prop_assert_eq!(turn, (1, 0));
                        }
                        Some(&(round, player)) if turn.0 == round => {
                            prop_assert_eq!(from, RoundPhase::RoundOver);
                            prop_assert_eq!(turn.1, player + 1);
                        }
                        Some(&(round, player)) => {
                            prop_assert_eq!(from, RoundPhase::Leaderboard);
                            prop_assert_eq!(player, players - 1);
                            prop_assert_eq!(turn, (round + 1, 0));
                        }
                    }
                    turns.push(turn);
                }
            }
        }

        #[test]
        fn prop_timers_and_phases_stay_legal(
            dts in prop::collection::vec(
                prop_oneof![
                    -1.0f32..1.0,
                    0.0f32..0.2,
                    Just(f32::NAN),
                    Just(f32::INFINITY),
                    Just(3.0f32),
                ],
                1..300,
            ),
            seed in any::<u64>(),
        ) {
            let mut session = Session::new(&settings(), 800.0, 600.0, seed);
            session.init_game(GameSetup {
                player_count: 1,
                themes: ThemeKind::ALL.to_vec(),
            }).unwrap();
            session.next_identity_or_start().unwrap();

            let mut last = session.theme_stats().unwrap();
            for dt in dts {
                for event in session.tick(dt, &FrameInput::default()) {
                    if let GameEvent::PhaseChanged { from, to } = event {
                        prop_assert!(from.can_transition_to(to));
                    }
                }
                prop_assert!(session.countdown_remaining() >= 0.0);
                prop_assert!(session.time_remaining() >= 0.0);

                let now = session.theme_stats().unwrap();
                prop_assert!(now.score >= last.score);
                prop_assert!(now.lives <= last.lives);
                last = now;

                if session.phase() == RoundPhase::RoundOver {
                    break;
                }
            }
        }
    }
}
