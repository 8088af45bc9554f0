//! Screen selection and HUD text
//!
//! Pure view models; `main.rs` copies them into the DOM.

use crate::sim::{ELF_AVATAR, Player, RoundPhase, Session};

/// Overlay screens, one per DOM section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Start,
    Identity,
    Hud,
    RoundEnd,
    Leaderboard,
    GameOver,
}

impl Screen {
    pub const ALL: [Screen; 6] = [
        Screen::Start,
        Screen::Identity,
        Screen::Hud,
        Screen::RoundEnd,
        Screen::Leaderboard,
        Screen::GameOver,
    ];

    pub fn for_phase(phase: RoundPhase) -> Self {
        match phase {
            RoundPhase::Waiting => Screen::Start,
            RoundPhase::IdentityReveal => Screen::Identity,
            RoundPhase::Countdown | RoundPhase::Playing => Screen::Hud,
            RoundPhase::RoundOver => Screen::RoundEnd,
            RoundPhase::Leaderboard => Screen::Leaderboard,
            RoundPhase::GameOver => Screen::GameOver,
        }
    }

    pub fn element_id(&self) -> &'static str {
        match self {
            Screen::Start => "start-screen",
            Screen::Identity => "identity-screen",
            Screen::Hud => "hud",
            Screen::RoundEnd => "round-end-screen",
            Screen::Leaderboard => "leaderboard-screen",
            Screen::GameOver => "game-over-screen",
        }
    }
}

/// Everything the in-game HUD shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HudView {
    pub score: String,
    pub time: String,
    pub lives: String,
    pub player: String,
    pub theme_title: String,
    /// Countdown overlay, shown only before play starts
    pub countdown_title: String,
    pub countdown_text: String,
    pub show_countdown: bool,
}

impl HudView {
    /// None until a turn has been prepared
    pub fn from_session(session: &Session) -> Option<Self> {
        let player = session.current_player()?;
        let theme = session.round_theme()?.display_name();
        let stats = session.theme_stats()?;
        let round = session.round();

        Some(Self {
            score: format!("Score: {}", stats.score),
            time: format!("Time: {}", session.time_display()),
            lives: format!("Lives: {}", hearts(stats.lives)),
            player: format!("Elf: {}", player.name),
            theme_title: format!("Round {}: {} | Turn: {}", round, theme, player.name),
            countdown_title: format!("Round {}\nUp Next: {}\nGame: {}", round, player.name, theme),
            countdown_text: session.countdown_display().to_string(),
            show_countdown: session.phase() == RoundPhase::Countdown,
        })
    }
}

pub fn hearts(lives: u32) -> String {
    "❤️".repeat(lives as usize)
}

/// Identity reveal card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityView {
    pub avatar: &'static str,
    pub avatar_filter: String,
    pub name: String,
}

impl IdentityView {
    pub fn new(player: &Player) -> Self {
        Self {
            avatar: ELF_AVATAR,
            avatar_filter: player.avatar_filter(),
            name: player.name.clone(),
        }
    }
}

/// "Holly Snowfoot Scored: 12\nTotal: 40" after a turn
pub fn round_end_text(session: &Session) -> Option<String> {
    let turn = session.last_turn()?;
    let player = session.players().get(turn.player)?;
    Some(format!(
        "{} Scored: {}\nTotal: {}",
        player.name, turn.score, player.total_score
    ))
}

pub fn winner_text(session: &Session) -> Option<String> {
    session
        .winner()
        .map(|winner| format!("Winner: {}! 🏆", winner.name))
}

/// One leaderboard row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandingLine {
    pub avatar_filter: String,
    pub text: String,
}

pub fn standings_lines(session: &Session) -> Vec<StandingLine> {
    session
        .standings()
        .into_iter()
        .map(|p| StandingLine {
            avatar_filter: p.avatar_filter(),
            text: format!("{}: {}", p.name, p.total_score),
        })
        .collect()
}

/// Mute button label
pub fn mute_label(muted: bool) -> &'static str {
    if muted { "🔇" } else { "🔊" }
}
