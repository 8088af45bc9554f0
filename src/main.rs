//! Elf Party entry point
//!
//! On the web: wires the DOM screens, camera landmarks, canvas and audio to a
//! `Session`. Natively: plays a scripted headless game and prints the result.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, HtmlElement, HtmlInputElement, HtmlVideoElement};

    use elf_party::audio::AudioManager;
    use elf_party::consts::*;
    use elf_party::leaderboard::now_ms;
    use elf_party::renderer::{CanvasPainter, DisplayList};
    use elf_party::sim::{FrameInput, GameEvent, GameSetup, RoundPhase, Session, ThemeKind};
    use elf_party::ui::{self, HudView, IdentityView, Screen, StandingLine};
    use elf_party::{HallOfFame, Settings};

    // Landmarks come from the camera module on the page (MediaPipe), which
    // exposes its latest results on `window.elfPartyCamera`
    #[wasm_bindgen(inline_js = "
        export function hand_landmarks_json() {
            const cam = window.elfPartyCamera;
            const hands = cam && cam.getLandmarks ? cam.getLandmarks() : null;
            return hands ? JSON.stringify(hands) : '';
        }

        export function face_landmarks_json() {
            const cam = window.elfPartyCamera;
            const faces = cam && cam.getFaceLandmarks ? cam.getFaceLandmarks() : null;
            return faces ? JSON.stringify(faces) : '';
        }
    ")]
    extern "C" {
        fn hand_landmarks_json() -> String;
        fn face_landmarks_json() -> String;
    }

    struct Game {
        session: Session,
        settings: Settings,
        hall: HallOfFame,
        audio: AudioManager,
        painter: Option<CanvasPainter>,
        video: Option<HtmlVideoElement>,
        frame: DisplayList,
        last_time: f64,
        shown_screen: Option<Screen>,
    }

    impl Game {
        fn new(settings: Settings, width: f32, height: f32, seed: u64) -> Self {
            Self {
                session: Session::new(&settings, width, height, seed),
                audio: AudioManager::new(settings.music_volume, settings.muted),
                hall: HallOfFame::load(),
                settings,
                painter: None,
                video: None,
                frame: DisplayList::new(),
                last_time: 0.0,
                shown_screen: None,
            }
        }

        fn read_input(&self) -> FrameInput {
            match FrameInput::from_json(&hand_landmarks_json(), &face_landmarks_json()) {
                Ok(input) => input,
                Err(e) => {
                    log::warn!("Dropping landmark frame: {}", e);
                    FrameInput::default()
                }
            }
        }

        fn update(&mut self, dt: f32) {
            let input = match self.session.phase() {
                RoundPhase::Playing => self.read_input(),
                _ => FrameInput::default(),
            };
            let events = self.session.tick(dt.min(MAX_FRAME_DT), &input);
            self.handle_events(&events);
        }

        fn handle_events(&mut self, events: &[GameEvent]) {
            for event in events {
                self.audio.handle_event(event);
                if let GameEvent::PhaseChanged {
                    to: RoundPhase::GameOver,
                    ..
                } = event
                {
                    self.record_winner();
                }
            }
        }

        fn record_winner(&mut self) {
            let players = self.session.players().len() as u32;
            let Some(winner) = self.session.winner() else {
                return;
            };
            if let Some(rank) = self
                .hall
                .record(&winner.name, winner.total_score, players, now_ms())
            {
                log::info!("{} entered the hall of fame at #{}", winner.name, rank);
                self.hall.save();
            }
        }

        fn render(&mut self) {
            let Some(painter) = &self.painter else { return };
            painter.clear();
            if let Some(video) = &self.video {
                painter.draw_camera_frame(video);
            }
            self.frame.clear();
            self.session.draw(&mut self.frame);
            painter.paint(&self.frame);
        }

        /// Copy view models into the DOM
        fn update_hud(&mut self, document: &Document) {
            let screen = Screen::for_phase(self.session.phase());
            if self.shown_screen != Some(screen) {
                switch_screen(document, screen);
                self.shown_screen = Some(screen);
                self.fill_screen(document, screen);
            }

            if screen == Screen::Hud {
                if let Some(hud) = HudView::from_session(&self.session) {
                    set_text(document, "score-display", &hud.score);
                    set_text(document, "time-display", &hud.time);
                    set_text(document, "lives-display", &hud.lives);
                    set_text(document, "player-display", &hud.player);
                    set_text(document, "theme-title", &hud.theme_title);
                    set_text(document, "countdown-title", &hud.countdown_title);
                    set_text(document, "countdown-text", &hud.countdown_text);
                    set_active(document, "countdown-overlay", hud.show_countdown);
                }
            }
        }

        /// One-off content for screens that don't change while shown
        fn fill_screen(&self, document: &Document, screen: Screen) {
            match screen {
                Screen::RoundEnd => {
                    if let Some(text) = ui::round_end_text(&self.session) {
                        set_text(document, "round-score", &text);
                    }
                }
                Screen::Leaderboard => {
                    set_html(
                        document,
                        "leaderboard-list",
                        &standings_html(&ui::standings_lines(&self.session)),
                    );
                }
                Screen::GameOver => {
                    if let Some(text) = ui::winner_text(&self.session) {
                        set_text(document, "winner-display", &text);
                    }
                    set_html(
                        document,
                        "final-leaderboard",
                        &standings_html(&ui::standings_lines(&self.session)),
                    );
                }
                Screen::Start | Screen::Identity | Screen::Hud => {}
            }
        }

        fn show_identity(&self, document: &Document) {
            let Some(player) = self.session.current_player() else {
                return;
            };
            let view = IdentityView::new(player);
            set_text(document, "identity-name", &view.name);
            if let Some(avatar) = element::<HtmlElement>(document, "identity-avatar") {
                avatar.set_text_content(Some(view.avatar));
                let _ = avatar.style().set_property("filter", &view.avatar_filter);
            }
        }
    }

    // === DOM helpers ===

    fn element<T: JsCast>(document: &Document, id: &str) -> Option<T> {
        document.get_element_by_id(id)?.dyn_into::<T>().ok()
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            if el.text_content().as_deref() != Some(text) {
                el.set_text_content(Some(text));
            }
        }
    }

    fn set_html(document: &Document, id: &str, html: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_inner_html(html);
        }
    }

    fn set_active(document: &Document, id: &str, active: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.class_list().toggle_with_force("active", active);
        }
    }

    fn switch_screen(document: &Document, screen: Screen) {
        for other in Screen::ALL {
            set_active(document, other.element_id(), other == screen);
        }
    }

    fn standings_html(lines: &[StandingLine]) -> String {
        let mut html = String::from("<ol>");
        for line in lines {
            html.push_str(&format!(
                "<li><span style=\"filter: {}\">{}</span> {}</li>",
                line.avatar_filter,
                elf_party::sim::ELF_AVATAR,
                line.text
            ));
        }
        html.push_str("</ol>");
        html
    }

    /// Player count and ticked themes from the start screen
    fn read_setup(document: &Document, fallback: &Settings) -> GameSetup {
        let player_count = element::<HtmlInputElement>(document, "player-count")
            .and_then(|input| input.value().trim().parse().ok())
            .unwrap_or(fallback.player_count);

        let mut themes = Vec::new();
        if let Ok(checks) = document.query_selector_all(".theme-select") {
            for i in 0..checks.length() {
                let Some(input) = checks
                    .get(i)
                    .and_then(|node| node.dyn_into::<HtmlInputElement>().ok())
                else {
                    continue;
                };
                if !input.checked() {
                    continue;
                }
                match input.value().parse::<u32>().map(ThemeKind::from_index) {
                    Ok(Ok(kind)) => themes.push(kind),
                    Ok(Err(e)) => log::warn!("{}", e),
                    Err(_) => log::warn!("Bad theme checkbox value {:?}", input.value()),
                }
            }
        }

        GameSetup {
            player_count,
            themes,
        }
    }

    /// Pre-fill the start screen from saved settings
    fn apply_settings(document: &Document, settings: &Settings) {
        if let Some(input) = element::<HtmlInputElement>(document, "player-count") {
            input.set_value(&settings.player_count.to_string());
        }
        if let Ok(checks) = document.query_selector_all(".theme-select") {
            for i in 0..checks.length() {
                if let Some(input) = checks
                    .get(i)
                    .and_then(|node| node.dyn_into::<HtmlInputElement>().ok())
                {
                    let selected = input
                        .value()
                        .parse::<u32>()
                        .ok()
                        .and_then(|v| ThemeKind::from_index(v).ok())
                        .is_some_and(|kind| settings.themes.contains(&kind));
                    input.set_checked(selected);
                }
            }
        }
        set_text(document, "mute-btn", ui::mute_label(settings.muted));
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);
        log::info!("Elf Party starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        let canvas: HtmlCanvasElement = element(&document, "game-canvas").ok_or("no canvas")?;
        let width = canvas.client_width().max(1) as u32;
        let height = canvas.client_height().max(1) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let settings = Settings::load();
        apply_settings(&document, &settings);

        let seed = js_sys::Date::now() as u64;
        let mut game = Game::new(settings, width as f32, height as f32, seed);
        game.painter = CanvasPainter::new(&canvas);
        if game.painter.is_none() {
            log::warn!("2D canvas context unavailable - drawing disabled");
        }
        game.video = element(&document, "webcam");
        log::info!("Game initialized with seed: {}", seed);

        let game = Rc::new(RefCell::new(game));

        setup_flow_buttons(&document, game.clone());
        setup_theme_checkboxes(&document);
        setup_mute_button(&document, game.clone());
        setup_music_pump(&window, game.clone())?;
        setup_resize_handler(&window, canvas, game.clone());

        request_animation_frame(game);
        log::info!("Elf Party running!");
        Ok(())
    }

    /// Attach a click handler that runs a flow action on the game
    fn on_click(
        document: &Document,
        id: &str,
        game: Rc<RefCell<Game>>,
        action: impl Fn(&mut Game, &Document) + 'static,
    ) {
        let Some(btn) = document.get_element_by_id(id) else {
            log::warn!("Missing button #{}", id);
            return;
        };
        let doc = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
            let mut g = game.borrow_mut();
            g.audio.resume();
            action(&mut g, &doc);
        });
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_flow_buttons(document: &Document, game: Rc<RefCell<Game>>) {
        on_click(document, "start-btn", game.clone(), |g, doc| {
            let setup = read_setup(doc, &g.settings);
            match g.session.init_game(setup.clone()) {
                Ok(events) => {
                    g.settings.remember_setup(&setup);
                    g.settings.save();
                    g.handle_events(&events);
                    g.show_identity(doc);
                }
                Err(e) => {
                    log::warn!("Cannot start: {}", e);
                    if let Some(window) = web_sys::window() {
                        let _ = window.alert_with_message(&e.to_string());
                    }
                }
            }
        });

        on_click(document, "identity-next-btn", game.clone(), |g, doc| {
            match g.session.next_identity_or_start() {
                Ok(events) => {
                    g.handle_events(&events);
                    if g.session.phase() == RoundPhase::IdentityReveal {
                        g.show_identity(doc);
                    }
                }
                Err(e) => log::warn!("{}", e),
            }
        });

        on_click(document, "next-turn-btn", game.clone(), |g, _| {
            match g.session.next_turn() {
                Ok(events) => g.handle_events(&events),
                Err(e) => log::warn!("{}", e),
            }
        });

        on_click(document, "next-round-btn", game.clone(), |g, _| {
            match g.session.start_next_round() {
                Ok(events) => g.handle_events(&events),
                Err(e) => log::warn!("{}", e),
            }
        });

        on_click(document, "restart-btn", game, |g, _| match g.session.reset_game() {
            Ok(events) => g.handle_events(&events),
            Err(e) => log::warn!("{}", e),
        });
    }

    /// "All" checkbox mirrors the individual theme checkboxes
    fn setup_theme_checkboxes(document: &Document) {
        let Some(select_all) = element::<HtmlInputElement>(document, "theme-all") else {
            return;
        };
        let checks = || -> Vec<HtmlInputElement> {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return Vec::new();
            };
            let Ok(list) = document.query_selector_all(".theme-select") else {
                return Vec::new();
            };
            (0..list.length())
                .filter_map(|i| list.get(i)?.dyn_into::<HtmlInputElement>().ok())
                .collect()
        };

        {
            let select_all_clone = select_all.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let checked = select_all_clone.checked();
                for cb in checks() {
                    cb.set_checked(checked);
                }
            });
            let _ = select_all
                .add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        for cb in checks() {
            let select_all = select_all.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                select_all.set_checked(checks().iter().all(|c| c.checked()));
            });
            let _ = cb.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_mute_button(document: &Document, game: Rc<RefCell<Game>>) {
        on_click(document, "mute-btn", game, |g, doc| {
            let muted = g.audio.toggle_mute();
            g.settings.muted = muted;
            g.settings.save();
            set_text(doc, "mute-btn", ui::mute_label(muted));
        });
    }

    /// Music lookahead runs on a timer so it keeps going between frames
    fn setup_music_pump(window: &web_sys::Window, game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        let closure = Closure::<dyn FnMut()>::new(move || {
            if let Ok(mut g) = game.try_borrow_mut() {
                g.audio.pump_music();
            }
        });
        window.set_interval_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            elf_party::music::SCHEDULE_INTERVAL_MS,
        )?;
        closure.forget();
        Ok(())
    }

    /// Keep the canvas backing store and the simulation bounds in sync with layout
    fn setup_resize_handler(
        window: &web_sys::Window,
        canvas: HtmlCanvasElement,
        game: Rc<RefCell<Game>>,
    ) {
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let width = canvas.client_width().max(1) as u32;
            let height = canvas.client_height().max(1) as u32;
            canvas.set_width(width);
            canvas.set_height(height);

            let mut g = game.borrow_mut();
            if let Some(painter) = g.painter.as_mut() {
                painter.resize(width, height);
            }
            g.session.resize(width as f32, height as f32);
            log::debug!("Canvas resized to {}x{}", width, height);
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            // First frame after a pause starts from zero
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                0.0
            };
            g.last_time = time;

            g.update(dt);
            g.render();
            if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                g.update_hud(&document);
            }
        }
        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    if let Err(e) = wasm_game::run() {
        log::error!("Elf Party failed to start: {:?}", e);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Elf Party (native) starting...");
    log::info!("Camera input needs a browser - playing a scripted headless game instead");

    demo::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Headless game with a scripted player that waves a hand and chomps
#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use elf_party::music::MusicScheduler;
    use elf_party::sim::landmarks::{
        HAND_POINTS, LEFT_EYE_OUTER, LOWER_LIP, RIGHT_EYE_OUTER, UPPER_LIP,
    };
    use elf_party::sim::{FrameInput, GameEvent, Landmark, RoundPhase, Session};
    use elf_party::{HallOfFame, Settings};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const DT: f32 = 1.0 / 60.0;
    const FACE_POINTS: usize = 468;

    /// Fingertip sweeps a Lissajous curve; head sways; mouth opens and shuts
    fn scripted_input(t: f32) -> FrameInput {
        let hand_x = 0.5 + 0.4 * (t * 1.3).sin();
        let hand_y = 0.5 + 0.4 * (t * 2.1).sin();
        let hand = vec![Landmark::new(hand_x, hand_y); HAND_POINTS];

        let mut face = vec![Landmark::new(0.5, 0.45); FACE_POINTS];
        let tilt = 0.04 * (t * 0.7).sin();
        face[LEFT_EYE_OUTER] = Landmark::new(0.42, 0.4 - tilt);
        face[RIGHT_EYE_OUTER] = Landmark::new(0.58, 0.4 + tilt);
        let gap = if (t * 1.5).sin() > 0.0 { 0.08 } else { 0.01 };
        face[UPPER_LIP] = Landmark::new(0.5, 0.55);
        face[LOWER_LIP] = Landmark::new(0.5, 0.55 + gap);

        FrameInput {
            hands: vec![hand],
            faces: vec![face],
        }
    }

    pub fn run() {
        let settings = Settings::load();
        let mut session = Session::new(&settings, 1280.0, 720.0, 2024);
        let mut music = MusicScheduler::new();
        let mut music_rng = Pcg32::seed_from_u64(7);
        let mut notes = 0usize;

        let setup = settings.to_setup();
        if let Err(e) = session.init_game(setup) {
            log::error!("Demo setup rejected: {}", e);
            return;
        }
        for player in session.players() {
            println!("🧝 {} joins the party", player.name);
        }
        while session.phase() == RoundPhase::IdentityReveal {
            if session.next_identity_or_start().is_err() {
                return;
            }
        }

        let mut clock = 0.0f64;
        let mut t = 0.0f32;
        loop {
            let events = match session.phase() {
                RoundPhase::Countdown | RoundPhase::Playing => {
                    t += DT;
                    clock += DT as f64;
                    session.tick(DT, &scripted_input(t))
                }
                RoundPhase::RoundOver => {
                    if let Some(turn) = session.last_turn() {
                        let name = &session.players()[turn.player].name;
                        println!("  {} scored {} ({:?})", name, turn.score, turn.reason);
                    }
                    session.next_turn().unwrap_or_default()
                }
                RoundPhase::Leaderboard => {
                    println!("Standings after round {}:", session.round());
                    for line in elf_party::ui::standings_lines(&session) {
                        println!("  {}", line.text);
                    }
                    session.start_next_round().unwrap_or_default()
                }
                RoundPhase::GameOver => break,
                RoundPhase::Waiting | RoundPhase::IdentityReveal => return,
            };

            for event in &events {
                match event {
                    GameEvent::MusicStart => music.start(clock, &mut music_rng),
                    GameEvent::MusicStop => music.stop(),
                    GameEvent::MusicSpeed(speed) => music.set_speed(*speed),
                    GameEvent::PhaseChanged {
                        to: RoundPhase::Countdown,
                        ..
                    } => {
                        if let (Some(player), Some(theme)) =
                            (session.current_player(), session.round_theme())
                        {
                            println!(
                                "Round {}: {} plays {}",
                                session.round(),
                                player.name,
                                theme.display_name()
                            );
                        }
                    }
                    _ => {}
                }
            }
            notes += music.schedule(clock).len();
        }

        if let Some(winner) = session.winner() {
            println!("\nWinner: {}! 🏆 ({} points)", winner.name, winner.total_score);
            let mut hall = HallOfFame::load();
            let players = session.players().len() as u32;
            if let Some(rank) = hall.record(
                &winner.name,
                winner.total_score,
                players,
                elf_party::leaderboard::now_ms(),
            ) {
                println!("Hall of fame rank #{}", rank);
                hall.save();
            }
        }
        println!("{} melody notes scheduled", notes);
    }
}
