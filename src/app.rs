use color_eyre::Result;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::time::{Duration, Instant};

use crate::audio::{AudioManager, Cue};
use crate::config::GameConfig;
use crate::input::{InputAction, InputManager};
use crate::play::{PlayState, PlayerInput, PowerUp, Transition};
use crate::profiles::ProfileManager;
use crate::renderer::{GameRenderer, RenderView};

/// Which screen owns input and rendering this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Menu,
    NameEntry,
    Playing,
    Paused,
    PowerUpChoice,
    GameOver,
}

/// The main application: owns the screen machine, the running game (if
/// any), and all collaborators, and drives the fixed-rate frame loop.
pub struct App {
    running: bool,
    screen: Screen,
    config: GameConfig,
    play: Option<PlayState>,
    powerup_selection: usize,
    name_buffer: String,
    final_score: u32,
    new_record: bool,
    start: Instant,
    input_manager: InputManager,
    renderer: GameRenderer,
    audio_manager: AudioManager,
    profiles: ProfileManager,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> Self {
        let config = GameConfig::default();
        Self {
            running: true,
            screen: Screen::Menu,
            play: None,
            powerup_selection: 0,
            name_buffer: String::new(),
            final_score: 0,
            new_record: false,
            start: Instant::now(),
            input_manager: InputManager::new(),
            renderer: GameRenderer::new(config.field_width, config.field_height),
            audio_manager: AudioManager::new(),
            profiles: ProfileManager::new(ProfileManager::default_path(), config.max_name_len),
            config,
        }
    }

    /// Run the application's main loop.
    pub fn run(mut self, terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>) -> Result<()> {
        while self.running {
            let now_ms = self.start.elapsed().as_millis() as u64;

            terminal.draw(|frame| {
                let active = self.profiles.get_active();
                let view = RenderView {
                    screen: self.screen,
                    play: self.play.as_ref(),
                    profile_name: active.map(|p| p.name.as_str()).unwrap_or("Guest"),
                    best_score: active.map(|p| p.high_score).unwrap_or(0),
                    name_buffer: &self.name_buffer,
                    powerup_selection: self.powerup_selection,
                    final_score: self.final_score,
                    new_record: self.new_record,
                    now_ms,
                };
                self.renderer.render(frame, &view);
            })?;

            self.input_manager.poll_events(self.screen)?;
            let actions = self.input_manager.get_actions(self.screen);
            let player_input = self.process_actions(&actions, now_ms);

            if self.screen == Screen::Playing {
                self.update_play(now_ms, player_input);
            }

            // Hold the loop near the fixed 60 Hz timestep.
            std::thread::sleep(Duration::from_millis(16));
        }
        Ok(())
    }

    /// Apply every action for this frame; held movement/fire keys are
    /// folded into the returned per-frame intent.
    fn process_actions(&mut self, actions: &[InputAction], now_ms: u64) -> PlayerInput {
        let mut player_input = PlayerInput::default();
        for action in actions {
            match action {
                InputAction::Quit => self.running = false,
                InputAction::StartGame | InputAction::Restart => self.start_run(now_ms),
                InputAction::CycleProfile => self.profiles.cycle_active(),
                InputAction::BeginNameEntry => {
                    self.name_buffer.clear();
                    self.screen = Screen::NameEntry;
                }
                InputAction::ToggleMusic => self.audio_manager.toggle_music(),
                InputAction::NameChar(c) => {
                    if self.name_buffer.chars().count() < self.config.max_name_len {
                        self.name_buffer.push(*c);
                    }
                }
                InputAction::NameBackspace => {
                    self.name_buffer.pop();
                }
                InputAction::NameConfirm => {
                    if !self.name_buffer.trim().is_empty() {
                        self.profiles.create_profile(&self.name_buffer);
                    }
                    self.screen = Screen::Menu;
                }
                InputAction::NameCancel => self.screen = Screen::Menu,
                InputAction::MoveLeft => player_input.left = true,
                InputAction::MoveRight => player_input.right = true,
                InputAction::Fire => player_input.fire = true,
                InputAction::Pause => {
                    self.audio_manager.play(Cue::PauseIn);
                    self.screen = Screen::Paused;
                }
                InputAction::Resume => {
                    self.audio_manager.play(Cue::PauseOut);
                    self.screen = Screen::Playing;
                }
                InputAction::EndRun => self.finish_run(),
                InputAction::SelectPrev => {
                    self.powerup_selection = (self.powerup_selection + 2) % 3;
                    self.audio_manager.play(Cue::Select);
                }
                InputAction::SelectNext => {
                    self.powerup_selection = (self.powerup_selection + 1) % 3;
                    self.audio_manager.play(Cue::Select);
                }
                InputAction::SelectIndex(idx) => {
                    self.powerup_selection = *idx;
                    self.confirm_powerup(now_ms);
                }
                InputAction::ConfirmChoice => self.confirm_powerup(now_ms),
                InputAction::BackToMenu => self.screen = Screen::Menu,
            }
        }
        player_input
    }

    fn start_run(&mut self, now_ms: u64) {
        self.play = Some(PlayState::new(self.config, now_ms));
        self.powerup_selection = 0;
        self.screen = Screen::Playing;
        self.audio_manager.ensure_music();
    }

    /// The single high-score write happens here, whether the run ended by
    /// death or was abandoned.
    fn finish_run(&mut self) {
        let score = self.play.take().map(|p| p.score).unwrap_or(0);
        self.final_score = score;
        self.new_record = self.profiles.update_high_score(score);
        self.audio_manager.play(Cue::GameOver);
        self.screen = Screen::GameOver;
    }

    fn confirm_powerup(&mut self, now_ms: u64) {
        if self.screen != Screen::PowerUpChoice {
            return;
        }
        let Some(play) = self.play.as_mut() else {
            return;
        };
        let choice = match self.powerup_selection {
            0 => PowerUp::RapidFire,
            1 => PowerUp::ExtraBullet,
            _ => PowerUp::DoubleShot,
        };
        play.apply_power_up(choice);
        let cue = play.setup_level(now_ms);
        self.audio_manager.play(Cue::Confirm);
        if let Some(cue) = cue {
            self.audio_manager.play(cue);
        }
        self.screen = Screen::Playing;
    }

    fn update_play(&mut self, now_ms: u64, player_input: PlayerInput) {
        let Some(play) = self.play.as_mut() else {
            return;
        };
        let out = play.update(now_ms, player_input);
        for cue in &out.cues {
            self.audio_manager.play(*cue);
        }
        match out.transition {
            Some(Transition::GameOver) => self.finish_run(),
            Some(Transition::PowerUpChoice) => {
                self.powerup_selection = 0;
                self.screen = Screen::PowerUpChoice;
            }
            None => {}
        }
    }
}
