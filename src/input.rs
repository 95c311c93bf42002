use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Duration;

use crate::app::Screen;

/// Semantic game actions produced from raw key events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    Quit,
    // Menu
    StartGame,
    CycleProfile,
    BeginNameEntry,
    ToggleMusic,
    // Name entry
    NameChar(char),
    NameBackspace,
    NameConfirm,
    NameCancel,
    // Playing (continuous)
    MoveLeft,
    MoveRight,
    Fire,
    // Playing / paused
    Pause,
    Resume,
    Restart,
    EndRun,
    // Power-up choice
    SelectPrev,
    SelectNext,
    SelectIndex(usize),
    ConfirmChoice,
    // Game over
    BackToMenu,
}

/// Keys that can be held for continuous input.
#[derive(Debug, Default)]
struct KeyState {
    left: bool,
    right: bool,
    fire: bool,
}

/// Polls crossterm events and translates them into actions for the
/// current screen: held movement/fire state plus a one-shot queue.
pub struct InputManager {
    key_state: KeyState,
    oneshot_actions: Vec<InputAction>,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InputManager {
    pub fn new() -> Self {
        Self {
            key_state: KeyState::default(),
            oneshot_actions: Vec::new(),
        }
    }

    /// Drain all pending events. Call once per frame before `get_actions`.
    pub fn poll_events(&mut self, screen: Screen) -> color_eyre::Result<()> {
        self.oneshot_actions.clear();

        while event::poll(Duration::from_millis(0))? {
            match event::read()? {
                Event::Key(key_event) => self.handle_key_event(key_event, screen),
                _ => {}
            }
        }

        Ok(())
    }

    fn handle_key_event(&mut self, key_event: KeyEvent, screen: Screen) {
        match key_event.kind {
            KeyEventKind::Press => self.handle_key_press(key_event, screen),
            KeyEventKind::Release => self.handle_key_release(key_event.code),
            _ => {}
        }
    }

    fn handle_key_press(&mut self, key_event: KeyEvent, screen: Screen) {
        // Ctrl-C bails out of anything.
        if key_event.code == KeyCode::Char('c')
            && key_event.modifiers.contains(KeyModifiers::CONTROL)
        {
            self.oneshot_actions.push(InputAction::Quit);
            return;
        }

        match screen {
            Screen::Menu => match key_event.code {
                KeyCode::Char(' ') => self.oneshot_actions.push(InputAction::StartGame),
                KeyCode::Tab => self.oneshot_actions.push(InputAction::CycleProfile),
                KeyCode::Char('n') | KeyCode::Char('N') => {
                    self.oneshot_actions.push(InputAction::BeginNameEntry)
                }
                KeyCode::Char('m') | KeyCode::Char('M') => {
                    self.oneshot_actions.push(InputAction::ToggleMusic)
                }
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                    self.oneshot_actions.push(InputAction::Quit)
                }
                _ => {}
            },
            Screen::NameEntry => match key_event.code {
                KeyCode::Enter => self.oneshot_actions.push(InputAction::NameConfirm),
                KeyCode::Backspace => self.oneshot_actions.push(InputAction::NameBackspace),
                KeyCode::Esc => self.oneshot_actions.push(InputAction::NameCancel),
                KeyCode::Char(c) if c.is_ascii_alphanumeric() || "_- ".contains(c) => {
                    self.oneshot_actions.push(InputAction::NameChar(c))
                }
                _ => {}
            },
            Screen::Playing => match key_event.code {
                KeyCode::Char('p') | KeyCode::Char('P') => {
                    self.oneshot_actions.push(InputAction::Pause)
                }
                KeyCode::Char('m') | KeyCode::Char('M') => {
                    self.oneshot_actions.push(InputAction::ToggleMusic)
                }
                KeyCode::Esc => self.oneshot_actions.push(InputAction::EndRun),
                KeyCode::Char('a') | KeyCode::Char('A') | KeyCode::Left => {
                    self.key_state.left = true;
                    self.key_state.right = false;
                }
                KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Right => {
                    self.key_state.right = true;
                    self.key_state.left = false;
                }
                KeyCode::Char(' ') => self.key_state.fire = true,
                _ => {}
            },
            Screen::Paused => match key_event.code {
                KeyCode::Char('p') | KeyCode::Char('P') => {
                    self.oneshot_actions.push(InputAction::Resume)
                }
                KeyCode::Char('r') | KeyCode::Char('R') => {
                    self.oneshot_actions.push(InputAction::Restart)
                }
                KeyCode::Char('m') | KeyCode::Char('M') => {
                    self.oneshot_actions.push(InputAction::ToggleMusic)
                }
                KeyCode::Esc => self.oneshot_actions.push(InputAction::EndRun),
                _ => {}
            },
            Screen::PowerUpChoice => match key_event.code {
                KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => {
                    self.oneshot_actions.push(InputAction::SelectPrev)
                }
                KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => {
                    self.oneshot_actions.push(InputAction::SelectNext)
                }
                KeyCode::Char('1') => self.oneshot_actions.push(InputAction::SelectIndex(0)),
                KeyCode::Char('2') => self.oneshot_actions.push(InputAction::SelectIndex(1)),
                KeyCode::Char('3') => self.oneshot_actions.push(InputAction::SelectIndex(2)),
                // Esc confirms the highlighted card too; there is no
                // skipping the upgrade.
                KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Esc => {
                    self.oneshot_actions.push(InputAction::ConfirmChoice)
                }
                _ => {}
            },
            Screen::GameOver => match key_event.code {
                KeyCode::Char('r') | KeyCode::Char('R') => {
                    self.oneshot_actions.push(InputAction::BackToMenu)
                }
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                    self.oneshot_actions.push(InputAction::Quit)
                }
                _ => {}
            },
        }
    }

    fn handle_key_release(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('a') | KeyCode::Char('A') | KeyCode::Left => {
                self.key_state.left = false;
            }
            KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Right => {
                self.key_state.right = false;
            }
            KeyCode::Char(' ') => {
                self.key_state.fire = false;
            }
            _ => {}
        }
    }

    /// All actions for this frame: one-shots first, then the held keys
    /// (only meaningful while playing).
    pub fn get_actions(&self, screen: Screen) -> Vec<InputAction> {
        let mut actions = Vec::new();
        actions.extend_from_slice(&self.oneshot_actions);

        if screen == Screen::Playing {
            if self.key_state.left {
                actions.push(InputAction::MoveLeft);
            }
            if self.key_state.right {
                actions.push(InputAction::MoveRight);
            }
            if self.key_state.fire {
                actions.push(InputAction::Fire);
            }
        }

        actions
    }
}
