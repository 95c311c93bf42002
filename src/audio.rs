use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source, source::Buffered};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

const SFX_VOLUME: f32 = 0.7;
const MUSIC_VOLUME: f32 = 0.5;

/// Named sound-effect hooks. The play state reports these; whether
/// anything is audible is this module's problem alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Shoot,
    Hit,
    Hurt,
    PowerUp,
    EnemyShoot,
    LevelUp,
    BossWarn,
    PauseIn,
    PauseOut,
    Select,
    Confirm,
    GameOver,
}

type Sound = Buffered<Decoder<BufReader<File>>>;

/// Plays pre-buffered effects and loops background music. Every failure
/// mode (no output device, missing asset, dead sink) degrades to silence;
/// nothing here can affect the game.
pub struct AudioManager {
    output: Option<(OutputStream, OutputStreamHandle)>,
    shoot_sounds: Vec<Sound>,
    shoot_rr: usize,
    hit: Option<Sound>,
    hurt: Option<Sound>,
    powerup: Option<Sound>,
    enemy_shoot: Option<Sound>,
    levelup: Option<Sound>,
    boss_warn: Option<Sound>,
    pause_in: Option<Sound>,
    pause_out: Option<Sound>,
    select: Option<Sound>,
    confirm: Option<Sound>,
    game_over: Option<Sound>,
    music: Option<Sink>,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    pub fn new() -> Self {
        let output = match OutputStream::try_default() {
            Ok(pair) => Some(pair),
            Err(err) => {
                eprintln!("Warning: failed to initialize audio: {err}");
                eprintln!("Continuing without sound...");
                None
            }
        };

        let mut manager = Self {
            output,
            shoot_sounds: Vec::new(),
            shoot_rr: 0,
            hit: None,
            hurt: None,
            powerup: None,
            enemy_shoot: None,
            levelup: None,
            boss_warn: None,
            pause_in: None,
            pause_out: None,
            select: None,
            confirm: None,
            game_over: None,
            music: None,
        };

        if manager.output.is_some() {
            manager.load_sounds();
            manager.load_music();
        }
        manager
    }

    fn load_sounds(&mut self) {
        for name in ["shoot.wav", "shoot1.wav", "shoot2.wav", "laser.wav"] {
            if let Some(sound) = load_sound(name) {
                self.shoot_sounds.push(sound);
            }
        }
        self.hit = load_sound("hit.wav");
        self.hurt = load_sound("hurt.wav");
        self.powerup = load_sound("powerup.wav");
        self.enemy_shoot = load_sound("enemy_shoot.wav");
        self.levelup = load_sound("levelup.wav");
        self.boss_warn = load_sound("boss_warn.wav");
        self.pause_in = load_sound("pause_in.wav");
        self.pause_out = load_sound("pause_out.wav");
        self.select = load_sound("select.wav");
        self.confirm = load_sound("confirm.wav");
        self.game_over = load_sound("gameover.wav");
    }

    fn load_music(&mut self) {
        let Some((_, handle)) = &self.output else {
            return;
        };
        let Some(path) = resolve_asset("bgm.mp3").or_else(|| resolve_asset("bgm.wav")) else {
            return;
        };
        let Ok(file) = File::open(path) else {
            return;
        };
        let Ok(decoder) = Decoder::new(BufReader::new(file)) else {
            return;
        };
        if let Ok(sink) = Sink::try_new(handle) {
            sink.set_volume(MUSIC_VOLUME);
            sink.append(decoder.repeat_infinite());
            sink.pause();
            self.music = Some(sink);
        }
    }

    pub fn play(&mut self, cue: Cue) {
        let sound = match cue {
            Cue::Shoot => {
                if self.shoot_sounds.is_empty() {
                    return;
                }
                let sound = self.shoot_sounds[self.shoot_rr].clone();
                self.shoot_rr = (self.shoot_rr + 1) % self.shoot_sounds.len();
                Some(sound)
            }
            Cue::Hit => self.hit.clone(),
            Cue::Hurt => self.hurt.clone(),
            Cue::PowerUp => self.powerup.clone(),
            Cue::EnemyShoot => self.enemy_shoot.clone(),
            Cue::LevelUp => self.levelup.clone(),
            Cue::BossWarn => self.boss_warn.clone(),
            Cue::PauseIn => self.pause_in.clone(),
            Cue::PauseOut => self.pause_out.clone(),
            Cue::Select => self.select.clone(),
            Cue::Confirm => self.confirm.clone(),
            Cue::GameOver => self.game_over.clone(),
        };

        let (Some((_, handle)), Some(sound)) = (&self.output, sound) else {
            return;
        };
        if let Ok(sink) = Sink::try_new(handle) {
            sink.set_volume(SFX_VOLUME);
            sink.append(sound);
            sink.detach();
        }
    }

    /// Unpause the music loop if one was loaded.
    pub fn ensure_music(&self) {
        if let Some(music) = &self.music {
            music.play();
        }
    }

    pub fn toggle_music(&self) {
        if let Some(music) = &self.music {
            if music.is_paused() {
                music.play();
            } else {
                music.pause();
            }
        }
    }
}

fn resolve_asset(name: &str) -> Option<PathBuf> {
    for dir in ["assets/sounds", "assets"] {
        let path = Path::new(dir).join(name);
        if path.exists() {
            return Some(path);
        }
    }
    None
}

fn load_sound(name: &str) -> Option<Sound> {
    let path = resolve_asset(name)?;
    let file = File::open(path).ok()?;
    let decoder = Decoder::new(BufReader::new(file)).ok()?;
    Some(decoder.buffered())
}
