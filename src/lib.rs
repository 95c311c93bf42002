// Library exports for the binary and the integration tests
pub use audio::Cue;
pub use config::GameConfig;
pub use entities::{
    Boss, Bullet, BulletTint, Enemy, EnemyBullet, EnemyGrid, Explosion, HealthPickup,
    MovementStrategy, Player,
};
pub use factory::EntityFactory;
pub use geometry::Rect;
pub use play::{FrameOutput, PlayState, PlayerInput, PowerUp, Transition, Wave};
pub use profiles::ProfileManager;
pub use timer::Timer;

pub mod app;
pub mod audio;
pub mod config;
pub mod entities;
pub mod factory;
pub mod geometry;
pub mod input;
pub mod play;
pub mod profiles;
pub mod renderer;
pub mod sprites;
pub mod timer;
