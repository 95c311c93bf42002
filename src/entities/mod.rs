mod boss;
mod bullet;
mod enemy;
mod enemy_bullet;
mod explosion;
mod grid;
mod pickup;
mod player;

// Re-export all public types
pub use boss::Boss;
pub use bullet::{Bullet, TrailSpark};
pub use enemy::Enemy;
pub use enemy_bullet::{BulletTint, EnemyBullet};
pub use explosion::Explosion;
pub use grid::{EnemyGrid, MovementStrategy};
pub use pickup::HealthPickup;
pub use player::Player;
