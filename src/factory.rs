use crate::config::GameConfig;
use crate::entities::{
    Boss, Bullet, BulletTint, EnemyBullet, EnemyGrid, Explosion, HealthPickup, MovementStrategy,
};

/// Builds level-scaled entities from the tuning config. Pure construction:
/// the same level always yields the same shape (schedules aside).
pub struct EntityFactory {
    config: GameConfig,
}

impl EntityFactory {
    pub fn new(config: GameConfig) -> Self {
        Self { config }
    }

    pub fn create_bullet(&self, x: f32, y: f32) -> Bullet {
        Bullet::new(x, y, &self.config)
    }

    pub fn create_enemy_bullet(&self, x: f32, y: f32, speed: f32, tint: BulletTint) -> EnemyBullet {
        EnemyBullet::new(x, y, speed, tint)
    }

    pub fn create_explosion(&self, x: f32, y: f32, now_ms: u64) -> Explosion {
        Explosion::new(x, y, now_ms, self.config.explosion_ms)
    }

    pub fn create_health_pickup(&self, x: f32, y: f32, now_ms: u64) -> HealthPickup {
        HealthPickup::new(
            x,
            y,
            self.config.health_drop_speed,
            self.config.pickup_size,
            now_ms,
        )
    }

    /// Formation difficulty ramp: more rows every two levels (capped),
    /// linearly faster, zig-zag from level 3, tighter drops late.
    pub fn create_enemy_grid(&self, level: u32, now_ms: u64) -> EnemyGrid {
        let cfg = &self.config;
        let rows = (cfg.enemy_rows + (level / 2) as usize).min(cfg.enemy_rows_cap);
        let speed = cfg.enemy_x_speed
            + (level.saturating_sub(1)) as f32 * (cfg.enemy_x_speed_ramp * 0.6).max(0.15);
        let strategy = if level >= 3 {
            let amplitude = if level < 5 { 2.0 } else { 3.0 };
            MovementStrategy::ZigZag {
                amplitude,
                speed_add: 0.0,
            }
        } else {
            MovementStrategy::Horizontal
        };
        let mut grid = EnemyGrid::new(cfg, rows, speed, strategy);
        grid.drop = (cfg.enemy_drop - level.saturating_sub(1) as f32).max(cfg.enemy_drop_floor);
        grid.assign_shooters(now_ms, level, cfg);
        grid
    }

    /// Boss stats scale with the completed boss cycle count.
    pub fn create_boss(&self, level: u32, now_ms: u64) -> Boss {
        let cfg = &self.config;
        let cycle = (level / cfg.boss_every_n_levels).max(1) as i32;
        let hp = cfg.boss_base_hp + (cycle - 1) * cfg.boss_hp_per_cycle;
        let x_speed = cfg.boss_x_speed + cfg.boss_x_speed_per_cycle * (cycle - 1) as f32;
        Boss::new(cfg, hp, x_speed, now_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factory() -> EntityFactory {
        EntityFactory::new(GameConfig::default())
    }

    #[test]
    fn test_level_one_grid_shape() {
        let grid = factory().create_enemy_grid(1, 0);
        assert_eq!(grid.rows, 4);
        assert_eq!(grid.cols, 9);
        assert_eq!(grid.enemies.len(), 36);
        assert_eq!(grid.x_speed, 2.0);
        assert_eq!(grid.strategy, MovementStrategy::Horizontal);
        assert_eq!(grid.drop, 18.0);
    }

    #[test]
    fn test_rows_grow_every_two_levels_and_cap() {
        let f = factory();
        assert_eq!(f.create_enemy_grid(2, 0).rows, 5);
        assert_eq!(f.create_enemy_grid(4, 0).rows, 6);
        assert_eq!(f.create_enemy_grid(12, 0).rows, 6);
    }

    #[test]
    fn test_speed_ramps_linearly() {
        let f = factory();
        assert_eq!(f.create_enemy_grid(1, 0).x_speed, 2.0);
        assert!((f.create_enemy_grid(3, 0).x_speed - 2.3).abs() < 1e-4);
        assert!((f.create_enemy_grid(6, 0).x_speed - 2.75).abs() < 1e-4);
    }

    #[test]
    fn test_zigzag_activates_at_level_three() {
        let f = factory();
        assert_eq!(f.create_enemy_grid(2, 0).strategy, MovementStrategy::Horizontal);
        assert_eq!(
            f.create_enemy_grid(3, 0).strategy,
            MovementStrategy::ZigZag { amplitude: 2.0, speed_add: 0.0 }
        );
        assert_eq!(
            f.create_enemy_grid(5, 0).strategy,
            MovementStrategy::ZigZag { amplitude: 3.0, speed_add: 0.0 }
        );
    }

    #[test]
    fn test_drop_shrinks_with_floor() {
        let f = factory();
        assert_eq!(f.create_enemy_grid(2, 0).drop, 17.0);
        assert_eq!(f.create_enemy_grid(7, 0).drop, 12.0);
        assert_eq!(f.create_enemy_grid(30, 0).drop, 12.0);
    }

    #[test]
    fn test_grid_has_shooters_assigned() {
        let grid = factory().create_enemy_grid(1, 0);
        assert_eq!(grid.enemies.iter().filter(|e| e.can_shoot).count(), 7);
    }

    #[test]
    fn test_boss_scales_by_cycle() {
        let f = factory();
        let first = f.create_boss(5, 0);
        assert_eq!(first.hp, 20);
        assert_eq!(first.max_hp, 20);

        let second = f.create_boss(10, 0);
        assert_eq!(second.hp, 28);

        let third = f.create_boss(15, 0);
        assert_eq!(third.hp, 36);
    }
}
