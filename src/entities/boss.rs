use rand::Rng;

use crate::config::GameConfig;
use crate::entities::enemy_bullet::{BulletTint, EnemyBullet};
use crate::geometry::Rect;

/// The single large enemy fielded every fifth level. Ping-pongs across
/// the field, bobs vertically for show, and fires a three-way spread.
#[derive(Debug, Clone)]
pub struct Boss {
    pub rect: Rect,
    pub max_hp: i32,
    pub hp: i32,
    pub alive: bool,
    pub direction: i8,
    x_speed: f32,
    next_shot_at_ms: u64,
    /// Draw-time offset only; the collision rect never moves vertically.
    pub bob_offset: f32,
    hurt_until_ms: u64,
    field_width: f32,
    side_margin: f32,
    bob_amplitude: f32,
    bob_speed: f32,
    shoot_min_ms: u64,
    shoot_max_ms: u64,
    bullet_speed: f32,
    spread: f32,
}

impl Boss {
    pub fn new(config: &GameConfig, hp: i32, x_speed: f32, now_ms: u64) -> Self {
        let (w, h) = config.boss_size;
        let rect = Rect::new(config.field_width / 2.0 - w / 2.0, 80.0, w, h);
        let mut rng = rand::rng();
        Self {
            rect,
            max_hp: hp,
            hp,
            alive: true,
            direction: 1,
            x_speed,
            next_shot_at_ms: now_ms
                + rng.random_range(config.boss_shoot_min_ms..=config.boss_shoot_max_ms),
            bob_offset: 0.0,
            hurt_until_ms: 0,
            field_width: config.field_width,
            side_margin: config.side_margin,
            bob_amplitude: config.boss_bob_amplitude,
            bob_speed: config.boss_bob_speed,
            shoot_min_ms: config.boss_shoot_min_ms,
            shoot_max_ms: config.boss_shoot_max_ms,
            bullet_speed: config.boss_bullet_speed,
            spread: config.boss_spread,
        }
    }

    pub fn update(&mut self, now_ms: u64) {
        self.rect.x += self.direction as f32 * self.x_speed;
        // Unlike the formation, the boss reverses immediately at the
        // margins, stepping back inside.
        if self.rect.left() < self.side_margin
            || self.rect.right() > self.field_width - self.side_margin
        {
            self.direction = -self.direction;
            self.rect.x += self.direction as f32 * self.x_speed;
        }
        self.bob_offset = self.bob_amplitude * (now_ms as f32 * self.bob_speed).sin();
    }

    /// Fire the three-way spread once the scheduled time arrives.
    pub fn try_shoot(&mut self, now_ms: u64) -> Vec<EnemyBullet> {
        if now_ms < self.next_shot_at_ms {
            return Vec::new();
        }
        let mut rng = rand::rng();
        self.next_shot_at_ms = now_ms + rng.random_range(self.shoot_min_ms..=self.shoot_max_ms);
        let cx = self.rect.centerx();
        let y = self.rect.bottom();
        vec![
            EnemyBullet::new(cx, y, self.bullet_speed, BulletTint::Boss),
            EnemyBullet::new(cx - self.spread, y, self.bullet_speed, BulletTint::Boss),
            EnemyBullet::new(cx + self.spread, y, self.bullet_speed, BulletTint::Boss),
        ]
    }

    pub fn take_damage(&mut self, dmg: i32, now_ms: u64) {
        self.hp = (self.hp - dmg).max(0);
        self.hurt_until_ms = now_ms + 120;
        if self.hp == 0 {
            self.alive = false;
        }
    }

    pub fn is_hurt(&self, now_ms: u64) -> bool {
        now_ms < self.hurt_until_ms
    }

    pub fn hp_fraction(&self) -> f32 {
        self.hp as f32 / self.max_hp.max(1) as f32
    }
}
