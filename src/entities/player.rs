use crate::config::GameConfig;
use crate::geometry::Rect;

#[derive(Debug, Clone)]
pub struct Player {
    pub rect: Rect,
    speed: f32,
    hurt_until_ms: u64,
    pub shake_mag: f32,
}

impl Player {
    pub fn new(config: &GameConfig) -> Self {
        let (w, h) = config.player_size;
        let mut rect = Rect::new(0.0, config.field_height - 60.0, w, h);
        rect.set_centerx(config.field_width / 2.0);
        Self {
            rect,
            speed: config.player_speed,
            hurt_until_ms: 0,
            shake_mag: config.hurt_shake_mag,
        }
    }

    /// Move one frame from directional intent, clamped to the side margins.
    pub fn update(&mut self, left: bool, right: bool, config: &GameConfig) {
        let mut dx = 0.0;
        if left {
            dx -= self.speed;
        }
        if right {
            dx += self.speed;
        }
        self.rect.x += dx;

        let min_x = config.player_margin;
        let max_x = config.field_width - config.player_margin;
        if self.rect.left() < min_x {
            self.rect.x = min_x;
        }
        if self.rect.right() > max_x {
            self.rect.x = max_x - self.rect.w;
        }
    }

    /// Start the hurt feedback window (draw-time shake and blink).
    pub fn hurt(&mut self, now_ms: u64, duration_ms: u64, mag: f32) {
        self.hurt_until_ms = now_ms + duration_ms;
        self.shake_mag = mag;
    }

    pub fn is_hurt(&self, now_ms: u64) -> bool {
        now_ms < self.hurt_until_ms
    }
}
