use crate::geometry::Rect;

/// Cosmetic tint only; the renderer maps it to a color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulletTint {
    Formation,
    Boss,
}

#[derive(Debug, Clone)]
pub struct EnemyBullet {
    pub rect: Rect,
    speed: f32,
    pub alive: bool,
    pub tint: BulletTint,
}

impl EnemyBullet {
    pub fn new(x: f32, y: f32, speed: f32, tint: BulletTint) -> Self {
        let mut rect = Rect::new(0.0, y, 4.0, 12.0);
        rect.set_centerx(x);
        Self {
            rect,
            speed,
            alive: true,
            tint,
        }
    }

    pub fn update(&mut self, field_height: f32) {
        self.rect.y += self.speed;
        if self.rect.top() > field_height {
            self.alive = false;
        }
    }
}
