use crate::config::GameConfig;
use crate::geometry::Rect;

/// One spark of a bullet's exhaust trail, fading out over a few frames.
#[derive(Debug, Clone, Copy)]
pub struct TrailSpark {
    pub x: f32,
    pub y: f32,
    pub alpha: i32,
}

#[derive(Debug, Clone)]
pub struct Bullet {
    pub rect: Rect,
    speed: f32,
    pub alive: bool,
    pub trail: Vec<TrailSpark>,
    trail_tick: u32,
}

impl Bullet {
    pub fn new(x: f32, y: f32, config: &GameConfig) -> Self {
        let (w, h) = config.bullet_size;
        let mut rect = Rect::new(0.0, y - h, w, h);
        rect.set_centerx(x);
        Self {
            rect,
            speed: config.bullet_speed,
            alive: true,
            trail: Vec::new(),
            trail_tick: 0,
        }
    }

    pub fn update(&mut self) {
        self.rect.y += self.speed;
        if self.rect.bottom() < 0.0 {
            self.alive = false;
            return;
        }
        self.trail_tick += 1;
        if self.trail_tick % 2 == 0 {
            self.trail.push(TrailSpark {
                x: self.rect.centerx(),
                y: self.rect.y + self.rect.h / 2.0,
                alpha: 180,
            });
        }
        for spark in &mut self.trail {
            spark.alpha -= 24;
        }
        self.trail.retain(|spark| spark.alpha > 0);
    }
}
