use crate::geometry::Rect;

#[derive(Debug, Clone)]
pub struct Enemy {
    pub rect: Rect,
    pub alive: bool,
    /// Two-frame animation toggle, driven by the clock.
    pub frame: u8,
    /// Derived from the spawn cell; the renderer picks pattern and color
    /// from it so neighbors vary.
    pub style_seed: usize,
    pub can_shoot: bool,
    pub next_shot_at_ms: u64,
}

impl Enemy {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        let style_seed = (x / 40.0) as usize + (y / 24.0) as usize;
        Self {
            rect: Rect::new(x, y, w, h),
            alive: true,
            frame: 0,
            style_seed,
            can_shoot: false,
            next_shot_at_ms: u64::MAX,
        }
    }

    pub fn update_anim(&mut self, now_ms: u64) {
        self.frame = ((now_ms / 250) % 2) as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enemy_starts_alive_and_silent() {
        let enemy = Enemy::new(60.0, 80.0, 40.0, 24.0);
        assert!(enemy.alive);
        assert!(!enemy.can_shoot);
        assert_eq!(enemy.next_shot_at_ms, u64::MAX);
    }

    #[test]
    fn test_animation_toggles_every_250ms() {
        let mut enemy = Enemy::new(60.0, 80.0, 40.0, 24.0);
        enemy.update_anim(0);
        assert_eq!(enemy.frame, 0);
        enemy.update_anim(250);
        assert_eq!(enemy.frame, 1);
        enemy.update_anim(499);
        assert_eq!(enemy.frame, 1);
        enemy.update_anim(500);
        assert_eq!(enemy.frame, 0);
    }

    #[test]
    fn test_neighboring_spawns_get_different_seeds() {
        let a = Enemy::new(60.0, 80.0, 40.0, 24.0);
        let b = Enemy::new(120.0, 80.0, 40.0, 24.0);
        assert_ne!(a.style_seed, b.style_seed);
    }
}
