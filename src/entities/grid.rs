use rand::Rng;

use crate::config::GameConfig;
use crate::entities::enemy::Enemy;
use crate::entities::enemy_bullet::{BulletTint, EnemyBullet};
use crate::geometry::Rect;

/// Per-frame horizontal displacement policy for the whole formation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MovementStrategy {
    Horizontal,
    ZigZag { amplitude: f32, speed_add: f32 },
}

impl MovementStrategy {
    /// Move every alive enemy, then recompute bounds and bounce.
    pub fn step(self, grid: &mut EnemyGrid, now_ms: u64) {
        if grid.alive_count() == 0 {
            return;
        }
        match self {
            MovementStrategy::Horizontal => {
                let dx = grid.direction as f32 * grid.x_speed;
                for enemy in grid.enemies.iter_mut().filter(|e| e.alive) {
                    enemy.rect.x += dx;
                    enemy.update_anim(now_ms);
                }
                grid.recalc_bounds();
                grid.maybe_bounce(now_ms, 0.0);
            }
            MovementStrategy::ZigZag {
                amplitude,
                speed_add,
            } => {
                let base = grid.direction as f32 * (grid.x_speed + speed_add);
                // Phase is shifted per enemy so the block wobbles instead
                // of translating rigidly.
                for (idx, enemy) in grid.enemies.iter_mut().filter(|e| e.alive).enumerate() {
                    let phase = (now_ms / 16 + idx as u64) as f32 * 0.2;
                    enemy.rect.x += base + amplitude * phase.sin();
                    enemy.update_anim(now_ms);
                }
                grid.recalc_bounds();
                // Reserve room for the oscillation peak at the edges.
                grid.maybe_bounce(now_ms, amplitude + 1.0);
            }
        }
    }
}

/// A rectangular formation of enemies marching as a loose block, plus its
/// shooting schedule.
#[derive(Debug, Clone)]
pub struct EnemyGrid {
    pub enemies: Vec<Enemy>,
    pub rows: usize,
    pub cols: usize,
    pub x_speed: f32,
    pub drop: f32,
    /// +1 marching right, -1 marching left.
    pub direction: i8,
    /// Union of all alive enemies' rects; `None` once the wave is cleared.
    pub bounds: Option<Rect>,
    pub strategy: MovementStrategy,
    last_bounce_ms: u64,
    bounce_cooldown_ms: u64,
    shoot_min_ms: u64,
    shoot_max_ms: u64,
    enemy_bullet_speed: f32,
    field_width: f32,
    side_margin: f32,
    bottom_line: f32,
}

impl EnemyGrid {
    pub fn new(config: &GameConfig, rows: usize, x_speed: f32, strategy: MovementStrategy) -> Self {
        let mut grid = Self {
            enemies: Vec::new(),
            rows,
            cols: config.enemy_cols,
            x_speed,
            drop: config.enemy_drop,
            direction: 1,
            bounds: None,
            strategy,
            last_bounce_ms: 0,
            bounce_cooldown_ms: config.bounce_cooldown_ms,
            shoot_min_ms: config.enemy_shoot_min_ms,
            shoot_max_ms: config.enemy_shoot_max_ms,
            enemy_bullet_speed: config.enemy_bullet_speed,
            field_width: config.field_width,
            side_margin: config.side_margin,
            bottom_line: config.field_height - config.bottom_margin,
        };
        grid.build(config);
        grid
    }

    fn build(&mut self, config: &GameConfig) {
        let (w, h) = config.enemy_size;
        let (origin_x, origin_y) = config.grid_origin;
        let (gap_x, gap_y) = config.grid_gap;
        self.enemies.clear();
        for row in 0..self.rows {
            for col in 0..self.cols {
                let x = origin_x + col as f32 * (w + gap_x);
                let y = origin_y + row as f32 * (h + gap_y);
                self.enemies.push(Enemy::new(x, y, w, h));
            }
        }
        self.recalc_bounds();
    }

    pub fn recalc_bounds(&mut self) {
        self.bounds = self
            .enemies
            .iter()
            .filter(|e| e.alive)
            .map(|e| e.rect)
            .reduce(|acc, r| acc.union(&r));
    }

    /// Reverse and drop when the formation nears either edge, debounced so
    /// a block straddling the boundary does not flap every frame.
    pub fn maybe_bounce(&mut self, now_ms: u64, extra_margin: f32) {
        if now_ms.saturating_sub(self.last_bounce_ms) < self.bounce_cooldown_ms {
            return;
        }
        let Some(bounds) = self.bounds else {
            return;
        };
        let margin = self.side_margin + extra_margin;
        if bounds.left() < margin || bounds.right() > self.field_width - margin {
            self.direction = -self.direction;
            let drop = self.drop;
            for enemy in self.enemies.iter_mut().filter(|e| e.alive) {
                enemy.rect.y += drop;
            }
            self.recalc_bounds();
            self.last_bounce_ms = now_ms;
        }
    }

    /// Flag up to the configured number of alive enemies as shooters and
    /// schedule their first shots. Intervals shrink with level down to a
    /// 70% floor.
    pub fn assign_shooters(&mut self, now_ms: u64, level: u32, config: &GameConfig) {
        let alive: Vec<usize> = self
            .enemies
            .iter()
            .enumerate()
            .filter(|(_, e)| e.alive)
            .map(|(i, _)| i)
            .collect();
        let count = config.enemy_shooters_per_level.min(alive.len());

        let rate = (1.0 - 0.03 * (level.saturating_sub(1)) as f64).max(0.7);
        self.shoot_min_ms = (config.enemy_shoot_min_ms as f64 * rate) as u64;
        self.shoot_max_ms = (config.enemy_shoot_max_ms as f64 * rate) as u64;

        let mut rng = rand::rng();
        for pick in rand::seq::index::sample(&mut rng, alive.len(), count) {
            let enemy = &mut self.enemies[alive[pick]];
            enemy.can_shoot = true;
            enemy.next_shot_at_ms = now_ms + rng.random_range(self.shoot_min_ms..=self.shoot_max_ms);
        }
    }

    /// Emit one bullet per shooter whose scheduled time has arrived, and
    /// reschedule it. Non-shooters never fire.
    pub fn collect_shots(&mut self, now_ms: u64) -> Vec<EnemyBullet> {
        let mut rng = rand::rng();
        let mut shots = Vec::new();
        for enemy in &mut self.enemies {
            if !(enemy.alive && enemy.can_shoot) {
                continue;
            }
            if now_ms >= enemy.next_shot_at_ms {
                shots.push(EnemyBullet::new(
                    enemy.rect.centerx(),
                    enemy.rect.bottom(),
                    self.enemy_bullet_speed,
                    BulletTint::Formation,
                ));
                enemy.next_shot_at_ms =
                    now_ms + rng.random_range(self.shoot_min_ms..=self.shoot_max_ms);
            }
        }
        shots
    }

    pub fn update(&mut self, now_ms: u64) {
        let strategy = self.strategy;
        strategy.step(self, now_ms);
    }

    pub fn any_reached_bottom(&self) -> bool {
        self.enemies
            .iter()
            .any(|e| e.alive && e.rect.bottom() >= self.bottom_line)
    }

    /// Anti-stuck penalty response: push the whole formation back up.
    pub fn nudge_up(&mut self, dist: f32) {
        for enemy in &mut self.enemies {
            enemy.rect.y -= dist;
        }
        self.recalc_bounds();
    }

    pub fn alive_count(&self) -> usize {
        self.enemies.iter().filter(|e| e.alive).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> GameConfig {
        GameConfig::default()
    }

    fn grid(rows: usize) -> EnemyGrid {
        EnemyGrid::new(&config(), rows, 2.0, MovementStrategy::Horizontal)
    }

    fn manual_union(grid: &EnemyGrid) -> Option<Rect> {
        let mut alive = grid.enemies.iter().filter(|e| e.alive).map(|e| e.rect);
        let first = alive.next()?;
        Some(alive.fold(first, |acc, r| acc.union(&r)))
    }

    #[test]
    fn test_grid_builds_row_major() {
        let g = grid(4);
        assert_eq!(g.enemies.len(), 36);
        // First row shares y, columns advance in x.
        assert_eq!(g.enemies[0].rect.y, g.enemies[8].rect.y);
        assert!(g.enemies[0].rect.x < g.enemies[1].rect.x);
        assert!(g.enemies[0].rect.y < g.enemies[9].rect.y);
    }

    #[test]
    fn test_bounds_match_alive_union() {
        let mut g = grid(4);
        assert_eq!(g.bounds, manual_union(&g));

        g.enemies[0].alive = false;
        g.enemies[35].alive = false;
        g.recalc_bounds();
        assert_eq!(g.bounds, manual_union(&g));
    }

    #[test]
    fn test_bounds_none_when_cleared() {
        let mut g = grid(2);
        for e in &mut g.enemies {
            e.alive = false;
        }
        g.recalc_bounds();
        assert_eq!(g.bounds, None);
    }

    #[test]
    fn test_step_moves_alive_enemies_only() {
        let mut g = grid(2);
        g.enemies[0].alive = false;
        let dead_x = g.enemies[0].rect.x;
        let live_x = g.enemies[1].rect.x;
        g.update(1000);
        assert_eq!(g.enemies[0].rect.x, dead_x);
        assert_eq!(g.enemies[1].rect.x, live_x + 2.0);
    }

    #[test]
    fn test_bounce_reverses_and_drops() {
        let mut g = grid(2);
        // Push the formation against the left edge.
        let shift = g.bounds.unwrap().left() - 10.0;
        for e in &mut g.enemies {
            e.rect.x -= shift;
        }
        g.recalc_bounds();
        let y_before = g.bounds.unwrap().top();

        g.maybe_bounce(1000, 0.0);
        assert_eq!(g.direction, -1);
        assert_eq!(g.bounds.unwrap().top(), y_before + g.drop);
    }

    #[test]
    fn test_bounce_is_debounced() {
        let mut g = grid(2);
        let shift = g.bounds.unwrap().left() - 10.0;
        for e in &mut g.enemies {
            e.rect.x -= shift;
        }
        g.recalc_bounds();

        g.maybe_bounce(1000, 0.0);
        assert_eq!(g.direction, -1);
        // Still inside the margin, but within the cooldown window.
        g.maybe_bounce(1200, 0.0);
        g.maybe_bounce(1399, 0.0);
        assert_eq!(g.direction, -1);
        // Cooldown elapsed.
        g.maybe_bounce(1400, 0.0);
        assert_eq!(g.direction, 1);
    }

    #[test]
    fn test_assign_shooters_caps_at_alive_count() {
        let cfg = config();
        let mut g = grid(4);
        g.assign_shooters(0, 1, &cfg);
        let shooters = g.enemies.iter().filter(|e| e.can_shoot).count();
        assert_eq!(shooters, cfg.enemy_shooters_per_level);

        let mut small = grid(1);
        for e in small.enemies.iter_mut().skip(3) {
            e.alive = false;
        }
        small.assign_shooters(0, 1, &cfg);
        let shooters = small
            .enemies
            .iter()
            .filter(|e| e.alive && e.can_shoot)
            .count();
        assert_eq!(shooters, 3);
        assert!(small.enemies.iter().all(|e| e.alive || !e.can_shoot));
    }

    #[test]
    fn test_shot_schedule_within_scaled_interval() {
        let cfg = config();
        let mut g = grid(4);
        let level = 11;
        g.assign_shooters(10_000, level, &cfg);
        let rate = (1.0 - 0.03 * (level - 1) as f64).max(0.7);
        let min = 10_000 + (cfg.enemy_shoot_min_ms as f64 * rate) as u64;
        let max = 10_000 + (cfg.enemy_shoot_max_ms as f64 * rate) as u64;
        for e in g.enemies.iter().filter(|e| e.can_shoot) {
            assert!(e.next_shot_at_ms >= min && e.next_shot_at_ms <= max);
        }
    }

    #[test]
    fn test_interval_scaling_floors_at_seventy_percent() {
        let cfg = config();
        let mut g = grid(4);
        g.assign_shooters(0, 100, &cfg);
        let floor_min = (cfg.enemy_shoot_min_ms as f64 * 0.7) as u64;
        for e in g.enemies.iter().filter(|e| e.can_shoot) {
            assert!(e.next_shot_at_ms >= floor_min);
        }
    }

    #[test]
    fn test_collect_shots_fires_due_shooters_and_reschedules() {
        let cfg = config();
        let mut g = grid(4);
        g.assign_shooters(0, 1, &cfg);
        // Well past every possible schedule.
        let now = cfg.enemy_shoot_max_ms + 1;
        let shots = g.collect_shots(now);
        assert_eq!(shots.len(), cfg.enemy_shooters_per_level);
        for e in g.enemies.iter().filter(|e| e.can_shoot) {
            assert!(e.next_shot_at_ms > now);
        }
        // Immediately after, nothing is due.
        assert!(g.collect_shots(now + 1).is_empty());
    }

    #[test]
    fn test_non_shooters_never_fire() {
        let mut g = grid(2);
        // No assign_shooters call: nobody may fire, ever.
        assert!(g.collect_shots(u64::MAX - 1).is_empty());
    }

    #[test]
    fn test_reached_bottom_threshold() {
        let cfg = config();
        let mut g = grid(2);
        assert!(!g.any_reached_bottom());
        g.enemies[0].rect.y = cfg.field_height - cfg.bottom_margin - g.enemies[0].rect.h;
        assert!(g.any_reached_bottom());
    }

    #[test]
    fn test_nudge_up_moves_formation() {
        let mut g = grid(2);
        let top = g.bounds.unwrap().top();
        g.nudge_up(36.0);
        assert_eq!(g.bounds.unwrap().top(), top - 36.0);
    }

    #[cfg(test)]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_bounds_always_union_of_alive(
                kills in prop::collection::vec(0usize..36, 0..36),
                frames in 1u64..120
            ) {
                let mut g = grid(4);
                for k in kills {
                    g.enemies[k].alive = false;
                }
                g.recalc_bounds();
                let mut now = 0;
                for _ in 0..frames {
                    now += 16;
                    g.update(now);
                    prop_assert_eq!(g.bounds, manual_union(&g));
                }
            }

            #[test]
            fn test_bounces_never_closer_than_cooldown(
                frames in 1u64..400
            ) {
                let mut g = EnemyGrid::new(
                    &config(),
                    2,
                    8.0,
                    MovementStrategy::ZigZag { amplitude: 3.0, speed_add: 0.0 },
                );
                let mut now = 0;
                let mut last_dir = g.direction;
                let mut last_flip: Option<u64> = None;
                for _ in 0..frames {
                    now += 16;
                    g.update(now);
                    if g.direction != last_dir {
                        if let Some(prev) = last_flip {
                            prop_assert!(now - prev >= g.bounce_cooldown_ms);
                        }
                        last_flip = Some(now);
                        last_dir = g.direction;
                    }
                }
            }
        }
    }
}
