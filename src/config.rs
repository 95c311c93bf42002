/// All gameplay tuning in one place, built once at startup and passed by
/// reference into factories and state constructors.
///
/// Distances and speeds are in logical pixels on an 800x600 playfield;
/// the renderer scales to terminal cells. Speeds are per-frame at the
/// fixed 60 Hz timestep, intervals are milliseconds.
#[derive(Debug, Clone, Copy)]
pub struct GameConfig {
    pub field_width: f32,
    pub field_height: f32,

    // Player
    pub player_speed: f32,
    pub player_size: (f32, f32),
    pub player_margin: f32,

    // Bullets
    pub bullet_speed: f32,
    pub bullet_size: (f32, f32),
    pub max_bullets: usize,
    pub fire_cooldown_ms: u64,

    // Power-ups
    pub powerup_every_n_levels: u32,
    pub min_fire_cooldown_ms: u64,
    pub max_bullets_cap: usize,
    pub shot_count_base: usize,
    pub shot_count_max: usize,
    pub shot_spread: f32,

    // Enemy formation
    pub enemy_cols: usize,
    pub enemy_rows: usize,
    pub enemy_rows_cap: usize,
    pub enemy_size: (f32, f32),
    pub enemy_x_speed: f32,
    pub enemy_x_speed_ramp: f32,
    pub enemy_drop: f32,
    pub enemy_drop_floor: f32,
    pub grid_origin: (f32, f32),
    pub grid_gap: (f32, f32),
    pub side_margin: f32,
    pub bottom_margin: f32,
    pub bounce_cooldown_ms: u64,

    // Enemy shooting
    pub enemy_shooters_per_level: usize,
    pub enemy_shoot_min_ms: u64,
    pub enemy_shoot_max_ms: u64,
    pub enemy_bullet_speed: f32,

    // FX / feedback
    pub explosion_ms: u64,
    pub hurt_shake_ms: u64,
    pub hurt_shake_mag: f32,

    // Scoring and lives
    pub score_per_enemy: u32,
    pub level_clear_bonus: u32,
    pub lives: u32,
    pub max_lives: u32,

    // Health drops
    pub health_drop_chance: f64,
    pub health_drop_speed: f32,
    pub pickup_size: (f32, f32),

    // Boss
    pub boss_every_n_levels: u32,
    pub boss_size: (f32, f32),
    pub boss_base_hp: i32,
    pub boss_hp_per_cycle: i32,
    pub boss_x_speed: f32,
    pub boss_x_speed_per_cycle: f32,
    pub boss_bob_amplitude: f32,
    pub boss_bob_speed: f32,
    pub boss_shoot_min_ms: u64,
    pub boss_shoot_max_ms: u64,
    pub boss_bullet_speed: f32,
    pub boss_spread: f32,
    pub boss_kill_bonus: u32,

    // Profiles
    pub max_name_len: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            field_width: 800.0,
            field_height: 600.0,

            player_speed: 6.0,
            player_size: (50.0, 20.0),
            player_margin: 10.0,

            bullet_speed: -10.0,
            bullet_size: (4.0, 12.0),
            max_bullets: 4,
            fire_cooldown_ms: 250,

            powerup_every_n_levels: 2,
            min_fire_cooldown_ms: 90,
            max_bullets_cap: 6,
            shot_count_base: 1,
            shot_count_max: 2,
            shot_spread: 14.0,

            enemy_cols: 9,
            enemy_rows: 4,
            enemy_rows_cap: 6,
            enemy_size: (40.0, 24.0),
            enemy_x_speed: 2.0,
            enemy_x_speed_ramp: 0.25,
            enemy_drop: 18.0,
            enemy_drop_floor: 12.0,
            grid_origin: (60.0, 80.0),
            grid_gap: (20.0, 18.0),
            side_margin: 20.0,
            bottom_margin: 80.0,
            bounce_cooldown_ms: 400,

            enemy_shooters_per_level: 7,
            enemy_shoot_min_ms: 1800,
            enemy_shoot_max_ms: 3200,
            enemy_bullet_speed: 6.0,

            explosion_ms: 220,
            hurt_shake_ms: 260,
            hurt_shake_mag: 6.0,

            score_per_enemy: 50,
            level_clear_bonus: 250,
            lives: 3,
            max_lives: 5,

            health_drop_chance: 0.06,
            health_drop_speed: 3.5,
            pickup_size: (24.0, 24.0),

            boss_every_n_levels: 5,
            boss_size: (150.0, 84.0),
            boss_base_hp: 20,
            boss_hp_per_cycle: 8,
            boss_x_speed: 2.0,
            boss_x_speed_per_cycle: 0.2,
            boss_bob_amplitude: 6.0,
            boss_bob_speed: 0.02,
            boss_shoot_min_ms: 700,
            boss_shoot_max_ms: 1200,
            boss_bullet_speed: 5.0,
            boss_spread: 20.0,
            boss_kill_bonus: 500,

            max_name_len: 12,
        }
    }
}
