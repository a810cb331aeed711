use rand::seq::SliceRandom;
use std::time::SystemTime;

/// Seconds of simulated time per runner tick.
const STEP: f64 = 0.25;

/// One spark of the burst shown after a solved idiom.
#[derive(Debug, Clone)]
pub struct Spark {
    pub x: f64,
    pub y: f64,
    pub vel_x: f64,
    pub vel_y: f64,
    pub symbol: char,
    pub color_index: usize,
    pub age: f64,
    pub max_age: f64,
    pub is_glyph: bool, // idiom characters settle into formation; sparks fall
    pub target_x: f64,
    pub target_y: f64,
}

impl Spark {
    fn new(x: f64, y: f64) -> Self {
        use rand::Rng;
        let mut rng = rand::thread_rng();

        Self {
            x,
            y,
            vel_x: rng.gen_range(-5.0..5.0),
            vel_y: rng.gen_range(-3.5..-0.5),
            symbol: *['✦', '✳', '❀', '☆', '✺', '❉']
                .choose(&mut rng)
                .unwrap_or(&'✦'),
            color_index: rng.gen_range(0..7),
            age: 0.0,
            max_age: rng.gen_range(1.5..3.0),
            is_glyph: false,
            target_x: x,
            target_y: y,
        }
    }

    fn new_glyph(x: f64, y: f64, target_x: f64, target_y: f64, symbol: char, color: usize) -> Self {
        use rand::Rng;
        let mut rng = rand::thread_rng();

        Self {
            x,
            y,
            vel_x: (target_x - x) * 1.2,
            vel_y: (target_y - y) * 1.2,
            symbol,
            color_index: color,
            age: 0.0,
            max_age: rng.gen_range(2.5..4.0),
            is_glyph: true,
            target_x,
            target_y,
        }
    }

    fn advance(&mut self, dt: f64) -> bool {
        if self.is_glyph {
            let dist = ((self.target_x - self.x).powi(2) + (self.target_y - self.y).powi(2)).sqrt();
            if dist > 1.0 {
                self.x += self.vel_x * dt;
                self.y += self.vel_y * dt;
                self.vel_x *= 0.9;
                self.vel_y *= 0.9;
            } else {
                self.x = self.target_x;
                self.y = self.target_y;
                self.vel_x = 0.0;
                self.vel_y = 0.0;
            }
        } else {
            self.x += self.vel_x * dt;
            self.y += self.vel_y * dt;
            self.vel_y += 9.0 * dt; // gravity
        }

        self.age += dt;
        self.age < self.max_age
    }
}

/// Burst animation fired on a correct match: decorative sparks scatter and
/// fall while the four solved characters fly into a row at the center.
/// Presentation only; the game has already moved on to the next board.
#[derive(Debug)]
pub struct Celebration {
    pub sparks: Vec<Spark>,
    pub start_time: SystemTime,
    pub duration: f64,
    pub is_active: bool,
    pub width: f64,
    pub height: f64,
}

impl Celebration {
    pub fn new() -> Self {
        Self {
            sparks: Vec::new(),
            start_time: SystemTime::now(),
            duration: 2.5,
            is_active: false,
            width: 80.0,
            height: 24.0,
        }
    }

    pub fn start(&mut self, width: u16, height: u16, idiom: &str) {
        use rand::Rng;
        let mut rng = rand::thread_rng();

        self.sparks.clear();
        self.start_time = SystemTime::now();
        self.is_active = true;
        self.width = width as f64;
        self.height = height as f64;

        let center_x = width as f64 / 2.0;
        let center_y = height as f64 / 2.0;

        self.form_idiom(idiom, center_x, center_y, &mut rng);

        for _ in 0..20 {
            let offset_x = rng.gen_range(-12.0..12.0);
            let offset_y = rng.gen_range(-6.0..6.0);
            self.sparks
                .push(Spark::new(center_x + offset_x, center_y + offset_y));
        }
    }

    fn form_idiom(
        &mut self,
        idiom: &str,
        center_x: f64,
        center_y: f64,
        rng: &mut rand::rngs::ThreadRng,
    ) {
        use rand::Rng;

        // CJK glyphs render two columns wide, plus a column of breathing room
        let glyph_width = 3.0;
        let count = idiom.chars().count();
        if count == 0 {
            return;
        }
        let row_width = (count as f64 - 1.0) * glyph_width;
        let start_x = center_x - row_width / 2.0;

        for (i, ch) in idiom.chars().enumerate() {
            let target_x = start_x + (i as f64 * glyph_width);
            let target_y = center_y - 2.0;

            let from_x = center_x + rng.gen_range(-10.0..10.0);
            let from_y = center_y + rng.gen_range(-4.0..4.0);
            let color = rng.gen_range(0..7);

            self.sparks
                .push(Spark::new_glyph(from_x, from_y, target_x, target_y, ch, color));
        }
    }

    pub fn update(&mut self) {
        if !self.is_active {
            return;
        }

        let elapsed = self.start_time.elapsed().unwrap_or_default().as_secs_f64();
        if elapsed >= self.duration {
            self.is_active = false;
            self.sparks.clear();
            return;
        }

        let (width, height) = (self.width, self.height);
        self.sparks.retain_mut(|spark| {
            let still_alive = spark.advance(STEP);

            if spark.is_glyph {
                still_alive
            } else {
                // Sparks that left the screen are done; allow a small buffer
                let buffer = 4.0;
                let off_screen =
                    spark.y > height + buffer || spark.x < -buffer || spark.x > width + buffer;
                still_alive && !off_screen
            }
        });
    }
}

impl Default for Celebration {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sparks_fall_under_gravity() {
        let mut spark = Spark::new(10.0, 10.0);
        let initial_y = spark.y;
        let initial_vel_y = spark.vel_y;

        let still_alive = spark.advance(STEP);

        assert!(still_alive);
        assert_ne!(spark.y, initial_y);
        assert!(spark.vel_y > initial_vel_y);
    }

    #[test]
    fn glyphs_settle_on_their_target() {
        let mut glyph = Spark::new_glyph(0.0, 0.0, 9.0, 4.0, '畫', 0);

        assert!(glyph.is_glyph);
        assert_eq!(glyph.symbol, '畫');

        for _ in 0..20 {
            glyph.advance(STEP);
        }

        let dist = ((glyph.target_x - glyph.x).powi(2) + (glyph.target_y - glyph.y).powi(2)).sqrt();
        assert!(dist < 4.0, "glyph should close in on its target");
    }

    #[test]
    fn start_builds_glyphs_and_sparks() {
        let mut celebration = Celebration::new();

        assert!(!celebration.is_active);
        assert!(celebration.sparks.is_empty());

        celebration.start(80, 24, "畫蛇添足");

        assert!(celebration.is_active);
        let glyphs: Vec<char> = celebration
            .sparks
            .iter()
            .filter(|s| s.is_glyph)
            .map(|s| s.symbol)
            .collect();
        assert_eq!(glyphs, vec!['畫', '蛇', '添', '足']);
        assert!(celebration.sparks.iter().any(|s| !s.is_glyph));
    }

    #[test]
    fn update_advances_the_burst() {
        let mut celebration = Celebration::new();
        celebration.start(80, 24, "守株待兔");

        let initial_positions: Vec<(f64, f64)> =
            celebration.sparks.iter().map(|s| (s.x, s.y)).collect();

        for _ in 0..3 {
            celebration.update();
        }

        let moved = celebration
            .sparks
            .iter()
            .zip(initial_positions.iter())
            .filter(|(s, &(x0, y0))| (s.x - x0).abs() > 0.1 || (s.y - y0).abs() > 0.1)
            .count();
        assert!(moved > 0, "sparks should move after updates");
        assert!(celebration.is_active);
    }

    #[test]
    fn off_screen_sparks_are_dropped() {
        let mut celebration = Celebration::new();
        celebration.start(20, 10, "一石二鳥");

        celebration.sparks.push(Spark::new(200.0, 200.0));

        for _ in 0..8 {
            celebration.update();
        }

        for spark in celebration.sparks.iter().filter(|s| !s.is_glyph) {
            assert!(
                spark.x >= -4.0 && spark.x <= 24.0 && spark.y <= 14.0,
                "spark at ({}, {}) should have been removed",
                spark.x,
                spark.y
            );
        }
    }

    #[test]
    fn inactive_update_is_a_no_op() {
        let mut celebration = Celebration::new();
        celebration.update();
        assert!(!celebration.is_active);
        assert!(celebration.sparks.is_empty());
    }
}
