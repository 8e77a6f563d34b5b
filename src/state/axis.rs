//! Analog stick handling: direction keys or proportional cursor motion.

use std::str::FromStr;
use std::time::{Duration, Instant};

use smallvec::SmallVec;

use super::types::{Action, Axis, KeyCode, KeyStroke};

/// What the analog sticks drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StickMode {
    /// Direction keys with a per-direction cool-down.
    #[default]
    Keys,
    /// Relative cursor motion.
    Cursor,
    /// Axes are tracked but never acted on.
    Off,
}

impl FromStr for StickMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "keys" | "arrows" => Ok(StickMode::Keys),
            "cursor" | "mouse" => Ok(StickMode::Cursor),
            "off" | "none" => Ok(StickMode::Off),
            _ => Err(anyhow::anyhow!("Invalid stick mode: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Direction {
    Up = 0,
    Down = 1,
    Left = 2,
    Right = 3,
}

impl Direction {
    fn key(self) -> KeyCode {
        match self {
            Direction::Up => KeyCode::Up,
            Direction::Down => KeyCode::Down,
            Direction::Left => KeyCode::Left,
            Direction::Right => KeyCode::Right,
        }
    }
}

const STICKS: [(Axis, Axis); 2] = [(Axis::LeftX, Axis::LeftY), (Axis::RightX, Axis::RightY)];

pub struct AxisMapper {
    /// Left stick, right stick.
    modes: [StickMode; 2],
    threshold: f32,
    cooldown: Duration,
    speed: f32,
    deadzone: f32,
    values: [f32; Axis::COUNT],
    /// Last emission per stick and direction.
    last_fired: [[Option<Instant>; 4]; 2],
}

impl AxisMapper {
    pub fn new(
        modes: [StickMode; 2],
        threshold: f32,
        cooldown: Duration,
        speed: f32,
        deadzone: f32,
    ) -> Self {
        Self {
            modes,
            threshold,
            cooldown,
            speed,
            deadzone,
            values: [0.0; Axis::COUNT],
            last_fired: [[None; 4]; 2],
        }
    }

    #[inline(always)]
    pub fn modes(&self) -> [StickMode; 2] {
        self.modes
    }

    /// Whether either stick moves the cursor.
    #[inline]
    pub fn drives_cursor(&self) -> bool {
        self.modes.contains(&StickMode::Cursor)
    }

    /// Stores the latest value of an axis, clamped to [-1, 1].
    #[inline]
    pub fn set(&mut self, axis: Axis, value: f32) {
        self.values[axis.index()] = value.clamp(-1.0, 1.0);
    }

    #[inline(always)]
    pub fn value(&self, axis: Axis) -> f32 {
        self.values[axis.index()]
    }

    /// Zeroes every axis and forgets cool-downs.
    pub fn reset(&mut self) {
        self.values = [0.0; Axis::COUNT];
        self.last_fired = [[None; 4]; 2];
    }

    /// Computes the actions due at `now` from the current axis values.
    pub fn tick(&mut self, now: Instant) -> SmallVec<[Action; 4]> {
        let mut actions = SmallVec::new();

        for (stick, (x_axis, y_axis)) in STICKS.iter().enumerate() {
            let x = self.values[x_axis.index()];
            let y = self.values[y_axis.index()];

            match self.modes[stick] {
                StickMode::Keys => self.tick_keys(stick, x, y, now, &mut actions),
                StickMode::Cursor => self.tick_cursor(x, y, &mut actions),
                StickMode::Off => {}
            }
        }

        actions
    }

    fn tick_keys(
        &mut self,
        stick: usize,
        x: f32,
        y: f32,
        now: Instant,
        actions: &mut SmallVec<[Action; 4]>,
    ) {
        let horizontal = if x > self.threshold {
            Some(Direction::Right)
        } else if x < -self.threshold {
            Some(Direction::Left)
        } else {
            None
        };
        let vertical = if y > self.threshold {
            Some(Direction::Down)
        } else if y < -self.threshold {
            Some(Direction::Up)
        } else {
            None
        };

        // Released directions fire again immediately on the next push
        for dir in [Direction::Up, Direction::Down, Direction::Left, Direction::Right] {
            let engaged = matches!(
                (dir, horizontal, vertical),
                (Direction::Left, Some(Direction::Left), _)
                    | (Direction::Right, Some(Direction::Right), _)
                    | (Direction::Up, _, Some(Direction::Up))
                    | (Direction::Down, _, Some(Direction::Down))
            );
            if !engaged {
                self.last_fired[stick][dir as usize] = None;
            }
        }

        for dir in [vertical, horizontal].into_iter().flatten() {
            let slot = &mut self.last_fired[stick][dir as usize];
            let due = match slot {
                Some(last) => now.saturating_duration_since(*last) >= self.cooldown,
                None => true,
            };
            if due {
                *slot = Some(now);
                actions.push(Action::Key(KeyStroke::single(dir.key())));
            }
        }
    }

    fn tick_cursor(&self, x: f32, y: f32, actions: &mut SmallVec<[Action; 4]>) {
        if x.abs() > self.deadzone || y.abs() > self.deadzone {
            let dx = (x * self.speed).round() as i32;
            let dy = (y * self.speed).round() as i32;
            if dx != 0 || dy != 0 {
                actions.push(Action::MoveCursor { dx, dy });
            }
        }
    }
}
