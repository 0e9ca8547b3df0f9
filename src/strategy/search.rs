//! Map sweep planning
//!
//! Drag schedules for hunting troop markers on the world map: straight-line
//! sweeps in one direction, or an outward spiral from the starting view.
//! Only the geometry lives here; the runner owns the screenshot/match/drag
//! cycle.

use serde::{Deserialize, Serialize};

/// A planned drag in screen coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragPlan {
    pub start: (i32, i32),
    pub end: (i32, i32),
}

/// Direction to sweep the map in.
///
/// The name is the drag direction of the map content: sweeping `Up` drags
/// from above center to below center so the map slides down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SweepDirection {
    Up,
    Down,
    Left,
    Right,
}

impl SweepDirection {
    /// The drag that moves the view one step in this direction
    pub fn drag(self, center: (i32, i32), distance: i32) -> DragPlan {
        let (cx, cy) = center;
        let half = distance / 2;
        match self {
            SweepDirection::Up => DragPlan {
                start: (cx, cy - half),
                end: (cx, cy + half),
            },
            SweepDirection::Down => DragPlan {
                start: (cx, cy + half),
                end: (cx, cy - half),
            },
            SweepDirection::Left => DragPlan {
                start: (cx - half, cy),
                end: (cx + half, cy),
            },
            SweepDirection::Right => DragPlan {
                start: (cx + half, cy),
                end: (cx - half, cy),
            },
        }
    }
}

/// How to cover the map while searching
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPattern {
    /// Keep sweeping in one direction
    Directional(SweepDirection),
    /// Spiral outward from the starting view
    Spiral,
}

impl SearchPattern {
    /// The sequence of sweep directions this pattern produces
    pub fn directions(self) -> Box<dyn Iterator<Item = SweepDirection>> {
        match self {
            SearchPattern::Directional(direction) => {
                Box::new(std::iter::repeat(direction))
            }
            SearchPattern::Spiral => Box::new(SpiralSchedule::new()),
        }
    }
}

/// Infinite spiral sweep schedule.
///
/// Directions cycle right, down, left, up; the number of sweeps per side
/// grows by one after every two sides, covering rings of increasing size:
/// R, D, L, L, U, U, R, R, R, ...
#[derive(Debug, Clone)]
pub struct SpiralSchedule {
    direction_index: usize,
    steps_per_side: u32,
    steps_taken: u32,
    side_changes: u32,
}

impl SpiralSchedule {
    const DIRECTIONS: [SweepDirection; 4] = [
        SweepDirection::Right,
        SweepDirection::Down,
        SweepDirection::Left,
        SweepDirection::Up,
    ];

    /// Start a new spiral from the current view
    pub fn new() -> Self {
        Self {
            direction_index: 0,
            steps_per_side: 1,
            steps_taken: 0,
            side_changes: 0,
        }
    }
}

impl Default for SpiralSchedule {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for SpiralSchedule {
    type Item = SweepDirection;

    fn next(&mut self) -> Option<SweepDirection> {
        let direction = Self::DIRECTIONS[self.direction_index];

        self.steps_taken += 1;
        if self.steps_taken == self.steps_per_side {
            self.direction_index = (self.direction_index + 1) % 4;
            self.steps_taken = 0;
            self.side_changes += 1;
            if self.side_changes == 2 {
                self.steps_per_side += 1;
                self.side_changes = 0;
            }
        }

        Some(direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drag_geometry() {
        let center = (960, 540);
        let up = SweepDirection::Up.drag(center, 300);
        assert_eq!(up.start, (960, 390));
        assert_eq!(up.end, (960, 690));

        let right = SweepDirection::Right.drag(center, 300);
        assert_eq!(right.start, (1110, 540));
        assert_eq!(right.end, (810, 540));
    }

    #[test]
    fn test_spiral_ring_growth() {
        use SweepDirection::*;

        let schedule = SpiralSchedule::new();
        let first: Vec<_> = schedule.take(12).collect();
        assert_eq!(
            first,
            vec![Right, Down, Left, Left, Up, Up, Right, Right, Right, Down, Down, Down]
        );
    }

    #[test]
    fn test_directional_pattern_repeats() {
        let directions: Vec<_> = SearchPattern::Directional(SweepDirection::Left)
            .directions()
            .take(5)
            .collect();
        assert_eq!(directions, vec![SweepDirection::Left; 5]);
    }

    #[test]
    fn test_spiral_pattern_matches_schedule() {
        let from_pattern: Vec<_> = SearchPattern::Spiral.directions().take(6).collect();
        let from_schedule: Vec<_> = SpiralSchedule::new().take(6).collect();
        assert_eq!(from_pattern, from_schedule);
    }
}
