//! Battle-field geometry
//!
//! The playing field sits in a centered box covering 80% of the frame width
//! and 60% of its height, split into three lanes. Defensive placements go
//! deep in our side of a lane, offensive placements go up near the enemy
//! side.

use rand::Rng;

/// The rectangular battle area inside a frame, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BattleArea {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

impl BattleArea {
    /// Derive the battle area from the frame size
    pub fn from_frame(frame_width: u32, frame_height: u32) -> Self {
        let width = (frame_width as f32 * 0.8) as i32;
        let height = (frame_height as f32 * 0.6) as i32;
        Self {
            left: (frame_width as i32 - width) / 2,
            top: (frame_height as i32 - height) / 2,
            width,
            height,
        }
    }

    /// Width of one of the three lanes
    pub fn lane_width(&self) -> i32 {
        self.width / 3
    }

    /// Horizontal center of a lane (0..=2)
    fn lane_center_x(&self, lane: usize) -> i32 {
        self.left + self.lane_width() * lane as i32 + self.lane_width() / 2
    }

    /// Placement anchors near our own side, one per lane
    pub fn defense_anchors(&self) -> [(i32, i32); 3] {
        let y = self.top + (self.height as f32 * 0.7) as i32;
        [
            (self.lane_center_x(0), y),
            (self.lane_center_x(1), y),
            (self.lane_center_x(2), y),
        ]
    }

    /// Placement anchors near the enemy side, one per lane
    pub fn offense_anchors(&self) -> [(i32, i32); 3] {
        let y = self.top + (self.height as f32 * 0.3) as i32;
        [
            (self.lane_center_x(0), y),
            (self.lane_center_x(1), y),
            (self.lane_center_x(2), y),
        ]
    }

    /// Center of the battle area
    pub fn center(&self) -> (i32, i32) {
        (self.left + self.width / 2, self.top + self.height / 2)
    }

    /// Whether a point lies inside the area (edges included)
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.left
            && x <= self.left + self.width
            && y >= self.top
            && y <= self.top + self.height
    }

    /// A uniformly random point inside the area
    pub fn random_point<R: Rng>(&self, rng: &mut R) -> (i32, i32) {
        (
            self.left + rng.random_range(0..=self.width),
            self.top + rng.random_range(0..=self.height),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_area_is_centered() {
        let area = BattleArea::from_frame(1920, 1080);

        assert_eq!(area.width, 1536); // 80% of 1920
        assert_eq!(area.height, 648); // 60% of 1080
        assert_eq!(area.left, 192);
        assert_eq!(area.top, 216);
        assert_eq!(area.center(), (960, 540));
    }

    #[test]
    fn test_anchor_depths() {
        let area = BattleArea::from_frame(1920, 1080);
        let defense = area.defense_anchors();
        let offense = area.offense_anchors();

        // Defense sits deeper in our half than offense
        assert!(defense[0].1 > offense[0].1);
        // Lanes are ordered left to right with equal spacing
        assert!(defense[0].0 < defense[1].0 && defense[1].0 < defense[2].0);
        assert_eq!(defense[1].0 - defense[0].0, defense[2].0 - defense[1].0);

        for &(x, y) in defense.iter().chain(offense.iter()) {
            assert!(area.contains(x, y));
        }
    }

    #[test]
    fn test_random_points_stay_inside() {
        let area = BattleArea::from_frame(1280, 720);
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..100 {
            let (x, y) = area.random_point(&mut rng);
            assert!(area.contains(x, y));
        }
    }
}
