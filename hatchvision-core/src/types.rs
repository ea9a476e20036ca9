use serde::{Deserialize, Serialize};
use std::fmt;

/// Side of the slot centerline the robot sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
    Center,
}

impl Direction {
    /// Direction of a signed offset. Only an exact zero is `Center`.
    pub fn of(offset: f64) -> Self {
        if offset > 0.0 {
            Direction::Left
        } else if offset < 0.0 {
            Direction::Right
        } else {
            Direction::Center
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Center => "center",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Signed physical offset from the slot centerline.
///
/// Positive values mean the robot is left of center, in the same length
/// units as the configured target separation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Offset {
    pub value: f64,
    pub direction: Direction,
}

impl Offset {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            direction: Direction::of(value),
        }
    }

    /// Unsigned distance from center
    pub fn magnitude(&self) -> f64 {
        self.value.abs()
    }
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            Direction::Center => write!(f, "centered"),
            direction => write!(f, "{:.2} {} of center", self.magnitude(), direction),
        }
    }
}

/// Robot operating mode, read from the shared store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RobotMode {
    /// Pre-programmed start of a match (the "sandstorm" period)
    Autonomous,
    /// Driver-controlled
    Teleop,
}

impl RobotMode {
    /// Decode the numeric `isTeleop` flag; any nonzero value is teleop.
    pub fn from_flag(flag: f64) -> Self {
        if flag != 0.0 {
            RobotMode::Teleop
        } else {
            RobotMode::Autonomous
        }
    }
}

/// Inclusive HSV threshold window, OpenCV 8-bit convention (H in 0..180)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HsvBounds {
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}

impl Default for HsvBounds {
    fn default() -> Self {
        Self {
            lower: [113, 0, 197],
            upper: [157, 10, 255],
        }
    }
}

impl HsvBounds {
    pub fn new(lower: [u8; 3], upper: [u8; 3]) -> Self {
        Self { lower, upper }
    }

    /// True when `lower <= upper` on every channel
    pub fn is_ordered(&self) -> bool {
        self.lower.iter().zip(self.upper.iter()).all(|(lo, hi)| lo <= hi)
    }

    #[inline]
    pub fn contains(&self, hsv: [u8; 3]) -> bool {
        (0..3).all(|c| hsv[c] >= self.lower[c] && hsv[c] <= self.upper[c])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_of_sign() {
        assert_eq!(Direction::of(1.4375), Direction::Left);
        assert_eq!(Direction::of(-0.01), Direction::Right);
        assert_eq!(Direction::of(0.0), Direction::Center);
        assert_eq!(Direction::of(-0.0), Direction::Center);
    }

    #[test]
    fn test_direction_display() {
        assert_eq!(Direction::Left.to_string(), "left");
        assert_eq!(Direction::Right.to_string(), "right");
        assert_eq!(Direction::Center.to_string(), "center");
    }

    #[test]
    fn test_offset_new_derives_direction() {
        let offset = Offset::new(-2.5);
        assert_eq!(offset.direction, Direction::Right);
        assert_eq!(offset.magnitude(), 2.5);
        assert_eq!(offset.to_string(), "2.50 right of center");
        assert_eq!(Offset::new(0.0).to_string(), "centered");
    }

    #[test]
    fn test_robot_mode_from_flag() {
        assert_eq!(RobotMode::from_flag(1.0), RobotMode::Teleop);
        assert_eq!(RobotMode::from_flag(0.0), RobotMode::Autonomous);
        assert_eq!(RobotMode::from_flag(-1.0), RobotMode::Teleop);
    }

    #[test]
    fn test_hsv_bounds_contains_inclusive() {
        let bounds = HsvBounds::new([10, 20, 30], [40, 50, 60]);
        assert!(bounds.contains([10, 20, 30]));
        assert!(bounds.contains([40, 50, 60]));
        assert!(!bounds.contains([9, 20, 30]));
        assert!(!bounds.contains([40, 51, 60]));
    }

    #[test]
    fn test_hsv_bounds_ordering() {
        assert!(HsvBounds::default().is_ordered());
        assert!(!HsvBounds::new([50, 0, 0], [40, 255, 255]).is_ordered());
    }

    #[test]
    fn test_direction_serde_lowercase() {
        let json = serde_json::to_string(&Direction::Left).unwrap();
        assert_eq!(json, "\"left\"");
    }
}
