use crate::shots::ShotRecord;

// Wyscout-style 0..100 frame, attacked goal at (100, 50).
const GOAL_X: f64 = 100.0;
const GOAL_Y: f64 = 50.0;

// Rough penalty-area proxy in the same frame.
const BOX_MIN_X: f64 = 83.0;
const BOX_MIN_Y: f64 = 21.0;
const BOX_MAX_Y: f64 = 79.0;
const CENTRAL_MIN_Y: f64 = 35.0;
const CENTRAL_MAX_Y: f64 = 65.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LocationFeatures {
    pub dist_to_goal: Option<f64>,
    pub inside_box: bool,
    pub central_box: bool,
}

pub fn distance_to_goal(x: Option<f64>, y: Option<f64>) -> Option<f64> {
    let (x, y) = coords(x, y)?;
    Some(((GOAL_X - x).powi(2) + (GOAL_Y - y).powi(2)).sqrt())
}

pub fn inside_box(x: Option<f64>, y: Option<f64>) -> bool {
    coords(x, y).is_some_and(|(x, y)| x >= BOX_MIN_X && (BOX_MIN_Y..=BOX_MAX_Y).contains(&y))
}

pub fn central_box(x: Option<f64>, y: Option<f64>) -> bool {
    coords(x, y)
        .is_some_and(|(x, y)| x >= BOX_MIN_X && (CENTRAL_MIN_Y..=CENTRAL_MAX_Y).contains(&y))
}

pub fn location_features(shot: &ShotRecord) -> LocationFeatures {
    LocationFeatures {
        dist_to_goal: distance_to_goal(shot.x, shot.y),
        inside_box: inside_box(shot.x, shot.y),
        central_box: central_box(shot.x, shot.y),
    }
}

fn coords(x: Option<f64>, y: Option<f64>) -> Option<(f64, f64)> {
    let (Some(x), Some(y)) = (x, y) else {
        return None;
    };
    if !x.is_finite() || !y.is_finite() {
        return None;
    }
    Some((x, y))
}

#[cfg(test)]
mod tests {
    use super::{central_box, distance_to_goal, inside_box};

    #[test]
    fn box_edges_are_inclusive() {
        assert!(inside_box(Some(90.0), Some(50.0)));
        assert!(inside_box(Some(83.0), Some(21.0)));
        assert!(inside_box(Some(83.0), Some(79.0)));
        assert!(!inside_box(Some(82.9), Some(50.0)));
        assert!(!inside_box(Some(50.0), Some(50.0)));
        assert!(!inside_box(Some(90.0), Some(10.0)));
    }

    #[test]
    fn central_box_is_narrower_than_box() {
        assert!(central_box(Some(95.0), Some(40.0)));
        assert!(inside_box(Some(95.0), Some(25.0)));
        assert!(!central_box(Some(95.0), Some(25.0)));
    }

    #[test]
    fn distance_is_euclidean_to_goal_mouth() {
        assert_eq!(distance_to_goal(Some(100.0), Some(50.0)), Some(0.0));
        let d = distance_to_goal(Some(97.0), Some(46.0)).unwrap();
        assert!((d - 5.0).abs() < 1e-12);
    }

    #[test]
    fn missing_coordinates_never_error() {
        assert_eq!(distance_to_goal(None, Some(50.0)), None);
        assert_eq!(distance_to_goal(Some(90.0), None), None);
        assert!(!inside_box(None, Some(50.0)));
        assert!(!central_box(Some(90.0), None));
        assert!(!inside_box(Some(f64::NAN), Some(50.0)));
    }

    #[test]
    fn infinite_coordinates_count_as_missing() {
        assert_eq!(distance_to_goal(Some(f64::INFINITY), Some(50.0)), None);
        assert!(!inside_box(Some(f64::INFINITY), Some(50.0)));
        assert!(!central_box(Some(95.0), Some(f64::NEG_INFINITY)));
        let shot = crate::shots::ShotRecord {
            x: Some(f64::INFINITY),
            y: Some(50.0),
            ..Default::default()
        };
        assert_eq!(super::location_features(&shot), super::LocationFeatures::default());
    }
}
