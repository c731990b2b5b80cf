// src/tracker.rs - Gesture state tracker: maps per-frame hand samples onto
// a smoothed object transform (translate / scale / rotate).
use nalgebra::Vector3;

use crate::hand::HandSample;

/// Central region of the camera frame in which the one-shot calibration
/// may fire, in normalized coordinates.
const CALIBRATION_ZONE: std::ops::RangeInclusive<f32> = 0.3..=0.7;

/// Degrees of Y rotation per unit of vertical fingertip offset.
const ROTATION_GAIN: f32 = 100.0;

#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Blend weight `d` in the exponential smoothing `new = (1-d)*old + d*target`.
    pub damping_factor: f32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            damping_factor: 0.2,
        }
    }
}

/// Drawing-ready output of one tracker update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    pub scale: f32,
    pub rotation_deg: f32,
}

/// Mutable tracking state, created once at startup and carried across frames.
#[derive(Debug, Clone)]
pub struct TrackerState {
    pub position: Vector3<f32>,
    pub scale: f32,
    pub rotation_deg: f32,
    pub calibration_offset: Vector3<f32>,
    pub calibrated: bool,
    /// Previous-frame position, read only by the two-hand blend.
    pub last_position: Vector3<f32>,
}

impl Default for TrackerState {
    fn default() -> Self {
        Self {
            position: Vector3::zeros(),
            scale: 1.0,
            rotation_deg: 0.0,
            calibration_offset: Vector3::zeros(),
            calibrated: false,
            last_position: Vector3::zeros(),
        }
    }
}

pub struct GestureTracker {
    config: TrackerConfig,
    state: TrackerState,
}

impl GestureTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            config,
            state: TrackerState::default(),
        }
    }

    pub fn state(&self) -> &TrackerState {
        &self.state
    }

    pub fn config_mut(&mut self) -> &mut TrackerConfig {
        &mut self.config
    }

    /// Consume one frame's hand samples and advance the state.
    ///
    /// Exactly one hand translates the object, two hands scale and rotate it,
    /// and anything else (no hands, or a detector glitch reporting more than
    /// two) decays the position back toward the origin while holding scale
    /// and rotation.
    pub fn update(&mut self, hands: &[HandSample]) -> Transform {
        match hands {
            [hand] => self.update_single(hand),
            [hand1, hand2] => self.update_dual(hand1, hand2),
            _ => self.update_idle(),
        }
        Transform {
            position: self.state.position,
            scale: self.state.scale,
            rotation_deg: self.state.rotation_deg,
        }
    }

    fn update_idle(&mut self) {
        let d = self.config.damping_factor;
        // Decay toward the origin; scale and rotation are held.
        self.state.position *= 1.0 - d;
    }

    fn update_single(&mut self, hand: &HandSample) {
        let d = self.config.damping_factor;
        let tip = hand.index_tip().to_vector();

        // One-shot calibration: latch the offset between the raw fingertip
        // and wherever the object currently sits, so the object does not
        // jump when tracking begins. Only fires with the fingertip near the
        // center of the frame, and never re-fires.
        if !self.state.calibrated
            && CALIBRATION_ZONE.contains(&tip.x)
            && CALIBRATION_ZONE.contains(&tip.y)
        {
            self.state.calibration_offset = tip - self.state.position;
            self.state.calibrated = true;
            tracing::info!(
                offset = ?self.state.calibration_offset,
                "calibration complete"
            );
        }

        let target = tip - self.state.calibration_offset;
        self.state.position = self.state.position * (1.0 - d) + target * d;
    }

    fn update_dual(&mut self, hand1: &HandSample, hand2: &HandSample) {
        let d = self.config.damping_factor;
        let tip1 = hand1.index_tip();
        let tip2 = hand2.index_tip();

        // Dual measurement: averaging fingertip and wrist separation keeps
        // the scale signal usable when individual fingers jitter.
        let spread = (tip1.distance_to(tip2) + hand1.wrist().distance_to(hand2.wrist())) / 2.0;
        self.state.scale = self.state.scale * (1.0 - d) + spread * d;

        let raw_center = Vector3::new(
            -(tip1.x + tip2.x) / 2.0,
            -(tip1.y + tip2.y) / 2.0,
            (tip1.z + tip2.z) / 2.0,
        );
        // Blend weights here are intentionally the mirror image of the
        // single-hand update: the raw center carries weight (1-d) and the
        // previous smoothed position carries weight d. Pinned by test.
        self.state.last_position = self.state.position;
        self.state.position = raw_center * (1.0 - d) + self.state.last_position * d;

        // Rotation follows the vertical fingertip offset directly, with no
        // smoothing or clamping.
        self.state.rotation_deg = (tip2.y - tip1.y) * ROTATION_GAIN;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hand::{Landmark, LANDMARK_COUNT};
    use approx::assert_relative_eq;

    /// Hand with the given index fingertip; every other landmark at the origin.
    fn hand_with_tip(x: f32, y: f32, z: f32) -> HandSample {
        let mut landmarks = [Landmark::default(); LANDMARK_COUNT];
        landmarks[8] = Landmark::new(x, y, z);
        HandSample::new(landmarks)
    }

    fn hand_at(wrist: Landmark, tip: Landmark) -> HandSample {
        let mut landmarks = [Landmark::default(); LANDMARK_COUNT];
        landmarks[0] = wrist;
        landmarks[8] = tip;
        HandSample::new(landmarks)
    }

    #[test]
    fn idle_updates_decay_position_to_origin() {
        let mut tracker = GestureTracker::new(TrackerConfig::default());
        tracker.state.position = Vector3::new(1.0, -2.0, 0.5);

        let mut previous_norm = tracker.state.position.norm();
        for _ in 0..200 {
            tracker.update(&[]);
            let norm = tracker.state.position.norm();
            assert!(norm <= previous_norm);
            previous_norm = norm;
        }
        assert_relative_eq!(tracker.state.position.norm(), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn idle_updates_hold_scale_and_rotation() {
        let mut tracker = GestureTracker::new(TrackerConfig::default());
        tracker.state.scale = 2.5;
        tracker.state.rotation_deg = 42.0;

        tracker.update(&[]);

        assert_eq!(tracker.state.scale, 2.5);
        assert_eq!(tracker.state.rotation_deg, 42.0);
    }

    #[test]
    fn calibration_latches_on_centered_fingertip() {
        let mut tracker = GestureTracker::new(TrackerConfig::default());
        tracker.update(&[hand_with_tip(0.5, 0.5, 0.1)]);

        let state = tracker.state();
        assert!(state.calibrated);
        assert_relative_eq!(state.calibration_offset.x, 0.5);
        assert_relative_eq!(state.calibration_offset.y, 0.5);
        assert_relative_eq!(state.calibration_offset.z, 0.1);
        // tip - offset == 0, so the object stays put at the origin.
        assert_relative_eq!(state.position.norm(), 0.0);
    }

    #[test]
    fn calibration_bakes_in_the_previous_position() {
        let mut tracker = GestureTracker::new(TrackerConfig::default());
        tracker.state.position = Vector3::new(0.1, 0.2, 0.0);

        tracker.update(&[hand_with_tip(0.5, 0.5, 0.0)]);

        let offset = tracker.state().calibration_offset;
        assert_relative_eq!(offset.x, 0.4);
        assert_relative_eq!(offset.y, 0.3);
        assert_relative_eq!(offset.z, 0.0);
    }

    #[test]
    fn calibration_does_not_fire_outside_center_zone() {
        let mut tracker = GestureTracker::new(TrackerConfig::default());
        for tip in [
            hand_with_tip(0.1, 0.5, 0.0),
            hand_with_tip(0.9, 0.5, 0.0),
            hand_with_tip(0.5, 0.2, 0.0),
            hand_with_tip(0.5, 0.8, 0.0),
        ] {
            tracker.update(&[tip]);
            assert!(!tracker.state().calibrated);
            assert_eq!(tracker.state().calibration_offset, Vector3::zeros());
        }
    }

    #[test]
    fn calibration_offset_is_write_once() {
        let mut tracker = GestureTracker::new(TrackerConfig::default());
        tracker.update(&[hand_with_tip(0.5, 0.5, 0.1)]);
        let first_offset = tracker.state().calibration_offset;

        // Another centered fingertip in a different spot must not recalibrate.
        for _ in 0..10 {
            tracker.update(&[hand_with_tip(0.6, 0.4, 0.2)]);
        }
        assert!(tracker.state().calibrated);
        assert_eq!(tracker.state().calibration_offset, first_offset);
    }

    #[test]
    fn single_hand_step_matches_damping_exactly() {
        let d = 0.2;
        let mut tracker = GestureTracker::new(TrackerConfig { damping_factor: d });
        tracker.state.calibrated = true;
        tracker.state.position = Vector3::new(0.3, -0.1, 0.05);
        let old = tracker.state.position;

        let tip = Vector3::new(0.9, 0.9, 0.3);
        tracker.update(&[hand_with_tip(tip.x, tip.y, tip.z)]);

        for axis in 0..3 {
            let step = (tracker.state.position[axis] - old[axis]).abs();
            assert_relative_eq!(step, d * (tip[axis] - old[axis]).abs(), epsilon = 1e-6);
        }
    }

    #[test]
    fn single_hand_holds_scale_and_rotation() {
        let mut tracker = GestureTracker::new(TrackerConfig::default());
        tracker.state.scale = 1.7;
        tracker.state.rotation_deg = -13.0;

        tracker.update(&[hand_with_tip(0.5, 0.5, 0.0)]);

        assert_eq!(tracker.state.scale, 1.7);
        assert_eq!(tracker.state.rotation_deg, -13.0);
    }

    #[test]
    fn scale_converges_to_constant_spread() {
        let mut tracker = GestureTracker::new(TrackerConfig::default());
        // Tips 0.4 apart, wrists 0.4 apart, all at y=z=0: spread = 0.4.
        let hand1 = hand_at(Landmark::new(0.3, 0.0, 0.0), Landmark::new(0.3, 0.0, 0.0));
        let hand2 = hand_at(Landmark::new(0.7, 0.0, 0.0), Landmark::new(0.7, 0.0, 0.0));

        for _ in 0..200 {
            tracker.update(&[hand1.clone(), hand2.clone()]);
        }
        assert_relative_eq!(tracker.state().scale, 0.4, epsilon = 1e-5);
    }

    #[test]
    fn rotation_is_instantaneous_and_unsmoothed() {
        let mut tracker = GestureTracker::new(TrackerConfig::default());
        tracker.state.rotation_deg = 9000.0;

        let hand1 = hand_with_tip(0.3, 0.2, 0.0);
        let hand2 = hand_with_tip(0.7, 0.65, 0.0);
        tracker.update(&[hand1, hand2]);

        assert_relative_eq!(tracker.state().rotation_deg, (0.65 - 0.2) * 100.0);
    }

    #[test]
    fn two_hand_blend_weights_are_inverted() {
        // The raw center is weighted (1-d) and the previous position d,
        // the opposite of the single-hand filter. Pinned deliberately.
        let d = 0.2;
        let mut tracker = GestureTracker::new(TrackerConfig { damping_factor: d });
        let last = Vector3::new(0.1, -0.2, 0.3);
        tracker.state.position = last;

        let hand1 = hand_with_tip(0.2, 0.4, 0.1);
        let hand2 = hand_with_tip(0.6, 0.8, 0.3);
        tracker.update(&[hand1, hand2]);

        let raw_center = Vector3::new(-(0.2 + 0.6) / 2.0, -(0.4 + 0.8) / 2.0, (0.1 + 0.3) / 2.0);
        let expected = raw_center * (1.0 - d) + last * d;
        assert_relative_eq!(tracker.state().position.x, expected.x, epsilon = 1e-6);
        assert_relative_eq!(tracker.state().position.y, expected.y, epsilon = 1e-6);
        assert_relative_eq!(tracker.state().position.z, expected.z, epsilon = 1e-6);
        assert_eq!(tracker.state().last_position, last);
    }

    #[test]
    fn two_hands_never_calibrate() {
        let mut tracker = GestureTracker::new(TrackerConfig::default());
        let hand1 = hand_with_tip(0.45, 0.5, 0.0);
        let hand2 = hand_with_tip(0.55, 0.5, 0.0);
        tracker.update(&[hand1, hand2]);
        assert!(!tracker.state().calibrated);
    }

    #[test]
    fn more_than_two_hands_behaves_like_none() {
        let mut a = GestureTracker::new(TrackerConfig::default());
        let mut b = GestureTracker::new(TrackerConfig::default());
        for tracker in [&mut a, &mut b] {
            tracker.state.position = Vector3::new(0.4, 0.4, 0.0);
            tracker.state.scale = 1.3;
            tracker.state.rotation_deg = 20.0;
        }

        let crowd = vec![
            hand_with_tip(0.1, 0.1, 0.0),
            hand_with_tip(0.5, 0.5, 0.0),
            hand_with_tip(0.9, 0.9, 0.0),
        ];
        a.update(&crowd);
        b.update(&[]);

        assert_eq!(a.state().position, b.state().position);
        assert_eq!(a.state().scale, b.state().scale);
        assert_eq!(a.state().rotation_deg, b.state().rotation_deg);
        assert_eq!(a.state().calibrated, b.state().calibrated);
    }

    #[test]
    fn update_reports_the_new_state() {
        let mut tracker = GestureTracker::new(TrackerConfig::default());
        let transform = tracker.update(&[hand_with_tip(0.5, 0.5, 0.0)]);
        assert_eq!(transform.position, tracker.state().position);
        assert_eq!(transform.scale, tracker.state().scale);
        assert_eq!(transform.rotation_deg, tracker.state().rotation_deg);
    }
}
