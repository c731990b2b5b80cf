// src/detector.rs - Hand landmark source: MediaPipe via a Python subprocess,
// with a simulation fallback so the app runs without the Python environment.
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};

use anyhow::{Context, Result};
use image::DynamicImage;
use serde::Deserialize;

use crate::hand::{HandSample, Handedness, Landmark, LANDMARK_COUNT};

#[derive(Deserialize, Debug)]
struct HandJson {
    handedness: String,
    score: f32,
    landmarks: Vec<Landmark>,
}

#[derive(Deserialize, Debug)]
struct DetectionJson {
    hands: Vec<HandJson>,
    #[serde(default)]
    error: Option<String>,
}

/// The per-frame landmark source. Detector failures are not surfaced to the
/// frame loop as errors; a failed frame simply yields zero hands.
pub enum HandDetector {
    MediaPipe(MediaPipeBridge),
    Simulation(SimulatedHands),
}

impl HandDetector {
    /// Prefer the real detector, fall back to simulation when the Python
    /// environment is missing.
    pub fn create() -> Self {
        match MediaPipeBridge::new() {
            Ok(bridge) => {
                tracing::info!("MediaPipe hand detector ready");
                HandDetector::MediaPipe(bridge)
            }
            Err(e) => {
                tracing::warn!("MediaPipe unavailable ({e:#}), using simulated hands");
                HandDetector::Simulation(SimulatedHands::new())
            }
        }
    }

    pub fn is_simulated(&self) -> bool {
        matches!(self, HandDetector::Simulation(_))
    }

    /// A missing frame (capture failure) or a bridge error both degrade to
    /// zero hands; the tracker's idle decay handles the rest.
    pub fn detect(&mut self, frame: Option<&DynamicImage>) -> Vec<HandSample> {
        match (self, frame) {
            (HandDetector::MediaPipe(bridge), Some(frame)) => match bridge.detect(frame) {
                Ok(hands) => hands,
                Err(e) => {
                    tracing::warn!("detector error, treating frame as empty: {e:#}");
                    Vec::new()
                }
            },
            (HandDetector::MediaPipe(_), None) => Vec::new(),
            (HandDetector::Simulation(sim), _) => sim.next_hands(),
        }
    }
}

/// MediaPipe hand landmarker driven over a pipe: each request is a little
/// endian (width, height, channels) header followed by raw RGB bytes, each
/// response one line of JSON.
pub struct MediaPipeBridge {
    process: Child,
    stdout_reader: BufReader<std::process::ChildStdout>,
}

impl MediaPipeBridge {
    pub fn new() -> Result<Self> {
        let script_path = script_path();
        if !script_path.exists() {
            anyhow::bail!("hand detection script not found at {:?}", script_path);
        }
        let python = std::env::var("HANDFORM_PYTHON").unwrap_or_else(|_| "python3".to_string());

        tracing::info!(%python, "starting MediaPipe hand detector subprocess");
        let mut process = Command::new(python)
            .arg(&script_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .context("Failed to start Python subprocess")?;

        let stdout = process.stdout.take().context("Failed to get stdout")?;
        let mut stdout_reader = BufReader::new(stdout);

        let mut ready_line = String::new();
        stdout_reader.read_line(&mut ready_line)?;
        if ready_line.trim() != "READY" {
            let _ = process.kill();
            anyhow::bail!("detector did not signal ready, got: {ready_line:?}");
        }

        Ok(Self {
            process,
            stdout_reader,
        })
    }

    pub fn detect(&mut self, frame: &DynamicImage) -> Result<Vec<HandSample>> {
        let rgb = frame.to_rgb8();
        let (width, height) = (rgb.width(), rgb.height());

        let stdin = self.process.stdin.as_mut().context("Failed to get stdin")?;
        stdin.write_all(&width.to_le_bytes())?;
        stdin.write_all(&height.to_le_bytes())?;
        stdin.write_all(&3u32.to_le_bytes())?;
        stdin.write_all(rgb.as_raw())?;
        stdin.flush()?;

        let mut response = String::new();
        self.stdout_reader.read_line(&mut response)?;

        let result: DetectionJson = serde_json::from_str(&response)
            .with_context(|| format!("Failed to parse detector response: {response}"))?;

        if let Some(error) = result.error {
            anyhow::bail!("detector reported: {error}");
        }

        let mut hands = Vec::new();
        for hand in result.hands {
            if hand.landmarks.len() != LANDMARK_COUNT {
                tracing::warn!("expected 21 landmarks, got {}", hand.landmarks.len());
                continue;
            }
            let mut landmarks = [Landmark::default(); LANDMARK_COUNT];
            landmarks.copy_from_slice(&hand.landmarks);
            hands.push(HandSample {
                landmarks,
                handedness: match hand.handedness.as_str() {
                    "Left" => Handedness::Left,
                    "Right" => Handedness::Right,
                    _ => Handedness::Unknown,
                },
                score: hand.score,
            });
        }
        Ok(hands)
    }
}

impl Drop for MediaPipeBridge {
    fn drop(&mut self) {
        let _ = self.process.kill();
        tracing::info!("detector subprocess stopped");
    }
}

fn script_path() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("scripts/hand_detect.py")
}

/// Synthetic hand generator: one hand sweeping around the frame center,
/// switching to two hands with a slowly varying spread so every tracker
/// mode gets exercised without a camera or detector.
pub struct SimulatedHands {
    t: f32,
}

impl SimulatedHands {
    pub fn new() -> Self {
        Self { t: 0.0 }
    }

    pub fn next_hands(&mut self) -> Vec<HandSample> {
        self.t += 0.033;
        let t = self.t;

        if (t * 0.25).sin() > 0.3 {
            let half_spread = 0.15 + 0.1 * (t * 0.7).sin();
            let tilt = 0.1 * (t * 0.9).sin();
            vec![
                Self::synth_hand(0.5 - half_spread, 0.5 - tilt, Handedness::Left),
                Self::synth_hand(0.5 + half_spread, 0.5 + tilt, Handedness::Right),
            ]
        } else {
            let x = 0.5 + 0.15 * (t * 0.5).cos();
            let y = 0.5 + 0.15 * t.sin();
            vec![Self::synth_hand(x, y, Handedness::Right)]
        }
    }

    /// A plausible hand: index fingertip at (x, y), wrist below it, the
    /// remaining landmarks fanned out between them.
    fn synth_hand(x: f32, y: f32, handedness: Handedness) -> HandSample {
        let mut landmarks = [Landmark::default(); LANDMARK_COUNT];
        for (i, lm) in landmarks.iter_mut().enumerate() {
            let spread = (i as f32 / LANDMARK_COUNT as f32 - 0.5) * 0.1;
            let reach = (i % 4) as f32 * 0.02;
            *lm = Landmark::new(x + spread, y + 0.12 - reach, -0.02 * reach);
        }
        landmarks[0] = Landmark::new(x, y + 0.15, 0.0);
        landmarks[8] = Landmark::new(x, y, -0.01);
        HandSample {
            landmarks,
            handedness,
            score: 1.0,
        }
    }
}
