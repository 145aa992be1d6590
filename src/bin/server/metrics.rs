//! Service metrics, exported as JSON on `GET /metrics`.
//!
//! Counters accumulate over the process lifetime; the two score gauges
//! hold the value from the most recent applicable request (f32 stored
//! as its bit pattern).

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use serde::Serialize;

#[derive(Debug, Default)]
pub struct Metrics {
    requests_total: AtomicU64,
    request_failures: AtomicU64,
    image_load_failures: AtomicU64,
    image_load_time_ms: AtomicU64,
    detection_failures: AtomicU64,
    recognition_failures: AtomicU64,
    detection_min_score: AtomicU32,
    recognition_min_score: AtomicU32,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct MetricsSnapshot {
    pub requests_total: u64,
    pub request_failures: u64,
    pub image_load_failures: u64,
    pub image_load_time_ms: u64,
    pub detection_failures: u64,
    pub recognition_failures: u64,
    pub detection_min_score: f32,
    pub recognition_min_score: f32,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_request_failure(&self) {
        self.request_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_image_load_failure(&self) {
        self.image_load_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_image_load_time(&self, millis: u64) {
        self.image_load_time_ms.fetch_add(millis, Ordering::Relaxed);
    }

    pub fn record_detection_failure(&self) {
        self.detection_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_recognition_failures(&self, count: u64) {
        self.recognition_failures.fetch_add(count, Ordering::Relaxed);
    }

    pub fn set_detection_min_score(&self, score: f32) {
        self.detection_min_score
            .store(score.to_bits(), Ordering::Relaxed);
    }

    pub fn set_recognition_min_score(&self, score: f32) {
        self.recognition_min_score
            .store(score.to_bits(), Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests_total: self.requests_total.load(Ordering::Relaxed),
            request_failures: self.request_failures.load(Ordering::Relaxed),
            image_load_failures: self.image_load_failures.load(Ordering::Relaxed),
            image_load_time_ms: self.image_load_time_ms.load(Ordering::Relaxed),
            detection_failures: self.detection_failures.load(Ordering::Relaxed),
            recognition_failures: self.recognition_failures.load(Ordering::Relaxed),
            detection_min_score: f32::from_bits(
                self.detection_min_score.load(Ordering::Relaxed),
            ),
            recognition_min_score: f32::from_bits(
                self.recognition_min_score.load(Ordering::Relaxed),
            ),
        }
    }
}
