use async_trait::async_trait;
use rand::Rng;
use serde::Serialize;

use crate::entities::image;
use crate::error::AppError;

/// Labels the stub detector can emit.
pub const CLASSES: [&str; 5] = ["person", "car", "dog", "cat", "bicycle"];

#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
pub struct Detection {
    /// `[x, y, width, height]`, normalized. Not clamped to the image bounds.
    #[schema(value_type = Vec<f64>)]
    pub bbox: [f64; 4],
    pub category: String,
    pub score: f64,
}

/// Produces detections for a stored image.
#[async_trait]
pub trait Predictor: Send + Sync {
    async fn predict(&self, image: &image::Model) -> Result<Vec<Detection>, AppError>;
}

/// Placeholder detector returning uniformly random boxes. Never reads pixels.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomPredictor;

#[async_trait]
impl Predictor for RandomPredictor {
    async fn predict(&self, image: &image::Model) -> Result<Vec<Detection>, AppError> {
        let detections = sample_detections(&mut rand::thread_rng());
        tracing::debug!(image_id = %image.id, count = detections.len(), "random prediction");
        Ok(detections)
    }
}

pub fn sample_detections<R: Rng + ?Sized>(rng: &mut R) -> Vec<Detection> {
    let count = rng.gen_range(1..=4);
    (0..count)
        .map(|_| {
            let x = rng.gen_range(0.05..=0.6);
            let y = rng.gen_range(0.05..=0.6);
            let w = rng.gen_range(0.1..=0.3);
            let h = rng.gen_range(0.1..=0.3);
            let category = CLASSES[rng.gen_range(0..CLASSES.len())].to_string();
            let score: f64 = rng.gen_range(0.5..=0.99);

            Detection {
                bbox: [x, y, w, h],
                category,
                score: (score * 100.0).round() / 100.0,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn samples_stay_within_ranges() {
        for seed in 0..500 {
            let mut rng = StdRng::seed_from_u64(seed);
            let detections = sample_detections(&mut rng);

            assert!((1..=4).contains(&detections.len()));
            for d in detections {
                let [x, y, w, h] = d.bbox;
                assert!((0.05..=0.6).contains(&x));
                assert!((0.05..=0.6).contains(&y));
                assert!((0.1..=0.3).contains(&w));
                assert!((0.1..=0.3).contains(&h));
                assert!(CLASSES.contains(&d.category.as_str()));
                assert!((0.5..=0.99).contains(&d.score));
            }
        }
    }

    #[test]
    fn scores_have_two_decimals() {
        let mut rng = StdRng::seed_from_u64(7);
        for d in sample_detections(&mut rng) {
            let scaled = d.score * 100.0;
            assert!((scaled - scaled.round()).abs() < 1e-9);
        }
    }

    #[test]
    fn every_count_is_reachable() {
        let mut seen = [false; 4];
        for seed in 0..200 {
            let n = sample_detections(&mut StdRng::seed_from_u64(seed)).len();
            seen[n - 1] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }
}
