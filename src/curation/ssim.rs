/// Structural similarity between two luminance planes of equal dimensions.
///
/// The detector only relies on the contract: deterministic, symmetric,
/// 1.0 for identical inputs, values in [0, 1]. The concrete metric is an
/// implementation choice behind this trait.
pub trait FrameSimilarity {
    fn score(&self, a: &[u8], b: &[u8], width: u32, height: u32) -> f32;
}

/// Mean windowed SSIM (8x8 windows, standard K1/K2 constants on an 8-bit
/// dynamic range). Raw SSIM can go slightly negative on pathological
/// inputs; the result is clamped to [0, 1] to honor the trait contract.
pub struct Ssim {
    window: usize,
}

const C1: f64 = 6.5025; // (0.01 * 255)^2
const C2: f64 = 58.5225; // (0.03 * 255)^2

impl Ssim {
    pub fn new() -> Self {
        Self { window: 8 }
    }

    fn window_ssim(a: &[u8], b: &[u8], img_w: usize, x0: usize, y0: usize, w: usize, h: usize) -> f64 {
        let n = (w * h) as f64;

        let mut sum_a = 0.0;
        let mut sum_b = 0.0;
        for y in y0..y0 + h {
            let row = y * img_w;
            for x in x0..x0 + w {
                sum_a += a[row + x] as f64;
                sum_b += b[row + x] as f64;
            }
        }
        let mean_a = sum_a / n;
        let mean_b = sum_b / n;

        let mut var_a = 0.0;
        let mut var_b = 0.0;
        let mut cov = 0.0;
        for y in y0..y0 + h {
            let row = y * img_w;
            for x in x0..x0 + w {
                let da = a[row + x] as f64 - mean_a;
                let db = b[row + x] as f64 - mean_b;
                var_a += da * da;
                var_b += db * db;
                cov += da * db;
            }
        }
        var_a /= n;
        var_b /= n;
        cov /= n;

        ((2.0 * mean_a * mean_b + C1) * (2.0 * cov + C2))
            / ((mean_a * mean_a + mean_b * mean_b + C1) * (var_a + var_b + C2))
    }
}

impl Default for Ssim {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSimilarity for Ssim {
    fn score(&self, a: &[u8], b: &[u8], width: u32, height: u32) -> f32 {
        let w = width as usize;
        let h = height as usize;
        debug_assert_eq!(a.len(), w * h);
        debug_assert_eq!(b.len(), w * h);

        if w == 0 || h == 0 {
            return 1.0;
        }

        let win = self.window;
        let mut total = 0.0;
        let mut windows = 0u32;

        let mut y0 = 0;
        while y0 < h {
            let wh = win.min(h - y0);
            let mut x0 = 0;
            while x0 < w {
                let ww = win.min(w - x0);
                total += Self::window_ssim(a, b, w, x0, y0, ww, wh);
                windows += 1;
                x0 += win;
            }
            y0 += win;
        }

        (total / windows as f64).clamp(0.0, 1.0) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_planes_score_one() {
        let plane: Vec<u8> = (0..64 * 64).map(|i| (i % 256) as u8).collect();
        let score = Ssim::new().score(&plane, &plane, 64, 64);
        assert!((score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_inverted_planes_score_low() {
        let a: Vec<u8> = (0..64 * 64).map(|i| if (i / 64) % 2 == 0 { 255 } else { 0 }).collect();
        let b: Vec<u8> = a.iter().map(|&v| 255 - v).collect();
        let score = Ssim::new().score(&a, &b, 64, 64);
        assert!(score < 0.2, "inverted stripes scored {}", score);
    }

    #[test]
    fn test_symmetry() {
        let a: Vec<u8> = (0..32 * 32).map(|i| (i * 7 % 251) as u8).collect();
        let b: Vec<u8> = (0..32 * 32).map(|i| (i * 13 % 239) as u8).collect();
        let ssim = Ssim::new();
        let ab = ssim.score(&a, &b, 32, 32);
        let ba = ssim.score(&b, &a, 32, 32);
        assert!((ab - ba).abs() < 1e-6);
    }

    #[test]
    fn test_range_bounds() {
        let a = vec![0u8; 16 * 16];
        let b = vec![255u8; 16 * 16];
        let score = Ssim::new().score(&a, &b, 16, 16);
        assert!((0.0..=1.0).contains(&score));
    }
}
