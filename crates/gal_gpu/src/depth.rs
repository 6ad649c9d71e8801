//! Depth assignment for layered, overlap-free compositing
//!
//! Layers map to a normalized depth; later layers with smaller depth values
//! land in front. Inside one primitive each emitted piece (segment quads,
//! joins, caps, the fill) is pushed a tiny step further back. With a `Less`
//! depth test a translucent primitive then covers every sample once: where a
//! join overlaps the segment quads it belongs to, the join fails the test.

/// Smallest depth offset between two pieces of one primitive
pub const DEPTH_ADJUST_FACTOR: f64 = 1.0 / (1u32 << 23) as f64;

/// Pieces of headroom kept between the far end of the range and the cleared
/// depth of 1.0
const PIECE_HEADROOM: f64 = 1024.0;

#[derive(Clone, Debug)]
pub struct DepthCompositor {
    near: f64,
    far: f64,
    adjust: f64,
    base: f64,
    pieces: u32,
}

impl Default for DepthCompositor {
    fn default() -> Self {
        Self::new((-2048.0, 2047.0), DEPTH_ADJUST_FACTOR)
    }
}

impl DepthCompositor {
    /// `range` is the span of accepted layer depths
    pub fn new(range: (f64, f64), adjust: f64) -> Self {
        let (near, far) = if range.0 < range.1 {
            range
        } else {
            tracing::warn!(?range, "empty depth range, using the default one");
            (-2048.0, 2047.0)
        };
        Self {
            near,
            far,
            adjust,
            base: 0.0,
            pieces: 0,
        }
    }

    /// Highest depth any piece may get; strictly below the cleared depth
    pub fn max_depth(&self) -> f64 {
        1.0 - self.adjust.clamp(0.0, 0.5)
    }

    /// Maps a layer depth to `[0, 1 - headroom]`, leaving room for the
    /// pieces of a primitive at the far end
    pub fn normalize(&self, layer_depth: f64) -> f64 {
        let headroom = (self.adjust * PIECE_HEADROOM).clamp(0.0, 0.5);
        let t = ((layer_depth - self.near) / (self.far - self.near)).clamp(0.0, 1.0);
        t * (1.0 - headroom)
    }

    /// Starts a new primitive at `layer_depth`
    pub fn begin(&mut self, layer_depth: f64) {
        self.base = self.normalize(layer_depth);
        self.pieces = 0;
    }

    /// Depth for the next piece of the current primitive
    pub fn next_piece(&mut self) -> f32 {
        let depth = (self.base + self.pieces as f64 * self.adjust).min(self.max_depth());
        self.pieces += 1;
        depth as f32
    }

    pub fn pieces(&self) -> u32 {
        self.pieces
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_range() {
        let depth = DepthCompositor::default();
        assert_eq!(depth.normalize(-2048.0), 0.0);
        assert!(depth.normalize(2047.0) < 1.0);
        assert_eq!(depth.normalize(10_000.0), depth.normalize(2047.0));
        assert!(depth.normalize(0.0) > depth.normalize(-1.0));
    }

    #[test]
    fn test_far_end_stays_below_clear_depth() {
        let mut depth = DepthCompositor::default();
        depth.begin(2047.0);
        let pieces: Vec<f32> = (0..8).map(|_| depth.next_piece()).collect();

        // a `Less` test against a 1.0 clear must pass for every piece
        assert!(pieces.iter().all(|&d| d < 1.0));
        assert!(pieces.windows(2).all(|w| w[0] < w[1]));

        // overflowing pieces saturate below 1.0 instead of reaching it
        depth.begin(10_000.0);
        for _ in 0..4096 {
            assert!(depth.next_piece() < 1.0);
        }
    }

    #[test]
    fn test_pieces_move_back() {
        let mut depth = DepthCompositor::new((0.0, 1.0), 0.25);
        depth.begin(0.0);
        assert_eq!(depth.next_piece(), 0.0);
        assert_eq!(depth.next_piece(), 0.25);
        assert_eq!(depth.pieces(), 2);

        depth.begin(0.0);
        assert_eq!(depth.next_piece(), 0.0);
    }
}
