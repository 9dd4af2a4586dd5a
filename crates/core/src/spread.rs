use glam::Vec2;

/// Mean distance between neighbouring fingertips, thumb to pinky.
///
/// `tips` are camera-normalized 2D positions in thumb, index, middle, ring,
/// pinky order.
pub fn finger_spread(tips: &[Vec2; 5]) -> f32 {
    let total: f32 = tips.windows(2).map(|pair| pair[0].distance(pair[1])).sum();
    total / (tips.len() - 1) as f32
}
