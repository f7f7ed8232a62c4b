//! Pure calculation functions for rendition dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Scale `source` down to at most `max_width` pixels wide, keeping the
/// aspect ratio. Never upscales: a source narrower than `max_width` keeps
/// its own dimensions.
///
/// ```
/// # use photo_ingest::imaging::calculate_fit_width;
/// assert_eq!(calculate_fit_width((4000, 3000), 800), (800, 600));
/// assert_eq!(calculate_fit_width((640, 480), 800), (640, 480));
/// ```
pub fn calculate_fit_width(source: (u32, u32), max_width: u32) -> (u32, u32) {
    let (src_w, src_h) = source;
    if src_w == 0 || src_h == 0 || src_w <= max_width {
        return (src_w, src_h);
    }

    let h = (max_width as f64 * src_h as f64 / src_w as f64).round() as u32;
    (max_width, h.max(1))
}

/// Percentage by which `after` is smaller than `before`, rounded to the
/// nearest integer. Returns 0 when `before` is zero.
pub fn reduction_percent(before: u64, after: u64) -> i64 {
    if before == 0 {
        return 0;
    }
    ((before as f64 - after as f64) / before as f64 * 100.0).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn landscape_scaled_to_width() {
        assert_eq!(calculate_fit_width((4000, 3000), 1920), (1920, 1440));
    }

    #[test]
    fn portrait_scaled_to_width() {
        assert_eq!(calculate_fit_width((3000, 4000), 800), (800, 1067));
    }

    #[test]
    fn never_upscales() {
        assert_eq!(calculate_fit_width((500, 400), 1920), (500, 400));
    }

    #[test]
    fn exact_width_is_unchanged() {
        assert_eq!(calculate_fit_width((800, 533), 800), (800, 533));
    }

    #[test]
    fn extreme_panorama_keeps_one_pixel_height() {
        assert_eq!(calculate_fit_width((100_000, 10), 800), (800, 1));
    }

    #[test]
    fn zero_dimensions_pass_through() {
        assert_eq!(calculate_fit_width((0, 0), 800), (0, 0));
    }

    #[test]
    fn reduction_rounds_to_nearest() {
        assert_eq!(reduction_percent(1000, 250), 75);
        assert_eq!(reduction_percent(3, 2), 33);
    }

    #[test]
    fn reduction_can_be_negative() {
        assert_eq!(reduction_percent(100, 150), -50);
    }

    #[test]
    fn reduction_of_empty_is_zero() {
        assert_eq!(reduction_percent(0, 10), 0);
    }
}
