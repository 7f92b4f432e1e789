use crate::models::{HorizontalEdge, Region, VerticalEdge};
use crate::platform::Placement;

/// Physical size of the screen and its dp → px scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenMetrics {
    pub width_px: u32,
    pub height_px: u32,
    pub density: f32,
}

impl Default for ScreenMetrics {
    fn default() -> Self {
        Self {
            width_px: 1080,
            height_px: 2400,
            density: 2.75,
        }
    }
}

impl ScreenMetrics {
    pub fn to_px(&self, dp: i32) -> i32 {
        (dp as f32 * self.density) as i32
    }

    pub fn size_to_px(&self, dp: u32) -> u32 {
        (dp as f32 * self.density) as u32
    }
}

/// Absolute placement of `region` on a screen described by `metrics`.
///
/// Offsets push the overlay away from its anchor edge: a right anchor with a
/// positive x offset moves it left, a bottom anchor with a positive y offset
/// moves it up. Centered axes shift by the offset. Nothing is clamped.
pub fn place(region: &Region, metrics: &ScreenMetrics) -> Placement {
    let width = metrics.size_to_px(region.width);
    let height = metrics.size_to_px(region.height);
    let x_offset = i64::from(metrics.to_px(region.x_offset));
    let y_offset = i64::from(metrics.to_px(region.y_offset));

    let screen_w = i64::from(metrics.width_px);
    let screen_h = i64::from(metrics.height_px);
    let w = i64::from(width);
    let h = i64::from(height);

    let x = match region.anchor.horizontal() {
        HorizontalEdge::Left => x_offset,
        HorizontalEdge::Center => (screen_w - w) / 2 + x_offset,
        HorizontalEdge::Right => screen_w - w - x_offset,
    };
    let y = match region.anchor.vertical() {
        VerticalEdge::Top => y_offset,
        VerticalEdge::Center => (screen_h - h) / 2 + y_offset,
        VerticalEdge::Bottom => screen_h - h - y_offset,
    };

    Placement {
        x: saturate(x),
        y: saturate(y),
        width,
        height,
    }
}

fn saturate(value: i64) -> i32 {
    i32::try_from(value).unwrap_or(if value < 0 { i32::MIN } else { i32::MAX })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Anchor;

    fn unit_screen() -> ScreenMetrics {
        ScreenMetrics {
            width_px: 1000,
            height_px: 2000,
            density: 1.0,
        }
    }

    fn region(anchor: Anchor, x_offset: i32, y_offset: i32) -> Region {
        Region {
            region_id: 1,
            app_id: "app".into(),
            anchor,
            x_offset,
            y_offset,
            width: 100,
            height: 50,
        }
    }

    #[test]
    fn bottom_anchor_lands_bottom_center() {
        let placement = place(&region(Anchor::Bottom, 0, 0), &unit_screen());
        assert_eq!(
            placement,
            Placement {
                x: 450,
                y: 1950,
                width: 100,
                height: 50
            }
        );
    }

    #[test]
    fn every_anchor_resolves_to_its_corner_or_edge() {
        let screen = unit_screen();
        let expected = [
            (Anchor::TopLeft, 10, 20),
            (Anchor::Top, 460, 20),
            (Anchor::TopRight, 890, 20),
            (Anchor::Right, 890, 995),
            (Anchor::BottomRight, 890, 1930),
            (Anchor::Bottom, 460, 1930),
            (Anchor::BottomLeft, 10, 1930),
            (Anchor::Left, 10, 995),
        ];

        for (anchor, x, y) in expected {
            let placement = place(&region(anchor, 10, 20), &screen);
            assert_eq!((placement.x, placement.y), (x, y), "{anchor:?}");
        }
    }

    #[test]
    fn density_scales_sizes_and_offsets() {
        let screen = ScreenMetrics {
            width_px: 1080,
            height_px: 2400,
            density: 2.5,
        };
        let placement = place(&region(Anchor::TopLeft, 3, -2), &screen);
        assert_eq!(placement.width, 250);
        assert_eq!(placement.height, 125);
        assert_eq!((placement.x, placement.y), (7, -5));
    }
}
