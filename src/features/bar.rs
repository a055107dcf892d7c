use crate::config::Theme;
use crate::gfx::anim::lerp;
use crate::gfx::draw::DrawContext;
use crate::gfx::math::{Color, Rect};

// Seven-segment display mapping
const SEGMENT_MAP: [[bool; 7]; 10] = [
    [true, true, true, true, true, true, false],     // 0
    [false, true, true, false, false, false, false], // 1
    [true, true, false, true, true, false, true],    // 2
    [true, true, true, true, false, false, true],    // 3
    [false, true, true, false, false, true, true],   // 4
    [true, false, true, true, false, true, true],    // 5
    [true, false, true, true, true, true, true],     // 6
    [true, true, true, false, false, false, false],  // 7
    [true, true, true, true, true, true, true],      // 8
    [true, true, true, true, false, true, true],     // 9
];

/// The progress element: a horizontal bar whose fill tracks the display
/// value, with the remaining time as MM:SS digits above it.
pub struct CountdownBar {
    minute_digits: [u8; 2],
    second_digits: [u8; 2],
}

impl CountdownBar {
    pub fn new() -> Self {
        Self {
            minute_digits: [0, 0],
            second_digits: [0, 0],
        }
    }

    pub fn set_remaining(&mut self, remaining_ms: i64) {
        let total_sec = (remaining_ms.max(0) / 1000) as u32;
        let mins = (total_sec / 60).min(99);
        let secs = total_sec % 60;
        self.minute_digits = [(mins / 10) as u8, (mins % 10) as u8];
        self.second_digits = [(secs / 10) as u8, (secs % 10) as u8];
    }

    /// `fraction` is the unrounded remaining share, 0.0..=1.0. `alpha` fades
    /// the whole widget in and out; `flash` > 0 pulses the track on
    /// completion.
    pub fn render(
        &self,
        draw: &mut DrawContext,
        viewport: Rect,
        theme: &Theme,
        fraction: f32,
        alpha: f32,
        flash: f32,
    ) {
        if alpha <= 0.0 {
            return;
        }

        let padding = 4.0;
        let bar_height = (viewport.height * 0.25).max(6.0);
        let bar_y = viewport.y + viewport.height - bar_height - padding;
        let bar_width = viewport.width - padding * 2.0;

        // Track, blended toward white while the completion flash runs
        let track = if flash > 0.0 {
            draw.set_effect_mode(1);
            let fill = theme.fill_color();
            Color::new(
                lerp(fill.r, 1.0, 0.7),
                lerp(fill.g, 1.0, 0.7),
                lerp(fill.b, 1.0, 0.7),
                1.0,
            )
            .with_alpha(alpha)
        } else {
            theme.track_color().with_alpha(alpha)
        };
        draw.rect(viewport.x + padding, bar_y, bar_width, bar_height, track);
        draw.set_effect_mode(0);

        // Fill, anchored left, emptying toward zero
        let fill_width = bar_width * fraction.clamp(0.0, 1.0);
        if fill_width > 0.0 {
            draw.rect(
                viewport.x + padding,
                bar_y,
                fill_width,
                bar_height,
                theme.fill_color().with_alpha(alpha),
            );
        }

        self.render_remaining(draw, viewport, theme, bar_y, padding, alpha);
    }

    fn render_remaining(
        &self,
        draw: &mut DrawContext,
        viewport: Rect,
        theme: &Theme,
        bar_y: f32,
        padding: f32,
        alpha: f32,
    ) {
        let seg_color = theme.digits_color().with_alpha(alpha);

        let digit_height = (bar_y - viewport.y - padding * 2.0).max(0.0);
        if digit_height < 8.0 {
            // Not enough room above the bar for digits
            return;
        }
        let digit_width = digit_height * 0.62;
        let spacing = digit_width * 0.25;
        let colon_width = digit_width * 0.3;
        let total_width = digit_width * 4.0 + spacing * 4.0 + colon_width;

        let start_x = viewport.x + (viewport.width - total_width) / 2.0;
        let start_y = viewport.y + padding;

        // Minutes
        self.render_digit(draw, self.minute_digits[0], start_x, start_y, digit_width, digit_height, seg_color);
        self.render_digit(draw, self.minute_digits[1], start_x + digit_width + spacing, start_y, digit_width, digit_height, seg_color);

        // Colon
        let colon_x = start_x + digit_width * 2.0 + spacing * 2.0;
        let dot = digit_width * 0.12;
        draw.rect(colon_x, start_y + digit_height * 0.3, dot, dot, seg_color);
        draw.rect(colon_x, start_y + digit_height * 0.62, dot, dot, seg_color);

        // Seconds
        let sec_x = colon_x + colon_width + spacing;
        self.render_digit(draw, self.second_digits[0], sec_x, start_y, digit_width, digit_height, seg_color);
        self.render_digit(draw, self.second_digits[1], sec_x + digit_width + spacing, start_y, digit_width, digit_height, seg_color);
    }

    fn render_digit(
        &self,
        draw: &mut DrawContext,
        digit: u8,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Color,
    ) {
        if digit > 9 {
            return;
        }
        let segments = SEGMENT_MAP[digit as usize];
        let thickness = (width * 0.15).max(1.0);
        let seg_w = width - thickness * 2.0;
        let seg_h = height * 0.5 - thickness * 1.5;

        // Horizontal: top, middle, bottom
        if segments[0] {
            draw.rect(x + thickness, y, seg_w, thickness, color);
        }
        if segments[6] {
            draw.rect(x + thickness, y + height * 0.5 - thickness * 0.5, seg_w, thickness, color);
        }
        if segments[3] {
            draw.rect(x + thickness, y + height - thickness, seg_w, thickness, color);
        }

        // Vertical: top-right, bottom-right, bottom-left, top-left
        if segments[1] {
            draw.rect(x + width - thickness, y + thickness, thickness, seg_h, color);
        }
        if segments[2] {
            draw.rect(x + width - thickness, y + height * 0.5 + thickness * 0.5, thickness, seg_h, color);
        }
        if segments[4] {
            draw.rect(x, y + height * 0.5 + thickness * 0.5, thickness, seg_h, color);
        }
        if segments[5] {
            draw.rect(x, y + thickness, thickness, seg_h, color);
        }
    }
}

impl Default for CountdownBar {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remaining_splits_into_digits() {
        let mut bar = CountdownBar::new();
        bar.set_remaining(754_000); // 12:34
        assert_eq!(bar.minute_digits, [1, 2]);
        assert_eq!(bar.second_digits, [3, 4]);
    }

    #[test]
    fn remaining_saturates_at_99_minutes() {
        let mut bar = CountdownBar::new();
        bar.set_remaining(100 * 60 * 1000);
        assert_eq!(bar.minute_digits, [9, 9]);
    }

    #[test]
    fn negative_remaining_reads_zero() {
        let mut bar = CountdownBar::new();
        bar.set_remaining(-5_000);
        assert_eq!(bar.minute_digits, [0, 0]);
        assert_eq!(bar.second_digits, [0, 0]);
    }
}
