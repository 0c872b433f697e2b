use std::num::NonZeroU32;

use super::Machine;

const BACKGROUND: [u8; 4] = [0x00, 0x00, 0x00, 0xFF];
const FOREGROUND: [u8; 4] = [0xFF, 0xFF, 0xFF, 0xFF];

/// A drawing target the machine paints its frame buffer onto.
pub trait Surface {
    /// Fills the whole surface with the background colour.
    fn clear(&mut self);

    /// Fills a rectangle with the foreground colour. Parts outside the
    /// surface are clipped.
    fn fill_rect(&mut self, x: u32, y: u32, width: u32, height: u32);
}

/// Clears `surface` and repaints it from the machine's current frame.
pub fn repaint<M: Machine>(machine: &M, surface: &mut dyn Surface, scale: NonZeroU32) {
    surface.clear();
    machine.draw_screen(surface, scale);
}

/// [`Surface`] over a row-major RGBA8 buffer, such as a `pixels` frame.
pub struct PixelFrame<'a> {
    frame: &'a mut [u8],
    width: u32,
    height: u32,
}

impl<'a> PixelFrame<'a> {
    pub fn new(frame: &'a mut [u8], width: u32, height: u32) -> Self {
        debug_assert_eq!(frame.len(), (width * height * 4) as usize);
        Self {
            frame,
            width,
            height,
        }
    }
}

impl Surface for PixelFrame<'_> {
    fn clear(&mut self) {
        for pxl in self.frame.chunks_exact_mut(4) {
            pxl.copy_from_slice(&BACKGROUND);
        }
    }

    fn fill_rect(&mut self, x: u32, y: u32, width: u32, height: u32) {
        let x_end = x.saturating_add(width).min(self.width);
        let y_end = y.saturating_add(height).min(self.height);

        for row in y..y_end {
            let start = ((row * self.width + x) * 4) as usize;
            let end = ((row * self.width + x_end) * 4) as usize;

            if start >= end {
                continue;
            }
            for pxl in self.frame[start..end].chunks_exact_mut(4) {
                pxl.copy_from_slice(&FOREGROUND);
            }
        }
    }
}
