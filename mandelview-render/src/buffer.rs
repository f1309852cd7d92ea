use std::sync::atomic::{AtomicU32, Ordering};

use crate::palette::Rgb;

/// The frame every render pass paints into.
///
/// Shared (behind an `Arc`) between the workers writing it and whatever
/// displays it. Each cell is an independent atomic, so concurrent passes and
/// readers never race in the memory-model sense, but a reader may observe a
/// mix of old and new pixels while a pass is running.
#[derive(Debug)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    cells: Box<[AtomicU32]>,
}

impl PixelBuffer {
    /// Create a buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        let len = width as usize * height as usize;
        let cells = (0..len).map(|_| AtomicU32::new(0)).collect();
        Self {
            width,
            height,
            cells,
        }
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        debug_assert!(x < self.width && y < self.height);
        y as usize * self.width as usize + x as usize
    }

    #[inline]
    pub fn set(&self, x: u32, y: u32, color: Rgb) {
        self.cells[self.index(x, y)].store(color.0, Ordering::Relaxed);
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Rgb {
        Rgb(self.cells[self.index(x, y)].load(Ordering::Relaxed))
    }

    /// Overwrite every cell with `color`.
    pub fn fill(&self, color: Rgb) {
        for cell in self.cells.iter() {
            cell.store(color.0, Ordering::Relaxed);
        }
    }

    /// Copy of the current contents, row-major.
    pub fn snapshot(&self) -> Vec<Rgb> {
        self.cells
            .iter()
            .map(|c| Rgb(c.load(Ordering::Relaxed)))
            .collect()
    }

    /// Current contents as opaque RGBA bytes, row-major.
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut pixels = Vec::with_capacity(self.cells.len() * 4);
        for cell in self.cells.iter() {
            pixels.extend_from_slice(&Rgb(cell.load(Ordering::Relaxed)).to_rgba());
        }
        pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn new_buffer_is_black() {
        let buf = PixelBuffer::new(4, 3);
        assert_eq!(buf.snapshot(), vec![Rgb::BLACK; 12]);
        for chunk in buf.to_rgba().chunks_exact(4) {
            assert_eq!(chunk, &[0, 0, 0, 255]);
        }
    }

    #[test]
    fn set_writes_single_cell() {
        let buf = PixelBuffer::new(8, 8);
        buf.set(2, 1, Rgb(0xFF0000));

        assert_eq!(buf.get(2, 1), Rgb(0xFF0000));
        assert_eq!(buf.snapshot()[8 + 2], Rgb(0xFF0000));
        assert_eq!(buf.get(0, 0), Rgb::BLACK);
        assert_eq!(&buf.to_rgba()[(8 + 2) * 4..(8 + 2) * 4 + 4], &[255, 0, 0, 255]);
    }

    #[test]
    fn rows_can_be_written_from_many_threads() {
        let buf = Arc::new(PixelBuffer::new(16, 16));
        let handles: Vec<_> = (0..16)
            .map(|y| {
                let buf = Arc::clone(&buf);
                std::thread::spawn(move || {
                    for x in 0..16 {
                        buf.set(x, y, Rgb(y));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        for y in 0..16 {
            assert_eq!(buf.get(15, y), Rgb(y));
        }
    }

    #[test]
    fn fill_overwrites_everything() {
        let buf = PixelBuffer::new(3, 3);
        buf.set(1, 1, Rgb(0x123456));
        buf.fill(Rgb(0x0000FF));
        assert!(buf.snapshot().iter().all(|&c| c == Rgb(0x0000FF)));
    }
}
