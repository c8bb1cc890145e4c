/// Braille Unicode canvas for high-resolution terminal graphics.
/// Each character cell is a 2x4 pixel grid (Unicode range U+2800..U+28FF).
pub struct BrailleCanvas {
    width: usize,  // characters
    height: usize, // characters
    cells: Vec<u8>,
}

impl BrailleCanvas {
    /// Create a canvas with the given character dimensions.
    /// Effective pixel resolution: width*2 x height*4.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![0u8; width * height],
        }
    }

    /// Set a pixel at the given coordinates.
    /// Braille dot layout per character:
    /// ```text
    /// (0,0) (1,0)   bits: 0x01 0x08
    /// (0,1) (1,1)   bits: 0x02 0x10
    /// (0,2) (1,2)   bits: 0x04 0x20
    /// (0,3) (1,3)   bits: 0x40 0x80
    /// ```
    pub fn set_pixel(&mut self, x: usize, y: usize) {
        let cx = x / 2;
        let cy = y / 4;
        if cx >= self.width || cy >= self.height {
            return;
        }

        let bit = match (x % 2, y % 4) {
            (0, 0) => 0x01,
            (1, 0) => 0x08,
            (0, 1) => 0x02,
            (1, 1) => 0x10,
            (0, 2) => 0x04,
            (1, 2) => 0x20,
            (0, 3) => 0x40,
            (1, 3) => 0x80,
            _ => 0,
        };

        self.cells[cy * self.width + cx] |= bit;
    }

    /// Set a pixel using signed coordinates (ignores negative values).
    pub fn set_pixel_signed(&mut self, x: i32, y: i32) {
        if x >= 0 && y >= 0 {
            self.set_pixel(x as usize, y as usize);
        }
    }

    /// True if no dot is set anywhere on the canvas.
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|&b| b == 0)
    }

    /// Iterate over non-empty cells as (col, row, braille char).
    pub fn cells(&self) -> impl Iterator<Item = (u16, u16, char)> + '_ {
        self.cells.iter().enumerate().filter_map(|(idx, &bits)| {
            if bits == 0 {
                return None;
            }
            let cx = (idx % self.width) as u16;
            let cy = (idx / self.width) as u16;
            let ch = char::from_u32(0x2800 + bits as u32).unwrap_or(' ');
            Some((cx, cy, ch))
        })
    }

    /// Render the whole canvas as lines of braille text.
    #[cfg(test)]
    pub fn to_text(&self) -> String {
        self.cells
            .chunks(self.width)
            .map(|row| {
                row.iter()
                    .map(|&b| char::from_u32(0x2800 + b as u32).unwrap_or(' '))
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_pixel() {
        let mut canvas = BrailleCanvas::new(1, 1);
        canvas.set_pixel(0, 0);
        assert_eq!(canvas.to_text(), "⠁"); // U+2801
    }

    #[test]
    fn test_all_dots() {
        let mut canvas = BrailleCanvas::new(1, 1);
        for x in 0..2 {
            for y in 0..4 {
                canvas.set_pixel(x, y);
            }
        }
        assert_eq!(canvas.to_text(), "⣿"); // U+28FF
    }

    #[test]
    fn test_out_of_bounds_ignored() {
        let mut canvas = BrailleCanvas::new(2, 2);
        canvas.set_pixel(100, 100);
        canvas.set_pixel_signed(-1, 3);
        assert!(canvas.is_empty());
    }

    #[test]
    fn test_cells_iteration() {
        let mut canvas = BrailleCanvas::new(3, 2);
        canvas.set_pixel(0, 0); // cell (0,0)
        canvas.set_pixel(5, 7); // cell (2,1)
        let cells: Vec<_> = canvas.cells().collect();
        assert_eq!(cells.len(), 2);
        assert_eq!((cells[0].0, cells[0].1), (0, 0));
        assert_eq!((cells[1].0, cells[1].1), (2, 1));
    }
}
