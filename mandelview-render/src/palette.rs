use mandelview_core::EscapeResult;

/// Number of entries in every palette; iteration counts wrap around it.
pub const PALETTE_SIZE: usize = 64;

/// A packed `0xRRGGBB` color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb(pub u32);

impl Rgb {
    pub const BLACK: Self = Self(0x000000);

    #[inline]
    pub fn r(self) -> u8 {
        (self.0 >> 16) as u8
    }

    #[inline]
    pub fn g(self) -> u8 {
        (self.0 >> 8) as u8
    }

    #[inline]
    pub fn b(self) -> u8 {
        self.0 as u8
    }

    /// Opaque RGBA bytes, as image encoders expect them.
    #[inline]
    pub fn to_rgba(self) -> [u8; 4] {
        [self.r(), self.g(), self.b(), 255]
    }
}

// ---------------------------------------------------------------------------
// Palette
// ---------------------------------------------------------------------------

/// A fixed table of 64 colors indexed by iteration count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub name: &'static str,
    colors: [Rgb; PALETTE_SIZE],
}

impl Palette {
    pub const fn new(name: &'static str, colors: [Rgb; PALETTE_SIZE]) -> Self {
        Self { name, colors }
    }

    /// Table entry for `iterations`, wrapping every 64 steps.
    #[inline]
    pub fn color(&self, iterations: u32) -> Rgb {
        self.colors[iterations as usize % PALETTE_SIZE]
    }

    /// Display color for one evaluated pixel. Points that never escaped are
    /// painted black.
    #[inline]
    pub fn pixel(&self, result: EscapeResult) -> Rgb {
        if result.escaped {
            self.color(result.iterations)
        } else {
            Rgb::BLACK
        }
    }

    pub fn colors(&self) -> &[Rgb; PALETTE_SIZE] {
        &self.colors
    }
}

// ---------------------------------------------------------------------------
// Builtin tables
// ---------------------------------------------------------------------------

/// Linear ramp from black in steps of 4 on the selected channels.
const fn ramp(red: bool, green: bool, blue: bool) -> [Rgb; PALETTE_SIZE] {
    let mut colors = [Rgb::BLACK; PALETTE_SIZE];
    let mut i = 0;
    while i < PALETTE_SIZE {
        let v = (i as u32) * 4;
        let mut c = 0;
        if red {
            c |= v << 16;
        }
        if green {
            c |= v << 8;
        }
        if blue {
            c |= v;
        }
        colors[i] = Rgb(c);
        i += 1;
    }
    colors
}

const fn hex_table(values: [u32; PALETTE_SIZE]) -> [Rgb; PALETTE_SIZE] {
    let mut colors = [Rgb::BLACK; PALETTE_SIZE];
    let mut i = 0;
    while i < PALETTE_SIZE {
        colors[i] = Rgb(values[i]);
        i += 1;
    }
    colors
}

/// Rises from navy to full blue, then fades back down.
const BLUE: [u32; PALETTE_SIZE] = [
    0x000033, 0x000038, 0x00003D, 0x000042, 0x000047, 0x00004C, 0x000051, 0x000056,
    0x00005B, 0x000060, 0x000065, 0x00006A, 0x00006F, 0x000074, 0x000079, 0x00007E,
    0x000083, 0x000088, 0x00008D, 0x000092, 0x000097, 0x00009C, 0x0000A1, 0x0000A6,
    0x0000AB, 0x0000B0, 0x0000B5, 0x0000BA, 0x0000BF, 0x0000C4, 0x0000C9, 0x0000CE,
    0x0000D3, 0x0000D8, 0x0000DD, 0x0000E2, 0x0000E7, 0x0000EC, 0x0000F1, 0x0000F6,
    0x0000FB, 0x0000FF, 0x0000FF, 0x0000F5, 0x0000EB, 0x0000E1, 0x0000D7, 0x0000CD,
    0x0000C3, 0x0000B9, 0x0000AF, 0x0000A5, 0x00009B, 0x000091, 0x000087, 0x00007D,
    0x000073, 0x000069, 0x00005F, 0x000055, 0x00004B, 0x000041, 0x000037, 0x00002D,
];

/// The palettes in cycling order.
pub static BUILTIN_PALETTES: [Palette; 4] = [
    Palette::new("Gray", ramp(true, true, true)),
    Palette::new("Blue", hex_table(BLUE)),
    Palette::new("Red", ramp(true, false, false)),
    Palette::new("Green", ramp(false, true, false)),
];

// ---------------------------------------------------------------------------
// Palette selection
// ---------------------------------------------------------------------------

/// The palette list plus which one is active.
///
/// Cycling stops at either end of the list rather than wrapping.
#[derive(Debug, Clone, Copy)]
pub struct PaletteSet {
    palettes: &'static [Palette],
    active: usize,
}

impl PaletteSet {
    /// `palettes` must not be empty.
    pub fn new(palettes: &'static [Palette]) -> Self {
        assert!(!palettes.is_empty());
        Self {
            palettes,
            active: 0,
        }
    }

    pub fn builtin() -> Self {
        Self::new(&BUILTIN_PALETTES)
    }

    /// Start on `index`, clamped to the last palette.
    pub fn with_active(mut self, index: usize) -> Self {
        self.active = index.min(self.palettes.len() - 1);
        self
    }

    pub fn len(&self) -> usize {
        self.palettes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.palettes.is_empty()
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active(&self) -> &'static Palette {
        &self.palettes[self.active]
    }

    /// Select the next palette. Returns `false` when already on the last one.
    pub fn cycle_next(&mut self) -> bool {
        if self.active + 1 >= self.palettes.len() {
            return false;
        }
        self.active += 1;
        true
    }

    /// Select the previous palette. Returns `false` when already on the first.
    pub fn cycle_previous(&mut self) -> bool {
        if self.active == 0 {
            return false;
        }
        self.active -= 1;
        true
    }

    /// `table[palette_index][iterations % 64]`.
    pub fn color_for(&self, iterations: u32, palette_index: usize) -> Rgb {
        let idx = palette_index.min(self.palettes.len() - 1);
        self.palettes[idx].color(iterations)
    }
}

impl Default for PaletteSet {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_tables_match_reference_values() {
        let [gray, blue, red, green] = &BUILTIN_PALETTES;
        assert_eq!(gray.color(1), Rgb(0x040404));
        assert_eq!(gray.color(63), Rgb(0xFCFCFC));
        assert_eq!(blue.color(0), Rgb(0x000033));
        assert_eq!(blue.color(41), Rgb(0x0000FF));
        assert_eq!(blue.color(63), Rgb(0x00002D));
        assert_eq!(red.color(32), Rgb(0x800000));
        assert_eq!(green.color(63), Rgb(0x00FC00));
    }

    #[test]
    fn lookup_wraps_every_64_iterations() {
        let set = PaletteSet::builtin();
        for idx in 0..set.len() {
            let first = set.color_for(0, idx);
            for iterations in [64, 128, 192] {
                assert_eq!(set.color_for(iterations, idx), first);
            }
            assert_eq!(set.color_for(65, idx), set.color_for(1, idx));
        }
    }

    #[test]
    fn bounded_points_are_black() {
        let palette = &BUILTIN_PALETTES[1];
        let bounded = EscapeResult::bounded(1024);
        assert_eq!(palette.pixel(bounded), Rgb::BLACK);

        let escaped = EscapeResult {
            iterations: 3,
            escaped: true,
        };
        assert_eq!(palette.pixel(escaped), Rgb(0x000042));
    }

    #[test]
    fn cycling_clamps_at_both_ends() {
        let mut set = PaletteSet::builtin();
        assert_eq!(set.active_index(), 0);
        assert!(!set.cycle_previous());
        assert_eq!(set.active_index(), 0);

        while set.cycle_next() {}
        assert_eq!(set.active_index(), set.len() - 1);
        assert!(!set.cycle_next());
        assert_eq!(set.active_index(), set.len() - 1);

        assert!(set.cycle_previous());
        assert_eq!(set.active_index(), set.len() - 2);
    }

    #[test]
    fn with_active_clamps() {
        assert_eq!(PaletteSet::builtin().with_active(99).active_index(), 3);
        assert_eq!(PaletteSet::builtin().with_active(2).active().name, "Red");
    }

    #[test]
    fn rgba_channels() {
        assert_eq!(Rgb(0x12AB34).to_rgba(), [0x12, 0xAB, 0x34, 255]);
    }
}
