use serde::{Serialize, Serializer};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    fn lerp(self, other: Self, amount: f64) -> Self {
        let amount = amount.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * amount).round() as u8;
        Self::new(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
        )
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.hex())
    }
}

pub const BLACK: Rgb = Rgb::new(0, 0, 0);
pub const ORANGE: Rgb = Rgb::new(0xFF, 0xA5, 0x00);
pub const LIGHT_GREEN: Rgb = Rgb::new(0x90, 0xEE, 0x90);
pub const CRIMSON: Rgb = Rgb::new(0xC4, 0x1E, 0x3A);
pub const CORNFLOWER: Rgb = Rgb::new(0x50, 0x73, 0xF8);
pub const PERIWINKLE: Rgb = Rgb::new(102, 126, 234);

const VIRIDIS_STOPS: [Rgb; 5] = [
    Rgb::new(0x44, 0x01, 0x54),
    Rgb::new(0x3B, 0x52, 0x8B),
    Rgb::new(0x21, 0x90, 0x8C),
    Rgb::new(0x5D, 0xC8, 0x63),
    Rgb::new(0xFD, 0xE7, 0x25),
];

pub fn viridis(t: f64) -> Rgb {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let scaled = t * (VIRIDIS_STOPS.len() - 1) as f64;
    let lower = (scaled.floor() as usize).min(VIRIDIS_STOPS.len() - 2);
    VIRIDIS_STOPS[lower].lerp(VIRIDIS_STOPS[lower + 1], scaled - lower as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_is_upper_case_rrggbb() {
        assert_eq!(CRIMSON.hex(), "#C41E3A");
        assert_eq!(CORNFLOWER.hex(), "#5073F8");
        assert_eq!(serde_json::to_string(&ORANGE).unwrap(), "\"#FFA500\"");
    }

    #[test]
    fn viridis_hits_end_stops() {
        assert_eq!(viridis(0.0), VIRIDIS_STOPS[0]);
        assert_eq!(viridis(1.0), VIRIDIS_STOPS[4]);
        assert_eq!(viridis(f64::NAN), VIRIDIS_STOPS[0]);
        assert_eq!(viridis(7.0), VIRIDIS_STOPS[4]);
    }
}
