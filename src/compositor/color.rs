use image::Rgb;

const NAMED: &[(&str, [u8; 3])] = &[
    ("red", [255, 0, 0]),
    ("green", [0, 128, 0]),
    ("lime", [0, 255, 0]),
    ("blue", [0, 0, 255]),
    ("yellow", [255, 255, 0]),
    ("orange", [255, 165, 0]),
    ("white", [255, 255, 255]),
    ("black", [0, 0, 0]),
    ("magenta", [255, 0, 255]),
    ("cyan", [0, 255, 255]),
];

pub const FALLBACK: Rgb<u8> = Rgb([255, 0, 0]);

/// CSS色名・#rrggbb・#rgb を解釈。不明な値は赤
pub fn parse_color(value: &str) -> Rgb<u8> {
    let value = value.trim().to_lowercase();
    if let Some(hex) = value.strip_prefix('#') {
        return parse_hex(hex).unwrap_or(FALLBACK);
    }
    NAMED
        .iter()
        .find(|(name, _)| *name == value)
        .map(|(_, rgb)| Rgb(*rgb))
        .unwrap_or(FALLBACK)
}

fn parse_hex(hex: &str) -> Option<Rgb<u8>> {
    if !hex.is_ascii() {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        6 => Some(Rgb([
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        ])),
        3 => {
            let mut rgb = [0u8; 3];
            for (i, c) in hex.chars().enumerate() {
                let v = c.to_digit(16)? as u8;
                rgb[i] = v * 17;
            }
            Some(Rgb(rgb))
        }
        _ => None,
    }
}
