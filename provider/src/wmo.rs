//! WMO weather interpretation codes as reported by Open-Meteo.

pub fn description(code: u8) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 | 48 => "Fog",
        51 | 53 | 55 => "Drizzle",
        56 | 57 => "Freezing drizzle",
        61 | 63 | 65 => "Rain",
        66 | 67 => "Freezing rain",
        71 | 73 | 75 => "Snow",
        77 => "Snow grains",
        80..=82 => "Rain showers",
        85 | 86 => "Snow showers",
        95 => "Thunderstorm",
        96 | 99 => "Thunderstorm with hail",
        _ => "Unknown",
    }
}

/// A single glyph that renders with the default text font.
pub fn icon(code: u8) -> char {
    match code {
        0 | 1 => '☀',
        2 => '⛅',
        3 | 45 | 48 => '☁',
        51..=67 | 80..=82 => '☂',
        71..=77 | 85 | 86 => '❄',
        95..=99 => '⚡',
        _ => '?',
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_have_descriptions() {
        assert_eq!(description(0), "Clear sky");
        assert_eq!(description(63), "Rain");
        assert_eq!(description(99), "Thunderstorm with hail");
        assert_eq!(description(42), "Unknown");
    }

    #[test]
    fn showers_share_rain_icon() {
        assert_eq!(icon(61), icon(81));
        assert_ne!(icon(0), icon(71));
    }
}
