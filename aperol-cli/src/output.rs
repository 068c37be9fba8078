use std::io::{self, Write};

use crossterm::{
    cursor::MoveToColumn,
    queue,
    style::{Color, Print, ResetColor, SetBackgroundColor},
};

use aperol_core::{
    Decoration,
    render::{CurrentRegion, Page},
};

const SWATCH_WIDTH: usize = 40;

/// The page as plain text lines, regions in display order.
pub fn page_lines(page: &Page) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(name) = &page.place_name {
        lines.push(format!("📍 {name}"));
        lines.push(String::new());
    }

    match &page.current {
        Some(CurrentRegion::Weather(view)) => lines.extend(view.lines()),
        Some(CurrentRegion::Error { message }) => lines.push(format!("⚠ {message}")),
        None => {}
    }

    if let Some(hourly) = &page.hourly {
        lines.push(String::new());
        lines.push("Today".to_string());
        if hourly.is_empty() {
            lines.push("  (no more hours today)".to_string());
        }
        for entry in hourly {
            lines.push(format!("  {}  {}  {}", entry.time, entry.icon, entry.temperature));
        }
    }

    if !page.forecast.is_empty() {
        lines.push(String::new());
        lines.push("Forecast".to_string());
        for card in &page.forecast {
            let mut card_lines = card.lines().into_iter();
            if let Some(date) = card_lines.next() {
                lines.push(format!("  {date}"));
            }
            lines.extend(card_lines.map(|l| format!("    {l}")));
        }
    }

    lines
}

pub fn print_page(page: &Page) {
    for line in page_lines(page) {
        println!("{line}");
    }
}

/// Terminal colour for the decoration's background.
pub fn swatch_color(decoration: &Decoration) -> Color {
    let (r, g, b) = match decoration.hue {
        Some(hue) => hsl_to_rgb(f64::from(hue), 1.0, 0.5),
        None => hex_to_rgb(&decoration.background).unwrap_or((255, 255, 255)),
    };
    Color::Rgb { r, g, b }
}

/// Queue the decoration as one coloured line over the start of the current one.
pub fn draw_decoration(out: &mut impl Write, decoration: &Decoration) -> io::Result<()> {
    queue!(
        out,
        MoveToColumn(0),
        SetBackgroundColor(swatch_color(decoration)),
        Print(" ".repeat(SWATCH_WIDTH)),
        ResetColor,
        Print(format!(" {:<24}", decoration.background))
    )
}

pub fn print_decoration(decoration: &Decoration) -> io::Result<()> {
    let mut out = io::stdout().lock();
    draw_decoration(&mut out, decoration)?;
    out.flush()
}

/// `h` in degrees, `s` and `l` in 0..=1.
pub fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (u8, u8, u8) {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let hp = (h.rem_euclid(360.0)) / 60.0;
    let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
    let (r1, g1, b1) = match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    let channel = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    (channel(r1), channel(g1), channel(b1))
}

fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let part = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some((part(0)?, part(2)?, part(4)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use aperol_core::render::{CurrentView, ForecastCard, HourlyEntry, Surface};

    #[test]
    fn primary_hues() {
        assert_eq!(hsl_to_rgb(0.0, 1.0, 0.5), (255, 0, 0));
        assert_eq!(hsl_to_rgb(120.0, 1.0, 0.5), (0, 255, 0));
        assert_eq!(hsl_to_rgb(240.0, 1.0, 0.5), (0, 0, 255));
        assert_eq!(hsl_to_rgb(360.0, 1.0, 0.5), (255, 0, 0));
    }

    #[test]
    fn resting_background_parses() {
        assert_eq!(hex_to_rgb("#e0f7fa"), Some((0xe0, 0xf7, 0xfa)));
        assert_eq!(hex_to_rgb("e0f7fa"), None);
        assert_eq!(hex_to_rgb("#xyz"), None);
    }

    #[test]
    fn swatch_follows_hue_then_rests() {
        assert_eq!(swatch_color(&Decoration::for_hue(120)), Color::Rgb { r: 0, g: 255, b: 0 });
        assert_eq!(
            swatch_color(&Decoration::initial()),
            Color::Rgb { r: 0xe0, g: 0xf7, b: 0xfa }
        );
    }

    #[test]
    fn decoration_line_resets_colour() {
        let mut buf = Vec::new();
        draw_decoration(&mut buf, &Decoration::for_hue(0)).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.contains(&" ".repeat(SWATCH_WIDTH)));
        assert!(text.trim_end().ends_with("hsl(0, 100%, 50%)"));
        let reset = text.find("\u{1b}[0m").expect("colour reset");
        assert!(reset < text.find("hsl(").unwrap());
    }

    #[test]
    fn full_page_layout() {
        let mut page = Page::default();
        page.show_place_name("Berlin");
        page.show_current(CurrentView {
            temperature: "18.2°C".into(),
            wind_speed: "11".into(),
            wind_direction: "250".into(),
            uv: None,
        });
        page.show_hourly(vec![HourlyEntry {
            time: "14:00".into(),
            icon: "⛅",
            temperature: "18°C".into(),
        }]);
        page.show_forecast(vec![ForecastCard {
            date: "Mon, Oct 19".into(),
            high: "22°C".into(),
            low: "12°C".into(),
            drink: "7".into(),
            uv: None,
        }]);

        let lines = page_lines(&page);
        assert_eq!(lines[0], "📍 Berlin");
        assert!(lines.contains(&"Temperature: 18.2°C".to_string()));
        assert!(lines.contains(&"  14:00  ⛅  18°C".to_string()));
        assert!(lines.contains(&"  Mon, Oct 19".to_string()));
        assert!(lines.contains(&"    Aperol Chance: 7".to_string()));
    }

    #[test]
    fn error_page_shows_message_only() {
        let mut page = Page::default();
        page.show_error("Geolocation is not supported on this system.");

        assert_eq!(page_lines(&page), vec!["⚠ Geolocation is not supported on this system."]);
    }
}
