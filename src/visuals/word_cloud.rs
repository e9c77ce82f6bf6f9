//! SVG word cloud

use crate::config::VisualsConfig;
use crate::text::content_words;
use std::collections::HashMap;
use std::fmt::Write;

pub const EMPTY_PLACEHOLDER: &str = "No_Data_Found";

const PALETTE: [&str; 8] = [
    "#66c2a5", "#fc8d62", "#8da0cb", "#e78ac3", "#a6d854", "#ffd92f", "#e5c494", "#b3b3b3",
];
const MIN_FONT: f32 = 14.0;
const MAX_FONT: f32 = 72.0;
/// Average glyph advance as a fraction of the font size
const GLYPH_WIDTH: f32 = 0.6;
const PADDING: f32 = 10.0;

#[derive(Debug, Clone, PartialEq)]
struct PlacedWord {
    text: String,
    size: f32,
    x: f32,
    y: f32,
    color: &'static str,
}

#[derive(Debug, Clone)]
pub struct WordCloud {
    width: u32,
    height: u32,
    max_words: usize,
    background: String,
}

impl WordCloud {
    pub fn new(config: &VisualsConfig) -> Self {
        Self {
            width: config.width.max(1),
            height: config.height.max(1),
            max_words: config.max_words.max(1),
            background: config.background.clone(),
        }
    }

    /// Most frequent content words, ties broken alphabetically
    pub fn top_words(&self, text: &str) -> Vec<(String, usize)> {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for word in content_words(text) {
            *counts.entry(word).or_insert(0) += 1;
        }

        let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(self.max_words);
        ranked
    }

    /// Render `text` as an SVG document
    pub fn render(&self, text: &str) -> String {
        let mut words = self.top_words(text);
        if words.is_empty() {
            words.push((EMPTY_PLACEHOLDER.to_string(), 1));
        }

        let placed = self.layout(&words);
        let mut svg = String::new();
        let _ = write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.width,
            h = self.height
        );
        let _ = write!(
            svg,
            r#"<rect width="100%" height="100%" fill="{}"/>"#,
            escape_xml(&self.background)
        );
        for word in &placed {
            let _ = write!(
                svg,
                r#"<text x="{:.1}" y="{:.1}" font-family="Helvetica, Arial, sans-serif" font-size="{:.1}" fill="{}">{}</text>"#,
                word.x,
                word.y,
                word.size,
                word.color,
                escape_xml(&word.text)
            );
        }
        svg.push_str("</svg>");
        svg
    }

    /// Place words left to right in centred rows, largest first, until the
    /// canvas is full
    fn layout(&self, words: &[(String, usize)]) -> Vec<PlacedWord> {
        let width = self.width as f32;
        let height = self.height as f32;
        let max_count = words.iter().map(|(_, c)| *c).max().unwrap_or(1) as f32;

        let mut rows: Vec<Vec<PlacedWord>> = Vec::new();
        let mut row: Vec<PlacedWord> = Vec::new();
        let mut row_width = PADDING;
        let mut row_height = 0.0f32;
        let mut top = PADDING;

        for (i, (text, count)) in words.iter().enumerate() {
            let scale = if max_count > 1.0 {
                (*count as f32 - 1.0) / (max_count - 1.0)
            } else {
                1.0
            };
            // Shrink anything too wide for the canvas
            let mut size = MIN_FONT + (MAX_FONT - MIN_FONT) * scale;
            let chars = text.chars().count().max(1) as f32;
            size = size.min((width - 2.0 * PADDING) / (chars * GLYPH_WIDTH)).max(1.0);
            let word_width = chars * size * GLYPH_WIDTH;

            if row_width + word_width + PADDING > width && !row.is_empty() {
                top += row_height + PADDING;
                rows.push(std::mem::take(&mut row));
                row_width = PADDING;
                row_height = 0.0;
            }
            if top + size > height {
                break;
            }

            row.push(PlacedWord {
                text: text.clone(),
                size,
                x: row_width,
                y: top + size * 0.8,
                color: PALETTE[i % PALETTE.len()],
            });
            row_width += word_width + PADDING;
            row_height = row_height.max(size);
        }
        if !row.is_empty() {
            rows.push(row);
        }

        rows.into_iter()
            .flat_map(|mut row| {
                let used = row
                    .last()
                    .map(|w| w.x + w.text.chars().count() as f32 * w.size * GLYPH_WIDTH)
                    .unwrap_or(0.0);
                let shift = ((width - used - PADDING) / 2.0).max(0.0);
                row.iter_mut().for_each(|w| w.x += shift);
                row
            })
            .collect()
    }
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cloud() -> WordCloud {
        WordCloud::new(&VisualsConfig::default())
    }

    #[test]
    fn test_top_words_by_frequency() {
        let words = cloud().top_words("Moon lander moon rover moon lander. The the the.");
        assert_eq!(
            words,
            vec![
                ("moon".to_string(), 3),
                ("lander".to_string(), 2),
                ("rover".to_string(), 1)
            ]
        );
    }

    #[test]
    fn test_max_words_respected() {
        let cloud = WordCloud::new(&VisualsConfig {
            max_words: 2,
            ..VisualsConfig::default()
        });
        assert_eq!(cloud.top_words("alpha beta gamma delta").len(), 2);
    }

    #[test]
    fn test_render_svg_shape() {
        let svg = cloud().render("Chandrayaan lunar lander lunar");
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r#"width="800""#));
        assert!(svg.contains(r##"fill="#16191f""##));
        assert!(svg.contains(">lunar</text>"));
        assert!(svg.ends_with("</svg>"));
    }

    #[test]
    fn test_empty_text_renders_placeholder() {
        let svg = cloud().render("the and of");
        assert!(svg.contains(EMPTY_PLACEHOLDER));
    }

    #[test]
    fn test_layout_stays_on_canvas() {
        let text = (0..200).map(|i| format!("word{} ", i)).collect::<String>();
        let placed = cloud().layout(&cloud().top_words(&text));
        assert!(!placed.is_empty());
        for word in &placed {
            assert!(word.y <= 500.0);
            assert!(word.x >= 0.0);
        }
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("<a&b>"), "&lt;a&amp;b&gt;");
    }
}
