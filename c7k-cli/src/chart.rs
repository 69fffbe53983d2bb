//! Generate an HTML/SVG chord chart from the chord table.
//! Each chord is a small card with the seven keys drawn as dots.

use c7k_keymap::{ChordTable, Combo, KEY_COUNT};

/// Dot centre positions inside a card, by key index.
/// Keys 0-3 sit on the finger row, 4-6 on the thumb row below.
const DOTS: [(f64, f64); KEY_COUNT] = [
    (14.0, 14.0),
    (30.0, 14.0),
    (46.0, 14.0),
    (62.0, 14.0),
    (30.0, 34.0),
    (46.0, 34.0),
    (62.0, 34.0),
];
/// Dot radius.
const DOT_R: f64 = 6.0;
/// Card size in SVG pixels.
const CARD_W: f64 = 76.0;
const CARD_H: f64 = 70.0;
/// Gap between cards.
const GAP: f64 = 8.0;
/// Cards per row.
const PER_ROW: usize = 10;
/// Margin around the SVG content.
const MARGIN: f64 = 20.0;
/// Space reserved for a section title.
const TITLE_H: f64 = 30.0;
/// Card corner radius.
const R: f64 = 4.0;

/// One card: the keys to press and what they do.
struct Card {
    combo: Combo,
    label: String,
    class: &'static str,
}

/// A titled group of cards.
struct Section {
    title: &'static str,
    cards: Vec<Card>,
}

fn sections(table: &ChordTable) -> Vec<Section> {
    let triggers = vec![
        Card {
            combo: table.mouse_trigger(),
            label: "Mouse".to_string(),
            class: "card trigger",
        },
        Card {
            combo: table.layer_trigger(),
            label: "Mod".to_string(),
            class: "card trigger",
        },
    ];

    let base = table
        .entries()
        .iter()
        .map(|&(combo, key)| Card {
            combo,
            label: key.name().to_string(),
            class: "card",
        })
        .collect();

    let modifiers = table
        .modifiers()
        .iter()
        .map(|&(combo, kind)| Card {
            combo,
            label: kind.name().to_string(),
            class: "card modifier",
        })
        .collect();

    let mouse = table
        .mouse_moves()
        .iter()
        .map(|&(combo, (dx, dy))| Card {
            combo,
            label: arrow(dx, dy).to_string(),
            class: "card mouse",
        })
        .collect();

    vec![
        Section {
            title: "Triggers",
            cards: triggers,
        },
        Section {
            title: "Base layer",
            cards: base,
        },
        Section {
            title: "Modifier layer (after Mod)",
            cards: modifiers,
        },
        Section {
            title: "Mouse layer (after Mouse)",
            cards: mouse,
        },
    ]
}

fn arrow(dx: i8, dy: i8) -> &'static str {
    match (dx.signum(), dy.signum()) {
        (0, -1) => "Up",
        (0, 1) => "Down",
        (-1, 0) => "Left",
        (1, 0) => "Right",
        _ => "Move",
    }
}

/// Height of a section with `cards` cards, title included.
fn section_height(cards: usize) -> f64 {
    let rows = cards.div_ceil(PER_ROW).max(1);
    TITLE_H + rows as f64 * (CARD_H + GAP)
}

/// Render one card at its grid slot.
fn render_card(card: &Card, x: f64, y: f64) -> String {
    let mut svg = format!(
        r#"<rect x="{x}" y="{y}" width="{CARD_W}" height="{CARD_H}" rx="{R}" class="{}"/>"#,
        card.class
    );
    for (key, &(cx, cy)) in DOTS.iter().enumerate() {
        let class = if card.combo.contains(key as u8) {
            "dot down"
        } else {
            "dot"
        };
        svg.push_str(&format!(
            r#"<circle cx="{}" cy="{}" r="{DOT_R}" class="{class}"/>"#,
            x + cx,
            y + cy,
        ));
    }
    let font_class = if card.label.len() > 5 { " small" } else { "" };
    svg.push_str(&format!(
        r#"<text x="{}" y="{}" class="label{font_class}">{}</text>"#,
        x + CARD_W / 2.0,
        y + CARD_H - 12.0,
        html_escape(&card.label),
    ));
    svg
}

fn render_section(section: &Section, y_offset: f64) -> String {
    let mut svg = format!(r#"<g transform="translate({MARGIN}, {y_offset})">"#);
    svg.push_str(&format!(
        r#"<text x="0" y="18" class="section-title">{}</text>"#,
        html_escape(section.title)
    ));
    for (i, card) in section.cards.iter().enumerate() {
        let x = (i % PER_ROW) as f64 * (CARD_W + GAP);
        let y = TITLE_H + (i / PER_ROW) as f64 * (CARD_H + GAP);
        svg.push_str(&render_card(card, x, y));
    }
    svg.push_str("</g>");
    svg
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Generate the complete HTML document with inline SVG.
pub fn generate_html(table: &ChordTable) -> String {
    let sections = sections(table);
    let total_width = PER_ROW as f64 * (CARD_W + GAP) - GAP + 2.0 * MARGIN;
    let total_height = sections
        .iter()
        .map(|s| section_height(s.cards.len()))
        .sum::<f64>()
        + 2.0 * MARGIN;

    let mut html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>c7k Chords</title>
<style>
  body {{
    background: #1a1a2e;
    color: #eee;
    font-family: system-ui, -apple-system, sans-serif;
    display: flex;
    justify-content: center;
    padding: 2em;
  }}
  .card {{
    fill: #16213e;
    stroke: #0f3460;
    stroke-width: 1.5;
  }}
  .card:hover {{
    stroke: #e94560;
  }}
  .card.trigger {{
    fill: #2d1b4e;
    stroke: #e94560;
    stroke-width: 2;
  }}
  .card.modifier {{
    fill: #1b2e4e;
    stroke: #53a8b6;
  }}
  .card.mouse {{
    fill: #1b3e2e;
    stroke: #53b67a;
  }}
  .dot {{
    fill: none;
    stroke: #5a6080;
    stroke-width: 1.5;
  }}
  .dot.down {{
    fill: #e94560;
    stroke: #e94560;
  }}
  .label {{
    fill: #eee;
    font-family: "JetBrains Mono", "Fira Code", monospace;
    font-size: 12px;
    text-anchor: middle;
    dominant-baseline: middle;
    pointer-events: none;
  }}
  .label.small {{
    font-size: 9px;
  }}
  .section-title {{
    fill: #e94560;
    font-size: 16px;
    font-weight: bold;
  }}
</style>
</head>
<body>
<svg width="{total_width}" height="{total_height}" xmlns="http://www.w3.org/2000/svg">
"#
    );

    let mut y_offset = MARGIN;
    for section in &sections {
        html.push_str(&render_section(section, y_offset));
        html.push('\n');
        y_offset += section_height(section.cards.len());
    }

    html.push_str("</svg>\n</body>\n</html>\n");
    html
}
