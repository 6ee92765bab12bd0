use crate::color_scale::{ColorScale, Rgba};
use crate::constants::LEGEND_TITLE;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub color: Rgba,
    pub label: String,
}

/// Legend rows generated from a [`ColorScale`], one per bucket, so the
/// legend can never drift from the classifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub title: String,
    pub entries: Vec<LegendEntry>,
}

impl Legend {
    pub fn from_scale(scale: &ColorScale) -> Self {
        let entries = (0..scale.bucket_count())
            .map(|index| {
                let label = match scale.bucket_bounds(index) {
                    (None, Some(upper)) => format!("< {}", group_thousands(upper)),
                    (Some(lower), None) => format!("> {}", group_thousands(lower)),
                    (Some(lower), Some(upper)) => {
                        format!("{} - {}", group_thousands(lower), group_thousands(upper))
                    }
                    (None, None) => "all values".to_string(),
                };
                LegendEntry {
                    color: scale.palette()[index],
                    label,
                }
            })
            .collect();

        Legend {
            title: LEGEND_TITLE.to_string(),
            entries,
        }
    }

    /// Absolutely positioned HTML legend box for overlaying on the map.
    pub fn to_html(&self) -> String {
        let mut html = String::from(LEGEND_STYLE);
        html.push_str("<div class=\"legend\">\n");
        html.push_str(&format!(
            "    <div class=\"legend-title\">{}</div>\n",
            escape_html(&self.title)
        ));
        for entry in &self.entries {
            html.push_str(&format!(
                "    <div><span class=\"color-box\" style=\"background-color: {};\"></span> {}</div>\n",
                entry.color.to_hex(),
                escape_html(&entry.label)
            ));
        }
        html.push_str("</div>\n");
        html
    }
}

impl Default for Legend {
    fn default() -> Self {
        Legend::from_scale(&ColorScale::heat_potential())
    }
}

const LEGEND_STYLE: &str = r#"<style>
    .legend {
        position: absolute;
        bottom: 5px;
        left: 5px;
        width: 220px;
        background: white;
        padding: 10px;
        border-radius: 5px;
        font-family: Arial, sans-serif;
        font-size: 12px;
        color: black;
        box-shadow: 2px 2px 5px rgba(0,0,0,0.3);
    }
    .legend-title {
        font-weight: bold;
        margin-bottom: 5px;
    }
    .color-box {
        width: 15px;
        height: 15px;
        display: inline-block;
        margin-right: 5px;
    }
</style>
"#;

/// 1500000.0 -> "1,500,000"
fn group_thousands(value: f64) -> String {
    let rounded = value.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0 {
        grouped.insert(0, '-');
    }
    grouped
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
