//! Serialises a [`MapRender`] as a deck.gl JSON document (the format
//! pydeck and `@deck.gl/json` consume), plus the hover tooltip.

use crate::error::{HeatMapError, Result};
use crate::pipeline::MapRender;
use crate::record::DerivedRecord;
use crate::view::ViewState;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

const TOOLTIP_HTML: &str = "\
<b>Postcode:</b> {postcode}<br>
<b>Woonplaats:</b> {woonplaats}<br>
<b>Straatnaam:</b> {openbare_ruimte}<br>
<b>Huisnummer:</b> {huisnummer}<br>
<b>Huisletter:</b> {huisletter}<br>
<b>Energiegebruik:</b> {kJ_per_m2} kJ/m²<br>
<b>Oppervlakte:</b> {oppervlakte} m²<br>
<b>Energieklasse:</b> {Energieklasse} <br>
";

/// Hover template. `{field}` placeholders name serialized [`DerivedRecord`] fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tooltip {
    pub html: String,
    pub style: BTreeMap<String, String>,
}

impl Default for Tooltip {
    fn default() -> Self {
        let style = [
            ("backgroundColor", "white"),
            ("color", "black"),
            ("font-family", "Arial"),
            ("padding", "5px"),
            ("border-radius", "5px"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Tooltip {
            html: TOOLTIP_HTML.to_string(),
            style,
        }
    }
}

impl Tooltip {
    /// Fill the template for one record the way the map would on hover.
    /// Unknown placeholders are left as they are; missing values render empty.
    pub fn render(&self, record: &DerivedRecord) -> Result<String> {
        let fields = serde_json::to_value(record)?;
        let mut out = String::with_capacity(self.html.len());
        let mut rest = self.html.as_str();

        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            match after.find('}') {
                Some(close) => {
                    let name = &after[..close];
                    match fields.get(name) {
                        Some(serde_json::Value::String(s)) => out.push_str(s),
                        Some(serde_json::Value::Null) => {}
                        Some(value) => out.push_str(&value.to_string()),
                        None => {
                            out.push('{');
                            out.push_str(name);
                            out.push('}');
                        }
                    }
                    rest = &after[close + 1..];
                }
                None => {
                    out.push_str(&rest[open..]);
                    rest = "";
                }
            }
        }
        out.push_str(rest);
        Ok(out)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DeckLayer<'a> {
    #[serde(rename = "@@type")]
    layer_type: &'static str,
    id: &'a str,
    data: &'a [DerivedRecord],
    pickable: bool,
    filled: bool,
    extruded: bool,
    coverage: f64,
    get_hexagon: &'static str,
    get_fill_color: &'static str,
    get_elevation: &'static str,
    elevation_scale: f64,
    elevation_range: [f64; 2],
    visible: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DeckDocument<'a> {
    initial_view_state: &'a ViewState,
    map_style: &'a str,
    layers: Vec<DeckLayer<'a>>,
    tooltip: &'a Tooltip,
}

fn deck_document(render: &MapRender) -> DeckDocument<'_> {
    let layers = render
        .layers
        .iter()
        .map(|layer| DeckLayer {
            layer_type: "H3HexagonLayer",
            id: &layer.id,
            data: layer.data.as_slice(),
            pickable: layer.pickable,
            filled: layer.filled,
            extruded: layer.extruded,
            coverage: layer.coverage,
            get_hexagon: "@@=h3_index",
            get_fill_color: "@@=color",
            get_elevation: "@@=scaled_elevation",
            elevation_scale: layer.elevation_scale,
            elevation_range: layer.elevation_range,
            visible: layer.visible,
        })
        .collect();

    DeckDocument {
        initial_view_state: &render.view_state,
        map_style: &render.map_style_url,
        layers,
        tooltip: &render.tooltip,
    }
}

pub fn to_deck_json(render: &MapRender) -> Result<String> {
    Ok(serde_json::to_string_pretty(&deck_document(render))?)
}

pub fn write_deck_json<P: AsRef<Path>>(render: &MapRender, path: P) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, to_deck_json(render)?).map_err(|e| HeatMapError::io(path, e))?;
    log::info!("wrote deck document to {}", path.display());
    Ok(())
}

pub fn write_legend_html<P: AsRef<Path>>(render: &MapRender, path: P) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, render.legend.to_html()).map_err(|e| HeatMapError::io(path, e))?;
    log::info!("wrote legend to {}", path.display());
    Ok(())
}
