//! Output Formatting Module
//!
//! Renders the per-strategy results as terminal text or JSON.

use crate::optimize::SearchAxis;
use crate::strategy::{AngleRequest, ResultCollection};

/// Format energy for display
pub fn format_energy(watt_hours: f64) -> String {
    if watt_hours >= 1000.0 {
        format!("{:.2} kWh", watt_hours / 1000.0)
    } else {
        format!("{:.1} Wh", watt_hours)
    }
}

/// Human-readable summary, one line per strategy.
pub fn render_text(request: &AngleRequest, results: &ResultCollection) -> String {
    let mut out = String::new();

    let tilt = match request.fixed_tilt {
        Some(t) => format!("fixed tilt {:.2}°", t),
        None => "free tilt".to_string(),
    };
    out.push_str(&format!(
        "Optimal panel angles for {:.4}°, {:.4}° ({})\n",
        request.latitude, request.longitude, tilt
    ));

    for (id, result) in results.iter() {
        out.push_str(&format!(
            "  {:<11} pitch {:>6.2}°  azimuth {:>6.2}°",
            id.name(),
            result.optimal_pitch,
            result.optimal_azimuth
        ));
        if let Some(search) = &result.search {
            let axis = match search.axis {
                SearchAxis::Azimuth => "azimuth",
                SearchAxis::Pitch => "pitch",
            };
            out.push_str(&format!(
                "  ({} search, {} evaluations, {}/m² per year)",
                axis,
                search.evaluations,
                format_energy(search.annual_poa)
            ));
        }
        out.push('\n');
    }
    out
}

/// JSON object keyed by strategy name.
pub fn render_json(results: &ResultCollection) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(results)
}
