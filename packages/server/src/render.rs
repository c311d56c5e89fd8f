//! Server-side HTML for the prediction form.
//!
//! One page serves both the empty form and the result of a submission. A
//! submission either ranks states or ends in a warning (bad input) or an
//! error (inference failed).

use std::fmt::Write as _;

use geo_state_geography_models::{
    COORDINATE_PRECISION, DEFAULT_LATITUDE, DEFAULT_LONGITUDE, NIGERIA_BOUNDS,
};
use geo_state_inference::RankedPrediction;

/// What to show below the form.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Ranked predictions for the submitted coordinate.
    Prediction(RankedPrediction),
    /// Input was rejected before prediction.
    Warning(String),
    /// Prediction was attempted and failed.
    Error(String),
}

/// Everything [`page`] needs to render.
#[derive(Debug, Clone)]
pub struct PageView<'a> {
    /// Latitude field value.
    pub latitude: String,
    /// Longitude field value.
    pub longitude: String,
    /// Model artifact name shown in the footer.
    pub model_name: &'a str,
    pub outcome: Option<Outcome>,
}

impl<'a> PageView<'a> {
    /// The initial form with the Abuja defaults filled in.
    #[must_use]
    pub fn initial(model_name: &'a str) -> Self {
        Self {
            latitude: format!("{DEFAULT_LATITUDE:.COORDINATE_PRECISION$}"),
            longitude: format!("{DEFAULT_LONGITUDE:.COORDINATE_PRECISION$}"),
            model_name,
            outcome: None,
        }
    }
}

const STYLE: &str = "\
body{font-family:system-ui,sans-serif;max-width:46rem;margin:2rem auto;padding:0 1rem;color:#262730}\
.inputs{display:grid;grid-template-columns:1fr 1fr;gap:1rem}\
label{display:block;font-size:.9rem;margin-bottom:.25rem}\
input{width:100%;padding:.5rem;box-sizing:border-box}\
button{margin-top:1rem;padding:.5rem 1rem;background:#ff4b4b;color:#fff;border:0;border-radius:.4rem;cursor:pointer}\
.success,.warning,.error{padding:1rem;border-radius:.4rem;margin:1.5rem 0}\
.success{background:#dff5e3}.warning{background:#fff6d6}.error{background:#ffe1e1}\
.metrics{display:grid;grid-template-columns:repeat(3,1fr);gap:1rem}\
.metric .label{font-size:.9rem}.metric .value{font-size:1.6rem}.metric .delta{color:#09ab3b}\
progress{width:100%}\
footer{margin-top:2rem;border-top:1px solid #ddd;padding-top:1rem;font-size:.8rem;color:#777}";

/// Renders the full page.
#[must_use]
pub fn page(view: &PageView<'_>) -> String {
    let mut html = String::with_capacity(4096);

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str("<title>Geo-State Predictor</title>\n");
    let _ = writeln!(html, "<style>{STYLE}</style>");
    html.push_str("</head>\n<body>\n");
    html.push_str("<h1>🗺️ Nigerian State Predictor</h1>\n");
    html.push_str("<p>Enter coordinates to predict the Nigerian state</p>\n");

    form(&mut html, view);

    match &view.outcome {
        Some(Outcome::Prediction(ranked)) => prediction(&mut html, ranked),
        Some(Outcome::Warning(message)) => {
            let _ = writeln!(html, "<div class=\"warning\">{}</div>", escape(message));
        }
        Some(Outcome::Error(message)) => {
            let _ = writeln!(html, "<div class=\"error\">{}</div>", escape(message));
        }
        None => {}
    }

    let _ = writeln!(
        html,
        "<footer>Built with Rust | Model: {}<br>\
         Developed by <a href=\"https://www.linkedin.com/in/chukwukacj\">Chijioke Jerry</a><br>\
         GitHub: <a href=\"https://github.com/mazimum86\">@mazimum86</a></footer>",
        escape(view.model_name)
    );
    html.push_str("</body>\n</html>\n");

    html
}

fn form(html: &mut String, view: &PageView<'_>) {
    let bounds = NIGERIA_BOUNDS;

    html.push_str("<form method=\"post\" action=\"/predict\">\n<div class=\"inputs\">\n");
    number_input(
        html,
        "latitude",
        "Latitude",
        bounds.south,
        bounds.north,
        &view.latitude,
    );
    number_input(
        html,
        "longitude",
        "Longitude",
        bounds.west,
        bounds.east,
        &view.longitude,
    );
    html.push_str("</div>\n<button type=\"submit\">Predict State</button>\n</form>\n");
}

fn number_input(html: &mut String, name: &str, label: &str, min: f64, max: f64, value: &str) {
    let _ = writeln!(
        html,
        "<div><label for=\"{name}\">{label}</label>\
         <input type=\"number\" id=\"{name}\" name=\"{name}\" min=\"{min:.1}\" max=\"{max:.1}\" \
         step=\"0.000001\" value=\"{}\" required></div>",
        escape(value)
    );
}

fn prediction(html: &mut String, ranked: &RankedPrediction) {
    let Some(top) = ranked.top() else {
        return;
    };

    let _ = writeln!(
        html,
        "<div class=\"success\"><strong>Predicted State:</strong> {} ({:.1}% confidence)</div>",
        escape(top.state.name()),
        top.confidence
    );

    html.push_str("<div class=\"metrics\">\n");
    for (icon, p) in ranked.with_icons() {
        let _ = writeln!(
            html,
            "<div class=\"metric\"><div class=\"label\">{icon} Prediction</div>\
             <div class=\"value\">{}</div><div class=\"delta\">{:.1}%</div>\
             <progress max=\"100\" value=\"{}\"></progress></div>",
            escape(p.state.name()),
            p.confidence,
            p.progress_percent()
        );
    }
    html.push_str("</div>\n");
}

/// Escapes text for use in HTML element content and quoted attributes.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
