//! HTML pages: upload form and inspection report

use base64::{engine::general_purpose, Engine as _};
use sitesafe_core::{ClassCatalog, SafetyVerdict, Severity};
use sitesafe_eye::processing::class_color_hex;
use sitesafe_eye::InspectionReport;
use std::fmt::Write;

pub const TITLE: &str = "Construction Safety Equipment Detection";

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0; background: #f5f5f5; color: #222; }
main { max-width: 860px; margin: 0 auto; padding: 24px; background: #fff; min-height: 100vh; }
h1 { font-size: 1.8rem; }
form { margin: 16px 0 24px; display: flex; gap: 12px; align-items: center; }
img.result { max-width: 100%; border: 1px solid #ddd; }
table { border-collapse: collapse; min-width: 280px; }
th, td { border-bottom: 1px solid #e0e0e0; padding: 6px 12px; text-align: left; }
td.count { text-align: right; }
.swatch { display: inline-block; width: 12px; height: 12px; margin-right: 8px; border-radius: 2px; vertical-align: middle; }
.alert { padding: 12px 16px; border-radius: 6px; margin-top: 12px; }
.alert.warning { background: #fff4e5; color: #8a5300; }
.alert.error { background: #fdecea; color: #a4161a; }
.alert.success { background: #e8f5e9; color: #1b5e20; }
"#;

/// Escape text for inclusion in HTML content or attribute values
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

fn page(body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>{style}</style>
</head>
<body>
<main>
<h1>{title}</h1>
<p>Detects construction safety equipment (helmets, vests) and the workers wearing them in a photo, using a YOLOv8 model.</p>
<form action="/inspect" method="post" enctype="multipart/form-data">
<input type="file" name="image" accept=".jpg,.jpeg,.png,image/jpeg,image/png" required>
<button type="submit">Inspect</button>
</form>
{body}</main>
</body>
</html>
"#,
        title = TITLE,
        style = STYLE,
        body = body
    )
}

/// Upload page
pub fn index_page() -> String {
    page("")
}

/// Upload page with an error message in place of a report
pub fn error_page(message: &str) -> String {
    page(&format!(
        "<div class=\"alert error\">{}</div>\n",
        escape_html(message)
    ))
}

fn alert(severity: Severity, text: &str) -> String {
    let (class, icon) = match severity {
        Severity::Warning => ("warning", ""),
        Severity::Error => ("error", "&#9888; "),
        Severity::Success => ("success", "&#10004; "),
    };
    format!(
        "<div class=\"alert {}\">{}{}</div>\n",
        class,
        icon,
        escape_html(text)
    )
}

/// "Safety analysis" section body
pub fn verdict_html(verdict: &SafetyVerdict) -> String {
    let mut html = String::new();
    if let Some(counts) = verdict.counts() {
        let _ = writeln!(html, "<p>Total workers detected: <strong>{}</strong></p>", counts.person);
        let _ = writeln!(html, "<p>Workers without a helmet: <strong>{}</strong></p>", counts.no_helmet);
        let _ = writeln!(html, "<p>Workers without a vest: <strong>{}</strong></p>", counts.no_vest);
    }
    html.push_str(&alert(verdict.severity(), verdict.message()));
    html
}

/// Full report page for one inspected image
pub fn report_page(report: &InspectionReport, catalog: &ClassCatalog, png: Option<&[u8]>) -> String {
    let mut body = String::new();

    if let Some(png) = png {
        let _ = write!(
            body,
            "<section>\n<h2>Detection result</h2>\n<img class=\"result\" alt=\"Detection result\" src=\"data:image/png;base64,{}\">\n</section>\n",
            general_purpose::STANDARD.encode(png)
        );
    }

    body.push_str("<section>\n<h2>Detection counts</h2>\n<table>\n<thead><tr><th>Object</th><th>Count</th></tr></thead>\n<tbody>\n");
    for (label, count) in report.counts.iter() {
        let swatch = catalog
            .index_of(label)
            .map(|id| format!("<span class=\"swatch\" style=\"background:{}\"></span>", class_color_hex(id)))
            .unwrap_or_default();
        let _ = writeln!(
            body,
            "<tr><td>{}{}</td><td class=\"count\">{}</td></tr>",
            swatch,
            escape_html(label),
            count
        );
    }
    body.push_str("</tbody>\n</table>\n</section>\n");

    body.push_str("<section>\n<h2>Safety analysis</h2>\n");
    body.push_str(&verdict_html(&report.verdict));
    body.push_str("</section>\n");

    page(&body)
}
