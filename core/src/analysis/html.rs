//! HTML rendering of drift reports

use std::fmt::Write;

use super::report::{
    ClassificationQualityMetric, DataDriftMetric, DriftReport, ReportMetric, TargetDriftMetric,
};

const STYLE: &str = "body{font-family:sans-serif;margin:2em;color:#222}\
table{border-collapse:collapse;margin-bottom:1.5em}\
th,td{border:1px solid #ccc;padding:4px 10px;text-align:left}\
th{background:#f0f0f0}.drift{color:#b00020;font-weight:bold}.ok{color:#1b5e20}";

/// Escape text for use in element content and attribute values
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

fn verdict(drifted: bool) -> &'static str {
    if drifted {
        "<span class=\"drift\">Detected</span>"
    } else {
        "<span class=\"ok\">Not detected</span>"
    }
}

pub fn render(report: &DriftReport) -> String {
    let mut html = String::new();
    let generated = report.generated_at.format("%Y-%m-%d %H:%M:%S").to_string();

    // writing to a String cannot fail
    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Model Drift Report {}</title>\n<style>{}</style>\n</head>\n<body>\n",
        escape(&generated),
        STYLE
    );
    let _ = write!(
        html,
        "<h1>Model Drift Report</h1>\n<p>Generated {} &middot; reference rows: {} &middot; current rows: {}</p>\n",
        escape(&generated),
        report.reference_rows,
        report.current_rows
    );

    html.push_str("<h2>Summary</h2>\n<table>\n<tr><th>Metric</th><th>Score</th></tr>\n");
    for metric in &report.metrics {
        let _ = writeln!(
            html,
            "<tr><td>{}</td><td>{:.4}</td></tr>",
            escape(metric.kind().title()),
            metric.score()
        );
    }
    html.push_str("</table>\n");

    for metric in &report.metrics {
        let _ = writeln!(html, "<h2>{}</h2>", escape(metric.kind().title()));
        match metric {
            ReportMetric::DataDrift(m) => render_data_drift(&mut html, m),
            ReportMetric::TargetDrift(m) => render_target_drift(&mut html, m),
            ReportMetric::ClassificationQuality(m) => render_quality(&mut html, m),
        }
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn render_data_drift(html: &mut String, metric: &DataDriftMetric) {
    let _ = writeln!(
        html,
        "<p>Dataset drift: {} ({} of {} columns drifted, share {:.3}, threshold {:.2})</p>",
        verdict(metric.dataset_drift),
        metric.drifted_columns,
        metric.columns.len(),
        metric.share_drifted,
        metric.drift_share
    );
    html.push_str(
        "<table>\n<tr><th>Column</th><th>Test</th><th>Statistic</th><th>Threshold</th>\
         <th>Reference mean</th><th>Current mean</th><th>Drift</th></tr>\n",
    );
    for column in &metric.columns {
        let _ = writeln!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{:.4}</td><td>{:.3}</td><td>{:.3}</td><td>{:.3}</td><td>{}</td></tr>",
            escape(&column.column),
            escape(column.stattest.name()),
            column.statistic,
            column.threshold,
            column.reference_mean,
            column.current_mean,
            verdict(column.drifted)
        );
    }
    html.push_str("</table>\n");
}

fn render_target_drift(html: &mut String, metric: &TargetDriftMetric) {
    let _ = writeln!(
        html,
        "<p>Target drift: {} (Jensen-Shannon distance {:.4}, threshold {:.2})</p>",
        verdict(metric.drifted),
        metric.distance,
        metric.threshold
    );
    html.push_str("<table>\n<tr><th>Class</th><th>Reference share</th><th>Current share</th></tr>\n");
    for (label, reference, current) in &metric.distribution {
        let _ = writeln!(
            html,
            "<tr><td>{}</td><td>{:.3}</td><td>{:.3}</td></tr>",
            label, reference, current
        );
    }
    html.push_str("</table>\n");
}

fn render_quality(html: &mut String, metric: &ClassificationQualityMetric) {
    html.push_str("<table>\n<tr><th>Dataset</th><th>Accuracy</th><th>F1 (weighted)</th><th>Rows</th></tr>\n");
    for (name, scores) in [("Reference", &metric.reference), ("Current", &metric.current)] {
        let _ = writeln!(
            html,
            "<tr><td>{}</td><td>{:.4}</td><td>{:.4}</td><td>{}</td></tr>",
            name, scores.accuracy, scores.f1, scores.support
        );
    }
    html.push_str("</table>\n");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_markup() {
        assert_eq!(
            escape("<a href=\"x\">&'</a>"),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#39;&lt;/a&gt;"
        );
        assert_eq!(escape("petal_width_cm"), "petal_width_cm");
    }
}
