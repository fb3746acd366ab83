use crate::models::{ReportRow, ReportTable};

const STYLESHEET: &str = r#"
* { -webkit-print-color-adjust: exact; print-color-adjust: exact; }
@page { margin: 15mm 12mm; }
body { font-family: Helvetica, Arial, sans-serif; font-size: 10pt; margin: 0; }
h1 { font-size: 16pt; margin: 0 0 8mm 0; }
table { border-collapse: collapse; width: 100%; }
th, td { border: 1px solid #999; padding: 3px 6px; text-align: left; vertical-align: top; }
th { background: #ddd; }
tr:last-child td { border-top: 2px solid #000; font-weight: bold; background: #eee; }
"#;

/// Printable HTML page for the table.
///
/// The heading is the optional title followed by the period label; the first
/// row becomes header cells and the last row is styled as the totals row.
pub fn generate(table: &ReportTable, title: Option<&str>, period_label: &str) -> String {
    let heading = match title.map(str::trim).filter(|t| !t.is_empty()) {
        Some(t) => format!("{} {}", html_escape(t), html_escape(period_label)),
        None => html_escape(period_label),
    };

    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", heading));
    html.push_str("<style>");
    html.push_str(STYLESHEET);
    html.push_str("</style>\n</head><body>\n");
    html.push_str(&format!("<h1>{}</h1>\n", heading));

    html.push_str("<table>\n");
    push_row(&mut html, &table.header, "th");
    for row in &table.rows {
        push_row(&mut html, row, "td");
    }
    push_row(&mut html, &table.total, "td");
    html.push_str("</table>\n</body></html>\n");

    html
}

fn push_row(html: &mut String, row: &ReportRow, tag: &str) {
    html.push_str("<tr>");
    for cell in row {
        html.push_str(&format!("<{tag}>{}</{tag}>", html_escape(&cell.to_string())));
    }
    html.push_str("</tr>\n");
}

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Cell;

    fn sample() -> ReportTable {
        ReportTable {
            header: vec![Cell::text("Date"), Cell::text("Hours"), Cell::text("Issues")],
            rows: vec![vec![
                Cell::text("2024-01-01"),
                Cell::Number(1.5),
                Cell::text("<AB-1> & AB-2"),
            ]],
            total: vec![Cell::text("Total"), Cell::text("1,5"), Cell::text("")],
        }
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(
            html_escape(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_generate_document() {
        let html = generate(&sample(), Some("Acme <GmbH>"), "Januar 2024");

        assert!(html.contains("<h1>Acme &lt;GmbH&gt; Januar 2024</h1>"));
        assert!(html.contains("<tr><th>Date</th><th>Hours</th><th>Issues</th></tr>"));
        assert!(html.contains("<td>&lt;AB-1&gt; &amp; AB-2</td>"));
        assert!(html.contains("<td>1.5</td>"));
        assert!(html.contains("print-color-adjust: exact"));
        assert!(html.contains("border-collapse: collapse"));

        let total = html.find("<tr><td>Total</td><td>1,5</td><td></td></tr>").unwrap();
        let body_end = html.find("</table>").unwrap();
        assert!(total < body_end);
        assert_eq!(html[total..body_end].matches("<tr>").count(), 1);
    }

    #[test]
    fn test_generate_without_title() {
        let html = generate(&sample(), None, "März 2024");
        assert!(html.contains("<h1>März 2024</h1>"));

        let blank = generate(&sample(), Some("  "), "März 2024");
        assert!(blank.contains("<h1>März 2024</h1>"));
    }
}
