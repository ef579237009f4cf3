use crate::compare::table::{Cell, Comparison, Mark, Row};
use std::fmt::Write;

/// Render a comparison as an HTML table body plus header, with
/// `better`/`tied` classes on highlighted cells.
pub fn to_html(comparison: &Comparison) -> String {
    let mut out = String::new();

    out.push_str("<thead>\n<tr>");
    for (idx, header) in comparison.headers.iter().enumerate() {
        if idx == 1 {
            out.push_str("<th>Stat</th>");
        }
        let side = if idx == 0 { 'A' } else { 'B' };
        let _ = write!(out, "<th id=\"player{side}Name\">");
        match &header.photo_url {
            Some(url) => {
                let _ = write!(
                    out,
                    "<img id=\"photo{side}\" src=\"{}\" style=\"display: block\">",
                    escape(url)
                );
            }
            None => {
                let _ = write!(out, "<img id=\"photo{side}\" style=\"display: none\">");
            }
        }
        let _ = write!(out, "<span class=\"player-name\">{}</span></th>", escape(&header.name));
    }
    out.push_str("</tr>\n</thead>\n<tbody id=\"comparisonBody\">\n");

    for row in &comparison.rows {
        match row {
            Row::Message { text } => {
                let _ = writeln!(out, "<tr><td colspan=\"4\">{}</td></tr>", escape(text));
            }
            Row::Section { title } => {
                let _ = writeln!(
                    out,
                    "<tr class=\"year-header\"><td colspan=\"3\"><strong>{}</strong></td></tr>",
                    escape(title)
                );
            }
            Row::Stat { left, label, right } => {
                let _ = writeln!(
                    out,
                    "<tr>{}<td><strong>{}</strong></td>{}</tr>",
                    cell(left),
                    escape(label),
                    cell(right)
                );
            }
        }
    }
    out.push_str("</tbody>\n");
    out
}

pub fn to_json(comparison: &Comparison) -> serde_json::Result<String> {
    serde_json::to_string_pretty(comparison)
}

fn cell(cell: &Cell) -> String {
    let class = match cell.mark {
        Some(Mark::Better) => " class=\"better\"",
        Some(Mark::Tied) => " class=\"tied\"",
        None => "",
    };
    format!("<td{class}>{}</td>", escape(&cell.text))
}

fn escape(text: &str) -> String {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::table::{Header, StatContext};

    fn sample() -> Comparison {
        Comparison {
            headers: [
                Header {
                    name: "Mike Trout".into(),
                    photo_url: Some("https://img/trout.png".into()),
                },
                Header {
                    name: "Kyle Tucker".into(),
                    photo_url: None,
                },
            ],
            context: StatContext::Hitting,
            rows: vec![
                Row::Section { title: "2021".into() },
                Row::Stat {
                    left: Cell {
                        text: "45".into(),
                        mark: Some(Mark::Better),
                    },
                    label: "HR".into(),
                    right: Cell::plain("30"),
                },
                Row::Section {
                    title: "Awards & Honors".into(),
                },
            ],
        }
    }

    #[test]
    fn html_marks_better_cells_and_hides_missing_photos() {
        let html = to_html(&sample());
        assert!(html.contains("<td class=\"better\">45</td><td><strong>HR</strong></td><td>30</td>"));
        assert!(html.contains("id=\"photoA\" src=\"https://img/trout.png\" style=\"display: block\""));
        assert!(html.contains("id=\"photoB\" style=\"display: none\""));
        assert!(html.contains("Awards &amp; Honors"));
    }

    #[test]
    fn message_rows_span_the_table() {
        let mut c = sample();
        c.rows = vec![Row::Message {
            text: "Cannot compare pitcher and hitter statistics.".into(),
        }];
        let html = to_html(&c);
        assert!(html.contains("<tr><td colspan=\"4\">Cannot compare pitcher and hitter statistics.</td></tr>"));
    }

    #[test]
    fn json_tags_row_kinds() {
        let json = to_json(&sample()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["rows"][0]["kind"], "section");
        assert_eq!(value["rows"][1]["left"]["mark"], "better");
        assert!(value["rows"][1]["right"].get("mark").is_none());
        assert_eq!(value["context"], "hitting");
    }
}
