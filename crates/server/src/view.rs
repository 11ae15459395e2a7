// server/view.rs
// Board page - one self-contained HTML document per date

use labor_board_core::{
    recommend_all, DayRecord, LaborBoard, PositionEntry, SlotAssignment, TopPerformer,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Everything the board page shows for one date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardPage {
    pub date: String,
    pub catalog: Vec<PositionEntry>,
    pub slots: Vec<SlotAssignment>,
    pub associates: Vec<String>,
    pub top_performers: Vec<TopPerformer>,
    pub recommendations: BTreeMap<String, Vec<String>>,
}

impl BoardPage {
    /// Snapshot `day` with freshly shuffled recommendations.
    pub fn build<R: Rng + ?Sized>(
        date: &str,
        board: &LaborBoard,
        day: &DayRecord,
        rng: &mut R,
    ) -> Self {
        Self {
            date: date.to_string(),
            catalog: board.catalog().entries().to_vec(),
            slots: day.slots.clone(),
            associates: day.associates.clone(),
            top_performers: day.top_performers.clone(),
            recommendations: recommend_all(day, rng),
        }
    }
}

const PAGE_CSS: &str = r#"
        body { font-family: system-ui, -apple-system, sans-serif; margin: 0; background: #f4f5f7; color: #1a1a2e; }
        header { background: #232f3e; color: #fff; padding: 16px 24px; display: flex; gap: 24px; align-items: center; flex-wrap: wrap; }
        header h1 { font-size: 1.3rem; margin: 0 auto 0 0; }
        main { padding: 24px; display: grid; gap: 24px; }
        section { background: #fff; border-radius: 6px; padding: 16px; box-shadow: 0 1px 2px rgba(0,0,0,0.08); }
        .labor-board-grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(220px, 1fr)); gap: 12px; }
        .slot { border: 1px solid #d5d9e0; border-radius: 4px; padding: 8px; }
        .slot.filled { border-color: #2e7d32; background: #f1f8f2; }
        .slot label { display: block; font-weight: 600; margin-bottom: 4px; }
        .catalog li { display: flex; justify-content: space-between; padding: 2px 0; }
        .top-performers li { font-weight: 600; color: #ff9900; }
        #status-message { min-height: 1.2em; }
"#;

/// Render the board page.
pub fn render_board(page: &BoardPage) -> String {
    let mut html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Pack Labor Board - {date}</title>
    <style>{css}</style>
    <link rel="stylesheet" href="/static/board.css">
</head>
<body>
    <header>
        <h1>Pack Labor Board</h1>
        <div>
            <input type="date" id="date-input" value="{date}">
            <button id="go-button">Go</button>
        </div>
        <div>
            <input type="file" id="file-upload" accept=".csv,.xlsx">
            <button id="upload-button">Upload roster</button>
            <div id="status-message"></div>
        </div>
    </header>
    <main id="board" data-date="{date}">
"#,
        date = escape_html(&page.date),
        css = PAGE_CSS,
    );

    html.push_str(&render_top_performers(&page.top_performers));
    html.push_str(&render_catalog(&page.catalog));
    html.push_str(&render_slots(page));

    html.push_str(&format!(
        r#"        <section>
            <h2>Associates ({})</h2>
            <p>{}</p>
        </section>
    </main>
    <script src="/static/board.js"></script>
</body>
</html>
"#,
        page.associates.len(),
        if page.associates.is_empty() {
            "No roster uploaded for this date.".to_string()
        } else {
            page.associates
                .iter()
                .map(|a| escape_html(a))
                .collect::<Vec<_>>()
                .join(", ")
        }
    ));

    html
}

fn render_top_performers(top: &[TopPerformer]) -> String {
    let mut html = String::from("        <section class=\"top-performers\">\n            <h2>Top Performers</h2>\n");
    if top.is_empty() {
        html.push_str("            <p>None flagged.</p>\n");
    } else {
        html.push_str("            <ul>\n");
        for performer in top {
            html.push_str(&format!(
                "                <li>{}</li>\n",
                escape_html(&performer.name)
            ));
        }
        html.push_str("            </ul>\n");
    }
    html.push_str("        </section>\n");
    html
}

fn render_catalog(catalog: &[PositionEntry]) -> String {
    let mut html = String::from(
        "        <section class=\"catalog\">\n            <h2>Positions</h2>\n            <ul>\n",
    );
    for entry in catalog {
        let name = escape_html(&entry.name);
        html.push_str(&format!(
            r#"                <li><span>{name}</span><span><button class="remove-pos-btn" data-position="{name}"{disabled}>-</button> {count} <button class="add-pos-btn" data-position="{name}">+</button></span></li>
"#,
            name = name,
            count = entry.count,
            disabled = if entry.count <= 1 { " disabled" } else { "" },
        ));
    }
    html.push_str("            </ul>\n        </section>\n");
    html
}

fn render_slots(page: &BoardPage) -> String {
    let mut html = String::from(
        "        <section>\n            <h2>Assignments</h2>\n            <div class=\"labor-board-grid\">\n",
    );
    let no_recs = Vec::new();
    for slot in &page.slots {
        let recs = page.recommendations.get(&slot.slot).unwrap_or(&no_recs);
        let slot_name = escape_html(&slot.slot);

        let mut options = String::from("<option value=\"\">(open)</option>");
        if let Some(current) = &slot.associate {
            options.push_str(&format!(
                "<option value=\"{0}\" selected>{0}</option>",
                escape_html(current)
            ));
        }
        for rec in recs {
            options.push_str(&format!("<option value=\"{0}\">{0}</option>", escape_html(rec)));
        }

        html.push_str(&format!(
            r#"                <div class="slot{filled}">
                    <label>{slot}</label>
                    <select class="assign-select" data-position="{slot}">{options}</select>
                </div>
"#,
            filled = if slot.associate.is_some() { " filled" } else { "" },
            slot = slot_name,
            options = options,
        ));
    }
    html.push_str("            </div>\n        </section>\n");
    html
}

pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use labor_board_core::PositionCatalog;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn page() -> BoardPage {
        let mut board = LaborBoard::new(PositionCatalog::new([("Packer", 2), ("DropZone", 1)]));
        let day = board.get_or_create("2024-08-01");
        day.associates = vec!["Alice".into(), "Bob <B>".into()];
        day.top_performers = vec![TopPerformer {
            name: "Alice".into(),
            high_ratings: 1,
        }];
        board.assign("2024-08-01", "Packer 1", "Alice").unwrap();

        let day = board.get("2024-08-01").unwrap().clone();
        BoardPage::build("2024-08-01", &board, &day, &mut StdRng::seed_from_u64(2))
    }

    #[test]
    fn test_page_lists_every_slot() {
        let html = render_board(&page());
        assert!(html.contains(r#"data-position="Packer 1""#));
        assert!(html.contains(r#"data-position="Packer 2""#));
        assert!(html.contains(r#"data-position="DropZone""#));
        assert!(html.contains(r#"value="2024-08-01""#));
    }

    #[test]
    fn test_assigned_associate_preselected() {
        let html = render_board(&page());
        assert!(html.contains(r#"<option value="Alice" selected>Alice</option>"#));
    }

    #[test]
    fn test_names_are_escaped() {
        let html = render_board(&page());
        assert!(html.contains("Bob &lt;B&gt;"));
        assert!(!html.contains("Bob <B>"));
    }

    #[test]
    fn test_remove_disabled_at_one() {
        let html = render_board(&page());
        assert!(html.contains(r#"class="remove-pos-btn" data-position="DropZone" disabled"#));
        assert!(!html.contains(r#"class="remove-pos-btn" data-position="Packer" disabled"#));
    }

    #[test]
    fn test_board_carries_its_date() {
        let mut p = page();
        assert!(render_board(&p).contains(r#"<main id="board" data-date="2024-08-01">"#));

        p.date = "week 2".to_string();
        assert!(render_board(&p).contains(r#"data-date="week 2""#));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"<a href="x">'&'</a>"#), "&lt;a href=&quot;x&quot;&gt;&#x27;&amp;&#x27;&lt;/a&gt;");
    }
}
