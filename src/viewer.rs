//! Standalone HTML page showing rotating ball-and-stick models of the
//! selected molecules with the ChemDoodle Web Components.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};

use crate::data::model::MoleculeRecord;

/// Default file name offered by the save dialog.
pub const VIEWER_FILE_NAME: &str = "structures.html";

const CANVAS_SIZE: u32 = 125;

const HEAD: &str = r#"<link href="https://cdn.jsdelivr.net/npm/bootstrap@5.3.0-alpha1/dist/css/bootstrap.min.css" rel="stylesheet" integrity="sha384-GLhlTQ8iRABdZLl6O3oVMWSktQOp6b7In1Zl3/Jr59b6EGGoI1aFkw7cmDA6j6gD" crossorigin="anonymous">
<script src="https://cdnjs.cloudflare.com/ajax/libs/jquery/2.2.4/jquery.min.js"></script>
<script type="text/javascript" src="https://brandt-gaches.space/dev/ChemDoodleWeb.js"></script>
<link rel="stylesheet" href="https://brandt-gaches.space/dev/ChemDoodleWeb.css" type="text/css">
"#;

/// Render the viewer page for `records`. An empty slice gives an empty
/// document.
pub fn render_viewer_html(records: &[&MoleculeRecord]) -> Result<String> {
    if records.is_empty() {
        return Ok("<html>\n<body>\n</body>\n</html>\n".to_string());
    }

    let mut html = String::from("<html>\n<body>\n");
    html.push_str(HEAD);

    html.push_str("<script>\n");
    for (i, record) in records.iter().enumerate() {
        let payload = script_string_literal(record.structure.as_str())
            .with_context(|| format!("encoding structure of {}", record.id))?;
        writeln!(
            html,
            "var rotator{i} = new ChemDoodle.RotatorCanvas3D('canvas3d{i}', {CANVAS_SIZE}, {CANVAS_SIZE});\n\
             rotator{i}.styles.set3DRepresentation('Ball and Stick');\n\
             rotator{i}.styles.backgroundColor = 'transparent';\n\
             rotator{i}.styles.atoms_useJMOLColors = true;\n\
             rotator{i}.loadMolecule(ChemDoodle.readPDB({payload}));\n\
             rotator{i}.startAnimation();"
        )?;
    }
    html.push_str("</script>\n");

    html.push_str("<div class=\"container\">\n<center>\n<div class=\"row\">\n");
    for (i, record) in records.iter().enumerate() {
        writeln!(
            html,
            "<div class=\"col-md-3 col-sm-6 col-xs-12\" title=\"{}\">\n\
             <canvas id=\"canvas3d{i}\" class=\"ChemDoodleWebComponent\"></canvas>\n\
             </div>",
            html_escape(&record.label)
        )?;
    }
    html.push_str("</div>\n</center>\n</div>\n</body>\n</html>\n");
    Ok(html)
}

/// Write the viewer page for `records` to `path`.
pub fn write_viewer_html(path: &Path, records: &[&MoleculeRecord]) -> Result<()> {
    let html = render_viewer_html(records)?;
    std::fs::write(path, html).with_context(|| format!("writing {}", path.display()))?;
    log::info!("Exported viewer for {} molecules to {}", records.len(), path.display());
    Ok(())
}

/// Encode `text` as a JavaScript string literal that is also safe inside
/// an HTML `<script>` element.
fn script_string_literal(text: &str) -> serde_json::Result<String> {
    let json = serde_json::to_string(text)?;
    let mut out = String::with_capacity(json.len());
    for c in json.chars() {
        match c {
            '<' => out.push_str("\\u003c"),
            '>' => out.push_str("\\u003e"),
            '&' => out.push_str("\\u0026"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c => out.push(c),
        }
    }
    Ok(out)
}

fn html_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
