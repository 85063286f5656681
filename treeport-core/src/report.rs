// Report rendering and output files

use crate::error::ReportError;
use crate::map::ReportRow;
use chrono::Utc;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// One written group file, as listed in the HTML index.
#[derive(Debug, Clone)]
pub struct GroupFile {
    pub name: String,
    pub items: usize,
    pub file_name: String,
}

/// Keep type names usable as file names.
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "untitled".to_string()
    } else {
        cleaned
    }
}

/// The human-readable index: one striped table row per group with an inline
/// view and a download link.
pub fn render_index_html(files: &[GroupFile]) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n  <head>\n");
    html.push_str("    <title>Content report</title>\n");
    html.push_str("    <style>\ntr:nth-child(odd) {\n  background-color: #dddddd;\n}\n    </style>\n");
    html.push_str("  </head>\n  <body>\n");
    html.push_str(&format!(
        "    <p>Generated {}</p>\n",
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("    <table cellspacing=\"0\" cellpadding=\"2\">\n");

    for file in files {
        html.push_str("      <tr>\n");
        html.push_str(&format!(
            "        <td style=\"width:300px\"><strong>{}</strong></td>\n",
            file.name
        ));
        html.push_str(&format!(
            "        <td style=\"width:100px\">{} items</td>\n",
            file.items
        ));
        html.push_str(&format!(
            "        <td style=\"width:100px\"><a href=\"{}\">Open</a></td>\n",
            file.file_name
        ));
        html.push_str(&format!(
            "        <td style=\"width:100px\"><a download=\"{0}\" href=\"{0}\">Download</a></td>\n",
            file.file_name
        ));
        html.push_str("      </tr>\n");
    }

    html.push_str("    </table>\n  </body>\n</html>\n");
    html
}

/// Write one pretty-printed JSON file per group plus an `index.html` linking
/// them all. Returns the index entries in the order written.
pub fn write_report(
    dir: &Path,
    groups: &[(String, Vec<ReportRow>)],
) -> Result<Vec<GroupFile>, ReportError> {
    std::fs::create_dir_all(dir)?;

    let mut files = Vec::with_capacity(groups.len());
    for (name, rows) in groups {
        let file_name = format!("{}.json", sanitize_file_name(name));
        let body = serde_json::to_string_pretty(rows)?;
        save_file(&dir.join(&file_name), &body)?;
        files.push(GroupFile {
            name: name.clone(),
            items: rows.len(),
            file_name,
        });
    }

    let index_path = dir.join("index.html");
    save_file(&index_path, &render_index_html(&files))?;
    info!(
        "Wrote {} group files and {}",
        files.len(),
        index_path.display()
    );

    Ok(files)
}

fn save_file(path: &Path, content: &str) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}
