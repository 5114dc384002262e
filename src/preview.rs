use crate::table::{Cell, NULL_DISPLAY, render_table};

/// Renders the first `rows` original and obfuscated values of one column side by side.
pub fn render_comparison(column: &str, before: &[Cell], after: &[Cell], rows: usize) -> String {
    let headers = vec![
        String::new(),
        format!("{column}_ORIG"),
        format!("{column}_OBFUSCATED"),
    ];
    let body = before
        .iter()
        .zip(after)
        .take(rows)
        .enumerate()
        .map(|(idx, (orig, obfuscated))| {
            vec![
                idx.to_string(),
                orig.as_deref().unwrap_or(NULL_DISPLAY).to_string(),
                obfuscated.as_deref().unwrap_or(NULL_DISPLAY).to_string(),
            ]
        })
        .collect::<Vec<_>>();
    render_table(&headers, &body)
}

pub fn print_comparison(column: &str, before: &[Cell], after: &[Cell], rows: usize) {
    println!("\n{}", render_comparison(column, before, after, rows));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comparison_is_limited_to_requested_rows() {
        let before = vec![Some("ab".to_string()), None, Some("cd".to_string())];
        let after = vec![Some("no".to_string()), None, Some("pq".to_string())];
        let rendered = render_comparison("name", &before, &after, 2);
        let lines = rendered.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("name_ORIG"));
        assert!(lines[0].contains("name_OBFUSCATED"));
        assert!(lines[2].contains("ab") && lines[2].contains("no"));
        assert!(lines[3].contains(NULL_DISPLAY));
        assert!(!rendered.contains("cd"));
    }
}
