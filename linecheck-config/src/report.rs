//! Build-log error boxes
//!
//! Build scripts abort with a panic; the message is drawn as a box so it
//! stands out in the wall of cargo output.

/// Inner width of the box
const WIDTH: usize = 64;

/// Draw `title` and `detail` (may be multi-line) in a box
pub fn boxed(title: &str, detail: &str) -> String {
    let rule = "═".repeat(WIDTH + 2);
    let mut out = String::new();
    out.push('\n');
    out.push_str(&format!("╔{rule}╗\n"));
    out.push_str(&boxed_line(title));
    out.push_str(&format!("╠{rule}╣\n"));
    for line in detail.lines() {
        out.push_str(&boxed_line(line));
    }
    out.push_str(&format!("╚{rule}╝\n"));
    out
}

fn boxed_line(line: &str) -> String {
    let truncated = if line.chars().count() > WIDTH {
        let head: String = line.chars().take(WIDTH - 3).collect();
        format!("{head}...")
    } else {
        line.to_string()
    };
    format!("║ {truncated:<WIDTH$} ║\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_shape() {
        let text = boxed("ERROR: harness.toml", "line one\nline two");
        let lines: Vec<&str> = text.trim().lines().collect();
        assert_eq!(lines.len(), 6);
        assert!(lines[1].contains("ERROR: harness.toml"));
        assert!(lines[3].contains("line one"));

        // Every row has the same display width
        let widths: Vec<usize> = lines.iter().map(|l| l.chars().count()).collect();
        assert!(widths.iter().all(|&w| w == WIDTH + 4));
    }

    #[test]
    fn test_long_lines_truncated() {
        let long = "x".repeat(200);
        let text = boxed("t", &long);
        assert!(text.contains("..."));
        assert!(text.lines().all(|l| l.chars().count() <= WIDTH + 4));
    }
}
