//! Small helpers shared by the merge pipeline and the HTTP layer.

/// Label used when a client filename sanitizes to nothing.
pub const FALLBACK_LABEL: &str = "document.pdf";

/// Turn an untrusted client filename into a display label.
///
/// Only the final path component is kept. Separators, NUL and control
/// characters become `_`, runs of `_` collapse, and leading/trailing dots,
/// spaces and underscores are trimmed so a label can never spell `..`.
/// The result is capped at 255 bytes.
///
/// Labels are for logs and bookmark titles. They never name a file on disk.
pub fn sanitize_label(name: &str) -> String {
    const NAME_MAX: usize = 255;

    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);

    let mut out = String::with_capacity(base.len());
    let mut prev_underscore = false;

    for c in base.chars() {
        let replacement = if c == '\0' || c.is_control() || c == ' ' || c == '\t' {
            '_'
        } else {
            c
        };

        if replacement == '_' {
            if !prev_underscore {
                out.push('_');
            }
            prev_underscore = true;
        } else {
            out.push(replacement);
            prev_underscore = false;
        }
    }

    let trimmed = out.trim_matches(|c| c == ' ' || c == '.' || c == '_');

    if trimmed.is_empty() {
        return FALLBACK_LABEL.to_string();
    }

    if trimmed.len() > NAME_MAX {
        let mut take = NAME_MAX;
        while take > 0 && !trimmed.is_char_boundary(take) {
            take -= 1;
        }
        trimmed[..take].to_string()
    } else {
        trimmed.to_string()
    }
}

/// Format a byte count as a human-readable string.
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{size} bytes")
    }
}
