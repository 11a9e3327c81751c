pub mod attention;
pub mod contact;
pub mod doctor;
pub mod export;
pub mod import;
pub mod layout;
pub mod log;
pub mod opportunity;
pub mod stats;

use orbit::relationship::types::ContactView;

/// "3 days ago", "today", or "never".
fn last_contact_label(view: &ContactView) -> String {
    match view.days_since_contact {
        None => "never".into(),
        Some(d) if d <= 0 => "today".into(),
        Some(1) => "yesterday".into(),
        Some(d) => format!("{d} days ago"),
    }
}

/// Shorten text to `max` characters for single-line previews.
fn preview(text: &str, max: usize) -> String {
    let flat = text.replace('\n', " ");
    if flat.chars().count() > max {
        let cut: String = flat.chars().take(max).collect();
        format!("{cut}...")
    } else {
        flat
    }
}
