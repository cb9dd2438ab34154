use chrono::{Local, NaiveDate};

const PRESENT_WORDS: [&str; 4] = ["present", "current", "now", "today"];

/// Today's date in ISO form.
pub fn today_iso() -> String {
    Local::now().date_naive().format("%Y-%m-%d").to_string()
}

/// Normalize a date-ish value to `YYYY-MM-DD`, or reject it.
///
/// The model is instructed to normalize dates itself, but its output is not
/// trusted: anything headed for a date control passes through here, and a
/// value that cannot be normalized leaves the field unfilled rather than
/// writing garbage into the control.
pub fn normalize_date(input: &str) -> Option<String> {
    let text = input.trim();
    if text.is_empty() {
        return None;
    }

    let lower = text.to_lowercase();

    // "Present" / "Current" / "Now" / "Today" → today.
    if PRESENT_WORDS.contains(&lower.as_str()) {
        return Some(today_iso());
    }

    // Already ISO (possibly unpadded) → canonical ISO.
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date.format("%Y-%m-%d").to_string());
    }

    // Bare 4-digit year → January 1st.
    if text.len() == 4 && text.chars().all(|c| c.is_ascii_digit()) {
        return Some(format!("{}-01-01", text));
    }

    // "2017-Present", "2019 – current", ... → January 1st of the year.
    if text.len() > 4 && text.as_bytes()[..4].iter().all(u8::is_ascii_digit) {
        let tail = text[4..]
            .trim_start_matches(['-', '/', '–', '—', '_', ' ', '\t'])
            .to_lowercase();
        if PRESENT_WORDS.iter().any(|w| tail.starts_with(w)) {
            return Some(format!("{}-01-01", &text[..4]));
        }
    }

    // MM/DD/YYYY and MM-DD-YYYY. Invalid calendar dates are rejected here,
    // not passed on to the generic formats below.
    let slash_parts: Vec<&str> = text.split(['/', '-']).collect();
    if slash_parts.len() == 3 && slash_parts[2].len() == 4 {
        let month = slash_parts[0].parse::<u32>().ok()?;
        let day = slash_parts[1].parse::<u32>().ok()?;
        let year = slash_parts[2].parse::<i32>().ok()?;
        let date = NaiveDate::from_ymd_opt(year, month, day)?;
        return Some(date.format("%Y-%m-%d").to_string());
    }

    // Generic textual forms.
    for format in ["%B %d, %Y", "%b %d, %Y", "%d %B %Y", "%d %b %Y", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(date.format("%Y-%m-%d").to_string());
        }
    }

    // Month-year ("May 2019") — synthesize the first of the month.
    let padded = format!("1 {}", text);
    for format in ["%d %B %Y", "%d %b %Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(&padded, format) {
            return Some(date.format("%Y-%m-%d").to_string());
        }
    }

    None
}
