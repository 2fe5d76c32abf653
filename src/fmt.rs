/// Format a float as whole euros with Dutch thousands separators: € 1.234
pub fn euro(val: f64) -> String {
    let rounded = val.round();
    let negative = rounded < 0.0;
    let whole = format!("{:.0}", rounded.abs());

    let mut with_dots = String::new();
    for (i, c) in whole.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_dots.push('.');
        }
        with_dots.push(c);
    }
    let with_dots: String = with_dots.chars().rev().collect();

    if negative {
        format!("-€ {with_dots}")
    } else {
        format!("€ {with_dots}")
    }
}

/// Human-readable file size: 1.5 MB
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{size:.1} {}", UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_euro_formatting() {
        assert_eq!(euro(2993.388), "€ 2.993");
        assert_eq!(euro(-15500.0), "-€ 15.500");
        assert_eq!(euro(0.0), "€ 0");
        assert_eq!(euro(1_000_000.4), "€ 1.000.000");
        assert_eq!(euro(999.5), "€ 1.000");
        assert_eq!(euro(-0.2), "€ 0");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(1_572_864), "1.5 MB");
    }
}
