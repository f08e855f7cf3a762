/// Compact token count: `999`, `1.5K`, `15K`, `2.3M`, `1.2B`
pub fn format_token_count(n: u64) -> String {
    match n {
        1_000_000_000.. => format!("{:.1}B", n as f64 / 1_000_000_000.0),
        1_000_000.. => format!("{:.1}M", n as f64 / 1_000_000.0),
        10_000.. => format!("{:.0}K", n as f64 / 1_000.0),
        1_000.. => format!("{:.1}K", n as f64 / 1_000.0),
        _ => n.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_token_count() {
        assert_eq!(format_token_count(0), "0");
        assert_eq!(format_token_count(999), "999");
        assert_eq!(format_token_count(1_000), "1.0K");
        assert_eq!(format_token_count(1_500), "1.5K");
        assert_eq!(format_token_count(15_000), "15K");
        assert_eq!(format_token_count(999_000), "999K");
        assert_eq!(format_token_count(2_300_000), "2.3M");
        assert_eq!(format_token_count(1_000_000_000), "1.0B");
        assert_eq!(format_token_count(4_560_000_000), "4.6B");
    }
}
