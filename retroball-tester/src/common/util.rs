/// Split a comma-separated CLI value into trimmed, non-empty tokens.
pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_csv_drops_blanks() {
        assert_eq!(split_csv(" smoke, ,walk-rate,"), vec!["smoke", "walk-rate"]);
        assert!(split_csv("").is_empty());
    }
}
