use anyhow::{Context, Result, bail};

pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

/// Parse a comma-separated percentile list. Accepts fractions (`0.9`) or
/// percents with a trailing `%` (`90%`).
pub fn parse_percentiles(s: &str) -> Result<Vec<f64>> {
    let mut percentiles = Vec::new();
    for token in split_csv(s) {
        let (number, scale) = token
            .strip_suffix('%')
            .map_or((token.as_str(), 1.0), |n| (n.trim(), 100.0));
        let value: f64 = number
            .parse()
            .with_context(|| format!("invalid percentile {token:?}"))?;
        let value = value / scale;
        if !(0.0..=1.0).contains(&value) {
            bail!("percentile {token:?} is outside [0, 1]");
        }
        percentiles.push(value);
    }
    if percentiles.is_empty() {
        bail!("at least one percentile is required");
    }
    Ok(percentiles)
}

/// `0.9` -> `90%`, `0.999` -> `99.9%`.
pub fn format_percentile(p: f64) -> String {
    let percent = format!("{:.2}", p * 100.0);
    let trimmed = percent.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed}%")
}
