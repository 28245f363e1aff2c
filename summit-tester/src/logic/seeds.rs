use anyhow::{Result, bail};

/// Parse CLI seed tokens. Negative numbers map to their magnitude.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<u64>> {
    let mut seeds = Vec::new();
    for token in tokens {
        if let Ok(value) = token.parse::<u64>() {
            seeds.push(value);
        } else if let Ok(value) = token.parse::<i64>() {
            seeds.push(value.unsigned_abs());
        } else if let Some(hex) = token.strip_prefix("0x")
            && let Ok(value) = u64::from_str_radix(hex, 16)
        {
            seeds.push(value);
        } else {
            bail!("invalid seed: {token}");
        }
    }
    seeds.dedup();
    if seeds.is_empty() {
        bail!("no seeds provided");
    }
    Ok(seeds)
}
