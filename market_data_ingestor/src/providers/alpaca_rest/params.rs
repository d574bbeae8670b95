use crate::{
    models::request_params::SnapshotRequestParams,
    providers::{ProviderError, ValidationSnafu},
};

/// Builds the query string pairs for a snapshots request.
///
/// Symbols are joined into a single comma-separated `symbols` value. The buffer is
/// sized up front since universes run to thousands of symbols.
pub fn construct_params(
    params: &SnapshotRequestParams,
) -> Result<Vec<(&'static str, String)>, ProviderError> {
    validate_symbols(&params.symbols)?;

    let capacity = params.symbols.iter().map(|s| s.len() + 1).sum();
    let mut joined = String::with_capacity(capacity);
    for (i, symbol) in params.symbols.iter().enumerate() {
        if i > 0 {
            joined.push(',');
        }
        joined.push_str(symbol);
    }

    let mut query = vec![("symbols", joined)];
    if let Some(feed) = params.feed {
        query.push(("feed", feed.as_str().to_string()));
    }
    Ok(query)
}

fn validate_symbols(symbols: &[String]) -> Result<(), ProviderError> {
    if symbols.is_empty() {
        return ValidationSnafu {
            message: "at least one symbol is required",
        }
        .fail();
    }
    if let Some(bad) = symbols
        .iter()
        .find(|s| s.is_empty() || s.contains(',') || s.chars().any(char::is_whitespace))
    {
        return ValidationSnafu {
            message: format!("invalid symbol {bad:?}"),
        }
        .fail();
    }
    Ok(())
}
