//! Find command implementation

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use checktex_document::{Origin, OriginError};
use regex::Regex;

use super::{LoadOptions, load_document};

/// Print the origin record of every match of `pattern`. Matches without an
/// origin are reported as warnings and skipped.
pub fn execute(
    main: &Path,
    pattern: &str,
    in_source: bool,
    options: &LoadOptions,
    out: &mut impl Write,
) -> Result<()> {
    let pattern = Regex::new(pattern).with_context(|| format!("invalid pattern '{}'", pattern))?;
    let document = load_document(main, options)?;

    let origins: Box<dyn Iterator<Item = Result<Origin, OriginError>> + '_> = if in_source {
        Box::new(document.find_in_source(&pattern))
    } else {
        Box::new(document.find_in_text(&pattern))
    };

    let mut found = 0;
    for origin in origins {
        match origin {
            Ok(origin) => {
                serde_json::to_writer(&mut *out, &origin.serialize())?;
                writeln!(out)?;
                found += 1;
            }
            Err(err) => tracing::warn!(error = %err, "Skipping match"),
        }
    }
    tracing::info!(found, "Search finished");
    Ok(())
}
