//! Injection-safe IRI validation
//!
//! Every IRI entering the schema path must pass this check before it is used
//! to build specialized rules or schema lists. The rejected characters are
//! the ones that would let a crafted IRI escape a serialized context.

use crate::RdfError;

/// Characters that must never appear inside an IRI
const FORBIDDEN: &[char] = &['<', '>', '{', '}', '"', '\\', '\r', '\n', ';'];

/// Validate an IRI against the injection-prone character class
///
/// Rejects empty strings and any IRI containing `<`, `>`, `{`, `}`, `"`,
/// `\`, CR, LF, or `;`. Whitespace inside an IRI is also rejected.
pub fn validate_iri(iri: &str) -> Result<(), RdfError> {
    if iri.is_empty() {
        return Err(RdfError::InvalidIri(String::from("(empty)")));
    }

    if iri
        .chars()
        .any(|c| FORBIDDEN.contains(&c) || c == ' ' || c == '\t')
    {
        return Err(RdfError::InvalidIri(iri.to_string()));
    }

    Ok(())
}

/// Extract the local name of an IRI (part after `#` or the last `/`)
pub fn local_name(iri: &str) -> &str {
    if let Some(pos) = iri.rfind('#') {
        &iri[pos + 1..]
    } else if let Some(pos) = iri.rfind('/') {
        &iri[pos + 1..]
    } else {
        iri
    }
}
