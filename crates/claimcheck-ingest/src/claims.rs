//! Claims registry loader (YAML list of `{latex, lean}` mappings).

use crate::error::IngestError;
use claimcheck_kernel::ClaimEntry;
use serde_yaml::Value;
use std::fs;
use std::path::Path;

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.trim().to_string()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn claim_entry(index: usize, value: &Value, path: &str) -> Result<ClaimEntry, IngestError> {
    let malformed = |message: String| IngestError::Claims {
        path: path.to_string(),
        message,
    };
    let Value::Mapping(mapping) = value else {
        return Err(malformed(format!("entry {index} is not a mapping")));
    };

    let field = |name: &str| {
        mapping
            .get(name)
            .and_then(scalar_text)
            .filter(|text| !text.is_empty())
            .ok_or_else(|| malformed(format!("entry {index} is missing `{name}`")))
    };
    Ok(ClaimEntry::new(field("latex")?, field("lean")?))
}

/// Parse a claims document. An empty document is an empty registry.
pub fn parse_claims(text: &str, path: &str) -> Result<Vec<ClaimEntry>, IngestError> {
    let document: Value = serde_yaml::from_str(text).map_err(|source| IngestError::Yaml {
        path: path.to_string(),
        source,
    })?;
    let entries = match &document {
        Value::Null => return Ok(Vec::new()),
        Value::Sequence(entries) => entries,
        _ => {
            return Err(IngestError::Claims {
                path: path.to_string(),
                message: "expected a list of claims".to_string(),
            });
        }
    };

    let claims = entries
        .iter()
        .enumerate()
        .map(|(index, value)| claim_entry(index, value, path))
        .collect::<Result<Vec<_>, _>>()?;
    tracing::debug!(path, claims = claims.len(), "claims loaded");
    Ok(claims)
}

pub fn read_claims(path: &Path) -> Result<Vec<ClaimEntry>, IngestError> {
    let text = fs::read_to_string(path).map_err(|e| IngestError::io(path, e))?;
    parse_claims(&text, &path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_entries_and_coerces_scalars() {
        let claims = parse_claims(
            "- latex: \" Psi:main \"\n  lean: Psi.Main\n- latex: Lk:aux\n  lean: 42\n",
            "claims.yaml",
        )
        .expect("claims should parse");
        assert_eq!(
            claims,
            vec![
                ClaimEntry::new("Psi:main", "Psi.Main"),
                ClaimEntry::new("Lk:aux", "42"),
            ]
        );
    }

    #[test]
    fn empty_document_is_empty_registry() {
        assert_eq!(parse_claims("", "claims.yaml").expect("empty is fine"), Vec::new());
    }

    #[test]
    fn rejects_wrong_shapes() {
        let err = parse_claims("latex: x\n", "claims.yaml").expect_err("must fail");
        assert_eq!(
            err.to_string(),
            "invalid claims registry at claims.yaml: expected a list of claims"
        );

        let err = parse_claims("- just a string\n", "claims.yaml").expect_err("must fail");
        assert_eq!(
            err.to_string(),
            "invalid claims registry at claims.yaml: entry 0 is not a mapping"
        );

        let err = parse_claims("- latex: Psi:a\n  lean: \"  \"\n", "claims.yaml")
            .expect_err("must fail");
        assert_eq!(
            err.to_string(),
            "invalid claims registry at claims.yaml: entry 0 is missing `lean`"
        );

        let err = parse_claims("- [unclosed\n", "claims.yaml").expect_err("must fail");
        assert!(matches!(err, IngestError::Yaml { .. }));
    }
}
