//! Textual parameter values.
//!
//! Schemas author their defaults as short strings ("0.5, 0.5", "3", "true").
//! [`parse_parameter`] turns such a string into the exact byte payload the
//! parameter occupies in a buffer.

use crate::error::LayoutError;
use crate::param_type::{ComponentKind, ParameterType, FILENAME_CAPACITY};

fn parse_error(text: &str, ty: ParameterType, reason: impl Into<String>) -> LayoutError {
    LayoutError::ParseParameter {
        text: text.to_string(),
        ty,
        reason: reason.into(),
    }
}

fn tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
}

/// Parse `text` into the byte payload of a parameter of type `ty`.
///
/// Numeric kinds accept up to their component count of comma- or
/// space-separated numbers; missing trailing components are zero. Bool accepts
/// `true`/`false`/`0`/`1`. Filenames are copied verbatim (truncated to leave a
/// terminating zero). Structure, Any and ForceEvaluate have no textual form and
/// yield an empty payload.
pub fn parse_parameter(text: &str, ty: ParameterType) -> Result<Vec<u8>, LayoutError> {
    match ty {
        ParameterType::FilenameRead | ParameterType::FilenameWrite => {
            let mut out = vec![0u8; FILENAME_CAPACITY];
            let bytes = text.as_bytes();
            let n = bytes.len().min(FILENAME_CAPACITY - 1);
            out[..n].copy_from_slice(&bytes[..n]);
            return Ok(out);
        }
        ParameterType::Bool => {
            let v: i32 = match text.trim() {
                "true" | "1" => 1,
                "false" | "0" | "" => 0,
                other => return Err(parse_error(other, ty, "expected true or false")),
            };
            return Ok(v.to_le_bytes().to_vec());
        }
        ParameterType::Structure | ParameterType::Any | ParameterType::ForceEvaluate => {
            return Ok(Vec::new());
        }
        _ => {}
    }

    let Some(kind) = ty.component_kind() else {
        return Ok(Vec::new());
    };
    let size = ty.fixed_size().unwrap_or(0);
    let capacity = size / 4;
    let mut out = Vec::with_capacity(size);
    for (i, tok) in tokens(text).enumerate() {
        if i >= capacity {
            return Err(parse_error(
                text,
                ty,
                format!("expected at most {capacity} components"),
            ));
        }
        match kind {
            ComponentKind::F32 => {
                let v: f32 = tok
                    .parse()
                    .map_err(|_| parse_error(text, ty, format!("'{tok}' is not a number")))?;
                out.extend_from_slice(&v.to_le_bytes());
            }
            ComponentKind::I32 => {
                let v: i32 = tok
                    .parse()
                    .map_err(|_| parse_error(text, ty, format!("'{tok}' is not an integer")))?;
                out.extend_from_slice(&v.to_le_bytes());
            }
        }
    }
    out.resize(size, 0);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floats(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect()
    }

    #[test]
    fn parses_vectors_with_mixed_separators() {
        let bytes = parse_parameter("0.5, 1.5 2", ParameterType::Float3).unwrap();
        assert_eq!(floats(&bytes), vec![0.5, 1.5, 2.0]);
    }

    #[test]
    fn pads_missing_components() {
        let bytes = parse_parameter("1", ParameterType::Color4).unwrap();
        assert_eq!(floats(&bytes), vec![1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn rejects_extra_components_and_garbage() {
        assert!(parse_parameter("1 2 3", ParameterType::Float2).is_err());
        assert!(parse_parameter("abc", ParameterType::Int).is_err());
        assert!(parse_parameter("maybe", ParameterType::Bool).is_err());
    }

    #[test]
    fn parses_ints_bools_and_filenames() {
        assert_eq!(parse_parameter("-3", ParameterType::Enum).unwrap(), (-3i32).to_le_bytes());
        assert_eq!(parse_parameter("true", ParameterType::Bool).unwrap(), 1i32.to_le_bytes());
        let f = parse_parameter("tex/a.png", ParameterType::FilenameRead).unwrap();
        assert_eq!(f.len(), FILENAME_CAPACITY);
        assert_eq!(&f[..9], b"tex/a.png");
        assert_eq!(f[9], 0);
    }
}
