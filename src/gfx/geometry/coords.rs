//! Comma-separated coordinate lists

use super::GeometryError;
use crate::{
    assets::AssetSource,
    error::RenderResult,
    gfx::{
        math::{self, Vec3},
        scene::mesh::VertexData,
    },
};

/// How a coordinate file is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryLayout {
    /// 14 floats per vertex, already expanded
    Interleaved,
    /// Position triples only; normals, UVs and tangents are generated
    Positions,
}

/// Parses a comma-separated float list
///
/// All whitespace is stripped first and a trailing comma is allowed. Any
/// other empty or non-numeric token is an error, as are `NaN` and infinities.
pub fn parse_floats(text: &str) -> Result<Vec<f32>, GeometryError> {
    let cleaned: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let cleaned = cleaned.trim_end_matches(',');
    if cleaned.is_empty() {
        return Ok(Vec::new());
    }

    cleaned
        .split(',')
        .enumerate()
        .map(|(index, token)| match token.parse::<f32>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(GeometryError::InvalidNumber {
                index,
                token: token.to_string(),
            }),
        })
        .collect()
}

/// Parses a comma-separated list of `x,y,z` triples
pub fn parse_coords(text: &str) -> Result<Vec<Vec3>, GeometryError> {
    let floats = parse_floats(text)?;
    if floats.len() % 3 != 0 {
        return Err(GeometryError::IncompleteTuple { len: floats.len() });
    }

    Ok(floats
        .chunks_exact(3)
        .map(|c| math::vec3(c[0], c[1], c[2]))
        .collect())
}

/// Reads a coordinate file and builds vertex data with the given layout
pub fn load_vertex_data(
    source: &dyn AssetSource,
    path: &str,
    layout: GeometryLayout,
) -> RenderResult<VertexData> {
    let text = source.read_text(path)?;
    let data = match layout {
        GeometryLayout::Interleaved => VertexData::from_interleaved(parse_floats(&text)?)?,
        GeometryLayout::Positions => VertexData::from_positions(&parse_coords(&text)?)?,
    };

    log::debug!("Loaded {} vertices from '{}'", data.vertex_count(), path);
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{assets::MemorySource, error::RenderError};

    const TRIANGLE: &str = "0,0,0,1,0,0,0,1,0";

    #[test]
    fn test_whitespace_is_stripped() {
        let floats = parse_floats(" 1.5,\n-2 ,\t3e1 ,").unwrap();
        assert_eq!(floats, vec![1.5, -2.0, 30.0]);
    }

    #[test]
    fn test_non_numeric_token_is_rejected() {
        assert_eq!(
            parse_floats("1,abc,3"),
            Err(GeometryError::InvalidNumber {
                index: 1,
                token: "abc".to_string()
            })
        );
        assert!(parse_floats("1,,3").is_err());
        assert!(parse_floats("1,NaN,3").is_err());
    }

    #[test]
    fn test_empty_text_is_empty_list() {
        assert_eq!(parse_floats("  \n").unwrap(), Vec::<f32>::new());
    }

    #[test]
    fn test_coords_require_whole_triples() {
        assert_eq!(parse_coords(TRIANGLE).unwrap().len(), 3);
        assert_eq!(
            parse_coords("0,0,0,1"),
            Err(GeometryError::IncompleteTuple { len: 4 })
        );
    }

    #[test]
    fn test_triangle_fails_as_interleaved_layout() {
        let source = MemorySource::new().with_file("coords/tri.txt", TRIANGLE);
        let err = load_vertex_data(&source, "coords/tri.txt", GeometryLayout::Interleaved).unwrap_err();
        assert!(matches!(err, RenderError::MalformedLayout { len: 9 }));
    }

    #[test]
    fn test_triangle_loads_with_generated_attributes() {
        let source = MemorySource::new().with_file("coords/tri.txt", TRIANGLE);
        let data = load_vertex_data(&source, "coords/tri.txt", GeometryLayout::Positions).unwrap();

        assert_eq!(data.vertex_count(), 3);
        for vertex in data.vertices() {
            assert_eq!(vertex.normal, [0.0, 0.0, 1.0]);
        }
    }

    #[test]
    fn test_bad_token_surfaces_as_geometry_error() {
        let source = MemorySource::new().with_file("coords/bad.txt", "0,0,x");
        let err = load_vertex_data(&source, "coords/bad.txt", GeometryLayout::Positions).unwrap_err();
        assert!(matches!(err, RenderError::Geometry(GeometryError::InvalidNumber { .. })));
    }
}
