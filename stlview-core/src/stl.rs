/// STL parser for binary and ASCII formats
use nom::{
    bytes::complete::{tag_no_case, take},
    character::complete::{space0, space1},
    number::complete::{float, le_f32, le_u32},
    sequence::{preceded, tuple},
    IResult,
};

use crate::error::StlError;
use crate::geometry::TriangleGeometry;

/// Size of the binary header that precedes the triangle count.
pub const HEADER_LEN: usize = 80;
/// Bytes per binary record: normal, three vertices, attribute count.
pub const RECORD_LEN: usize = 12 + 3 * 12 + 2;
/// ASCII parsing is only attempted below this size; larger buffers go straight to binary.
pub const DEFAULT_TEXT_SIZE_LIMIT: usize = 64 * 1024 * 1024;

/// The decoding path chosen for a buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StlFormat {
    Ascii,
    Binary,
}

/// Pick a decoding path. Every buffer maps to exactly one format; binary is the
/// fallback for anything that does not look like text.
pub fn detect_format(data: &[u8], text_size_limit: usize) -> StlFormat {
    let looks_textual = data.len() >= 5 && data[..5].eq_ignore_ascii_case(b"solid");
    if looks_textual && data.len() < text_size_limit {
        StlFormat::Ascii
    } else {
        StlFormat::Binary
    }
}

/// Detect and parse an STL buffer (binary or ASCII)
pub fn parse_stl(data: &[u8]) -> Result<TriangleGeometry, StlError> {
    parse_stl_with_limit(data, DEFAULT_TEXT_SIZE_LIMIT)
}

/// Like [`parse_stl`] with an explicit ASCII size threshold.
///
/// A failed ASCII attempt is retried as binary on the same bytes; only the
/// binary error is returned.
pub fn parse_stl_with_limit(data: &[u8], text_size_limit: usize) -> Result<TriangleGeometry, StlError> {
    if detect_format(data, text_size_limit) == StlFormat::Ascii {
        // Solid names are free-form and often Latin-1; invalid bytes only ever land in names.
        let text = String::from_utf8_lossy(data);
        match parse_ascii_stl(&text) {
            Ok(geometry) => return Ok(geometry),
            Err(e) => log::debug!("ASCII STL parse failed ({e}), retrying as binary"),
        }
    }

    parse_binary_stl(data)
}

/// Parse a binary STL buffer.
///
/// The declared triangle count is checked against the buffer length before
/// any record is read; trailing bytes after the last record are ignored.
pub fn parse_binary_stl(data: &[u8]) -> Result<TriangleGeometry, StlError> {
    if data.len() < HEADER_LEN + 4 {
        return Err(StlError::TooSmall(data.len()));
    }

    let body = &data[HEADER_LEN..];
    let (mut input, declared) = le_u32::<_, nom::error::Error<&[u8]>>(body)
        .map_err(|_| StlError::TooSmall(data.len()))?;
    let declared = declared as usize;

    let available = input.len() / RECORD_LEN;
    if declared > available {
        return Err(StlError::Truncated { declared, available });
    }

    let mut geometry = TriangleGeometry::with_capacity(declared);
    for index in 0..declared {
        let (rest, (normal, vertices)) =
            parse_record(input).map_err(|_| StlError::MalformedRecord(index))?;
        geometry.push_triangle(normal, vertices);
        input = rest;
    }

    Ok(geometry)
}

fn parse_record(input: &[u8]) -> IResult<&[u8], ([f32; 3], [[f32; 3]; 3])> {
    let (input, normal) = parse_le_vector3(input)?;
    let (input, a) = parse_le_vector3(input)?;
    let (input, b) = parse_le_vector3(input)?;
    let (input, c) = parse_le_vector3(input)?;
    // Attribute byte count, unused.
    let (input, _) = take(2usize)(input)?;
    Ok((input, (normal, [a, b, c])))
}

fn parse_le_vector3(input: &[u8]) -> IResult<&[u8], [f32; 3]> {
    let (input, (x, y, z)) = tuple((le_f32, le_f32, le_f32))(input)?;
    Ok((input, [x, y, z]))
}

/// Parse an ASCII STL file line by line.
///
/// `facet normal` lines set the normal applied to the following vertices;
/// `vertex` lines append a position. Every other line, including malformed
/// ones, is skipped.
pub fn parse_ascii_stl(input: &str) -> Result<TriangleGeometry, StlError> {
    let mut geometry = TriangleGeometry::new();
    let mut normal = [0.0f32; 3];

    for (number, line) in input.lines().enumerate() {
        if let Ok((_, n)) = facet_normal_line(line) {
            normal = n;
        } else if let Ok((_, position)) = vertex_line(line) {
            geometry.push_vertex(position, normal);
        } else if is_facet_line(line) {
            log::trace!("line {}: unreadable facet normal, using zero", number + 1);
            normal = [0.0; 3];
        } else if is_vertex_line(line) {
            log::trace!("line {}: skipping malformed vertex", number + 1);
        }
    }

    let vertices = geometry.vertex_count();
    if vertices == 0 {
        return Err(StlError::NoVertices);
    }
    if vertices % 3 != 0 {
        return Err(StlError::PartialTriangle(vertices));
    }

    Ok(geometry)
}

fn facet_normal_line(line: &str) -> IResult<&str, [f32; 3]> {
    let (input, _) = preceded(space0, tag_no_case("facet"))(line)?;
    let (input, _) = preceded(space1, tag_no_case("normal"))(input)?;
    parse_text_vector3(input)
}

fn vertex_line(line: &str) -> IResult<&str, [f32; 3]> {
    let (input, _) = preceded(space0, tag_no_case("vertex"))(line)?;
    parse_text_vector3(input)
}

fn parse_text_vector3(input: &str) -> IResult<&str, [f32; 3]> {
    let (input, x) = preceded(space1, float)(input)?;
    let (input, y) = preceded(space1, float)(input)?;
    let (input, z) = preceded(space1, float)(input)?;
    Ok((input, [x, y, z]))
}

fn first_word_is(line: &str, word: &str) -> bool {
    line.split_whitespace()
        .next()
        .is_some_and(|w| w.eq_ignore_ascii_case(word))
}

fn is_facet_line(line: &str) -> bool {
    first_word_is(line, "facet")
}

fn is_vertex_line(line: &str) -> bool {
    first_word_is(line, "vertex")
}
