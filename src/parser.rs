//! Input tokenizer (§4.P): turns the line-oriented pattern-file format into
//! a [`Graph`] plus a [`LayoutConfig`]. Line-by-line, no regex crate —
//! classification by substring match, extraction by manual slicing, in the
//! same spirit as the original tokenizer this format was distilled from.

use std::collections::HashMap;

use crate::config::LayoutConfig;
use crate::error::ParseError;
use crate::graph::{Graph, JacobianTuple};

const DIGITS: &str = "0123456789";
// Covers scientific notation (`1e100`) and signed literals (`-1.5`), both of
// which appear in this engine's own config defaults (e.g. `repulsion_radius`).
const DIGITS_DOT: &str = "0123456789.eE+-";

struct RawNode {
    label: String,
    pos: Option<Vec<f64>>,
}

struct RawEdge {
    source: String,
    target: String,
    length: f64,
}

struct RawJacobian {
    a: String,
    b: String,
    c: String,
    d: String,
    value: f64,
}

/// Parses the full pattern-file text. Returns the assembled graph, the
/// resolved layout configuration, and the dimensionality (2 or 3).
pub fn parse(content: &str) -> Result<(Graph, LayoutConfig, usize), ParseError> {
    let mut lines = content.lines();
    let first_line = lines.next().ok_or(ParseError::EmptyInput)?;
    let ndim = parse_ndim(first_line)?;

    let mut raw_nodes = Vec::new();
    let mut raw_edges = Vec::new();
    let mut raw_jacobians = Vec::new();
    let mut config = LayoutConfig::default();

    for (offset, line) in lines.enumerate() {
        let line_no = offset + 2; // line 1 was the dimensionality line
        let line = line.trim_start();

        if line.contains("\" -- \"") && line.starts_with('"') {
            raw_edges.push(parse_edge_line(line, line_no)?);
        } else if line.contains("---") {
            raw_jacobians.push(parse_jacobian_line(line, line_no)?);
        } else if line.starts_with('"') {
            raw_nodes.push(parse_node_line(line, line_no)?);
        } else {
            apply_config_line(line, line_no, &mut config)?;
        }
    }

    let mut index_of: HashMap<String, usize> = HashMap::new();
    for (i, node) in raw_nodes.iter().enumerate() {
        index_of.insert(node.label.clone(), i);
    }

    let mut graph = Graph::new(raw_nodes.len());
    for (i, node) in raw_nodes.into_iter().enumerate() {
        graph.add_node(i, node.label, node.pos, config.ic_guess);
    }

    for edge in raw_edges {
        match (index_of.get(&edge.source), index_of.get(&edge.target)) {
            (Some(&u), Some(&v)) => graph.add_edge(u, v, edge.length),
            _ => log::error!("edge references an undefined node: \"{}\" -- \"{}\"", edge.source, edge.target),
        }
    }

    for jac in raw_jacobians {
        let resolved = (index_of.get(&jac.a), index_of.get(&jac.b), index_of.get(&jac.c), index_of.get(&jac.d));
        match resolved {
            (Some(&i1), Some(&i2), Some(&i3), Some(&i4)) => {
                graph.jacobians.push(JacobianTuple { i1, i2, i3, i4, value: jac.value });
            }
            _ => log::error!(
                "jacobian line references an undefined node: \"{}\" --- \"{}\" --- \"{}\" --- \"{}\"",
                jac.a, jac.b, jac.c, jac.d
            ),
        }
    }

    Ok((graph, config, ndim))
}

fn parse_ndim(first_line: &str) -> Result<usize, ParseError> {
    let trimmed = first_line.trim();
    let value: i64 = trimmed
        .parse()
        .map_err(|_| ParseError::InvalidDimension(first_line.to_string()))?;
    match value {
        2 | 3 => Ok(value as usize),
        other => Err(ParseError::UnsupportedDimension(other)),
    }
}

/// Splits a line on `"`, returning the odd-indexed (quoted) segments.
fn quoted_segments(line: &str) -> Vec<&str> {
    line.split('"').skip(1).step_by(2).collect()
}

fn parse_edge_line(line: &str, line_no: usize) -> Result<RawEdge, ParseError> {
    let quoted = quoted_segments(line);
    let source = quoted.first().copied().unwrap_or_default().to_string();
    let target = quoted.get(1).copied().unwrap_or_default().to_string();

    let tail = line.rsplit('"').next().unwrap_or_default().trim();
    let length = parse_float(tail, line_no)?;

    Ok(RawEdge { source, target, length })
}

fn parse_jacobian_line(line: &str, line_no: usize) -> Result<RawJacobian, ParseError> {
    let quoted = quoted_segments(line);
    let a = quoted.first().copied().unwrap_or_default().to_string();
    let b = quoted.get(1).copied().unwrap_or_default().to_string();
    let c = quoted.get(2).copied().unwrap_or_default().to_string();
    let d = quoted.get(3).copied().unwrap_or_default().to_string();

    let tail = line.rsplit("---").next().unwrap_or_default().trim();
    let value = parse_float(tail, line_no)?;

    Ok(RawJacobian { a, b, c, d, value })
}

fn parse_node_line(line: &str, line_no: usize) -> Result<RawNode, ParseError> {
    let quoted = quoted_segments(line);
    let label = quoted.first().copied().unwrap_or_default().to_string();

    let pos = match (line.find('{'), line.find('}')) {
        (Some(start), Some(end)) if end > start => {
            let inner = &line[start + 1..end];
            let mut coords = Vec::new();
            for token in inner.split(',') {
                coords.push(parse_float(token.trim(), line_no)?);
            }
            Some(coords)
        }
        _ => None,
    };

    Ok(RawNode { label, pos })
}

fn parse_float(literal: &str, line: usize) -> Result<f64, ParseError> {
    literal.parse().map_err(|source| ParseError::InvalidNumber { literal: literal.to_string(), line, source })
}

fn parse_int(literal: &str, line: usize) -> Result<i64, ParseError> {
    literal.parse().map_err(|source| ParseError::InvalidInteger { literal: literal.to_string(), line, source })
}

/// Finds the first run of `chars` after `keyword` and returns it as a slice.
fn token_after<'a>(line: &'a str, keyword: &str, chars: &str) -> Option<&'a str> {
    let keyword_at = line.find(keyword)?;
    let rest = &line[keyword_at..];
    let start_rel = rest.find(|c: char| chars.contains(c))?;
    let start = keyword_at + start_rel;
    let end_rel = line[start..].find(|c: char| !chars.contains(c)).unwrap_or(line.len() - start);
    Some(&line[start..start + end_rel])
}

fn apply_config_line(line: &str, line_no: usize, config: &mut LayoutConfig) -> Result<(), ParseError> {
    if let Some(tok) = token_after(line, "start", DIGITS) {
        config.seed = parse_int(tok, line_no)? as u64;
    }
    if line.find("iterations").is_some() && !line.contains("viscous_iterations") {
        if let Some(tok) = token_after(line, "iterations", DIGITS) {
            config.iterations = parse_int(tok, line_no)? as usize;
        }
    }
    if let Some(tok) = token_after(line, "viscous_iterations", DIGITS) {
        config.viscous_iterations = parse_int(tok, line_no)? as usize;
    }
    if let Some(tok) = token_after(line, "repulsion_radius", DIGITS_DOT) {
        config.repulsion_radius = parse_float(tok, line_no)?;
    }
    if let Some(tok) = token_after(line, "viscous_timestep", DIGITS_DOT) {
        config.viscous_timestep = parse_float(tok, line_no)?;
    }
    if let Some(tok) = token_after(line, "viscous_damping", DIGITS_DOT) {
        config.viscous_damping = parse_float(tok, line_no)?;
    }
    if let Some(tok) = token_after(line, "inflate", DIGITS_DOT) {
        config.inflate = Some(parse_float(tok, line_no)?);
    }
    if line.find("ic_guess").is_some() && token_after(line, "ic_guess", "tT1").is_some() {
        config.ic_guess = true;
    }
    if let Some(tok) = token_after(line, "learning_rate", DIGITS_DOT) {
        config.learning_rate = parse_float(tok, line_no)?;
    }
    if let Some(tok) = token_after(line, "separate", DIGITS_DOT) {
        config.separate = parse_float(tok, line_no)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dimensionality_nodes_and_an_edge() {
        let input = "2\n\"a\" {0,0}\n\"b\" {1,0}\n\"a\" -- \"b\" 2.5\n";
        let (graph, _config, ndim) = parse(input).unwrap();
        assert_eq!(ndim, 2);
        assert_eq!(graph.num_nodes, 2);
        assert_eq!(graph.dist(0, 1), 2.5);
        assert!(graph.pinned[0]);
        assert!(graph.pinned[1]);
    }

    #[test]
    fn unpinned_node_has_no_initial_position() {
        let input = "2\n\"a\"\n\"b\" {1,1}\n";
        let (graph, _config, _ndim) = parse(input).unwrap();
        assert!(!graph.pinned[0]);
        assert!(graph.pinned[1]);
    }

    #[test]
    fn parses_config_lines_distinguishing_iterations_from_viscous_iterations() {
        let input = "2\nstart 42\niterations 1000\nviscous_iterations 20\nlearning_rate 0.25\nseparate 3.0\n";
        let (_graph, config, _ndim) = parse(input).unwrap();
        assert_eq!(config.seed, 42);
        assert_eq!(config.iterations, 1000);
        assert_eq!(config.viscous_iterations, 20);
        assert!((config.learning_rate - 0.25).abs() < 1e-12);
        assert!((config.separate - 3.0).abs() < 1e-12);
    }

    #[test]
    fn repulsion_radius_parses_scientific_notation_without_truncation() {
        let input = "2\nrepulsion_radius 1e100\n";
        let (_graph, config, _ndim) = parse(input).unwrap();
        assert!(config.repulsion_radius > 1e99);
    }

    #[test]
    fn inflate_line_enables_inflation_mode() {
        let input = "2\ninflate 1.5\n";
        let (_graph, config, _ndim) = parse(input).unwrap();
        assert_eq!(config.inflate, Some(1.5));
    }

    #[test]
    fn parses_a_jacobian_line() {
        let input = "3\n\"a\"\n\"b\"\n\"c\"\n\"d\"\n\"a\" --- \"b\" --- \"c\" --- \"d\" --- 1.0\n";
        let (graph, _config, ndim) = parse(input).unwrap();
        assert_eq!(ndim, 3);
        assert_eq!(graph.jacobians.len(), 1);
        assert_eq!(graph.jacobians[0].value, 1.0);
    }

    #[test]
    fn edge_referencing_unknown_node_is_skipped_not_fatal() {
        let input = "2\n\"a\" {0,0}\n\"a\" -- \"ghost\" 1.0\n";
        let (graph, _config, _ndim) = parse(input).unwrap();
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn malformed_numeric_literal_is_a_parse_error() {
        let input = "2\n\"a\" {0,0}\n\"b\" {1,0}\n\"a\" -- \"b\" banana\n";
        let err = parse(input).unwrap_err();
        assert!(matches!(err, ParseError::InvalidNumber { .. }));
    }

    #[test]
    fn missing_dimensionality_line_is_a_parse_error() {
        let err = parse("").unwrap_err();
        assert!(matches!(err, ParseError::EmptyInput));
    }

    #[test]
    fn unsupported_dimensionality_is_rejected() {
        let err = parse("4\n").unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedDimension(4)));
    }
}
