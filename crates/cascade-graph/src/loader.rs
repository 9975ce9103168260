//! Edge-list loading and binary dump/reload.
//!
//! Text input is one edge per line, `source destination [weight]`, blank
//! lines and `#` comments skipped. The `weighted` flag must match the input:
//! a weight column on an unweighted load (or a missing one on a weighted
//! load) is a [`LoadError::WeightMismatch`], not a silent guess. Unweighted
//! input gets uniform weights in (0, 1) drawn from a caller-supplied RNG
//! stream so repeated loads with the same seed produce the same graph.
//!
//! The binary format is a versioned bincode dump of the fully built
//! [`CsrGraph`] — reloading skips parsing and remapping entirely.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::csr::CsrGraph;
use crate::error::LoadError;

/// Magic prefix of the binary dump, followed by a format version byte.
const BINARY_MAGIC: &[u8; 4] = b"CGR\0";
const BINARY_VERSION: u8 = 1;

// ─────────────────────────────────────────────
// Options
// ─────────────────────────────────────────────

/// How to interpret a text edge list.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    /// Input carries a weight column in (0, 1].
    pub weighted: bool,
    /// Every input edge is mirrored in the opposite direction.
    pub undirected: bool,
}

// ─────────────────────────────────────────────
// Text edge lists
// ─────────────────────────────────────────────

/// Load a text edge list from `path`.
///
/// `weight_rng` supplies weights for unweighted input; it is untouched for
/// weighted input.
pub fn load_edge_list<P, R>(
    path: P,
    options: LoadOptions,
    weight_rng: &mut R,
) -> Result<CsrGraph, LoadError>
where
    P: AsRef<Path>,
    R: Rng,
{
    let file = File::open(path)?;
    parse_edge_list(BufReader::new(file), options, weight_rng)
}

/// Parse an edge list from any reader. See [`load_edge_list`].
pub fn parse_edge_list<B, R>(
    reader: B,
    options: LoadOptions,
    weight_rng: &mut R,
) -> Result<CsrGraph, LoadError>
where
    B: BufRead,
    R: Rng,
{
    let mut edges: Vec<(u64, u64, f32)> = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let mut fields = trimmed.split_whitespace();
        let source = parse_vertex(fields.next(), line_no)?;
        let destination = parse_vertex(fields.next(), line_no)?;
        let weight_field = fields.next();

        if fields.next().is_some() {
            return Err(LoadError::Parse {
                line: line_no,
                reason: "more than three columns".into(),
            });
        }

        let weight = match (options.weighted, weight_field) {
            (true, Some(field)) => {
                let w: f32 = field.parse().map_err(|_| LoadError::Parse {
                    line: line_no,
                    reason: format!("invalid weight '{field}'"),
                })?;
                if !(w > 0.0 && w <= 1.0) {
                    return Err(LoadError::InvalidWeight { line: line_no, weight: w });
                }
                w
            }
            (false, None) => weight_rng.gen_range(f32::EPSILON..1.0),
            // Column count contradicts the flag.
            (true, None) | (false, Some(_)) => {
                return Err(LoadError::WeightMismatch { line: line_no });
            }
        };

        edges.push((source, destination, weight));
        if options.undirected {
            edges.push((destination, source, weight));
        }
    }

    if edges.is_empty() {
        return Err(LoadError::Empty);
    }

    Ok(CsrGraph::from_edges(&edges))
}

fn parse_vertex(field: Option<&str>, line: usize) -> Result<u64, LoadError> {
    let field = field.ok_or_else(|| LoadError::Parse {
        line,
        reason: "expected 'source destination [weight]'".into(),
    })?;
    field.parse().map_err(|_| LoadError::Parse {
        line,
        reason: format!("invalid vertex id '{field}'"),
    })
}

// ─────────────────────────────────────────────
// Binary dump / reload
// ─────────────────────────────────────────────

#[derive(Serialize, Deserialize)]
struct BinaryDump {
    graph: CsrGraph,
}

/// Write a reloadable binary dump of `graph` to `path`.
pub fn dump_binary<P: AsRef<Path>>(path: P, graph: &CsrGraph) -> Result<(), LoadError> {
    let file = File::create(path)?;
    let mut w = BufWriter::new(file);
    w.write_all(BINARY_MAGIC)?;
    w.write_all(&[BINARY_VERSION])?;
    bincode::serialize_into(&mut w, &BinaryDump { graph: graph.clone() })?;
    w.flush()?;
    Ok(())
}

/// Reload a graph previously written by [`dump_binary`].
pub fn load_binary<P: AsRef<Path>>(path: P) -> Result<CsrGraph, LoadError> {
    let file = File::open(path)?;
    let mut r = BufReader::new(file);

    let mut magic = [0u8; 4];
    r.read_exact(&mut magic)?;
    if &magic != BINARY_MAGIC {
        return Err(LoadError::BadBinary("bad magic bytes".into()));
    }
    let mut version = [0u8; 1];
    r.read_exact(&mut version)?;
    if version[0] != BINARY_VERSION {
        return Err(LoadError::BadBinary(format!(
            "format version {} (expected {BINARY_VERSION})",
            version[0]
        )));
    }

    let dump: BinaryDump = bincode::deserialize_from(&mut r)?;
    Ok(dump.graph)
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csr::Direction;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::io::Cursor;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn weighted_chain_parses() {
        let input = "0 1 1.0\n1 2 0.5\n";
        let g = parse_edge_list(
            Cursor::new(input),
            LoadOptions { weighted: true, undirected: false },
            &mut rng(),
        )
        .unwrap();
        assert_eq!(g.num_nodes(), 3);
        assert_eq!(g.num_edges(), 2);
    }

    #[test]
    fn comments_and_blank_lines_skipped() {
        let input = "# header\n\n0 1 0.3\n# trailing\n";
        let g = parse_edge_list(
            Cursor::new(input),
            LoadOptions { weighted: true, undirected: false },
            &mut rng(),
        )
        .unwrap();
        assert_eq!(g.num_edges(), 1);
    }

    #[test]
    fn unweighted_input_draws_reproducible_weights() {
        let input = "0 1\n1 2\n";
        let opts = LoadOptions::default();
        let g1 = parse_edge_list(Cursor::new(input), opts, &mut rng()).unwrap();
        let g2 = parse_edge_list(Cursor::new(input), opts, &mut rng()).unwrap();

        let w1: Vec<f32> = g1.neighbors(0, Direction::Forward).map(|(_, w)| w).collect();
        let w2: Vec<f32> = g2.neighbors(0, Direction::Forward).map(|(_, w)| w).collect();
        assert_eq!(w1, w2, "same seed must give the same drawn weights");
        assert!(w1[0] > 0.0 && w1[0] < 1.0);
    }

    #[test]
    fn weight_column_on_unweighted_load_is_rejected() {
        let input = "0 1 0.5\n";
        let err = parse_edge_list(Cursor::new(input), LoadOptions::default(), &mut rng())
            .unwrap_err();
        assert!(matches!(err, LoadError::WeightMismatch { line: 1 }));
    }

    #[test]
    fn missing_weight_column_on_weighted_load_is_rejected() {
        let input = "0 1 1.0\n1 2\n";
        let err = parse_edge_list(
            Cursor::new(input),
            LoadOptions { weighted: true, undirected: false },
            &mut rng(),
        )
        .unwrap_err();
        assert!(matches!(err, LoadError::WeightMismatch { line: 2 }));
    }

    #[test]
    fn out_of_range_weight_is_rejected() {
        for bad in ["0 1 0.0", "0 1 1.5", "0 1 -0.2"] {
            let err = parse_edge_list(
                Cursor::new(bad),
                LoadOptions { weighted: true, undirected: false },
                &mut rng(),
            )
            .unwrap_err();
            assert!(matches!(err, LoadError::InvalidWeight { line: 1, .. }), "input: {bad}");
        }
    }

    #[test]
    fn garbage_vertex_is_a_parse_error() {
        let input = "0 x 0.5\n";
        let err = parse_edge_list(
            Cursor::new(input),
            LoadOptions { weighted: true, undirected: false },
            &mut rng(),
        )
        .unwrap_err();
        assert!(matches!(err, LoadError::Parse { line: 1, .. }));
    }

    #[test]
    fn undirected_mirrors_each_edge() {
        let input = "0 1 0.4\n";
        let g = parse_edge_list(
            Cursor::new(input),
            LoadOptions { weighted: true, undirected: true },
            &mut rng(),
        )
        .unwrap();
        assert_eq!(g.num_edges(), 2);
        assert_eq!(g.neighbors(1, Direction::Forward).count(), 1);
    }

    #[test]
    fn empty_input_is_an_error() {
        let err = parse_edge_list(Cursor::new("# nothing\n"), LoadOptions::default(), &mut rng())
            .unwrap_err();
        assert!(matches!(err, LoadError::Empty));
    }

    #[test]
    fn binary_dump_round_trips() {
        let input = "5 9 0.5\n9 5 0.25\n9 11 1.0\n";
        let g = parse_edge_list(
            Cursor::new(input),
            LoadOptions { weighted: true, undirected: false },
            &mut rng(),
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.bin");
        dump_binary(&path, &g).unwrap();
        let reloaded = load_binary(&path).unwrap();

        assert_eq!(reloaded.num_nodes(), g.num_nodes());
        assert_eq!(reloaded.num_edges(), g.num_edges());
        assert_eq!(reloaded.to_external(&[0, 1, 2]), g.to_external(&[0, 1, 2]));
    }

    #[test]
    fn binary_reload_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("junk.bin");
        std::fs::write(&path, b"not a graph dump").unwrap();
        assert!(matches!(load_binary(&path), Err(LoadError::BadBinary(_))));
    }
}
