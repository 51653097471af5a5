//! Edge-list file loader.
//!
//! Builds a network from a delimiter-separated edge-list file of the
//! same shape the results writer emits: optional `%` comments, an
//! optional header row naming `from`/`to`/`info` columns, one edge per
//! line. Node names are created on first reference and deduplicated.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::HarnessError;
use crate::model::EdgeRecord;

/// A loaded network: node labels in first-reference order plus the
/// directed edges between them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Network {
    pub nodes: Vec<String>,
    pub edges: Vec<EdgeRecord>,
}

impl Network {
    /// Index of a node label, if present.
    pub fn node_index(&self, label: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n == label)
    }
}

/// Load a network from an edge-list file.
///
/// Lines are lowercased and split on `sep`. A row containing both
/// `from` and `to` is a header and re-maps the column indices (an
/// `info` column is optional); otherwise the first three columns are
/// assumed. Rows with fewer than two fields are skipped.
pub fn load_network(path: &Path, sep: char) -> Result<Network, HarnessError> {
    let text = fs::read_to_string(path).map_err(|source| HarnessError::InputFile {
        path: path.to_path_buf(),
        source,
    })?;

    let mut net = Network::default();
    let mut seen: HashMap<String, usize> = HashMap::new();
    // (from, to, info) column indices; info of None means "no info column"
    let mut cols: (usize, usize, Option<usize>) = (0, 1, Some(2));

    for line in text.lines() {
        if line.is_empty() || line.starts_with('%') {
            continue;
        }
        let line = line.to_lowercase();
        let fields: Vec<&str> = line.split(sep).map(str::trim).collect();
        if fields.len() < 2 {
            continue;
        }

        if fields.contains(&"from") && fields.contains(&"to") {
            let from = fields.iter().position(|f| *f == "from").unwrap_or(0);
            let to = fields.iter().position(|f| *f == "to").unwrap_or(1);
            cols = (from, to, fields.iter().position(|f| *f == "info"));
            continue;
        }

        let mut endpoint = |name: &str| -> String {
            if !seen.contains_key(name) {
                seen.insert(name.to_string(), net.nodes.len());
                net.nodes.push(name.to_string());
            }
            name.to_string()
        };

        let from = match fields.get(cols.0) {
            Some(f) => endpoint(f),
            None => continue,
        };
        let to = match fields.get(cols.1) {
            Some(f) => endpoint(f),
            None => continue,
        };
        let info = cols
            .2
            .and_then(|i| fields.get(i))
            .map(|f| f.to_string())
            .unwrap_or_default();

        net.edges.push(EdgeRecord { from, to, info });
    }

    Ok(net)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(content: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().expect("temp file");
        f.write_all(content.as_bytes()).expect("write");
        f
    }

    #[test]
    fn test_load_basic_edges() {
        let f = write_file("a,b,friend\nb,c,rival\n");
        let net = load_network(f.path(), ',').unwrap();
        assert_eq!(net.nodes, vec!["a", "b", "c"]);
        assert_eq!(net.edges.len(), 2);
        assert_eq!(net.edges[0].info, "friend");
    }

    #[test]
    fn test_header_remaps_columns() {
        let f = write_file("info,to,from\nfriend,b,a\n");
        let net = load_network(f.path(), ',').unwrap();
        assert_eq!(net.edges[0].from, "a");
        assert_eq!(net.edges[0].to, "b");
        assert_eq!(net.edges[0].info, "friend");
    }

    #[test]
    fn test_header_without_info_column() {
        let f = write_file("from,to\na,b\n");
        let net = load_network(f.path(), ',').unwrap();
        assert_eq!(net.edges[0].info, "");
    }

    #[test]
    fn test_skips_comments_and_short_rows(){
        let f = write_file("% a comment\n\nlonely\na,b\n");
        let net = load_network(f.path(), ',').unwrap();
        assert_eq!(net.edges.len(), 1);
    }

    #[test]
    fn test_nodes_deduplicated() {
        let f = write_file("a,b\nb,a\na,b\n");
        let net = load_network(f.path(), ',').unwrap();
        assert_eq!(net.nodes, vec!["a", "b"]);
        assert_eq!(net.edges.len(), 3);
        assert_eq!(net.node_index("b"), Some(1));
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let err = load_network(Path::new("no/such/file.txt"), ',');
        assert!(matches!(err, Err(HarnessError::InputFile { .. })));
    }
}
