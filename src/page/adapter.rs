use crate::fill::error::FillError;
use crate::page::field_model::FieldTarget;
use crate::page::page_model::DomNode;

/// The side-effect boundary around the page. Everything downstream of
/// `snapshot` (collection, keying, resolution) is pure; only `fill` and
/// `clear` mutate the page, and there is no transactional rollback —
/// un-toggling a field clears the control outright.
pub trait PageAdapter {
    /// Extract the current page as a flat node list, document order.
    fn snapshot(&mut self) -> Result<Vec<DomNode>, FillError>;

    /// Write a value into one control.
    fn fill(&mut self, target: &FieldTarget, value: &str) -> Result<(), FillError>;

    /// Clear one control's value.
    fn clear(&mut self, target: &FieldTarget) -> Result<(), FillError>;
}

/// A recorded page mutation, kept in order.
#[derive(Debug, Clone, PartialEq)]
pub enum PageWrite {
    Fill { node_ref: u32, value: String },
    Clear { node_ref: u32 },
}

/// Offline page adapter over a pre-extracted snapshot. Writes are recorded
/// instead of applied, which backs `--dry-run` and the test suite.
pub struct SnapshotPage {
    nodes: Vec<DomNode>,
    pub writes: Vec<PageWrite>,
}

impl SnapshotPage {
    pub fn from_nodes(nodes: Vec<DomNode>) -> Self {
        Self { nodes, writes: Vec::new() }
    }

    /// Load a snapshot from a JSON file holding an array of node records.
    pub fn from_file(path: &str) -> Result<Self, FillError> {
        let content = std::fs::read_to_string(path).map_err(|e| FillError::Snapshot {
            path: path.to_string(),
            source: e,
        })?;
        let nodes: Vec<DomNode> =
            serde_json::from_str(&content).map_err(|e| FillError::JsonParse {
                context: format!("snapshot file {}", path),
                source: e,
            })?;
        Ok(Self::from_nodes(nodes))
    }

    /// Effective value of a control after all recorded writes, last wins.
    pub fn value_of(&self, node_ref: u32) -> Option<&str> {
        let mut current = None;
        for write in &self.writes {
            match write {
                PageWrite::Fill { node_ref: r, value } if *r == node_ref => {
                    current = Some(value.as_str())
                }
                PageWrite::Clear { node_ref: r } if *r == node_ref => current = None,
                _ => {}
            }
        }
        current
    }
}

impl PageAdapter for SnapshotPage {
    fn snapshot(&mut self) -> Result<Vec<DomNode>, FillError> {
        Ok(self.nodes.clone())
    }

    fn fill(&mut self, target: &FieldTarget, value: &str) -> Result<(), FillError> {
        self.writes.push(PageWrite::Fill {
            node_ref: target.node_ref,
            value: value.to_string(),
        });
        Ok(())
    }

    fn clear(&mut self, target: &FieldTarget) -> Result<(), FillError> {
        self.writes.push(PageWrite::Clear { node_ref: target.node_ref });
        Ok(())
    }
}
