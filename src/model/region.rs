//! Spatial token clusters produced by segmentation.

use serde::{Deserialize, Serialize};

use super::{BoundingBox, Token};

/// What a region is believed to contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionKind {
    /// Narrative text
    Prose,
    /// Grid-like cluster to be rebuilt as a table
    TableCandidate,
}

/// A cluster of tokens hypothesized to form one logical unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Region {
    /// Region kind tag
    pub kind: RegionKind,
    /// Union of member token boxes
    pub bbox: BoundingBox,
    /// Member tokens ordered by line, then by X
    pub tokens: Vec<Token>,
}

impl Region {
    /// Create a region; the box is computed from the tokens.
    pub fn new(kind: RegionKind, tokens: Vec<Token>) -> Self {
        let bbox = BoundingBox::union_all(tokens.iter().map(|t| &t.bbox))
            .unwrap_or(BoundingBox::new(0.0, 0.0, 0.0, 0.0));
        Self { kind, bbox, tokens }
    }

    /// Create a prose region.
    pub fn prose(tokens: Vec<Token>) -> Self {
        Self::new(RegionKind::Prose, tokens)
    }

    /// Create a table candidate region.
    pub fn table_candidate(tokens: Vec<Token>) -> Self {
        Self::new(RegionKind::TableCandidate, tokens)
    }

    /// Check if this is a table candidate.
    pub fn is_table_candidate(&self) -> bool {
        self.kind == RegionKind::TableCandidate
    }

    /// Page index of the region (0 when empty).
    pub fn page(&self) -> usize {
        self.tokens.first().map(|t| t.page).unwrap_or(0)
    }

    /// Number of member tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Check if the region has no tokens.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_bbox() {
        let tokens = vec![
            Token::new("a", BoundingBox::new(10.0, 10.0, 20.0, 20.0), 2),
            Token::new("b", BoundingBox::new(30.0, 12.0, 50.0, 24.0), 2),
        ];
        let region = Region::prose(tokens);
        assert_eq!(region.bbox, BoundingBox::new(10.0, 10.0, 50.0, 24.0));
        assert_eq!(region.page(), 2);
        assert!(!region.is_table_candidate());
    }
}
