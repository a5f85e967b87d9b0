//! Topology Selector
//!
//! Greedy parent selection: a verified advertisement is adopted as parent only
//! if it strictly improves our rank by going through it. The root never moves.

use crate::domain::{NodeId, ParentChange, ParentRef, PeerAddr, Rank};

/// Rank and parent derived from verified advertisements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopologySelector {
    is_root: bool,
    rank: Rank,
    parent: Option<ParentRef>,
    rank_increment: Rank,
}

impl TopologySelector {
    /// Selector for the tree root (rank 0, never changes).
    pub fn root(rank_increment: Rank) -> Self {
        Self {
            is_root: true,
            rank: 0,
            parent: None,
            rank_increment,
        }
    }

    /// Selector for an ordinary node starting at `default_rank`.
    pub fn node(default_rank: Rank, rank_increment: Rank) -> Self {
        Self {
            is_root: false,
            rank: default_rank,
            parent: None,
            rank_increment,
        }
    }

    /// Whether this node is the root.
    pub fn is_root(&self) -> bool {
        self.is_root
    }

    /// Current rank.
    pub fn rank(&self) -> Rank {
        self.rank
    }

    /// Current parent, if any.
    pub fn parent(&self) -> Option<ParentRef> {
        self.parent
    }

    /// Rank we would obtain through a neighbour advertising `rank`.
    pub fn candidate_rank(&self, rank: Rank) -> Rank {
        rank.saturating_add(self.rank_increment)
    }

    /// Consider a verified advertisement from `sender_id` at `address`.
    ///
    /// Returns the change if the neighbour was adopted as parent. Ties never
    /// cause a switch.
    pub fn consider(
        &mut self,
        sender_id: NodeId,
        rank: Rank,
        address: PeerAddr,
    ) -> Option<ParentChange> {
        if self.is_root {
            return None;
        }

        let candidate = self.candidate_rank(rank);
        if candidate >= self.rank {
            return None;
        }

        let change = ParentChange {
            parent: ParentRef {
                id: sender_id,
                address,
            },
            previous_rank: self.rank,
            new_rank: candidate,
        };
        self.rank = candidate;
        self.parent = Some(change.parent);
        Some(change)
    }
}
