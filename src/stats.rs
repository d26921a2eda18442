//! Tree-size introspection.
//!
//! A single-bit Patricia tree has no stride levels to break down, so
//! this is just the handful of whole-tree counters a caller actually
//! needs -- total nodes, how many of those hold a prefix versus are
//! glue, and a family split.
use std::fmt;

use crate::prefix::Prefix;

/// A point-in-time snapshot of [`Tree::stats`](crate::tree::Tree::stats).
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct TreeStats {
    /// Every live node, glue included.
    pub node_count: usize,
    /// Nodes that hold a stored prefix.
    pub prefix_count: usize,
    /// Nodes that don't (branching placeholders).
    pub glue_count: usize,
    pub v4_count: usize,
    pub v6_count: usize,
}

impl TreeStats {
    pub(crate) fn record(&mut self, prefix: Option<&Prefix>) {
        self.node_count += 1;
        match prefix {
            Some(p) => {
                self.prefix_count += 1;
                match p.family() {
                    crate::af::Family::V4 => self.v4_count += 1,
                    crate::af::Family::V6 => self.v6_count += 1,
                }
            }
            None => self.glue_count += 1,
        }
    }
}

impl fmt::Display for TreeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} nodes ({} prefixes, {} glue; {} v4, {} v6)",
            self.node_count,
            self.prefix_count,
            self.glue_count,
            self.v4_count,
            self.v6_count
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_splits_prefix_and_glue() {
        let mut stats = TreeStats::default();
        stats.record(None);
        stats.record(Some(&Prefix::from_ip("10.0.0.0".parse().unwrap(), 8).unwrap()));
        assert_eq!(stats.node_count, 2);
        assert_eq!(stats.glue_count, 1);
        assert_eq!(stats.prefix_count, 1);
        assert_eq!(stats.v4_count, 1);
    }
}
