//! Glue-node and introspection-counter scenarios exercising the public
//! API as an external caller would use it.
use std::str::FromStr;

use radix_prefix_tree::{Prefix, Tree};

mod common {
    use std::io::Write;

    pub fn init() {
        let _ = env_logger::builder()
            .format(|buf, record| writeln!(buf, "{}", record.args()))
            .is_test(true)
            .try_init();
    }
}

fn p(s: &str) -> Prefix {
    Prefix::from_str(s).unwrap()
}

#[test]
fn glue_nodes_are_invisible_to_walk_and_counted_separately_in_stats() {
    crate::common::init();

    let mut tree: Tree<()> = Tree::new();
    // 10.0.0.0/8 and 11.0.0.0/8 share no stored ancestor, forcing a
    // glue node at their split point.
    tree.insert(p("10.0.0.0/8"));
    tree.insert(p("11.0.0.0/8"));

    let stats = tree.stats();
    assert_eq!(stats.prefix_count, 2);
    assert!(stats.glue_count >= 1);
    assert_eq!(stats.node_count, stats.prefix_count + stats.glue_count);
    assert_eq!(tree.walk().count(), 2);
}
