//! Removal and stale-handle scenarios exercising the public API as an
//! external caller would use it.
use std::str::FromStr;

use radix_prefix_tree::{Prefix, Tree, TreeError};

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
fn removing_the_default_route_leaves_the_rest_reachable() {
    crate::common::init();

    let mut tree: Tree<()> = Tree::new();
    let default = tree.insert(p("0.0.0.0/0"));
    tree.insert(p("10.0.0.0/8"));
    tree.insert(p("10.1.0.0/16"));

    tree.remove(default).unwrap();
    assert_eq!(tree.search_exact(&p("0.0.0.0/0")), None);
    assert!(tree.search_best(&p("192.168.1.1/32")).is_none());
    assert!(tree.search_best(&p("10.2.0.0/16")).is_some());
}

#[test]
fn stale_handle_round_trip_across_operations() {
    crate::common::init();

    let mut tree: Tree<u8> = Tree::new();
    let id = tree.insert(p("192.0.2.0/24"));
    tree.set_payload(id, 1).unwrap();
    tree.remove(id).unwrap();

    assert_eq!(tree.remove(id), Err(TreeError::NotFound));
    assert_eq!(tree.payload(id), Err(TreeError::NotFound));
    assert_eq!(tree.prefix(id), Err(TreeError::NotFound));
    assert_eq!(tree.set_payload(id, 2), Err(TreeError::NotFound));
}
