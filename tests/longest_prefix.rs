//! Longest-prefix-match scenarios exercising the public API as an
//! external caller would use it.
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
fn default_route_falls_back_for_everything() {
    crate::common::init();

    let mut tree: Tree<&str> = Tree::new();
    let default = tree.insert(p("0.0.0.0/0"));
    tree.set_payload(default, "default").unwrap();
    let eight = tree.insert(p("10.0.0.0/8"));
    tree.set_payload(eight, "ten-slash-eight").unwrap();
    let sixteen = tree.insert(p("10.1.0.0/16"));
    tree.set_payload(sixteen, "ten-one-slash-sixteen").unwrap();

    let cases = [
        ("10.1.2.3/32", "ten-one-slash-sixteen"),
        ("10.2.0.0/16", "ten-slash-eight"),
        ("192.168.1.1/32", "default"),
    ];
    for (query, expect) in cases {
        let hit = tree.search_best(&p(query)).unwrap();
        assert_eq!(*tree.payload(hit).unwrap().unwrap(), expect, "{query}");
    }
}

#[test]
fn inserting_a_less_specific_prefix_after_a_more_specific_one() {
    crate::common::init();

    let mut tree: Tree<()> = Tree::new();
    tree.insert(p("10.1.0.0/16"));
    tree.insert(p("10.0.0.0/8"));
    tree.insert(p("0.0.0.0/0"));

    assert_eq!(tree.walk().count(), 3);
    let best = tree.search_best(&p("10.1.5.5/32")).unwrap();
    assert_eq!(tree.prefix(best).unwrap().unwrap().to_string(), "10.1.0.0/16");
}
