use wavl_rank::WavlTree;

fn main() {
    let mut tree: WavlTree<String> = WavlTree::new();

    for key in [2, 0, 3, 4, 5, 1, 6] {
        let ops = tree
            .insert(key, format!("v{key}"))
            .expect("keys are distinct");
        tree.assert_invariants();
        println!("insert {key}: {ops} rebalancing ops, keys {:?}", tree.keys_in_order());
    }

    for i in 1..=tree.len() {
        println!("select({i}) = {:?}", tree.select(i));
    }

    let ops = tree.delete(3).expect("3 was inserted");
    tree.assert_invariants();
    println!("delete 3: {ops} rebalancing ops, keys {:?}", tree.keys_in_order());

    let zero = tree.pop_first().map(|(key, _)| key);
    assert_eq!(zero, Some(0));
    tree.assert_invariants();

    let mut graph = String::new();
    tree.dotgraph("demo", &mut graph).expect("writing to a String cannot fail");
    println!("{graph}");
}
