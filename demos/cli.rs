// A thin interactive driver over `RedBlackTree<i64, String>`, reading
// `insert <k> <v>` / `get <k>` / `delete <k>` / `range <lo> <hi>` /
// `print` lines from stdin. No logic of its own worth specifying —
// it exists to exercise the library by hand.

use llrb_tree::RedBlackTree;
use std::io::{self, BufRead, Write};

fn main() {
    let mut tree: RedBlackTree<i64, String> = RedBlackTree::new();
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    println!("llrb-tree demo. Commands: insert <k> <v> | get <k> | delete <k> | range <lo> <hi> | print | quit");
    loop {
        print!("> ");
        stdout.flush().ok();
        let mut line = String::new();
        if stdin.lock().read_line(&mut line).unwrap_or(0) == 0 {
            break;
        }
        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts.as_slice() {
            ["insert", k, v] => match k.parse::<i64>() {
                Ok(k) => match tree.insert(k, v.to_string()) {
                    Ok(outcome) => println!("{outcome:?}"),
                    Err(e) => println!("error: {e}"),
                },
                Err(_) => println!("bad key"),
            },
            ["get", k] => match k.parse::<i64>() {
                Ok(k) => println!("{:?}", tree.get(&k)),
                Err(_) => println!("bad key"),
            },
            ["delete", k] => match k.parse::<i64>() {
                Ok(k) => println!("{:?}", tree.delete(&k)),
                Err(_) => println!("bad key"),
            },
            ["range", lo, hi] => match (lo.parse::<i64>(), hi.parse::<i64>()) {
                (Ok(lo), Ok(hi)) => {
                    let hits: Vec<i64> = tree.range_iterator(lo, hi).collect();
                    println!("{hits:?}");
                }
                _ => println!("bad bounds"),
            },
            ["print"] => tree.pretty_print(),
            ["quit"] => break,
            _ => println!("unrecognized command"),
        }
    }
}
