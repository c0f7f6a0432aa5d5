//! Example traversal-callback clients: an ordered string concatenation
//! accumulator and a max-norm vector reduction. Both consume nothing but
//! the public `for_each` contract.

use std::cmp::Ordering;
use std::ops::ControlFlow;

use rbtree::RbTree;

type StrCmp = fn(&String, &String) -> Ordering;
type VecCmp = fn(&Vec<f64>, &Vec<f64>) -> Ordering;

fn string_tree() -> RbTree<String, StrCmp> {
    RbTree::new(String::cmp as StrCmp)
}

/// Element-by-element vector order: the first differing coordinate
/// decides; a vector that is a strict prefix of another is the smaller.
fn vector_compare(a: &Vec<f64>, b: &Vec<f64>) -> Ordering {
    for (x, y) in a.iter().zip(b.iter()) {
        if x < y {
            return Ordering::Less;
        }
        if x > y {
            return Ordering::Greater;
        }
    }
    a.len().cmp(&b.len())
}

fn squared_norm(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum()
}

#[test]
fn concatenation_accumulator_yields_sorted_text() {
    let mut tree = string_tree();
    for word in ["b", "a", "c"] {
        tree.insert(word.to_string()).unwrap();
    }
    let mut concatenated = String::new();
    let completed = tree.for_each(|word| {
        concatenated.push_str(word);
        ControlFlow::Continue(())
    });
    assert!(completed);
    assert_eq!(concatenated, "abc");
}

#[test]
fn concatenation_stops_when_the_buffer_is_full() {
    let mut tree = string_tree();
    for word in ["delta", "alpha", "echo", "bravo", "charlie"] {
        tree.insert(word.to_string()).unwrap();
    }
    let limit = 12;
    let mut concatenated = String::new();
    let completed = tree.for_each(|word| {
        if concatenated.len() + word.len() > limit {
            return ControlFlow::Break(());
        }
        concatenated.push_str(word);
        ControlFlow::Continue(())
    });
    assert!(!completed);
    assert_eq!(concatenated, "alphabravo");
}

#[test]
fn max_norm_reduction_finds_the_largest_vector() {
    let mut tree = RbTree::new(vector_compare as VecCmp);
    for v in [vec![1.0, 1.0], vec![2.0, 2.0], vec![3.0, 0.0]] {
        tree.insert(v).unwrap();
    }
    let mut best: Option<Vec<f64>> = None;
    let completed = tree.for_each(|v| {
        let replace = match &best {
            None => true,
            Some(current) => squared_norm(v) > squared_norm(current),
        };
        if replace {
            best = Some(v.clone());
        }
        ControlFlow::Continue(())
    });
    assert!(completed);
    assert_eq!(best, Some(vec![3.0, 0.0]));
}

#[test]
fn max_norm_tie_keeps_the_first_seen() {
    let mut tree = RbTree::new(vector_compare as VecCmp);
    // both have squared norm 25; [3, 4] is visited first in order
    tree.insert(vec![3.0, 4.0]).unwrap();
    tree.insert(vec![5.0]).unwrap();
    let mut best: Option<Vec<f64>> = None;
    tree.for_each(|v| {
        let replace = match &best {
            None => true,
            Some(current) => squared_norm(v) > squared_norm(current),
        };
        if replace {
            best = Some(v.clone());
        }
        ControlFlow::Continue(())
    });
    assert_eq!(best, Some(vec![3.0, 4.0]));
}
