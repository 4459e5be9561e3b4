//! A persistent, structurally shared stack with indexed access.
//!
//! The stack is a skew-binary random-access list: a spine of complete binary trees
//! whose sizes are of the form `2^k - 1`, with at most the two smallest trees of
//! equal size. Pushing either prepends a singleton tree or merges the two leading
//! trees under a new root, so `push`, `pop` and `top` are O(1), while `at` and `set`
//! are O(log n). Every operation returns a new stack and shares everything it did
//! not touch with the stack it was derived from.
use crate::errors::IndexError;
use std::fmt;
use std::sync::Arc;

enum Tree<T> {
    Leaf(T),
    Node(T, Arc<Tree<T>>, Arc<Tree<T>>),
}

impl<T> Tree<T> {
    fn root(&self) -> &T {
        match self {
            Tree::Leaf(x) | Tree::Node(x, ..) => x,
        }
    }

    /// `size` is the number of elements in this tree; `index` counts from the root
    /// in pre-order.
    fn lookup(&self, size: usize, index: usize) -> &T {
        match self {
            Tree::Leaf(x) => {
                debug_assert_eq!(index, 0);
                x
            }
            Tree::Node(x, _, _) if index == 0 => x,
            Tree::Node(_, l, r) => {
                let half = size / 2;
                if index <= half {
                    l.lookup(half, index - 1)
                } else {
                    r.lookup(half, index - 1 - half)
                }
            }
        }
    }
}

impl<T: Clone> Tree<T> {
    fn update(&self, size: usize, index: usize, item: T) -> Tree<T> {
        match self {
            Tree::Leaf(_) => Tree::Leaf(item),
            Tree::Node(_, l, r) if index == 0 => Tree::Node(item, l.clone(), r.clone()),
            Tree::Node(x, l, r) => {
                let half = size / 2;
                if index <= half {
                    Tree::Node(x.clone(), Arc::new(l.update(half, index - 1, item)), r.clone())
                } else {
                    Tree::Node(x.clone(), l.clone(), Arc::new(r.update(half, index - 1 - half, item)))
                }
            }
        }
    }
}

struct Spine<T> {
    size: usize,
    tree: Arc<Tree<T>>,
    next: Option<Arc<Spine<T>>>,
}

pub struct PStack<T> {
    head: Option<Arc<Spine<T>>>,
    len: usize,
}

impl<T> Clone for PStack<T> {
    fn clone(&self) -> Self { Self { head: self.head.clone(), len: self.len } }
}

impl<T> Default for PStack<T> {
    fn default() -> Self { Self::new() }
}

impl<T> PStack<T> {
    pub fn new() -> Self { Self { head: None, len: 0 } }

    pub fn len(&self) -> usize { self.len }

    pub fn is_empty(&self) -> bool { self.len == 0 }

    pub fn push(&self, item: T) -> Self {
        let head = match &self.head {
            Some(first) => match &first.next {
                Some(second) if first.size == second.size => Spine {
                    size: 1 + first.size + second.size,
                    tree: Arc::new(Tree::Node(item, first.tree.clone(), second.tree.clone())),
                    next: second.next.clone(),
                },
                _ => Spine { size: 1, tree: Arc::new(Tree::Leaf(item)), next: self.head.clone() },
            },
            None => Spine { size: 1, tree: Arc::new(Tree::Leaf(item)), next: None },
        };
        Self { head: Some(Arc::new(head)), len: self.len + 1 }
    }

    /// Popping the empty stack yields the empty stack.
    pub fn pop(&self) -> Self {
        let Some(first) = &self.head else { return self.clone() };
        let head = match first.tree.as_ref() {
            Tree::Leaf(_) => first.next.clone(),
            Tree::Node(_, l, r) => {
                let half = first.size / 2;
                let rest = Arc::new(Spine { size: half, tree: r.clone(), next: first.next.clone() });
                Some(Arc::new(Spine { size: half, tree: l.clone(), next: Some(rest) }))
            }
        };
        Self { head, len: self.len - 1 }
    }

    /// Pop `n` items; stops early at the empty stack.
    pub fn pop_n(&self, n: usize) -> Self {
        let mut out = self.clone();
        for _ in 0..n.min(self.len) {
            out = out.pop();
        }
        out
    }

    pub fn top(&self) -> Option<&T> { self.head.as_ref().map(|s| s.tree.root()) }

    /// The item `index` positions below the top; 0 is the most recently pushed item.
    pub fn get(&self, mut index: usize) -> Option<&T> {
        let mut cursor = self.head.as_ref();
        while let Some(spine) = cursor {
            if index < spine.size {
                return Some(spine.tree.lookup(spine.size, index))
            }
            index -= spine.size;
            cursor = spine.next.as_ref();
        }
        None
    }

    pub fn at(&self, index: usize) -> Result<&T, IndexError> {
        self.get(index).ok_or(IndexError { index, size: self.len })
    }

    pub fn iter(&self) -> Iter<'_, T> { Iter { stack: self, pos: 0 } }
}

impl<T: Clone> PStack<T> {
    /// A stack equal to this one except at `index`. Only the path to the replaced
    /// entry is copied.
    pub fn set(&self, index: usize, item: T) -> Result<Self, IndexError> {
        if index >= self.len {
            return Err(IndexError { index, size: self.len })
        }
        Ok(Self { head: Some(Arc::new(set_aux(self.head.as_ref(), index, item))), len: self.len })
    }
}

fn set_aux<T: Clone>(spine: Option<&Arc<Spine<T>>>, index: usize, item: T) -> Spine<T> {
    let Some(spine) = spine else { unreachable!("PStack::set; index was checked against len") };
    if index < spine.size {
        Spine { size: spine.size, tree: Arc::new(spine.tree.update(spine.size, index, item)), next: spine.next.clone() }
    } else {
        let next = set_aux(spine.next.as_ref(), index - spine.size, item);
        Spine { size: spine.size, tree: spine.tree.clone(), next: Some(Arc::new(next)) }
    }
}

pub struct Iter<'a, T> {
    stack: &'a PStack<T>,
    pos: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;
    fn next(&mut self) -> Option<Self::Item> {
        let out = self.stack.get(self.pos)?;
        self.pos += 1;
        Some(out)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let rem = self.stack.len.saturating_sub(self.pos);
        (rem, Some(rem))
    }
}

/// Items are pushed in iteration order, so the last item yielded becomes the top.
impl<T> FromIterator<T> for PStack<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        iter.into_iter().fold(PStack::new(), |acc, x| acc.push(x))
    }
}

impl<T: fmt::Debug> fmt::Debug for PStack<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { f.debug_list().entries(self.iter()).finish() }
}
