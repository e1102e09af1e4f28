//! Text Storage: AVL-balanced Rope
//!
//! A binary tree over text chunks. Leaves hold at most [`LEAF_SIZE`] characters; concat nodes
//! own exactly two children and cache the character count, newline count and height of their
//! subtree, so length and line count are O(1) and positional/line lookups are O(log n).
//!
//! All offsets are **character offsets** (Unicode scalar values).
//!
//! Structural edits split the tree at the edit boundaries and join the pieces back together.
//! Joining merges adjacent leaves that fit into one leaf and restores AVL balance with single
//! and double rotations. Every structural step consumes its input subtrees and returns a new
//! root, so a rotation never leaves a child reachable from two parents.

use crate::error::RopeError;
use std::fmt;
use tracing::trace;

/// Maximum number of characters stored in a single leaf.
pub const LEAF_SIZE: usize = 512;

#[derive(Debug, Clone)]
enum Node {
    Leaf(Leaf),
    Concat(Concat),
}

#[derive(Debug, Clone, Default)]
struct Leaf {
    text: String,
    chars: usize,
    newlines: usize,
}

#[derive(Debug, Clone)]
struct Concat {
    left: Box<Node>,
    right: Box<Node>,
    chars: usize,
    newlines: usize,
    height: usize,
}

fn count_newlines(text: &str) -> usize {
    // '\n' never occurs inside a multi-byte UTF-8 sequence.
    text.bytes().filter(|&b| b == b'\n').count()
}

/// Byte offset of the `char_offset`-th character of `text` (or `text.len()` past the end).
pub(crate) fn byte_offset(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map_or(text.len(), |(byte, _)| byte)
}

impl Leaf {
    fn with_chars(text: String, chars: usize) -> Self {
        let newlines = count_newlines(&text);
        Self {
            text,
            chars,
            newlines,
        }
    }

    fn merge(mut self, other: Leaf) -> Self {
        self.text.push_str(&other.text);
        self.chars += other.chars;
        self.newlines += other.newlines;
        self
    }

    fn split(mut self, at: usize) -> (Leaf, Leaf) {
        let byte = byte_offset(&self.text, at);
        let right_text = self.text.split_off(byte);
        let left_newlines = count_newlines(&self.text);
        let right = Leaf {
            text: right_text,
            chars: self.chars - at,
            newlines: self.newlines - left_newlines,
        };
        let left = Leaf {
            text: self.text,
            chars: at,
            newlines: left_newlines,
        };
        (left, right)
    }
}

impl Default for Node {
    fn default() -> Self {
        Node::Leaf(Leaf::default())
    }
}

impl Node {
    fn chars(&self) -> usize {
        match self {
            Node::Leaf(leaf) => leaf.chars,
            Node::Concat(c) => c.chars,
        }
    }

    fn newlines(&self) -> usize {
        match self {
            Node::Leaf(leaf) => leaf.newlines,
            Node::Concat(c) => c.newlines,
        }
    }

    fn height(&self) -> usize {
        match self {
            Node::Leaf(_) => 0,
            Node::Concat(c) => c.height,
        }
    }

    fn is_empty(&self) -> bool {
        self.chars() == 0
    }

    /// Heights of the (left, right) children; `(0, 0)` for a leaf.
    fn child_heights(&self) -> (usize, usize) {
        match self {
            Node::Leaf(_) => (0, 0),
            Node::Concat(c) => (c.left.height(), c.right.height()),
        }
    }

    /// Plain concat node, no merging or balancing.
    fn concat(left: Node, right: Node) -> Node {
        Node::Concat(Concat {
            chars: left.chars() + right.chars(),
            newlines: left.newlines() + right.newlines(),
            height: 1 + left.height().max(right.height()),
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    /// Try to insert `text` without changing the tree shape.
    ///
    /// Succeeds only when the target leaf has room for `chars` more characters.
    fn insert_in_place(&mut self, pos: usize, text: &str, chars: usize, newlines: usize) -> bool {
        match self {
            Node::Leaf(leaf) => {
                if leaf.chars + chars > LEAF_SIZE {
                    return false;
                }
                let at = byte_offset(&leaf.text, pos);
                leaf.text.insert_str(at, text);
                leaf.chars += chars;
                leaf.newlines += newlines;
                true
            }
            Node::Concat(c) => {
                let left_chars = c.left.chars();
                let done = if pos < left_chars {
                    c.left.insert_in_place(pos, text, chars, newlines)
                } else if pos > left_chars {
                    c.right
                        .insert_in_place(pos - left_chars, text, chars, newlines)
                } else {
                    c.left.insert_in_place(pos, text, chars, newlines)
                        || c.right.insert_in_place(0, text, chars, newlines)
                };
                if done {
                    c.chars += chars;
                    c.newlines += newlines;
                }
                done
            }
        }
    }

    /// Try to delete `start..end` without changing the tree shape.
    ///
    /// Succeeds only when the range lies inside one leaf that stays non-empty. Returns the
    /// number of newlines removed.
    fn delete_in_place(&mut self, start: usize, end: usize) -> Option<usize> {
        match self {
            Node::Leaf(leaf) => {
                if end - start >= leaf.chars {
                    return None;
                }
                let from = byte_offset(&leaf.text, start);
                let to = from + byte_offset(&leaf.text[from..], end - start);
                let removed = count_newlines(&leaf.text[from..to]);
                leaf.text.replace_range(from..to, "");
                leaf.chars -= end - start;
                leaf.newlines -= removed;
                Some(removed)
            }
            Node::Concat(c) => {
                let left_chars = c.left.chars();
                let removed = if end <= left_chars {
                    c.left.delete_in_place(start, end)
                } else if start >= left_chars {
                    c.right.delete_in_place(start - left_chars, end - left_chars)
                } else {
                    None
                }?;
                c.chars -= end - start;
                c.newlines -= removed;
                Some(removed)
            }
        }
    }

    fn char_at(&self, mut pos: usize) -> Option<char> {
        let mut node = self;
        loop {
            match node {
                Node::Leaf(leaf) => return leaf.text.chars().nth(pos),
                Node::Concat(c) => {
                    let left_chars = c.left.chars();
                    if pos < left_chars {
                        node = &*c.left;
                    } else {
                        pos -= left_chars;
                        node = &*c.right;
                    }
                }
            }
        }
    }

    /// Offset just past the `k`-th newline (1-based). `k` must be in `1..=newlines`.
    fn offset_after_newline(&self, mut k: usize) -> usize {
        let mut node = self;
        let mut base = 0;
        loop {
            match node {
                Node::Leaf(leaf) => {
                    return leaf
                        .text
                        .chars()
                        .enumerate()
                        .filter(|&(_, ch)| ch == '\n')
                        .nth(k - 1)
                        .map_or(base + leaf.chars, |(i, _)| base + i + 1);
                }
                Node::Concat(c) => {
                    let left_newlines = c.left.newlines();
                    if k <= left_newlines {
                        node = &*c.left;
                    } else {
                        k -= left_newlines;
                        base += c.left.chars();
                        node = &*c.right;
                    }
                }
            }
        }
    }

    /// Number of newlines in `0..pos`.
    fn newlines_before(&self, mut pos: usize) -> usize {
        let mut node = self;
        let mut count = 0;
        loop {
            match node {
                Node::Leaf(leaf) => {
                    return count + leaf.text.chars().take(pos).filter(|&ch| ch == '\n').count();
                }
                Node::Concat(c) => {
                    let left_chars = c.left.chars();
                    if pos < left_chars {
                        node = &*c.left;
                    } else {
                        count += c.left.newlines();
                        pos -= left_chars;
                        node = &*c.right;
                    }
                }
            }
        }
    }
}

impl Concat {
    fn into_children(self) -> (Node, Node) {
        (*self.left, *self.right)
    }
}

/// Build a balanced tree bottom-up by recursive midpoint split.
fn build(text: &str, chars: usize) -> Node {
    if chars <= LEAF_SIZE {
        return Node::Leaf(Leaf::with_chars(text.to_string(), chars));
    }
    let mid = chars / 2;
    let (left, right) = text.split_at(byte_offset(text, mid));
    Node::concat(build(left, mid), build(right, chars - mid))
}

fn rotate_left(node: Node) -> Node {
    match node {
        Node::Concat(c) => {
            let (left, right) = c.into_children();
            match right {
                Node::Concat(r) => {
                    let (b, c) = r.into_children();
                    Node::concat(Node::concat(left, b), c)
                }
                right => Node::concat(left, right),
            }
        }
        leaf => leaf,
    }
}

fn rotate_right(node: Node) -> Node {
    match node {
        Node::Concat(c) => {
            let (left, right) = c.into_children();
            match left {
                Node::Concat(l) => {
                    let (a, b) = l.into_children();
                    Node::concat(a, Node::concat(b, right))
                }
                left => Node::concat(left, right),
            }
        }
        leaf => leaf,
    }
}

/// Restore the AVL condition at `node`, assuming both children are balanced.
fn balance(node: Node) -> Node {
    let (lh, rh) = node.child_heights();
    match node {
        Node::Concat(c) if lh > rh + 1 => {
            let (left, right) = c.into_children();
            let (ll, lr) = left.child_heights();
            let left = if lr > ll { rotate_left(left) } else { left };
            rotate_right(Node::concat(left, right))
        }
        Node::Concat(c) if rh > lh + 1 => {
            let (left, right) = c.into_children();
            let (rl, rr) = right.child_heights();
            let right = if rl > rr { rotate_right(right) } else { right };
            rotate_left(Node::concat(left, right))
        }
        node => node,
    }
}

/// Concatenate two balanced trees into one balanced tree.
fn join(left: Node, right: Node) -> Node {
    if left.is_empty() {
        return right;
    }
    if right.is_empty() {
        return left;
    }

    let (lh, rh) = (left.height(), right.height());
    match (left, right) {
        (Node::Leaf(a), Node::Leaf(b)) if a.chars + b.chars <= LEAF_SIZE => Node::Leaf(a.merge(b)),
        (Node::Leaf(a), mut right @ Node::Concat(_)) => {
            if right.insert_in_place(0, &a.text, a.chars, a.newlines) {
                right
            } else {
                join_unequal(Node::Leaf(a), right, lh, rh)
            }
        }
        (mut left @ Node::Concat(_), Node::Leaf(b)) => {
            let end = left.chars();
            if left.insert_in_place(end, &b.text, b.chars, b.newlines) {
                left
            } else {
                join_unequal(left, Node::Leaf(b), lh, rh)
            }
        }
        (left, right) => join_unequal(left, right, lh, rh),
    }
}

fn join_unequal(left: Node, right: Node, lh: usize, rh: usize) -> Node {
    if lh > rh + 1 {
        if let Node::Concat(c) = left {
            let (ll, lr) = c.into_children();
            return balance(Node::concat(ll, join(lr, right)));
        }
    } else if rh > lh + 1 {
        if let Node::Concat(c) = right {
            let (rl, rr) = c.into_children();
            return balance(Node::concat(join(left, rl), rr));
        }
    }
    Node::concat(left, right)
}

/// Split a tree at character offset `at` into `(0..at, at..)`.
fn split(node: Node, at: usize) -> (Node, Node) {
    match node {
        Node::Leaf(leaf) => {
            let (a, b) = leaf.split(at);
            (Node::Leaf(a), Node::Leaf(b))
        }
        Node::Concat(c) => {
            let left_chars = c.left.chars();
            let (left, right) = c.into_children();
            if at < left_chars {
                let (a, b) = split(left, at);
                (a, join(b, right))
            } else if at > left_chars {
                let (a, b) = split(right, at - left_chars);
                (join(left, a), b)
            } else {
                (left, right)
            }
        }
    }
}

/// A balanced-tree string supporting O(log n) edits and line lookups.
///
/// # Example
///
/// ```rust
/// use edit_engine::Rope;
///
/// let mut rope = Rope::from_text("Hello\nWorld");
/// rope.insert(5, ",").unwrap();
/// assert_eq!(rope.text(), "Hello,\nWorld");
/// assert_eq!(rope.line_count(), 2);
/// assert_eq!(rope.line_at_offset(8).unwrap(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Rope {
    root: Node,
}

impl Rope {
    /// Create an empty rope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a rope from text.
    pub fn from_text(text: &str) -> Self {
        Self {
            root: build(text, text.chars().count()),
        }
    }

    /// Total character count. O(1).
    pub fn len(&self) -> usize {
        self.root.chars()
    }

    /// Returns `true` if the rope holds no text.
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Total number of `\n` characters. O(1).
    pub fn newline_count(&self) -> usize {
        self.root.newlines()
    }

    /// Number of lines (newlines + 1, so an empty rope has one line). O(1).
    pub fn line_count(&self) -> usize {
        self.root.newlines() + 1
    }

    /// Height of the tree (a single leaf has height 0).
    pub fn height(&self) -> usize {
        self.root.height()
    }

    /// Character at `pos`, which must be in `[0, len)`.
    pub fn char_at(&self, pos: usize) -> Result<char, RopeError> {
        if pos >= self.len() {
            return Err(RopeError::PositionOutOfRange {
                pos,
                len: self.len(),
            });
        }
        self.root.char_at(pos).ok_or(RopeError::PositionOutOfRange {
            pos,
            len: self.len(),
        })
    }

    /// Text in `start..end`.
    pub fn substring(&self, start: usize, end: usize) -> Result<String, RopeError> {
        Ok(self.chunks_in_range(start, end)?.collect())
    }

    /// The whole text.
    pub fn text(&self) -> String {
        self.chunks().collect()
    }

    /// Insert `text` at `pos`, which must be in `[0, len]`.
    pub fn insert(&mut self, pos: usize, text: &str) -> Result<(), RopeError> {
        if pos > self.len() {
            return Err(RopeError::PositionOutOfRange {
                pos,
                len: self.len(),
            });
        }
        if text.is_empty() {
            return Ok(());
        }

        let chars = text.chars().count();
        let newlines = count_newlines(text);
        if self.root.insert_in_place(pos, text, chars, newlines) {
            return Ok(());
        }

        trace!(pos, chars, "rope insert: split and join");
        let root = std::mem::take(&mut self.root);
        let (left, right) = split(root, pos);
        self.root = join(join(left, build(text, chars)), right);
        Ok(())
    }

    /// Delete the characters in `start..end`.
    pub fn delete(&mut self, start: usize, end: usize) -> Result<(), RopeError> {
        self.check_range(start, end)?;
        if start == end {
            return Ok(());
        }

        if self.root.delete_in_place(start, end).is_some() {
            return Ok(());
        }

        trace!(start, end, "rope delete: split and join");
        let root = std::mem::take(&mut self.root);
        let (left, rest) = split(root, start);
        let (_, right) = split(rest, end - start);
        self.root = join(left, right);
        Ok(())
    }

    /// Starting character offset of `line`.
    pub fn line_start_offset(&self, line: usize) -> Result<usize, RopeError> {
        self.check_line(line)?;
        if line == 0 {
            return Ok(0);
        }
        Ok(self.root.offset_after_newline(line))
    }

    /// Character offset of the end of `line`, excluding its `\n`.
    pub fn line_end_offset(&self, line: usize) -> Result<usize, RopeError> {
        self.check_line(line)?;
        if line + 1 < self.line_count() {
            Ok(self.root.offset_after_newline(line + 1) - 1)
        } else {
            Ok(self.len())
        }
    }

    /// Text of `line`, excluding its trailing `\n`.
    pub fn line_text(&self, line: usize) -> Result<String, RopeError> {
        let start = self.line_start_offset(line)?;
        let end = self.line_end_offset(line)?;
        self.substring(start, end)
    }

    /// Index of the line containing `pos`, which must be in `[0, len]`.
    ///
    /// An offset right after a `\n` belongs to the following line.
    pub fn line_at_offset(&self, pos: usize) -> Result<usize, RopeError> {
        if pos > self.len() {
            return Err(RopeError::PositionOutOfRange {
                pos,
                len: self.len(),
            });
        }
        Ok(self.root.newlines_before(pos))
    }

    /// Iterate over all text fragments in order.
    pub fn chunks(&self) -> Chunks<'_> {
        Chunks::new(&self.root, 0, self.len())
    }

    /// Iterate over the text fragments covering `start..end` in order.
    pub fn chunks_in_range(&self, start: usize, end: usize) -> Result<Chunks<'_>, RopeError> {
        self.check_range(start, end)?;
        Ok(Chunks::new(&self.root, start, end))
    }

    fn check_range(&self, start: usize, end: usize) -> Result<(), RopeError> {
        if start > end || end > self.len() {
            return Err(RopeError::RangeOutOfRange {
                start,
                end,
                len: self.len(),
            });
        }
        Ok(())
    }

    fn check_line(&self, line: usize) -> Result<(), RopeError> {
        if line >= self.line_count() {
            return Err(RopeError::LineOutOfRange {
                line,
                line_count: self.line_count(),
            });
        }
        Ok(())
    }
}

impl From<&str> for Rope {
    fn from(text: &str) -> Self {
        Self::from_text(text)
    }
}

impl fmt::Display for Rope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for chunk in self.chunks() {
            f.write_str(chunk)?;
        }
        Ok(())
    }
}

/// Forward-only iterator over the text fragments of a [`Rope`].
///
/// Created by [`Rope::chunks`] and [`Rope::chunks_in_range`].
pub struct Chunks<'a> {
    /// Pending subtrees with their starting offsets, next one on top.
    stack: Vec<(&'a Node, usize)>,
    start: usize,
    end: usize,
}

impl<'a> Chunks<'a> {
    fn new(root: &'a Node, start: usize, end: usize) -> Self {
        Self {
            stack: vec![(root, 0)],
            start,
            end,
        }
    }
}

impl<'a> Iterator for Chunks<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        while let Some((node, base)) = self.stack.pop() {
            if base + node.chars() <= self.start || base >= self.end {
                continue;
            }
            match node {
                Node::Concat(c) => {
                    self.stack.push((&*c.right, base + c.left.chars()));
                    self.stack.push((&*c.left, base));
                }
                Node::Leaf(leaf) => {
                    let from = self.start.saturating_sub(base);
                    let to = (self.end - base).min(leaf.chars);
                    let slice = if from == 0 && to == leaf.chars {
                        leaf.text.as_str()
                    } else {
                        let from_byte = byte_offset(&leaf.text, from);
                        let to_byte = from_byte + byte_offset(&leaf.text[from_byte..], to - from);
                        &leaf.text[from_byte..to_byte]
                    };
                    if !slice.is_empty() {
                        return Some(slice);
                    }
                }
            }
        }
        None
    }
}
