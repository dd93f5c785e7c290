//! Board geometry and its symmetry group.
//!
//! A [`Shape`] describes a set of addressable positions and the transforms that
//! map the shape onto itself. The [`GoShape`] used throughout the engine is a
//! square of `length × length` cells followed by one extra slot that stands for
//! "pass". Every symmetry keeps the pass slot in place.
//!
//! Positions are grouped into orbits under the symmetry group. The first index
//! of each orbit is its *representative*; the network only trains weights for
//! representatives and derives the rest.

use std::hash::{Hash, Hasher};

/// A linear index into a shape, bound to the shape's range.
///
/// Equality and hashing only look at the index.
#[derive(Debug, Clone, Copy)]
pub struct Position {
    index: usize,
    range: usize,
}

impl Position {
    /// Create a position, or `None` if `index` is outside `[0, range)`.
    pub fn new(index: usize, range: usize) -> Option<Self> {
        (index < range).then_some(Self { index, range })
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn range(&self) -> usize {
        self.range
    }

    /// Move to another index. Out-of-range values are ignored and reported as `false`.
    pub fn set_index(&mut self, index: usize) -> bool {
        if index < self.range {
            self.index = index;
            true
        } else {
            false
        }
    }
}

impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl Eq for Position {}

impl Hash for Position {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

/// The eight elements of the dihedral group of a square.
///
/// Composite variants are named after the generators they apply, right to left:
/// `HorizontalDiagonal` is the diagonal transpose followed by the horizontal mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symmetry {
    Identity,
    /// Mirror across the vertical axis (flips x).
    Vertical,
    /// Mirror across the horizontal axis (flips y).
    Horizontal,
    /// Transpose across the main diagonal.
    Diagonal,
    /// Vertical then horizontal mirror.
    Rotate180,
    HorizontalDiagonal,
    VerticalDiagonal,
    /// Vertical, horizontal, then diagonal: the anti-diagonal transpose.
    AntiDiagonal,
}

impl Symmetry {
    /// All transforms, identity first.
    pub const ALL: [Symmetry; 8] = [
        Symmetry::Identity,
        Symmetry::Vertical,
        Symmetry::Horizontal,
        Symmetry::Diagonal,
        Symmetry::Rotate180,
        Symmetry::HorizontalDiagonal,
        Symmetry::VerticalDiagonal,
        Symmetry::AntiDiagonal,
    ];

    /// Apply the transform to cell coordinates on a square of the given length.
    pub fn apply(self, x: usize, y: usize, length: usize) -> (usize, usize) {
        let last = length - 1;
        match self {
            Symmetry::Identity => (x, y),
            Symmetry::Vertical => (last - x, y),
            Symmetry::Horizontal => (x, last - y),
            Symmetry::Diagonal => (y, x),
            Symmetry::Rotate180 => (last - x, last - y),
            Symmetry::HorizontalDiagonal => (y, last - x),
            Symmetry::VerticalDiagonal => (last - y, x),
            Symmetry::AntiDiagonal => (last - y, last - x),
        }
    }
}

/// Geometry contract shared by boards and network layers.
pub trait Shape {
    /// Number of addressable positions.
    fn size(&self) -> usize;

    /// Ordered list of transforms mapping the shape onto itself.
    fn symmetries(&self) -> &[Symmetry];

    /// Image of `pos` under `symmetry`.
    fn transform(&self, symmetry: Symmetry, pos: Position) -> Position;

    /// One index per orbit, ascending.
    fn representatives(&self) -> &[usize];

    fn valid(&self, index: usize) -> bool {
        index < self.size()
    }

    fn at(&self, index: usize) -> Option<Position> {
        Position::new(index, self.size())
    }
}

/// Visit every position, mark all of its images, and keep each index that
/// marked something new. The kept index is the smallest member of its orbit.
pub fn find_representatives<S: Shape + ?Sized>(shape: &S) -> Vec<usize> {
    let mut visited = vec![false; shape.size()];
    let mut representatives = Vec::new();

    for index in 0..shape.size() {
        let Some(pos) = shape.at(index) else {
            continue;
        };
        let mut fresh = false;
        for &symmetry in shape.symmetries() {
            let image = shape.transform(symmetry, pos).index();
            if !visited[image] {
                visited[image] = true;
                fresh = true;
            }
        }
        if fresh {
            representatives.push(index);
        }
    }
    representatives
}

/// A square Go board of `length × length` cells plus a pass slot.
///
/// Cell `(x, y)` lives at index `y * length + x`; the pass slot is the last index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoShape {
    length: usize,
    representatives: Vec<usize>,
}

impl GoShape {
    pub fn new(length: usize) -> Self {
        assert!(length > 0, "board length must be positive");
        let mut shape = Self {
            length,
            representatives: Vec::new(),
        };
        shape.representatives = find_representatives(&shape);
        shape
    }

    #[inline]
    pub fn length(&self) -> usize {
        self.length
    }

    /// Number of board cells, excluding the pass slot.
    #[inline]
    pub fn cells(&self) -> usize {
        self.length * self.length
    }

    #[inline]
    pub fn pass_index(&self) -> usize {
        self.cells()
    }

    pub fn pass(&self) -> Position {
        Position {
            index: self.pass_index(),
            range: self.size(),
        }
    }

    #[inline]
    pub fn is_pass(&self, pos: Position) -> bool {
        pos.index() == self.pass_index()
    }

    pub fn valid_xy(&self, x: isize, y: isize) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.length && (y as usize) < self.length
    }

    pub fn at_xy(&self, x: usize, y: usize) -> Option<Position> {
        if x < self.length && y < self.length {
            self.at(y * self.length + x)
        } else {
            None
        }
    }

    /// Cell coordinates of `pos`, or `None` for the pass slot.
    pub fn xy(&self, pos: Position) -> Option<(usize, usize)> {
        (pos.index() < self.cells()).then(|| (pos.index() % self.length, pos.index() / self.length))
    }

    /// Orthogonal neighbors inside the board. The pass slot has none.
    pub fn neighbors(&self, pos: Position) -> Vec<Position> {
        let Some((x, y)) = self.xy(pos) else {
            return Vec::new();
        };
        let (x, y) = (x as isize, y as isize);
        let mut v = Vec::with_capacity(4);
        for (nx, ny) in [(x + 1, y), (x - 1, y), (x, y + 1), (x, y - 1)] {
            if self.valid_xy(nx, ny) {
                v.push(Position {
                    index: ny as usize * self.length + nx as usize,
                    range: self.size(),
                });
            }
        }
        v
    }

    /// Outward label of a move: 1-indexed column and a row counted from the far edge,
    /// e.g. `"3,7"`, or `"pass"`.
    pub fn format_move(&self, pos: Position) -> String {
        match self.xy(pos) {
            Some((x, y)) => format!("{},{}", x + 1, self.length - y),
            None => "pass".into(),
        }
    }

    /// Parse a label produced by [`GoShape::format_move`].
    ///
    /// Column and row may be separated by a comma and/or whitespace.
    pub fn parse_move(&self, s: &str) -> Option<Position> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("pass") {
            return Some(self.pass());
        }
        let mut parts = s
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|p| !p.is_empty());
        let column: usize = parts.next()?.parse().ok()?;
        let row: usize = parts.next()?.parse().ok()?;
        if parts.next().is_some() || column == 0 || row == 0 || row > self.length {
            return None;
        }
        self.at_xy(column - 1, self.length - row)
    }
}

impl Shape for GoShape {
    fn size(&self) -> usize {
        self.cells() + 1
    }

    fn symmetries(&self) -> &[Symmetry] {
        &Symmetry::ALL
    }

    fn transform(&self, symmetry: Symmetry, pos: Position) -> Position {
        match self.xy(pos) {
            Some((x, y)) => {
                let (tx, ty) = symmetry.apply(x, y, self.length);
                Position {
                    index: ty * self.length + tx,
                    range: self.size(),
                }
            }
            None => self.pass(),
        }
    }

    fn representatives(&self) -> &[usize] {
        &self.representatives
    }
}
