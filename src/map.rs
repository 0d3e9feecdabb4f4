use std::fmt::Write as _;
use std::path::Path;

/// Sentinel returned by `value_at` for coordinates outside the grid.
pub const OUT_OF_BOUNDS: i32 = -1;

/// Upper bound on loaded grid dimensions. Keeps `width * height` far from
/// integer overflow and caps the allocation a level file can request.
pub const MAX_GRID_DIM: i32 = 1024;

pub const EMPTY: i32 = 0;
pub const STANDARD_WALL: i32 = 1;
pub const ENERGY_WALL: i32 = 2;
pub const DATA_STREAM: i32 = 3;
pub const NEON_BARRIER: i32 = 4;
pub const HOLOGRAM: i32 = 5;

#[derive(Debug)]
pub enum MapError {
    Io(std::io::Error),
    Parse(String),
}

impl std::fmt::Display for MapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io error: {err}"),
            Self::Parse(err) => write!(f, "parse error: {err}"),
        }
    }
}

impl std::error::Error for MapError {}

impl From<std::io::Error> for MapError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Target {
    pub x: i32,
    pub y: i32,
    pub points: i32,
    pub hit: bool,
}

/// Occupancy grid plus scorable targets. Cell codes: 0 empty, >0 a wall
/// variant with its own palette entry. The border is pre-filled by the
/// constructors; keeping it enclosed after `set_cell` edits is on the caller.
pub struct Map {
    width: i32,
    height: i32,
    grid: Vec<i32>,
    targets: Vec<Target>,
}

impl Map {
    /// Empty arena of the given size with a standard-wall border.
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(3);
        let height = height.max(3);
        let mut map = Self {
            width,
            height,
            grid: vec![EMPTY; (width * height) as usize],
            targets: Vec::new(),
        };
        for x in 0..width {
            map.set_cell(x, 0, STANDARD_WALL);
            map.set_cell(x, height - 1, STANDARD_WALL);
        }
        for y in 0..height {
            map.set_cell(0, y, STANDARD_WALL);
            map.set_cell(width - 1, y, STANDARD_WALL);
        }
        map
    }

    /// The built-in 20x20 arena: two interior wall runs, a pillar, an
    /// energy-wall run and a data-stream run, plus a few starter targets.
    pub fn demo() -> Self {
        let mut map = Self::new(20, 20);
        for x in 7..12 {
            map.set_cell(x, 7, STANDARD_WALL);
        }
        for y in 12..16 {
            map.set_cell(12, y, STANDARD_WALL);
        }
        map.set_cell(5, 5, STANDARD_WALL);
        for y in 10..13 {
            map.set_cell(5, y, ENERGY_WALL);
        }
        for x in 10..13 {
            map.set_cell(x, 5, DATA_STREAM);
        }
        map.set_cell(15, 15, NEON_BARRIER);
        map.set_cell(15, 4, HOLOGRAM);

        map.add_target(8, 3, 10);
        map.add_target(3, 14, 20);
        map.add_target(16, 8, 30);
        map.add_target(10, 17, 15);
        map
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn value_at(&self, x: i32, y: i32) -> i32 {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return OUT_OF_BOUNDS;
        }
        self.grid[(y * self.width + x) as usize]
    }

    pub fn is_wall(&self, x: i32, y: i32) -> bool {
        self.value_at(x, y) > 0
    }

    pub fn set_cell(&mut self, x: i32, y: i32, value: i32) {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return;
        }
        self.grid[(y * self.width + x) as usize] = value;
    }

    /// Adds an unhit target. No-op if the cell is out of bounds, a wall, or
    /// already holds a target (duplicates are rejected, keeping at most one
    /// target per cell).
    pub fn add_target(&mut self, x: i32, y: i32, points: i32) {
        if self.value_at(x, y) != EMPTY || self.is_target(x, y) {
            return;
        }
        self.targets.push(Target {
            x,
            y,
            points,
            hit: false,
        });
    }

    pub fn remove_target(&mut self, x: i32, y: i32) {
        self.targets.retain(|t| t.x != x || t.y != y);
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn target_at(&self, x: i32, y: i32) -> Option<&Target> {
        self.targets.iter().find(|t| t.x == x && t.y == y)
    }

    pub fn is_target(&self, x: i32, y: i32) -> bool {
        self.target_at(x, y).is_some()
    }

    pub fn is_hit_target(&self, x: i32, y: i32) -> bool {
        self.target_at(x, y).map(|t| t.hit).unwrap_or(false)
    }

    pub fn target_points(&self, x: i32, y: i32) -> i32 {
        self.target_at(x, y).map(|t| t.points).unwrap_or(0)
    }

    /// Marks the target at (x, y) as hit. Returns false when there is no
    /// target there or it was already hit.
    pub fn hit_target(&mut self, x: i32, y: i32) -> bool {
        for target in self.targets.iter_mut() {
            if target.x == x && target.y == y && !target.hit {
                target.hit = true;
                return true;
            }
        }
        false
    }

    pub fn reset_targets(&mut self) {
        for target in self.targets.iter_mut() {
            target.hit = false;
        }
    }

    /// Level text format: `height width`, `height*width` cell codes in row
    /// order, then optionally a target count followed by `x y points`
    /// triples. Dimensions and cell codes are validated before the grid is
    /// constructed; targets failing placement rules are skipped.
    pub fn parse(text: &str) -> Result<Self, MapError> {
        let mut tokens = text.split_whitespace();

        let height = next_int(&mut tokens, "height")?;
        let width = next_int(&mut tokens, "width")?;
        if width < 3 || height < 3 {
            return Err(MapError::Parse(format!(
                "grid must be at least 3x3, got {width}x{height}"
            )));
        }
        if width > MAX_GRID_DIM || height > MAX_GRID_DIM {
            return Err(MapError::Parse(format!(
                "grid dimensions exceed {MAX_GRID_DIM}, got {width}x{height}"
            )));
        }

        let cell_count = (width * height) as usize;
        let mut grid = Vec::with_capacity(cell_count);
        for _ in 0..cell_count {
            let code = next_int(&mut tokens, "cell code")?;
            if code < 0 {
                return Err(MapError::Parse(format!("bad cell code: '{code}'")));
            }
            grid.push(code);
        }

        let mut map = Self {
            width,
            height,
            grid,
            targets: Vec::new(),
        };

        // The target section is optional, but a present token must be a
        // well-formed count.
        if let Some(token) = tokens.next() {
            let count = token
                .parse::<i32>()
                .map_err(|_| MapError::Parse(format!("bad target count: '{token}'")))?;
            for _ in 0..count {
                let x = next_int(&mut tokens, "target x")?;
                let y = next_int(&mut tokens, "target y")?;
                let points = next_int(&mut tokens, "target points")?;
                map.add_target(x, y, points);
            }
        }
        Ok(map)
    }

    pub fn serialize(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{} {}", self.height, self.width);
        for y in 0..self.height {
            for x in 0..self.width {
                if x > 0 {
                    out.push(' ');
                }
                let _ = write!(out, "{}", self.value_at(x, y));
            }
            out.push('\n');
        }
        let _ = writeln!(out, "{}", self.targets.len());
        for target in &self.targets {
            let _ = writeln!(out, "{} {} {}", target.x, target.y, target.points);
        }
        out
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, MapError> {
        Self::parse(&std::fs::read_to_string(path)?)
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), MapError> {
        std::fs::write(path, self.serialize())?;
        Ok(())
    }
}

fn next_int<'a>(
    tokens: &mut impl Iterator<Item = &'a str>,
    what: &str,
) -> Result<i32, MapError> {
    let token = tokens
        .next()
        .ok_or_else(|| MapError::Parse(format!("missing {what}")))?;
    token
        .parse::<i32>()
        .map_err(|_| MapError::Parse(format!("bad {what}: '{token}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_cells_are_not_walls() {
        let map = Map::new(8, 8);
        for y in 0..8 {
            for x in 0..8 {
                if !map.is_wall(x, y) {
                    assert_eq!(map.value_at(x, y), EMPTY);
                }
            }
        }
    }

    #[test]
    fn out_of_bounds_returns_sentinel() {
        let map = Map::new(8, 8);
        assert_eq!(map.value_at(-1, 3), OUT_OF_BOUNDS);
        assert_eq!(map.value_at(3, 8), OUT_OF_BOUNDS);
        assert!(!map.is_wall(-1, 3));
        assert!(!map.is_wall(3, 8));
    }

    #[test]
    fn border_is_enclosed() {
        let map = Map::new(10, 6);
        for x in 0..10 {
            assert!(map.is_wall(x, 0));
            assert!(map.is_wall(x, 5));
        }
        for y in 0..6 {
            assert!(map.is_wall(0, y));
            assert!(map.is_wall(9, y));
        }
    }

    #[test]
    fn add_target_rejects_walls_bounds_and_duplicates() {
        let mut map = Map::new(10, 10);
        map.add_target(0, 0, 10); // wall
        map.add_target(-2, 4, 10); // out of bounds
        map.add_target(4, 4, 10);
        map.add_target(4, 4, 99); // duplicate
        assert_eq!(map.targets().len(), 1);
        assert_eq!(map.target_points(4, 4), 10);
    }

    #[test]
    fn hit_target_is_idempotent_until_reset() {
        let mut map = Map::new(10, 10);
        map.add_target(4, 4, 10);
        assert!(map.hit_target(4, 4));
        assert!(!map.hit_target(4, 4));
        assert!(map.is_hit_target(4, 4));
        map.reset_targets();
        assert!(!map.is_hit_target(4, 4));
        assert!(map.hit_target(4, 4));
    }

    #[test]
    fn hit_target_misses_empty_cell() {
        let mut map = Map::new(10, 10);
        assert!(!map.hit_target(4, 4));
    }

    #[test]
    fn remove_target_drops_it() {
        let mut map = Map::new(10, 10);
        map.add_target(4, 4, 10);
        map.remove_target(4, 4);
        assert!(!map.is_target(4, 4));
    }

    #[test]
    fn serialize_parse_round_trip() {
        let mut map = Map::demo();
        map.hit_target(8, 3);
        let text = map.serialize();
        let parsed = Map::parse(&text).unwrap();
        assert_eq!(parsed.width(), map.width());
        assert_eq!(parsed.height(), map.height());
        for y in 0..map.height() {
            for x in 0..map.width() {
                assert_eq!(parsed.value_at(x, y), map.value_at(x, y));
            }
        }
        // Hit flags are session state, not level data.
        assert_eq!(parsed.targets().len(), map.targets().len());
        assert!(!parsed.is_hit_target(8, 3));
    }

    #[test]
    fn parse_rejects_truncated_grid() {
        assert!(Map::parse("4 4 1 1 1").is_err());
    }

    #[test]
    fn parse_rejects_degenerate_dimensions() {
        assert!(Map::parse("0 5").is_err());
        assert!(Map::parse("5 -1").is_err());
    }

    #[test]
    fn parse_rejects_oversized_dimensions() {
        // Must come back as a parse error, not an overflow or a huge alloc.
        assert!(Map::parse("50000 50000 1").is_err());
        assert!(Map::parse("3 2000 1").is_err());
    }

    #[test]
    fn parse_rejects_negative_cell_codes() {
        // An in-grid -1 would read back as the out-of-bounds sentinel.
        let text = "3 3\n1 1 1\n1 -1 1\n1 1 1\n";
        assert!(Map::parse(text).is_err());
    }

    #[test]
    fn parse_rejects_garbage_target_count() {
        let text = "3 3\n1 1 1\n1 0 1\n1 1 1\nbogus\n";
        assert!(Map::parse(text).is_err());
    }

    #[test]
    fn parse_without_target_section_is_ok() {
        let text = "3 3\n1 1 1\n1 0 1\n1 1 1\n";
        let map = Map::parse(text).unwrap();
        assert_eq!(map.targets().len(), 0);
        assert_eq!(map.value_at(1, 1), EMPTY);
    }
}
