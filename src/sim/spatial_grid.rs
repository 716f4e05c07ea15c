use ahash::AHashMap;
use glam::Vec2;

/// Uniform spatial hash over world space.
///
/// Cells are keyed by packed integer coordinates. Queries only scan a
/// fixed square neighborhood around the query cell, so anything farther
/// out is invisible to them; callers accept that approximation.
#[derive(Clone, Debug)]
pub struct SpatialGrid<T> {
    cell_size: f32,
    cells: AHashMap<i64, Vec<T>>,
}

const fn pack(gx: i32, gy: i32) -> i64 {
    ((gx as i64) << 32) | (gy as u32 as i64)
}

impl<T: Clone> SpatialGrid<T> {
    #[must_use]
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            cells: AHashMap::new(),
        }
    }

    fn cell_of(&self, v: f32) -> i32 {
        (v / self.cell_size).floor() as i32
    }

    /// Insert `value` into every cell the box touches.
    pub fn insert_aabb(&mut self, min: Vec2, max: Vec2, value: T) {
        let (gx0, gx1) = (self.cell_of(min.x), self.cell_of(max.x));
        let (gy0, gy1) = (self.cell_of(min.y), self.cell_of(max.y));
        for gx in gx0..=gx1 {
            for gy in gy0..=gy1 {
                self.cells.entry(pack(gx, gy)).or_default().push(value.clone());
            }
        }
    }

    /// Visit every entry within `radius` cells of the cell containing `p`.
    /// Entries spanning several cells are visited once per cell.
    pub fn for_each_near(&self, p: Vec2, radius: i32, mut f: impl FnMut(&T)) {
        let gx = self.cell_of(p.x);
        let gy = self.cell_of(p.y);
        for dx in -radius..=radius {
            for dy in -radius..=radius {
                if let Some(bucket) = self.cells.get(&pack(gx + dx, gy + dy)) {
                    for item in bucket {
                        f(item);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_entries_in_neighboring_cells() {
        let mut grid = SpatialGrid::new(100.0);
        grid.insert_aabb(Vec2::new(10.0, 10.0), Vec2::new(20.0, 20.0), 1u32);
        grid.insert_aabb(Vec2::new(150.0, 10.0), Vec2::new(160.0, 20.0), 2u32);
        grid.insert_aabb(Vec2::new(950.0, 950.0), Vec2::new(960.0, 960.0), 3u32);

        let mut seen = Vec::new();
        grid.for_each_near(Vec2::new(50.0, 50.0), 1, |v| seen.push(*v));
        seen.sort_unstable();
        assert_eq!(seen, vec![1, 2]);
    }

    #[test]
    fn spanning_entries_land_in_every_touched_cell() {
        let mut grid = SpatialGrid::new(100.0);
        grid.insert_aabb(Vec2::new(-50.0, -50.0), Vec2::new(150.0, 50.0), 7u32);

        let mut hits = 0;
        grid.for_each_near(Vec2::new(120.0, 20.0), 0, |_| hits += 1);
        assert_eq!(hits, 1);
        let mut hits = 0;
        grid.for_each_near(Vec2::new(-20.0, -20.0), 0, |_| hits += 1);
        assert_eq!(hits, 1);
    }

    #[test]
    fn negative_coordinates_hash_distinctly() {
        let mut grid = SpatialGrid::new(100.0);
        grid.insert_aabb(Vec2::new(-150.0, -150.0), Vec2::new(-140.0, -140.0), 1u32);

        let mut hits = 0;
        grid.for_each_near(Vec2::new(140.0, 140.0), 0, |_| hits += 1);
        assert_eq!(hits, 0);
        let mut hits = 0;
        grid.for_each_near(Vec2::new(-140.0, -140.0), 0, |_| hits += 1);
        assert_eq!(hits, 1);
    }
}
