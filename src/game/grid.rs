use super::types::EntityRef;
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
  pub x: f64,
  pub y: f64,
  pub radius: f64,
}

/// Uniform-cell index over the torus. Rebuilt from scratch every tick.
#[derive(Debug)]
pub struct SpatialGrid {
  cell_size: f64,
  width: f64,
  height: f64,
  cols: i32,
  rows: i32,
  cells: HashMap<(i32, i32), BTreeSet<EntityRef>>,
}

impl SpatialGrid {
  pub fn new(cell_size: f64, width: f64, height: f64) -> Self {
    let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
      cell_size
    } else {
      1.0
    };
    Self {
      cell_size,
      width,
      height,
      cols: axis_cells(width, cell_size),
      rows: axis_cells(height, cell_size),
      cells: HashMap::new(),
    }
  }

  pub fn clear(&mut self) {
    self.cells.clear();
  }

  /// Re-targets the grid after a world resize. Drops every entry.
  pub fn resize(&mut self, width: f64, height: f64) {
    self.width = width;
    self.height = height;
    self.cols = axis_cells(width, self.cell_size);
    self.rows = axis_cells(height, self.cell_size);
    self.cells.clear();
  }

  pub fn insert(&mut self, entity: EntityRef, bounds: Bounds) {
    let xs = self.covered(bounds.x, bounds.radius, self.width, self.cols);
    let ys = self.covered(bounds.y, bounds.radius, self.height, self.rows);
    for &cx in &xs {
      for &cy in &ys {
        self.cells.entry((cx, cy)).or_default().insert(entity);
      }
    }
  }

  /// Every entity sharing a cell with `bounds`, each once, in a stable order.
  pub fn query(&self, bounds: Bounds) -> Vec<EntityRef> {
    let xs = self.covered(bounds.x, bounds.radius, self.width, self.cols);
    let ys = self.covered(bounds.y, bounds.radius, self.height, self.rows);
    let mut found = BTreeSet::new();
    for &cx in &xs {
      for &cy in &ys {
        if let Some(cell) = self.cells.get(&(cx, cy)) {
          found.extend(cell.iter().copied());
        }
      }
    }
    found.into_iter().collect()
  }

  pub fn len(&self) -> usize {
    self.cells.values().map(BTreeSet::len).sum()
  }

  pub fn is_empty(&self) -> bool {
    self.cells.is_empty()
  }

  fn covered(&self, center: f64, radius: f64, size: f64, count: i32) -> Vec<i32> {
    let radius = if radius.is_finite() { radius.max(0.0) } else { 0.0 };
    let span = radius * 2.0;
    if !center.is_finite() || span >= size {
      return (0..count).collect();
    }

    let half = size * 0.5;
    let start = (center - radius + half).rem_euclid(size);
    let end = start + span;
    let index = |offset: f64| ((offset / self.cell_size).floor() as i32).clamp(0, count - 1);

    if end < size {
      (index(start)..=index(end)).collect()
    } else {
      // The circle straddles the seam: right edge plus the wrapped-around left edge.
      let mut cells: Vec<i32> = (index(start)..count).collect();
      let wrapped_end = index(end - size);
      for cell in 0..=wrapped_end {
        if !cells.contains(&cell) {
          cells.push(cell);
        }
      }
      cells
    }
  }
}

fn axis_cells(size: f64, cell_size: f64) -> i32 {
  let count = (size / cell_size).ceil();
  if count.is_finite() && count >= 1.0 {
    count as i32
  } else {
    1
  }
}
