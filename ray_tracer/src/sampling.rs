use std::collections::HashMap;

use crate::{error::RayTracerError, ray::RayKey, Color, Ray, Result};

/// A rectangular block of the sample grid still waiting to be resolved.
#[derive(Debug, Clone, Copy)]
struct Block {
    row: usize,
    column: usize,
    rows: usize,
    columns: usize,
    level: usize,
}

impl Block {
    fn len(&self) -> usize {
        self.rows * self.columns
    }

    /// Top left, top right, bottom left and bottom right cells.
    fn corners(&self) -> [(usize, usize); 4] {
        let last_row = self.row + self.rows - 1;
        let last_column = self.column + self.columns - 1;
        [
            (self.row, self.column),
            (self.row, last_column),
            (last_row, self.column),
            (last_row, last_column),
        ]
    }

    /// Halves along both axes; odd sizes give unequal halves.
    fn quadrants(&self) -> impl Iterator<Item = Block> + '_ {
        let top = self.rows / 2;
        let left = self.columns / 2;
        let row_spans = [(self.row, top), (self.row + top, self.rows - top)];
        let column_spans = [(self.column, left), (self.column + left, self.columns - left)];

        row_spans
            .into_iter()
            .flat_map(move |(row, rows)| {
                column_spans.into_iter().map(move |(column, columns)| Block {
                    row,
                    column,
                    rows,
                    columns,
                    level: self.level - 1,
                })
            })
            .filter(|block| block.len() > 0)
    }
}

/// Averages the colors of a pixel's square sample grid, tracing only as many rays
/// as needed: blocks whose four corners agree are taken to be uniform,
/// the others are split into quadrants until `max_level` runs out.
///
/// `rays` holds `samples * samples` rays in row-major order. No ray is traced twice.
pub fn adaptive_color<F>(rays: &[Ray], samples: usize, max_level: usize, mut trace: F) -> Result<Color>
where
    F: FnMut(&Ray) -> Result<Color>,
{
    if samples == 0 || samples.checked_mul(samples) != Some(rays.len()) {
        return Err(RayTracerError::InvalidSetting(format!(
            "expected a {samples}x{samples} grid of rays, got {} rays",
            rays.len()
        )));
    }

    let mut memo: HashMap<RayKey, Color> = HashMap::new();
    let mut color_of = |row: usize, column: usize| -> Result<Color> {
        let ray = &rays[row * samples + column];
        let key = ray.key();
        if let Some(color) = memo.get(&key) {
            return Ok(*color);
        }
        let color = trace(ray)?;
        memo.insert(key, color);
        Ok(color)
    };

    let mut sum = Color::black();
    let mut worklist = vec![Block {
        row: 0,
        column: 0,
        rows: samples,
        columns: samples,
        level: max_level,
    }];

    while let Some(block) = worklist.pop() {
        if block.level <= 1 {
            for row in block.row..block.row + block.rows {
                for column in block.column..block.column + block.columns {
                    sum += color_of(row, column)?;
                }
            }
            continue;
        }

        let mut corners = [Color::black(); 4];
        for (color, (row, column)) in corners.iter_mut().zip(block.corners()) {
            *color = color_of(row, column)?;
        }

        let uniform = corners.iter().all(|color| *color == corners[0]);
        if block.len() <= 4 || uniform {
            sum += corners[3] * block.len() as f64;
        } else {
            worklist.extend(block.quadrants());
        }
    }

    Ok(sum / rays.len() as f64)
}
