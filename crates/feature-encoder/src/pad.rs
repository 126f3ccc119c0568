//! Cluster charge re-binned onto a fixed grid around the centroid
//!
//! Each axis has `size` equal-width bins covering `[c - half, c + half)`,
//! where `c` is the cluster centroid on that axis. Pixels outside the window
//! are dropped. A pixel replaces whatever an earlier pixel wrote to the same
//! cell.
//!
//! Cells are stored row-major: row 0 is the highest y bin, and inside a row
//! column 0 is the highest x bin. The trained model expects exactly this
//! orientation.

use doublet_common::{Cluster, DoubletConfig};

/// Equal-width binning of one axis
#[derive(Debug, Clone, Copy)]
struct Axis {
    bins: usize,
    low: f64,
    high: f64,
}

impl Axis {
    fn centered(center: f32, half_width: f32, bins: usize) -> Self {
        Self {
            bins,
            low: f64::from(center - half_width),
            high: f64::from(center + half_width),
        }
    }

    /// 0-based bin of `value`, `None` outside `[low, high)`
    fn find_bin(&self, value: f64) -> Option<usize> {
        if !(value >= self.low && value < self.high) {
            return None;
        }
        let bin = (self.bins as f64 * (value - self.low) / (self.high - self.low)) as usize;
        (bin < self.bins).then_some(bin)
    }
}

/// Square single-channel cluster image
#[derive(Debug, Clone, PartialEq)]
pub struct Pad {
    size: usize,
    cells: Vec<f32>,
}

impl Pad {
    /// All-zero pad
    #[must_use]
    pub fn zeros(size: usize) -> Self {
        Self {
            size,
            cells: vec![0.0; size * size],
        }
    }

    /// Bin a cluster's pixels using the pad geometry of `config`
    #[must_use]
    pub fn from_cluster(cluster: &Cluster, config: &DoubletConfig) -> Self {
        let size = config.pad_size();
        let half = config.pad_half_size;
        let x_axis = Axis::centered(cluster.x, half, size);
        let y_axis = Axis::centered(cluster.y, half, size);

        let mut pad = Self::zeros(size);
        for pixel in &cluster.pixels {
            let x_bin = x_axis.find_bin(f64::from(pixel.x));
            let y_bin = y_axis.find_bin(f64::from(pixel.y));
            if let (Some(xb), Some(yb)) = (x_bin, y_bin) {
                let row = size - 1 - yb;
                let col = size - 1 - xb;
                pad.cells[row * size + col] = f32::from(pixel.adc);
            }
        }
        pad
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Flat row-major cells
    #[must_use]
    pub fn cells(&self) -> &[f32] {
        &self.cells
    }

    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.cells[row * self.size + col]
    }

    /// Sum of all cells
    #[must_use]
    pub fn total(&self) -> f32 {
        self.cells.iter().sum()
    }

    /// Write the normalized cells into `out`, which must hold `size²` values
    pub fn write_normalized(&self, config: &DoubletConfig, out: &mut [f32]) {
        for (dst, &v) in out.iter_mut().zip(&self.cells) {
            *dst = config.normalize_pad_value(v);
        }
    }
}
