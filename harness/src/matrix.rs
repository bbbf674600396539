//! Host-side square matrices

/// Fixed-size `dim x dim` matrix of `f32`, stored row-major
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    dim: usize,
    data: Vec<f32>,
}

impl Matrix {
    /// All-zero matrix
    pub fn zeroed(dim: usize) -> Self {
        Self {
            dim,
            data: vec![0.0; dim * dim],
        }
    }

    /// Element at linear index `i` holds `i + 1`
    pub fn sequential(dim: usize) -> Self {
        let data = (0..dim * dim).map(|i| (i + 1) as f32).collect();
        Self { dim, data }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, x: usize, y: usize) -> Option<f32> {
        if x >= self.dim || y >= self.dim {
            return None;
        }
        self.data.get(y * self.dim + x).copied()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_fill() {
        for dim in 1..=33 {
            let m = Matrix::sequential(dim);
            assert_eq!(m.len(), dim * dim);
            for (i, value) in m.as_slice().iter().enumerate() {
                assert_eq!(*value, (i + 1) as f32);
            }
        }
    }

    #[test]
    fn test_zeroed_matches_size() {
        let m = Matrix::zeroed(5);
        assert_eq!(m.dim(), 5);
        assert_eq!(m.len(), 25);
        assert!(m.as_slice().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_get_is_row_major() {
        let m = Matrix::sequential(3);
        assert_eq!(m.get(0, 0), Some(1.0));
        assert_eq!(m.get(2, 0), Some(3.0));
        assert_eq!(m.get(0, 1), Some(4.0));
        assert_eq!(m.get(3, 0), None);
    }
}
