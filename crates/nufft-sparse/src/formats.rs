use num_complex::Complex;
use num_traits::Float;
use thiserror::Error;

pub type SparseResult<T> = Result<T, SparseError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SparseError {
    #[error("invalid shape: {message}")]
    InvalidShape { message: String },
    #[error("invalid sparse structure: {message}")]
    InvalidSparseStructure { message: String },
    #[error("index {index} out of bounds for {axis} with bound {bound}")]
    IndexOutOfBounds {
        axis: &'static str,
        index: usize,
        bound: usize,
    },
    #[error("incompatible shape: {message}")]
    IncompatibleShape { message: String },
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },
    #[error("non-finite input: {message}")]
    NonFiniteInput { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shape2D {
    pub rows: usize,
    pub cols: usize,
}

impl Shape2D {
    #[must_use]
    pub const fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    #[must_use]
    pub const fn is_square(self) -> bool {
        self.rows == self.cols
    }
}

/// Complex sparse matrix in compressed-sparse-row form.
///
/// Row-contiguous access is the storage contract: the interpolation matrix
/// `P` keeps one sample per row, and its conjugate transpose is cached in the
/// same representation so neither transform direction needs a runtime
/// transpose.
#[derive(Debug, Clone, PartialEq)]
pub struct CsrMatrix<T> {
    shape: Shape2D,
    data: Vec<Complex<T>>,
    indices: Vec<usize>,
    indptr: Vec<usize>,
}

impl<T: Float> CsrMatrix<T> {
    pub fn from_components(
        shape: Shape2D,
        data: Vec<Complex<T>>,
        indices: Vec<usize>,
        indptr: Vec<usize>,
    ) -> SparseResult<Self> {
        if indptr.len() != shape.rows + 1 {
            return Err(SparseError::InvalidShape {
                message: format!(
                    "CSR indptr length must be rows + 1 (got {} for {} rows)",
                    indptr.len(),
                    shape.rows
                ),
            });
        }
        if data.len() != indices.len() {
            return Err(SparseError::IncompatibleShape {
                message: "CSR data and indices lengths must match".to_string(),
            });
        }
        if indptr.first() != Some(&0) {
            return Err(SparseError::InvalidSparseStructure {
                message: "CSR indptr must start at zero".to_string(),
            });
        }
        if indptr.windows(2).any(|pair| pair[0] > pair[1]) {
            return Err(SparseError::InvalidSparseStructure {
                message: "CSR indptr must be non-decreasing".to_string(),
            });
        }
        if indptr.last() != Some(&data.len()) {
            return Err(SparseError::InvalidSparseStructure {
                message: "CSR indptr must end at nnz".to_string(),
            });
        }
        for &col in &indices {
            if col >= shape.cols {
                return Err(SparseError::IndexOutOfBounds {
                    axis: "column",
                    index: col,
                    bound: shape.cols,
                });
            }
        }
        Ok(Self {
            shape,
            data,
            indices,
            indptr,
        })
    }

    #[must_use]
    pub const fn shape(&self) -> Shape2D {
        self.shape
    }

    #[must_use]
    pub fn nnz(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn data(&self) -> &[Complex<T>] {
        &self.data
    }

    #[must_use]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    #[must_use]
    pub fn indptr(&self) -> &[usize] {
        &self.indptr
    }

    pub fn check_finite(&self) -> SparseResult<()> {
        if self
            .data
            .iter()
            .any(|value| !value.re.is_finite() || !value.im.is_finite())
        {
            return Err(SparseError::NonFiniteInput {
                message: "CSR data contains non-finite entries".to_string(),
            });
        }
        Ok(())
    }

    /// Conjugate transpose rebuilt as row-contiguous CSR via counting sort,
    /// O(nnz). Output rows come out with sorted column indices.
    #[must_use]
    pub fn conjugate_transpose(&self) -> Self {
        let rows = self.shape.rows;
        let cols = self.shape.cols;
        let nnz = self.data.len();

        let mut indptr = vec![0usize; cols + 1];
        for &col in &self.indices {
            indptr[col + 1] += 1;
        }
        for col in 0..cols {
            indptr[col + 1] += indptr[col];
        }

        let zero = Complex::new(T::zero(), T::zero());
        let mut data = vec![zero; nnz];
        let mut indices = vec![0usize; nnz];
        let mut cursor = indptr.clone();
        for row in 0..rows {
            for idx in self.indptr[row]..self.indptr[row + 1] {
                let col = self.indices[idx];
                let slot = cursor[col];
                cursor[col] += 1;
                indices[slot] = row;
                data[slot] = self.data[idx].conj();
            }
        }

        Self {
            shape: Shape2D::new(cols, rows),
            data,
            indices,
            indptr,
        }
    }
}
