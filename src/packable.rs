//! Flat `f64` array encoding of outline descriptors for transfer between
//! threads.

use crate::error::{PackError, Result};
use crate::math::{Point2, Point3, Vector3};

/// A value that can be written to and read back from a flat `f64` buffer.
pub trait Packable: Sized {
    /// Number of elements [`Packable::pack`] writes.
    fn packed_length(&self) -> usize;

    /// Writes `self` into `buffer` starting at `offset` and returns the
    /// offset just past the written values.
    ///
    /// # Errors
    ///
    /// Returns [`PackError::BufferTooShort`] if the values do not fit.
    fn pack(&self, buffer: &mut [f64], offset: usize) -> Result<usize>;

    /// Reads a value from `buffer` starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns a [`PackError`] for truncated or malformed input, or the
    /// validation error of the descriptor's constructor.
    fn unpack(buffer: &[f64], offset: usize) -> Result<Self>;

    /// Packs `self` into a new buffer of exactly [`Packable::packed_length`]
    /// elements.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`Packable::pack`].
    fn to_packed(&self) -> Result<Vec<f64>> {
        let mut buffer = vec![0.0; self.packed_length()];
        self.pack(&mut buffer, 0)?;
        Ok(buffer)
    }
}

/// Sequential writer over a buffer whose capacity was checked up front.
pub(crate) struct PackWriter<'a> {
    buffer: &'a mut [f64],
    offset: usize,
}

impl<'a> PackWriter<'a> {
    /// Starts writing at `offset`, reserving `length` elements.
    pub(crate) fn new(buffer: &'a mut [f64], offset: usize, length: usize) -> Result<Self> {
        let needed = offset.saturating_add(length);
        if buffer.len() < needed {
            return Err(PackError::BufferTooShort {
                needed,
                available: buffer.len(),
            }
            .into());
        }
        Ok(Self { buffer, offset })
    }

    pub(crate) fn write(&mut self, value: f64) {
        self.buffer[self.offset] = value;
        self.offset += 1;
    }

    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn write_count(&mut self, count: usize) {
        self.write(count as f64);
    }

    pub(crate) fn write_point2(&mut self, p: &Point2) {
        self.write(p.x);
        self.write(p.y);
    }

    pub(crate) fn write_point3(&mut self, p: &Point3) {
        self.write(p.x);
        self.write(p.y);
        self.write(p.z);
    }

    pub(crate) fn write_vector3(&mut self, v: &Vector3) {
        self.write(v.x);
        self.write(v.y);
        self.write(v.z);
    }

    /// Offset just past the last written value.
    pub(crate) fn offset(&self) -> usize {
        self.offset
    }
}

/// Sequential reader with bounds checks on every value.
pub(crate) struct PackReader<'a> {
    buffer: &'a [f64],
    offset: usize,
}

impl<'a> PackReader<'a> {
    pub(crate) fn new(buffer: &'a [f64], offset: usize) -> Self {
        Self { buffer, offset }
    }

    pub(crate) fn read(&mut self) -> Result<f64> {
        let value = self
            .buffer
            .get(self.offset)
            .copied()
            .ok_or(PackError::BufferTooShort {
                needed: self.offset.saturating_add(1),
                available: self.buffer.len(),
            })?;
        self.offset += 1;
        Ok(value)
    }

    /// Reads an element count. Counts must be non-negative integers that
    /// could fit in the rest of the buffer.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub(crate) fn read_count(&mut self) -> Result<usize> {
        let value = self.read()?;
        let remaining = self.buffer.len().saturating_sub(self.offset);
        if !(value >= 0.0 && value.fract() == 0.0 && value <= remaining as f64) {
            return Err(PackError::InvalidCount(value).into());
        }
        Ok(value as usize)
    }

    pub(crate) fn read_point2(&mut self) -> Result<Point2> {
        Ok(Point2::new(self.read()?, self.read()?))
    }

    pub(crate) fn read_point3(&mut self) -> Result<Point3> {
        Ok(Point3::new(self.read()?, self.read()?, self.read()?))
    }

    pub(crate) fn read_vector3(&mut self) -> Result<Vector3> {
        Ok(Vector3::new(self.read()?, self.read()?, self.read()?))
    }
}
