//! Run-length coding of layer grids
//!
//! A grid is written row-major as `(count: var_u16, value)` runs. Runs are
//! capped at [`VAR_U16_MAX`] cells; longer stretches become several runs.

use crate::error::{Result, ShipFileError};
use crate::shp2::buffer::{ByteBuffer, ByteReader, VAR_U16_MAX};

/// Encode `cells` as runs of equal values
///
/// `write_value` appends the encoding of one run's value.
pub fn encode_runs<T, F>(cells: &[T], buffer: &mut ByteBuffer, mut write_value: F) -> Result<()>
where
    T: PartialEq,
    F: FnMut(&mut ByteBuffer, &T) -> Result<()>,
{
    let mut index = 0;
    while index < cells.len() {
        let value = &cells[index];
        let mut count: u16 = 1;
        index += 1;

        while index < cells.len() && count < VAR_U16_MAX && cells[index] == *value {
            count += 1;
            index += 1;
        }

        buffer.append_var_u16(count)?;
        write_value(buffer, value)?;
    }

    Ok(())
}

/// Decode runs until `body` is exhausted, expecting exactly `cell_count` cells
///
/// Zero-length runs, runs overshooting `cell_count` and a short total are
/// invalid.
pub fn decode_runs<T, F>(body: &[u8], cell_count: usize, mut read_value: F) -> Result<Vec<T>>
where
    T: Clone,
    F: FnMut(&mut ByteReader<'_>) -> Result<T>,
{
    let mut reader = ByteReader::new(body);
    let mut cells = Vec::new();

    while !reader.is_empty() {
        let count = usize::from(reader.read_var_u16()?);
        if count == 0 {
            return Err(ShipFileError::invalid_file(format!(
                "zero-length run at offset {}",
                reader.position()
            )));
        }

        let value = read_value(&mut reader)?;
        if cells.len() + count > cell_count {
            return Err(ShipFileError::invalid_file(format!(
                "run of {count} cells overflows a layer of {cell_count} cells"
            )));
        }

        cells.extend(std::iter::repeat_n(value, count));
    }

    if cells.len() != cell_count {
        return Err(ShipFileError::invalid_file(format!(
            "layer holds {} cells, expected {cell_count}",
            cells.len()
        )));
    }

    Ok(cells)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    fn encode(cells: &[u8]) -> Vec<u8> {
        let mut buffer = ByteBuffer::new();
        encode_runs(cells, &mut buffer, |b, v| {
            b.append_u8(*v);
            Ok(())
        })
        .unwrap();
        buffer.into_vec()
    }

    fn decode(body: &[u8], cell_count: usize) -> Result<Vec<u8>> {
        decode_runs(body, cell_count, |r| r.read_u8())
    }

    #[test]
    fn test_runs_layout() {
        assert_eq!(encode(&[5, 5, 5, 2, 5]), vec![3, 5, 1, 2, 1, 5]);
        assert!(encode(&[]).is_empty());
    }

    #[test]
    fn test_long_run_is_split() {
        // one value spanning several maximal runs
        let cells = vec![9u8; 70_000];
        let body = encode(&cells);

        let full = usize::from(VAR_U16_MAX);
        let runs = 70_000 / full;
        let last = 70_000 % full;
        assert_eq!(body.len(), runs * 3 + if last > 0x7F { 3 } else { 2 });
        assert_eq!(decode(&body, cells.len()).unwrap(), cells);
    }

    #[test]
    fn test_checkerboard() {
        let cells = (0..64u8).map(|i| (i + i / 8) % 2).collect::<Vec<_>>();
        let body = encode(&cells);
        // the last cell of each row matches the first cell of the next
        assert_eq!(body.len(), (64 - 7) * 2);
        assert_eq!(decode(&body, 64).unwrap(), cells);
    }

    #[test]
    fn test_zero_run_is_invalid() {
        assert!(matches!(decode(&[0, 1], 0), Err(ShipFileError::InvalidFile(_))));
    }

    #[test]
    fn test_overshoot_and_shortfall_are_invalid() {
        assert!(matches!(decode(&[3, 1], 2), Err(ShipFileError::InvalidFile(_))));
        assert!(matches!(decode(&[1, 1], 2), Err(ShipFileError::InvalidFile(_))));
        assert!(matches!(decode(&[2], 2), Err(ShipFileError::InvalidFile(_))));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn runs_round_trip(cells in prop::collection::vec(0u8..4, 0..2000)) {
                let body = encode(&cells);
                prop_assert_eq!(decode(&body, cells.len()).unwrap(), cells);
            }

            #[test]
            fn runs_round_trip_long_stretches(
                stretches in prop::collection::vec((0u8..3, 1usize..40_000), 1..5)
            ) {
                let cells = stretches
                    .iter()
                    .flat_map(|&(value, len)| std::iter::repeat_n(value, len))
                    .collect::<Vec<_>>();
                let body = encode(&cells);
                prop_assert_eq!(decode(&body, cells.len()).unwrap(), cells);
            }
        }
    }
}
