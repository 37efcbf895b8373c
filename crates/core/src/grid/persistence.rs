//! Grid persistence in text and binary form
//!
//! Both formats store every [`Grid`] field and round-trip exactly. The text
//! format is a single JSON record tagged with a format name and version; the
//! binary format is a fixed little-endian layout behind a magic header.
//!
//! Reading a file not produced by the matching writer is always an error:
//! unknown fields, a wrong tag, trailing bytes and fields inconsistent with
//! each other are all rejected, never repaired.

use super::{Grid, IndexBox, SpatialDerivativeAccuracy};
use crate::error::{LsmError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Format tag of the text record.
pub const TEXT_FORMAT: &str = "lsm-grid";

/// Magic bytes opening a binary grid file.
pub const BINARY_MAGIC: [u8; 4] = *b"LSMG";

/// Version shared by both formats.
pub const FORMAT_VERSION: u8 = 1;

#[derive(Serialize)]
struct GridRecordOut<'a> {
    format: &'a str,
    version: u8,
    grid: &'a Grid,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct GridRecordIn {
    format: String,
    version: u8,
    grid: Grid,
}

impl Grid {
    /// Serialize to the human-readable text record.
    ///
    /// # Errors
    ///
    /// Fails only if serialization itself fails.
    pub fn to_text(&self) -> Result<String> {
        let record = GridRecordOut {
            format: TEXT_FORMAT,
            version: FORMAT_VERSION,
            grid: self,
        };
        serde_json::to_string_pretty(&record).map_err(|e| LsmError::MalformedGridFile {
            detail: format!("failed to serialize grid: {e}"),
        })
    }

    /// Parse a text record written by [`Grid::to_text`].
    ///
    /// # Errors
    ///
    /// Returns [`LsmError::MalformedGridFile`] for anything that is not an
    /// intact record from the matching writer.
    pub fn from_text(text: &str) -> Result<Self> {
        let record: GridRecordIn =
            serde_json::from_str(text).map_err(|e| LsmError::MalformedGridFile {
                detail: format!("not a grid text record: {e}"),
            })?;
        if record.format != TEXT_FORMAT {
            return Err(LsmError::MalformedGridFile {
                detail: format!("unexpected format tag '{}'", record.format),
            });
        }
        if record.version != FORMAT_VERSION {
            return Err(LsmError::MalformedGridFile {
                detail: format!("unsupported format version {}", record.version),
            });
        }
        record.grid.validate()?;
        Ok(record.grid)
    }

    /// Write the text record to `path`, overwriting any existing file.
    pub fn write_text_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_text()?)?;
        Ok(())
    }

    /// Read a grid from a file written by [`Grid::write_text_file`].
    pub fn read_text_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_text(&text)
    }

    /// Write the fixed-layout binary form.
    pub fn write_binary<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_all(&BINARY_MAGIC)?;
        w.write_all(&[FORMAT_VERSION, self.num_dims as u8, accuracy_tag(self.accuracy)])?;
        for values in [self.x_lo, self.x_hi, self.x_lo_ghostbox, self.x_hi_ghostbox] {
            write_f64s(w, &values)?;
        }
        for values in [self.grid_dims, self.grid_dims_ghostbox] {
            for v in values {
                w.write_all(&(v as u64).to_le_bytes())?;
            }
        }
        write_f64s(w, &self.dx)?;
        w.write_all(&(self.num_gridpts as u64).to_le_bytes())?;
        for bx in [
            self.ghost_box,
            self.fill_box,
            self.d1_fill_box,
            self.d2_fill_box,
            self.d3_fill_box,
        ] {
            for v in bx.lo.iter().chain(bx.hi.iter()) {
                w.write_all(&v.to_le_bytes())?;
            }
        }
        Ok(())
    }

    /// Read the binary form written by [`Grid::write_binary`]. The reader must
    /// hold exactly one grid record.
    pub fn read_binary<R: Read>(r: &mut R) -> Result<Self> {
        let mut magic = [0_u8; 4];
        read_exact(r, &mut magic)?;
        if magic != BINARY_MAGIC {
            return Err(LsmError::MalformedGridFile {
                detail: format!("invalid magic bytes {magic:?}"),
            });
        }
        let mut header = [0_u8; 3];
        read_exact(r, &mut header)?;
        if header[0] != FORMAT_VERSION {
            return Err(LsmError::MalformedGridFile {
                detail: format!("unsupported format version {}", header[0]),
            });
        }
        let num_dims = usize::from(header[1]);
        let accuracy = accuracy_from_tag(header[2])?;

        let x_lo = read_f64s(r)?;
        let x_hi = read_f64s(r)?;
        let x_lo_ghostbox = read_f64s(r)?;
        let x_hi_ghostbox = read_f64s(r)?;
        let grid_dims = read_usizes(r)?;
        let grid_dims_ghostbox = read_usizes(r)?;
        let dx = read_f64s(r)?;
        let num_gridpts = read_usize(r)?;
        let ghost_box = read_box(r)?;
        let fill_box = read_box(r)?;
        let d1_fill_box = read_box(r)?;
        let d2_fill_box = read_box(r)?;
        let d3_fill_box = read_box(r)?;

        let mut trailing = [0_u8; 1];
        match r.read(&mut trailing) {
            Ok(0) => {}
            Ok(_) => {
                return Err(LsmError::MalformedGridFile {
                    detail: "trailing bytes after grid record".into(),
                })
            }
            Err(e) => return Err(e.into()),
        }

        let grid = Self {
            num_dims,
            accuracy,
            x_lo,
            x_hi,
            x_lo_ghostbox,
            x_hi_ghostbox,
            grid_dims,
            grid_dims_ghostbox,
            dx,
            num_gridpts,
            ghost_box,
            fill_box,
            d1_fill_box,
            d2_fill_box,
            d3_fill_box,
        };
        grid.validate()?;
        Ok(grid)
    }

    /// Write the binary form to `path`, overwriting any existing file.
    pub fn write_binary_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(fs::File::create(path)?);
        self.write_binary(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Read a grid from a file written by [`Grid::write_binary_file`].
    pub fn read_binary_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut reader = BufReader::new(fs::File::open(path)?);
        Self::read_binary(&mut reader)
    }
}

fn accuracy_tag(accuracy: SpatialDerivativeAccuracy) -> u8 {
    match accuracy {
        SpatialDerivativeAccuracy::Low => 0,
        SpatialDerivativeAccuracy::Medium => 1,
        SpatialDerivativeAccuracy::High => 2,
        SpatialDerivativeAccuracy::VeryHigh => 3,
    }
}

fn accuracy_from_tag(tag: u8) -> Result<SpatialDerivativeAccuracy> {
    match tag {
        0 => Ok(SpatialDerivativeAccuracy::Low),
        1 => Ok(SpatialDerivativeAccuracy::Medium),
        2 => Ok(SpatialDerivativeAccuracy::High),
        3 => Ok(SpatialDerivativeAccuracy::VeryHigh),
        _ => Err(LsmError::MalformedGridFile {
            detail: format!("unknown accuracy tag {tag}"),
        }),
    }
}

fn read_exact<R: Read>(r: &mut R, buf: &mut [u8]) -> Result<()> {
    r.read_exact(buf).map_err(|e| {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            LsmError::MalformedGridFile {
                detail: "truncated grid record".into(),
            }
        } else {
            LsmError::Io(e)
        }
    })
}

fn write_f64s<W: Write>(w: &mut W, values: &[f64; 3]) -> Result<()> {
    for v in values {
        w.write_all(&v.to_le_bytes())?;
    }
    Ok(())
}

fn read_f64s<R: Read>(r: &mut R) -> Result<[f64; 3]> {
    let mut out = [0.0; 3];
    for v in &mut out {
        let mut buf = [0_u8; 8];
        read_exact(r, &mut buf)?;
        *v = f64::from_le_bytes(buf);
    }
    Ok(out)
}

fn read_usize<R: Read>(r: &mut R) -> Result<usize> {
    let mut buf = [0_u8; 8];
    read_exact(r, &mut buf)?;
    usize::try_from(u64::from_le_bytes(buf)).map_err(|_| LsmError::MalformedGridFile {
        detail: "cell count does not fit in usize".into(),
    })
}

fn read_usizes<R: Read>(r: &mut R) -> Result<[usize; 3]> {
    Ok([read_usize(r)?, read_usize(r)?, read_usize(r)?])
}

fn read_box<R: Read>(r: &mut R) -> Result<IndexBox> {
    let mut v = [0_i32; 6];
    for x in &mut v {
        let mut buf = [0_u8; 4];
        read_exact(r, &mut buf)?;
        *x = i32::from_le_bytes(buf);
    }
    Ok(IndexBox::new([v[0], v[1], v[2]], [v[3], v[4], v[5]]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_grid() -> Grid {
        Grid::with_spacing(
            3,
            0.07,
            &[-1.0, 0.3, 2.0],
            &[1.0, 0.9, 2.5],
            SpatialDerivativeAccuracy::High,
        )
        .unwrap()
    }

    #[test]
    fn test_text_round_trip_is_exact() {
        let grid = sample_grid();
        let text = grid.to_text().unwrap();
        assert!(text.contains(TEXT_FORMAT));
        let back = Grid::from_text(&text).unwrap();
        assert_eq!(back, grid);
    }

    #[test]
    fn test_binary_round_trip_is_exact() {
        let grid = Grid::with_cell_counts(
            2,
            &[33, 17],
            &[0.1, -0.7],
            &[0.9, 0.3],
            SpatialDerivativeAccuracy::VeryHigh,
        )
        .unwrap();
        let mut bytes = Vec::new();
        grid.write_binary(&mut bytes).unwrap();
        let back = Grid::read_binary(&mut bytes.as_slice()).unwrap();
        assert_eq!(back, grid);
    }

    #[test]
    fn test_text_rejects_foreign_records() {
        assert!(matches!(
            Grid::from_text("num_dims = 2"),
            Err(LsmError::MalformedGridFile { .. })
        ));

        let text = sample_grid().to_text().unwrap();
        let wrong_tag = text.replace(TEXT_FORMAT, "something-else");
        assert!(matches!(
            Grid::from_text(&wrong_tag),
            Err(LsmError::MalformedGridFile { .. })
        ));

        let extra_field = text.replacen('{', "{\n  \"comment\": \"hi\",", 1);
        assert!(Grid::from_text(&extra_field).is_err());
    }

    #[test]
    fn test_text_rejects_inconsistent_fields() {
        let text = sample_grid().to_text().unwrap();
        let mut value: serde_json::Value = serde_json::from_str(&text).unwrap();
        value["grid"]["num_gridpts"] = serde_json::json!(7);
        let corrupt = serde_json::to_string(&value).unwrap();
        assert!(matches!(
            Grid::from_text(&corrupt),
            Err(LsmError::MalformedGridFile { .. })
        ));
    }

    #[test]
    fn test_oversized_cell_count_is_malformed() {
        let grid = Grid::with_cell_counts(
            2,
            &[16, 8],
            &[0.0, 0.0],
            &[1.0, 0.5],
            SpatialDerivativeAccuracy::Medium,
        )
        .unwrap();
        let mut bytes = Vec::new();
        grid.write_binary(&mut bytes).unwrap();

        // header, then x_lo, x_hi and both ghost-box bounds as [f64; 3]
        let dims_at = 4 + 3 + 4 * 24;
        let dx_at = dims_at + 2 * 24;
        let cells: u64 = 1 << 62;
        bytes[dims_at..dims_at + 8].copy_from_slice(&cells.to_le_bytes());
        // keep x_hi - x_lo == grid_dims * dx
        let dx = 1.0 / cells as f64;
        bytes[dx_at..dx_at + 8].copy_from_slice(&dx.to_le_bytes());

        assert!(matches!(
            Grid::read_binary(&mut bytes.as_slice()),
            Err(LsmError::MalformedGridFile { .. })
        ));
    }

    #[test]
    fn test_inactive_axis_bounds_must_be_zero() {
        let text = Grid::with_cell_counts(
            2,
            &[10, 10],
            &[0.0, 0.0],
            &[1.0, 1.0],
            SpatialDerivativeAccuracy::Low,
        )
        .unwrap()
        .to_text()
        .unwrap();
        for field in ["x_lo", "x_hi", "x_lo_ghostbox", "x_hi_ghostbox"] {
            let mut value: serde_json::Value = serde_json::from_str(&text).unwrap();
            value["grid"][field][2] = serde_json::json!(0.5);
            let edited = serde_json::to_string(&value).unwrap();
            assert!(
                matches!(Grid::from_text(&edited), Err(LsmError::MalformedGridFile { .. })),
                "{field}[2] edit was accepted"
            );
        }
    }

    #[test]
    fn test_binary_rejects_corruption() {
        let grid = sample_grid();
        let mut bytes = Vec::new();
        grid.write_binary(&mut bytes).unwrap();

        let mut bad_magic = bytes.clone();
        bad_magic[0] = b'X';
        assert!(Grid::read_binary(&mut bad_magic.as_slice()).is_err());

        let truncated = &bytes[..bytes.len() - 3];
        assert!(matches!(
            Grid::read_binary(&mut &truncated[..]),
            Err(LsmError::MalformedGridFile { .. })
        ));

        let mut trailing = bytes.clone();
        trailing.push(0);
        assert!(Grid::read_binary(&mut trailing.as_slice()).is_err());

        // Flip a byte inside the fill box record
        let mut flipped = bytes.clone();
        let last = flipped.len() - 30;
        flipped[last] ^= 0x01;
        assert!(Grid::read_binary(&mut flipped.as_slice()).is_err());

        // Text is not binary
        let text = grid.to_text().unwrap();
        assert!(Grid::read_binary(&mut text.as_bytes()).is_err());
    }
}
