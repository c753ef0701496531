//! Length-framed point-vector encoding shared by the phase-2 aggregates.
//!
//! Vectors are written as a `u64` little-endian length followed by the
//! canonical encoding of each element; readers validate every point against
//! the curve equation and the prime-order subgroup.

use crate::Phase2Error;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize, Compress, Validate};
use ark_std::{
    io::{Read, Write},
    vec::Vec,
};

pub(crate) fn write_u64<W: Write>(mut writer: W, value: u64) -> Result<(), Phase2Error> {
    writer.write_all(&value.to_le_bytes())?;
    Ok(())
}

pub(crate) fn read_u64<R: Read>(mut reader: R) -> Result<u64, Phase2Error> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

pub(crate) fn write_points<T: CanonicalSerialize, W: Write>(
    mut writer: W,
    points: &[T],
    compress: Compress,
) -> Result<(), Phase2Error> {
    write_u64(&mut writer, points.len() as u64)?;
    for point in points {
        point.serialize_with_mode(&mut writer, compress)?;
    }
    Ok(())
}

pub(crate) fn read_points<T: CanonicalDeserialize, R: Read>(
    mut reader: R,
    compress: Compress,
) -> Result<Vec<T>, Phase2Error> {
    let len = read_u64(&mut reader)? as usize;
    let mut points = Vec::with_capacity(len);
    for _ in 0..len {
        points.push(T::deserialize_with_mode(
            &mut reader,
            compress,
            Validate::Yes,
        )?);
    }
    Ok(points)
}
