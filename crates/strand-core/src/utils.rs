use glam::Vec3;

use crate::HairError;

/// Reads a flat `[x0, y0, z0, x1, ...]` buffer as a list of points.
pub fn flat_to_triples(flat: &[f32]) -> Result<Vec<Vec3>, HairError> {
    if flat.len() % 3 != 0 {
        return Err(HairError::MalformedBuffer { len: flat.len() });
    }
    Ok(flat
        .chunks_exact(3)
        .map(|c| Vec3::new(c[0], c[1], c[2]))
        .collect())
}

pub fn triples_to_flat(points: &[Vec3]) -> Vec<f32> {
    points.iter().flat_map(|p| p.to_array()).collect()
}

/// Writes `points` over the start of a flat buffer, 3 floats per point.
pub(crate) fn write_triples(flat: &mut [f32], points: &[Vec3]) {
    for (dst, p) in flat.chunks_exact_mut(3).zip(points) {
        dst.copy_from_slice(&p.to_array());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_keeps_points() {
        let points = vec![
            Vec3::new(0.0, 1.0, 2.0),
            Vec3::new(-3.5, 4.25, 1e-3),
            Vec3::ZERO,
        ];
        let flat = triples_to_flat(&points);
        assert_eq!(flat.len(), 9);
        assert_eq!(flat_to_triples(&flat).unwrap(), points);
    }

    #[test]
    fn flat_buffer_round_trip() {
        let flat = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let points = flat_to_triples(&flat).unwrap();
        assert_eq!(points, vec![Vec3::new(1., 2., 3.), Vec3::new(4., 5., 6.)]);
        assert_eq!(triples_to_flat(&points), flat);
    }

    #[test]
    fn empty_buffer_is_empty_list() {
        assert!(flat_to_triples(&[]).unwrap().is_empty());
        assert!(triples_to_flat(&[]).is_empty());
    }

    #[test]
    fn rejects_partial_triple() {
        let err = flat_to_triples(&[1.0, 2.0, 3.0, 4.0]).unwrap_err();
        assert!(matches!(err, HairError::MalformedBuffer { len: 4 }));
    }

    #[test]
    fn write_triples_overwrites_in_order() {
        let mut flat = vec![0.0; 6];
        write_triples(&mut flat, &[Vec3::X, Vec3::new(7., 8., 9.)]);
        assert_eq!(flat, vec![1., 0., 0., 7., 8., 9.]);
    }
}
