
use crate::mesh::Mesh;

pub(super) fn unit_grid(n: usize) -> Mesh {
    let x: Vec<Vec<f64>> = (0..n)
        .map(|_| (0..n).map(|c| c as f64).collect())
        .collect();
    let z: Vec<Vec<f64>> = (0..n).map(|r| vec![r as f64; n]).collect();
    Mesh::from_rows(&x, &z).expect("valid grid")
}
