mod centroid;
#[cfg(feature = "backend-mesh")]
mod mesh;
mod stub;

pub use centroid::CentroidDetector;
#[cfg(feature = "backend-mesh")]
pub use mesh::MeshDetector;
pub use stub::StubDetector;
