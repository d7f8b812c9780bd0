// World-space geometry aliases. +y is up; the map looks down onto the x/z ground plane.

pub type Unit = euclid::UnknownUnit;

pub type WorldPoint = euclid::Point3D<f32, Unit>;
pub type WorldVector = euclid::Vector3D<f32, Unit>;
pub type WorldBox = euclid::Box3D<f32, Unit>;

pub fn point(x: f32, y: f32, z: f32) -> WorldPoint {
    euclid::point3(x, y, z)
}

pub fn vector(x: f32, y: f32, z: f32) -> WorldVector {
    euclid::vec3(x, y, z)
}
