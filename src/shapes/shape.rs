use crate::bodies::{Material, Polygon};
use crate::error::PhysicsError;
use crate::math::Vector2;
use crate::Result;

use std::f64::consts::PI;

/// Factory for commonly used bodies.
///
/// Every body is finished, has its center of mass at the origin of body coordinates and gets a
/// mass of `density * area` from the default material.
pub struct Shapes;

impl Shapes {
    /// Creates a `width` by `height` rectangle centered on its center of mass
    pub fn make_block(width: f64, height: f64, name: &str) -> Result<Polygon> {
        if !(width > 0.0 && height > 0.0) {
            return Err(PhysicsError::InvalidParameter(format!(
                "Block {} needs positive dimensions, got {} x {}", name, width, height
            )));
        }
        let w = width / 2.0;
        let h = height / 2.0;
        let mut p = Polygon::new(name);
        p.start_path(Vector2::new(-w, -h))?;
        p.add_straight_edge(Vector2::new(w, -h))?;
        p.add_straight_edge(Vector2::new(w, h))?;
        p.add_straight_edge(Vector2::new(-w, h))?;
        p.add_straight_edge(Vector2::new(-w, -h))?;
        p.close_path()?;
        p.finish()?;
        p.set_mass(Material::default().density * width * height)?;
        p.set_moment_per_mass((width * width + height * height) / 12.0)?;
        Ok(p)
    }

    /// Creates an immovable block, typically used for floors and walls
    pub fn make_wall(width: f64, height: f64, name: &str) -> Result<Polygon> {
        let mut p = Self::make_block(width, height, name)?;
        p.set_mass(f64::INFINITY)?;
        Ok(p)
    }

    /// Creates a disc of the given radius
    pub fn make_ball(radius: f64, name: &str) -> Result<Polygon> {
        if !(radius > 0.0) {
            return Err(PhysicsError::InvalidParameter(format!(
                "Ball {} needs a positive radius, got {}", name, radius
            )));
        }
        let mut p = Polygon::new(name);
        let start = Vector2::new(radius, 0.0);
        p.start_path(start)?;
        p.add_circular_edge(start, Vector2::zero(), false)?;
        p.close_path()?;
        p.finish()?;
        p.set_mass(Material::default().density * PI * radius * radius)?;
        p.set_moment_per_mass(radius * radius / 2.0)?;
        Ok(p)
    }

    /// Creates a regular polygon with `sides` corners on a circle of the given radius
    pub fn make_regular_polygon(sides: usize, radius: f64, name: &str) -> Result<Polygon> {
        if sides < 3 || !(radius > 0.0) {
            return Err(PhysicsError::InvalidParameter(format!(
                "Regular polygon {} needs at least 3 sides and a positive radius", name
            )));
        }
        let points: Vec<Vector2> = (0..sides)
            .map(|i| Vector2::from_angle(-PI / 2.0 + 2.0 * PI * i as f64 / sides as f64) * radius)
            .collect();
        Self::make_polygon(&points, name)
    }

    /// Creates a body with straight edges through `points`, closing back to the first point.
    ///
    /// Body coordinates are shifted so that the centroid of the outline is the origin.
    pub fn make_polygon(points: &[Vector2], name: &str) -> Result<Polygon> {
        if points.len() < 3 {
            return Err(PhysicsError::InvalidParameter(format!(
                "Polygon {} needs at least 3 points", name
            )));
        }
        let (area, centroid, moment_per_mass) = Self::mass_properties(points);
        if area.abs() < crate::math::EPSILON {
            return Err(PhysicsError::InvalidParameter(format!(
                "Polygon {} encloses no area", name
            )));
        }

        let mut p = Polygon::new(name);
        p.start_path(points[0] - centroid)?;
        for point in points.iter().skip(1) {
            p.add_straight_edge(*point - centroid)?;
        }
        p.add_straight_edge(points[0] - centroid)?;
        p.close_path()?;
        p.finish()?;
        p.set_mass(Material::default().density * area.abs())?;
        p.set_moment_per_mass(moment_per_mass)?;
        Ok(p)
    }

    /// Signed area, centroid and moment of inertia per unit mass about the centroid
    fn mass_properties(points: &[Vector2]) -> (f64, Vector2, f64) {
        let n = points.len();
        let mut area = 0.0;
        let mut c = Vector2::zero();
        let mut moment = 0.0;
        for i in 0..n {
            let a = points[i];
            let b = points[(i + 1) % n];
            let cross = a.cross(&b);
            area += 0.5 * cross;
            c += (a + b) * cross;
            moment += cross * (a.dot(&a) + a.dot(&b) + b.dot(&b));
        }
        if area.abs() < crate::math::EPSILON {
            return (area, Vector2::zero(), 0.0);
        }
        let centroid = c / (6.0 * area);
        let moment_per_mass = moment / (12.0 * area) - centroid.length_squared();
        (area, centroid, moment_per_mass)
    }
}
