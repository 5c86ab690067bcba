use crate::math::Vector2;

/// A point on the boundary of a polygon, in body coordinates.
///
/// End point vertices join two edges (or start and end them). Decorated vertices are extra
/// points sampled along a curved edge so that curve-against-curve contacts can be found with
/// the ordinary corner test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// Location in body coordinates
    loc_body: Vector2,

    /// Whether this vertex bounds an edge
    end_point: bool,

    /// Edge arriving at this vertex
    edge1: Option<usize>,

    /// Edge leaving this vertex
    edge2: Option<usize>,
}

impl Vertex {
    /// Creates a vertex at the given body location
    pub fn new(loc_body: Vector2, end_point: bool) -> Self {
        Self {
            loc_body,
            end_point,
            edge1: None,
            edge2: None,
        }
    }

    /// Creates a decorated vertex lying in the middle of `edge`
    pub fn decorated(loc_body: Vector2, edge: usize) -> Self {
        Self {
            loc_body,
            end_point: false,
            edge1: Some(edge),
            edge2: Some(edge),
        }
    }

    /// Returns the location in body coordinates
    pub fn loc_body(&self) -> Vector2 {
        self.loc_body
    }

    /// Returns true if this vertex bounds an edge
    pub fn is_end_point(&self) -> bool {
        self.end_point
    }

    /// Returns the edge arriving at this vertex
    pub fn get_edge1(&self) -> Option<usize> {
        self.edge1
    }

    /// Returns the edge leaving this vertex
    pub fn get_edge2(&self) -> Option<usize> {
        self.edge2
    }

    pub(crate) fn set_edge1(&mut self, edge: usize) {
        self.edge1 = Some(edge);
    }

    pub(crate) fn set_edge2(&mut self, edge: usize) {
        self.edge2 = Some(edge);
    }

    /// Returns true if `edge` starts or ends at this vertex
    pub fn touches_edge(&self, edge: usize) -> bool {
        self.edge1 == Some(edge) || self.edge2 == Some(edge)
    }
}
