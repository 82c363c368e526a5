use crate::{
    intersection::{GeoPoint, Intersect},
    Ray,
};

/// A composite of intersectable objects, itself intersectable,
/// so groups can be nested.
#[derive(Debug, Default)]
pub struct Geometries {
    items: Vec<Box<dyn Intersect>>,
}

impl Geometries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, item: impl Intersect + 'static) {
        self.items.push(Box::new(item));
    }

    pub fn add_boxed(&mut self, item: Box<dyn Intersect>) {
        self.items.push(item);
    }

    pub fn with(mut self, item: impl Intersect + 'static) -> Self {
        self.add(item);
        self
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Intersect for Geometries {
    /// All hits of all members, in member order.
    fn intersect(&self, ray: &Ray) -> Vec<GeoPoint<'_>> {
        let mut xs = vec![];
        for item in &self.items {
            let mut hits = item.intersect(ray);
            xs.append(&mut hits);
        }
        xs
    }
}
