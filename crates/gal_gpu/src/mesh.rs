//! Triangle meshes produced by tessellation

use gal_core::{Color, Point};

/// A vertex in screen space; `z` carries the normalized depth
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl Vertex {
    pub fn new(point: Point, depth: f32, color: Color) -> Self {
        let [x, y] = point.to_f32();
        Self {
            position: [x, y, depth],
            color: color.to_array(),
        }
    }

    pub fn depth(&self) -> f32 {
        self.position[2]
    }

    pub fn point(&self) -> Point {
        Point::new(self.position[0] as f64, self.position[1] as f64)
    }

    pub const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x4];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Indexed triangle list
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.indices.is_empty()
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    fn push_vertex(&mut self, point: Point, depth: f32, color: Color) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(Vertex::new(point, depth, color));
        index
    }

    pub fn push_triangle(&mut self, a: Point, b: Point, c: Point, depth: f32, color: Color) {
        let ia = self.push_vertex(a, depth, color);
        let ib = self.push_vertex(b, depth, color);
        let ic = self.push_vertex(c, depth, color);
        self.indices.extend_from_slice(&[ia, ib, ic]);
    }

    /// Quad `a b c d` in winding order
    pub fn push_quad(&mut self, a: Point, b: Point, c: Point, d: Point, depth: f32, color: Color) {
        let ia = self.push_vertex(a, depth, color);
        let ib = self.push_vertex(b, depth, color);
        let ic = self.push_vertex(c, depth, color);
        let id = self.push_vertex(d, depth, color);
        self.indices.extend_from_slice(&[ia, ib, ic, ia, ic, id]);
    }

    /// Triangle fan around `center` through consecutive `rim` points
    pub fn push_fan(&mut self, center: Point, rim: &[Point], depth: f32, color: Color) {
        if rim.len() < 2 {
            return;
        }
        let ic = self.push_vertex(center, depth, color);
        let first = self.vertices.len() as u32;
        for p in rim {
            self.push_vertex(*p, depth, color);
        }
        for i in 0..rim.len() as u32 - 1 {
            self.indices.extend_from_slice(&[ic, first + i, first + i + 1]);
        }
    }

    /// Band between two polylines of equal length
    pub fn push_strip(&mut self, inner: &[Point], outer: &[Point], depth: f32, color: Color) {
        let count = inner.len().min(outer.len());
        if count < 2 {
            return;
        }
        let first = self.vertices.len() as u32;
        for i in 0..count {
            self.push_vertex(inner[i], depth, color);
            self.push_vertex(outer[i], depth, color);
        }
        for i in 0..count as u32 - 1 {
            let a = first + 2 * i;
            self.indices
                .extend_from_slice(&[a, a + 1, a + 3, a, a + 3, a + 2]);
        }
    }

    /// Appends another mesh, rebasing its indices
    pub fn append(&mut self, other: &Mesh) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.indices.extend(other.indices.iter().map(|i| i + base));
    }

    /// Appends only the triangles referenced by `indices` of `other`, with
    /// the span of vertices they use
    pub fn append_range(&mut self, other: &Mesh, indices: std::ops::Range<u32>) {
        let range = indices.start as usize..indices.end as usize;
        let Some(referenced) = other.indices.get(range) else {
            return;
        };
        let (Some(&lo), Some(&hi)) = (referenced.iter().min(), referenced.iter().max()) else {
            return;
        };
        let Some(span) = other.vertices.get(lo as usize..=hi as usize) else {
            return;
        };

        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(span);
        self.indices.extend(referenced.iter().map(|i| i - lo + base));
    }

    /// Triangles as screen-space point triples
    pub fn triangles(&self) -> impl Iterator<Item = [Point; 3]> + '_ {
        self.indices.chunks_exact(3).map(|tri| {
            [
                self.vertices[tri[0] as usize].point(),
                self.vertices[tri[1] as usize].point(),
                self.vertices[tri[2] as usize].point(),
            ]
        })
    }

    /// Sum of the absolute triangle areas
    pub fn area(&self) -> f64 {
        self.triangles()
            .map(|[a, b, c]| ((b - a).cross(c - a) * 0.5).abs())
            .sum()
    }

    /// Axis-aligned bounds of the referenced vertices
    pub fn bounds(&self) -> Option<gal_core::Box2D> {
        gal_core::Box2D::compute(self.indices.iter().map(|i| self.vertices[*i as usize].point()))
    }

    /// Whether `point` lies inside any triangle
    pub fn covers(&self, point: Point) -> bool {
        const EPS: f64 = 1e-6;
        self.triangles().any(|[a, b, c]| {
            let d1 = (b - a).cross(point - a);
            let d2 = (c - b).cross(point - b);
            let d3 = (a - c).cross(point - c);
            let has_neg = d1 < -EPS || d2 < -EPS || d3 < -EPS;
            let has_pos = d1 > EPS || d2 > EPS || d3 > EPS;
            !(has_neg && has_pos)
        })
    }
}
