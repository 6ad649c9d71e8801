//! Polygon fill tessellation using lyon
//!
//! Contours may overlap or nest; the fill rule decides which regions are
//! inside, so holes are plain contours inside an outline.

use gal_core::{Color, FillRule, Point};
use lyon::lyon_tessellation::{
    BuffersBuilder, FillOptions, FillTessellator, FillVertex, VertexBuffers,
};
use lyon::math::point;
use lyon::path::Path;

use crate::mesh::{Mesh, Vertex};

/// Flattening tolerance in pixels; contours are already polygons
const FILL_TOLERANCE: f32 = 0.1;

fn to_lyon_rule(rule: FillRule) -> lyon::lyon_tessellation::FillRule {
    match rule {
        FillRule::NonZero => lyon::lyon_tessellation::FillRule::NonZero,
        FillRule::EvenOdd => lyon::lyon_tessellation::FillRule::EvenOdd,
    }
}

/// Fills screen-space contours into `out`.
///
/// Returns false (and leaves `out` untouched) when lyon rejects the input.
pub fn fill_contours(
    contours: &[Vec<Point>],
    rule: FillRule,
    depth: f32,
    color: Color,
    out: &mut Mesh,
) -> bool {
    let mut builder = Path::builder();
    for contour in contours {
        let mut points = contour.iter();
        let Some(first) = points.next() else {
            continue;
        };
        builder.begin(point(first.x as f32, first.y as f32));
        for p in points {
            builder.line_to(point(p.x as f32, p.y as f32));
        }
        builder.end(true);
    }
    let path = builder.build();

    let rgba = color.to_array();
    let options = FillOptions::tolerance(FILL_TOLERANCE).with_fill_rule(to_lyon_rule(rule));
    let mut geometry: VertexBuffers<Vertex, u32> = VertexBuffers::new();
    let mut tessellator = FillTessellator::new();

    let result = tessellator.tessellate_path(
        &path,
        &options,
        &mut BuffersBuilder::new(&mut geometry, |vertex: FillVertex| {
            let p = vertex.position();
            Vertex {
                position: [p.x, p.y, depth],
                color: rgba,
            }
        }),
    );

    if let Err(err) = result {
        tracing::warn!("Polygon fill tessellation failed: {:?}", err);
        return false;
    }

    out.append(&Mesh {
        vertices: geometry.vertices,
        indices: geometry.indices,
    });
    true
}
