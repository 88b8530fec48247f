//! Reference geometry built on [`VertexLayout`].

use std::sync::Arc;

use glam::{Vec2, Vec3};

use crate::abs::{
    AttributeChannel, ChannelSet, GraphicsContext, MeshError, Piece, PrimitiveTopology,
    VertexLayout,
};

/// Name of the single piece in a cuboid layout.
pub const CUBOID_PIECE: &str = "cuboid";

/// Texture coordinate sets written by [`make_cuboid_with`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CuboidUvs {
    /// `TexCoord0` spans 0..1 on every face.
    #[default]
    Unit,
    /// Adds `TexCoord1`, the unit coordinates scaled by the face's size.
    UnitAndScaled,
}

impl CuboidUvs {
    pub fn channels(self) -> ChannelSet {
        let base = ChannelSet::new(&[
            AttributeChannel::Position,
            AttributeChannel::Normal,
            AttributeChannel::TexCoord0,
        ]);
        match self {
            CuboidUvs::Unit => base,
            CuboidUvs::UnitAndScaled => base.with(AttributeChannel::TexCoord1),
        }
    }
}

/// Corner texture coordinates, shared by all faces.
const FACE_UVS: [Vec2; 4] = [
    Vec2::new(0.0, 0.0),
    Vec2::new(1.0, 0.0),
    Vec2::new(1.0, 1.0),
    Vec2::new(0.0, 1.0),
];

/// Face normal, then the axes the face's s and t coordinates run along.
/// Corners are `-s-t, +s-t, +s+t, -s+t` from the face centre.
const FACES: [(Vec3, Vec3, Vec3); 6] = [
    (Vec3::NEG_Y, Vec3::X, Vec3::Z),     // front
    (Vec3::X, Vec3::Y, Vec3::Z),         // right
    (Vec3::Y, Vec3::NEG_X, Vec3::Z),     // back
    (Vec3::NEG_X, Vec3::NEG_Y, Vec3::Z), // left
    (Vec3::Z, Vec3::X, Vec3::Y),         // top
    (Vec3::NEG_Z, Vec3::X, Vec3::NEG_Y), // bottom
];

/// Interleaved vertex data for a cuboid centred on the origin, 4 vertices
/// per face with flat normals, in the channel order of `uvs.channels()`.
pub fn cuboid_vertex_data(dx: f32, dy: f32, dz: f32, uvs: CuboidUvs) -> Vec<f32> {
    let half = Vec3::new(dx, dy, dz);
    let mut data = Vec::with_capacity(24 * uvs.channels().floats_per_vertex());

    for (normal, s_axis, t_axis) in FACES {
        let centre = normal * half;
        let s = s_axis * half;
        let t = t_axis * half;
        let size = Vec2::new(s_axis.abs().dot(half), t_axis.abs().dot(half)) * 2.0;
        let corners = [centre - s - t, centre + s - t, centre + s + t, centre - s + t];

        for (corner, uv) in corners.into_iter().zip(FACE_UVS) {
            data.extend_from_slice(&corner.to_array());
            data.extend_from_slice(&normal.to_array());
            data.extend_from_slice(&uv.to_array());
            if uvs == CuboidUvs::UnitAndScaled {
                data.extend_from_slice(&(uv * size).to_array());
            }
        }
    }

    data
}

/// Makes a cuboid with a single quad-list piece called [`CUBOID_PIECE`],
/// centred on the origin, `2 * dx` wide, `2 * dy` deep and `2 * dz` high.
pub fn make_cuboid<G: GraphicsContext>(
    gl: &Arc<G>,
    dx: f32,
    dy: f32,
    dz: f32,
) -> Result<VertexLayout<G>, MeshError> {
    make_cuboid_with(gl, dx, dy, dz, CuboidUvs::Unit)
}

/// Like [`make_cuboid`], with a choice of texture coordinate sets.
pub fn make_cuboid_with<G: GraphicsContext>(
    gl: &Arc<G>,
    dx: f32,
    dy: f32,
    dz: f32,
    uvs: CuboidUvs,
) -> Result<VertexLayout<G>, MeshError> {
    let data = cuboid_vertex_data(dx, dy, dz, uvs);
    let indices: Vec<u16> = (0..24).collect();
    let piece = Piece::new(gl, &indices, PrimitiveTopology::Quads)?;
    VertexLayout::new(gl, &data, uvs.channels(), [(CUBOID_PIECE, piece)])
}
