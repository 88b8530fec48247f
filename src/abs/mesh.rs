//! Mesh management module.
//!
//! This module defines [`VertexLayout`], which owns one interleaved attribute
//! buffer on the GPU side, and [`Piece`], an indexed subset of that buffer.
//! Each layout owns a vertex array object holding its attribute state. It
//! binds that state once per [`draw`](VertexLayout::draw) and then lets each
//! requested piece issue its own draw call.

use std::sync::Arc;

use indexmap::IndexMap;

use super::{AttributeChannel, ChannelSet, GraphicsContext, MeshError};
use crate::config::AttributeBindings;

/// How a piece's indices are assembled into primitives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PrimitiveTopology {
    Points,
    Lines,
    LineStrip,
    LineLoop,
    Triangles,
    TriangleStrip,
    TriangleFan,
    /// Compatibility profile only.
    Quads,
}

/// Fails with the first index that does not address one of `vertex_count` vertices.
fn check_indices(indices: &[u16], vertex_count: usize) -> Result<(), MeshError> {
    match indices.iter().find(|&&index| index as usize >= vertex_count) {
        Some(&index) => Err(MeshError::IndexOutOfRange {
            index,
            vertex_count,
        }),
        None => Ok(()),
    }
}

/// An index buffer plus a primitive topology.
///
/// A piece has no vertex data of its own. It is only meaningful when drawn by
/// the [`VertexLayout`] it was added to.
pub struct Piece<G: GraphicsContext = glow::Context> {
    gl: Arc<G>,
    primitive: PrimitiveTopology,
    ibo: G::Buffer,
    index_count: usize,
    max_index: Option<u16>,
}

impl<G: GraphicsContext> Piece<G> {
    /// Uploads `indices` to a new index buffer.
    ///
    /// Indices are checked against the layout's vertex count when the piece is
    /// attached. Use [`Piece::with_vertex_count`] to check them up front.
    pub fn new(
        gl: &Arc<G>,
        indices: &[u16],
        primitive: PrimitiveTopology,
    ) -> Result<Self, MeshError> {
        let ibo = gl.create_buffer().map_err(MeshError::Backend)?;
        gl.upload_index_data(ibo, indices);
        log::trace!("uploaded {} indices ({primitive:?})", indices.len());

        Ok(Self {
            gl: Arc::clone(gl),
            primitive,
            ibo,
            index_count: indices.len(),
            max_index: indices.iter().copied().max(),
        })
    }

    /// Like [`Piece::new`], but fails before allocating anything if an index
    /// is not below `vertex_count`.
    pub fn with_vertex_count(
        gl: &Arc<G>,
        indices: &[u16],
        primitive: PrimitiveTopology,
        vertex_count: usize,
    ) -> Result<Self, MeshError> {
        check_indices(indices, vertex_count)?;
        Self::new(gl, indices, primitive)
    }

    /// Draws the piece.
    ///
    /// Only makes sense inside [`VertexLayout::draw`], where the attribute
    /// buffer and channel pointers have been bound.
    pub fn draw(&self) {
        self.gl
            .draw_indexed(self.ibo, self.primitive, self.index_count as i32);
    }

    pub fn primitive(&self) -> PrimitiveTopology {
        self.primitive
    }

    pub fn index_count(&self) -> usize {
        self.index_count
    }

    /// The largest index, or `None` for an empty piece.
    pub fn max_index(&self) -> Option<u16> {
        self.max_index
    }

    fn fits(&self, vertex_count: usize) -> Result<(), MeshError> {
        match self.max_index {
            Some(index) if index as usize >= vertex_count => Err(MeshError::IndexOutOfRange {
                index,
                vertex_count,
            }),
            _ => Ok(()),
        }
    }
}

impl<G: GraphicsContext> Drop for Piece<G> {
    fn drop(&mut self) {
        self.gl.delete_buffer(self.ibo);
    }
}

/// An interleaved attribute buffer stored on the GPU side, with named pieces.
pub struct VertexLayout<G: GraphicsContext = glow::Context> {
    gl: Arc<G>,
    vao: G::VertexArray,
    vbo: G::Buffer,
    channels: ChannelSet,
    bindings: AttributeBindings,
    vertex_count: usize,
    pieces: IndexMap<String, Piece<G>>,
}

impl<G: GraphicsContext> VertexLayout<G> {
    /// Creates a layout from flat vertex data holding the given channels.
    ///
    /// Each vertex record carries the channels in canonical order (see
    /// [`AttributeChannel::ALL`]). Fails if the data does not divide into
    /// whole records, or if an initial piece indexes past the last vertex.
    pub fn new<N: Into<String>>(
        gl: &Arc<G>,
        vertex_data: &[f32],
        channels: ChannelSet,
        pieces: impl IntoIterator<Item = (N, Piece<G>)>,
    ) -> Result<Self, MeshError> {
        let floats_per_vertex = channels.floats_per_vertex();
        if floats_per_vertex == 0 || vertex_data.len() % floats_per_vertex != 0 {
            return Err(MeshError::MalformedVertexData {
                len: vertex_data.len(),
                floats_per_vertex,
            });
        }
        let vertex_count = vertex_data.len() / floats_per_vertex;

        let mut map = IndexMap::new();
        for (name, piece) in pieces {
            piece.fits(vertex_count)?;
            map.insert(name.into(), piece);
        }

        let vao = gl.create_vertex_array().map_err(MeshError::Backend)?;
        let vbo = match gl.create_buffer() {
            Ok(vbo) => vbo,
            Err(e) => {
                gl.delete_vertex_array(vao);
                return Err(MeshError::Backend(e));
            }
        };
        gl.upload_vertex_data(vbo, vertex_data);
        gl.bind_array_buffer(None);
        log::debug!(
            "uploaded {vertex_count} vertices of {channels:?} ({} bytes)",
            size_of_val(vertex_data)
        );

        Ok(Self {
            gl: Arc::clone(gl),
            vao,
            vbo,
            channels,
            bindings: AttributeBindings::default(),
            vertex_count,
            pieces: map,
        })
    }

    /// Adds a piece, replacing and releasing any piece with the same name.
    pub fn add_piece(&mut self, name: impl Into<String>, piece: Piece<G>) -> Result<(), MeshError> {
        piece.fits(self.vertex_count)?;
        let name = name.into();
        if let Some(old) = self.pieces.insert(name.clone(), piece) {
            log::trace!("replaced piece {name:?}");
            drop(old);
        }
        Ok(())
    }

    /// Detaches a piece and hands it back to the caller.
    pub fn remove_piece(&mut self, name: &str) -> Option<Piece<G>> {
        self.pieces.shift_remove(name)
    }

    pub fn piece(&self, name: &str) -> Option<&Piece<G>> {
        self.pieces.get(name)
    }

    /// Piece names in insertion order, which is also the order of [`draw(None)`](Self::draw).
    pub fn piece_names(&self) -> impl Iterator<Item = &str> {
        self.pieces.keys().map(String::as_str)
    }

    pub fn channels(&self) -> ChannelSet {
        self.channels
    }

    /// Bytes per vertex record.
    pub fn stride(&self) -> usize {
        self.channels.stride()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn bindings(&self) -> &AttributeBindings {
        &self.bindings
    }

    /// Changes the attribute locations channels are fed through on the next draw.
    ///
    /// [`AttributeBindings`] can only hold distinct locations, so every
    /// channel keeps a slot of its own.
    pub fn set_bindings(&mut self, bindings: AttributeBindings) {
        self.bindings = bindings;
    }

    /// Draws the named pieces in the given order, or every piece if `pieces`
    /// is `None`. Unknown names are skipped.
    ///
    /// Binds the layout's vertex array and attribute buffer, enables the
    /// channels this layout carries and disables the others, then issues one
    /// draw call per piece. Nothing is bound when no piece is selected. Both
    /// bindings are cleared afterwards. Enabled attributes stay recorded in the
    /// vertex array.
    pub fn draw(&self, pieces: Option<&[&str]>) {
        let to_draw: Vec<&Piece<G>> = match pieces {
            None => self.pieces.values().collect(),
            Some(names) => names
                .iter()
                .filter_map(|name| self.pieces.get(*name))
                .collect(),
        };
        if to_draw.is_empty() {
            return;
        }

        self.bind_attributes();
        for piece in to_draw {
            piece.draw();
        }
        self.gl.bind_vertex_array(None);
        self.gl.bind_array_buffer(None);
    }

    fn bind_attributes(&self) {
        let stride = self.stride() as i32;
        self.gl.bind_vertex_array(Some(self.vao));
        self.gl.bind_array_buffer(Some(self.vbo));
        for channel in AttributeChannel::ALL {
            let location = self.bindings.location(channel);
            match self.channels.offset_of(channel) {
                Some(offset) => self.gl.enable_float_attribute(
                    location,
                    channel.components() as i32,
                    stride,
                    offset as i32,
                ),
                None => self.gl.disable_attribute(location),
            }
        }
    }
}

impl<G: GraphicsContext> Drop for VertexLayout<G> {
    fn drop(&mut self) {
        self.gl.delete_vertex_array(self.vao);
        self.pieces.clear();
        self.gl.delete_buffer(self.vbo);
    }
}
