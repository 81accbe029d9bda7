//! Byte streams that section geometry is emitted into.

use crate::vertex::SectionVertex;

/// Which geometry stream a block renders into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Layer {
    Opaque,
    Translucent,
}

/// A growable byte buffer of encoded [`SectionVertex`] records.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GeometryStream {
    data: Vec<u8>,
    count: u32,
}

impl GeometryStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one vertex and returns the bytes it occupies.
    pub fn push(&mut self, vertex: &SectionVertex) -> usize {
        self.count += 1;
        vertex.write_to(&mut self.data)
    }

    /// Appends a quad as four consecutive vertices.
    pub fn push_quad(&mut self, quad: &[SectionVertex; 4]) -> usize {
        quad.iter().map(|v| self.push(v)).sum()
    }

    /// Current length in bytes; the offset the next vertex will start at.
    pub fn byte_len(&self) -> usize {
        self.data.len()
    }

    pub fn vertex_count(&self) -> u32 {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

/// The opaque and translucent streams of one build.
#[derive(Clone, Debug, Default)]
pub struct VertexEmitter {
    pub opaque: GeometryStream,
    pub translucent: GeometryStream,
}

impl VertexEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stream_mut(&mut self, layer: Layer) -> &mut GeometryStream {
        match layer {
            Layer::Opaque => &mut self.opaque,
            Layer::Translucent => &mut self.translucent,
        }
    }

    /// Appends a vertex to the stream for `layer`, returning its footprint.
    pub fn emit(&mut self, layer: Layer, vertex: &SectionVertex) -> usize {
        self.stream_mut(layer).push(vertex)
    }

    pub fn total_bytes(&self) -> usize {
        self.opaque.byte_len() + self.translucent.byte_len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vertex::VERTEX_SIZE;

    #[test]
    fn test_empty_stream() {
        let stream = GeometryStream::new();
        assert!(stream.is_empty());
        assert_eq!(stream.byte_len(), 0);
        assert_eq!(stream.vertex_count(), 0);
    }

    #[test]
    fn test_push_advances_offset_and_count() {
        let mut stream = GeometryStream::new();
        let written = stream.push(&SectionVertex::default());
        assert_eq!(written, VERTEX_SIZE);
        assert_eq!(stream.byte_len(), VERTEX_SIZE);
        assert_eq!(stream.vertex_count(), 1);
    }

    #[test]
    fn test_push_quad() {
        let mut stream = GeometryStream::new();
        let written = stream.push_quad(&[SectionVertex::default(); 4]);
        assert_eq!(written, 4 * VERTEX_SIZE);
        assert_eq!(stream.vertex_count(), 4);
    }

    #[test]
    fn test_emit_routes_by_layer() {
        let mut emitter = VertexEmitter::new();
        emitter.emit(Layer::Opaque, &SectionVertex::default());
        emitter.emit(Layer::Translucent, &SectionVertex::default());
        emitter.emit(Layer::Translucent, &SectionVertex::default());
        assert_eq!(emitter.opaque.vertex_count(), 1);
        assert_eq!(emitter.translucent.vertex_count(), 2);
        assert_eq!(emitter.total_bytes(), 3 * VERTEX_SIZE);
    }
}
