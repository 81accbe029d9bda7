//! Per-voxel byte ranges in the translucent stream, and the back-to-front
//! ordering they enable at draw time.

use glam::Vec3;

/// One voxel's contribution to the translucent stream.
///
/// Coordinates are world space so a draw-time sort needs no section context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TranslucencyRecord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    /// Byte offset of the first vertex in the translucent stream.
    pub offset: usize,
    /// Number of bytes the voxel emitted.
    pub count: usize,
}

impl TranslucencyRecord {
    /// One past the last byte.
    pub fn end(&self) -> usize {
        self.offset + self.count
    }

    /// Centre of the voxel in world space.
    pub fn center(&self) -> Vec3 {
        Vec3::new(self.x as f32, self.y as f32, self.z as f32) + Vec3::splat(0.5)
    }
}

/// Collects translucency records in traversal order.
#[derive(Clone, Debug, Default)]
pub struct TranslucencyTracker {
    records: Vec<TranslucencyRecord>,
}

impl TranslucencyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the bytes `[start, end)` emitted by the voxel at world `pos`.
    /// Empty ranges are not recorded.
    pub fn record(&mut self, pos: [i32; 3], start: usize, end: usize) {
        if end <= start {
            return;
        }
        debug_assert!(
            self.records.last().is_none_or(|last| last.end() <= start),
            "translucent ranges must advance"
        );
        self.records.push(TranslucencyRecord {
            x: pos[0],
            y: pos[1],
            z: pos[2],
            offset: start,
            count: end - start,
        });
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[TranslucencyRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<TranslucencyRecord> {
        self.records
    }
}

/// Indices into `records`, farthest voxel from `eye` first.
///
/// Equal distances keep traversal order.
pub fn back_to_front(records: &[TranslucencyRecord], eye: Vec3) -> Vec<usize> {
    let mut order: Vec<usize> = (0..records.len()).collect();
    order.sort_by(|&a, &b| {
        let da = records[a].center().distance_squared(eye);
        let db = records[b].center().distance_squared(eye);
        db.total_cmp(&da)
    });
    order
}

/// Rebuilds the translucent stream with voxel ranges in back-to-front order.
///
/// Records whose range falls outside `bytes` are dropped.
pub fn sorted_stream(bytes: &[u8], records: &[TranslucencyRecord], eye: Vec3) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len());
    for index in back_to_front(records, eye) {
        let record = &records[index];
        match bytes.get(record.offset..record.end()) {
            Some(range) => out.extend_from_slice(range),
            None => tracing::warn!(
                x = record.x,
                y = record.y,
                z = record.z,
                "translucency record outside stream"
            ),
        }
    }
    out
}
