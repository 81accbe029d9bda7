//! Which section meshes go stale after a voxel edit.
//!
//! A section's build reads its own voxels plus a [`HALO`]-wide margin, so an
//! edit near a boundary also affects the neighbours whose margin covers it.
//! Scheduling the rebuilds is left to the caller.

use tessera_voxel::{HALO, SECTION_SIZE, SectionPos};

fn axis_offsets(local: usize) -> impl Iterator<Item = i32> {
    let local = local as i32;
    let below = (local < HALO).then_some(-1);
    let above = (local >= SECTION_SIZE as i32 - HALO).then_some(1);
    [Some(0), below, above].into_iter().flatten()
}

/// Sections whose build input contains the voxel at `local` inside `pos`.
///
/// The edited section comes first. Face, edge, and corner neighbours are
/// included when the voxel lies within their halo.
pub fn affected_sections(pos: SectionPos, local: [usize; 3]) -> Vec<SectionPos> {
    let mut dirty = Vec::with_capacity(1);
    for dy in axis_offsets(local[1]) {
        for dx in axis_offsets(local[0]) {
            for dz in axis_offsets(local[2]) {
                dirty.push(SectionPos::new(
                    pos.chunk_x + dx,
                    pos.section_y + dy,
                    pos.chunk_z + dz,
                ));
            }
        }
    }
    dirty
}

/// [`affected_sections`] for a world-space voxel.
pub fn affected_by_world_edit(wx: i32, wy: i32, wz: i32) -> Vec<SectionPos> {
    let (pos, local) = SectionPos::containing(wx, wy, wz);
    affected_sections(pos, local)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> SectionPos {
        SectionPos::new(0, 0, 0)
    }

    #[test]
    fn test_interior_edit_only_dirties_self() {
        assert_eq!(affected_sections(origin(), [8, 8, 8]), vec![origin()]);
        assert_eq!(affected_sections(origin(), [2, 13, 2]), vec![origin()]);
    }

    #[test]
    fn test_edit_inside_halo_dirties_face_neighbor() {
        let dirty = affected_sections(origin(), [1, 8, 8]);
        assert_eq!(dirty, vec![origin(), SectionPos::new(-1, 0, 0)]);

        let dirty = affected_sections(origin(), [8, 14, 8]);
        assert_eq!(dirty, vec![origin(), SectionPos::new(0, 1, 0)]);
    }

    #[test]
    fn test_edge_edit_dirties_diagonal() {
        let dirty = affected_sections(origin(), [0, 8, 15]);
        assert_eq!(dirty.len(), 4);
        assert!(dirty.contains(&SectionPos::new(-1, 0, 1)));
        assert!(dirty.contains(&SectionPos::new(-1, 0, 0)));
        assert!(dirty.contains(&SectionPos::new(0, 0, 1)));
    }

    #[test]
    fn test_corner_edit_dirties_eight_sections() {
        let dirty = affected_sections(origin(), [15, 0, 1]);
        assert_eq!(dirty.len(), 8);
        assert_eq!(dirty[0], origin());
        assert!(dirty.contains(&SectionPos::new(1, -1, -1)));
    }

    #[test]
    fn test_world_edit_resolves_section() {
        let dirty = affected_by_world_edit(-1, 40, 8);
        assert_eq!(dirty[0], SectionPos::new(-1, 2, 0));
        assert!(dirty.contains(&SectionPos::new(0, 2, 0)));
        assert_eq!(dirty.len(), 2);
    }
}
