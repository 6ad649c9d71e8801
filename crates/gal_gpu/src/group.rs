//! Cached groups and the per-frame draw list

use std::ops::Range;

use gal_core::{Color, GalError, GroupId};
use slotmap::SlotMap;

use crate::mesh::Mesh;

/// Tessellated groups keyed by generational handles.
///
/// While a group is open every primitive is tessellated into it instead of
/// the frame. Deleted handles are queued so the renderer can drop the GPU
/// buffers it uploaded for them.
#[derive(Debug, Default)]
pub struct GroupCache {
    groups: SlotMap<GroupId, Mesh>,
    open: Option<GroupId>,
    released: Vec<GroupId>,
}

impl GroupCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self) -> Result<GroupId, GalError> {
        if let Some(open) = self.open {
            tracing::warn!(?open, "begin_group while another group is recording");
            return Err(GalError::GroupAlreadyOpen);
        }
        let id = self.groups.insert(Mesh::new());
        self.open = Some(id);
        tracing::debug!(?id, "group opened");
        Ok(id)
    }

    pub fn end(&mut self) -> Result<GroupId, GalError> {
        let id = self.open.take().ok_or(GalError::NoOpenGroup)?;
        tracing::debug!(
            ?id,
            triangles = self.groups.get(id).map_or(0, Mesh::triangle_count),
            "group closed"
        );
        Ok(id)
    }

    pub fn is_recording(&self) -> bool {
        self.open.is_some()
    }

    /// Handle of the group being recorded
    pub fn open_group(&self) -> Option<GroupId> {
        self.open
    }

    /// Mesh of the group being recorded
    pub fn open_mesh_mut(&mut self) -> Option<&mut Mesh> {
        self.open.and_then(|id| self.groups.get_mut(id))
    }

    pub fn get(&self, id: GroupId) -> Option<&Mesh> {
        self.groups.get(id)
    }

    pub fn contains(&self, id: GroupId) -> bool {
        self.groups.contains_key(id)
    }

    pub fn remove(&mut self, id: GroupId) -> bool {
        if self.open == Some(id) {
            self.open = None;
        }
        let removed = self.groups.remove(id).is_some();
        if removed {
            tracing::debug!(?id, "group deleted");
            self.released.push(id);
        }
        removed
    }

    /// Drops every group
    pub fn clear(&mut self) {
        self.released.extend(self.groups.keys());
        self.groups.clear();
        self.open = None;
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Handles deleted since the last call
    pub fn take_released(&mut self) -> Vec<GroupId> {
        std::mem::take(&mut self.released)
    }

    pub fn iter(&self) -> impl Iterator<Item = (GroupId, &Mesh)> + '_ {
        self.groups.iter()
    }

    /// Ended groups; a group still recording may keep growing
    pub fn sealed(&self) -> impl Iterator<Item = (GroupId, &Mesh)> + '_ {
        let open = self.open;
        self.groups.iter().filter(move |(id, _)| Some(*id) != open)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCall {
    /// Clear color and depth
    Clear(Color),
    /// Triangles of the frame mesh
    Immediate(Range<u32>),
    /// A cached group, drawn from its own buffers
    Group(GroupId),
}

/// Everything drawn between `begin_drawing` and `end_drawing`
#[derive(Clone, Debug, Default)]
pub struct FrameBatch {
    pub mesh: Mesh,
    pub calls: Vec<DrawCall>,
}

impl FrameBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.mesh.clear();
        self.calls.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Records frame-mesh indices, merging with a directly preceding range
    pub fn push_immediate(&mut self, range: Range<u32>) {
        if range.is_empty() {
            return;
        }
        if let Some(DrawCall::Immediate(last)) = self.calls.last_mut() {
            if last.end == range.start {
                last.end = range.end;
                return;
            }
        }
        self.calls.push(DrawCall::Immediate(range));
    }

    pub fn push_group(&mut self, id: GroupId) {
        self.calls.push(DrawCall::Group(id));
    }

    pub fn push_clear(&mut self, color: Color) {
        self.calls.push(DrawCall::Clear(color));
    }

    /// Flattens the draw list into one mesh in submission order.
    ///
    /// Handles missing from `groups` are skipped.
    pub fn resolve(&self, groups: &GroupCache) -> Mesh {
        let mut mesh = Mesh::new();
        for call in &self.calls {
            match call {
                DrawCall::Clear(_) => mesh.clear(),
                DrawCall::Immediate(range) => mesh.append_range(&self.mesh, range.clone()),
                DrawCall::Group(id) => {
                    if let Some(group) = groups.get(*id) {
                        mesh.append(group);
                    }
                }
            }
        }
        mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_begin_is_rejected() {
        let mut cache = GroupCache::new();
        let id = cache.begin().unwrap();
        assert_eq!(cache.begin(), Err(GalError::GroupAlreadyOpen));
        assert_eq!(cache.end(), Ok(id));
        assert_eq!(cache.end(), Err(GalError::NoOpenGroup));
    }

    #[test]
    fn test_removed_handle_is_stale() {
        let mut cache = GroupCache::new();
        let id = cache.begin().unwrap();
        cache.end().unwrap();
        assert!(cache.remove(id));
        assert!(!cache.remove(id));
        assert_eq!(cache.take_released(), vec![id]);

        let newer = cache.begin().unwrap();
        assert_ne!(id, newer);
        assert!(!cache.contains(id));
    }

    #[test]
    fn test_recording_group_is_not_sealed() {
        let mut cache = GroupCache::new();
        let done = cache.begin().unwrap();
        cache.end().unwrap();
        let open = cache.begin().unwrap();

        assert_eq!(cache.open_group(), Some(open));
        let sealed: Vec<GroupId> = cache.sealed().map(|(id, _)| id).collect();
        assert_eq!(sealed, vec![done]);

        cache.end().unwrap();
        assert_eq!(cache.open_group(), None);
        assert_eq!(cache.sealed().count(), 2);
    }

    #[test]
    fn test_immediate_ranges_merge() {
        let mut frame = FrameBatch::new();
        frame.push_immediate(0..6);
        frame.push_immediate(6..12);
        frame.push_immediate(12..12);
        assert_eq!(frame.calls, vec![DrawCall::Immediate(0..12)]);
    }
}
