//! Per-item view state
//!
//! An item keeps the handles of the groups cached on its behalf, one per
//! layer it is drawn on. The handles belong to the engine the item's view
//! draws into; releasing the item deletes them there.

use std::ops::{BitOr, BitOrAssign};

use gal_core::{GroupContext, GroupId};
use smallvec::SmallVec;

use crate::layer::Layer;

/// What changed about an item since it was last cached
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UpdateFlags(u8);

impl UpdateFlags {
    pub const NONE: UpdateFlags = UpdateFlags(0);
    /// Colors or visibility
    pub const APPEARANCE: UpdateFlags = UpdateFlags(0x1);
    /// Shape or position
    pub const GEOMETRY: UpdateFlags = UpdateFlags(0x2);
    pub const ALL: UpdateFlags = UpdateFlags(0xff);

    pub fn contains(self, other: UpdateFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for UpdateFlags {
    type Output = UpdateFlags;

    fn bitor(self, rhs: UpdateFlags) -> UpdateFlags {
        UpdateFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for UpdateFlags {
    fn bitor_assign(&mut self, rhs: UpdateFlags) {
        self.0 |= rhs.0;
    }
}

#[derive(Debug, Clone)]
pub struct ViewItem {
    visible: bool,
    groups: SmallVec<[(Layer, GroupId); 4]>,
    pending: UpdateFlags,
}

impl Default for ViewItem {
    fn default() -> Self {
        Self {
            visible: true,
            groups: SmallVec::new(),
            pending: UpdateFlags::NONE,
        }
    }
}

impl ViewItem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        if self.visible != visible {
            self.visible = visible;
            self.pending |= UpdateFlags::APPEARANCE;
        }
    }

    /// Cached group for `layer`, if any
    pub fn group(&self, layer: Layer) -> Option<GroupId> {
        self.groups
            .iter()
            .find(|(l, _)| *l == layer)
            .map(|&(_, group)| group)
    }

    pub fn all_groups(&self) -> impl Iterator<Item = GroupId> + '_ {
        self.groups.iter().map(|&(_, group)| group)
    }

    /// Records the group cached for `layer`, replacing a previous one.
    ///
    /// Returns the replaced handle; the caller owns its deletion.
    pub fn set_group(&mut self, layer: Layer, group: GroupId) -> Option<GroupId> {
        match self.groups.iter_mut().find(|(l, _)| *l == layer) {
            Some(slot) => Some(std::mem::replace(&mut slot.1, group)),
            None => {
                self.groups.push((layer, group));
                None
            }
        }
    }

    pub fn stores_groups(&self) -> bool {
        !self.groups.is_empty()
    }

    /// Deletes every cached group from `ctx` and forgets the handles
    pub fn delete_groups<G>(&mut self, ctx: &mut G)
    where
        G: GroupContext + ?Sized,
    {
        for (layer, group) in self.groups.drain(..) {
            tracing::debug!(?layer, ?group, "dropping cached group");
            ctx.delete_group(group);
        }
    }

    /// Detaches the item from its view
    pub fn release<G>(&mut self, ctx: &mut G)
    where
        G: GroupContext + ?Sized,
    {
        self.delete_groups(ctx);
        self.pending = UpdateFlags::NONE;
    }

    /// Marks the item for re-tessellation at the next redraw
    pub fn mark_update(&mut self, flags: UpdateFlags) {
        self.pending |= flags;
    }

    pub fn pending_update(&self) -> UpdateFlags {
        self.pending
    }

    pub fn take_update(&mut self) -> UpdateFlags {
        std::mem::take(&mut self.pending)
    }
}
