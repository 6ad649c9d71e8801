//! A set of items drawn layer by layer through cached groups
//!
//! Each (item, layer) pair is tessellated once into a group and replayed on
//! later redraws until the item is updated or removed. Groups hold geometry
//! already mapped through the current matrix, so a zoom, pan or resize
//! rebuilds them.

use std::collections::BTreeSet;

use gal_core::{Box2D, DrawContext, GalError, GroupContext, Matrix3x3};
use slotmap::SlotMap;
use smallvec::SmallVec;

use crate::item::{UpdateFlags, ViewItem};
use crate::layer::{Layer, LAYER_SLOTS};

slotmap::new_key_type! {
    pub struct ItemId;
}

/// A domain object a [`View`] can hold
pub trait Viewable {
    /// Layers the object is drawn on
    fn view_layers(&self) -> SmallVec<[Layer; 4]>;

    /// World-space bounds, used to skip items outside the visible area
    fn view_bbox(&self) -> Box2D;
}

/// Draws one layer of an item
pub trait ItemPainter<T> {
    /// Returns whether anything was drawn
    fn draw<C>(&mut self, ctx: &mut C, item: &T, layer: Layer) -> Result<bool, GalError>
    where
        C: DrawContext + ?Sized;
}

/// Work done by one [`View::redraw`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RedrawStats {
    /// Groups tessellated during this redraw
    pub cached: usize,
    /// Groups replayed from the cache
    pub replayed: usize,
}

struct Entry<T> {
    item: T,
    state: ViewItem,
}

pub struct View<T> {
    items: SlotMap<ItemId, Entry<T>>,
    layer_order: Vec<Layer>,
    /// Matrix the cached groups were tessellated under
    baked_matrix: Option<Matrix3x3>,
}

impl<T> Default for View<T> {
    fn default() -> Self {
        Self {
            items: SlotMap::with_key(),
            layer_order: Vec::new(),
            baked_matrix: None,
        }
    }
}

impl<T: Viewable> View<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Explicit back-to-front layer order. Layers left out are not drawn;
    /// an empty order draws every used layer in [`Layer`] order.
    ///
    /// Changing the order moves layers to new depths, so every item is
    /// re-tessellated at the next redraw.
    pub fn set_layer_order(&mut self, order: Vec<Layer>) {
        if order == self.layer_order {
            return;
        }
        self.layer_order = order;
        for entry in self.items.values_mut() {
            entry.state.mark_update(UpdateFlags::ALL);
        }
    }

    pub fn layer_order(&self) -> Vec<Layer> {
        if !self.layer_order.is_empty() {
            return self.layer_order.clone();
        }

        self.items
            .values()
            .flat_map(|entry| entry.item.view_layers())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn add(&mut self, item: T) -> ItemId {
        self.items.insert(Entry {
            item,
            state: ViewItem::new(),
        })
    }

    /// Takes the item out of the view, deleting its groups from `ctx`
    pub fn remove<G>(&mut self, id: ItemId, ctx: &mut G) -> Option<T>
    where
        G: GroupContext + ?Sized,
    {
        let mut entry = self.items.remove(id)?;
        entry.state.release(ctx);
        Some(entry.item)
    }

    /// Removes every item
    pub fn clear<G>(&mut self, ctx: &mut G)
    where
        G: GroupContext + ?Sized,
    {
        for (_, mut entry) in self.items.drain() {
            entry.state.release(ctx);
        }
        self.baked_matrix = None;
    }

    pub fn get(&self, id: ItemId) -> Option<&T> {
        self.items.get(id).map(|entry| &entry.item)
    }

    /// Mutable access; the item is re-tessellated at the next redraw
    pub fn get_mut(&mut self, id: ItemId) -> Option<&mut T> {
        self.items.get_mut(id).map(|entry| {
            entry.state.mark_update(UpdateFlags::ALL);
            &mut entry.item
        })
    }

    pub fn state(&self, id: ItemId) -> Option<&ViewItem> {
        self.items.get(id).map(|entry| &entry.state)
    }

    pub fn update(&mut self, id: ItemId, flags: UpdateFlags) -> bool {
        match self.items.get_mut(id) {
            Some(entry) => {
                entry.state.mark_update(flags);
                true
            }
            None => false,
        }
    }

    pub fn set_visible(&mut self, id: ItemId, visible: bool) -> bool {
        match self.items.get_mut(id) {
            Some(entry) => {
                entry.state.set_visible(visible);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ItemId, &T)> + '_ {
        self.items.iter().map(|(id, entry)| (id, &entry.item))
    }

    /// Depth of `layer`, lower is in front.
    ///
    /// With an explicit order the last listed layer lands on 0. Otherwise
    /// the depth follows [`Layer::slot`], so a layer keeps its depth when
    /// other layers come and go.
    fn layer_depth(&self, layer: Layer, index: usize, count: usize) -> f64 {
        if self.layer_order.is_empty() {
            (LAYER_SLOTS - 1 - layer.slot()) as f64
        } else {
            (count - 1 - index) as f64
        }
    }

    /// Draws every visible item, layer by layer.
    ///
    /// Items with pending updates lose their cached groups first, and every
    /// group is dropped when the current matrix differs from the one they
    /// were built under. Items whose bounds miss `area` are skipped.
    pub fn redraw<E, P>(
        &mut self,
        ctx: &mut E,
        painter: &mut P,
        area: Option<Box2D>,
    ) -> Result<RedrawStats, GalError>
    where
        E: DrawContext + GroupContext + ?Sized,
        P: ItemPainter<T>,
    {
        let matrix = ctx.current_matrix();
        let rebuild = self.baked_matrix != Some(matrix);
        if rebuild && self.baked_matrix.is_some() {
            tracing::debug!("view matrix changed, rebuilding groups");
        }
        self.baked_matrix = Some(matrix);

        for entry in self.items.values_mut() {
            if !entry.state.take_update().is_empty() || rebuild {
                entry.state.delete_groups(ctx);
            }
        }

        let order = self.layer_order();
        let saved_depth = ctx.paint().layer_depth;
        let mut stats = RedrawStats::default();

        for (index, &layer) in order.iter().enumerate() {
            ctx.set_layer_depth(self.layer_depth(layer, index, order.len()));

            for entry in self.items.values_mut() {
                if !entry.state.is_visible() || !entry.item.view_layers().contains(&layer) {
                    continue;
                }
                if area.is_some_and(|area| !entry.item.view_bbox().intersects(&area)) {
                    continue;
                }

                if let Some(group) = entry.state.group(layer) {
                    if ctx.is_group_valid(group) {
                        ctx.draw_group(group);
                        stats.replayed += 1;
                        continue;
                    }
                }

                let group = ctx.begin_group()?;
                let drawn = painter.draw(ctx, &entry.item, layer);
                ctx.end_group()?;
                if let Err(err) = drawn {
                    ctx.delete_group(group);
                    ctx.set_layer_depth(saved_depth);
                    return Err(err);
                }

                if let Some(stale) = entry.state.set_group(layer, group) {
                    ctx.delete_group(stale);
                }
                ctx.draw_group(group);
                stats.cached += 1;
            }
        }

        ctx.set_layer_depth(saved_depth);
        tracing::debug!(cached = stats.cached, replayed = stats.replayed, "view redrawn");
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gal_core::{Point, RecordingContext};

    struct Dot {
        at: Point,
        layers: SmallVec<[Layer; 4]>,
    }

    impl Viewable for Dot {
        fn view_layers(&self) -> SmallVec<[Layer; 4]> {
            self.layers.clone()
        }

        fn view_bbox(&self) -> Box2D {
            Box2D::from_corners(self.at, self.at).inflate(1.0)
        }
    }

    #[derive(Default)]
    struct CountingPainter {
        calls: Vec<Layer>,
    }

    impl ItemPainter<Dot> for CountingPainter {
        fn draw<C>(&mut self, ctx: &mut C, item: &Dot, layer: Layer) -> Result<bool, GalError>
        where
            C: DrawContext + ?Sized,
        {
            self.calls.push(layer);
            ctx.draw_circle(item.at, 1.0);
            Ok(true)
        }
    }

    fn dot(x: f64, layers: &[Layer]) -> Dot {
        Dot {
            at: Point::new(x, 0.0),
            layers: layers.iter().copied().collect(),
        }
    }

    #[test]
    fn test_groups_are_cached() {
        let mut ctx = RecordingContext::new();
        let mut view = View::new();
        let mut painter = CountingPainter::default();
        view.add(dot(0.0, &[Layer::Board(0), Layer::Board(1)]));

        let first = view.redraw(&mut ctx, &mut painter, None).unwrap();
        assert_eq!(first, RedrawStats { cached: 2, replayed: 0 });

        let second = view.redraw(&mut ctx, &mut painter, None).unwrap();
        assert_eq!(second, RedrawStats { cached: 0, replayed: 2 });
        assert_eq!(painter.calls, vec![Layer::Board(0), Layer::Board(1)]);
        assert_eq!(ctx.commands().len(), 4);
    }

    #[test]
    fn test_layers_draw_back_to_front() {
        let mut ctx = RecordingContext::new();
        let mut view = View::new();
        view.add(dot(0.0, &[Layer::Board(2)]));
        view.add(dot(5.0, &[Layer::Board(0)]));

        view.redraw(&mut ctx, &mut CountingPainter::default(), None)
            .unwrap();
        let depths: Vec<f64> = ctx.commands().iter().map(|c| c.paint.layer_depth).collect();
        assert_eq!(depths.len(), 2);
        assert!(depths[0] > depths[1]);
        assert_eq!(ctx.paint().layer_depth, 0.0);
    }

    #[test]
    fn test_new_layer_gets_its_own_depth() {
        let mut ctx = RecordingContext::new();
        let mut view = View::new();
        let mut painter = CountingPainter::default();
        view.add(dot(0.0, &[Layer::Board(0)]));
        view.add(dot(5.0, &[Layer::Board(2)]));
        view.redraw(&mut ctx, &mut painter, None).unwrap();

        view.add(dot(10.0, &[Layer::Board(1)]));
        let stats = view.redraw(&mut ctx, &mut painter, None).unwrap();
        assert_eq!(stats, RedrawStats { cached: 1, replayed: 2 });

        // second redraw: Board(0), Board(1), Board(2)
        let depths: Vec<f64> = ctx.commands()[2..]
            .iter()
            .map(|c| c.paint.layer_depth)
            .collect();
        assert_eq!(depths.len(), 3);
        assert!(depths[0] > depths[1] && depths[1] > depths[2]);
    }

    #[test]
    fn test_layer_order_change_rebuilds_groups() {
        let mut ctx = RecordingContext::new();
        let mut view = View::new();
        let mut painter = CountingPainter::default();
        view.add(dot(0.0, &[Layer::Board(0), Layer::Board(1)]));
        view.set_layer_order(vec![Layer::Board(0), Layer::Board(1)]);
        view.redraw(&mut ctx, &mut painter, None).unwrap();

        view.set_layer_order(vec![Layer::Board(0), Layer::Board(1)]);
        let same = view.redraw(&mut ctx, &mut painter, None).unwrap();
        assert_eq!(same, RedrawStats { cached: 0, replayed: 2 });

        view.set_layer_order(vec![Layer::Board(1), Layer::Board(0)]);
        let swapped = view.redraw(&mut ctx, &mut painter, None).unwrap();
        assert_eq!(swapped, RedrawStats { cached: 2, replayed: 0 });
        let last: Vec<f64> = ctx.commands()[4..]
            .iter()
            .map(|c| c.paint.layer_depth)
            .collect();
        assert_eq!(last, vec![1.0, 0.0]);
        assert_eq!(painter.calls[2..], [Layer::Board(1), Layer::Board(0)]);
    }

    #[test]
    fn test_matrix_change_rebuilds_groups() {
        let mut ctx = RecordingContext::new();
        let mut view = View::new();
        let mut painter = CountingPainter::default();
        view.add(dot(0.0, &[Layer::Board(0)]));
        view.redraw(&mut ctx, &mut painter, None).unwrap();

        let replay = view.redraw(&mut ctx, &mut painter, None).unwrap();
        assert_eq!(replay, RedrawStats { cached: 0, replayed: 1 });

        ctx.scale(gal_core::Vec2::new(2.0, 2.0));
        let zoomed = view.redraw(&mut ctx, &mut painter, None).unwrap();
        assert_eq!(zoomed, RedrawStats { cached: 1, replayed: 0 });
        assert_eq!(ctx.commands().last().unwrap().matrix, ctx.current_matrix());
    }

    #[test]
    fn test_update_invalidates_groups() {
        let mut ctx = RecordingContext::new();
        let mut view = View::new();
        let mut painter = CountingPainter::default();
        let id = view.add(dot(0.0, &[Layer::Board(0)]));

        view.redraw(&mut ctx, &mut painter, None).unwrap();
        let old = view.state(id).unwrap().group(Layer::Board(0)).unwrap();

        view.get_mut(id).unwrap().at = Point::new(3.0, 3.0);
        let stats = view.redraw(&mut ctx, &mut painter, None).unwrap();
        assert_eq!(stats.cached, 1);
        assert!(!ctx.is_group_valid(old));
    }

    #[test]
    fn test_remove_releases_groups() {
        let mut ctx = RecordingContext::new();
        let mut view = View::new();
        let id = view.add(dot(0.0, &[Layer::Board(0)]));
        view.redraw(&mut ctx, &mut CountingPainter::default(), None)
            .unwrap();
        let group = view.state(id).unwrap().group(Layer::Board(0)).unwrap();

        assert!(view.remove(id, &mut ctx).is_some());
        assert!(!ctx.is_group_valid(group));
        assert!(view.remove(id, &mut ctx).is_none());
    }

    #[test]
    fn test_hidden_and_culled_items_are_skipped() {
        let mut ctx = RecordingContext::new();
        let mut view = View::new();
        let mut painter = CountingPainter::default();
        let hidden = view.add(dot(0.0, &[Layer::Board(0)]));
        view.add(dot(100.0, &[Layer::Board(0)]));
        view.set_visible(hidden, false);

        let area = Box2D::from_corners(Point::new(-10.0, -10.0), Point::new(10.0, 10.0));
        let stats = view.redraw(&mut ctx, &mut painter, Some(area)).unwrap();
        assert_eq!(stats, RedrawStats::default());

        let stats = view.redraw(&mut ctx, &mut painter, None).unwrap();
        assert_eq!(stats.cached, 1);
    }

    #[test]
    fn test_explicit_layer_order() {
        let mut view: View<Dot> = View::new();
        view.add(dot(0.0, &[Layer::Board(1), Layer::Board(0)]));
        assert_eq!(view.layer_order(), vec![Layer::Board(0), Layer::Board(1)]);

        view.set_layer_order(vec![Layer::Board(1)]);
        let mut ctx = RecordingContext::new();
        let mut painter = CountingPainter::default();
        view.redraw(&mut ctx, &mut painter, None).unwrap();
        assert_eq!(painter.calls, vec![Layer::Board(1)]);
    }
}
