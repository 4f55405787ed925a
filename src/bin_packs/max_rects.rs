use crate::rect::Rect;

/// A greedy 2D bin packer over the free-rectangle list.
///
/// Only the best-short-side-fit placement rule is implemented: among the free
/// rectangles a candidate fits into, pick the one whose shorter leftover
/// dimension after placement is smallest.
pub struct MaxRectsBinPack {
    bin_width: i32,
    bin_height: i32,
    used_rectangles: Vec<Rect>,
    free_rectangles: Vec<Rect>,
}

impl MaxRectsBinPack {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            bin_width: width,
            bin_height: height,
            used_rectangles: vec![],
            free_rectangles: vec![Rect {
                x: 0,
                y: 0,
                width,
                height,
            }],
        }
    }

    /// Attempts to place a `width x height` rectangle, optionally rotated.
    /// Returns a zero-size rect on failure.
    pub fn insert(&mut self, width: i32, height: i32, rot: bool) -> Rect {
        let new_node = self.find_position_for_new_node(rot, width, height);
        if new_node.height == 0 {
            return new_node;
        }
        self.place_rect(&new_node);
        new_node
    }

    pub fn occupancy(&self) -> f32 {
        let used_area: i64 = self
            .used_rectangles
            .iter()
            .map(|r| (r.width as i64) * (r.height as i64))
            .sum();
        let bin_area = (self.bin_width as i64) * (self.bin_height as i64);
        used_area as f32 / bin_area as f32
    }

    fn find_position_for_new_node(&self, rot: bool, width: i32, height: i32) -> Rect {
        let mut best_node = Rect::default();
        let mut best_short_side_fit = i32::MAX;
        let mut best_long_side_fit = i32::MAX;

        for rect in &self.free_rectangles {
            if rect.width >= width && rect.height >= height {
                let leftover_horiz = rect.width - width;
                let leftover_vert = rect.height - height;
                let short_side_fit = std::cmp::min(leftover_horiz, leftover_vert);
                let long_side_fit = std::cmp::max(leftover_horiz, leftover_vert);
                if short_side_fit < best_short_side_fit
                    || (short_side_fit == best_short_side_fit && long_side_fit < best_long_side_fit)
                {
                    best_node = Rect {
                        x: rect.x,
                        y: rect.y,
                        width,
                        height,
                    };
                    best_short_side_fit = short_side_fit;
                    best_long_side_fit = long_side_fit;
                }
            }
            if rot && rect.width >= height && rect.height >= width {
                let leftover_horiz = rect.width - height;
                let leftover_vert = rect.height - width;
                let short_side_fit = std::cmp::min(leftover_horiz, leftover_vert);
                let long_side_fit = std::cmp::max(leftover_horiz, leftover_vert);
                if short_side_fit < best_short_side_fit
                    || (short_side_fit == best_short_side_fit && long_side_fit < best_long_side_fit)
                {
                    best_node = Rect {
                        x: rect.x,
                        y: rect.y,
                        width: height,
                        height: width,
                    };
                    best_short_side_fit = short_side_fit;
                    best_long_side_fit = long_side_fit;
                }
            }
        }

        best_node
    }

    fn place_rect(&mut self, node: &Rect) {
        let mut i = 0;
        while i < self.free_rectangles.len() {
            let r = self.free_rectangles[i];
            if self.split_free_node(&r, node) {
                self.free_rectangles.remove(i);
            } else {
                i += 1;
            }
        }
        self.prune_free_list();
        self.used_rectangles.push(*node);
    }

    fn split_free_node(&mut self, free_node: &Rect, used_node: &Rect) -> bool {
        if used_node.x >= free_node.x + free_node.width
            || used_node.x + used_node.width <= free_node.x
            || used_node.y >= free_node.y + free_node.height
            || used_node.y + used_node.height <= free_node.y
        {
            return false;
        }

        if used_node.x < free_node.x + free_node.width
            && used_node.x + used_node.width > free_node.x
        {
            if used_node.y > free_node.y && used_node.y < free_node.y + free_node.height {
                let mut new_node = *free_node;
                new_node.height = used_node.y - new_node.y;
                self.free_rectangles.push(new_node);
            }
            if used_node.y + used_node.height < free_node.y + free_node.height {
                let mut new_node = *free_node;
                new_node.y = used_node.y + used_node.height;
                new_node.height = free_node.y + free_node.height - (used_node.y + used_node.height);
                self.free_rectangles.push(new_node);
            }
        }

        if used_node.y < free_node.y + free_node.height
            && used_node.y + used_node.height > free_node.y
        {
            if used_node.x > free_node.x && used_node.x < free_node.x + free_node.width {
                let mut new_node = *free_node;
                new_node.width = used_node.x - new_node.x;
                self.free_rectangles.push(new_node);
            }
            if used_node.x + used_node.width < free_node.x + free_node.width {
                let mut new_node = *free_node;
                new_node.x = used_node.x + used_node.width;
                new_node.width = free_node.x + free_node.width - (used_node.x + used_node.width);
                self.free_rectangles.push(new_node);
            }
        }

        true
    }

    /// Removes any free rectangle wholly contained within another, preserving
    /// the relative order of the rectangles that remain.
    fn prune_free_list(&mut self) {
        let len = self.free_rectangles.len();
        for i in (0..len).rev() {
            let mut contained = false;
            for j in 0..self.free_rectangles.len() {
                if i == j {
                    continue;
                }
                if self.free_rectangles[i].is_contained_in(&self.free_rectangles[j]) {
                    contained = true;
                    break;
                }
            }
            if contained {
                self.free_rectangles.remove(i);
            }
        }
    }
}
